//! Environment configuration.
//!
//! Everything is read once at startup. `.env` in the working directory is
//! loaded by `main` before this runs.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use mispctl_core::{CoreError, Credentials};
use mispctl_feeds::MispClient;
use mispctl_fetch::{HttpClient, TlsVerification};
use regex::{Captures, Regex};
use tempfile::NamedTempFile;
use tracing::debug;

/// Values of `MISP_CERT_VALIDATION` that turn verification off.
const VERIFY_OFF_VALUES: [&str; 5] = ["0", "false", "no", "off", "n"];

/// Markers identifying inline PEM text rather than a path.
const PEM_MARKERS: [&str; 2] = [
    "-----BEGIN CERTIFICATE-----",
    "-----BEGIN TRUSTED CERTIFICATE-----",
];

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex")
});

/// Resolved process configuration.
#[derive(Debug)]
pub struct Config {
    /// Login username.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// REST API key.
    pub api_key: Option<String>,
    /// Certificate verification for the session.
    pub tls: TlsVerification,
    /// Rogue redirect host fragment override.
    pub rogue_redirect_host: Option<String>,
    /// Inline CA material written out for the transport; removed on drop.
    _inline_ca: Option<NamedTempFile>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&utf8_vars(std::env::vars_os()))
    }

    /// Reads the configuration from a variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let raw = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

        let (tls, inline_ca) = if verification_enabled(get("MISP_CERT_VALIDATION").as_deref()) {
            match get("MISP_CA_CERT") {
                Some(value) => resolve_ca(&value, vars)?,
                None => (TlsVerification::System, None),
            }
        } else {
            (TlsVerification::Disabled, None)
        };
        debug!(tls = ?tls, "TLS verification resolved");

        Ok(Self {
            username: raw("MISP_USERNAME"),
            password: raw("MISP_PASSWORD"),
            api_key: get("MISP_API_KEY"),
            tls,
            rogue_redirect_host: get("MISP_ROGUE_REDIRECT_HOST"),
            _inline_ca: inline_ca,
        })
    }

    /// Login credentials, if both parts are set.
    pub fn credentials(&self) -> Result<Credentials, CoreError> {
        Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
        .map_err(|_| {
            CoreError::MissingConfig("MISP_USERNAME and MISP_PASSWORD must be set".to_string())
        })
    }

    /// Opens a session against `base_url`.
    pub fn connect(&self, base_url: &str, timeout: Duration) -> Result<MispClient> {
        let mut builder = HttpClient::builder(base_url)
            .tls(self.tls.clone())
            .timeout(timeout);
        if let Some(host) = &self.rogue_redirect_host {
            builder = builder.rogue_redirect_host(host.clone());
        }
        let http = builder.build().context("Failed to create HTTP session")?;
        Ok(MispClient::new(http))
    }
}

/// Keeps the entries whose name and value are both valid UTF-8.
fn utf8_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

fn verification_enabled(value: Option<&str>) -> bool {
    value.is_none_or(|v| !VERIFY_OFF_VALUES.contains(&v.to_ascii_lowercase().as_str()))
}

fn resolve_ca(
    value: &str,
    vars: &HashMap<String, String>,
) -> Result<(TlsVerification, Option<NamedTempFile>)> {
    if PEM_MARKERS.iter().any(|marker| value.contains(marker)) {
        let pem = value.replace("\\n", "\n");
        let mut file = tempfile::Builder::new()
            .prefix("misp-ca-")
            .suffix(".pem")
            .tempfile()
            .context("Failed to create temp file for inline CA certificate")?;
        file.write_all(pem.as_bytes())
            .and_then(|()| file.flush())
            .context("Failed to write inline CA certificate")?;
        let path = file.path().to_path_buf();
        return Ok((TlsVerification::CaBundle(path), Some(file)));
    }

    let path = expand_path(value, vars)?;
    if !path.is_file() {
        bail!("CA bundle not found at path: {}", path.display());
    }
    Ok((TlsVerification::CaBundle(path), None))
}

/// Expands `~`, `$VAR` and `${VAR}`, then makes the path absolute.
/// Unknown variables are left as written.
fn expand_path(raw: &str, vars: &HashMap<String, String>) -> Result<PathBuf> {
    let expanded = ENV_VAR_RE.replace_all(raw, |caps: &Captures<'_>| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        vars.get(name)
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });

    let home = || {
        vars.get("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    };
    let path = match expanded.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match home() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => bail!("Cannot expand '~' without a home directory: {raw}"),
        },
        _ => PathBuf::from(&*expanded),
    };
    std::path::absolute(&path).with_context(|| format!("Invalid path: {}", path.display()))
}
