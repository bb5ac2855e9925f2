//! MISP client: the shared session plus the header sets each surface needs.

use mispctl_fetch::{HttpClient, header_map};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, ORIGIN, REFERER};

/// A MISP session.
///
/// Wraps one [`HttpClient`] so the cookie jar from the form login is shared
/// by every later request. Operations live in the `login`, `loader`, `api`
/// and `batch` modules.
#[derive(Debug, Clone)]
pub struct MispClient {
    http: HttpClient,
}

impl MispClient {
    /// Creates a client over an existing session.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// The underlying session.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Headers for a form post that looks like it came from `referer_path`.
    pub(crate) fn form_headers(&self, referer_path: &str) -> HeaderMap {
        let referer = self.http.url_for(referer_path);
        header_map([
            (ORIGIN, self.http.base_url()),
            (REFERER, referer.as_str()),
        ])
    }
}

/// Headers for REST calls authenticated by API key.
pub(crate) fn api_headers(api_key: &str) -> HeaderMap {
    header_map([(AUTHORIZATION, api_key), (ACCEPT, "application/json")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_headers() {
        let http = HttpClient::builder("https://misp.local/").build().unwrap();
        let headers = MispClient::new(http).form_headers("users/login");

        assert_eq!(headers[ORIGIN], "https://misp.local");
        assert_eq!(headers[REFERER], "https://misp.local/users/login");
    }

    #[test]
    fn test_api_headers() {
        let headers = api_headers("abc123");
        assert_eq!(headers[AUTHORIZATION], "abc123");
        assert_eq!(headers[ACCEPT], "application/json");
    }
}
