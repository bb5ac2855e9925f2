//! HTML scraping helpers.
//!
//! Only three things are ever read out of a page: the anti-forgery token
//! triplet, whether the page offers a logout link, and whether it is the
//! server's CSRF rejection page.

use std::sync::LazyLock;

use mispctl_core::{TOKEN_FIELDS_FIELD, TOKEN_KEY_FIELD, TOKEN_UNLOCKED_FIELD, TokenTriplet};
use regex::Regex;
use scraper::{Html, Selector};

// ============================================================================
// Selectors & Patterns
// ============================================================================

static TOKEN_KEY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| input_selector(TOKEN_KEY_FIELD));

static TOKEN_FIELDS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| input_selector(TOKEN_FIELDS_FIELD));

static TOKEN_UNLOCKED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| input_selector(TOKEN_UNLOCKED_FIELD));

/// Text shown by the form security component when it rejects a submission.
static CSRF_REJECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cross-site request forgery protection|csrf error").expect("Invalid regex")
});

/// Logout text or `/users/logout` link.
static LOGOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)logout").expect("Invalid regex"));

fn input_selector(name: &str) -> Selector {
    Selector::parse(&format!(r#"input[name="{name}"]"#)).expect("Invalid selector")
}

// ============================================================================
// Extraction
// ============================================================================

/// Extracts the token triplet from a page.
///
/// Each field is `None` when its hidden input is missing or has no `value`
/// attribute. Malformed markup is never an error.
pub fn extract_tokens(html: &str) -> TokenTriplet {
    let document = Html::parse_document(html);
    let value_of = |selector: &Selector| {
        document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("value"))
            .map(str::to_string)
    };

    TokenTriplet {
        key: value_of(&TOKEN_KEY_SELECTOR),
        fields: value_of(&TOKEN_FIELDS_SELECTOR),
        unlocked: value_of(&TOKEN_UNLOCKED_SELECTOR),
    }
}

/// Returns true if the page is a CSRF rejection.
pub fn has_csrf_rejection(body: &str) -> bool {
    CSRF_REJECTION_RE.is_match(body)
}

/// Returns true if the page offers a logout affordance.
pub fn has_logout_link(body: &str) -> bool {
    LOGOUT_RE.is_match(body)
}

// ============================================================================
// Tests
// ============================================================================
