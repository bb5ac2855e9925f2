//! Anti-forgery token triplet.

/// Form field name of the token key.
pub const TOKEN_KEY_FIELD: &str = "data[_Token][key]";
/// Form field name of the token field list.
pub const TOKEN_FIELDS_FIELD: &str = "data[_Token][fields]";
/// Form field name of the unlocked field list.
pub const TOKEN_UNLOCKED_FIELD: &str = "data[_Token][unlocked]";

/// The three hidden form fields required by the server's form security
/// component.
///
/// Valid for exactly one subsequent submission; a new triplet is scraped
/// before every POST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTriplet {
    /// `data[_Token][key]`
    pub key: Option<String>,
    /// `data[_Token][fields]`
    pub fields: Option<String>,
    /// `data[_Token][unlocked]`
    pub unlocked: Option<String>,
}

impl TokenTriplet {
    /// Returns true if none of the three fields were found.
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.fields.is_none() && self.unlocked.is_none()
    }

    /// Form fields to submit. Absent values are sent as empty strings, never
    /// omitted.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            (TOKEN_KEY_FIELD, self.key.clone().unwrap_or_default()),
            (TOKEN_FIELDS_FIELD, self.fields.clone().unwrap_or_default()),
            (TOKEN_UNLOCKED_FIELD, self.unlocked.clone().unwrap_or_default()),
        ]
    }
}
