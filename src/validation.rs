//! Validation of user-entered bookmark fields.
//!
//! The same check runs before a create and before an edit; nothing reaches
//! the record store unless it passes.

use crate::types::errors::ValidationError;

const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Trimmed title and url that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBookmark {
    pub title: String,
    pub url: String,
}

/// Checks a raw (title, url) pair.
///
/// Both values are trimmed first. An empty field wins over a bad scheme, so
/// `(" ", "ftp://x")` reports [`ValidationError::Required`]. The scheme check
/// is an exact, case-sensitive prefix match.
pub fn validate(title: &str, url: &str) -> Result<ValidBookmark, ValidationError> {
    let title = title.trim();
    let url = url.trim();

    if title.is_empty() || url.is_empty() {
        return Err(ValidationError::Required);
    }
    if !has_allowed_scheme(url) {
        return Err(ValidationError::InvalidScheme);
    }

    Ok(ValidBookmark {
        title: title.to_string(),
        url: url.to_string(),
    })
}

pub fn has_allowed_scheme(url: &str) -> bool {
    ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}
