// Input validation for the plain save path
//
// The batch engine never validates; it only rewrites the status of items that
// were already accepted by the store.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::item::Item;

/// Maximum length of [`Item::name`], in characters
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of [`Item::description`], in characters
pub const MAX_DESCRIPTION_LEN: usize = 255;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("email pattern is a valid regex")
});

/// Reasons an item is rejected before persistence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be blank")]
    BlankName,

    #[error("name must be at most {max} characters (got {len})")]
    NameTooLong { len: usize, max: usize },

    #[error("description must be at most {max} characters (got {len})")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("email is required")]
    BlankEmail,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Check an address against the accepted email shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate an item before it is handed to the store
pub fn validate_item(item: &Item) -> Result<(), ValidationError> {
    if item.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }

    let name_len = item.name.chars().count();
    if name_len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len: name_len,
            max: MAX_NAME_LEN,
        });
    }

    if let Some(description) = &item.description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong {
                len,
                max: MAX_DESCRIPTION_LEN,
            });
        }
    }

    if item.email.trim().is_empty() {
        return Err(ValidationError::BlankEmail);
    }

    if !is_valid_email(&item.email) {
        return Err(ValidationError::InvalidEmail(item.email.clone()));
    }

    Ok(())
}
