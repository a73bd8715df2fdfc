//! Project collaborators

use crate::ids::UserId;
use crate::validation::{check_email, ValidationError};
use serde::{Deserialize, Serialize};

/// A user sharing a project
///
/// Only membership is tracked locally; there is no nested object graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collaborator {
    /// User id
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
}

impl Collaborator {
    /// Create new collaborator reference
    #[inline]
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Check an email entered in the collaborator form
    ///
    /// # Errors
    /// [`ValidationError::InvalidEmail`] when empty or missing the `@` parts.
    pub fn validate_email(email: &str) -> Result<(), ValidationError> {
        check_email(email)
    }

    /// Case-insensitive email comparison
    #[inline]
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}
