//! Local form validation errors

/// A form failed local validation; raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The email address is empty or has no `@`
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
}

impl ValidationError {
    /// Message shown to the user in an error alert
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField(_) => "All fields are required".to_string(),
            Self::InvalidEmail(_) => "A valid email is required".to_string(),
        }
    }
}

/// Check an email address the way the collaborator form does
pub(crate) fn check_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check() {
        assert!(check_email("ana@x.com").is_ok());
        assert!(check_email("  ").is_err());
        assert!(check_email("ana@").is_err());
        assert!(check_email("ana").is_err());
    }

    #[test]
    fn user_message_hides_field_name() {
        let err = ValidationError::MissingField("name");
        assert_eq!(err.user_message(), "All fields are required");
        assert!(err.to_string().contains("name"));
    }
}
