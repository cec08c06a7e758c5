use serde::{Deserialize, Serialize};
use validator::Validate;

/// Credentials submitted from the entry view
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Please enter your name"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

impl LoginRequest {
    /// Surrounding whitespace removed, so validation sees what would be sent
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// First validation message, suitable for showing inline
    pub fn first_problem(&self) -> Option<String> {
        let errors = self.validate().err()?;
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());
        assert!(ok.first_problem().is_none());

        let bad = LoginRequest {
            name: String::new(),
            email: "ada@example.com".to_string(),
        };
        assert_eq!(bad.first_problem().as_deref(), Some("Please enter your name"));

        let bad = LoginRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_whitespace_name_fails_after_trim() {
        let padded = LoginRequest {
            name: "   ".to_string(),
            email: " ada@example.com ".to_string(),
        }
        .trimmed();

        assert_eq!(padded.email, "ada@example.com");
        assert_eq!(padded.first_problem().as_deref(), Some("Please enter your name"));
    }
}
