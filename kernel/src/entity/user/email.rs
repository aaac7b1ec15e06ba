use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::common::validate_length;
use crate::KernelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Emails are compared case-insensitively, so they are stored lowercased.
    pub fn try_new(email: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let email = email.into().trim().to_lowercase();
        validate_length("email", &email, 3, 255)?;
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self(email)),
            _ => Err(Report::new(KernelError::InvalidInput).attach_printable("email is invalid")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::UserEmail;

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = UserEmail::try_new("  Member@Example.COM ").unwrap();
        assert_eq!(email.as_ref(), "member@example.com");
    }

    #[test]
    fn rejects_missing_parts() {
        for email in ["member", "@example.com", "member@", ""] {
            assert!(UserEmail::try_new(email).is_err(), "{email}");
        }
    }
}
