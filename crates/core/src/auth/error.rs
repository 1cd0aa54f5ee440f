use thiserror::Error;

/// Errors raised while validating submitted credentials.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Password must be at most {max} characters")]
    PasswordTooLong { max: usize },
}
