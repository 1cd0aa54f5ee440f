mod error;
mod functions;
mod types;

pub use error::CredentialError;
pub use functions::{
    claims_for, is_token_expired, normalize_email, validate_email, validate_password,
    MAX_PASSWORD_LEN, MIN_PASSWORD_LEN,
};
pub use types::{ChangePassword, Claims, Credentials};
