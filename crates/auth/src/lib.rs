//! Password and JWT authentication for GrowthGrid.
//!
//! This crate provides:
//! - Argon2id password hashing
//! - HS256 access tokens, delivered as a cookie and in the login body
//! - The `/auth` routes and the `CurrentUser` extractor

mod config;
mod error;
mod extractors;
mod handlers;
mod password;
mod state;
mod tokens;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use handlers::{auth_routes, LoginResponse, MessageResponse};
pub use password::{hash_password, verify_password};
pub use state::AuthState;
pub use tokens::{issue_token, verify_token};
