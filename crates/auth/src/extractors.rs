//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use growthgrid_core::journal::User;

use crate::error::AuthError;
use crate::tokens::verify_token;
use crate::AuthState;

/// Extractor for authenticated user. Returns 401 if not authenticated.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        // Try Authorization header first (for API/mobile clients)
        let token = if let Some(auth_header) = parts.headers.get(AUTHORIZATION) {
            let header_value = auth_header
                .to_str()
                .map_err(|_| AuthError::Unauthorized("Invalid authorization header"))?;

            header_value
                .strip_prefix("Bearer ")
                .map(|token| token.trim().to_string())
        } else {
            None
        };

        // Fall back to cookie (for web clients)
        let token = match token {
            Some(token) => token,
            None => {
                let jar = CookieJar::from_headers(&parts.headers);
                let cookie = jar
                    .get(&auth_state.config.cookie_name)
                    .ok_or(AuthError::Unauthorized("Not authenticated"))?;

                cookie.value().to_string()
            }
        };

        let claims = verify_token(&auth_state.config, &token, auth_state.clock.now())?;
        let user_id = claims
            .user_id()
            .ok_or(AuthError::Unauthorized("Invalid token"))?;

        let user = auth_state
            .users
            .get_user(user_id)
            .await?
            .ok_or(AuthError::Unauthorized("User not found"))?;

        Ok(CurrentUser(user))
    }
}
