//! Application state for auth.

use axum::extract::FromRef;
use growthgrid_core::cache::Cache;
use growthgrid_core::clock::Clock;
use growthgrid_core::storage::UserRepository;
use std::sync::Arc;

use crate::config::AuthConfig;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserRepository>,
    /// Analytics cache, flushed for a user when their account is deleted.
    pub cache: Arc<dyn Cache>,
    pub clock: Arc<dyn Clock>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            cache,
            clock,
            config,
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
