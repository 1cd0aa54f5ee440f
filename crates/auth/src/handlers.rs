//! HTTP handlers for auth routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use growthgrid_core::auth::{validate_email, validate_password, ChangePassword, Credentials};
use growthgrid_core::journal::User;
use growthgrid_core::storage::RepositoryError;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::extractors::CurrentUser;
use crate::password::{hash_password, verify_password};
use crate::tokens::issue_token;
use crate::AuthState;

/// Body returned by login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login` - Exchange credentials for an access token
/// - `POST /auth/logout` - Clear the access token cookie
/// - `GET /auth/me` - Get current authenticated user
/// - `PUT /auth/password` - Change the current user's password
/// - `DELETE /auth/account` - Delete the current user and all their data
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/password", put(change_password))
        .route("/auth/account", delete(delete_account))
}

async fn register(
    State(state): State<AuthState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<User>), AuthError> {
    let email = validate_email(&credentials.email)?;
    validate_password(&credentials.password)?;

    if state.users.get_user_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_password(&credentials.password).await?;
    let mut user = User::new(email, password_hash);
    user.created_at = state.clock.now();

    // A concurrent registration can still win the race to the unique index.
    match state.users.create_user(&user).await {
        Ok(()) => {}
        Err(RepositoryError::AlreadyExists { .. }) => return Err(AuthError::EmailTaken),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let email = validate_email(&credentials.email).map_err(|_| AuthError::InvalidCredentials)?;

    let user = state
        .users
        .get_user_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&credentials.password, &user.password_hash).await? {
        return Err(AuthError::InvalidCredentials);
    }

    let token = issue_token(&state.config, user.id, state.clock.now())?;

    let cookie = Cookie::build((state.config.cookie_name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.config.token_ttl.as_secs() as i64
        ))
        .build();

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            access_token: token,
            token_type: "bearer".to_string(),
        }),
    ))
}

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> impl IntoResponse {
    let cookie = Cookie::build(state.config.cookie_name.clone())
        .path("/")
        .build();

    (jar.remove(cookie), MessageResponse::new("Logged out"))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

async fn change_password(
    State(state): State<AuthState>,
    CurrentUser(mut user): CurrentUser,
    Json(payload): Json<ChangePassword>,
) -> Result<Json<MessageResponse>, AuthError> {
    if !verify_password(&payload.current_password, &user.password_hash).await? {
        return Err(AuthError::IncorrectPassword);
    }
    validate_password(&payload.new_password)?;

    user.password_hash = hash_password(&payload.new_password).await?;
    state.users.update_user(&user).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(MessageResponse::new("Password updated"))
}

async fn delete_account(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), AuthError> {
    state.users.delete_user(user.id).await?;

    if let Err(e) = state.cache.invalidate_for_user(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to invalidate analytics cache");
    }

    tracing::info!(user_id = %user.id, "Account deleted");

    let cookie = Cookie::build(state.config.cookie_name.clone())
        .path("/")
        .build();
    Ok((StatusCode::NO_CONTENT, jar.remove(cookie)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthConfig;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use chrono::{Duration, TimeZone, Utc};
    use growthgrid_core::cache::{Cache, CacheKey};
    use growthgrid_core::clock::ManualClock;
    use growthgrid_core::storage::UserRepository;
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryUsers {
        users: Mutex<HashMap<Uuid, User>>,
    }

    #[async_trait]
    impl UserRepository for MemoryUsers {
        async fn get_user(&self, id: Uuid) -> growthgrid_core::storage::Result<Option<User>> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn get_user_by_email(
            &self,
            email: &str,
        ) -> growthgrid_core::storage::Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn create_user(&self, user: &User) -> growthgrid_core::storage::Result<()> {
            self.users.lock().unwrap().insert(user.id, user.clone());
            Ok(())
        }

        async fn update_user(&self, user: &User) -> growthgrid_core::storage::Result<()> {
            self.users.lock().unwrap().insert(user.id, user.clone());
            Ok(())
        }

        async fn delete_user(&self, id: Uuid) -> growthgrid_core::storage::Result<()> {
            self.users.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    /// Records which users were invalidated.
    #[derive(Default)]
    struct RecordingCache {
        invalidated: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl Cache for RecordingCache {
        async fn get(&self, _key: &CacheKey) -> growthgrid_core::cache::Result<Option<Vec<u8>>> {
            Ok(None)
        }
        async fn set(&self, _key: &CacheKey, _value: &[u8]) -> growthgrid_core::cache::Result<()> {
            Ok(())
        }
        async fn generation(&self, _key: &CacheKey) -> growthgrid_core::cache::Result<u64> {
            Ok(0)
        }
        async fn set_if_generation(
            &self,
            _key: &CacheKey,
            _value: &[u8],
            _generation: u64,
        ) -> growthgrid_core::cache::Result<bool> {
            Ok(true)
        }
        async fn delete(&self, _key: &CacheKey) -> growthgrid_core::cache::Result<()> {
            Ok(())
        }
        async fn invalidate_prefix(&self, _prefix: &CacheKey) -> growthgrid_core::cache::Result<()> {
            Ok(())
        }
        async fn invalidate_for_user(&self, user_id: Uuid) -> growthgrid_core::cache::Result<()> {
            self.invalidated.lock().unwrap().push(user_id);
            Ok(())
        }
        async fn clear(&self) -> growthgrid_core::cache::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        app: Router,
        users: Arc<MemoryUsers>,
        cache: Arc<RecordingCache>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let users = Arc::new(MemoryUsers::default());
        let cache = Arc::new(RecordingCache::default());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap(),
        ));
        let state = AuthState::new(
            users.clone(),
            cache.clone(),
            clock.clone(),
            AuthConfig::with_secret("test-secret"),
        );
        Harness {
            app: auth_routes().with_state(state),
            users,
            cache,
            clock,
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
        let credentials = serde_json::json!({"email": email, "password": password});
        let response = app
            .clone()
            .oneshot(json_request("POST", "/auth/register", credentials.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/auth/login", credentials))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn authed(method: &str, uri: &str, token: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_hides_hash() {
        let h = harness();

        let response = h
            .app
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({"email": "  Ada@Example.com ", "password": "password123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json["id"].is_string());
        assert!(json["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let h = harness();
        register_and_login(&h.app, "ada@example.com", "password123").await;

        let response = h
            .app
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({"email": "ADA@example.com", "password": "password456"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["detail"], "Email already registered");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let h = harness();

        for body in [
            serde_json::json!({"email": "not-an-email", "password": "password123"}),
            serde_json::json!({"email": "ada@example.com", "password": "short"}),
        ] {
            let response = h
                .app
                .clone()
                .oneshot(json_request("POST", "/auth/register", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let h = harness();
        register_and_login(&h.app, "ada@example.com", "password123").await;

        let response = h
            .app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({"email": "ada@example.com", "password": "password123"}),
            ))
            .await
            .unwrap();

        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert_eq!(body_json(response).await["message"], "Login successful");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let h = harness();
        register_and_login(&h.app, "ada@example.com", "password123").await;

        for body in [
            serde_json::json!({"email": "ada@example.com", "password": "password999"}),
            serde_json::json!({"email": "nobody@example.com", "password": "password123"}),
        ] {
            let response = h
                .app
                .clone()
                .oneshot(json_request("POST", "/auth/login", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(response).await["detail"], "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn test_me_with_bearer_and_cookie() {
        let h = harness();
        let token = register_and_login(&h.app, "ada@example.com", "password123").await;

        let response = h
            .app
            .clone()
            .oneshot(authed("GET", "/auth/me", &token).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], "ada@example.com");

        let response = h
            .app
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header("Cookie", format!("access_token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_me_without_token_is_unauthorized() {
        let h = harness();

        let response = h
            .app
            .oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let h = harness();
        let token = register_and_login(&h.app, "ada@example.com", "password123").await;

        h.clock.advance(Duration::days(8));

        let response = h
            .app
            .oneshot(authed("GET", "/auth/me", &token).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_change_password() {
        let h = harness();
        let token = register_and_login(&h.app, "ada@example.com", "password123").await;

        let response = h
            .app
            .clone()
            .oneshot(
                authed("PUT", "/auth/password", &token)
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"current_password": "wrong-password", "new_password": "newpassword1"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = h
            .app
            .clone()
            .oneshot(
                authed("PUT", "/auth/password", &token)
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"current_password": "password123", "new_password": "newpassword1"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = h
            .app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({"email": "ada@example.com", "password": "newpassword1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_account_invalidates_cache() {
        let h = harness();
        let token = register_and_login(&h.app, "ada@example.com", "password123").await;
        let user = h
            .users
            .get_user_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();

        let response = h
            .app
            .clone()
            .oneshot(
                authed("DELETE", "/auth/account", &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(h.users.get_user(user.id).await.unwrap().is_none());
        assert_eq!(*h.cache.invalidated.lock().unwrap(), vec![user.id]);

        // The token outlives the account but no longer resolves to a user.
        let response = h
            .app
            .oneshot(authed("GET", "/auth/me", &token).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let h = harness();

        let response = h
            .app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .header("Cookie", "access_token=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("Max-Age=0"));
    }
}
