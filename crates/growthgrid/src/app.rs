use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Router,
};
use growthgrid_auth::auth_routes;
use growthgrid_core::journal::MAX_UPLOAD_BYTES;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{
        analytics::{heatmap, summary},
        entries::{create_entry, delete_entry, get_entry, list_entries, list_tags, update_entry},
        files::serve_file,
        health::{health, livez},
        root::manifest,
        uploads::{delete_upload, upload_file},
    },
    state::AppState,
};

/// Room for multipart framing and the `entry_id` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        // Credentials (the auth cookie) are only allowed with explicit origins.
        cors.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let upload_limit = MAX_UPLOAD_BYTES as usize + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new()
        // Entry routes
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/tags", get(list_tags))
        .route(
            "/entries/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        // Attachment routes
        .route(
            "/uploads",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/uploads/{id}", delete(delete_upload))
        .route("/files/{*key}", get(serve_file))
        // Analytics routes
        .route("/analytics/heatmap", get(heatmap))
        .route("/analytics/summary", get(summary))
        // Meta routes
        .route("/", get(manifest))
        .route("/health", get(health))
        .route("/livez", get(livez))
        .with_state(state.clone());

    // Main application router
    Router::new()
        .merge(api_routes)
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
}
