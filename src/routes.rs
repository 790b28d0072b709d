use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};

/// Builds the application router.
///
/// The three CORS headers are written on every response, including errors
/// and preflights, so they are set as plain response headers rather than
/// negotiated per request.
pub fn build_router(state: Arc<AppState>) -> Router {
    let submission_path = state.config.submission_path.clone();
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route(&submission_path, any(handlers::submit_application))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("POST, OPTIONS"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type"),
                ))
                // Enforced when the handler reads the body, so OPTIONS and
                // other methods still get their own answers
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}
