use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// The cache root is served under `/<cache mount>/`. Anything else that
/// is not a route falls through to the working directory.
pub fn build_app(state: Arc<AppState>) -> Router {
    let mount = format!("/{}", state.config.cache_mount());
    let cache = ServeDir::new(&state.config.cache_root);

    Router::new()
        .route("/", get(routes::landing::index))
        .route("/static/{*path}", get(routes::landing::asset))
        .route("/submit", post(routes::submit::submit))
        .route("/health", get(routes::health::health))
        .nest_service(&mount, cache)
        .fallback_service(ServeDir::new("."))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
