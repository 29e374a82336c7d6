//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::trace::trace_id_middleware;
use axum::Router;
use axum::middleware;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // The versioned endpoints accept every method and reject the wrong ones
    // themselves, so the client gets the JSON 405 envelope.
    let api_routes = Router::new()
        .route("/v1/latest", any(handlers::get_latest))
        .route("/v1/files/{*path}", any(handlers::get_file));

    let mut router = Router::new()
        .route("/", any(handlers::home))
        .route("/ping", get(handlers::ping))
        .merge(api_routes);

    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    // Middleware layers are applied in reverse order (outermost first).
    router
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
