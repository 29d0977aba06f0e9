pub mod api;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::handlers::api::health_check;
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Public health check plus the protected API behind the auth middleware.
///
/// Transport concerns (CORS, rate limiting, security headers) are layered on
/// by the binary.
pub fn create_app(state: Arc<AppState>) -> Router {
    let protected_routes = api::create_api_router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    Router::new()
        .route("/", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}
