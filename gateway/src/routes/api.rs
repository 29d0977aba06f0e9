use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{speak, videos, voices};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Authentication middleware is applied by [`super::create_app`] once state is available
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/speak", post(speak::speak_handler))
        .route("/voices", get(voices::list_voices))
        .route(
            "/videos/{file_name}",
            get(videos::download_video).put(videos::upload_video),
        )
        .layer(TraceLayer::new_for_http())
}
