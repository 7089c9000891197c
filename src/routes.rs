mod members;
mod root;
mod schedule;

use crate::state::AppState;
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root::health_check))
        .nest("/api/members", members::new())
        .nest("/api/schedule", schedule::new())
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_origin(Any)
                .allow_headers([CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
