pub mod ai;
pub mod auth;
pub mod completion;
pub mod error;
pub mod feed;
pub mod middleware;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::auth::AppState;
use crate::feed::MessageFeed;
use crate::middleware::require_auth;

/// Auth routes plus the bearer-protected completion endpoint.
pub fn chat_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/ai", post(ai::ask))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Unauthenticated visualizer feed.
pub fn feed_router(feed: MessageFeed) -> Router {
    Router::new()
        .route("/get_messages", get(feed::get_messages))
        .route("/send_message", post(feed::send_message))
        .with_state(feed)
}
