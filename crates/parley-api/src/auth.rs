use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use parley_auth::AuthService;
use parley_types::api::{AuthResponse, LoginRequest, RegisterRequest};

use crate::completion::CompletionProvider;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub auth: AuthService,
    pub completions: Arc<dyn CompletionProvider>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Argon2 and the credential store both block
    let auth = state.auth.clone();
    let username = req.username.clone();
    let token = tokio::task::spawn_blocking(move || auth.register(&req.username, &req.password))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok((StatusCode::CREATED, Json(AuthResponse { username, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.auth.clone();
    let username = req.username.clone();
    let token = tokio::task::spawn_blocking(move || auth.login(&req.username, &req.password))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(AuthResponse { username, token }))
}
