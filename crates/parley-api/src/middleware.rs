use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::AppState;
use crate::error::ApiError;

/// Identity attached to requests that passed [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

/// Extract and validate the bearer token.
///
/// The token is whatever follows the first space of the header, whatever the
/// scheme. No header, or no space in it, is 401. Anything else goes to
/// verification, and a failure there is 403.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(token_part)
        .ok_or(ApiError::MissingToken)?;

    let username = state.auth.verify_token(token).ok_or(ApiError::InvalidToken)?;

    req.extensions_mut().insert(AuthUser { username });
    Ok(next.run(req).await)
}

fn token_part(header: &str) -> Option<&str> {
    header.split(' ').nth(1)
}
