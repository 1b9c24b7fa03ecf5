use axum::{Extension, Json, extract::State};
use tracing::{debug, error};

use parley_types::api::{AiReply, AiRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// POST /api/ai: forward the message to the completion API and return the
/// first candidate's text. Any upstream failure is a generic 500.
pub async fn ask(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AiRequest>,
) -> Result<Json<AiReply>, ApiError> {
    debug!("Completion request from {} ({} chars)", user.username, req.message.len());

    let reply = state.completions.complete(&req.message).await.map_err(|e| {
        error!("Completion request for {} failed: {}", user.username, e);
        ApiError::Upstream
    })?;

    Ok(Json(AiReply { reply }))
}
