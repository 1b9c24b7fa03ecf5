use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use parley_auth::AuthError;
use parley_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already taken")]
    UsernameTaken,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Failed to get AI response")]
    Upstream,

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // Token failures carry no detail beyond the status.
            Self::MissingToken | Self::InvalidToken => status.into_response(),
            other => (
                status,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::UsernameTaken => Self::UsernameTaken,
            AuthError::InvalidInput(reason) => Self::BadRequest(reason),
            other => {
                error!("Auth failure: {}", other);
                Self::Internal
            }
        }
    }
}
