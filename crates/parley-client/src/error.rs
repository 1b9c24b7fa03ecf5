use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already taken")]
    UsernameTaken,

    #[error("not logged in")]
    NotAuthenticated,

    #[error("server refused the token (status {0})")]
    Unauthorized(u16),

    #[error("assistant unavailable: {0}")]
    Upstream(String),

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}
