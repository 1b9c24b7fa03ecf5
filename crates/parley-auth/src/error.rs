use parley_types::models::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Never says which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already taken")]
    UsernameTaken,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("credential store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::UsernameTaken,
            StoreError::Backend(e) => AuthError::Store(e),
        }
    }
}
