use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use parley_types::models::{Credential, CredentialStore};

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::token::TokenIssuer;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;
const MIN_PASSWORD_LEN: usize = 8;

/// Login and registration against a credential store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            token_ttl,
        }
    }

    pub fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        self.hasher.hash(plaintext)
    }

    pub fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        self.hasher.verify(plaintext, hash)
    }

    pub fn issue_token(&self, username: &str, ttl: Duration) -> Result<String, AuthError> {
        self.tokens.issue(username, ttl)
    }

    pub fn verify_token(&self, token: &str) -> Option<String> {
        self.tokens.verify(token)
    }

    /// Creates the credential and returns a token for the new user.
    pub fn register(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !USERNAME_LEN.contains(&username.chars().count()) {
            return Err(AuthError::InvalidInput("username must be 3 to 32 characters"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput("password must be at least 8 characters"));
        }

        // Skips hashing for the common case. The insert still decides races.
        if self.store.find_by_username(username)?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let credential = Credential {
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
        };
        self.store.insert(&credential)?;
        info!("Registered user {}", username);

        self.tokens.issue(username, self.token_ttl)
    }

    /// Checks the password against the stored hash for `username`.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let Some(credential) = self.store.find_by_username(username)? else {
            warn!("Login for unknown user {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &credential.password_hash) {
            warn!("Wrong password for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens.issue(&credential.username, self.token_ttl)
    }
}
