//! Credential hashing, bearer tokens and the login/registration flow.
//!
//! Everything here is blocking. Argon2 is deliberately slow, so async
//! callers should run these functions on `spawn_blocking`.

pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use password::{HashCost, PasswordHasher};
pub use service::AuthService;
pub use token::TokenIssuer;
