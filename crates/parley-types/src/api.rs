use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Token claims shared by the auth service and the bearer middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by both login and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub username: String,
    pub token: String,
}

// -- AI --

#[derive(Debug, Serialize, Deserialize)]
pub struct AiRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AiReply {
    pub reply: String,
}

// -- Visualizer feed --

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
