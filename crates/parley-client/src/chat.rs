use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

use parley_types::api::{AiReply, AiRequest, AuthResponse, ErrorBody, LoginRequest, RegisterRequest};
use parley_types::models::{ChatMessage, Role};

use crate::error::ClientError;
use crate::session::Session;
use crate::transcript::Transcript;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Talks to the chat backend on behalf of one user. Owns that user's
/// session and transcript.
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    transcript: Transcript,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session: Session::new(),
            transcript: Transcript::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/auth/register", &body).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/auth/login", &body).await
    }

    pub fn logout(&mut self) {
        self.session.clear();
    }

    async fn authenticate<B: Serialize>(&mut self, path: &str, body: &B) -> Result<(), ClientError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;

        match resp.status() {
            status if status.is_success() => {
                let auth: AuthResponse = resp.json().await?;
                info!("Logged in as {}", auth.username);
                self.session.apply_login_result(auth.username, auth.token);
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(ClientError::InvalidCredentials),
            StatusCode::CONFLICT => Err(ClientError::UsernameTaken),
            status => Err(rejected(status, resp).await),
        }
    }

    /// Append `text` as a user message, ask the assistant, and append its
    /// reply. The user message stays in the transcript even if the request
    /// fails.
    pub async fn send(&mut self, text: &str) -> Result<&ChatMessage, ClientError> {
        let token = self
            .session
            .token()
            .ok_or(ClientError::NotAuthenticated)?
            .to_string();

        self.transcript.push(ChatMessage::new(Role::User, text));

        let resp = self
            .http
            .post(self.url("/api/ai"))
            .bearer_auth(token)
            .json(&AiRequest {
                message: text.to_string(),
            })
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let AiReply { reply } = resp.json().await?;
                Ok(self.transcript.push(ChatMessage::new(Role::Assistant, reply)))
            }
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                warn!("Token rejected with {}", status);
                Err(ClientError::Unauthorized(status.as_u16()))
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                let message = error_message(resp).await;
                Err(ClientError::Upstream(message))
            }
            status => Err(rejected(status, resp).await),
        }
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    resp.json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_default()
}

async fn rejected(status: StatusCode, resp: reqwest::Response) -> ClientError {
    ClientError::Rejected {
        status: status.as_u16(),
        message: error_message(resp).await,
    }
}
