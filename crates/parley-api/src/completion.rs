use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned status {0}")]
    Status(u16),

    #[error("completion API returned no choices")]
    Empty,
}

/// A text-completion backend. Boxed futures keep it object safe so the
/// router state can hold `Arc<dyn CompletionProvider>`.
pub trait CompletionProvider: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, UpstreamError>>;
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/completions".into(),
            api_key: String::new(),
            model: "text-davinci-003".into(),
            max_tokens: 150,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// OpenAI-style `/v1/completions` client. One attempt per call, bounded by
/// the configured timeout.
pub struct OpenAiCompletions {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiCompletions {
    pub fn new(config: CompletionConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }
}

impl CompletionProvider for OpenAiCompletions {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, UpstreamError>> {
        Box::pin(async move {
            let resp = self
                .http
                .post(&self.config.url)
                .bearer_auth(&self.config.api_key)
                .json(&CompletionBody {
                    model: &self.config.model,
                    prompt,
                    max_tokens: self.config.max_tokens,
                })
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(UpstreamError::Status(status.as_u16()));
            }

            let body: CompletionResponse = resp.json().await?;
            body.choices
                .into_iter()
                .next()
                .map(|choice| choice.text)
                .ok_or(UpstreamError::Empty)
        })
    }
}
