use std::sync::Arc;

use axum::{Json, extract::State};
use tokio::sync::RwLock;

use parley_types::api::SendMessageResponse;
use parley_types::models::ChatMessage;

/// Append-only in-memory message list served to visualizers.
#[derive(Clone, Default)]
pub struct MessageFeed {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the zero-based position of the appended message.
    pub async fn append(&self, message: ChatMessage) -> usize {
        let mut messages = self.messages.write().await;
        messages.push(message);
        messages.len() - 1
    }

    pub async fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

/// GET /get_messages: the whole feed in insertion order.
pub async fn get_messages(State(feed): State<MessageFeed>) -> Json<Vec<ChatMessage>> {
    Json(feed.snapshot().await)
}

/// POST /send_message: roles outside the closed set are rejected by the
/// JSON extractor before reaching here.
pub async fn send_message(
    State(feed): State<MessageFeed>,
    Json(message): Json<ChatMessage>,
) -> Json<SendMessageResponse> {
    let index = feed.append(message).await;
    Json(SendMessageResponse { index })
}
