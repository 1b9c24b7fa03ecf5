use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_render::{CollapseState, RenderedBody, RenderedMessage, render_message};
use parley_types::models::ChatMessage;

use crate::error::ClientError;

/// Where the poll loop reads the full server-side message list from.
pub trait MessageSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<ChatMessage>, ClientError>>;
}

/// `GET {base}/get_messages`. The whole response is rejected if any entry
/// has an unknown role, so positions never shift.
pub struct HttpMessageSource {
    http: reqwest::Client,
    url: String,
}

impl HttpMessageSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: format!("{}/get_messages", base_url.trim_end_matches('/')),
        })
    }
}

impl MessageSource for HttpMessageSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<ChatMessage>, ClientError>> {
        Box::pin(async move {
            let resp = self.http.get(&self.url).send().await?.error_for_status()?;
            Ok(resp.json().await?)
        })
    }
}

/// Messages already rendered on the client, in server order.
#[derive(Clone, Default)]
pub struct RenderedFeed {
    inner: Arc<Mutex<Vec<RenderedMessage>>>,
}

impl RenderedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RenderedMessage>> {
        // Rendering cannot leave the list half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<RenderedMessage> {
        self.lock().clone()
    }

    /// Render and append every message at or past the current length.
    ///
    /// The comparison and the append happen under one lock and use only
    /// `server_list`, so a stale response that arrives after a newer one
    /// appends nothing. Earlier entries are never re-rendered.
    pub fn append_unseen(&self, server_list: &[ChatMessage]) -> Vec<RenderedMessage> {
        let mut rendered = self.lock();
        let shown = rendered.len();
        let Some(unseen) = server_list.get(shown..) else {
            return Vec::new();
        };

        let fresh: Vec<RenderedMessage> = unseen.iter().map(render_message).collect();
        rendered.extend(fresh.iter().cloned());
        fresh
    }

    /// Toggle the system message at `index`. `None` if there is no such
    /// message or it is not collapsible.
    pub fn toggle(&self, index: usize) -> Option<CollapseState> {
        let mut rendered = self.lock();
        match &mut rendered.get_mut(index)?.body {
            RenderedBody::System(collapsible) => Some(collapsible.toggle()),
            RenderedBody::Blocks(_) => None,
        }
    }
}

/// Length-diff poller over a [`MessageSource`].
pub struct Poller<S> {
    source: S,
    feed: RenderedFeed,
    updates: Option<mpsc::UnboundedSender<RenderedMessage>>,
}

impl<S: MessageSource + 'static> Poller<S> {
    pub fn new(source: S, feed: RenderedFeed) -> Self {
        Self {
            source,
            feed,
            updates: None,
        }
    }

    /// Forward each newly rendered message to `tx` as well.
    pub fn with_updates(mut self, tx: mpsc::UnboundedSender<RenderedMessage>) -> Self {
        self.updates = Some(tx);
        self
    }

    pub fn feed(&self) -> &RenderedFeed {
        &self.feed
    }

    /// One fetch-compare-append pass. Returns the newly rendered messages.
    pub async fn tick(&self) -> Result<Vec<RenderedMessage>, ClientError> {
        let server_list = self.source.fetch().await?;
        let fresh = self.feed.append_unseen(&server_list);

        if let Some(tx) = &self.updates {
            for message in &fresh {
                let _ = tx.send(message.clone());
            }
        }
        Ok(fresh)
    }

    /// Tick every `period`, starting immediately, until the handle is stopped.
    pub fn spawn(self, period: Duration) -> PollHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let result = tokio::select! {
                    _ = token.cancelled() => break,
                    result = self.tick() => result,
                };

                match result {
                    Ok(fresh) if !fresh.is_empty() => debug!("Rendered {} new messages", fresh.len()),
                    Ok(_) => {}
                    Err(e) => warn!("Poll failed: {}", e),
                }
            }

            info!("Poll loop stopped");
        });

        PollHandle { cancel, task }
    }
}

/// Owning handle for a running poll loop.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Token that stops the loop when cancelled, for callers that cannot
    /// hold the handle itself.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the loop to exit. No fetch starts after this
    /// returns, and one in flight is dropped.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Poll task ended abnormally: {}", e);
        }
    }
}
