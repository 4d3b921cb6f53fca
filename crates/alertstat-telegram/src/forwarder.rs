//! Keyword-filtered relay of live posts from one chat to another.
//!
//! Long-polls `getUpdates`, keeps messages from the configured source chat
//! whose text or caption mentions an outage keyword, and copies them to the
//! destination without a forward header. One message at a time; a failed
//! relay is logged and polling continues.

use alertstat_common::{ChatRef, MediaKind, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::BotApi;
use crate::types::{TgMessage, Update};

const INITIAL_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 30;

/// Case-insensitive substring match against a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    /// Filter over `keywords`; blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Whether the lowercased `text` contains any keyword.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }
}

/// A live post as seen by the forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMessage {
    /// Chat the post was made in.
    pub chat_id: i64,
    /// Public username of that chat.
    pub chat_username: Option<String>,
    /// Id of the post in its chat.
    pub message_id: i64,
    /// Text or caption.
    pub text: String,
    /// Attached media.
    pub media: Option<MediaKind>,
}

impl From<TgMessage> for LiveMessage {
    fn from(message: TgMessage) -> Self {
        let media = message.media();
        let text = message.body().to_string();
        Self {
            chat_id: message.chat.id,
            chat_username: message.chat.username,
            message_id: message.message_id,
            text,
            media,
        }
    }
}

/// Publishes a copy of a live post.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Relay: Send + Sync {
    /// Copies `message` into `destination`.
    async fn relay(&self, message: &LiveMessage, destination: &ChatRef) -> Result<()>;
}

/// Yields batches of updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateFeed: Send + Sync {
    /// Next batch after `offset`, waiting up to `timeout_secs` for one.
    async fn next_batch(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>>;
}

#[async_trait]
impl UpdateFeed for BotApi {
    async fn next_batch(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        self.get_updates(offset, timeout_secs).await
    }
}

/// Relay through `copyMessage`, which keeps media and drops the forward header.
#[derive(Debug, Clone)]
pub struct BotApiRelay {
    api: Arc<BotApi>,
    silent: bool,
}

impl BotApiRelay {
    /// Relay over `api`.
    pub fn new(api: Arc<BotApi>, silent: bool) -> Self {
        Self { api, silent }
    }
}

#[async_trait]
impl Relay for BotApiRelay {
    async fn relay(&self, message: &LiveMessage, destination: &ChatRef) -> Result<()> {
        self.api
            .copy_message(destination, message.chat_id, message.message_id, self.silent)
            .await?;
        Ok(())
    }
}

/// What happened to one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Copied to the destination.
    Relayed,
    /// Update without a message.
    Empty,
    /// Posted in some other chat.
    OtherChat,
    /// No keyword in the text.
    NoKeyword,
    /// The relay failed; the error was logged.
    Failed,
}

/// The forwarding loop.
pub struct Forwarder {
    feed: Arc<dyn UpdateFeed>,
    relay: Arc<dyn Relay>,
    source: ChatRef,
    destination: ChatRef,
    filter: KeywordFilter,
    poll_timeout_secs: u64,
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Forwarder {
    /// Creates a forwarder from `source` to `destination`.
    pub fn new(
        feed: Arc<dyn UpdateFeed>,
        relay: Arc<dyn Relay>,
        source: ChatRef,
        destination: ChatRef,
        filter: KeywordFilter,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            feed,
            relay,
            source,
            destination,
            filter,
            poll_timeout_secs,
        }
    }

    /// Filters and relays one update.
    pub async fn handle(&self, update: Update) -> ForwardOutcome {
        let update_id = update.update_id;
        let Some(message) = update.into_message() else {
            return ForwardOutcome::Empty;
        };
        let message = LiveMessage::from(message);

        if !self
            .source
            .matches(message.chat_id, message.chat_username.as_deref())
        {
            debug!(update_id, chat_id = message.chat_id, "Ignoring post from another chat");
            return ForwardOutcome::OtherChat;
        }
        if !self.filter.matches(&message.text) {
            debug!(update_id, message_id = message.message_id, "No keyword, not forwarding");
            return ForwardOutcome::NoKeyword;
        }

        match self.relay.relay(&message, &self.destination).await {
            Ok(()) => {
                info!(
                    message_id = message.message_id,
                    media = ?message.media,
                    destination = %self.destination,
                    "Forwarded post"
                );
                ForwardOutcome::Relayed
            }
            Err(e) => {
                warn!(message_id = message.message_id, error = %e, "Forwarding failed");
                ForwardOutcome::Failed
            }
        }
    }

    /// Runs until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut offset: Option<i64> = None;
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        info!(source = %self.source, destination = %self.destination, "Forwarder started");

        loop {
            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Forwarder shutting down");
                    return;
                }
                result = self.feed.next_batch(offset, self.poll_timeout_secs) => result,
            };

            match batch {
                Ok(updates) => {
                    backoff_secs = INITIAL_BACKOFF_SECS;
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, backoff_secs, "getUpdates failed, backing off");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            info!("Forwarder shutting down");
                            return;
                        }
                        _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                    }
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                }
            }
        }
    }
}
