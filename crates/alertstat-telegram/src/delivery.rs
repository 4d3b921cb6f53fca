//! Report delivery transports.
//!
//! A configured bot token selects [`BotApiDelivery`]; without one reports go
//! to the [`OutboxDelivery`] directory, where the session-holding client
//! picks them up.

use alertstat_common::{AlertStatError, ChatRef, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::BotApi;

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReceipt {
    /// Published; ids of the created messages.
    Posted {
        /// Message ids in album order.
        message_ids: Vec<i64>,
    },
    /// Queued for publication in an outbox directory.
    Queued {
        /// Directory holding the queued report.
        dir: PathBuf,
    },
}

/// Sends a finished report to a destination chat.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Sends `files` as one album with `caption` on the first item.
    async fn send(&self, destination: &ChatRef, files: &[PathBuf], caption: &str) -> Result<DeliveryReceipt>;

    /// Gets the name of this transport.
    fn name(&self) -> &'static str;
}

/// Delivery through the Bot API.
#[derive(Debug, Clone)]
pub struct BotApiDelivery {
    api: Arc<BotApi>,
    silent: bool,
}

impl BotApiDelivery {
    /// Delivery over `api`, silent when `silent` is set.
    pub fn new(api: Arc<BotApi>, silent: bool) -> Self {
        Self { api, silent }
    }
}

#[async_trait]
impl Delivery for BotApiDelivery {
    async fn send(&self, destination: &ChatRef, files: &[PathBuf], caption: &str) -> Result<DeliveryReceipt> {
        let message_ids = match files {
            [] => vec![self.api.send_message(destination, caption, self.silent).await?.message_id],
            [single] => vec![
                self.api
                    .send_photo(destination, single, Some(caption), self.silent)
                    .await?
                    .message_id,
            ],
            many => self
                .api
                .send_media_group(destination, many, caption, self.silent)
                .await?
                .into_iter()
                .map(|sent| sent.message_id)
                .collect(),
        };

        info!(%destination, files = files.len(), silent = self.silent, "Report delivered via Bot API");
        Ok(DeliveryReceipt::Posted { message_ids })
    }

    fn name(&self) -> &'static str {
        "bot_api"
    }
}

/// Name of the caption file inside an outbox entry.
pub const CAPTION_FILE: &str = "caption.txt";
/// Name of the manifest inside an outbox entry.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Describes one queued report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxManifest {
    /// Chat to publish to.
    pub destination: ChatRef,
    /// Publish without notification.
    pub silent: bool,
    /// Caption file name.
    pub caption_file: String,
    /// Image file names in album order.
    pub files: Vec<String>,
    /// When the report was queued.
    pub created_at: DateTime<Utc>,
}

/// Queues reports as directories under an outbox root.
#[derive(Debug, Clone)]
pub struct OutboxDelivery {
    root: PathBuf,
    silent: bool,
}

impl OutboxDelivery {
    /// Outbox under `root`.
    pub fn new(root: impl Into<PathBuf>, silent: bool) -> Self {
        Self {
            root: root.into(),
            silent,
        }
    }

    /// Outbox root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, now: DateTime<Utc>) -> PathBuf {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        self.root
            .join(format!("{}-{}", now.format("%Y%m%dT%H%M%SZ"), &suffix[..8]))
    }
}

#[async_trait]
impl Delivery for OutboxDelivery {
    async fn send(&self, destination: &ChatRef, files: &[PathBuf], caption: &str) -> Result<DeliveryReceipt> {
        let created_at = Utc::now();
        let dir = self.entry_dir(created_at);
        tokio::fs::create_dir_all(&dir).await?;

        let mut names = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("file{index}.png"));
            tokio::fs::copy(file, dir.join(&name)).await.map_err(|e| {
                warn!(file = %file.display(), error = %e, "Cannot copy report file into outbox");
                AlertStatError::Io(e)
            })?;
            names.push(name);
        }

        tokio::fs::write(dir.join(CAPTION_FILE), caption).await?;

        let manifest = OutboxManifest {
            destination: destination.clone(),
            silent: self.silent,
            caption_file: CAPTION_FILE.to_string(),
            files: names,
            created_at,
        };
        tokio::fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?).await?;

        info!(%destination, dir = %dir.display(), "Report queued in outbox");
        Ok(DeliveryReceipt::Queued { dir })
    }

    fn name(&self) -> &'static str {
        "outbox"
    }
}
