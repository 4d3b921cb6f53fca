//! Message source seam for the statistics pipeline.

use alertstat_common::{ChatRef, Message, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A channel's history ready for scanning.
pub struct ChannelHistory {
    /// Display title of the channel.
    pub title: String,
    /// Messages, newest first.
    pub messages: BoxStream<'static, Message>,
}

impl std::fmt::Debug for ChannelHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHistory")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Provides the history of a channel.
///
/// Implementations must yield messages with non-increasing timestamps
/// (newest first). The aggregator stops at the first message older than its
/// window and never looks further, so an out-of-order source silently loses
/// messages. The ordering is not validated.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Resolves `channel` and opens its history.
    async fn open(&self, channel: &ChatRef) -> Result<ChannelHistory>;

    /// Gets the name of this source.
    fn name(&self) -> &'static str;
}
