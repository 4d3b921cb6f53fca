//! Common type definitions and newtype wrappers for domain modeling.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a Telegram chat: either `@username` or a numeric id such as `-1001234567890`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatRef(String);

impl ChatRef {
    /// Creates a chat reference from a raw identifier, trimming whitespace.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// Raw identifier as passed to the Bot API `chat_id` parameter.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric chat id, if the reference is numeric.
    pub fn numeric_id(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Username without the leading `@`, if the reference is not numeric.
    pub fn username(&self) -> Option<&str> {
        if self.numeric_id().is_some() || self.0.is_empty() {
            return None;
        }
        let name = self.0.strip_prefix('@').unwrap_or(&self.0);
        let name = name.strip_prefix("https://t.me/").unwrap_or(name);
        Some(name)
    }

    /// Whether a chat with the given id and optional username is the one referenced.
    pub fn matches(&self, chat_id: i64, chat_username: Option<&str>) -> bool {
        if let Some(id) = self.numeric_id() {
            return id == chat_id;
        }
        match (self.username(), chat_username) {
            (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
            _ => false,
        }
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatRef {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A message timestamp as delivered by the source, naive or zone-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTimestamp {
    /// No zone information; treated as UTC.
    Naive(NaiveDateTime),
    /// Zone-aware point in time.
    Aware(DateTime<FixedOffset>),
}

impl MessageTimestamp {
    /// Normalizes the timestamp to UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Naive(naive) => naive.and_utc(),
            Self::Aware(aware) => aware.with_timezone(&Utc),
        }
    }
}

impl From<DateTime<Utc>> for MessageTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Aware(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for MessageTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

/// Kind of media attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Compressed photo.
    Photo,
    /// Video, animation or round video note.
    Video,
    /// Voice note.
    Voice,
    /// Audio track.
    Audio,
    /// Any other file.
    Document,
}

/// A channel message as consumed by the statistics pipeline. Read-only for the core.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Message id within its chat.
    pub id: i64,
    /// Posting time; `None` when the source could not provide one.
    pub timestamp: Option<MessageTimestamp>,
    /// Text or caption, empty when absent.
    pub text: String,
    /// Set when the message is a forward of another post.
    pub is_forwarded: bool,
    /// Attached media, if any.
    pub media: Option<MediaKind>,
}

impl Message {
    /// Creates a plain text message.
    pub fn new(id: i64, timestamp: impl Into<MessageTimestamp>, text: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: Some(timestamp.into()),
            text: text.into(),
            is_forwarded: false,
            media: None,
        }
    }

    /// Marks the message as a forward.
    #[must_use]
    pub fn forwarded(mut self) -> Self {
        self.is_forwarded = true;
        self
    }

    /// Attaches media to the message.
    #[must_use]
    pub fn with_media(mut self, media: MediaKind) -> Self {
        self.media = Some(media);
        self
    }

    /// Posting time normalized to UTC.
    pub fn utc_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().map(MessageTimestamp::to_utc)
    }

    /// Whether any media is attached.
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}
