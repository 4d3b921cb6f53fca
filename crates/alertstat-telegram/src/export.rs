//! Message source backed by a Telegram Desktop channel export.
//!
//! Telegram Desktop writes a `result.json` with the channel `name`, its `id`
//! (without the `-100` channel prefix) and the messages oldest first. The
//! source re-reads the file on every scan so a refreshed export is picked up
//! by the next report.

use alertstat_common::{AlertStatError, ChatRef, MediaKind, Message, MessageTimestamp, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use futures::StreamExt;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::source::{ChannelHistory, MessageSource};

/// Offset between a channel's bare id and its Bot API `-100...` form.
const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

#[derive(Debug, Deserialize)]
struct ExportFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    messages: Vec<ExportMessage>,
}

#[derive(Debug, Deserialize)]
struct ExportMessage {
    id: i64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    date_unixtime: Option<String>,
    #[serde(default, deserialize_with = "field_present")]
    forwarded_from: bool,
    #[serde(default)]
    text: ExportText,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    file: Option<String>,
}

/// Any value, `null` included, marks the field as present.
fn field_present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportText {
    Plain(String),
    Rich(Vec<TextPart>),
}

impl Default for ExportText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextPart {
    Plain(String),
    Entity { text: String },
}

impl ExportText {
    fn into_string(self) -> String {
        match self {
            Self::Plain(text) => text,
            Self::Rich(parts) => parts
                .into_iter()
                .map(|part| match part {
                    TextPart::Plain(text) | TextPart::Entity { text } => text,
                })
                .collect(),
        }
    }
}

impl ExportMessage {
    fn timestamp(&self) -> Option<MessageTimestamp> {
        if let Some(seconds) = self.date_unixtime.as_deref().and_then(|raw| raw.parse::<i64>().ok()) {
            if let Some(at) = DateTime::from_timestamp(seconds, 0) {
                return Some(at.into());
            }
        }
        self.date
            .as_deref()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
            .map(MessageTimestamp::from)
    }

    fn media(&self) -> Option<MediaKind> {
        if self.photo.is_some() {
            return Some(MediaKind::Photo);
        }
        match self.media_type.as_deref() {
            Some("video_file" | "animation" | "video_message") => Some(MediaKind::Video),
            Some("voice_message") => Some(MediaKind::Voice),
            Some("audio_file") => Some(MediaKind::Audio),
            Some(_) => Some(MediaKind::Document),
            None => self.file.as_ref().map(|_| MediaKind::Document),
        }
    }

    fn into_message(self) -> Message {
        let timestamp = self.timestamp();
        let media = self.media();
        Message {
            id: self.id,
            timestamp,
            is_forwarded: self.forwarded_from,
            media,
            text: self.text.into_string(),
        }
    }
}

/// Whether a configured numeric chat id names the exported channel.
fn same_channel(configured: i64, exported: i64) -> bool {
    configured == exported || configured == -CHANNEL_ID_OFFSET - exported
}

/// Reads channel history from a Telegram Desktop JSON export.
#[derive(Debug, Clone)]
pub struct ExportFileSource {
    path: PathBuf,
}

impl ExportFileSource {
    /// Source reading the export at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the export file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the export, checks it belongs to `channel` and returns its
    /// title and messages newest first.
    pub async fn load(&self, channel: &ChatRef) -> Result<(String, Vec<Message>)> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AlertStatError::source_with_source(format!("Cannot read export {}", self.path.display()), e)
        })?;
        let export: ExportFile = serde_json::from_str(&raw).map_err(|e| {
            AlertStatError::source_with_source(format!("Malformed export {}", self.path.display()), e)
        })?;

        if let (Some(configured), Some(exported)) = (channel.numeric_id(), export.id) {
            if !same_channel(configured, exported) {
                return Err(AlertStatError::source(format!(
                    "Export {} belongs to channel {exported}, not {channel}",
                    self.path.display()
                )));
            }
        }

        let title = export.name.unwrap_or_else(|| channel.to_string());
        if channel.numeric_id().is_none() {
            debug!(%channel, title = %title, "Channel given by name; export accepted without id check");
        }

        let mut messages: Vec<Message> = export
            .messages
            .into_iter()
            .filter(|message| message.kind.is_empty() || message.kind == "message")
            .map(ExportMessage::into_message)
            .collect();
        messages.reverse();

        info!(
            path = %self.path.display(),
            title = %title,
            messages = messages.len(),
            "Loaded channel export"
        );
        Ok((title, messages))
    }
}

#[async_trait]
impl MessageSource for ExportFileSource {
    async fn open(&self, channel: &ChatRef) -> Result<ChannelHistory> {
        let (title, messages) = self.load(channel).await?;
        Ok(ChannelHistory {
            title,
            messages: futures::stream::iter(messages).boxed(),
        })
    }

    fn name(&self) -> &'static str {
        "export_file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertstat_common::test_utils::mock_timestamp;

    fn parse(json: &str) -> Message {
        serde_json::from_str::<ExportMessage>(json).unwrap().into_message()
    }

    #[test]
    fn test_unixtime_preferred_over_local_date() {
        let message = parse(
            r#"{"id": 1, "type": "message", "date": "2024-05-08T15:00:00", "date_unixtime": "1715169600", "text": "до 17-00"}"#,
        );
        assert_eq!(message.utc_timestamp(), Some(mock_timestamp(2024, 5, 8, 12, 0, 0)));
    }

    #[test]
    fn test_naive_date_fallback() {
        let message = parse(r#"{"id": 1, "type": "message", "date": "2024-05-08T15:00:00", "text": ""}"#);
        assert_eq!(message.utc_timestamp(), Some(mock_timestamp(2024, 5, 8, 15, 0, 0)));
        assert!(matches!(message.timestamp, Some(MessageTimestamp::Naive(_))));
    }

    #[test]
    fn test_missing_date() {
        let message = parse(r#"{"id": 1, "type": "message", "text": "x"}"#);
        assert_eq!(message.timestamp, None);
    }

    #[test]
    fn test_forwarded_from_null_still_counts_as_forward() {
        assert!(parse(r#"{"id": 1, "forwarded_from": null, "text": "x"}"#).is_forwarded);
        assert!(parse(r#"{"id": 1, "forwarded_from": "Канал", "text": "x"}"#).is_forwarded);
        assert!(!parse(r#"{"id": 1, "text": "x"}"#).is_forwarded);
    }

    #[test]
    fn test_rich_text_is_flattened() {
        let message = parse(
            r#"{"id": 1, "text": ["Отключение ", {"type": "bold", "text": "до 17-00"}, " #полезное"]}"#,
        );
        assert_eq!(message.text, "Отключение до 17-00 #полезное");
    }

    #[test]
    fn test_media_kinds() {
        assert_eq!(parse(r#"{"id": 1, "photo": "photos/1.jpg"}"#).media, Some(MediaKind::Photo));
        assert_eq!(
            parse(r#"{"id": 1, "media_type": "voice_message", "file": "v.ogg"}"#).media,
            Some(MediaKind::Voice)
        );
        assert_eq!(
            parse(r#"{"id": 1, "media_type": "video_file", "file": "v.mp4"}"#).media,
            Some(MediaKind::Video)
        );
        assert_eq!(parse(r#"{"id": 1, "file": "a.pdf"}"#).media, Some(MediaKind::Document));
        assert_eq!(parse(r#"{"id": 1, "text": "x"}"#).media, None);
    }

    #[test]
    fn test_channel_id_with_prefix() {
        assert!(same_channel(-1001234567890, 1234567890));
        assert!(same_channel(1234567890, 1234567890));
        assert!(!same_channel(-1001234567891, 1234567890));
    }
}
