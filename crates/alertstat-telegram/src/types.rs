//! Serde types for the Telegram Bot API.
//!
//! Only the fields alertstat reads are deserialized; everything else is
//! ignored.

use alertstat_common::MediaKind;
use serde::{Deserialize, Serialize};

/// Generic Telegram API response wrapper.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Human-readable error.
    pub description: Option<String>,
    /// Numeric error code.
    pub error_code: Option<i64>,
    /// Payload on success.
    pub result: Option<T>,
}

/// A Telegram Update object from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id.
    pub update_id: i64,
    /// New message in a private chat or group.
    pub message: Option<TgMessage>,
    /// New post in a channel.
    pub channel_post: Option<TgMessage>,
}

impl Update {
    /// The message carried by the update, whichever kind it is.
    pub fn into_message(self) -> Option<TgMessage> {
        self.message.or(self.channel_post)
    }
}

/// A Telegram message, reduced to what forwarding needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TgMessage {
    /// Message id within the chat.
    pub message_id: i64,
    /// Chat the message was posted in.
    #[serde(default)]
    pub chat: Chat,
    /// Unix time of posting.
    #[serde(default)]
    pub date: i64,
    /// Text of a text message.
    pub text: Option<String>,
    /// Caption of a media message.
    pub caption: Option<String>,
    /// Photo sizes, present for photos.
    pub photo: Option<Vec<serde_json::Value>>,
    /// Present for videos.
    pub video: Option<serde_json::Value>,
    /// Present for voice notes.
    pub voice: Option<serde_json::Value>,
    /// Present for audio tracks.
    pub audio: Option<serde_json::Value>,
    /// Present for generic files.
    pub document: Option<serde_json::Value>,
}

impl TgMessage {
    /// Text or caption, empty when neither is set.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or_default()
    }

    /// Kind of attached media.
    pub fn media(&self) -> Option<MediaKind> {
        if self.photo.is_some() {
            Some(MediaKind::Photo)
        } else if self.video.is_some() {
            Some(MediaKind::Video)
        } else if self.voice.is_some() {
            Some(MediaKind::Voice)
        } else if self.audio.is_some() {
            Some(MediaKind::Audio)
        } else if self.document.is_some() {
            Some(MediaKind::Document)
        } else {
            None
        }
    }
}

/// A Telegram Chat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    /// Chat id.
    pub id: i64,
    /// Chat kind: private, group, supergroup or channel.
    #[serde(rename = "type", default)]
    pub chat_type: String,
    /// Title of groups and channels.
    pub title: Option<String>,
    /// Public username without `@`.
    pub username: Option<String>,
}

/// A Telegram User, as returned by `getMe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: i64,
    /// Whether this is a bot account.
    #[serde(default)]
    pub is_bot: bool,
    /// First name or bot display name.
    pub first_name: String,
    /// Username without `@`.
    pub username: Option<String>,
}

/// Sent message result; only the id is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    /// Id of the new message.
    pub message_id: i64,
}

/// One item of a `sendMediaGroup` album.
#[derive(Debug, Clone, Serialize)]
pub struct InputMediaPhoto {
    /// Always `photo`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `attach://<part name>` reference to an uploaded part.
    pub media: String,
    /// Caption, set on the first item only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl InputMediaPhoto {
    /// Photo referencing the multipart part `part_name`.
    pub fn attached(part_name: &str, caption: Option<String>) -> Self {
        Self {
            kind: "photo",
            media: format!("attach://{part_name}"),
            caption,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_channel_post_update() {
        let json = r#"{
            "update_id": 10,
            "channel_post": {
                "message_id": 77,
                "chat": {"id": -1001234567890, "type": "channel", "title": "Водоканал", "username": "vodokanal"},
                "date": 1715000000,
                "caption": "Аварийные работы",
                "photo": [{"file_id": "a", "width": 90, "height": 90}]
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.into_message().unwrap();
        assert_eq!(message.message_id, 77);
        assert_eq!(message.chat.id, -1001234567890);
        assert_eq!(message.chat.username.as_deref(), Some("vodokanal"));
        assert_eq!(message.body(), "Аварийные работы");
        assert_eq!(message.media(), Some(MediaKind::Photo));
    }

    #[test]
    fn test_deserialize_api_response_error() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.error_code, Some(401));
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_serialize_media_group_items() {
        let items = vec![
            InputMediaPhoto::attached("file0", Some("caption".to_string())),
            InputMediaPhoto::attached("file1", None),
        ];
        let json = serde_json::to_string(&items).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"photo","media":"attach://file0","caption":"caption"},{"type":"photo","media":"attach://file1"}]"#
        );
    }

    #[test]
    fn test_text_message_has_no_media() {
        let message = TgMessage {
            text: Some("работы продлены".to_string()),
            ..Default::default()
        };
        assert_eq!(message.body(), "работы продлены");
        assert_eq!(message.media(), None);
    }
}
