//! Raw HTTP calls to the Telegram Bot API.
//!
//! Wraps reqwest for `getMe`, `sendMessage`, `sendPhoto`, `sendMediaGroup`,
//! `copyMessage` and `getUpdates`. Every call shares one client with a
//! bounded request timeout.

use alertstat_common::{AlertStatError, ChatRef, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{ApiResponse, InputMediaPhoto, SentMessage, Update, User};

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Low-level Telegram Bot API client.
pub struct BotApi {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The base URL embeds the token.
        f.debug_struct("BotApi").finish_non_exhaustive()
    }
}

impl BotApi {
    /// Create a new API client for the given bot token.
    pub fn new(bot_token: &str, timeout: Duration) -> Result<Self> {
        Self::with_base_url(bot_token, DEFAULT_API_URL, timeout)
    }

    /// Create a new API client with a custom base URL (for testing).
    pub fn with_base_url(bot_token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        debug!(method, "Bot API call");
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        Self::parse(method, response).await
    }

    async fn call_multipart<T: DeserializeOwned>(&self, method: &str, form: Form) -> Result<T> {
        debug!(method, "Bot API multipart call");
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;
        Self::parse(method, response).await
    }

    async fn parse<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(method, status = status.as_u16(), body = %body, "Bot API request failed");
            return Err(AlertStatError::http_status(status.as_u16(), body));
        }

        let parsed: ApiResponse<T> = serde_json::from_str(&body)?;
        if !parsed.ok {
            let description = parsed.description.unwrap_or_default();
            warn!(method, error_code = ?parsed.error_code, "Bot API returned an error: {description}");
            return Err(AlertStatError::telegram(description, parsed.error_code));
        }
        parsed
            .result
            .ok_or_else(|| AlertStatError::telegram(format!("{method} returned no result"), None))
    }

    /// Identity of the bot behind the token.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    /// Send a text message.
    pub async fn send_message(&self, chat: &ChatRef, text: &str, silent: bool) -> Result<SentMessage> {
        let body = json!({
            "chat_id": chat_id_value(chat),
            "text": text,
            "disable_notification": silent,
        });
        self.call("sendMessage", &body).await
    }

    /// Upload a single photo with an optional caption.
    pub async fn send_photo(
        &self,
        chat: &ChatRef,
        path: &Path,
        caption: Option<&str>,
        silent: bool,
    ) -> Result<SentMessage> {
        let mut form = Form::new()
            .text("chat_id", chat_id_text(chat))
            .text("disable_notification", silent.to_string())
            .part("photo", file_part(path).await?);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }
        self.call_multipart("sendPhoto", form).await
    }

    /// Upload 2-10 photos as one album, caption attached to the first.
    pub async fn send_media_group(
        &self,
        chat: &ChatRef,
        files: &[PathBuf],
        caption: &str,
        silent: bool,
    ) -> Result<Vec<SentMessage>> {
        let mut media = Vec::with_capacity(files.len());
        let mut form = Form::new()
            .text("chat_id", chat_id_text(chat))
            .text("disable_notification", silent.to_string());

        for (index, path) in files.iter().enumerate() {
            let part_name = format!("file{index}");
            let item_caption = (index == 0).then(|| caption.to_string());
            media.push(InputMediaPhoto::attached(&part_name, item_caption));
            form = form.part(part_name, file_part(path).await?);
        }

        form = form.text("media", serde_json::to_string(&media)?);
        self.call_multipart("sendMediaGroup", form).await
    }

    /// Copy a message without the forward header. Media is kept.
    pub async fn copy_message(
        &self,
        to: &ChatRef,
        from_chat_id: i64,
        message_id: i64,
        silent: bool,
    ) -> Result<SentMessage> {
        let body = json!({
            "chat_id": chat_id_value(to),
            "from_chat_id": from_chat_id,
            "message_id": message_id,
            "disable_notification": silent,
        });
        self.call("copyMessage", &body).await
    }

    /// Long-poll for new messages and channel posts.
    ///
    /// `offset` should be set to `last_update_id + 1` to acknowledge
    /// previously received updates.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "channel_post"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }
}

/// `chat_id` as JSON: a number for numeric ids, `@username` otherwise.
pub fn chat_id_value(chat: &ChatRef) -> Value {
    match chat.numeric_id() {
        Some(id) => json!(id),
        None => json!(chat_id_text(chat)),
    }
}

/// `chat_id` as a form field.
pub fn chat_id_text(chat: &ChatRef) -> String {
    match (chat.numeric_id(), chat.username()) {
        (Some(id), _) => id.to_string(),
        (None, Some(username)) => format!("@{username}"),
        (None, None) => chat.as_str().to_string(),
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_forms() {
        assert_eq!(chat_id_value(&ChatRef::new("-1001234567890")), json!(-1001234567890_i64));
        assert_eq!(chat_id_value(&ChatRef::new("@vodokanal")), json!("@vodokanal"));
        assert_eq!(chat_id_text(&ChatRef::new("vodokanal")), "@vodokanal");
        assert_eq!(chat_id_text(&ChatRef::new("https://t.me/vodokanal")), "@vodokanal");
        assert_eq!(chat_id_text(&ChatRef::new("42")), "42");
    }

    #[test]
    fn test_method_url_embeds_token() {
        let api = BotApi::with_base_url("123:abc", "http://localhost:8081/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
        assert!(!format!("{api:?}").contains("123:abc"));
    }

    #[tokio::test]
    async fn test_file_part_missing_file_is_io_error() {
        let result = file_part(Path::new("/nonexistent/stat.png")).await;
        assert!(matches!(result, Err(AlertStatError::Io(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let api = BotApi::with_base_url("t", "http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = api.get_me().await;
        assert!(matches!(result, Err(AlertStatError::Network { .. })));
    }
}
