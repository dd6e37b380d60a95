//! Telegram Bot API channel session.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::{MessageHandle, SendError};
use crate::config::Config;
use crate::TARGET_PUBLISH;

/// The delivery capability: text or photo out, message handle back. The
/// publish loop is written against this so it can be exercised with a
/// scripted fake.
#[async_trait]
pub trait ChannelSession: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<MessageHandle, SendError>;
    async fn send_photo(&self, photo_url: &str, caption: &str)
        -> Result<MessageHandle, SendError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<ApiMessage>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ApiParameters>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// Maps a Bot API rejection onto the typed error taxonomy. Unrecognized
/// descriptions fall through to Other.
fn classify(error_code: Option<i64>, description: &str, retry_after: Option<u64>) -> SendError {
    if error_code == Some(429) {
        return SendError::RateLimited(retry_after.unwrap_or(30));
    }

    let lower = description.to_lowercase();
    if lower.contains("caption is too long") || lower.contains("media_caption_too_long") {
        return SendError::CaptionTooLong;
    }
    if lower.contains("webpage_curl_failed") || lower.contains("failed to get http url content") {
        return SendError::MediaFetchFailed(description.to_string());
    }
    if lower.contains("wrong file identifier")
        || lower.contains("photo_invalid_dimensions")
        || lower.contains("wrong type of the web page content")
    {
        return SendError::InvalidMedia(description.to_string());
    }

    SendError::Other(description.to_string())
}

// Link previews stay enabled; the source link in the post body is meant to
// unfurl in the channel.
fn text_message_body(chat_id: &str, text: &str) -> serde_json::Value {
    json!({
        "chat_id": chat_id,
        "text": text,
        "parse_mode": "HTML",
    })
}

fn photo_message_body(chat_id: &str, photo_url: &str, caption: &str) -> serde_json::Value {
    json!({
        "chat_id": chat_id,
        "photo": photo_url,
        "caption": caption,
        "parse_mode": "HTML",
    })
}

pub struct TelegramSession {
    client: Client,
    api_base: String,
    chat_id: String,
    request_timeout: Duration,
}

impl TelegramSession {
    pub fn new(config: &Config) -> Self {
        TelegramSession {
            client: Client::new(),
            api_base: format!("https://api.telegram.org/bot{}", config.bot_token),
            chat_id: config.chat_id.clone(),
            request_timeout: config.request_timeout,
        }
    }

    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<MessageHandle, SendError> {
        let url = format!("{}/{}", self.api_base, method);
        debug!(target: TARGET_PUBLISH, "Calling {} on chat {}", method, self.chat_id);

        let response = timeout(self.request_timeout, self.client.post(&url).json(&body).send())
            .await
            .map_err(|_| SendError::Other(format!("{} request timed out", method)))?
            .map_err(|err| SendError::Other(err.to_string()))?;

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|err| SendError::Other(format!("malformed API response: {}", err)))?;

        if parsed.ok {
            return parsed
                .result
                .map(|message| MessageHandle {
                    id: message.message_id,
                })
                .ok_or_else(|| SendError::Other("ok response without a message".to_string()));
        }

        Err(classify(
            parsed.error_code,
            parsed.description.as_deref().unwrap_or_default(),
            parsed.parameters.and_then(|p| p.retry_after),
        ))
    }
}

#[async_trait]
impl ChannelSession for TelegramSession {
    async fn send_text(&self, text: &str) -> Result<MessageHandle, SendError> {
        self.call("sendMessage", text_message_body(&self.chat_id, text))
            .await
    }

    async fn send_photo(
        &self,
        photo_url: &str,
        caption: &str,
    ) -> Result<MessageHandle, SendError> {
        self.call(
            "sendPhoto",
            photo_message_body(&self.chat_id, photo_url, caption),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_control_maps_to_rate_limited() {
        let err = classify(Some(429), "Too Many Requests: retry after 47", Some(47));
        assert_eq!(err, SendError::RateLimited(47));
        // Missing retry_after falls back to a conservative default.
        assert_eq!(
            classify(Some(429), "Too Many Requests", None),
            SendError::RateLimited(30)
        );
    }

    #[test]
    fn caption_errors_map_to_caption_too_long() {
        assert_eq!(
            classify(Some(400), "Bad Request: MEDIA_CAPTION_TOO_LONG", None),
            SendError::CaptionTooLong
        );
        assert_eq!(
            classify(Some(400), "Bad Request: message caption is too long", None),
            SendError::CaptionTooLong
        );
    }

    #[test]
    fn fetch_failures_and_bad_media_are_distinguished() {
        assert!(matches!(
            classify(Some(400), "Bad Request: WEBPAGE_CURL_FAILED", None),
            SendError::MediaFetchFailed(_)
        ));
        assert!(matches!(
            classify(Some(400), "Bad Request: failed to get HTTP URL content", None),
            SendError::MediaFetchFailed(_)
        ));
        assert!(matches!(
            classify(Some(400), "Bad Request: wrong file identifier/HTTP URL specified", None),
            SendError::InvalidMedia(_)
        ));
        assert!(matches!(
            classify(Some(400), "Bad Request: PHOTO_INVALID_DIMENSIONS", None),
            SendError::InvalidMedia(_)
        ));
    }

    #[test]
    fn text_messages_keep_link_previews_enabled() {
        let body = text_message_body("@chan", "hello <b>world</b>");
        assert_eq!(body["parse_mode"], "HTML");
        assert_eq!(body["text"], "hello <b>world</b>");
        assert!(body.get("disable_web_page_preview").is_none());
    }

    #[test]
    fn photo_messages_carry_caption_and_parse_mode() {
        let body = photo_message_body("@chan", "https://cdn.example.com/a.jpg", "cap");
        assert_eq!(body["photo"], "https://cdn.example.com/a.jpg");
        assert_eq!(body["caption"], "cap");
        assert_eq!(body["parse_mode"], "HTML");
    }

    #[test]
    fn unknown_rejections_fall_through_to_other() {
        assert!(matches!(
            classify(Some(403), "Forbidden: bot was kicked from the channel", None),
            SendError::Other(_)
        ));
    }
}
