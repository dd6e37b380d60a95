//! Channel publisher: the retry loop around a channel session, with typed
//! recovery paths for media failures and flood control.

mod error;
mod retry;
mod telegram;

pub use self::error::{MessageHandle, SendError};
pub use self::retry::RetryPolicy;
pub use self::telegram::{ChannelSession, TelegramSession};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::TARGET_PUBLISH;

pub struct Publisher<S: ChannelSession> {
    session: S,
    policy: RetryPolicy,
}

impl<S: ChannelSession> Publisher<S> {
    pub fn new(session: S, policy: RetryPolicy) -> Self {
        Publisher { session, policy }
    }

    /// Delivers one post. With an image the message goes out as a photo with
    /// the text as caption; media rejections fall back to a plain text send
    /// so a broken image never loses the post. Flood-control pauses honor
    /// the server-mandated delay and do not consume delivery attempts.
    pub async fn publish(
        &self,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<MessageHandle, SendError> {
        let mut attempt: u32 = 0;
        let mut flood_pauses: u32 = 0;
        let mut image = image_url;

        while attempt < self.policy.max_attempts {
            let result = match image {
                Some(url) => self.session.send_photo(url, text).await,
                None => self.session.send_text(text).await,
            };

            let err = match result {
                Ok(handle) => {
                    info!(target: TARGET_PUBLISH, "Message delivered: id {}", handle.id);
                    return Ok(handle);
                }
                Err(err) => err,
            };

            match err {
                SendError::RateLimited(secs) => {
                    flood_pauses += 1;
                    if flood_pauses > self.policy.max_flood_pauses {
                        return Err(SendError::Other(
                            "too many rate limit pauses in one publish".to_string(),
                        ));
                    }
                    warn!(
                        target: TARGET_PUBLISH,
                        "Rate limited, pausing {}s before resending", secs
                    );
                    sleep(tokio::time::Duration::from_secs(secs) + self.policy.flood_grace).await;
                }
                SendError::InvalidMedia(_) | SendError::MediaFetchFailed(_)
                    if image.is_some() =>
                {
                    warn!(
                        target: TARGET_PUBLISH,
                        "Photo send failed ({}), falling back to text", err
                    );
                    image = None;
                    match self.session.send_text(text).await {
                        Ok(handle) => {
                            info!(target: TARGET_PUBLISH, "Text fallback delivered: id {}", handle.id);
                            return Ok(handle);
                        }
                        Err(SendError::RateLimited(secs)) => {
                            flood_pauses += 1;
                            if flood_pauses > self.policy.max_flood_pauses {
                                return Err(SendError::Other(
                                    "too many rate limit pauses in one publish".to_string(),
                                ));
                            }
                            sleep(
                                tokio::time::Duration::from_secs(secs) + self.policy.flood_grace,
                            )
                            .await;
                        }
                        Err(fallback_err) => {
                            warn!(
                                target: TARGET_PUBLISH,
                                "Text fallback also failed: {}", fallback_err
                            );
                            attempt += 1;
                            if attempt < self.policy.max_attempts {
                                sleep(self.policy.backoff(attempt)).await;
                            }
                        }
                    }
                }
                SendError::CaptionTooLong if image.is_some() => {
                    warn!(
                        target: TARGET_PUBLISH,
                        "Caption over the media limit, falling back to text"
                    );
                    // The text limit is four times the caption limit; if the
                    // fallback fails too there is nothing left to shrink.
                    return self.session.send_text(text).await;
                }
                other => {
                    warn!(
                        target: TARGET_PUBLISH,
                        "Send attempt {} failed: {}", attempt + 1, other
                    );
                    attempt += 1;
                    if attempt < self.policy.max_attempts {
                        sleep(self.policy.backoff(attempt)).await;
                    }
                }
            }
        }

        Err(SendError::Other("all retry attempts exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct FakeSession {
        responses: Mutex<VecDeque<Result<MessageHandle, SendError>>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeSession {
        fn scripted(responses: Vec<Result<MessageHandle, SendError>>) -> Self {
            FakeSession {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, kind: &'static str) -> Result<MessageHandle, SendError> {
            self.calls.lock().unwrap().push(kind);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SendError::Other("script exhausted".to_string())))
        }
    }

    #[async_trait]
    impl ChannelSession for &FakeSession {
        async fn send_text(&self, _text: &str) -> Result<MessageHandle, SendError> {
            self.next("text")
        }
        async fn send_photo(
            &self,
            _photo_url: &str,
            _caption: &str,
        ) -> Result<MessageHandle, SendError> {
            self.next("photo")
        }
    }

    fn ok(id: i64) -> Result<MessageHandle, SendError> {
        Ok(MessageHandle { id })
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_media_falls_back_to_text_once() {
        let session = FakeSession::scripted(vec![
            Err(SendError::InvalidMedia("bad photo".to_string())),
            ok(7),
        ]);
        let publisher = Publisher::new(&session, RetryPolicy::default());

        let handle = publisher
            .publish("hello", Some("https://cdn.example.com/x.jpg"))
            .await
            .unwrap();

        assert_eq!(handle.id, 7);
        assert_eq!(*session.calls.lock().unwrap(), vec!["photo", "text"]);
    }

    #[tokio::test(start_paused = true)]
    async fn media_fetch_failure_retries_without_the_image() {
        let session = FakeSession::scripted(vec![
            Err(SendError::MediaFetchFailed("curl failed".to_string())),
            Err(SendError::Other("server hiccup".to_string())),
            ok(9),
        ]);
        let publisher = Publisher::new(&session, RetryPolicy::default());

        let handle = publisher
            .publish("hello", Some("https://cdn.example.com/x.jpg"))
            .await
            .unwrap();

        assert_eq!(handle.id, 9);
        // After the media failure the image is dropped for good.
        assert_eq!(*session.calls.lock().unwrap(), vec!["photo", "text", "text"]);
    }

    #[tokio::test(start_paused = true)]
    async fn caption_too_long_fallback_failure_is_terminal() {
        let session = FakeSession::scripted(vec![
            Err(SendError::CaptionTooLong),
            Err(SendError::Other("still broken".to_string())),
        ]);
        let publisher = Publisher::new(&session, RetryPolicy::default());

        let result = publisher
            .publish("hello", Some("https://cdn.example.com/x.jpg"))
            .await;

        assert!(result.is_err());
        // No third send after the fallback failed.
        assert_eq!(session.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_without_consuming_attempts() {
        let session = FakeSession::scripted(vec![
            Err(SendError::RateLimited(30)),
            Err(SendError::RateLimited(30)),
            ok(3),
        ]);
        let publisher = Publisher::new(&session, RetryPolicy::default());

        let start = Instant::now();
        let handle = publisher.publish("hello", None).await.unwrap();
        let waited = start.elapsed();

        assert_eq!(handle.id, 3);
        // Two pauses of at least the mandated 30s plus grace each.
        assert!(waited >= tokio::time::Duration::from_secs(70));
        assert_eq!(session.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn endless_rate_limiting_is_bounded() {
        let session = FakeSession::scripted(vec![
            Err(SendError::RateLimited(1)),
            Err(SendError::RateLimited(1)),
            Err(SendError::RateLimited(1)),
            Err(SendError::RateLimited(1)),
        ]);
        let publisher = Publisher::new(&session, RetryPolicy::default());

        let result = publisher.publish("hello", None).await;

        assert!(result.is_err());
        // max_flood_pauses is 3; the fourth rate limit aborts.
        assert_eq!(session.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_failures_exhaust_after_max_attempts() {
        let session = FakeSession::scripted(vec![
            Err(SendError::Other("boom".to_string())),
            Err(SendError::Other("boom".to_string())),
            Err(SendError::Other("boom".to_string())),
        ]);
        let publisher = Publisher::new(&session, RetryPolicy::default());

        let result = publisher.publish("hello", None).await;

        assert!(matches!(result, Err(SendError::Other(_))));
        assert_eq!(session.calls.lock().unwrap().len(), 3);
    }
}
