use thiserror::Error;

/// Failure modes of a channel send, classified so the retry loop can pick
/// the right recovery for each.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    /// The channel rejected the media itself (bad dimensions, bad file id).
    #[error("channel rejected the media: {0}")]
    InvalidMedia(String),

    /// The channel could not download the media from its URL.
    #[error("channel failed to fetch the media: {0}")]
    MediaFetchFailed(String),

    /// The caption exceeds the channel's limit for media messages.
    #[error("caption exceeds the channel limit")]
    CaptionTooLong,

    /// Flood control. The payload is the server-mandated wait in seconds.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Anything else: network failures, server errors, unknown rejections.
    #[error("send failed: {0}")]
    Other(String),
}

/// Identifier of a successfully delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub id: i64,
}
