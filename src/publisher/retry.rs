use tokio::time::Duration;

/// Knobs for the publish retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delivery attempts before giving up. Rate-limit pauses are tracked
    /// separately and do not count against this.
    pub max_attempts: u32,
    /// Base of the exponential backoff between attempts, in seconds.
    pub backoff_base_secs: u64,
    /// Extra wait added on top of the server-mandated flood delay.
    pub flood_grace: Duration,
    /// Rate-limit pauses tolerated within one publish before giving up.
    pub max_flood_pauses: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff_base_secs: 2,
            flood_grace: Duration::from_secs(5),
            max_flood_pauses: 3,
        }
    }
}

impl RetryPolicy {
    /// Backoff before the given attempt number (1-based after the first
    /// failure): base^attempt seconds.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.backoff_base_secs.pow(attempt))
    }
}
