use std::time::Duration;

use notifier_core::OutboundMessage;

/// Resolved chat destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub channel_id: u64,
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("channel {channel_id} is unavailable (http status {status})")]
    ChannelUnavailable { channel_id: u64, status: u16 },
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Chat-platform side of the pipeline.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Looks up the configured destination channel.
    async fn resolve_destination(&self) -> Result<Destination, PublishError>;

    /// Sends one announcement. Implementations wait out platform rate limits;
    /// any other failure is reported to the caller.
    async fn publish(
        &self,
        destination: &Destination,
        message: &OutboundMessage,
    ) -> Result<(), PublishError>;
}
