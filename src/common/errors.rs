use thiserror::Error;

/// Failures crossing the track-resolver boundary.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The query or locator matched nothing.
    #[error("no result for the given query")]
    NotFound,
    /// The resolver backend is down or misbehaving.
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

/// Failures crossing the voice-transport boundary.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// Binding did not become ready within the configured deadline.
    #[error("voice binding timed out")]
    ConnectTimeout,
    #[error("voice binding failed: {0}")]
    ConnectFailed(String),
    /// The transport rejected or lost an audio stream mid-flight.
    #[error("playback error: {0}")]
    Playback(String),
}
