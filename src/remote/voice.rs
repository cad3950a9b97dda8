use std::sync::Arc;

use async_trait::async_trait;

use super::source::AudioSource;
use crate::common::{ChannelId, VoiceError};

/// Playback lifecycle states exposed by a playback handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

/// Why a playback resource reached its terminal condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The stream played out to its natural end.
    Finished,
    /// The transport reported a mid-stream fault. Treated like `Finished`
    /// for advancement purposes.
    Errored(String),
    /// `stop()` was called on the handle (explicit stop or skip).
    Stopped,
}

/// The external real-time audio transport.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Acquire a live binding to a voice channel. May be slow; the driver
    /// wraps the call in its own deadline.
    async fn bind(&self, channel: &ChannelId) -> Result<Arc<dyn VoiceBinding>, VoiceError>;

    /// Number of non-bot participants currently in the channel.
    async fn occupants(&self, channel: &ChannelId) -> usize;
}

/// One live connection to a voice channel, exclusively owned by a single
/// session's state record.
#[async_trait]
pub trait VoiceBinding: Send + Sync {
    fn channel(&self) -> ChannelId;

    /// Whether the transport still considers this binding live.
    fn is_connected(&self) -> bool;

    /// Begin rendering an audio stream through this binding.
    async fn play(&self, source: AudioSource) -> Result<Arc<dyn PlaybackHandle>, VoiceError>;

    async fn destroy(&self);
}

/// One in-progress audio stream being rendered through a binding.
#[async_trait]
pub trait PlaybackHandle: Send + Sync {
    /// Freeze playback in place.
    fn pause(&self);

    /// Unfreeze a paused stream.
    fn resume(&self);

    /// Force the stream to its terminal condition. `wait` observers see
    /// `PlaybackEnd::Stopped`.
    fn stop(&self);

    fn state(&self) -> PlaybackState;

    /// Resolve when the stream reaches its terminal condition. This is
    /// the one completion signal; the driver awaits it exactly once per
    /// cycle, so a skip and a natural completion can never both advance.
    async fn wait(&self) -> PlaybackEnd;
}
