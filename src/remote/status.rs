use async_trait::async_trait;
use serde::Serialize;

use crate::common::GuildId;
use crate::track::Track;

/// Opaque reference to the externally rendered status artifact, e.g. a
/// message id the publisher keeps editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusRef(pub String);

impl From<String> for StatusRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One "now playing" view of a session, pushed to the publisher whenever
/// playback state changes and on every periodic refresh tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// `None` when the session is idle.
    pub current_track: Option<Track>,
    /// Up-next queue in play order.
    pub queue: Vec<Track>,
    pub intro_in_progress: bool,
    /// Elapsed playback time of the current track, net of paused time.
    pub elapsed_secs: u64,
}

impl StatusSnapshot {
    /// Snapshot of an idle session with nothing playing.
    pub fn idle() -> Self {
        Self {
            current_track: None,
            queue: Vec::new(),
            intro_in_progress: false,
            elapsed_secs: 0,
        }
    }
}

/// Renders session status somewhere user-visible.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Publish a snapshot. Returns a new artifact ref, or `None` when the
    /// publisher edited an existing artifact in place (the session keeps
    /// its previous ref).
    async fn publish(&self, guild_id: &GuildId, status: StatusSnapshot) -> Option<StatusRef>;

    /// Remove the rendered artifact.
    async fn clear(&self, guild_id: &GuildId, status: StatusRef);
}
