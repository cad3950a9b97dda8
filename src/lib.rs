//! Multi-guild live-audio playback orchestrator.
//!
//! Each guild session owns a FIFO track queue and one playback state
//! record. The [`PlayerManager`] drives the sequential pipeline (voice
//! connect → optional spoken intro → track → advance) against four
//! injected collaborators — track resolver, narrator, voice transport and
//! status publisher — while the [`PresenceMonitor`] tears sessions down
//! when their channel empties or their binding dies. State is ephemeral
//! by design: nothing survives a restart.

pub mod common;
pub mod configs;
pub mod player;
pub mod presence;
pub mod queue;
pub mod remote;
pub mod session;
pub mod track;

pub use common::{ChannelId, GuildId, ResolveError, VoiceError};
pub use configs::Config;
pub use player::PlayerManager;
pub use presence::PresenceMonitor;
pub use queue::QueueStore;
pub use remote::{
    AudioSource, Narrator, PlaybackEnd, PlaybackHandle, PlaybackState, StatusPublisher,
    StatusRef, StatusSnapshot, TrackResolver, VoiceBinding, VoiceTransport,
};
pub use session::{Phase, SessionStore};
pub use track::Track;
