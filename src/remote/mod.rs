//! Capability interfaces for the external collaborators the driver talks
//! to. Each one is a narrow trait object injected into the player manager
//! so the core stays testable with fakes.

pub mod narrator;
pub mod resolver;
pub mod source;
pub mod status;
pub mod voice;

pub use narrator::Narrator;
pub use resolver::TrackResolver;
pub use source::AudioSource;
pub use status::{StatusPublisher, StatusRef, StatusSnapshot};
pub use voice::{PlaybackEnd, PlaybackHandle, PlaybackState, VoiceBinding, VoiceTransport};
