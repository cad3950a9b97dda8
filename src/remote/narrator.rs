use async_trait::async_trait;

use super::source::AudioSource;

/// Produces the optional spoken intro played before a track.
///
/// Both methods are best-effort: `None` at either step makes the driver
/// fall straight through to the track itself, never failing the cycle.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Short intro line for a track title, or `None` to skip narration.
    async fn intro_text(&self, track_title: &str) -> Option<String>;

    /// Synthesize intro audio for the given text.
    async fn synthesize(&self, text: &str) -> Option<AudioSource>;
}
