use async_trait::async_trait;

use super::source::AudioSource;
use crate::common::ResolveError;
use crate::track::Track;

/// Turns user queries into track descriptors and locators into audio.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Resolve a user query or link into a playable track descriptor.
    async fn resolve(&self, query: &str) -> Result<Track, ResolveError>;

    /// Open a live audio byte stream for a previously resolved locator.
    async fn open_stream(&self, locator: &str) -> Result<AudioSource, ResolveError>;
}
