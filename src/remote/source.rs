use std::io;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

/// A live audio byte stream handed to the voice transport for rendering.
///
/// The orchestrator never inspects the bytes; codec and container concerns
/// live entirely behind the transport and resolver boundaries.
pub struct AudioSource {
    stream: BoxStream<'static, io::Result<Bytes>>,
}

impl AudioSource {
    pub fn new(stream: BoxStream<'static, io::Result<Bytes>>) -> Self {
        Self { stream }
    }

    /// A source that ends immediately. Useful for fakes.
    pub fn empty() -> Self {
        Self {
            stream: stream::empty().boxed(),
        }
    }

    /// A source over a single in-memory chunk. Useful for fakes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            stream: stream::once(async move { Ok(bytes) }).boxed(),
        }
    }

    pub fn into_inner(self) -> BoxStream<'static, io::Result<Bytes>> {
        self.stream
    }
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSource").finish_non_exhaustive()
    }
}
