//! Fake collaborators for driving the orchestrator without a real
//! transport, resolver, narrator or publisher.
//!
//! Shared across the integration test binaries; not every binary uses
//! every fake.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use jukelink::{
    AudioSource, ChannelId, Config, GuildId, Narrator, PlaybackEnd, PlaybackHandle,
    PlaybackState, PlayerManager, ResolveError, StatusPublisher, StatusRef, StatusSnapshot,
    Track, TrackResolver, VoiceBinding, VoiceError, VoiceTransport,
};

pub fn track(title: &str) -> Track {
    Track::new(title, format!("test:{title}"), 180, "")
}

// ---------------------------------------------------------------------------
// Playback handle
// ---------------------------------------------------------------------------

/// A handle whose terminal condition is signalled over a flume channel,
/// either by the test (`finish`/`fail`) or by the driver calling `stop`.
pub struct FakeHandle {
    state: Mutex<PlaybackState>,
    tx: flume::Sender<PlaybackEnd>,
    rx: flume::Receiver<PlaybackEnd>,
}

impl FakeHandle {
    fn new() -> Self {
        let (tx, rx) = flume::bounded(4);
        Self {
            state: Mutex::new(PlaybackState::Playing),
            tx,
            rx,
        }
    }

    /// Simulate the stream playing out to its natural end.
    pub fn finish(&self) {
        *self.state.lock() = PlaybackState::Stopped;
        let _ = self.tx.send(PlaybackEnd::Finished);
    }

    /// Simulate a mid-stream transport fault.
    pub fn fail(&self, why: &str) {
        *self.state.lock() = PlaybackState::Stopped;
        let _ = self.tx.send(PlaybackEnd::Errored(why.to_string()));
    }

    pub fn state_now(&self) -> PlaybackState {
        *self.state.lock()
    }
}

#[async_trait]
impl PlaybackHandle for FakeHandle {
    fn pause(&self) {
        *self.state.lock() = PlaybackState::Paused;
    }

    fn resume(&self) {
        *self.state.lock() = PlaybackState::Playing;
    }

    fn stop(&self) {
        *self.state.lock() = PlaybackState::Stopped;
        let _ = self.tx.send(PlaybackEnd::Stopped);
    }

    fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    async fn wait(&self) -> PlaybackEnd {
        self.rx
            .recv_async()
            .await
            .unwrap_or(PlaybackEnd::Finished)
    }
}

// ---------------------------------------------------------------------------
// Voice transport
// ---------------------------------------------------------------------------

pub struct FakeBinding {
    channel: ChannelId,
    connected: AtomicBool,
    pub handles: Mutex<Vec<Arc<FakeHandle>>>,
}

impl FakeBinding {
    fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            connected: AtomicBool::new(true),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn play_count(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn handle(&self, index: usize) -> Option<Arc<FakeHandle>> {
        self.handles.lock().get(index).cloned()
    }

    /// Simulate the transport dropping this binding out from under us.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceBinding for FakeBinding {
    fn channel(&self) -> ChannelId {
        self.channel.clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn play(&self, _source: AudioSource) -> Result<Arc<dyn PlaybackHandle>, VoiceError> {
        let handle = Arc::new(FakeHandle::new());
        self.handles.lock().push(handle.clone());
        Ok(handle)
    }

    async fn destroy(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeTransport {
    pub bindings: Mutex<Vec<Arc<FakeBinding>>>,
    pub bind_calls: AtomicUsize,
    pub occupant_count: AtomicUsize,
    /// When set, `bind` sleeps first so tests can trip the driver's
    /// connect deadline.
    pub bind_delay: Mutex<Option<Duration>>,
}

impl FakeTransport {
    pub fn binding(&self, index: usize) -> Option<Arc<FakeBinding>> {
        self.bindings.lock().get(index).cloned()
    }

    pub fn set_occupants(&self, n: usize) {
        self.occupant_count.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceTransport for FakeTransport {
    async fn bind(&self, channel: &ChannelId) -> Result<Arc<dyn VoiceBinding>, VoiceError> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.bind_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let binding = Arc::new(FakeBinding::new(channel.clone()));
        self.bindings.lock().push(binding.clone());
        Ok(binding)
    }

    async fn occupants(&self, _channel: &ChannelId) -> usize {
        self.occupant_count.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeResolver {
    pub open_calls: AtomicUsize,
    /// Locators that fail to open, for skip-and-continue tests.
    pub broken: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn break_locator(&self, locator: &str) {
        self.broken.lock().push(locator.to_string());
    }
}

#[async_trait]
impl TrackResolver for FakeResolver {
    async fn resolve(&self, query: &str) -> Result<Track, ResolveError> {
        if query.is_empty() {
            return Err(ResolveError::NotFound);
        }
        Ok(track(query))
    }

    async fn open_stream(&self, locator: &str) -> Result<AudioSource, ResolveError> {
        if self.broken.lock().iter().any(|l| l == locator) {
            return Err(ResolveError::Unavailable("stream backend down".into()));
        }
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AudioSource::empty())
    }
}

// ---------------------------------------------------------------------------
// Narrator
// ---------------------------------------------------------------------------

pub struct FakeNarrator {
    pub text: Option<String>,
    pub synth_works: bool,
    pub text_calls: AtomicUsize,
    pub synth_calls: AtomicUsize,
}

impl FakeNarrator {
    /// Narrator that never produces anything (the degrade path).
    pub fn silent() -> Self {
        Self {
            text: None,
            synth_works: false,
            text_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
        }
    }

    pub fn full() -> Self {
        Self {
            text: Some("Up next, a banger.".to_string()),
            synth_works: true,
            text_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
        }
    }

    /// Produces text but synthesis always comes back empty.
    pub fn text_only() -> Self {
        Self {
            synth_works: false,
            ..Self::full()
        }
    }
}

#[async_trait]
impl Narrator for FakeNarrator {
    async fn intro_text(&self, _track_title: &str) -> Option<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }

    async fn synthesize(&self, _text: &str) -> Option<AudioSource> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        self.synth_works.then(AudioSource::empty)
    }
}

// ---------------------------------------------------------------------------
// Status publisher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakePublisher {
    pub published: Mutex<Vec<(GuildId, StatusSnapshot)>>,
    pub cleared: AtomicUsize,
}

impl FakePublisher {
    pub fn last(&self) -> Option<StatusSnapshot> {
        self.published.lock().last().map(|(_, s)| s.clone())
    }

    pub fn count(&self) -> usize {
        self.published.lock().len()
    }

    pub fn any_with_intro(&self) -> bool {
        self.published.lock().iter().any(|(_, s)| s.intro_in_progress)
    }
}

#[async_trait]
impl StatusPublisher for FakePublisher {
    async fn publish(&self, guild_id: &GuildId, status: StatusSnapshot) -> Option<StatusRef> {
        let mut published = self.published.lock();
        published.push((guild_id.clone(), status));
        Some(StatusRef(format!("msg-{}", published.len())))
    }

    async fn clear(&self, _guild_id: &GuildId, _status: StatusRef) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub manager: Arc<PlayerManager>,
    pub resolver: Arc<FakeResolver>,
    pub narrator: Arc<FakeNarrator>,
    pub transport: Arc<FakeTransport>,
    pub publisher: Arc<FakePublisher>,
}

pub fn harness() -> Harness {
    harness_with(Config::default(), FakeNarrator::silent())
}

pub fn harness_with(config: Config, narrator: FakeNarrator) -> Harness {
    jukelink::common::logger::init(&config.logging);

    let resolver = Arc::new(FakeResolver::default());
    let narrator = Arc::new(narrator);
    let transport = Arc::new(FakeTransport::default());
    let publisher = Arc::new(FakePublisher::default());

    let manager = Arc::new(PlayerManager::new(
        &config,
        resolver.clone(),
        narrator.clone(),
        transport.clone(),
        publisher.clone(),
    ));

    Harness {
        manager,
        resolver,
        narrator,
        transport,
        publisher,
    }
}

/// Poll `cond` under the paused test clock until it holds. Each sleep
/// lets the runtime auto-advance time and schedule the driver tasks.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
