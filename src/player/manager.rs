use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use super::cycle;
use crate::common::{ChannelId, GuildId, ResolveError};
use crate::configs::{Config, PlayerConfig};
use crate::queue::QueueStore;
use crate::remote::{
    Narrator, StatusPublisher, StatusSnapshot, TrackResolver, VoiceTransport,
};
use crate::session::{Phase, Session, SessionState, SessionStore};
use crate::track::Track;

/// The per-guild playback orchestrator.
///
/// Owns the session registry and queue store and drives the advance cycle
/// against the injected collaborators. All control operations are keyed by
/// guild and report expected failures as return values; no error raised by
/// a collaborator ever crosses this surface or touches another guild's
/// session.
pub struct PlayerManager {
    pub(crate) sessions: SessionStore,
    pub(crate) queues: QueueStore,
    pub(crate) resolver: Arc<dyn TrackResolver>,
    pub(crate) narrator: Arc<dyn Narrator>,
    pub(crate) transport: Arc<dyn VoiceTransport>,
    pub(crate) publisher: Arc<dyn StatusPublisher>,
    pub(crate) config: PlayerConfig,
}

impl PlayerManager {
    pub fn new(
        config: &Config,
        resolver: Arc<dyn TrackResolver>,
        narrator: Arc<dyn Narrator>,
        transport: Arc<dyn VoiceTransport>,
        publisher: Arc<dyn StatusPublisher>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(config.narration.enabled),
            queues: QueueStore::new(),
            resolver,
            narrator,
            transport,
            publisher,
            config: config.player.clone(),
        }
    }

    /// Append an already-resolved track; returns its 1-based queue
    /// position.
    pub fn enqueue(&self, guild_id: &GuildId, track: Track) -> usize {
        let position = self.queues.enqueue(guild_id, track);
        debug!("[{}] enqueued at position {}", guild_id, position);
        position
    }

    /// Resolve a user query and queue the result in one step.
    pub async fn resolve_and_enqueue(
        &self,
        guild_id: &GuildId,
        query: &str,
    ) -> Result<(Track, usize), ResolveError> {
        let track = self.resolver.resolve(query).await?;
        let position = self.enqueue(guild_id, track.clone());
        Ok((track, position))
    }

    /// Up-next view of a guild's queue.
    pub fn queue_snapshot(&self, guild_id: &GuildId) -> Vec<Track> {
        self.queues.snapshot(guild_id)
    }

    /// Begin playback in the given voice channel.
    ///
    /// Returns `false` without side effects when a cycle is already
    /// active for this guild: this is the re-entrancy guard, taken
    /// atomically under the session lock before the first await, so two
    /// racing `start` calls can never produce two cycles.
    pub fn start(self: &Arc<Self>, guild_id: &GuildId, channel: &ChannelId) -> bool {
        let session = self.sessions.get_or_create(guild_id);
        let stop_signal = {
            let mut state = session.state.lock();
            if state.phase.is_busy() {
                debug!("[{}] start ignored, already {:?}", guild_id, state.phase);
                return false;
            }
            state.phase = Phase::ConnectingVoice;
            // A fresh flag per cycle; a previous cycle's tripped signal
            // must not suppress this one.
            state.stop_signal = Arc::new(AtomicBool::new(false));
            state.stop_signal.clone()
        };

        info!("[{}] starting playback in channel {}", guild_id, channel);
        let task = tokio::spawn(cycle::run(
            self.clone(),
            session.clone(),
            channel.clone(),
            stop_signal,
        ));
        session.state.lock().cycle_task = Some(task);
        true
    }

    /// Force the active playback resource to its terminal condition so
    /// the cycle advances. Accepted while a track plays, sits paused, or
    /// an intro runs; fails when nothing is active.
    pub fn skip(&self, guild_id: &GuildId) -> bool {
        let Some(session) = self.sessions.get(guild_id) else {
            return false;
        };
        let handle = {
            let state = session.state.lock();
            if !matches!(
                state.phase,
                Phase::PlayingTrack | Phase::PlayingIntro | Phase::Paused
            ) {
                return false;
            }
            state.playback.clone()
        };
        match handle {
            Some(handle) => {
                info!("[{}] skip requested", guild_id);
                // The cycle's single wait() observes the stop and runs
                // the normal advance path exactly once.
                handle.stop();
                true
            }
            None => false,
        }
    }

    /// Freeze the current track in place. Valid only while playing.
    pub fn pause(&self, guild_id: &GuildId) -> bool {
        let Some(session) = self.sessions.get(guild_id) else {
            return false;
        };
        let handle = {
            let mut state = session.state.lock();
            if state.phase != Phase::PlayingTrack {
                return false;
            }
            let Some(handle) = state.playback.clone() else {
                return false;
            };
            state.phase = Phase::Paused;
            state.paused_at = Some(tokio::time::Instant::now());
            handle
        };
        handle.pause();
        debug!("[{}] paused", guild_id);
        true
    }

    /// Resume a paused track, folding the pause into the elapsed-time
    /// accounting so reported elapsed time excludes it.
    pub fn resume(&self, guild_id: &GuildId) -> bool {
        let Some(session) = self.sessions.get(guild_id) else {
            return false;
        };
        let handle = {
            let mut state = session.state.lock();
            if state.phase != Phase::Paused {
                return false;
            }
            let Some(handle) = state.playback.clone() else {
                return false;
            };
            if let Some(paused_at) = state.paused_at.take() {
                state.paused_total += paused_at.elapsed();
            }
            state.phase = Phase::PlayingTrack;
            handle
        };
        handle.resume();
        debug!("[{}] resumed", guild_id);
        true
    }

    /// Tear the session down to Idle: detach the advance chain, halt
    /// playback, release the voice binding, empty the queue and clear the
    /// published status. Valid in any state and safe to call redundantly;
    /// cleanup failures are logged and never propagate.
    pub async fn stop(&self, guild_id: &GuildId) -> bool {
        let Some(session) = self.sessions.get(guild_id) else {
            self.queues.clear(guild_id);
            return true;
        };

        // -- 1. Detach everything under the lock, then tear down outside
        //       it so the cleanup awaits cannot deadlock with the cycle.
        let (cycle_task, refresh_task, playback, binding, status) = {
            let mut state = session.state.lock();
            // Trip the signal before the abort lands: a cycle already
            // woken from an await sees it and keeps its hands off the
            // session.
            state.stop_signal.store(true, Ordering::SeqCst);
            let cycle_task = state.cycle_task.take();
            let refresh_task = state.refresh_task.take();
            let playback = state.playback.take();
            let binding = state.binding.take();
            let status = state.status.take();
            state.reset_idle();
            (cycle_task, refresh_task, playback, binding, status)
        };

        // -- 2. Kill the advance chain before the playback resource, so
        //       its terminal signal cannot trigger another cycle.
        if let Some(task) = cycle_task {
            task.abort();
        }
        if let Some(task) = refresh_task {
            task.abort();
        }

        // -- 3. Halt the transport-side resources.
        if let Some(handle) = playback {
            handle.stop();
        }
        if let Some(binding) = binding {
            binding.destroy().await;
        }

        // -- 4. Drop queued tracks and the rendered status.
        self.queues.clear(guild_id);
        if let Some(status) = status {
            self.publisher.clear(guild_id, status).await;
        }

        info!("[{}] stopped", guild_id);
        true
    }

    /// Toggle the spoken intro for one session.
    pub fn set_narration(&self, guild_id: &GuildId, enabled: bool) {
        let session = self.sessions.get_or_create(guild_id);
        session.state.lock().narration_enabled = enabled;
        debug!("[{}] narration {}", guild_id, if enabled { "on" } else { "off" });
    }

    /// Read-only view of a session, as published to the status surface.
    pub fn player_snapshot(&self, guild_id: &GuildId) -> StatusSnapshot {
        match self.sessions.get(guild_id) {
            Some(session) => {
                let state = session.state.lock();
                self.snapshot_locked(guild_id, &state)
            }
            None => StatusSnapshot::idle(),
        }
    }

    pub(crate) fn snapshot_locked(
        &self,
        guild_id: &GuildId,
        state: &SessionState,
    ) -> StatusSnapshot {
        StatusSnapshot {
            current_track: state.current_track.clone(),
            queue: self.queues.snapshot(guild_id),
            intro_in_progress: state.intro_in_progress,
            elapsed_secs: state.elapsed().as_secs(),
        }
    }

    /// Push a snapshot to the publisher, remembering the artifact ref.
    pub(crate) async fn publish(&self, session: &Session, snapshot: StatusSnapshot) {
        if let Some(status) = self.publisher.publish(&session.guild_id, snapshot).await {
            session.state.lock().status = Some(status);
        }
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.config.connect_timeout_ms)
    }

    pub(crate) fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.config.settle_delay_ms)
    }

    pub(crate) fn grace_period(&self) -> Duration {
        Duration::from_secs(self.config.grace_period_secs)
    }
}
