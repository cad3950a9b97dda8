use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::common::GuildId;
use crate::remote::{PlaybackHandle, StatusRef, VoiceBinding};
use crate::track::Track;

/// Where a session is in its playback lifecycle.
///
/// `Paused` is only reachable from `PlayingTrack` and resuming returns
/// exactly there. Everything can fall through to `Idle` on error or
/// queue exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ConnectingVoice,
    PlayingIntro,
    PlayingTrack,
    Paused,
}

impl Phase {
    /// True while an advance cycle owns the session. The re-entrancy
    /// guard in `start` checks exactly this.
    pub fn is_busy(self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

/// Per-guild mutable playback record. The single source of truth every
/// other component reads and writes, always under the session lock and
/// never across an await.
pub struct SessionState {
    pub phase: Phase,
    pub current_track: Option<Track>,
    /// Live voice connection, exclusively owned by this session.
    pub binding: Option<Arc<dyn VoiceBinding>>,
    /// The in-progress audio stream, if any.
    pub playback: Option<Arc<dyn PlaybackHandle>>,
    /// When the current track's audio began. Set only while the track is
    /// playing (or paused mid-track).
    pub started_at: Option<Instant>,
    /// When the current pause began, while `phase == Paused`.
    pub paused_at: Option<Instant>,
    /// Total time spent paused during the current track.
    pub paused_total: Duration,
    pub status: Option<StatusRef>,
    pub intro_in_progress: bool,
    pub narration_enabled: bool,
    /// The running advance-cycle task. Aborting it is how `stop` detaches
    /// the completion chain.
    pub cycle_task: Option<JoinHandle<()>>,
    /// Set by `stop` for the cycle named in `cycle_task`. The cycle checks
    /// it after every await and makes no state writes once it is set, so a
    /// cycle woken between `stop`'s reset and the abort landing cannot
    /// resurrect the session. `start` installs a fresh flag per cycle.
    pub stop_signal: Arc<AtomicBool>,
    /// The periodic status-refresh task for the current track.
    pub refresh_task: Option<JoinHandle<()>>,
}

impl SessionState {
    fn new(narration_enabled: bool) -> Self {
        Self {
            phase: Phase::Idle,
            current_track: None,
            binding: None,
            playback: None,
            started_at: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            status: None,
            intro_in_progress: false,
            narration_enabled,
            cycle_task: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            refresh_task: None,
        }
    }

    /// Elapsed playback time of the current track, net of paused time.
    pub fn elapsed(&self) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::ZERO;
        };
        // While paused the clock is frozen at the pause point.
        let end = self.paused_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(started)
            .saturating_sub(self.paused_total)
    }

    /// Drop all per-track bookkeeping when playback of one track ends.
    pub fn clear_track(&mut self) {
        self.current_track = None;
        self.playback = None;
        self.started_at = None;
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        self.intro_in_progress = false;
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
    }

    /// Return to Idle defaults. Keeps the voice binding: releasing it is
    /// an explicit `stop`, so a session can sit connected-but-idle.
    pub fn reset_idle(&mut self) {
        self.clear_track();
        self.phase = Phase::Idle;
    }
}

/// A single guild's session: its state record behind a short-critical-
/// section lock.
pub struct Session {
    pub guild_id: GuildId,
    pub state: Mutex<SessionState>,
}

/// Lazy per-guild session registry. Records are created on first access
/// and never removed; an Idle record is equivalent to absence.
pub struct SessionStore {
    sessions: DashMap<GuildId, Arc<Session>>,
    narration_default: bool,
}

impl SessionStore {
    pub fn new(narration_default: bool) -> Self {
        Self {
            sessions: DashMap::new(),
            narration_default,
        }
    }

    pub fn get_or_create(&self, guild_id: &GuildId) -> Arc<Session> {
        self.sessions
            .entry(guild_id.clone())
            .or_insert_with(|| {
                Arc::new(Session {
                    guild_id: guild_id.clone(),
                    state: Mutex::new(SessionState::new(self.narration_default)),
                })
            })
            .clone()
    }

    pub fn get(&self, guild_id: &GuildId) -> Option<Arc<Session>> {
        self.sessions.get(guild_id).map(|s| s.clone())
    }
}
