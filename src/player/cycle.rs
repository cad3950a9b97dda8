use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::manager::PlayerManager;
use super::monitor;
use crate::common::ChannelId;
use crate::remote::{PlaybackEnd, StatusSnapshot, VoiceBinding};
use crate::session::{Phase, Session};
use crate::track::Track;

/// One session's advance loop: dequeue → connect → (intro) → play →
/// await terminal → settle → repeat, until the queue runs dry or the
/// task is torn down by `stop`.
///
/// Runs as a spawned task owned by the session state. Every collaborator
/// failure inside the loop either degrades (narration) or skips to the
/// next entry (resolve/playback); only a voice-binding failure ends the
/// whole attempt.
///
/// `stop_signal` is the session-ownership check: `stop` trips it under
/// the session lock before aborting this task, and once it reads true the
/// cycle must not write session state again, whatever await it woke from.
pub(crate) async fn run(
    manager: Arc<PlayerManager>,
    session: Arc<Session>,
    channel: ChannelId,
    stop_signal: Arc<AtomicBool>,
) {
    let guild_id = session.guild_id.clone();

    loop {
        if stop_signal.load(Ordering::SeqCst) {
            return;
        }

        // -- 1. Pull the next track --------------------------------------
        let Some(track) = manager.queues.dequeue_next(&guild_id) else {
            info!("[{}] queue exhausted, going idle", guild_id);
            // The binding is deliberately kept: releasing it is an
            // explicit stop, so the session can sit connected-but-idle.
            {
                let mut state = session.state.lock();
                if stop_signal.load(Ordering::SeqCst) {
                    return;
                }
                state.reset_idle();
                state.cycle_task = None;
            }
            manager.publish(&session, StatusSnapshot::idle()).await;
            return;
        };

        // -- 2. Ensure a live voice binding ------------------------------
        let Some(binding) = ensure_binding(&manager, &session, &channel, &stop_signal).await
        else {
            // Connect timeout or failure aborts the whole start attempt.
            // The queue is kept so a fresh start command can replay it.
            let mut state = session.state.lock();
            if stop_signal.load(Ordering::SeqCst) {
                return;
            }
            state.reset_idle();
            state.cycle_task = None;
            return;
        };

        // -- 3. Optional spoken intro (best-effort throughout) -----------
        let narration = session.state.lock().narration_enabled;
        if narration {
            play_intro(&manager, &session, &binding, &track, &stop_signal).await;
        }

        // -- 4. The track itself -----------------------------------------
        play_track(&manager, &session, &binding, track, &stop_signal).await;

        // -- 5. Settle before re-advancing, to avoid tight-loop races
        //       with the transport.
        tokio::time::sleep(manager.settle_delay()).await;
    }
}

/// Reuse the session's binding when it is still connected to the target
/// channel; otherwise acquire a fresh one within the configured deadline.
async fn ensure_binding(
    manager: &Arc<PlayerManager>,
    session: &Arc<Session>,
    channel: &ChannelId,
    stop_signal: &Arc<AtomicBool>,
) -> Option<Arc<dyn VoiceBinding>> {
    let guild_id = &session.guild_id;

    let existing = session.state.lock().binding.clone();
    if let Some(binding) = existing {
        if binding.is_connected() && binding.channel() == *channel {
            return Some(binding);
        }
        debug!("[{}] discarding stale voice binding", guild_id);
        binding.destroy().await;
        if stop_signal.load(Ordering::SeqCst) {
            return None;
        }
        session.state.lock().binding = None;
    }

    {
        let mut state = session.state.lock();
        if stop_signal.load(Ordering::SeqCst) {
            return None;
        }
        state.phase = Phase::ConnectingVoice;
    }

    let bind = manager.transport.bind(channel);
    match tokio::time::timeout(manager.connect_timeout(), bind).await {
        Ok(Ok(binding)) => {
            if stop_signal.load(Ordering::SeqCst) {
                // The session was torn down while we connected; this
                // binding is ours alone to release.
                binding.destroy().await;
                return None;
            }
            session.state.lock().binding = Some(binding.clone());
            Some(binding)
        }
        Ok(Err(err)) => {
            warn!("[{}] voice bind failed: {}", guild_id, err);
            None
        }
        Err(_) => {
            warn!("[{}] voice bind timed out", guild_id);
            None
        }
    }
}

/// Play the narrated intro if the narrator produces one. Any failure or
/// empty result falls straight through to the track; the session only
/// enters `PlayingIntro` once intro audio is actually in hand.
async fn play_intro(
    manager: &Arc<PlayerManager>,
    session: &Arc<Session>,
    binding: &Arc<dyn VoiceBinding>,
    track: &Track,
    stop_signal: &Arc<AtomicBool>,
) {
    let guild_id = &session.guild_id;

    let Some(text) = manager.narrator.intro_text(&track.title).await else {
        return;
    };
    if text.trim().is_empty() {
        return;
    }
    let Some(audio) = manager.narrator.synthesize(&text).await else {
        debug!("[{}] intro synthesis came back empty", guild_id);
        return;
    };

    let handle = match binding.play(audio).await {
        Ok(handle) => handle,
        Err(err) => {
            debug!("[{}] intro playback refused: {}", guild_id, err);
            return;
        }
    };

    let snapshot = {
        let mut state = session.state.lock();
        if stop_signal.load(Ordering::SeqCst) {
            handle.stop();
            return;
        }
        state.phase = Phase::PlayingIntro;
        state.intro_in_progress = true;
        state.current_track = Some(track.clone());
        state.playback = Some(handle.clone());
        manager.snapshot_locked(guild_id, &state)
    };
    manager.publish(session, snapshot).await;

    // Completion is the handle's terminal signal, not a timer. Errors
    // end the intro exactly like a clean finish.
    let _ = handle.wait().await;

    let mut state = session.state.lock();
    if stop_signal.load(Ordering::SeqCst) {
        return;
    }
    state.intro_in_progress = false;
    state.playback = None;
}

/// Stream one track to the binding and wait for its terminal condition.
/// Acquisition and playback faults alike are skip-and-continue.
async fn play_track(
    manager: &Arc<PlayerManager>,
    session: &Arc<Session>,
    binding: &Arc<dyn VoiceBinding>,
    track: Track,
    stop_signal: &Arc<AtomicBool>,
) {
    let guild_id = &session.guild_id;

    let source = match manager.resolver.open_stream(&track.locator).await {
        Ok(source) => source,
        Err(err) => {
            warn!("[{}] cannot stream '{}': {}", guild_id, track.title, err);
            leave_track(session, stop_signal);
            return;
        }
    };

    let handle = match binding.play(source).await {
        Ok(handle) => handle,
        Err(err) => {
            warn!("[{}] playback refused for '{}': {}", guild_id, track.title, err);
            leave_track(session, stop_signal);
            return;
        }
    };

    info!("[{}] now playing: {}", guild_id, track.title);

    let snapshot = {
        let mut state = session.state.lock();
        if stop_signal.load(Ordering::SeqCst) {
            handle.stop();
            return;
        }
        state.phase = Phase::PlayingTrack;
        state.intro_in_progress = false;
        state.current_track = Some(track.clone());
        state.playback = Some(handle.clone());
        state.started_at = Some(Instant::now());
        state.paused_at = None;
        state.paused_total = Duration::ZERO;
        manager.snapshot_locked(guild_id, &state)
    };
    manager.publish(session, snapshot).await;

    // Periodic elapsed-time refresh, cancelled the moment the track
    // reaches terminal so no recurring work leaks past this cycle.
    if !stop_signal.load(Ordering::SeqCst) {
        let refresh = tokio::spawn(monitor::refresh_loop(manager.clone(), session.clone()));
        session.state.lock().refresh_task = Some(refresh);
    }

    match handle.wait().await {
        PlaybackEnd::Finished => debug!("[{}] track finished: {}", guild_id, track.title),
        PlaybackEnd::Stopped => debug!("[{}] track stopped: {}", guild_id, track.title),
        PlaybackEnd::Errored(err) => {
            // A mid-track fault advances like a normal completion.
            warn!("[{}] track errored: {} ({})", guild_id, track.title, err)
        }
    }

    leave_track(session, stop_signal);
}

/// Clear per-track state after terminal, leaving the phase parked at
/// `ConnectingVoice` so the cycle stays guarded between tracks. A tripped
/// stop signal means `stop` already reset the session; re-parking the
/// phase here would wedge it busy with no cycle left to clear it.
fn leave_track(session: &Arc<Session>, stop_signal: &Arc<AtomicBool>) {
    let mut state = session.state.lock();
    if stop_signal.load(Ordering::SeqCst) {
        return;
    }
    state.clear_track();
    state.phase = Phase::ConnectingVoice;
}
