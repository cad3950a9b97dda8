use std::sync::Arc;
use std::time::Duration;

use super::manager::PlayerManager;
use crate::session::{Phase, Session};

/// Periodic "now playing" refresh for the current track.
///
/// Republishes elapsed time plus a fresh queue snapshot every interval
/// until the owning cycle (or `stop`) aborts the task. Bails out on its
/// own if it ever observes the session outside a playing phase, so a
/// stale task can never keep publishing for a reset session.
pub(crate) async fn refresh_loop(manager: Arc<PlayerManager>, session: Arc<Session>) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(manager.config.status_interval_secs));
    // The first tick completes immediately; the cycle already published
    // the initial snapshot.
    interval.tick().await;

    loop {
        interval.tick().await;

        let snapshot = {
            let state = session.state.lock();
            if !matches!(state.phase, Phase::PlayingTrack | Phase::Paused) {
                return;
            }
            manager.snapshot_locked(&session.guild_id, &state)
        };
        manager.publish(&session, snapshot).await;
    }
}
