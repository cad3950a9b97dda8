use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::common::{ChannelId, GuildId};
use crate::player::PlayerManager;
use crate::session::Phase;

/// Reconciles session state with what the voice transport reports.
///
/// Two signals feed it: a session's own binding going dead without a
/// `stop` (kick, channel deletion, transport drop), and membership
/// changes in the bound channel. Both resolve to the idempotent `stop`,
/// and neither path lets an error escape the handler.
pub struct PresenceMonitor {
    manager: Arc<PlayerManager>,
    /// Channels with a grace timer already scheduled, so one emptiness
    /// event does not fan out into redundant timers. The re-check at
    /// fire time stays authoritative either way.
    pending: DashMap<ChannelId, ()>,
}

impl PresenceMonitor {
    pub fn new(manager: Arc<PlayerManager>) -> Arc<Self> {
        Arc::new(Self {
            manager,
            pending: DashMap::new(),
        })
    }

    /// The transport says this session's binding is no longer connected.
    /// The external observation is authoritative: reconcile by stopping.
    pub async fn on_forced_disconnect(&self, guild_id: &GuildId) {
        let Some(session) = self.manager.sessions.get(guild_id) else {
            return;
        };
        let binding = session.state.lock().binding.clone();
        let Some(binding) = binding else {
            return;
        };
        if binding.is_connected() {
            // Transient signal; the binding recovered on its own.
            return;
        }

        warn!("[{}] voice binding lost, reconciling with stop", guild_id);
        self.manager.stop(guild_id).await;
    }

    /// A participant left the channel this session is bound to. If no
    /// non-bot participants remain, schedule a grace-period re-check and
    /// stop the session if the channel is still empty when it fires.
    pub async fn on_member_left(self: &Arc<Self>, guild_id: &GuildId, channel: &ChannelId) {
        let Some(session) = self.manager.sessions.get(guild_id) else {
            return;
        };
        {
            let state = session.state.lock();
            if state.phase == Phase::Idle {
                return;
            }
            match &state.binding {
                Some(binding) if binding.channel() == *channel => {}
                _ => return,
            }
        }

        if self.manager.transport.occupants(channel).await > 0 {
            return;
        }
        if self.pending.insert(channel.clone(), ()).is_some() {
            debug!("[{}] grace timer already pending for {}", guild_id, channel);
            return;
        }

        info!(
            "[{}] channel {} is empty, stopping in {:?} unless someone returns",
            guild_id,
            channel,
            self.manager.grace_period()
        );

        let monitor = self.clone();
        let guild_id = guild_id.clone();
        let channel = channel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(monitor.manager.grace_period()).await;
            monitor.pending.remove(&channel);

            // The re-count decides, not the state at schedule time.
            if monitor.manager.transport.occupants(&channel).await > 0 {
                debug!("[{}] participants returned, keeping session", guild_id);
                return;
            }

            info!("[{}] channel {} still empty, auto-stopping", guild_id, channel);
            monitor.manager.stop(&guild_id).await;
        });
    }
}
