use std::collections::VecDeque;

use dashmap::DashMap;

use crate::common::GuildId;
use crate::track::Track;

/// Per-guild FIFO song queue.
///
/// Every operation is total over an implicitly-empty queue: there is no
/// "queue not found" error, and dequeuing an empty queue returns `None`.
/// Queues are created lazily and only ever emptied, never removed.
///
/// The map shard lock is held for the whole of each operation, so an
/// enqueue from a command handler and a dequeue from the advance cycle
/// can never lose or duplicate an entry for the same guild.
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: DashMap<GuildId, VecDeque<Track>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track; returns its 1-based position (= queue length after
    /// the insert).
    pub fn enqueue(&self, guild_id: &GuildId, track: Track) -> usize {
        let mut queue = self.queues.entry(guild_id.clone()).or_default();
        queue.push_back(track);
        queue.len()
    }

    /// Remove and return the head of the queue.
    pub fn dequeue_next(&self, guild_id: &GuildId) -> Option<Track> {
        self.queues.get_mut(guild_id)?.pop_front()
    }

    /// Return the head of the queue without removing it.
    pub fn peek_next(&self, guild_id: &GuildId) -> Option<Track> {
        self.queues.get(guild_id)?.front().cloned()
    }

    /// Read-only copy of the queue in play order, for "up next" display.
    pub fn snapshot(&self, guild_id: &GuildId) -> Vec<Track> {
        self.queues
            .get(guild_id)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, guild_id: &GuildId) -> usize {
        self.queues.get(guild_id).map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, guild_id: &GuildId) -> bool {
        self.len(guild_id) == 0
    }

    /// Empty the queue. Succeeds regardless of prior state.
    pub fn clear(&self, guild_id: &GuildId) {
        if let Some(mut queue) = self.queues.get_mut(guild_id) {
            queue.clear();
        }
    }
}
