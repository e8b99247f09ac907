//! Per-(conveyor, action) dispatch cooldowns.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Registry key: the same action on two conveyors cools down independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub conveyor: String,
    pub action_id: u32,
}

impl CooldownKey {
    pub fn new(conveyor: &str, action_id: u32) -> Self {
        Self {
            conveyor: conveyor.to_string(),
            action_id,
        }
    }
}

/// Last dispatch time per key.
///
/// An action with duration `D` dispatched at `T` may be dispatched again
/// from `T + D + grace` on.
#[derive(Debug)]
pub struct CooldownRegistry {
    entries: DashMap<CooldownKey, Instant>,
    grace: Duration,
}

impl CooldownRegistry {
    pub fn new(grace: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            grace,
        }
    }

    /// Full cooldown window for an action duration.
    pub fn window(&self, duration_ms: u64) -> Duration {
        Duration::from_millis(duration_ms) + self.grace
    }

    pub fn get(&self, conveyor: &str, action_id: u32) -> Option<Instant> {
        self.entries
            .get(&CooldownKey::new(conveyor, action_id))
            .map(|at| *at)
    }

    pub fn set(&self, conveyor: &str, action_id: u32, at: Instant) {
        self.entries.insert(CooldownKey::new(conveyor, action_id), at);
    }

    /// Whether a dispatch at `now` would be allowed.
    pub fn is_ready(&self, conveyor: &str, action_id: u32, duration_ms: u64, now: Instant) -> bool {
        match self.get(conveyor, action_id) {
            Some(last) => now.saturating_duration_since(last) >= self.window(duration_ms),
            None => true,
        }
    }

    /// Record a dispatch at `now` if the cooldown has elapsed.
    ///
    /// Check and record happen under the entry lock, so two concurrent
    /// callers cannot both win the same window.
    pub fn try_acquire(
        &self,
        conveyor: &str,
        action_id: u32,
        duration_ms: u64,
        now: Instant,
    ) -> bool {
        let window = self.window(duration_ms);
        match self.entries.entry(CooldownKey::new(conveyor, action_id)) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) >= window {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    pub fn clear(&self, conveyor: &str, action_id: u32) -> bool {
        self.entries
            .remove(&CooldownKey::new(conveyor, action_id))
            .is_some()
    }

    /// Drop every entry of a conveyor; returns how many were removed.
    pub fn clear_conveyor(&self, conveyor: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.conveyor != conveyor);
        before.saturating_sub(self.entries.len())
    }

    pub fn clear_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CooldownRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
