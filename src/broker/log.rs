//! Human-readable log of broker traffic.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// Direction of a logged broker message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Send,
    Recv,
}

/// One line of the activity log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub direction: Direction,
    pub topic: String,
    pub payload: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            Direction::Send => "→ SEND",
            Direction::Recv => "← RECV",
        };
        write!(
            f,
            "[{}] {}: {} | {}",
            self.timestamp.format("%H:%M:%S"),
            arrow,
            self.topic,
            self.payload
        )
    }
}

/// Newest-first log of published and received broker messages.
///
/// With `max_entries == 0` the log only shrinks on [`ActivityLog::clear`].
#[derive(Debug)]
pub struct ActivityLog {
    entries: Mutex<VecDeque<LogEntry>>,
    max_entries: usize,
}

impl ActivityLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries,
        }
    }

    /// Record a message, evicting the oldest entry when full.
    pub fn record(&self, direction: Direction, topic: &str, payload: &str) {
        let entry = LogEntry {
            timestamp: Local::now(),
            direction,
            topic: topic.to_string(),
            payload: payload.to_string(),
        };

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        if self.max_entries > 0 {
            entries.truncate(self.max_entries);
        }
    }

    /// Snapshot of all entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().take(n).cloned().collect()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_newest_first() {
        let log = ActivityLog::new(0);
        log.record(Direction::Send, "c1/feeds/V1", "first");
        log.record(Direction::Recv, "c1/feeds/V2", "second");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].payload, "second");
        assert_eq!(entries[1].payload, "first");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let log = ActivityLog::new(3);
        for i in 0..5 {
            log.record(Direction::Send, "t", &i.to_string());
        }

        let payloads: Vec<_> = log.entries().into_iter().map(|e| e.payload).collect();
        assert_eq!(payloads, vec!["4", "3", "2"]);
    }

    #[test]
    fn test_unbounded_until_clear() {
        let log = ActivityLog::new(0);
        for _ in 0..1000 {
            log.record(Direction::Recv, "t", "x");
        }
        assert_eq!(log.len(), 1000);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_entry_display() {
        let log = ActivityLog::new(0);
        log.record(Direction::Send, "c1/feeds/V1", r#"{"action":"PING"}"#);

        let line = log.entries()[0].to_string();
        assert!(line.contains("→ SEND: c1/feeds/V1 | {\"action\":\"PING\"}"));
        assert!(line.starts_with('['));
    }
}
