//! In-memory broker for unit tests.

use super::{Broker, Message};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records publishes and serves a settable "last message" per topic.
#[derive(Default)]
pub struct MockBroker {
    published: Mutex<Vec<(String, String)>>,
    last: Mutex<HashMap<String, Message>>,
    polls: AtomicUsize,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_last_message(&self, topic: &str, message: Message) {
        self.last
            .lock()
            .unwrap()
            .insert(topic.to_string(), message);
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broker for MockBroker {
    async fn publish(&self, topic: &str, message: &str) {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), message.to_string()));
    }

    async fn poll_last_message(&self, topic: &str) -> Option<Message> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.last.lock().unwrap().get(topic).cloned()
    }
}
