//! Session history store.
//!
//! Maps a session key to its ordered turn list. Keys are sharded across a
//! `DashMap`, and each session guards its own turns, so traffic on one key
//! never blocks another.

use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use braite_types::chat::Turn;

/// One conversation thread with its append-only history.
#[derive(Debug)]
pub struct Session {
    key: String,
    turns: RwLock<Vec<Turn>>,
}

impl Session {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            turns: RwLock::new(Vec::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ordered copy of the turns appended so far.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append a user turn and its assistant reply as one unit.
    ///
    /// Both turns are pushed under a single write lock so a concurrent
    /// exchange on the same key can never land between them.
    pub fn append_exchange(&self, user: Turn, assistant: Turn) {
        let mut turns = self.turns.write().unwrap_or_else(PoisonError::into_inner);
        turns.push(user);
        turns.push(assistant);
    }

    pub fn len(&self) -> usize {
        self.turns.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrent session-key -> session map, injected into the pipeline.
#[derive(Debug, Default)]
pub struct SessionHistoryStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `key`, creating an empty one on first use.
    ///
    /// Creation goes through the map's entry API, so two callers racing on
    /// the same unseen key both receive the same session.
    pub fn get_or_create(&self, key: &str) -> Arc<Session> {
        if let Some(existing) = self.sessions.get(key) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .sessions
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Session::new(key)));
        Arc::clone(entry.value())
    }

    /// Look up a session without creating it.
    pub fn get(&self, key: &str) -> Option<Arc<Session>> {
        self.sessions.get(key).map(|s| Arc::clone(s.value()))
    }

    /// Number of distinct sessions seen since startup.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
