//! In-memory (single node) implementation of set storage for local
//! development.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use broker_sets::SetStore;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Default)]
struct Entry {
    members: HashSet<String>,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    /// Every deadline ever set, oldest first. Stale pairs (deadline replaced
    /// or set already removed) are skipped when popped.
    deadlines: BTreeSet<(Instant, String)>,
}

impl State {
    /// Drops every entry whose deadline has passed.
    fn evict_expired(&mut self, now: Instant) {
        while self
            .deadlines
            .first()
            .is_some_and(|(deadline, _)| *deadline <= now)
        {
            let Some((deadline, key)) = self.deadlines.pop_first() else {
                break;
            };

            if self
                .entries
                .get(&key)
                .is_some_and(|entry| entry.expires_at == Some(deadline))
            {
                trace!(key, "evicting expired set");
                self.entries.remove(&key);
            }
        }
    }

    /// Looks up `key` after evicting everything that has expired.
    fn live_entry(&mut self, key: &str) -> Option<&mut Entry> {
        self.evict_expired(Instant::now());

        self.entries.get_mut(key)
    }
}

/// In-memory set store. Clones share the same underlying state.
#[derive(Clone, Debug, Default)]
pub struct MemorySetStore {
    state: Arc<Mutex<State>>,
}

impl MemorySetStore {
    /// Creates a new `MemorySetStore`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }
}

#[async_trait]
impl SetStore for MemorySetStore {
    type Error = Error;

    async fn add_members(&self, key: &str, members: &[String]) -> Result<usize, Self::Error> {
        if members.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock().await;
        state.evict_expired(Instant::now());

        // Adding to a live set keeps its deadline.
        let entry = state.entries.entry(key.to_string()).or_default();

        let mut added = 0;
        for member in members {
            if entry.members.insert(member.clone()) {
                added += 1;
            }
        }

        Ok(added)
    }

    async fn cardinality(&self, key: &str) -> Result<usize, Self::Error> {
        let mut state = self.state.lock().await;

        Ok(state.live_entry(key).map_or(0, |entry| entry.members.len()))
    }

    async fn exists(&self, key: &str) -> Result<bool, Self::Error> {
        let mut state = self.state.lock().await;

        Ok(state.live_entry(key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, Self::Error> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = Instant::now();
        state.evict_expired(now);

        let Some(entry) = state.entries.get_mut(key) else {
            return Ok(false);
        };

        let deadline = now + ttl;
        entry.expires_at = Some(deadline);
        state.deadlines.insert((deadline, key.to_string()));

        Ok(true)
    }

    async fn is_member(&self, key: &str, member: &str) -> Result<bool, Self::Error> {
        let mut state = self.state.lock().await;

        Ok(state
            .live_entry(key)
            .is_some_and(|entry| entry.members.contains(member)))
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, Self::Error> {
        let mut state = self.state.lock().await;

        Ok(state
            .live_entry(key)
            .map(|entry| entry.members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn remove_members(&self, key: &str, members: &[String]) -> Result<usize, Self::Error> {
        if members.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock().await;

        let Some(entry) = state.live_entry(key) else {
            return Ok(0);
        };

        let mut removed = 0;
        for member in members {
            if entry.members.remove(member) {
                removed += 1;
            }
        }

        // Empty sets do not exist.
        if entry.members.is_empty() {
            state.entries.remove(key);
        }

        Ok(removed)
    }
}
