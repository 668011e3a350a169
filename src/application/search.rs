//! # Message Search Index
//!
//! Best-effort, in-memory index of recently seen chat messages backing the `search` command.
//! Nothing is persisted; the oldest entries are evicted once the capacity is reached.

use chrono::Local;
use std::collections::VecDeque;
use std::sync::RwLock;

use crate::domain::traits::{SearchHit, Searcher};

const DEFAULT_CAPACITY: usize = 1000;
const MAX_HITS: usize = 5;

pub struct MessageIndex {
    entries: RwLock<VecDeque<IndexedMessage>>,
    capacity: usize,
}

struct IndexedMessage {
    hit: SearchHit,
    normalized: String,
}

impl MessageIndex {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    pub fn index(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let entry = IndexedMessage {
            hit: SearchHit {
                timestamp: Local::now(),
                summary: text.to_string(),
            },
            normalized: text.to_lowercase(),
        };

        match self.entries.write() {
            Ok(mut entries) => {
                if entries.len() >= self.capacity {
                    entries.pop_front();
                }
                entries.push_back(entry);
            }
            Err(e) => tracing::warn!("{}", crate::strings::logs::index_unavailable(&e.to_string())),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MessageIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher for MessageIndex {
    /// Newest first; every term has to appear in the message.
    fn find(&self, terms: &[String]) -> Vec<SearchHit> {
        if terms.is_empty() {
            return Vec::new();
        }
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };

        entries
            .iter()
            .rev()
            .filter(|entry| terms.iter().all(|t| entry.normalized.contains(t.as_str())))
            .take(MAX_HITS)
            .map(|entry| entry.hit.clone())
            .collect()
    }
}

pub fn format_hit(hit: &SearchHit) -> String {
    format!("[{}]: {}", hit.timestamp.format("%Y-%m-%d %H:%M:%S"), hit.summary)
}
