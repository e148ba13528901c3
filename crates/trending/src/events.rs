//! Watchlist events and the bounded log they are kept in.

use chrono::{DateTime, Utc};
use data_loader::AnimeId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEvent {
    pub anime_id: AnimeId,
    pub action: WatchAction,
    pub timestamp: DateTime<Utc>,
}

impl TrendingEvent {
    pub fn new(anime_id: AnimeId, action: WatchAction, timestamp: DateTime<Utc>) -> Self {
        Self {
            anime_id,
            action,
            timestamp,
        }
    }
}

/// Ring buffer of events, oldest first. Pushing past capacity evicts the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<TrendingEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from persisted events, keeping only the newest `capacity`
    pub fn from_events(events: Vec<TrendingEvent>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        for event in events {
            log.push(event);
        }
        log
    }

    pub fn push(&mut self, event: TrendingEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Drop events strictly older than `cutoff`
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) {
        self.events.retain(|e| e.timestamp >= cutoff);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrendingEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<TrendingEvent> {
        self.events.iter().cloned().collect()
    }
}
