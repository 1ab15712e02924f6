use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Timestamps of admitted calls, oldest first, never longer than `capacity`
#[derive(Debug, Clone)]
pub struct CallHistory {
    capacity: usize,
    timestamps: VecDeque<Instant>,
}

impl CallHistory {
    /// Create an empty history holding at most `capacity` timestamps
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            timestamps: VecDeque::with_capacity(capacity),
        }
    }

    /// Get the number of recorded calls
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Check whether another call would exceed the capacity
    pub fn is_full(&self) -> bool {
        self.timestamps.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the timestamp of the oldest recorded call
    pub fn oldest(&self) -> Option<Instant> {
        self.timestamps.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.timestamps.iter()
    }

    /// Drop every timestamp that is `period` or more behind `now`.
    /// Returns how many entries were evicted.
    pub fn evict_expired(&mut self, now: Instant, period: Duration) -> usize {
        let before = self.timestamps.len();
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= period {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        before - self.timestamps.len()
    }

    /// Append an admitted call. Returns `false` and records nothing when full.
    pub fn record(&mut self, now: Instant) -> bool {
        if self.is_full() {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }
}
