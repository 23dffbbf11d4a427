//! Latest-value hand-off between the optimizer and the render loop
//!
//! Holds at most one pending value. Publishing overwrites anything the
//! consumer has not taken yet, and neither side ever waits on the other
//! beyond the lock itself.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct CandidateSlot<T> {
    pending: Mutex<Option<T>>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl<T> Default for CandidateSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CandidateSlot<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Store `value` as the latest candidate.
    /// Returns true if an unconsumed candidate was discarded.
    pub fn publish(&self, value: T) -> bool {
        let replaced = self.pending.lock().replace(value).is_some();
        self.published.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        replaced
    }

    /// Take the most recent candidate, if one arrived since the last take
    pub fn take_latest(&self) -> Option<T> {
        self.pending.lock().take()
    }

    /// Candidates published so far
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Candidates overwritten before anyone took them
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_keeps_only_latest() {
        let slot = CandidateSlot::new();
        assert!(!slot.publish(1));
        assert!(slot.publish(2));
        assert!(slot.publish(3));

        assert_eq!(slot.take_latest(), Some(3));
        assert_eq!(slot.take_latest(), None);
        assert_eq!(slot.published(), 3);
        assert_eq!(slot.dropped(), 2);
    }

    #[test]
    fn test_empty_take_is_none() {
        let slot: CandidateSlot<Vec<f64>> = CandidateSlot::new();
        assert_eq!(slot.take_latest(), None);
        assert_eq!(slot.published(), 0);
    }

    #[test]
    fn test_consumer_sees_final_value() {
        let slot = Arc::new(CandidateSlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                for k in 0..1000u32 {
                    slot.publish(k);
                }
            })
        };

        let mut last_seen = None;
        while !producer.is_finished() {
            if let Some(v) = slot.take_latest() {
                if let Some(prev) = last_seen {
                    assert!(v > prev, "values arrive in publish order");
                }
                last_seen = Some(v);
            }
        }
        producer.join().unwrap();
        if let Some(v) = slot.take_latest() {
            last_seen = Some(v);
        }
        assert_eq!(last_seen, Some(999));
    }
}
