//! Item id generation
//!
//! Ids are millisecond timestamps, bumped forward when two items are created
//! within the same millisecond so that a single process never hands out the
//! same id twice. Separate processes writing the same file can still collide.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Monotonic, time-derived id source
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id: the current time in milliseconds, or one past the previous id
    /// if the clock has not moved forward.
    pub fn next_id(&self) -> i64 {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_ms: i64) -> i64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}
