use std::sync::atomic::{AtomicI64, Ordering};

use jiff::Timestamp;

/// Wall-clock source that never hands out the same or an earlier instant
/// twice within a process.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_nanos: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Timestamp {
        let wall = i64::try_from(Timestamp::now().as_nanosecond()).unwrap_or(i64::MAX);
        let mut prev = self.last_nanos.load(Ordering::Relaxed);
        loop {
            let next = wall.max(prev.saturating_add(1));
            match self.last_nanos.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Timestamp::from_nanosecond(i128::from(next))
                        .unwrap_or(Timestamp::MAX);
                }
                Err(actual) => prev = actual,
            }
        }
    }
}
