use std::time::{Duration, Instant};

/// Fixed-interval tick deadlines.
///
/// Best-effort: a late tick fires once and the next deadline is measured from
/// the time it actually fired, so missed intervals are dropped instead of
/// replayed in a burst.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    next: Instant,
}

impl TickScheduler {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, next: now }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant the event loop should wake up at.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Returns `true` when a tick is due at `now` and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }
}
