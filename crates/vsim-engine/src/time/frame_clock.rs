use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame start.
    pub elapsed: Duration,

    /// Monotonic timestamp taken at the restart.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// The first restart measures from clock creation. Elapsed time is reported
/// unclamped; it is a measurement, not a simulation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start, frame_index: 0 }
    }

    /// Time since the current frame started, without restarting.
    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.start)
    }

    /// Measures the time since the previous frame start and starts a new frame.
    pub fn restart(&mut self) -> FrameTime {
        self.restart_at(Instant::now())
    }

    /// Like [`restart`](Self::restart) with an explicit timestamp.
    pub fn restart_at(&mut self, now: Instant) -> FrameTime {
        let ft = FrameTime {
            elapsed: now.saturating_duration_since(self.start),
            now,
            frame_index: self.frame_index,
        };

        self.start = now;
        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_measures_from_previous_start() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);

        let a = clock.restart_at(t0 + Duration::from_millis(16));
        assert_eq!(a.elapsed, Duration::from_millis(16));
        assert_eq!(a.frame_index, 0);

        let b = clock.restart_at(t0 + Duration::from_millis(40));
        assert_eq!(b.elapsed, Duration::from_millis(24));
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn time_going_backwards_saturates_to_zero() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(t0);
        let ft = clock.restart_at(t0 - Duration::from_millis(5));
        assert_eq!(ft.elapsed, Duration::ZERO);
    }
}
