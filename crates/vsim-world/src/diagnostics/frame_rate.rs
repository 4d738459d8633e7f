use std::fmt;
use std::time::Duration;

/// One frame-time sample, ready for display.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameRateReport {
    pub frame_time: Duration,
    /// Reciprocal of `frame_time`; infinite for a zero-length frame.
    pub fps: f64,
}

impl FrameRateReport {
    pub fn from_frame_time(frame_time: Duration) -> Self {
        let secs = frame_time.as_secs_f64();
        let fps = if secs > 0.0 { 1.0 / secs } else { f64::INFINITY };
        Self { frame_time, fps }
    }
}

impl fmt::Display for FrameRateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time pr FrameDraw: {:.4} ms  |  FPS (approximated): {:.1}",
            self.frame_time.as_secs_f64() * 1000.0,
            self.fps
        )
    }
}

/// Emits a report every `period` frames.
///
/// Pure observer: it sees frame times and nothing else.
#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    period: u32,
    frames: u32,
}

impl FrameRateSampler {
    pub const DEFAULT_PERIOD: u32 = 30;

    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            frames: 0,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Counts one frame. Every `period`-th call returns a report built from
    /// that frame's time and resets the counter.
    pub fn record(&mut self, frame_time: Duration) -> Option<FrameRateReport> {
        self.frames += 1;
        if self.frames < self.period {
            return None;
        }
        self.frames = 0;
        Some(FrameRateReport::from_frame_time(frame_time))
    }
}

impl Default for FrameRateSampler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    #[test]
    fn reports_once_per_period() {
        let mut sampler = FrameRateSampler::new(30);
        let reports = (0..90).filter_map(|_| sampler.record(FRAME)).count();
        assert_eq!(reports, 3);
    }

    #[test]
    fn report_uses_the_latest_frame_time() {
        let mut sampler = FrameRateSampler::new(3);
        assert!(sampler.record(Duration::from_millis(50)).is_none());
        assert!(sampler.record(Duration::from_millis(50)).is_none());
        let report = sampler.record(Duration::from_millis(20)).unwrap();

        assert_eq!(report.frame_time, Duration::from_millis(20));
        assert!((report.fps - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_period_reports_every_frame() {
        let mut sampler = FrameRateSampler::new(0);
        assert_eq!(sampler.period(), 1);
        assert!(sampler.record(FRAME).is_some());
    }

    #[test]
    fn formats_for_the_status_line() {
        let report = FrameRateReport::from_frame_time(Duration::from_millis(4));
        assert_eq!(
            report.to_string(),
            "Time pr FrameDraw: 4.0000 ms  |  FPS (approximated): 250.0"
        );
    }

    #[test]
    fn zero_frame_time_is_infinite_fps() {
        let report = FrameRateReport::from_frame_time(Duration::ZERO);
        assert!(report.fps.is_infinite());
    }
}
