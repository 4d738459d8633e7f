//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime:
//! - `FrameClock` measures the time between consecutive frame starts
//! - `TickScheduler` produces the fixed-interval tick deadlines the runtime waits on

mod frame_clock;
mod tick;

pub use frame_clock::{FrameClock, FrameTime};
pub use tick::TickScheduler;
