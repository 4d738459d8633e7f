//! Driver diagnostics and frame-rate reporting.

mod driver;
mod frame_rate;
mod status;

pub use driver::{explain_code, is_noise, level_for, Diagnostics, DiagnosticsTier};
pub use frame_rate::{FrameRateReport, FrameRateSampler};
pub use status::{LogStatus, StatusDisplay};
