//! VSIM engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by higher layers:
//! the winit window loop, the wgpu device behind [`device::GraphicsContext`],
//! input translation, frame timing and logging setup.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
