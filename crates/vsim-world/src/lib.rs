//! VSIM world crate.
//!
//! Everything the viewer shows: the camera, shader programs, drawables and the
//! scene they live in, rain, diagnostics and the per-tick render loop. The GPU
//! is only ever reached through [`vsim_engine::device::GraphicsContext`].

pub mod camera;
pub mod config;
pub mod controls;
pub mod diagnostics;
pub mod object;
pub mod rain;
pub mod render_loop;
pub mod scene;
pub mod shader;

#[cfg(test)]
mod testing;

pub use camera::{Camera, CameraError};
pub use config::{CameraConfig, LightConfig, WorldConfig};
pub use controls::{Command, Controls};
pub use rain::{RainConfig, RainDrops};
pub use render_loop::{LoopState, RenderLoop, SetupError};
pub use scene::{SceneError, SceneRegistry};
