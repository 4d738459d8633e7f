//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s through
//! [`platform::translate_window_event`].

pub(crate) mod platform;
mod state;
mod types;

pub(crate) use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers};
