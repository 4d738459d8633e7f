use winit::dpi::PhysicalSize;

use crate::input::InputEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// All callbacks run on the event-loop thread and never overlap.
pub trait App {
    /// Called when the window becomes visible. The first call is where setup
    /// happens; later calls (window shown again after being hidden) should be
    /// no-ops. An error terminates the runtime and is returned from
    /// [`Runtime::run`](crate::window::Runtime::run).
    fn on_exposed(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for every translated key, focus and modifier event.
    fn on_input(&mut self, ctx: &mut FrameCtx<'_, '_>, event: &InputEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called after the surface has been reconfigured for a new size.
    fn on_resized(&mut self, ctx: &mut FrameCtx<'_, '_>, size: PhysicalSize<u32>) {
        let _ = (ctx, size);
    }

    /// Called once per fixed-interval tick.
    fn on_tick(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
