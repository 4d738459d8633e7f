use winit::dpi::PhysicalSize;

use vsim_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use vsim_engine::input::InputEvent;
use vsim_world::diagnostics::StatusDisplay;
use vsim_world::{Controls, RenderLoop, WorldConfig};

/// Shows status messages in the window title, after the base title.
struct TitleStatus<'a> {
    window: &'a WindowCtx<'a>,
    base: &'a str,
}

impl StatusDisplay for TitleStatus<'_> {
    fn show_message(&mut self, message: &str) {
        self.window.set_title(&format!("{}  |  {message}", self.base));
    }
}

/// Hooks the world's render loop into the engine runtime.
pub struct ViewerApp {
    title: String,
    world: RenderLoop,
    controls: Controls,
}

impl ViewerApp {
    pub fn new(title: impl Into<String>, config: WorldConfig) -> Self {
        Self {
            title: title.into(),
            world: RenderLoop::new(config),
            controls: Controls::default(),
        }
    }
}

impl App for ViewerApp {
    fn on_exposed(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()> {
        let size = ctx.window.size();
        log::debug!("window exposed at {}x{}", size.width, size.height);
        self.world.on_exposed(&mut *ctx.gpu)?;
        Ok(())
    }

    fn on_input(&mut self, ctx: &mut FrameCtx<'_, '_>, event: &InputEvent) -> AppControl {
        match self.controls.handle(event) {
            Some(command) => self.world.handle_command(&mut *ctx.gpu, command),
            None => AppControl::Continue,
        }
    }

    fn on_resized(&mut self, _ctx: &mut FrameCtx<'_, '_>, size: PhysicalSize<u32>) {
        // Projection follows the drawable size on the next tick.
        log::debug!("resized to {}x{}", size.width, size.height);
    }

    fn on_tick(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let mut status = TitleStatus {
            window: &ctx.window,
            base: &self.title,
        };
        self.world.tick(&mut *ctx.gpu, &mut status);
        AppControl::Continue
    }
}
