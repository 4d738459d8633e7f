use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::InputState;
use crate::time::TickScheduler;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Nominal interval between ticks. Presentation blocking on vsync is what
    /// actually paces frames; this only bounds how often a tick is attempted.
    pub tick_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vsim".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            tick_interval: Duration::from_millis(16),
        }
    }
}

/// Runtime context passed to the application.
///
/// Requests are applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and runs `app` until the window closes or the app asks
    /// to exit.
    ///
    /// Returns the error that stopped the runtime, if any: window or GPU creation
    /// failure, or a failed [`CoreApp::on_exposed`].
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    ticks: TickScheduler,

    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        let ticks = TickScheduler::new(config.tick_interval, Instant::now());
        Self {
            config,
            gpu_init,
            app,
            window: None,
            ticks,
            exit_requested: false,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        self.window = Some(entry);
        Ok(())
    }

    /// Runs `f` with a fresh [`FrameCtx`] for the window, then applies the
    /// runtime requests it made.
    fn dispatch<R>(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        f: impl FnOnce(&mut A, &mut FrameCtx<'_, '_>) -> R,
    ) -> Option<R> {
        let app = &mut self.app;
        let entry = self.window.as_mut()?;
        let mut runtime_ctx = RuntimeCtx::default();

        let out = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                runtime: &mut runtime_ctx,
            };
            f(app, &mut ctx)
        });

        if runtime_ctx.exit_requested() {
            self.exit_requested = true;
            event_loop.exit();
        }

        Some(out)
    }

    fn expose(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        if let Some(Err(err)) = self.dispatch(event_loop, window_id, |app, ctx| app.on_exposed(ctx)) {
            self.fail(event_loop, err.context("scene setup failed"));
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
            return;
        }

        let Some(window_id) = self.window.as_ref().map(|e| e.with_window(|w| w.id())) else {
            return;
        };

        self.expose(event_loop, window_id);
        self.ticks = TickScheduler::new(self.config.tick_interval, Instant::now());
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.ticks.poll(Instant::now()) {
            if let Some(entry) = self.window.as_ref() {
                entry.with_window(|w| w.request_redraw());
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.ticks.deadline()));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        // Keyboard, focus and modifiers go to the app; window lifecycle is handled here.
        let translated = entry.with_mut(|fields| {
            let ev = translate_window_event(fields.input_state, &event)?;
            fields.input_state.apply_event(&ev);
            Some(ev)
        });

        if let Some(ev) = translated {
            let control = self.dispatch(event_loop, window_id, |app, ctx| app.on_input(ctx, &ev));
            if control == Some(AppControl::Exit) {
                self.exit_requested = true;
                event_loop.exit();
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
                self.dispatch(event_loop, window_id, |app, ctx| app.on_resized(ctx, new_size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let Some(new_size) = self.window.as_mut().map(|entry| {
                    let size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    size
                }) else {
                    return;
                };
                self.dispatch(event_loop, window_id, |app, ctx| app.on_resized(ctx, new_size));
            }

            WindowEvent::Occluded(false) => self.expose(event_loop, window_id),

            WindowEvent::RedrawRequested => {
                let control = self.dispatch(event_loop, window_id, |app, ctx| app.on_tick(ctx));
                if control == Some(AppControl::Exit) {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GPU resources borrow the window; drop them before the loop goes away.
        self.window = None;
    }
}
