use glam::Vec3;

use vsim_engine::core::AppControl;
use vsim_engine::device::{ContextError, GraphicsContext};
use vsim_engine::time::FrameClock;

use crate::camera::{Camera, CameraError};
use crate::config::WorldConfig;
use crate::controls::Command;
use crate::diagnostics::{Diagnostics, FrameRateSampler, StatusDisplay};
use crate::object::{
    BuiltinMeshes, HeightField, InitCtx, MeshLibrary, MeshSource, RollingBall, SurfaceMesh,
};
use crate::rain::RainDrops;
use crate::scene::{SceneError, SceneRegistry};
use crate::shader::{BuiltinShaders, ShaderError, ShaderRegistry, ShaderRole, ShaderSource};

pub const SURFACE_NAME: &str = "Surface";
pub const BALL_NAME: &str = "Ball";

const SURFACE_HALF_EXTENT: f32 = 10.0;
const SURFACE_RESOLUTION: usize = 40;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Uninitialized,
    Initializing,
    Running,
}

/// Failure while bringing the world up. Never recovered from.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("graphics context unavailable: {0}")]
    Context(#[from] ContextError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Owns the world and drives it one frame per tick.
pub struct RenderLoop {
    config: WorldConfig,
    state: LoopState,

    shader_source: Box<dyn ShaderSource>,
    meshes: MeshLibrary,

    shaders: Option<ShaderRegistry>,
    diagnostics: Option<Diagnostics>,
    camera: Camera,
    scene: SceneRegistry,
    rain: RainDrops,

    clock: FrameClock,
    sampler: FrameRateSampler,
    warned_missing_target: bool,
}

impl RenderLoop {
    pub fn new(config: WorldConfig) -> Self {
        Self::with_sources(
            config,
            Box::new(BuiltinShaders),
            Box::new(BuiltinMeshes::default()),
        )
    }

    pub fn with_sources(
        config: WorldConfig,
        shader_source: Box<dyn ShaderSource>,
        mesh_source: Box<dyn MeshSource>,
    ) -> Self {
        Self {
            camera: Camera::new(config.camera.eye),
            rain: RainDrops::new(config.rain.clone()),
            sampler: FrameRateSampler::new(config.frame_rate_period),
            config,
            state: LoopState::Uninitialized,
            shader_source,
            meshes: MeshLibrary::new(mesh_source),
            shaders: None,
            diagnostics: None,
            scene: SceneRegistry::new(),
            clock: FrameClock::new(),
            warned_missing_target: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rain(&self) -> &RainDrops {
        &self.rain
    }

    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    pub fn shaders(&self) -> Option<&ShaderRegistry> {
        self.shaders.as_ref()
    }

    /// Sets the world up on the first call. Later calls do nothing.
    ///
    /// On error the loop stays in [`LoopState::Initializing`] and never ticks.
    pub fn on_exposed(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), SetupError> {
        if self.state != LoopState::Uninitialized {
            return Ok(());
        }
        self.state = LoopState::Initializing;

        if let Err(err) = self.setup(gfx) {
            log::error!("setup failed: {err}");
            return Err(err);
        }

        self.clock = FrameClock::new();
        self.state = LoopState::Running;
        log::info!("render loop running");
        Ok(())
    }

    fn setup(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), SetupError> {
        gfx.make_current()?;

        let info = gfx.renderer_info();
        log::info!("GPU vendor: {}", info.vendor);
        log::info!("GPU renderer: {}", info.renderer);
        log::info!("GPU driver: {}", info.version);

        let diagnostics = Diagnostics::start(gfx);
        let mut shaders = ShaderRegistry::load_all(gfx, self.shader_source.as_ref())?;

        let (width, height) = gfx.drawable_size();
        let cam = self.config.camera.clone();
        self.camera
            .set_projection(cam.fov_y_degrees, aspect(width, height), cam.near, cam.far)?;

        self.scene.insert(
            SURFACE_NAME,
            SurfaceMesh::new(HeightField::rolling_hills(SURFACE_HALF_EXTENT, SURFACE_RESOLUTION)),
        )?;
        self.scene.insert(
            BALL_NAME,
            RollingBall::new(
                self.config.ball_mesh.as_str(),
                self.config.ball_start,
                self.config.physics_step,
            ),
        )?;
        self.scene.wire(BALL_NAME, SURFACE_NAME)?;
        self.scene.init_all(&mut InitCtx {
            gfx: &mut *gfx,
            meshes: &mut self.meshes,
        })?;

        self.push_static_uniforms(gfx, &mut shaders);
        let target = self.look_target();
        self.camera.look_at(cam.eye, target, cam.up);

        diagnostics.check(gfx);
        self.shaders = Some(shaders);
        self.diagnostics = Some(diagnostics);
        Ok(())
    }

    /// Uniforms that never change after setup.
    fn push_static_uniforms(&self, gfx: &mut dyn GraphicsContext, shaders: &mut ShaderRegistry) {
        shaders.set_uniform_vec3(gfx, ShaderRole::Textured, "checkerScale", self.config.checker_scale);

        if let Some(field) = self.scene.first_surface() {
            let (min, max) = field.height_range();
            shaders.set_uniform_vec3(gfx, ShaderRole::Height, "heightRange", Vec3::new(min, max, 0.0));
        }
    }

    /// Renders one frame. Does nothing until setup has succeeded.
    pub fn tick(&mut self, gfx: &mut dyn GraphicsContext, status: &mut dyn StatusDisplay) {
        if self.state != LoopState::Running {
            return;
        }
        let frame = self.clock.restart();

        if let Err(err) = gfx.make_current() {
            match err {
                ContextError::ZeroSized => log::trace!("drawable has zero area; skipping frame"),
                err => log::error!("could not make the graphics context current: {err}"),
            }
            return;
        }

        let (width, height) = gfx.drawable_size();
        if width == 0 || height == 0 {
            log::trace!("drawable has zero area; skipping frame");
            return;
        }

        gfx.clear(self.config.clear_color);
        self.update_camera(width, height);

        let Some(shaders) = self.shaders.as_mut() else {
            return;
        };
        broadcast_camera(gfx, shaders, &self.camera, &self.config);

        self.rain.advance_and_draw(gfx, shaders);
        self.scene.update_and_draw(gfx, shaders);

        gfx.swap_buffers();

        if let Some(report) = self.sampler.record(frame.elapsed) {
            status.show_message(&report.to_string());
        }
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.check(gfx);
        }
    }

    fn update_camera(&mut self, width: u32, height: u32) {
        let cam = &self.config.camera;
        if let Err(err) =
            self.camera
                .set_projection(cam.fov_y_degrees, aspect(width, height), cam.near, cam.far)
        {
            log::warn!("{err}");
        }

        let target = self.look_target();
        let eye = self.camera.position();
        let up = self.config.camera.up;
        self.camera.look_at(eye, target, up);
    }

    /// Tracked object position plus offset, or the origin when it is missing.
    fn look_target(&mut self) -> Vec3 {
        match self.scene.position_of(&self.config.tracked_object) {
            Some(position) => position + self.config.target_offset,
            None => {
                if !self.warned_missing_target {
                    log::warn!(
                        "tracked object '{}' not found; looking at the origin",
                        self.config.tracked_object
                    );
                    self.warned_missing_target = true;
                }
                Vec3::ZERO
            }
        }
    }

    /// Applies a mapped input command.
    pub fn handle_command(&mut self, gfx: &mut dyn GraphicsContext, command: Command) -> AppControl {
        match command {
            Command::MoveEye(delta) => {
                self.camera.translate_eye(delta);
                log::trace!("eye moved to {}", self.camera.position());
            }
            Command::ToggleRain => self.toggle_rain(gfx),
            Command::Exit => {
                log::info!("exit requested");
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn toggle_rain(&mut self, gfx: &mut dyn GraphicsContext) {
        if self.state != LoopState::Running {
            log::debug!("ignoring rain toggle before setup");
            return;
        }

        let surface = self.scene.first_surface();
        let mut ctx = InitCtx {
            gfx,
            meshes: &mut self.meshes,
        };
        match self.rain.toggle(
            &mut ctx,
            &self.config.ball_mesh,
            self.config.physics_step,
            surface.as_ref(),
        ) {
            Ok(true) => log::info!("rain on ({} drops)", self.rain.len()),
            Ok(false) => log::info!("rain off"),
            Err(err) => log::error!("could not start rain: {err}"),
        }
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

/// Lit program's camera position. The legacy form repeats Y in place of Z.
fn camera_position(eye: Vec3, legacy_yy: bool) -> Vec3 {
    if legacy_yy {
        Vec3::new(eye.x, eye.y, eye.y)
    } else {
        eye
    }
}

/// Activates every program in role order and pushes the camera uniforms.
fn broadcast_camera(
    gfx: &mut dyn GraphicsContext,
    shaders: &mut ShaderRegistry,
    camera: &Camera,
    config: &WorldConfig,
) {
    let view = camera.view();
    let projection = camera.projection();

    for role in ShaderRole::ALL {
        shaders.use_program(gfx, role);
        shaders.set_uniform_mat4(gfx, role, "vMatrix", &view);
        shaders.set_uniform_mat4(gfx, role, "pMatrix", &projection);

        if role == ShaderRole::Lit {
            let position = camera_position(camera.position(), config.legacy_camera_position_yy);
            shaders.set_uniform_vec3(gfx, role, "cameraPosition", position);
            shaders.set_uniform_vec3(gfx, role, "lightPosition", config.light.position);
            shaders.set_uniform_vec3(gfx, role, "lightColor", config.light.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LogStatus;
    use crate::rain::RainConfig;
    use crate::shader::StageSources;
    use crate::testing::{Call, RecordingContext};
    use vsim_engine::device::ProgramHandle;

    struct BrokenFragment(ShaderRole);

    impl ShaderSource for BrokenFragment {
        fn source(&self, role: ShaderRole) -> Result<StageSources, ShaderError> {
            let mut src = BuiltinShaders.source(role)?;
            if role == self.0 {
                src.fragment = "fn main() {}".into();
            }
            Ok(src)
        }
    }

    fn seeded_config() -> WorldConfig {
        WorldConfig {
            rain: RainConfig { seed: Some(11), ..RainConfig::default() },
            ..WorldConfig::default()
        }
    }

    fn running(config: WorldConfig) -> (RenderLoop, RecordingContext) {
        let mut gfx = RecordingContext::new(1280, 720);
        let mut world = RenderLoop::new(config);
        world.on_exposed(&mut gfx).unwrap();
        gfx.reset_calls();
        (world, gfx)
    }

    fn program(world: &RenderLoop, role: ShaderRole) -> ProgramHandle {
        world.shaders().and_then(|s| s.get(role)).unwrap().handle()
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn exposing_twice_sets_up_once() {
        let mut gfx = RecordingContext::new(1280, 720);
        let mut world = RenderLoop::new(seeded_config());

        world.on_exposed(&mut gfx).unwrap();
        world.on_exposed(&mut gfx).unwrap();

        assert_eq!(world.state(), LoopState::Running);
        assert_eq!(gfx.compiled_labels().len(), 4);
        assert_eq!(world.scene().len(), 2);
    }

    #[test]
    fn invalid_fragment_aborts_setup() {
        let mut gfx = RecordingContext::new(1280, 720);
        let mut world = RenderLoop::with_sources(
            seeded_config(),
            Box::new(BrokenFragment(ShaderRole::Textured)),
            Box::new(BuiltinMeshes::default()),
        );

        let err = world.on_exposed(&mut gfx).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Shader(ShaderError::Compile { role: ShaderRole::Textured, .. })
        ));
        assert_ne!(world.state(), LoopState::Running);

        // Never ticks afterwards.
        gfx.reset_calls();
        world.tick(&mut gfx, &mut LogStatus);
        assert!(gfx.calls().is_empty());
    }

    #[test]
    fn unavailable_context_aborts_setup() {
        let mut gfx = RecordingContext::new(1280, 720);
        gfx.fail_make_current(ContextError::Other("no adapter".to_string()));
        let mut world = RenderLoop::new(seeded_config());

        assert!(matches!(world.on_exposed(&mut gfx), Err(SetupError::Context(_))));
        assert_eq!(world.state(), LoopState::Initializing);
    }

    #[test]
    fn unknown_ball_mesh_aborts_setup() {
        let mut gfx = RecordingContext::new(1280, 720);
        let mut world = RenderLoop::new(WorldConfig {
            ball_mesh: "teapot.obj".to_string(),
            ..seeded_config()
        });

        assert!(matches!(
            world.on_exposed(&mut gfx),
            Err(SetupError::Scene(SceneError::Init { .. }))
        ));
    }

    #[test]
    fn surface_and_ball_start_where_configured() {
        let start = Vec3::new(1.0, 2.5, -1.0);
        let (mut world, mut gfx) = running(WorldConfig { ball_start: start, ..seeded_config() });

        assert_eq!(world.scene().names().collect::<Vec<_>>(), vec![SURFACE_NAME, BALL_NAME]);
        assert_eq!(world.scene().position_of(BALL_NAME), Some(start));

        world.tick(&mut gfx, &mut LogStatus);
        assert_eq!(world.scene().position_of(BALL_NAME), Some(start));
    }

    #[test]
    fn static_uniforms_are_pushed_at_setup() {
        let mut gfx = RecordingContext::new(1280, 720);
        let mut world = RenderLoop::new(seeded_config());
        world.on_exposed(&mut gfx).unwrap();

        let height = gfx.uniform_writes(program(&world, ShaderRole::Height));
        assert_eq!(height.len(), 1);
        assert_eq!(height[0].0, 128);
        let (min, max) = (height[0].1[0], height[0].1[1]);
        assert!(min < max);

        let textured = gfx.uniform_writes(program(&world, ShaderRole::Textured));
        assert_eq!(textured, vec![(128, vec![4.0, 4.0, 4.0])]);
    }

    // ── frame protocol ────────────────────────────────────────────────────

    #[test]
    fn frame_runs_in_protocol_order() {
        let (mut world, mut gfx) = running(seeded_config());
        world.tick(&mut gfx, &mut LogStatus);

        let calls = gfx.calls();
        assert_eq!(calls[0], Call::MakeCurrent);
        assert!(matches!(calls[1], Call::Clear(c) if c == world.config().clear_color));
        assert_eq!(calls.last(), Some(&Call::Swap));

        let programs: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::UseProgram(p) => Some(*p),
                _ => None,
            })
            .collect();
        let first_four: Vec<_> = ShaderRole::ALL.iter().map(|&r| program(&world, r)).collect();
        assert_eq!(&programs[..4], &first_four[..]);

        let last_uniform = calls
            .iter()
            .rposition(|c| matches!(c, Call::WriteUniform { .. }))
            .unwrap();
        let first_draw = calls
            .iter()
            .position(|c| matches!(c, Call::DrawMesh { .. }))
            .unwrap();
        assert!(last_uniform < first_draw);
        assert_eq!(gfx.draws(), 2);
    }

    #[test]
    fn failed_make_current_abandons_the_frame() {
        let (mut world, mut gfx) = running(seeded_config());

        gfx.fail_make_current(ContextError::Timeout);
        world.tick(&mut gfx, &mut LogStatus);
        assert_eq!(gfx.calls(), &[Call::MakeCurrent]);

        gfx.reset_calls();
        world.tick(&mut gfx, &mut LogStatus);
        assert_eq!(gfx.draws(), 2);
    }

    #[test]
    fn zero_area_drawable_skips_the_frame() {
        let (mut world, mut gfx) = running(seeded_config());
        gfx.set_size(0, 720);

        world.tick(&mut gfx, &mut LogStatus);
        assert_eq!(gfx.draws(), 0);
        assert!(!gfx.calls().contains(&Call::Swap));
    }

    #[test]
    fn lit_camera_position_is_the_eye() {
        let (mut world, mut gfx) = running(seeded_config());
        world.tick(&mut gfx, &mut LogStatus);

        let writes = gfx.uniform_writes(program(&world, ShaderRole::Lit));
        let camera_position: Vec<_> = writes.iter().filter(|(offset, _)| *offset == 128).collect();
        assert_eq!(camera_position.len(), 1);
        assert_eq!(camera_position[0].1, vec![0.0, 3.0, -8.0]);
    }

    #[test]
    fn legacy_camera_position_repeats_y() {
        let (mut world, mut gfx) = running(WorldConfig {
            legacy_camera_position_yy: true,
            ..seeded_config()
        });
        world.tick(&mut gfx, &mut LogStatus);

        let writes = gfx.uniform_writes(program(&world, ShaderRole::Lit));
        let position = writes.iter().find(|(offset, _)| *offset == 128).unwrap();
        assert_eq!(position.1, vec![0.0, 3.0, 3.0]);
    }

    #[test]
    fn missing_tracked_object_looks_at_the_origin() {
        let (mut world, mut gfx) = running(WorldConfig {
            tracked_object: "Teapot".to_string(),
            ..seeded_config()
        });
        world.tick(&mut gfx, &mut LogStatus);

        let mut expected = Camera::new(world.config().camera.eye);
        expected.look_at(world.config().camera.eye, Vec3::ZERO, Vec3::Y);

        let writes = gfx.uniform_writes(program(&world, ShaderRole::Plain));
        let view = writes.iter().find(|(offset, _)| *offset == 0).unwrap();
        assert_eq!(view.1, expected.view().to_cols_array().to_vec());
    }

    #[test]
    fn camera_tracks_the_ball() {
        let (mut world, mut gfx) = running(seeded_config());
        world.tick(&mut gfx, &mut LogStatus);

        let ball = world.scene().position_of(BALL_NAME).unwrap();
        let p = world.camera().view().transform_point3(ball);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
    }

    // ── commands ──────────────────────────────────────────────────────────

    #[test]
    fn move_commands_shift_the_eye() {
        let (mut world, mut gfx) = running(seeded_config());
        world.handle_command(&mut gfx, Command::MoveEye(Vec3::Z));
        world.handle_command(&mut gfx, Command::MoveEye(Vec3::NEG_X));

        assert_eq!(world.camera().position(), Vec3::new(-1.0, 3.0, -7.0));
    }

    #[test]
    fn exit_command_stops_the_loop() {
        let (mut world, mut gfx) = running(seeded_config());
        assert_eq!(world.handle_command(&mut gfx, Command::Exit), AppControl::Exit);
        assert_eq!(
            world.handle_command(&mut gfx, Command::MoveEye(Vec3::Y)),
            AppControl::Continue
        );
    }

    #[test]
    fn only_escape_ends_the_run() {
        use crate::controls::Controls;
        use vsim_engine::input::{InputEvent, Key, KeyState, Modifiers};

        let (mut world, mut gfx) = running(seeded_config());
        let controls = Controls::default();
        let press = |key| InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        };

        for _ in 0..5 {
            world.tick(&mut gfx, &mut LogStatus);
        }
        assert_eq!(gfx.calls().iter().filter(|c| **c == Call::Swap).count(), 5);

        for key in [Key::W, Key::I, Key::Q] {
            let command = controls.handle(&press(key)).unwrap();
            assert_eq!(world.handle_command(&mut gfx, command), AppControl::Continue);
        }

        let command = controls.handle(&press(Key::Escape)).unwrap();
        assert_eq!(world.handle_command(&mut gfx, command), AppControl::Exit);
    }

    #[test]
    fn rain_adds_one_draw_per_drop() {
        let (mut world, mut gfx) = running(seeded_config());

        world.handle_command(&mut gfx, Command::ToggleRain);
        assert!(world.rain().is_active());
        assert!(world.rain().drops().iter().all(|d| d.physics_enabled()));

        gfx.reset_calls();
        world.tick(&mut gfx, &mut LogStatus);
        assert_eq!(gfx.draws(), 52);

        world.handle_command(&mut gfx, Command::ToggleRain);
        assert!(world.rain().is_empty());
        gfx.reset_calls();
        world.tick(&mut gfx, &mut LogStatus);
        assert_eq!(gfx.draws(), 2);
    }

    #[test]
    fn rain_drops_are_drawn_before_named_objects() {
        let (mut world, mut gfx) = running(seeded_config());
        world.handle_command(&mut gfx, Command::ToggleRain);
        gfx.reset_calls();
        world.tick(&mut gfx, &mut LogStatus);

        let models: Vec<_> = gfx
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::DrawMesh { model, .. } => Some(*model),
                _ => None,
            })
            .collect();
        let first_drop = world.rain().drops()[0].model();
        assert_eq!(models[0], first_drop);
    }

    #[test]
    fn rain_toggle_before_setup_is_ignored() {
        let mut gfx = RecordingContext::new(1280, 720);
        let mut world = RenderLoop::new(seeded_config());

        world.handle_command(&mut gfx, Command::ToggleRain);
        assert!(!world.rain().is_active());
    }

    // ── frame rate ────────────────────────────────────────────────────────

    #[test]
    fn reports_reach_the_status_display() {
        let (mut world, mut gfx) = running(WorldConfig {
            frame_rate_period: 3,
            ..seeded_config()
        });
        let mut status: Vec<String> = Vec::new();

        for _ in 0..7 {
            world.tick(&mut gfx, &mut status);
        }

        assert_eq!(status.len(), 2);
        assert!(status[0].starts_with("Time pr FrameDraw: "));
    }

    #[test]
    fn sampler_period_does_not_change_rendering() {
        let record = |period: u32| {
            let (mut world, mut gfx) = running(WorldConfig {
                frame_rate_period: period,
                ..seeded_config()
            });
            world.handle_command(&mut gfx, Command::ToggleRain);
            for _ in 0..10 {
                world.tick(&mut gfx, &mut LogStatus);
            }
            gfx.calls().to_vec()
        };

        assert_eq!(record(1), record(1000));
    }
}
