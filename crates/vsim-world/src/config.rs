use glam::Vec3;

use vsim_engine::device::ClearColor;

use crate::object::BALL_MESH;
use crate::rain::RainConfig;

/// Projection parameters and the starting eye position.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 90.0,
            near: 0.1,
            far: 3000.0,
            eye: Vec3::new(0.0, 3.0, -8.0),
            up: Vec3::Y,
        }
    }
}

/// Point light used by the lit program.
#[derive(Debug, Clone, PartialEq)]
pub struct LightConfig {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.0, 10.0, -4.0),
            color: Vec3::ONE,
        }
    }
}

/// Everything the render loop needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub camera: CameraConfig,
    pub rain: RainConfig,

    /// Frames between frame-rate reports.
    pub frame_rate_period: u32,

    pub clear_color: ClearColor,

    /// Scene object the camera looks at.
    pub tracked_object: String,

    /// Added to the tracked object's position to get the look-at target.
    pub target_offset: Vec3,

    /// Fixed physics step per update, in seconds.
    pub physics_step: f32,

    /// Send the lit program's camera position as (x, y, y) instead of (x, y, z).
    pub legacy_camera_position_yy: bool,

    pub ball_mesh: String,
    pub ball_start: Vec3,
    pub light: LightConfig,

    /// Checker tiling for the textured program.
    pub checker_scale: Vec3,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            rain: RainConfig::default(),
            frame_rate_period: 30,
            clear_color: ClearColor::gray(0.4),
            tracked_object: "Ball".to_string(),
            target_offset: Vec3::ZERO,
            physics_step: 1.0 / 60.0,
            legacy_camera_position_yy: false,
            ball_mesh: BALL_MESH.to_string(),
            ball_start: Vec3::new(0.0, 2.0, 0.0),
            light: LightConfig::default(),
            checker_scale: Vec3::splat(4.0),
        }
    }
}
