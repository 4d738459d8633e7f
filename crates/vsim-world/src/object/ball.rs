use std::rc::{Rc, Weak};

use glam::{Mat4, Vec3};

use vsim_engine::device::{GraphicsContext, MeshHandle};

use crate::shader::{ShaderRegistry, ShaderRole};

use super::height_field::HeightField;
use super::{Drawable, InitCtx, ObjectError};

pub(super) const DEFAULT_RADIUS: f32 = 0.25;

const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Fraction of velocity lost per second while in contact with the surface.
const ROLLING_FRICTION: f32 = 0.4;

/// Balls that fall this far below the origin are parked.
const KILL_DEPTH: f32 = -100.0;

/// A sphere that can roll down a [`HeightField`].
///
/// The surface link is a non-owning back-reference: the ball never keeps the
/// surface alive, and a dropped surface simply means free fall.
#[derive(Debug)]
pub struct RollingBall {
    mesh_id: String,
    mesh: Option<MeshHandle>,
    role: ShaderRole,

    radius: f32,
    position: Vec3,
    velocity: Vec3,

    physics: bool,
    step: f32,
    life: u32,

    surface: Weak<HeightField>,
    model: Mat4,
}

impl RollingBall {
    /// Creates a ball at `position` with physics disabled.
    ///
    /// `step` is the fixed integration step used per update once physics is on.
    pub fn new(mesh_id: impl Into<String>, position: Vec3, step: f32) -> Self {
        Self {
            mesh_id: mesh_id.into(),
            mesh: None,
            role: ShaderRole::Plain,
            radius: DEFAULT_RADIUS,
            position,
            velocity: Vec3::ZERO,
            physics: false,
            step,
            life: 0,
            surface: Weak::new(),
            model: Mat4::from_translation(position),
        }
    }

    pub fn enable_physics(&mut self) {
        self.physics = true;
    }

    pub fn physics_enabled(&self) -> bool {
        self.physics
    }

    /// Links the ball to the surface it rolls on.
    pub fn set_surface(&mut self, field: &Rc<HeightField>) {
        self.surface = Rc::downgrade(field);
    }

    pub fn has_surface(&self) -> bool {
        self.surface.strong_count() > 0
    }

    /// Advances the lifetime counter of a transient ball.
    pub fn add_life(&mut self) {
        self.life = self.life.saturating_add(1);
    }

    pub fn life(&self) -> u32 {
        self.life
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    fn integrate(&mut self) {
        if self.position.y < KILL_DEPTH {
            self.velocity = Vec3::ZERO;
            return;
        }

        let dt = self.step;
        self.velocity += GRAVITY * dt;
        self.position += self.velocity * dt;

        let Some(field) = self.surface.upgrade() else {
            return;
        };
        let (Some(ground), Some(normal)) = (
            field.height_at(self.position.x, self.position.z),
            field.normal_at(self.position.x, self.position.z),
        ) else {
            return;
        };

        // Contact: rest on the surface, keep only the tangential velocity so the
        // ball rolls downhill along the slope.
        let floor = ground + self.radius;
        if self.position.y <= floor {
            self.position.y = floor;
            let into_surface = self.velocity.dot(normal);
            if into_surface < 0.0 {
                self.velocity -= normal * into_surface;
            }
            self.velocity *= (1.0 - ROLLING_FRICTION * dt).max(0.0);
        }
    }
}

impl Drawable for RollingBall {
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> Result<(), ObjectError> {
        self.mesh = Some(ctx.meshes.get_or_upload(ctx.gfx, &self.mesh_id)?);
        self.model = Mat4::from_translation(self.position);
        Ok(())
    }

    fn update_transform(&mut self) {
        if self.physics {
            self.integrate();
        }
        self.model = Mat4::from_translation(self.position);
    }

    fn draw(&self, ctx: &mut dyn GraphicsContext, shaders: &ShaderRegistry) {
        let Some(mesh) = self.mesh else {
            return;
        };
        shaders.use_program(ctx, self.role);
        ctx.draw_mesh(mesh, &self.model);
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}
