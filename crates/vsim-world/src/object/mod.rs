//! Drawable objects: the terrain surface and rolling balls.

mod ball;
mod height_field;
mod mesh;
mod surface;

use glam::Vec3;

use vsim_engine::device::{ContextError, GraphicsContext};

use crate::shader::ShaderRegistry;

pub use ball::RollingBall;
pub use height_field::HeightField;
pub use mesh::{uv_sphere, BuiltinMeshes, MeshLibrary, MeshSource, BALL_MESH};
pub use surface::SurfaceMesh;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjectError {
    #[error("no mesh named '{0}'")]
    UnknownMesh(String),

    #[error("failed to upload {what} geometry: {source}")]
    Upload {
        what: String,
        #[source]
        source: ContextError,
    },
}

/// What an object needs while initializing: the graphics context for uploads
/// and the shared mesh cache.
pub struct InitCtx<'a> {
    pub gfx: &'a mut dyn GraphicsContext,
    pub meshes: &'a mut MeshLibrary,
}

/// Capability set shared by everything the render loop draws.
pub trait Drawable {
    /// Uploads GPU resources. Called once before the first draw.
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> Result<(), ObjectError>;

    /// Recomputes the model transform, stepping physics where enabled.
    fn update_transform(&mut self);

    /// Issues draw calls with the current transform.
    fn draw(&self, ctx: &mut dyn GraphicsContext, shaders: &ShaderRegistry);

    fn position(&self) -> Vec3;
}

/// A named scene entry.
#[derive(Debug)]
pub enum SceneObject {
    Surface(SurfaceMesh),
    Ball(RollingBall),
}

impl SceneObject {
    pub fn as_surface(&self) -> Option<&SurfaceMesh> {
        match self {
            SceneObject::Surface(s) => Some(s),
            SceneObject::Ball(_) => None,
        }
    }

    pub fn as_ball(&self) -> Option<&RollingBall> {
        match self {
            SceneObject::Ball(b) => Some(b),
            SceneObject::Surface(_) => None,
        }
    }

    pub fn as_ball_mut(&mut self) -> Option<&mut RollingBall> {
        match self {
            SceneObject::Ball(b) => Some(b),
            SceneObject::Surface(_) => None,
        }
    }

    fn drawable(&self) -> &dyn Drawable {
        match self {
            SceneObject::Surface(s) => s,
            SceneObject::Ball(b) => b,
        }
    }

    fn drawable_mut(&mut self) -> &mut dyn Drawable {
        match self {
            SceneObject::Surface(s) => s,
            SceneObject::Ball(b) => b,
        }
    }
}

impl Drawable for SceneObject {
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> Result<(), ObjectError> {
        self.drawable_mut().init(ctx)
    }

    fn update_transform(&mut self) {
        self.drawable_mut().update_transform()
    }

    fn draw(&self, ctx: &mut dyn GraphicsContext, shaders: &ShaderRegistry) {
        self.drawable().draw(ctx, shaders)
    }

    fn position(&self) -> Vec3 {
        self.drawable().position()
    }
}

impl From<SurfaceMesh> for SceneObject {
    fn from(surface: SurfaceMesh) -> Self {
        SceneObject::Surface(surface)
    }
}

impl From<RollingBall> for SceneObject {
    fn from(ball: RollingBall) -> Self {
        SceneObject::Ball(ball)
    }
}
