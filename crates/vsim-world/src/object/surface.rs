use std::rc::Rc;

use glam::{Mat4, Vec3};

use vsim_engine::device::{GraphicsContext, MeshHandle};

use crate::shader::{ShaderRegistry, ShaderRole};

use super::height_field::HeightField;
use super::{Drawable, InitCtx, ObjectError};

/// Static terrain built from a [`HeightField`]. No physics of its own; balls
/// query it for height and normal.
#[derive(Debug)]
pub struct SurfaceMesh {
    field: Rc<HeightField>,
    mesh: Option<MeshHandle>,
    role: ShaderRole,
    model: Mat4,
}

impl SurfaceMesh {
    pub fn new(field: HeightField) -> Self {
        Self {
            field: Rc::new(field),
            mesh: None,
            role: ShaderRole::Plain,
            model: Mat4::IDENTITY,
        }
    }

    /// Shared handle to the height data, for wiring balls.
    pub fn field(&self) -> &Rc<HeightField> {
        &self.field
    }
}

impl Drawable for SurfaceMesh {
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> Result<(), ObjectError> {
        let data = self.field.to_mesh();
        let handle = ctx
            .gfx
            .upload_mesh(&data)
            .map_err(|source| ObjectError::Upload { what: "surface".to_string(), source })?;
        self.mesh = Some(handle);
        Ok(())
    }

    fn update_transform(&mut self) {
        // The surface never moves.
        self.model = Mat4::IDENTITY;
    }

    fn draw(&self, ctx: &mut dyn GraphicsContext, shaders: &ShaderRegistry) {
        let Some(mesh) = self.mesh else {
            return;
        };
        shaders.use_program(ctx, self.role);
        ctx.draw_mesh(mesh, &self.model);
    }

    fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }
}
