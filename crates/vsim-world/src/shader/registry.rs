use glam::{Mat4, Vec3};
use indexmap::IndexMap;

use vsim_engine::device::{GraphicsContext, ProgramDesc, ProgramError};

use super::error::ShaderError;
use super::program::{ShaderProgram, UniformLayout, UniformType};
use super::role::ShaderRole;
use super::source::ShaderSource;

/// Role-keyed set of compiled programs.
///
/// A registry always holds every [`ShaderRole`]; construction fails as a whole
/// if any role fails to build.
#[derive(Debug)]
pub struct ShaderRegistry {
    programs: IndexMap<ShaderRole, ShaderProgram>,
}

impl ShaderRegistry {
    /// Loads every role from `sources`, in [`ShaderRole::ALL`] order.
    pub fn load_all(
        ctx: &mut dyn GraphicsContext,
        sources: &dyn ShaderSource,
    ) -> Result<Self, ShaderError> {
        let mut programs = IndexMap::with_capacity(ShaderRole::ALL.len());

        for role in ShaderRole::ALL {
            let src = sources.source(role)?;
            let program = Self::load(ctx, role, &src.vertex, &src.fragment)?;
            log::debug!("loaded '{role}' program as {:?}", program.handle());
            programs.insert(role, program);
        }

        Ok(Self { programs })
    }

    /// Compiles and links one program.
    pub fn load(
        ctx: &mut dyn GraphicsContext,
        role: ShaderRole,
        vertex: &str,
        fragment: &str,
    ) -> Result<ShaderProgram, ShaderError> {
        let layout = UniformLayout::new(role.uniforms());

        let handle = ctx
            .compile_program(&ProgramDesc {
                label: role.as_str(),
                vertex,
                fragment,
                uniform_block_size: layout.size(),
            })
            .map_err(|err| match err {
                ProgramError::Compile { stage, log } => ShaderError::Compile { role, stage, log },
                ProgramError::Link { log } => ShaderError::Link { role, log },
            })?;

        Ok(ShaderProgram::new(role, handle, layout))
    }

    pub fn get(&self, role: ShaderRole) -> Option<&ShaderProgram> {
        self.programs.get(&role)
    }

    /// Roles in load order.
    pub fn roles(&self) -> impl Iterator<Item = ShaderRole> + '_ {
        self.programs.keys().copied()
    }

    pub fn use_program(&self, ctx: &mut dyn GraphicsContext, role: ShaderRole) {
        match self.programs.get(&role) {
            Some(program) => ctx.use_program(program.handle()),
            None => log::warn!("no program loaded for role '{role}'"),
        }
    }

    pub fn set_uniform_mat4(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        role: ShaderRole,
        name: &str,
        value: &Mat4,
    ) {
        let cols = value.to_cols_array();
        self.write(ctx, role, name, UniformType::Mat4, bytemuck::cast_slice(&cols));
    }

    pub fn set_uniform_vec3(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        role: ShaderRole,
        name: &str,
        value: Vec3,
    ) {
        let xyz = value.to_array();
        self.write(ctx, role, name, UniformType::Vec3, bytemuck::cast_slice(&xyz));
    }

    fn write(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        role: ShaderRole,
        name: &str,
        ty: UniformType,
        bytes: &[u8],
    ) {
        let Some(program) = self.programs.get_mut(&role) else {
            log::warn!("no program loaded for role '{role}'");
            return;
        };
        if let Some(slot) = program.resolve(name, ty) {
            ctx.write_uniform(program.handle(), slot.offset, bytes);
        }
    }
}
