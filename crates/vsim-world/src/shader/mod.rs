//! Shader registry: the four role-keyed programs and their uniform layouts.

mod error;
mod program;
mod registry;
mod role;
mod source;

pub use error::ShaderError;
pub use program::{ShaderProgram, UniformLayout, UniformSlot, UniformType};
pub use registry::ShaderRegistry;
pub use role::ShaderRole;
pub use source::{BuiltinShaders, ShaderSource, StageSources};
