use vsim_engine::device::ShaderStage;

use super::role::ShaderRole;

/// Failure to obtain or build a shader program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    #[error("unknown shader role '{0}'")]
    UnknownRole(String),

    #[error("no shader source for role '{role}': {reason}")]
    Source { role: ShaderRole, reason: String },

    #[error("{stage} shader for role '{role}' failed to compile:\n{log}")]
    Compile {
        role: ShaderRole,
        stage: ShaderStage,
        log: String,
    },

    #[error("shader program for role '{role}' failed to link:\n{log}")]
    Link { role: ShaderRole, log: String },
}
