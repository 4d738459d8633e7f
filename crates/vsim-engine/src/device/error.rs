use std::fmt;

use super::context::ShaderStage;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM).
    Fatal,
}

/// Failure to make the context current for a frame.
///
/// None of these are fatal to the process: the frame is abandoned and the next
/// tick tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("surface lost or outdated; reconfigured for the next frame")]
    Reconfigured,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("out of memory acquiring the next frame")]
    OutOfMemory,
    #[error("drawable has zero area")]
    ZeroSized,
    #[error("{0}")]
    Other(String),
}

impl ContextError {
    /// True for errors after which rendering is unlikely to recover on its own.
    pub fn is_fatal_class(&self) -> bool {
        matches!(self, ContextError::OutOfMemory | ContextError::Other(_))
    }
}

/// Failure to build a program from vertex + fragment sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program failed to link: {log}")]
    Link { log: String },
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}
