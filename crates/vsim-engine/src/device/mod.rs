//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and its depth target
//! - exposing the per-frame [`GraphicsContext`] contract used by the scene layer

mod context;
mod debug;
mod error;
mod frame;
mod gpu;
mod init;
mod mesh;
mod program;
mod surface;

pub use context::{
    ClearColor, GraphicsContext, MeshHandle, ProgramDesc, ProgramHandle, RendererInfo,
    ShaderStage, DEBUG_OUTPUT_EXTENSION,
};
pub use debug::{error_code, DebugMessage, MessageKind, Severity};
pub use error::{ContextError, ProgramError, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
pub use mesh::{MeshData, Vertex};
