use glam::Mat4;

use super::debug::DebugMessage;
use super::error::{ContextError, ProgramError};
use super::mesh::MeshData;

/// Extension name reported by contexts that can deliver structured debug messages.
pub const DEBUG_OUTPUT_EXTENSION: &str = "KHR_debug";

/// Opaque handle to a compiled program owned by a [`GraphicsContext`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(pub u32);

/// Opaque handle to uploaded mesh geometry owned by a [`GraphicsContext`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Straight-alpha clear color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v, a: 1.0 }
    }
}

/// Program sources handed to [`GraphicsContext::compile_program`].
///
/// Both stages are WGSL. The vertex stage's entry point is `vs_main`, the fragment
/// stage's is `fs_main`. The program gets a single uniform block at group 0,
/// binding 0, of `uniform_block_size` bytes.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub uniform_block_size: u64,
}

/// Adapter/driver identification, logged once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
}

/// Per-window graphics context.
///
/// The contract is deliberately close to an immediate-mode API:
/// a frame starts with [`make_current`](Self::make_current), records clears,
/// program activations, uniform writes and draws, and ends with
/// [`swap_buffers`](Self::swap_buffers).
///
/// Uniform writes are visible to every draw of the frame that uses the program.
/// Per-object data (the model matrix) travels with each draw instead.
pub trait GraphicsContext {
    /// Acquires the frame for this window. Must be re-asserted every frame.
    fn make_current(&mut self) -> Result<(), ContextError>;

    /// Presents the recorded frame. May block on vertical sync.
    fn swap_buffers(&mut self);

    /// Current drawable size in physical pixels. Queried on demand, never cached
    /// across resizes by callers.
    fn drawable_size(&self) -> (u32, u32);

    /// Clears color and depth for the current frame.
    fn clear(&mut self, color: ClearColor);

    fn compile_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, ProgramError>;

    /// Makes `program` the target of subsequent draws.
    fn use_program(&mut self, program: ProgramHandle);

    /// Writes `bytes` into `program`'s uniform block at byte `offset`.
    fn write_uniform(&mut self, program: ProgramHandle, offset: u64, bytes: &[u8]);

    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, ContextError>;

    /// Draws `mesh` with the active program and the given model matrix.
    fn draw_mesh(&mut self, mesh: MeshHandle, model: &Mat4);

    fn has_extension(&self, name: &str) -> bool;

    fn renderer_info(&self) -> RendererInfo;

    /// Switches error reporting to structured messages. Returns `false` when the
    /// context cannot provide them.
    fn enable_debug_messages(&mut self) -> bool;

    /// Drains structured debug messages collected since the last call.
    fn take_debug_messages(&mut self) -> Vec<DebugMessage>;

    /// Pops the oldest pending error code, if any.
    fn poll_error(&mut self) -> Option<u32>;
}
