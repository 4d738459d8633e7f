use super::context::{ClearColor, MeshHandle, ProgramHandle};
use super::mesh::InstanceRaw;

/// One recorded draw: program + mesh + index into the frame's instance list.
#[derive(Debug, Copy, Clone)]
pub(crate) struct DrawCall {
    pub program: ProgramHandle,
    pub mesh: MeshHandle,
    pub instance: u32,
}

/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames. Dropping it without
/// presenting discards the frame.
pub(crate) struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub clear: Option<ClearColor>,
    pub active_program: Option<ProgramHandle>,
    pub draws: Vec<DrawCall>,
    pub instances: Vec<InstanceRaw>,
}

impl GpuFrame {
    pub(crate) fn new(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            surface_texture,
            view,
            clear: None,
            active_program: None,
            draws: Vec::new(),
            instances: Vec::new(),
        }
    }
}
