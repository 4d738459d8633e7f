use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use glam::Mat4;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::context::{
    ClearColor, GraphicsContext, MeshHandle, ProgramDesc, ProgramHandle, RendererInfo,
    DEBUG_OUTPUT_EXTENSION,
};
use super::debug::{DebugMessage, DebugSink};
use super::error::{ContextError, ProgramError};
use super::frame::{DrawCall, GpuFrame};
use super::mesh::{GpuMesh, InstanceRaw, MeshData};
use super::program::GpuProgram;
use super::surface::{self, DepthTarget};
use super::{GpuInit, SurfaceErrorAction};

/// Owns wgpu core objects, the surface configuration and every GPU resource the
/// scene layer creates through [`GraphicsContext`].
pub struct Gpu<'w> {
    window: &'w Window,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the window
    /// outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    depth: DepthTarget,
    instance_flags: wgpu::InstanceFlags,

    programs: Vec<GpuProgram>,
    meshes: Vec<GpuMesh>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    /// Frame acquired by `make_current`, consumed by `swap_buffers`.
    frame: Option<GpuFrame>,

    debug_sink: Arc<Mutex<DebugSink>>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance_flags = init.instance_flags();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: instance_flags,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vsim-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let depth = DepthTarget::new(&device, init.depth_format, size);

        // Errors outside error scopes would otherwise panic; route them to the sink.
        let debug_sink = Arc::new(Mutex::new(DebugSink::default()));
        let sink = Arc::clone(&debug_sink);
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            if let Ok(mut sink) = sink.lock() {
                sink.record(&err);
            }
        }));

        Ok(Self {
            window,
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            depth,
            instance_flags,
            programs: Vec::new(),
            meshes: Vec::new(),
            instance_vbo: None,
            instance_capacity: 0,
            frame: None,
            debug_sink,
        })
    }

    /// Reconfigures the surface and depth target after a resize.
    ///
    /// An in-flight frame was acquired at the old size and is discarded.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.frame = None;
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.depth,
            &mut self.size,
            new_size,
        );
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }

    fn sink(&self) -> Option<MutexGuard<'_, DebugSink>> {
        self.debug_sink.lock().ok()
    }

    fn ensure_instance_capacity(&mut self, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<InstanceRaw>()) as u64;
        self.instance_vbo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vsim instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }

    fn encode(&self, frame: &GpuFrame, encoder: &mut wgpu::CommandEncoder) {
        let clear = frame.clear.unwrap_or(ClearColor::gray(0.0));

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vsim scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: clear.a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };

        let mut bound: Option<ProgramHandle> = None;
        for draw in &frame.draws {
            let Some(program) = self.programs.get(draw.program.0 as usize) else { continue };
            let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else { continue };

            if bound != Some(draw.program) {
                rpass.set_pipeline(&program.pipeline);
                rpass.set_bind_group(0, &program.bind_group, &[]);
                bound = Some(draw.program);
            }

            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_vertex_buffer(1, instance_vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, draw.instance..draw.instance + 1);
        }
    }
}

impl GraphicsContext for Gpu<'_> {
    fn make_current(&mut self) -> Result<(), ContextError> {
        if self.frame.is_some() {
            return Ok(());
        }
        if self.size.width == 0 || self.size.height == 0 {
            return Err(ContextError::ZeroSized);
        }

        match self.surface.get_current_texture() {
            Ok(surface_texture) => {
                self.frame = Some(GpuFrame::new(surface_texture));
                Ok(())
            }
            Err(err) => {
                let action = self.handle_surface_error(&err);
                Err(match (action, err) {
                    (SurfaceErrorAction::Reconfigured, _) => ContextError::Reconfigured,
                    (SurfaceErrorAction::Fatal, _) => ContextError::OutOfMemory,
                    (SurfaceErrorAction::SkipFrame, wgpu::SurfaceError::Timeout) => {
                        ContextError::Timeout
                    }
                    (SurfaceErrorAction::SkipFrame, other) => ContextError::Other(other.to_string()),
                })
            }
        }
    }

    fn swap_buffers(&mut self) {
        let Some(frame) = self.frame.take() else {
            log::debug!("swap_buffers without a current frame");
            return;
        };

        if !frame.instances.is_empty() {
            self.ensure_instance_capacity(frame.instances.len());
            if let Some(vbo) = self.instance_vbo.as_ref() {
                self.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&frame.instances));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vsim frame encoder"),
            });

        self.encode(&frame, &mut encoder);

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();

        let GpuFrame { surface_texture, view, .. } = frame;
        drop(view);
        surface_texture.present();
    }

    fn drawable_size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn clear(&mut self, color: ClearColor) {
        if let Some(frame) = self.frame.as_mut() {
            frame.clear = Some(color);
            frame.draws.clear();
            frame.instances.clear();
        }
    }

    fn compile_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, ProgramError> {
        let program =
            GpuProgram::build(&self.device, self.config.format, self.depth.format, desc)?;
        log::debug!(
            "compiled program '{}' ({} byte uniform block)",
            desc.label,
            program.uniform_size
        );

        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(program);
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if let Some(frame) = self.frame.as_mut() {
            frame.active_program = Some(program);
        }
    }

    fn write_uniform(&mut self, program: ProgramHandle, offset: u64, bytes: &[u8]) {
        let Some(p) = self.programs.get(program.0 as usize) else {
            log::warn!("uniform write to unknown program {program:?}");
            return;
        };
        if offset + bytes.len() as u64 > p.uniform_size {
            log::warn!(
                "uniform write of {} bytes at {offset} overruns program {program:?}",
                bytes.len()
            );
            return;
        }
        self.queue.write_buffer(&p.uniform_buffer, offset, bytes);
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, ContextError> {
        if mesh.is_empty() {
            return Err(ContextError::Other("mesh has no geometry".to_string()));
        }
        if let Some(index) = mesh.first_invalid_index() {
            return Err(ContextError::Other(format!(
                "mesh index {index} is out of range for {} vertices",
                mesh.vertices.len()
            )));
        }

        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(GpuMesh::upload(&self.device, mesh));
        Ok(handle)
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, model: &Mat4) {
        let Some(frame) = self.frame.as_mut() else { return };
        let Some(program) = frame.active_program else {
            log::warn!("draw of {mesh:?} with no active program; skipped");
            return;
        };

        let instance = frame.instances.len() as u32;
        frame.instances.push(InstanceRaw { model: model.to_cols_array_2d() });
        frame.draws.push(DrawCall { program, mesh, instance });
    }

    fn has_extension(&self, name: &str) -> bool {
        name == DEBUG_OUTPUT_EXTENSION
            && self.instance_flags.contains(wgpu::InstanceFlags::VALIDATION)
    }

    fn renderer_info(&self) -> RendererInfo {
        let info = self.adapter.get_info();
        RendererInfo {
            vendor: format!("{:#06x} ({})", info.vendor, info.driver),
            renderer: info.name,
            version: format!("{} {}", info.backend, info.driver_info),
        }
    }

    fn enable_debug_messages(&mut self) -> bool {
        if !self.has_extension(DEBUG_OUTPUT_EXTENSION) {
            return false;
        }
        match self.sink() {
            Some(mut sink) => {
                sink.structured = true;
                true
            }
            None => false,
        }
    }

    fn take_debug_messages(&mut self) -> Vec<DebugMessage> {
        self.sink()
            .map(|mut sink| std::mem::take(&mut sink.messages))
            .unwrap_or_default()
    }

    fn poll_error(&mut self) -> Option<u32> {
        self.sink().and_then(|mut sink| sink.codes.pop_front())
    }
}
