//! Headless [`GraphicsContext`] that records every call.

use std::collections::VecDeque;

use glam::Mat4;

use vsim_engine::device::{
    ClearColor, ContextError, DebugMessage, GraphicsContext, MeshData, MeshHandle, ProgramDesc,
    ProgramError, ProgramHandle, RendererInfo, ShaderStage, DEBUG_OUTPUT_EXTENSION,
};

use crate::shader::{BuiltinShaders, ShaderRegistry};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    MakeCurrent,
    Clear(ClearColor),
    Compile(String),
    UseProgram(ProgramHandle),
    WriteUniform {
        program: ProgramHandle,
        offset: u64,
        bytes: Vec<u8>,
    },
    DrawMesh {
        mesh: MeshHandle,
        model: Mat4,
    },
    Swap,
}

pub struct RecordingContext {
    size: (u32, u32),
    calls: Vec<Call>,
    programs: u32,
    meshes: u32,
    fail_next_make_current: Option<ContextError>,

    debug_output: bool,
    structured: bool,
    messages: Vec<DebugMessage>,
    codes: VecDeque<u32>,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            calls: Vec::new(),
            programs: 0,
            meshes: 0,
            fail_next_make_current: None,
            debug_output: false,
            structured: false,
            messages: Vec::new(),
            codes: VecDeque::new(),
        }
    }

    /// Advertises the structured debug output extension.
    pub fn with_debug_output(mut self) -> Self {
        self.debug_output = true;
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn reset_calls(&mut self) {
        self.calls.clear();
    }

    pub fn compiled_labels(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Compile(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Uniform writes to `program`, as (offset, floats).
    pub fn uniform_writes(&self, program: ProgramHandle) -> Vec<(u64, Vec<f32>)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::WriteUniform { program: p, offset, bytes } if *p == program => {
                    let floats = bytes
                        .chunks_exact(4)
                        .map(bytemuck::pod_read_unaligned::<f32>)
                        .collect();
                    Some((*offset, floats))
                }
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawMesh { .. }))
            .count()
    }

    pub fn uploaded_meshes(&self) -> usize {
        self.meshes as usize
    }

    pub fn load_builtin_shaders(&mut self) -> ShaderRegistry {
        ShaderRegistry::load_all(self, &BuiltinShaders).expect("builtin shaders load")
    }

    pub fn push_message(&mut self, msg: DebugMessage) {
        self.messages.push(msg);
    }

    pub fn push_error_code(&mut self, code: u32) {
        self.codes.push_back(code);
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// Makes the next `make_current` fail with `err`.
    pub fn fail_make_current(&mut self, err: ContextError) {
        self.fail_next_make_current = Some(err);
    }
}

impl GraphicsContext for RecordingContext {
    fn make_current(&mut self) -> Result<(), ContextError> {
        self.calls.push(Call::MakeCurrent);
        if let Some(err) = self.fail_next_make_current.take() {
            return Err(err);
        }
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(ContextError::ZeroSized);
        }
        Ok(())
    }

    fn swap_buffers(&mut self) {
        self.calls.push(Call::Swap);
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self, color: ClearColor) {
        self.calls.push(Call::Clear(color));
    }

    fn compile_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, ProgramError> {
        compile_stage(ShaderStage::Vertex, desc.vertex, "vs_main")?;
        compile_stage(ShaderStage::Fragment, desc.fragment, "fs_main")?;

        let handle = ProgramHandle(self.programs);
        self.programs += 1;
        self.calls.push(Call::Compile(desc.label.to_string()));
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::UseProgram(program));
    }

    fn write_uniform(&mut self, program: ProgramHandle, offset: u64, bytes: &[u8]) {
        self.calls.push(Call::WriteUniform {
            program,
            offset,
            bytes: bytes.to_vec(),
        });
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, ContextError> {
        if mesh.is_empty() {
            return Err(ContextError::Other("empty mesh".to_string()));
        }
        let handle = MeshHandle(self.meshes);
        self.meshes += 1;
        Ok(handle)
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, model: &Mat4) {
        self.calls.push(Call::DrawMesh { mesh, model: *model });
    }

    fn has_extension(&self, name: &str) -> bool {
        self.debug_output && name == DEBUG_OUTPUT_EXTENSION
    }

    fn renderer_info(&self) -> RendererInfo {
        RendererInfo {
            vendor: "vsim".to_string(),
            renderer: "recording context".to_string(),
            version: "test".to_string(),
        }
    }

    fn enable_debug_messages(&mut self) -> bool {
        self.structured = self.debug_output;
        self.structured
    }

    fn take_debug_messages(&mut self) -> Vec<DebugMessage> {
        std::mem::take(&mut self.messages)
    }

    fn poll_error(&mut self) -> Option<u32> {
        self.codes.pop_front()
    }
}

/// Parses and validates one WGSL stage and checks it exports `entry`.
fn compile_stage(stage: ShaderStage, text: &str, entry: &str) -> Result<(), ProgramError> {
    let fail = |log: String| ProgramError::Compile { stage, log };

    let module = naga::front::wgsl::parse_str(text).map_err(|e| fail(e.emit_to_string(text)))?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| fail(format!("{e:?}")))?;

    if !module.entry_points.iter().any(|ep| ep.name == entry) {
        return Err(fail(format!("entry point '{entry}' not found")));
    }
    Ok(())
}
