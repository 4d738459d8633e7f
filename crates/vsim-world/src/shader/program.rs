use std::collections::{HashMap, HashSet};

use vsim_engine::device::ProgramHandle;

use super::role::ShaderRole;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformType {
    Mat4,
    Vec3,
}

impl UniformType {
    /// (alignment, size) in bytes under uniform-block layout rules.
    const fn layout(self) -> (u64, u64) {
        match self {
            UniformType::Mat4 => (16, 64),
            UniformType::Vec3 => (16, 12),
        }
    }
}

/// Where a named uniform lives inside a program's uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub offset: u64,
    pub ty: UniformType,
}

/// Byte layout of a uniform block, computed from its declared members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    slots: HashMap<&'static str, UniformSlot>,
    size: u64,
}

impl UniformLayout {
    pub fn new(members: &[(&'static str, UniformType)]) -> Self {
        let mut slots = HashMap::with_capacity(members.len());
        let mut cursor = 0u64;

        for &(name, ty) in members {
            let (align, size) = ty.layout();
            let offset = cursor.next_multiple_of(align);
            slots.insert(name, UniformSlot { offset, ty });
            cursor = offset + size;
        }

        Self {
            slots,
            size: cursor.next_multiple_of(16),
        }
    }

    pub fn slot(&self, name: &str) -> Option<UniformSlot> {
        self.slots.get(name).copied()
    }

    /// Total block size, padded to 16 bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// A compiled program and its uniform location cache.
#[derive(Debug)]
pub struct ShaderProgram {
    role: ShaderRole,
    handle: ProgramHandle,
    layout: UniformLayout,
    warned: HashSet<String>,
}

impl ShaderProgram {
    pub(crate) fn new(role: ShaderRole, handle: ProgramHandle, layout: UniformLayout) -> Self {
        Self {
            role,
            handle,
            layout,
            warned: HashSet::new(),
        }
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Resolves `name` to a slot of type `ty`.
    ///
    /// Misses are logged once per name and return `None`.
    pub(crate) fn resolve(&mut self, name: &str, ty: UniformType) -> Option<UniformSlot> {
        let problem = match self.layout.slot(name) {
            Some(slot) if slot.ty == ty => return Some(slot),
            Some(slot) => format!("is {:?}, not {:?}", slot.ty, ty),
            None => "does not exist".to_string(),
        };

        if self.warned.insert(name.to_string()) {
            log::warn!(
                "uniform '{name}' {problem} in the '{}' program; ignoring writes",
                self.role
            );
        }
        None
    }
}
