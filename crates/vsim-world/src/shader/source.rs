use std::borrow::Cow;

use super::error::ShaderError;
use super::role::ShaderRole;

/// Vertex + fragment WGSL text for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

/// Supplies shader text by role. The text is forwarded to the graphics context
/// unparsed.
pub trait ShaderSource {
    fn source(&self, role: ShaderRole) -> Result<StageSources, ShaderError>;
}

/// The shaders compiled into the binary.
#[derive(Debug, Default, Copy, Clone)]
pub struct BuiltinShaders;

impl ShaderSource for BuiltinShaders {
    fn source(&self, role: ShaderRole) -> Result<StageSources, ShaderError> {
        let (vertex, fragment) = match role {
            ShaderRole::Plain => (
                include_str!("../../shaders/plain.vert.wgsl"),
                include_str!("../../shaders/plain.frag.wgsl"),
            ),
            ShaderRole::Textured => (
                include_str!("../../shaders/textured.vert.wgsl"),
                include_str!("../../shaders/textured.frag.wgsl"),
            ),
            ShaderRole::Lit => (
                include_str!("../../shaders/lit.vert.wgsl"),
                include_str!("../../shaders/lit.frag.wgsl"),
            ),
            ShaderRole::Height => (
                include_str!("../../shaders/height.vert.wgsl"),
                include_str!("../../shaders/height.frag.wgsl"),
            ),
        };

        Ok(StageSources {
            vertex: Cow::Borrowed(vertex),
            fragment: Cow::Borrowed(fragment),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{UniformLayout, UniformType};

    #[test]
    fn builtin_sources_declare_entry_points() {
        for role in ShaderRole::ALL {
            let src = BuiltinShaders.source(role).unwrap();
            assert!(src.vertex.contains("fn vs_main"), "{role} vertex");
            assert!(src.fragment.contains("fn fs_main"), "{role} fragment");
        }
    }

    fn parse_and_validate(role: ShaderRole, stage: &str, text: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(text)
            .unwrap_or_else(|e| panic!("{role} {stage} failed to parse: {}", e.emit_to_string(text)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{role} {stage} failed validation: {e:?}"));
        module
    }

    /// Members of the stage's `var<uniform>` struct, if it declares one.
    fn uniform_block(module: &naga::Module) -> Option<(Vec<naga::StructMember>, u32)> {
        let (_, var) = module
            .global_variables
            .iter()
            .find(|(_, var)| var.space == naga::AddressSpace::Uniform)?;

        let binding = var.binding.as_ref().expect("uniform block has a binding");
        assert_eq!((binding.group, binding.binding), (0, 0));

        match &module.types[var.ty].inner {
            naga::TypeInner::Struct { members, span } => Some((members.clone(), *span)),
            other => panic!("uniform block is not a struct: {other:?}"),
        }
    }

    fn is_type(module: &naga::Module, member: &naga::StructMember, ty: UniformType) -> bool {
        use naga::{Scalar, TypeInner, VectorSize};

        match (&module.types[member.ty].inner, ty) {
            (
                TypeInner::Matrix {
                    columns: VectorSize::Quad,
                    rows: VectorSize::Quad,
                    scalar,
                },
                UniformType::Mat4,
            ) => *scalar == Scalar::F32,
            (
                TypeInner::Vector {
                    size: VectorSize::Tri,
                    scalar,
                },
                UniformType::Vec3,
            ) => *scalar == Scalar::F32,
            _ => false,
        }
    }

    #[test]
    fn builtin_sources_are_valid_wgsl() {
        for role in ShaderRole::ALL {
            let src = BuiltinShaders.source(role).unwrap();
            parse_and_validate(role, "vertex", &src.vertex);
            parse_and_validate(role, "fragment", &src.fragment);
        }
    }

    #[test]
    fn uniform_blocks_match_the_role_layout() {
        for role in ShaderRole::ALL {
            let src = BuiltinShaders.source(role).unwrap();
            let layout = UniformLayout::new(role.uniforms());

            for (stage, text) in [("vertex", &src.vertex), ("fragment", &src.fragment)] {
                let module = parse_and_validate(role, stage, text);
                let Some((members, span)) = uniform_block(&module) else {
                    assert_eq!(stage, "fragment", "{role} vertex stage has no uniform block");
                    continue;
                };

                let names: Vec<_> = members.iter().filter_map(|m| m.name.as_deref()).collect();
                let expected: Vec<_> = role.uniforms().iter().map(|(name, _)| *name).collect();
                assert_eq!(names, expected, "{role} {stage} member order");

                for member in &members {
                    let name = member.name.as_deref().unwrap_or_default();
                    let slot = layout.slot(name).unwrap();
                    assert!(
                        is_type(&module, member, slot.ty),
                        "{role} {stage} '{name}' is not {:?}",
                        slot.ty
                    );
                    assert_eq!(u64::from(member.offset), slot.offset, "{role} {stage} '{name}'");
                }
                assert_eq!(u64::from(span), layout.size(), "{role} {stage} block size");
            }
        }
    }
}
