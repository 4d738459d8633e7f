use std::fmt;
use std::str::FromStr;

use super::error::ShaderError;
use super::program::UniformType;

/// Logical shader roles. The set is fixed; every registry holds all four.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShaderRole {
    Plain,
    Textured,
    Lit,
    Height,
}

impl ShaderRole {
    /// All roles, in the order programs are loaded and camera uniforms broadcast.
    pub const ALL: [ShaderRole; 4] = [
        ShaderRole::Plain,
        ShaderRole::Textured,
        ShaderRole::Lit,
        ShaderRole::Height,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ShaderRole::Plain => "plain",
            ShaderRole::Textured => "textured",
            ShaderRole::Lit => "lit",
            ShaderRole::Height => "height",
        }
    }

    /// Uniform block declared by this role's programs, in declaration order.
    pub fn uniforms(self) -> &'static [(&'static str, UniformType)] {
        use UniformType::{Mat4, Vec3};

        match self {
            ShaderRole::Plain => &[("vMatrix", Mat4), ("pMatrix", Mat4)],
            ShaderRole::Textured => &[("vMatrix", Mat4), ("pMatrix", Mat4), ("checkerScale", Vec3)],
            ShaderRole::Lit => &[
                ("vMatrix", Mat4),
                ("pMatrix", Mat4),
                ("cameraPosition", Vec3),
                ("lightPosition", Vec3),
                ("lightColor", Vec3),
            ],
            ShaderRole::Height => &[("vMatrix", Mat4), ("pMatrix", Mat4), ("heightRange", Vec3)],
        }
    }
}

impl fmt::Display for ShaderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShaderRole {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShaderRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ShaderError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for role in ShaderRole::ALL {
            assert_eq!(role.as_str().parse::<ShaderRole>(), Ok(role));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "PlainShader".parse::<ShaderRole>(),
            Err(ShaderError::UnknownRole("PlainShader".to_string()))
        );
    }

    #[test]
    fn every_role_declares_camera_matrices() {
        for role in ShaderRole::ALL {
            let names: Vec<_> = role.uniforms().iter().map(|(n, _)| *n).collect();
            assert_eq!(&names[..2], &["vMatrix", "pMatrix"]);
        }
    }
}
