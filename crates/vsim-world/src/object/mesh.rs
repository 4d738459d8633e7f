use std::collections::HashMap;
use std::f32::consts::PI;

use vsim_engine::device::{GraphicsContext, MeshData, MeshHandle, Vertex};

use super::ObjectError;

/// Mesh id used for ball objects.
pub const BALL_MESH: &str = "ball.obj";

/// Supplies mesh geometry by a path-like id. Formats are the source's business;
/// callers only see [`MeshData`].
pub trait MeshSource {
    fn mesh(&self, id: &str) -> Result<MeshData, ObjectError>;
}

/// Procedural meshes compiled into the binary.
///
/// Any id whose file name is `ball.obj` resolves to a UV sphere.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinMeshes {
    pub ball_radius: f32,
    pub rings: u32,
    pub sectors: u32,
}

impl Default for BuiltinMeshes {
    fn default() -> Self {
        Self {
            ball_radius: super::ball::DEFAULT_RADIUS,
            rings: 12,
            sectors: 16,
        }
    }
}

impl MeshSource for BuiltinMeshes {
    fn mesh(&self, id: &str) -> Result<MeshData, ObjectError> {
        let file_name = id.rsplit(['/', '\\']).next().unwrap_or(id);
        match file_name {
            BALL_MESH => Ok(uv_sphere(self.ball_radius, self.rings, self.sectors)),
            _ => Err(ObjectError::UnknownMesh(id.to_string())),
        }
    }
}

/// Sphere centered on the origin. Poles are duplicated per sector so texture
/// coordinates stay continuous.
pub fn uv_sphere(radius: f32, rings: u32, sectors: u32) -> MeshData {
    let rings = rings.max(2);
    let sectors = sectors.max(3);

    let mut vertices = Vec::with_capacity(((rings + 1) * (sectors + 1)) as usize);
    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let theta = v * PI;
        for s in 0..=sectors {
            let u = s as f32 / sectors as f32;
            let phi = u * 2.0 * PI;

            let n = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            let p = [n[0] * radius, n[1] * radius, n[2] * radius];
            vertices.push(Vertex::new(p, n, [u, v]));
        }
    }

    let stride = sectors + 1;
    let mut indices = Vec::with_capacity((rings * sectors * 6) as usize);
    for r in 0..rings {
        for s in 0..sectors {
            let a = r * stride + s;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// Uploaded meshes, keyed by id. Each id is fetched and uploaded once.
pub struct MeshLibrary {
    source: Box<dyn MeshSource>,
    handles: HashMap<String, MeshHandle>,
}

impl MeshLibrary {
    pub fn new(source: Box<dyn MeshSource>) -> Self {
        Self {
            source,
            handles: HashMap::new(),
        }
    }

    pub fn get_or_upload(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        id: &str,
    ) -> Result<MeshHandle, ObjectError> {
        if let Some(&handle) = self.handles.get(id) {
            return Ok(handle);
        }

        let data = self.source.mesh(id)?;
        let handle = ctx
            .upload_mesh(&data)
            .map_err(|source| ObjectError::Upload { what: id.to_string(), source })?;

        log::debug!(
            "uploaded mesh '{id}' ({} vertices, {} indices)",
            data.vertices.len(),
            data.indices.len()
        );
        self.handles.insert(id.to_string(), handle);
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new(Box::new(BuiltinMeshes::default()))
    }
}
