use glam::{Vec2, Vec3};

use vsim_engine::device::{MeshData, Vertex};

/// Regular grid of heights over the XZ plane.
///
/// Samples are spaced `cell` apart starting at `origin`; lookups between samples
/// interpolate bilinearly. Outside the grid there is no surface.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    origin: Vec2,
    cell: f32,
    cols: usize,
    rows: usize,
    heights: Vec<f32>,
}

impl HeightField {
    /// Samples `f(x, z)` on a square grid spanning `[-half_extent, half_extent]`
    /// with `resolution` cells per side.
    pub fn from_fn(half_extent: f32, resolution: usize, f: impl Fn(f32, f32) -> f32) -> Self {
        let resolution = resolution.max(1);
        let half_extent = half_extent.abs().max(f32::EPSILON);
        let cell = 2.0 * half_extent / resolution as f32;
        let n = resolution + 1;
        let origin = Vec2::splat(-half_extent);

        let mut heights = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let x = origin.x + i as f32 * cell;
                let z = origin.y + j as f32 * cell;
                heights.push(f(x, z));
            }
        }

        Self {
            origin,
            cell,
            cols: n,
            rows: n,
            heights,
        }
    }

    /// Flat field at height zero.
    pub fn flat(half_extent: f32, resolution: usize) -> Self {
        Self::from_fn(half_extent, resolution, |_, _| 0.0)
    }

    /// The default terrain: gentle hills sloping down toward +X.
    pub fn rolling_hills(half_extent: f32, resolution: usize) -> Self {
        Self::from_fn(half_extent, resolution, |x, z| {
            0.6 * (0.35 * x).sin() * (0.25 * z).cos() - 0.05 * x
        })
    }

    fn sample(&self, i: usize, j: usize) -> f32 {
        self.heights[j * self.cols + i]
    }

    /// Interpolated height at `(x, z)`, or `None` off the grid.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let u = (x - self.origin.x) / self.cell;
        let v = (z - self.origin.y) / self.cell;
        let max_u = (self.cols - 1) as f32;
        let max_v = (self.rows - 1) as f32;
        if !(0.0..=max_u).contains(&u) || !(0.0..=max_v).contains(&v) {
            return None;
        }

        let i = (u.floor() as usize).min(self.cols - 2);
        let j = (v.floor() as usize).min(self.rows - 2);
        let fu = u - i as f32;
        let fv = v - j as f32;

        let h00 = self.sample(i, j);
        let h10 = self.sample(i + 1, j);
        let h01 = self.sample(i, j + 1);
        let h11 = self.sample(i + 1, j + 1);

        let near = h00 + (h10 - h00) * fu;
        let far = h01 + (h11 - h01) * fu;
        Some(near + (far - near) * fv)
    }

    /// Unit surface normal at `(x, z)` from central differences.
    pub fn normal_at(&self, x: f32, z: f32) -> Option<Vec3> {
        let centre = self.height_at(x, z)?;
        let d = self.cell * 0.5;

        let hx0 = self.height_at(x - d, z).unwrap_or(centre);
        let hx1 = self.height_at(x + d, z).unwrap_or(centre);
        let hz0 = self.height_at(x, z - d).unwrap_or(centre);
        let hz1 = self.height_at(x, z + d).unwrap_or(centre);

        let n = Vec3::new(hx0 - hx1, 2.0 * d, hz0 - hz1);
        Some(n.normalize_or(Vec3::Y))
    }

    /// `(min, max)` over all samples.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Triangulated grid with per-vertex normals and UVs spanning `[0, 1]`.
    pub fn to_mesh(&self) -> MeshData {
        let mut vertices = Vec::with_capacity(self.cols * self.rows);
        for j in 0..self.rows {
            for i in 0..self.cols {
                let x = self.origin.x + i as f32 * self.cell;
                let z = self.origin.y + j as f32 * self.cell;
                let y = self.sample(i, j);
                let n = self.normal_at(x, z).unwrap_or(Vec3::Y);
                let uv = [
                    i as f32 / (self.cols - 1) as f32,
                    j as f32 / (self.rows - 1) as f32,
                ];
                vertices.push(Vertex::new([x, y, z], n.to_array(), uv));
            }
        }

        let cols = self.cols as u32;
        let mut indices = Vec::with_capacity((self.cols - 1) * (self.rows - 1) * 6);
        for j in 0..(self.rows as u32 - 1) {
            for i in 0..(cols - 1) {
                let a = j * cols + i;
                let c = a + cols;
                indices.extend_from_slice(&[a, c, a + 1, a + 1, c, c + 1]);
            }
        }

        MeshData { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_field_is_flat_everywhere_on_the_grid() {
        let field = HeightField::flat(10.0, 8);
        assert_eq!(field.height_at(0.0, 0.0), Some(0.0));
        assert_eq!(field.height_at(-10.0, 10.0), Some(0.0));
        assert!(field.normal_at(3.3, -7.1).unwrap().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn off_grid_has_no_surface() {
        let field = HeightField::flat(10.0, 8);
        assert_eq!(field.height_at(10.5, 0.0), None);
        assert_eq!(field.normal_at(0.0, -11.0), None);
    }

    #[test]
    fn interpolates_linear_ramps_exactly() {
        let field = HeightField::from_fn(4.0, 4, |x, _| 0.5 * x);
        let h = field.height_at(1.25, 0.7).unwrap();
        assert!((h - 0.625).abs() < 1e-5);

        // Downhill is toward -X.
        let n = field.normal_at(0.3, 0.0).unwrap();
        assert!(n.x < 0.0 && n.y > 0.0);
    }

    #[test]
    fn mesh_covers_the_grid() {
        let field = HeightField::rolling_hills(5.0, 10);
        let mesh = field.to_mesh();
        assert_eq!(mesh.vertices.len(), 121);
        assert_eq!(mesh.indices.len(), 600);
        assert_eq!(mesh.first_invalid_index(), None);

        let (lo, hi) = field.height_range();
        assert!(lo < hi);
    }
}
