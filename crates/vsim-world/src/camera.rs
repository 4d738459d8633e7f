use glam::{Mat4, Vec3};

/// Squared length below which a direction counts as zero.
const DEGENERATE: f32 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error(
        "invalid projection (fov {fov_y_degrees}°, aspect {aspect}, near {near}, far {far}): \
         need 0 < fov < 180, aspect > 0 and 0 < near < far"
    )]
    InvalidProjection {
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

/// Eye position plus view and projection matrices.
///
/// Right-handed, looking down -Z by default, with wgpu's 0..1 clip depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(eye: Vec3) -> Self {
        let mut camera = Self {
            eye,
            target: eye + Vec3::NEG_Z,
            up: Vec3::Y,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.rebuild_view();
        camera
    }

    /// Replaces the projection. Invalid parameters leave the previous one in place.
    pub fn set_projection(
        &mut self,
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<(), CameraError> {
        let finite = [fov_y_degrees, aspect, near, far].iter().all(|v| v.is_finite());
        let valid = finite
            && fov_y_degrees > 0.0
            && fov_y_degrees < 180.0
            && aspect > 0.0
            && near > 0.0
            && far > near;

        if !valid {
            return Err(CameraError::InvalidProjection {
                fov_y_degrees,
                aspect,
                near,
                far,
            });
        }

        self.projection = Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far);
        Ok(())
    }

    /// Points the camera from `eye` at `target`.
    ///
    /// `target == eye` looks down -Z. An `up_hint` that is zero or parallel to
    /// the view direction is replaced with +Y, or +Z when looking straight up
    /// or down.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up_hint: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up_hint;
        self.rebuild_view();
    }

    pub fn position(&self) -> Vec3 {
        self.eye
    }

    pub fn set_position(&mut self, eye: Vec3) {
        self.eye = eye;
        self.rebuild_view();
    }

    pub fn translate_eye(&mut self, delta: Vec3) {
        self.set_position(self.eye + delta);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    fn rebuild_view(&mut self) {
        let forward = (self.target - self.eye)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z);
        let up = usable_up(forward, self.up);
        self.view = Mat4::look_to_rh(self.eye, forward, up);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

fn usable_up(forward: Vec3, hint: Vec3) -> Vec3 {
    let hint_ok = hint
        .try_normalize()
        .is_some_and(|up| forward.cross(up).length_squared() > DEGENERATE);
    if hint_ok {
        return hint;
    }
    if forward.cross(Vec3::Y).length_squared() > DEGENERATE {
        Vec3::Y
    } else {
        Vec3::Z
    }
}
