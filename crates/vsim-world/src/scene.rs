use std::rc::Rc;

use glam::Vec3;
use indexmap::IndexMap;

use vsim_engine::device::GraphicsContext;

use crate::object::{Drawable, HeightField, InitCtx, ObjectError, SceneObject};
use crate::shader::ShaderRegistry;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("an object named '{0}' is already registered")]
    DuplicateName(String),

    #[error("no object named '{0}'")]
    Missing(String),

    #[error("'{0}' is not a ball")]
    NotABall(String),

    #[error("'{0}' is not a surface")]
    NotASurface(String),

    #[error("failed to initialize '{name}': {source}")]
    Init {
        name: String,
        #[source]
        source: ObjectError,
    },
}

/// Name-keyed drawables, iterated in insertion order.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    objects: IndexMap<String, SceneObject>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        object: impl Into<SceneObject>,
    ) -> Result<(), SceneError> {
        let name = name.into();
        if self.objects.contains_key(&name) {
            return Err(SceneError::DuplicateName(name));
        }
        self.objects.insert(name, object.into());
        Ok(())
    }

    /// Links the ball `ball` to the surface `surface`. Both must already be
    /// registered; the link does not keep the surface alive.
    pub fn wire(&mut self, ball: &str, surface: &str) -> Result<(), SceneError> {
        let field = self
            .objects
            .get(surface)
            .ok_or_else(|| SceneError::Missing(surface.to_string()))?
            .as_surface()
            .ok_or_else(|| SceneError::NotASurface(surface.to_string()))?
            .field()
            .clone();

        self.objects
            .get_mut(ball)
            .ok_or_else(|| SceneError::Missing(ball.to_string()))?
            .as_ball_mut()
            .ok_or_else(|| SceneError::NotABall(ball.to_string()))?
            .set_surface(&field);

        Ok(())
    }

    /// Initializes every object in insertion order and computes its first
    /// transform. Stops at the first failure.
    pub fn init_all(&mut self, ctx: &mut InitCtx<'_>) -> Result<(), SceneError> {
        for (name, object) in self.objects.iter_mut() {
            object.init(ctx).map_err(|source| SceneError::Init {
                name: name.clone(),
                source,
            })?;
            object.update_transform();
            log::debug!("initialized '{name}' at {}", object.position());
        }
        Ok(())
    }

    /// Updates then draws every object, in insertion order.
    pub fn update_and_draw(&mut self, ctx: &mut dyn GraphicsContext, shaders: &ShaderRegistry) {
        for object in self.objects.values_mut() {
            object.update_transform();
            object.draw(ctx, shaders);
        }
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.get_mut(name)
    }

    pub fn position_of(&self, name: &str) -> Option<Vec3> {
        self.objects.get(name).map(|o| o.position())
    }

    /// Height data of the first registered surface.
    pub fn first_surface(&self) -> Option<Rc<HeightField>> {
        self.objects
            .values()
            .find_map(|o| o.as_surface().map(|s| s.field().clone()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{HeightField, MeshLibrary, RollingBall, SurfaceMesh, BALL_MESH};
    use crate::testing::RecordingContext;

    const STEP: f32 = 1.0 / 60.0;

    fn surface_and_ball(start: Vec3) -> SceneRegistry {
        let mut scene = SceneRegistry::new();
        scene
            .insert("Surface", SurfaceMesh::new(HeightField::rolling_hills(10.0, 20)))
            .unwrap();
        scene.insert("Ball", RollingBall::new(BALL_MESH, start, STEP)).unwrap();
        scene
    }

    // ── registration ──────────────────────────────────────────────────────

    #[test]
    fn iterates_in_insertion_order() {
        let mut scene = surface_and_ball(Vec3::ZERO);
        scene.insert("Another", RollingBall::new(BALL_MESH, Vec3::X, STEP)).unwrap();
        assert_eq!(scene.names().collect::<Vec<_>>(), vec!["Surface", "Ball", "Another"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut scene = surface_and_ball(Vec3::ZERO);
        let err = scene.insert("Ball", RollingBall::new(BALL_MESH, Vec3::X, STEP)).unwrap_err();
        assert_eq!(err, SceneError::DuplicateName("Ball".to_string()));
    }

    // ── wiring ────────────────────────────────────────────────────────────

    #[test]
    fn wiring_requires_an_existing_surface() {
        let mut scene = SceneRegistry::new();
        scene.insert("Ball", RollingBall::new(BALL_MESH, Vec3::ZERO, STEP)).unwrap();

        assert_eq!(
            scene.wire("Ball", "Surface"),
            Err(SceneError::Missing("Surface".to_string()))
        );
    }

    #[test]
    fn wiring_checks_object_kinds() {
        let mut scene = surface_and_ball(Vec3::ZERO);
        assert_eq!(
            scene.wire("Surface", "Ball"),
            Err(SceneError::NotASurface("Ball".to_string()))
        );
        assert!(scene.wire("Ball", "Surface").is_ok());
        assert!(scene.get("Ball").and_then(|o| o.as_ball()).unwrap().has_surface());
    }

    // ── init ──────────────────────────────────────────────────────────────

    #[test]
    fn ball_keeps_its_start_after_init_and_update() {
        let start = Vec3::new(1.5, 2.0, -0.5);
        let mut scene = surface_and_ball(start);
        scene.wire("Ball", "Surface").unwrap();

        let mut gfx = RecordingContext::new(800, 600);
        let mut meshes = MeshLibrary::default();
        scene
            .init_all(&mut InitCtx { gfx: &mut gfx, meshes: &mut meshes })
            .unwrap();

        assert_eq!(scene.position_of("Ball"), Some(start));

        // Physics is off, so an update must leave it where it was.
        scene.get_mut("Ball").unwrap().update_transform();
        assert_eq!(scene.position_of("Ball"), Some(start));
    }

    #[test]
    fn init_failure_names_the_object() {
        let mut scene = SceneRegistry::new();
        scene.insert("Teapot", RollingBall::new("teapot.obj", Vec3::ZERO, STEP)).unwrap();

        let mut gfx = RecordingContext::new(800, 600);
        let mut meshes = MeshLibrary::default();
        let err = scene
            .init_all(&mut InitCtx { gfx: &mut gfx, meshes: &mut meshes })
            .unwrap_err();

        assert!(matches!(err, SceneError::Init { ref name, .. } if name == "Teapot"));
    }
}
