use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vsim_engine::device::GraphicsContext;

use crate::object::{Drawable, HeightField, InitCtx, ObjectError, RollingBall};
use crate::shader::ShaderRegistry;

/// Where and how many transient balls appear when rain is switched on.
#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    pub count: usize,

    /// Spawn X and Z are drawn from `[-half_extent, half_extent)`.
    pub half_extent: f32,

    /// Spawn Y for every drop.
    pub height: f32,

    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            count: 50,
            half_extent: 10.0,
            height: 5.0,
            seed: None,
        }
    }
}

/// The transient balls spawned by the rain toggle.
///
/// Drops are owned here in spawn order and never registered by name.
pub struct RainDrops {
    config: RainConfig,
    rng: StdRng,
    drops: Vec<RollingBall>,
    active: bool,
}

impl RainDrops {
    pub fn new(config: RainConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            config,
            rng,
            drops: Vec::new(),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    pub fn drops(&self) -> &[RollingBall] {
        &self.drops
    }

    /// Flips rain on or off.
    ///
    /// Turning on spawns `config.count` physics-enabled balls, each linked to
    /// `surface` when given. Turning off releases every drop at once. On a spawn
    /// failure nothing is kept and rain stays off.
    pub fn toggle(
        &mut self,
        ctx: &mut InitCtx<'_>,
        mesh_id: &str,
        step: f32,
        surface: Option<&Rc<HeightField>>,
    ) -> Result<bool, ObjectError> {
        if self.active {
            self.clear();
            return Ok(false);
        }

        if let Err(err) = self.spawn(ctx, mesh_id, step, surface) {
            self.drops.clear();
            return Err(err);
        }
        self.active = true;
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.drops.clear();
        self.active = false;
    }

    fn spawn(
        &mut self,
        ctx: &mut InitCtx<'_>,
        mesh_id: &str,
        step: f32,
        surface: Option<&Rc<HeightField>>,
    ) -> Result<(), ObjectError> {
        let positions = spawn_positions(&mut self.rng, &self.config);
        self.drops.reserve(positions.len());

        for (i, position) in positions.into_iter().enumerate() {
            let mut ball = RollingBall::new(mesh_id, position, step);
            ball.init(ctx)?;
            ball.enable_physics();
            if let Some(field) = surface {
                ball.set_surface(field);
            }

            log::debug!("spawned rain drop {i} at {position}");
            self.drops.push(ball);
        }
        Ok(())
    }

    /// Ages, moves and draws every drop in spawn order. No-op while inactive.
    pub fn advance_and_draw(&mut self, ctx: &mut dyn GraphicsContext, shaders: &ShaderRegistry) {
        if !self.active {
            return;
        }
        for drop in &mut self.drops {
            drop.add_life();
            drop.update_transform();
            drop.draw(ctx, shaders);
        }
    }
}

/// Pairwise-distinct spawn points.
///
/// A degenerate region (zero extent) can hold only one distinct point; in that
/// case fewer than `count` positions come back.
fn spawn_positions(rng: &mut impl Rng, config: &RainConfig) -> Vec<Vec3> {
    let h = config.half_extent.abs();
    let max_attempts = config.count.saturating_mul(64).max(64);

    let mut seen = HashSet::with_capacity(config.count);
    let mut out = Vec::with_capacity(config.count);

    for _ in 0..max_attempts {
        if out.len() == config.count {
            break;
        }
        let (x, z) = if h > 0.0 {
            (rng.random_range(-h..h), rng.random_range(-h..h))
        } else {
            (0.0, 0.0)
        };
        if seen.insert((x.to_bits(), z.to_bits())) {
            out.push(Vec3::new(x, config.height, z));
        }
    }

    if out.len() < config.count {
        log::warn!(
            "rain region holds only {} distinct spawn points, wanted {}",
            out.len(),
            config.count
        );
    }
    out
}
