//! ambient decay: noise-driven damage that escalates over the run

use bevy::prelude::*;
use rand::Rng;

use crate::config::WorldConfig;
use crate::geometry::GridGeometry;
use crate::grid::{BlockGrid, VisibleRegion};
use crate::noise_field::{CombinedChannel, NoiseLayers};
use crate::SimRng;

/* ===========================================================
   escalation state
   =========================================================== */

/// Thresholds and tick interval, tightened a fixed step every tick. Lower
/// thresholds mean more of the world takes damage; shorter intervals mean it
/// takes damage more often.
#[derive(Resource, Clone, Copy, Debug)]
pub struct DecayState {
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub interval: f32,
    pub since_last_tick: f32,
}

impl DecayState {
    pub fn new(cfg: &WorldConfig) -> Self {
        Self {
            min_threshold: cfg.min_damage_threshold,
            max_threshold: cfg.max_damage_threshold,
            interval: cfg.damage_interval,
            since_last_tick: 0.0,
        }
    }

    /// tighten thresholds & interval one step; min floors at 0, max never
    /// drops below min, the interval floors at the configured minimum
    pub fn advance(&mut self, cfg: &WorldConfig) {
        self.min_threshold = (self.min_threshold - cfg.damage_threshold_step).max(0.0);
        self.max_threshold = (self.max_threshold - cfg.damage_threshold_step).max(self.min_threshold);
        self.interval = (self.interval - cfg.damage_interval_step).max(cfg.damage_interval_floor);
    }
}

/// Fraction of a block's max health to deal for a noise sample `n` above
/// `min`. Degenerate `max == min` resolves to a full hit rather than a divide
/// by zero.
pub fn damage_fraction(n: f32, min: f32, max: f32) -> f32 {
    if max > min {
        ((n - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// one full-world damage sweep against the current thresholds
#[allow(clippy::too_many_arguments)]
pub fn apply_damage_pass(
    grid: &mut BlockGrid,
    damage_noise: &CombinedChannel,
    min: f32,
    max: f32,
    cfg: &WorldConfig,
    geom: &GridGeometry,
    visible: &VisibleRegion,
    rng: &mut impl Rng,
) {
    for x in 0..cfg.world_width {
        for y in 0..cfg.world_height {
            let cell = IVec2::new(x, y);
            let Some(block) = grid.get(cell) else {
                continue;
            };
            let n = damage_noise.sample(x, y);
            if n > min {
                let max_health = grid.kind(block.kind).max_health;
                let amount = (damage_fraction(n, min, max) * max_health as f32) as i32;
                grid.damage_cell(cell, amount, geom, visible, rng);
            }
        }
    }
}

/* ===========================================================
   system
   =========================================================== */

pub fn decay_tick_system(
    time: Res<Time>,
    cfg: Res<WorldConfig>,
    layers: Res<NoiseLayers>,
    geom: Res<GridGeometry>,
    visible: Res<VisibleRegion>,
    mut decay: ResMut<DecayState>,
    mut grid: ResMut<BlockGrid>,
    mut rng: ResMut<SimRng>,
) {
    decay.since_last_tick += time.delta_secs();
    if decay.since_last_tick < decay.interval {
        return;
    }
    decay.since_last_tick = 0.0;
    decay.advance(&cfg);

    debug!(
        "decay tick: thresholds [{:.2}, {:.2}], interval {:.2}s",
        decay.min_threshold, decay.max_threshold, decay.interval
    );

    let damage = layers.damage_channel(&cfg, &mut rng.0);
    apply_damage_pass(
        &mut grid,
        &damage,
        decay.min_threshold,
        decay.max_threshold,
        &cfg,
        &geom,
        &visible,
        &mut rng.0,
    );
}
