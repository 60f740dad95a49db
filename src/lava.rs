//! rising lava front: row sweeps & the speed ramp

use bevy::prelude::*;
use rand::Rng;

use crate::config::WorldConfig;
use crate::geometry::GridGeometry;
use crate::grid::{BlockGrid, VisibleRegion};
use crate::SimRng;

/// Sent by the host whenever its lava geometry touches the tracked region.
/// Each contact clears one full row and advances the front.
#[derive(Event, Default)]
pub struct LavaContact;

/// The next row to be cleared and the current climb speed. The host owns the
/// actual mover; it reads `speed` from here after each ramp step.
#[derive(Resource, Clone, Copy, Debug)]
pub struct LavaFront {
    pub level: i32,
    pub speed: f32,
}

impl LavaFront {
    pub fn new(cfg: &WorldConfig) -> Self {
        Self {
            // one row below the world so the first sweep only eats the
            // perimeter stubs at y = -1
            level: -1,
            speed: cfg.lava_initial_speed,
        }
    }

    /// Destroy every occupied cell in the current row, margin included, then
    /// move the front up one row. The sweep uses the direct destruction path:
    /// unlike ordinary damage it does not spare indestructible barriers.
    pub fn advance(
        &mut self,
        grid: &mut BlockGrid,
        cfg: &WorldConfig,
        geom: &GridGeometry,
        visible: &VisibleRegion,
        rng: &mut impl Rng,
    ) {
        for x in -1..=cfg.world_width {
            let cell = IVec2::new(x, self.level);
            if grid.occupied(cell) {
                grid.destroy_cell(cell, geom, visible, rng);
            }
        }
        self.level += 1;
    }
}

#[derive(Resource)]
pub struct LavaRampTimer(pub Timer);

impl LavaRampTimer {
    pub fn new(cfg: &WorldConfig) -> Self {
        Self(Timer::from_seconds(cfg.lava_ramp_interval, TimerMode::Repeating))
    }
}

/* ===========================================================
   systems
   =========================================================== */

/// fixed-interval escalation, unbounded, same policy as the decay engine
pub fn lava_ramp_system(
    time: Res<Time>,
    cfg: Res<WorldConfig>,
    mut timer: ResMut<LavaRampTimer>,
    mut front: ResMut<LavaFront>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    front.speed += cfg.lava_speed_step;
    info!("lava speeding up to {:.2}", front.speed);
}

pub fn lava_contact_system(
    mut contacts: EventReader<LavaContact>,
    cfg: Res<WorldConfig>,
    geom: Res<GridGeometry>,
    visible: Res<VisibleRegion>,
    mut front: ResMut<LavaFront>,
    mut grid: ResMut<BlockGrid>,
    mut rng: ResMut<SimRng>,
) {
    for _ in contacts.read() {
        front.advance(&mut grid, &cfg, &geom, &visible, &mut rng.0);
    }
}
