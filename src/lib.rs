//! destructible block-grid world simulation for a lava-climb mining game
//!
//! Layered-noise terrain generation, a sparse mutable block grid, ambient
//! noise-driven decay, gravity collapse and a rising lava front, packaged as
//! a bevy plugin. Rendering, physics and input stay on the host's side of the
//! seam: the host feeds in a visible region and `LavaContact` notifications,
//! and drains `BlockDamaged` / `BlockDestroyed` / `LootSpawned` / `BlockFell`
//! events plus the read-only queries on [`BlockGrid`].

mod catalog;
mod collapse;
mod config;
mod constants;
mod decay;
mod geometry;
mod grid;
mod lava;
mod noise_field;
mod worldgen;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use catalog::{BlockCatalog, BlockKind, BlockKindId, CatalogError};
pub use collapse::{collapse_tick_system, eligible_cells, run_collapse_pass, CollapseTimer};
pub use config::WorldConfig;
pub use decay::{apply_damage_pass, damage_fraction, decay_tick_system, DecayState};
pub use geometry::{ray_rect_intersection, GridGeometry};
pub use grid::{
    damage_overlay_level, flush_block_events_system, Block, BlockDamaged, BlockDestroyed,
    BlockFell, BlockGrid, LootSpawned, SimEvent, VisibleRegion,
};
pub use lava::{lava_contact_system, lava_ramp_system, LavaContact, LavaFront, LavaRampTimer};
pub use noise_field::{CombinedChannel, NoiseChannel, NoiseLayers};
pub use worldgen::{classify, generate_world, setup_world, thresholds_at_depth, Thresholds};

/// Single advancing random sequence behind every sampled value in the
/// simulation: noise offsets, drop counts, jitter, collapse selection. Fresh
/// per run, so terrain differs run to run but never mid-run.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// World simulation plugin. Engines step in a fixed order within each frame
/// (decay, collapse, lava ramp, lava contact, event flush) so no cell is
/// touched twice by different engines in one frame.
pub struct BlockSimPlugin;

impl Plugin for BlockSimPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BlockDamaged>()
            .add_event::<BlockDestroyed>()
            .add_event::<LootSpawned>()
            .add_event::<BlockFell>()
            .add_event::<LavaContact>()
            .init_resource::<WorldConfig>()
            .init_resource::<VisibleRegion>()
            .init_resource::<SimRng>()
            .add_systems(Startup, setup_world)
            .add_systems(
                Update,
                (
                    decay_tick_system,
                    collapse_tick_system,
                    lava_ramp_system,
                    lava_contact_system,
                    flush_block_events_system,
                )
                    .chain(),
            );
    }
}
