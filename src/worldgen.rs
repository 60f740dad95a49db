//! world generation: layered noise, caves, spawn shelf & perimeter seal

use bevy::prelude::*;
use rand::Rng;

use crate::catalog::{BlockCatalog, BlockKindId};
use crate::collapse::CollapseTimer;
use crate::config::WorldConfig;
use crate::decay::{apply_damage_pass, DecayState};
use crate::geometry::GridGeometry;
use crate::grid::{BlockGrid, VisibleRegion};
use crate::lava::{LavaFront, LavaRampTimer};
use crate::noise_field::NoiseLayers;
use crate::SimRng;

/* ===========================================================
   depth-adjusted thresholds
   =========================================================== */

/// effective classification thresholds at one depth
#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
    pub large_ore: f32,
    pub ore: f32,
    pub ice: f32,
    pub magma: f32,
    pub dirt: f32,
}

/// `depth` is `1 - y/height`: 1.0 at the deepest row, 0.0 at the top. Ore and
/// magma get easier with depth, ice and dirt get harder.
pub fn thresholds_at_depth(cfg: &WorldConfig, depth: f32) -> Thresholds {
    Thresholds {
        large_ore: cfg.large_ore_threshold - depth * cfg.large_ore_threshold_depth_drop,
        ore: cfg.ore_threshold - depth * cfg.ore_threshold_depth_drop,
        ice: cfg.ice_threshold + depth * cfg.ice_threshold_depth_gain,
        magma: cfg.magma_threshold - depth * cfg.magma_threshold_depth_drop,
        dirt: cfg.dirt_threshold + depth * cfg.dirt_threshold_depth_gain,
    }
}

/// First match wins, highest priority first; stone is the bulk default.
pub fn classify(
    t: &Thresholds,
    dirt_noise: f32,
    ice_noise: f32,
    magma_noise: f32,
    ore_noise: f32,
) -> BlockKindId {
    if ore_noise > t.large_ore {
        BlockKindId::LargeOre
    } else if ore_noise > t.ore {
        BlockKindId::Ore
    } else if ice_noise > t.ice {
        BlockKindId::Ice
    } else if magma_noise > t.magma {
        BlockKindId::Magma
    } else if dirt_noise > t.dirt {
        BlockKindId::Dirt
    } else {
        BlockKindId::Stone
    }
}

/* ===========================================================
   generation passes
   =========================================================== */

/// Populate `grid` from scratch. Safe to call again for a regeneration: prior
/// state is fully cleared first.
pub fn generate_world(
    grid: &mut BlockGrid,
    layers: &NoiseLayers,
    geom: &GridGeometry,
    cfg: &WorldConfig,
    visible: &VisibleRegion,
    rng: &mut impl Rng,
) {
    grid.clear();

    // bulk stone fill
    for x in 0..cfg.world_width {
        for y in 0..cfg.world_height {
            grid.insert(IVec2::new(x, y), BlockKindId::Stone);
        }
    }

    generate_terrain_variation(grid, layers, cfg);
    carve_caves(grid, layers, cfg);
    remove_top_layers(grid, cfg);
    add_spawn_platform(grid, cfg);
    add_perimeter_barriers(grid, cfg);

    // one ambient damage pass so the world starts pre-weathered
    let damage = layers.damage_channel(cfg, rng);
    apply_damage_pass(
        grid,
        &damage,
        cfg.min_damage_threshold,
        cfg.max_damage_threshold,
        cfg,
        geom,
        visible,
        rng,
    );

    info!(
        "generated {}x{} world, {} occupied cells",
        cfg.world_width,
        cfg.world_height,
        grid.len()
    );
}

/// terrain variation replaces stone, never stacks on it
fn generate_terrain_variation(grid: &mut BlockGrid, layers: &NoiseLayers, cfg: &WorldConfig) {
    for x in 0..cfg.world_width {
        for y in 0..cfg.world_height {
            let depth = 1.0 - y as f32 / cfg.world_height as f32;
            let t = thresholds_at_depth(cfg, depth);
            let kind = classify(
                &t,
                layers.dirt.sample(x, y),
                layers.ice.sample(x, y),
                layers.magma.sample(x, y),
                layers.ore.sample(x, y),
            );
            if kind != BlockKindId::Stone {
                grid.insert(IVec2::new(x, y), kind);
            }
        }
    }
}

/// carve connected voids wherever the combined cave noise runs hot
pub fn carve_caves(grid: &mut BlockGrid, layers: &NoiseLayers, cfg: &WorldConfig) {
    for x in 0..cfg.world_width {
        for y in 0..cfg.world_height {
            if layers.cave.sample(x, y) > cfg.cave_threshold {
                grid.remove(IVec2::new(x, y));
            }
        }
    }
}

/// open up the sky: clear the topmost `num_top_empty_layers - 1` rows
fn remove_top_layers(grid: &mut BlockGrid, cfg: &WorldConfig) {
    for x in 0..cfg.world_width {
        let mut y = cfg.world_height - 1;
        while y > cfg.world_height - cfg.num_top_empty_layers {
            grid.remove(IVec2::new(x, y));
            y -= 1;
        }
    }
}

/// four-cell barrier shelf under the spawn point, centered horizontally
fn add_spawn_platform(grid: &mut BlockGrid, cfg: &WorldConfig) {
    let y = cfg.world_height - cfg.num_top_empty_layers;
    let mid = cfg.world_width / 2;
    for x in (mid - 2)..=(mid + 1) {
        grid.insert(IVec2::new(x, y), BlockKindId::Barrier);
    }
}

/// Seal the world: barriers along both sides and across the top, leaving the
/// bottom open for the lava. Existing cells are never overwritten.
fn add_perimeter_barriers(grid: &mut BlockGrid, cfg: &WorldConfig) {
    for x in -1..=cfg.world_width {
        grid.insert_if_empty(IVec2::new(x, cfg.world_height), BlockKindId::Barrier);
    }
    for y in -1..=cfg.world_height {
        grid.insert_if_empty(IVec2::new(-1, y), BlockKindId::Barrier);
        grid.insert_if_empty(IVec2::new(cfg.world_width, y), BlockKindId::Barrier);
    }
}

/* ===========================================================
   startup
   =========================================================== */

/// build the catalog, noise layers & grid, then run every generation pass
pub fn setup_world(
    mut commands: Commands,
    cfg: Res<WorldConfig>,
    visible: Res<VisibleRegion>,
    mut rng: ResMut<SimRng>,
) {
    let catalog = match BlockCatalog::standard() {
        Ok(catalog) => catalog,
        // a hole in the catalog would produce half-initialized terrain;
        // refuse to generate at all
        Err(e) => panic!("block catalog rejected, cannot generate world: {e}"),
    };

    let geom = GridGeometry::centered(cfg.world_width, cfg.world_height, cfg.cell_size);
    let layers = NoiseLayers::new(&cfg, &mut rng.0);
    let mut grid = BlockGrid::new(catalog, cfg.damage_overlay_levels);
    generate_world(&mut grid, &layers, &geom, &cfg, &visible, &mut rng.0);

    commands.insert_resource(grid);
    commands.insert_resource(geom);
    commands.insert_resource(layers);
    commands.insert_resource(DecayState::new(&cfg));
    commands.insert_resource(CollapseTimer::new(&cfg));
    commands.insert_resource(LavaFront::new(&cfg));
    commands.insert_resource(LavaRampTimer::new(&cfg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_cfg() -> WorldConfig {
        WorldConfig {
            world_width: 12,
            world_height: 20,
            num_top_empty_layers: 4,
            ..WorldConfig::default()
        }
    }

    fn build(cfg: &WorldConfig, seed: u64) -> (BlockGrid, GridGeometry, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = NoiseLayers::new(cfg, &mut rng);
        let geom = GridGeometry::centered(cfg.world_width, cfg.world_height, cfg.cell_size);
        let mut grid = BlockGrid::new(BlockCatalog::standard().unwrap(), 4);
        generate_world(
            &mut grid,
            &layers,
            &geom,
            cfg,
            &VisibleRegion::default(),
            &mut rng,
        );
        (grid, geom, rng)
    }

    #[test]
    fn large_ore_always_wins_precedence() {
        let cfg = WorldConfig::default();
        let t = thresholds_at_depth(&cfg, 0.5);
        // ore noise above the large-ore threshold beats every other channel
        assert_eq!(
            classify(&t, 1.0, 1.0, 1.0, t.large_ore + 0.01),
            BlockKindId::LargeOre
        );
        assert_eq!(classify(&t, 1.0, 1.0, 1.0, t.ore + 0.01), BlockKindId::Ore);
        assert_eq!(classify(&t, 0.0, t.ice + 0.01, 1.0, 0.0), BlockKindId::Ice);
        assert_eq!(classify(&t, 0.0, 0.0, t.magma + 0.01, 0.0), BlockKindId::Magma);
        assert_eq!(classify(&t, t.dirt + 0.01, 0.0, 0.0, 0.0), BlockKindId::Dirt);
        assert_eq!(classify(&t, 0.0, 0.0, 0.0, 0.0), BlockKindId::Stone);
    }

    #[test]
    fn thresholds_shift_monotonically_with_depth() {
        let cfg = WorldConfig::default();
        let mut prev = thresholds_at_depth(&cfg, 0.0);
        for step in 1..=10 {
            let t = thresholds_at_depth(&cfg, step as f32 / 10.0);
            assert!(t.ore <= prev.ore);
            assert!(t.large_ore <= prev.large_ore);
            assert!(t.magma <= prev.magma);
            assert!(t.ice >= prev.ice);
            assert!(t.dirt >= prev.dirt);
            prev = t;
        }
    }

    #[test]
    fn perimeter_is_sealed_with_barriers() {
        let cfg = small_cfg();
        let (grid, _, _) = build(&cfg, 1);

        for x in -1..=cfg.world_width {
            let top = grid.get(IVec2::new(x, cfg.world_height)).unwrap();
            assert_eq!(top.kind, BlockKindId::Barrier);
        }
        for y in -1..=cfg.world_height {
            assert_eq!(grid.get(IVec2::new(-1, y)).unwrap().kind, BlockKindId::Barrier);
            assert_eq!(
                grid.get(IVec2::new(cfg.world_width, y)).unwrap().kind,
                BlockKindId::Barrier
            );
        }
    }

    #[test]
    fn nothing_outside_the_sealed_ring() {
        let cfg = small_cfg();
        let (grid, _, _) = build(&cfg, 2);
        for (cell, _) in grid.cells() {
            assert!(cell.x >= -1 && cell.x <= cfg.world_width, "stray cell {cell}");
            assert!(cell.y >= -1 && cell.y <= cfg.world_height, "stray cell {cell}");
        }
    }

    #[test]
    fn sky_rows_are_cleared_and_platform_stands() {
        let cfg = small_cfg();
        let (grid, _, _) = build(&cfg, 3);

        let platform_y = cfg.world_height - cfg.num_top_empty_layers;
        for x in 0..cfg.world_width {
            for y in (platform_y + 1)..cfg.world_height {
                assert!(!grid.occupied(IVec2::new(x, y)), "sky blocked at ({x}, {y})");
            }
        }
        let mid = cfg.world_width / 2;
        for x in (mid - 2)..=(mid + 1) {
            assert_eq!(
                grid.get(IVec2::new(x, platform_y)).unwrap().kind,
                BlockKindId::Barrier
            );
        }
    }

    #[test]
    fn every_occupied_cell_is_healthy() {
        let cfg = small_cfg();
        let (grid, _, _) = build(&cfg, 4);
        for (cell, block) in grid.cells() {
            assert!(block.health > 0, "dead cell left in grid at {cell}");
        }
    }

    #[test]
    fn cave_carver_only_fires_above_threshold() {
        let mut rng = StdRng::seed_from_u64(5);
        let cfg = WorldConfig {
            world_width: 10,
            world_height: 10,
            ..WorldConfig::default()
        };
        let layers = NoiseLayers::new(&cfg, &mut rng);
        let mut grid = BlockGrid::new(BlockCatalog::standard().unwrap(), 4);
        for x in 0..10 {
            for y in 0..10 {
                grid.insert(IVec2::new(x, y), BlockKindId::Stone);
            }
        }

        let untouchable = WorldConfig {
            cave_threshold: 2.0,
            ..cfg.clone()
        };
        carve_caves(&mut grid, &layers, &untouchable);
        assert_eq!(grid.len(), 100);

        let carve_all = WorldConfig {
            cave_threshold: -1.0,
            ..cfg
        };
        carve_caves(&mut grid, &layers, &carve_all);
        assert!(grid.is_empty());
    }

    #[test]
    fn regeneration_replaces_prior_world() {
        let cfg = small_cfg();
        let mut rng = StdRng::seed_from_u64(6);
        let layers = NoiseLayers::new(&cfg, &mut rng);
        let geom = GridGeometry::centered(cfg.world_width, cfg.world_height, cfg.cell_size);
        let mut grid = BlockGrid::new(BlockCatalog::standard().unwrap(), 4);

        // a stale cell far outside the world must not survive regeneration
        grid.insert(IVec2::new(-40, -40), BlockKindId::Ore);
        generate_world(
            &mut grid,
            &layers,
            &geom,
            &cfg,
            &VisibleRegion::default(),
            &mut rng,
        );
        assert!(!grid.occupied(IVec2::new(-40, -40)));
        assert!(grid.len() > 0);
    }
}
