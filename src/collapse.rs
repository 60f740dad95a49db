//! instability scan: unsupported blocks break loose and fall

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::BlockKindId;
use crate::config::WorldConfig;
use crate::geometry::GridGeometry;
use crate::grid::BlockGrid;
use crate::SimRng;

#[derive(Resource)]
pub struct CollapseTimer(pub Timer);

impl CollapseTimer {
    pub fn new(cfg: &WorldConfig) -> Self {
        Self(Timer::from_seconds(cfg.collapse_interval, TimerMode::Repeating))
    }
}

/// Cells that may break loose: occupied, destructible, not a barrier, and
/// with *both* cells directly below empty. The two-cell lookahead keeps
/// single-layer floors produced by ordinary decay from raining down.
pub fn eligible_cells(grid: &BlockGrid, cfg: &WorldConfig) -> Vec<IVec2> {
    let mut eligible = Vec::new();
    for x in 0..cfg.world_width {
        for y in 0..cfg.world_height {
            let cell = IVec2::new(x, y);
            let Some(block) = grid.get(cell) else {
                continue;
            };
            if grid.occupied(cell - IVec2::Y) || grid.occupied(cell - IVec2::Y * 2) {
                continue;
            }
            let kind = grid.kind(block.kind);
            if kind.indestructible || block.kind == BlockKindId::Barrier {
                continue;
            }
            eligible.push(cell);
        }
    }
    eligible
}

/// pick up to the per-tick cap uniformly without replacement and convert each
/// into an independent falling entity
pub fn run_collapse_pass(
    grid: &mut BlockGrid,
    cfg: &WorldConfig,
    geom: &GridGeometry,
    rng: &mut impl Rng,
) {
    let eligible = eligible_cells(grid, cfg);
    if eligible.is_empty() {
        return;
    }

    let count = cfg.blocks_per_collapse.min(eligible.len());
    let chosen: Vec<IVec2> = eligible.choose_multiple(rng, count).copied().collect();
    for cell in chosen {
        grid.convert_to_falling(cell, geom);
    }
}

pub fn collapse_tick_system(
    time: Res<Time>,
    cfg: Res<WorldConfig>,
    geom: Res<GridGeometry>,
    mut timer: ResMut<CollapseTimer>,
    mut grid: ResMut<BlockGrid>,
    mut rng: ResMut<SimRng>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    run_collapse_pass(&mut grid, &cfg, &geom, &mut rng.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BlockCatalog;
    use crate::grid::SimEvent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup(width: i32, height: i32) -> (BlockGrid, WorldConfig, GridGeometry) {
        let cfg = WorldConfig {
            world_width: width,
            world_height: height,
            ..WorldConfig::default()
        };
        let geom = GridGeometry::centered(width, height, cfg.cell_size);
        (
            BlockGrid::new(BlockCatalog::standard().unwrap(), 4),
            cfg,
            geom,
        )
    }

    #[test]
    fn supported_blocks_are_never_eligible() {
        let (mut grid, cfg, _) = setup(8, 8);
        // a block resting directly on another
        grid.insert(IVec2::new(3, 3), BlockKindId::Stone);
        grid.insert(IVec2::new(3, 2), BlockKindId::Stone);
        // a block over a one-cell gap: still counts as supported
        grid.insert(IVec2::new(5, 4), BlockKindId::Stone);
        grid.insert(IVec2::new(5, 2), BlockKindId::Stone);

        let eligible = eligible_cells(&grid, &cfg);
        assert!(!eligible.contains(&IVec2::new(3, 3)));
        assert!(!eligible.contains(&IVec2::new(5, 4)));
    }

    #[test]
    fn two_empty_cells_below_makes_a_block_eligible() {
        let (mut grid, cfg, _) = setup(8, 8);
        grid.insert(IVec2::new(4, 5), BlockKindId::Dirt);
        assert_eq!(eligible_cells(&grid, &cfg), vec![IVec2::new(4, 5)]);
    }

    #[test]
    fn barriers_never_fall() {
        let (mut grid, cfg, _) = setup(8, 8);
        grid.insert(IVec2::new(2, 5), BlockKindId::Barrier);
        assert!(eligible_cells(&grid, &cfg).is_empty());
    }

    #[test]
    fn pass_respects_the_per_tick_cap() {
        let (mut grid, mut cfg, geom) = setup(20, 8);
        cfg.blocks_per_collapse = 3;
        for x in 0..20 {
            grid.insert(IVec2::new(x, 5), BlockKindId::Stone);
        }
        let mut rng = StdRng::seed_from_u64(21);
        run_collapse_pass(&mut grid, &cfg, &geom, &mut rng);
        assert_eq!(grid.len(), 17);

        let fell = grid
            .drain_events()
            .filter(|e| matches!(e, SimEvent::Fell(_)))
            .count();
        assert_eq!(fell, 3);
    }

    #[test]
    fn falling_block_keeps_its_kind_and_current_health() {
        let (mut grid, cfg, geom) = setup(8, 8);
        let cell = IVec2::new(4, 5);
        grid.insert(cell, BlockKindId::Ore);
        grid.damage_cell(
            cell,
            10,
            &geom,
            &crate::grid::VisibleRegion::default(),
            &mut StdRng::seed_from_u64(0),
        );
        grid.drain_events().count();

        let mut rng = StdRng::seed_from_u64(22);
        run_collapse_pass(&mut grid, &cfg, &geom, &mut rng);
        assert!(!grid.occupied(cell));

        let events: Vec<_> = grid.drain_events().collect();
        match events[0] {
            SimEvent::Fell(e) => {
                assert_eq!(e.kind, BlockKindId::Ore);
                assert_eq!(e.health, 40);
                assert_eq!(e.world_pos, geom.cell_center_world(cell));
            }
            other => panic!("expected a fall event, got {other:?}"),
        }
    }

    #[test]
    fn eligible_block_eventually_falls() {
        // probabilistic liveness: with a seeded rng and repeated ticks, a
        // lone eligible cell among many is selected within a few passes
        let (mut grid, mut cfg, geom) = setup(30, 8);
        cfg.blocks_per_collapse = 1;
        for x in 0..30 {
            grid.insert(IVec2::new(x, 5), BlockKindId::Stone);
        }
        let target = IVec2::new(17, 5);
        let mut rng = StdRng::seed_from_u64(23);
        let mut ticks = 0;
        while grid.occupied(target) {
            run_collapse_pass(&mut grid, &cfg, &geom, &mut rng);
            ticks += 1;
            assert!(ticks < 100, "target never selected");
        }
    }
}
