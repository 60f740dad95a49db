//! sparse block grid, damage protocol & spatial queries
//!
//! `BlockGrid` is the single source of truth for the destructible world. All
//! mutation funnels through `insert` / `remove` / `damage_cell` /
//! `destroy_cell`; lifecycle observations queue up inside the grid and a
//! once-per-frame system forwards them as bevy events for collaborators
//! (rendering, particles, loot physics) to drain.

use bevy::prelude::*;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

use crate::catalog::{BlockCatalog, BlockKind, BlockKindId};
use crate::constants::{LOOT_IMPULSE, LOOT_JITTER};
use crate::geometry::{ray_rect_intersection, GridGeometry};

/* ===========================================================
   blocks
   =========================================================== */

/// mutable state of one occupied cell
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub kind: BlockKindId,
    pub health: i32,
}

/* ===========================================================
   outbound events
   =========================================================== */

/// a standing block took damage (drives the damage-overlay tilemap)
#[derive(Event, Clone, Copy, Debug)]
pub struct BlockDamaged {
    pub cell: IVec2,
    pub health: i32,
    pub max_health: i32,
    /// precomputed overlay index in `[0, damage_overlay_levels)`
    pub overlay_level: u32,
}

/// a cell was removed; `visible` tells effect collaborators whether to bother
#[derive(Event, Clone, Copy, Debug)]
pub struct BlockDestroyed {
    pub cell: IVec2,
    pub kind: BlockKindId,
    pub world_pos: Vec2,
    pub visible: bool,
}

/// one gold nugget for the pickup/physics collaborator
#[derive(Event, Clone, Copy, Debug)]
pub struct LootSpawned {
    pub world_pos: Vec2,
    pub impulse: Vec2,
}

/// a block left the grid and became an independent falling entity; ownership
/// transfers to the host with this event
#[derive(Event, Clone, Copy, Debug)]
pub struct BlockFell {
    pub kind: BlockKindId,
    pub health: i32,
    pub world_pos: Vec2,
}

#[derive(Clone, Copy, Debug)]
pub enum SimEvent {
    Damaged(BlockDamaged),
    Destroyed(BlockDestroyed),
    Loot(LootSpawned),
    Fell(BlockFell),
}

/* ===========================================================
   visibility seam
   =========================================================== */

/// World-space region the host currently renders. Destruction outside it is
/// silent: the cell still vanishes but no effects or loot are spawned.
#[derive(Resource, Clone, Copy, Debug)]
pub struct VisibleRegion(pub Rect);

impl VisibleRegion {
    pub fn contains(&self, world_pos: Vec2) -> bool {
        self.0.contains(world_pos)
    }
}

impl Default for VisibleRegion {
    /// everything visible until the host says otherwise
    fn default() -> Self {
        Self(Rect {
            min: Vec2::splat(f32::NEG_INFINITY),
            max: Vec2::splat(f32::INFINITY),
        })
    }
}

/// overlay index for a health fraction, clamped to the last sprite
pub fn damage_overlay_level(health: i32, max_health: i32, levels: u32) -> u32 {
    if levels == 0 || max_health <= 0 {
        return 0;
    }
    let fraction = 1.0 - health as f32 / max_health as f32;
    ((fraction * levels as f32).floor() as i64).clamp(0, levels as i64 - 1) as u32
}

/* ===========================================================
   the grid
   =========================================================== */

#[derive(Resource)]
pub struct BlockGrid {
    blocks: HashMap<IVec2, Block>,
    catalog: BlockCatalog,
    overlay_levels: u32,
    pending: VecDeque<SimEvent>,
}

impl BlockGrid {
    pub fn new(catalog: BlockCatalog, overlay_levels: u32) -> Self {
        Self {
            blocks: HashMap::new(),
            catalog,
            overlay_levels,
            pending: VecDeque::new(),
        }
    }

    pub fn kind(&self, id: BlockKindId) -> &BlockKind {
        self.catalog.get(id)
    }

    pub fn get(&self, cell: IVec2) -> Option<&Block> {
        self.blocks.get(&cell)
    }

    pub fn occupied(&self, cell: IVec2) -> bool {
        self.blocks.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = (IVec2, &Block)> {
        self.blocks.iter().map(|(&c, b)| (c, b))
    }

    /* ---------- bulk mutation (generation) ---------- */

    /// place a fresh block at full health, replacing whatever was there
    pub fn insert(&mut self, cell: IVec2, kind: BlockKindId) {
        let max_health = self.catalog.get(kind).max_health;
        self.blocks.insert(
            cell,
            Block {
                kind,
                health: max_health,
            },
        );
    }

    /// place only into empty space; used by the perimeter sealing pass
    pub fn insert_if_empty(&mut self, cell: IVec2, kind: BlockKindId) -> bool {
        if self.occupied(cell) {
            return false;
        }
        self.insert(cell, kind);
        true
    }

    /// silent removal, no destroy event (cave carving, top-layer clears)
    pub fn remove(&mut self, cell: IVec2) -> Option<Block> {
        self.blocks.remove(&cell)
    }

    /// wipe all state; regeneration must never see stale cells
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.pending.clear();
    }

    /* ---------- damage & destruction ---------- */

    /// Damage whatever block sits nearest `world_pos`. Returns the resolved
    /// cell, or `None` when neither the containing cell nor any of its eight
    /// neighbors is occupied.
    pub fn damage_at(
        &mut self,
        world_pos: Vec2,
        amount: i32,
        geom: &GridGeometry,
        visible: &VisibleRegion,
        rng: &mut impl Rng,
    ) -> Option<IVec2> {
        let cell = self.nearest_occupied_cell(world_pos, geom)?;
        self.damage_cell(cell, amount, geom, visible, rng);
        Some(cell)
    }

    /// Subtract health and destroy on depletion, in one synchronous step. A
    /// cell never survives with health <= 0. No-op on empty cells and on
    /// indestructible kinds.
    pub fn damage_cell(
        &mut self,
        cell: IVec2,
        amount: i32,
        geom: &GridGeometry,
        visible: &VisibleRegion,
        rng: &mut impl Rng,
    ) {
        let Some(block) = self.blocks.get_mut(&cell) else {
            return;
        };
        let kind = self.catalog.get(block.kind);
        if kind.indestructible {
            return;
        }
        let max_health = kind.max_health;

        block.health -= amount;
        let health = block.health;
        self.pending.push_back(SimEvent::Damaged(BlockDamaged {
            cell,
            health,
            max_health,
            overlay_level: damage_overlay_level(health, max_health, self.overlay_levels),
        }));

        if health <= 0 {
            self.destroy_cell(cell, geom, visible, rng);
        }
    }

    /// Unconditional destruction path. Deliberately skips the
    /// indestructibility check; the lava sweep uses this to eat barrier cells
    /// too, mirroring the ordinary-damage/lava asymmetry of the game rules.
    pub fn destroy_cell(
        &mut self,
        cell: IVec2,
        geom: &GridGeometry,
        visible: &VisibleRegion,
        rng: &mut impl Rng,
    ) {
        let Some(block) = self.blocks.remove(&cell) else {
            return;
        };
        let world_pos = geom.cell_center_world(cell);
        let on_screen = visible.contains(world_pos);
        self.pending.push_back(SimEvent::Destroyed(BlockDestroyed {
            cell,
            kind: block.kind,
            world_pos,
            visible: on_screen,
        }));
        // off-screen destruction is silent: no loot, no effect spam
        if on_screen {
            self.spawn_loot(world_pos, block.kind, geom, rng);
        }
    }

    fn spawn_loot(
        &mut self,
        world_pos: Vec2,
        kind: BlockKindId,
        geom: &GridGeometry,
        rng: &mut impl Rng,
    ) {
        let kind = self.catalog.get(kind);
        if kind.min_gold_drop <= 0 {
            return;
        }
        let drops = rng.gen_range(kind.min_gold_drop..=kind.max_gold_drop);
        let jitter = LOOT_JITTER * geom.cell_size;
        for _ in 0..drops {
            self.pending.push_back(SimEvent::Loot(LootSpawned {
                world_pos: world_pos
                    + Vec2::new(rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter)),
                impulse: Vec2::new(
                    rng.gen_range(-LOOT_IMPULSE..LOOT_IMPULSE),
                    rng.gen_range(-LOOT_IMPULSE..LOOT_IMPULSE),
                ),
            }));
        }
    }

    /// Remove a cell and hand its block to the host as a falling entity.
    /// Removal and the `BlockFell` emission are one step, so the block is
    /// never in limbo between grid and entity.
    pub fn convert_to_falling(&mut self, cell: IVec2, geom: &GridGeometry) -> bool {
        let Some(block) = self.blocks.remove(&cell) else {
            return false;
        };
        self.pending.push_back(SimEvent::Fell(BlockFell {
            kind: block.kind,
            health: block.health,
            world_pos: geom.cell_center_world(cell),
        }));
        true
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.pending.drain(..)
    }

    /* ---------- queries ---------- */

    /// The occupied cell containing `world_pos`, else the occupied neighbor
    /// (8-way) whose center is nearest, else `None`.
    pub fn nearest_occupied_cell(&self, world_pos: Vec2, geom: &GridGeometry) -> Option<IVec2> {
        let center = geom.world_to_cell(world_pos);
        if self.occupied(center) {
            return Some(center);
        }

        let mut best: Option<(f32, IVec2)> = None;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = center + IVec2::new(dx, dy);
                if !self.occupied(cell) {
                    continue;
                }
                let dist = geom.cell_center_world(cell).distance_squared(world_pos);
                if best.map_or(true, |(bd, _)| dist < bd) {
                    best = Some((dist, cell));
                }
            }
        }
        best.map(|(_, cell)| cell)
    }

    /// friction of the nearest occupied cell's kind, 1.0 over empty space
    pub fn friction_at(&self, world_pos: Vec2, geom: &GridGeometry) -> f32 {
        match self.nearest_occupied_cell(world_pos, geom) {
            Some(cell) => self.catalog.get(self.blocks[&cell].kind).friction,
            None => 1.0,
        }
    }

    /// snap a world position to the center of the cell containing it; used by
    /// falling entities when they settle back onto the grid surface
    pub fn nearest_grid_position(&self, world_pos: Vec2, geom: &GridGeometry) -> Vec2 {
        geom.cell_center_world(geom.world_to_cell(world_pos))
    }

    /// Where an incoming effect should visually stop on `cell`'s face. Falls
    /// back to the cell center if the cell is empty or the ray misses.
    pub fn perimeter_intersection(
        &self,
        cell: IVec2,
        incoming_origin: Vec2,
        incoming_dir: Vec2,
        geom: &GridGeometry,
    ) -> Vec2 {
        let center = geom.cell_center_world(cell);
        if !self.occupied(cell) {
            return center;
        }
        ray_rect_intersection(incoming_origin, incoming_dir, geom.cell_rect(cell))
            .unwrap_or(center)
    }
}

/* ===========================================================
   event flush
   =========================================================== */

/// forward queued grid observations to bevy events, once per frame after all
/// engines have stepped
pub fn flush_block_events_system(
    mut grid: ResMut<BlockGrid>,
    mut damaged: EventWriter<BlockDamaged>,
    mut destroyed: EventWriter<BlockDestroyed>,
    mut loot: EventWriter<LootSpawned>,
    mut fell: EventWriter<BlockFell>,
) {
    for event in grid.drain_events() {
        match event {
            SimEvent::Damaged(e) => {
                damaged.send(e);
            }
            SimEvent::Destroyed(e) => {
                destroyed.send(e);
            }
            SimEvent::Loot(e) => {
                loot.send(e);
            }
            SimEvent::Fell(e) => {
                fell.send(e);
            }
        }
    }
}
