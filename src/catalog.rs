//! static registry of block kinds & their attributes

use bevy::prelude::*;
use thiserror::Error;

/* ===========================================================
   kinds
   =========================================================== */

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BlockKindId {
    Stone,
    Dirt,
    Ice,
    Magma,
    Ore,
    LargeOre,
    Barrier,
}

impl BlockKindId {
    pub const ALL: [BlockKindId; 7] = [
        BlockKindId::Stone,
        BlockKindId::Dirt,
        BlockKindId::Ice,
        BlockKindId::Magma,
        BlockKindId::Ore,
        BlockKindId::LargeOre,
        BlockKindId::Barrier,
    ];

    fn index(self) -> usize {
        match self {
            BlockKindId::Stone => 0,
            BlockKindId::Dirt => 1,
            BlockKindId::Ice => 2,
            BlockKindId::Magma => 3,
            BlockKindId::Ore => 4,
            BlockKindId::LargeOre => 5,
            BlockKindId::Barrier => 6,
        }
    }
}

/// catalog entry, immutable after startup
#[derive(Clone, Debug)]
pub struct BlockKind {
    pub id: BlockKindId,
    pub max_health: i32,
    pub indestructible: bool,
    /// affects movement collaborators only, 1.0 = neutral
    pub friction: f32,
    /// `min <= 0` means the kind never drops gold
    pub min_gold_drop: i32,
    pub max_gold_drop: i32,
    /// opaque visual handle, handed through to effect collaborators
    pub color: Color,
}

/* ===========================================================
   catalog
   =========================================================== */

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("no catalog entry for block kind {0:?}")]
    MissingKind(BlockKindId),
    #[error("duplicate catalog entry for block kind {0:?}")]
    DuplicateKind(BlockKindId),
    #[error("block kind {0:?} has max health {1}, destructible kinds need at least 1")]
    InvalidHealth(BlockKindId, i32),
    #[error("block kind {0:?} has gold drop range [{1}, {2}] with min > max")]
    InvalidGoldRange(BlockKindId, i32, i32),
}

/// Fully populated kind registry. Construction validates every entry, so a
/// hole in the catalog is caught before any generation pass runs.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    kinds: Vec<BlockKind>,
}

impl BlockCatalog {
    pub fn new(entries: Vec<BlockKind>) -> Result<Self, CatalogError> {
        let mut slots: Vec<Option<BlockKind>> = vec![None; BlockKindId::ALL.len()];
        for entry in entries {
            if !entry.indestructible && entry.max_health < 1 {
                return Err(CatalogError::InvalidHealth(entry.id, entry.max_health));
            }
            if entry.min_gold_drop > entry.max_gold_drop {
                return Err(CatalogError::InvalidGoldRange(
                    entry.id,
                    entry.min_gold_drop,
                    entry.max_gold_drop,
                ));
            }
            let slot = &mut slots[entry.id.index()];
            if slot.is_some() {
                return Err(CatalogError::DuplicateKind(entry.id));
            }
            *slot = Some(entry);
        }
        let mut kinds = Vec::with_capacity(slots.len());
        for (slot, &id) in slots.into_iter().zip(BlockKindId::ALL.iter()) {
            kinds.push(slot.ok_or(CatalogError::MissingKind(id))?);
        }
        Ok(Self { kinds })
    }

    /// the stock seven-kind catalog used by the standard world
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(vec![
            BlockKind {
                id: BlockKindId::Stone,
                max_health: 40,
                indestructible: false,
                friction: 1.0,
                min_gold_drop: 0,
                max_gold_drop: 0,
                color: Color::srgb(0.50, 0.50, 0.50),
            },
            BlockKind {
                id: BlockKindId::Dirt,
                max_health: 20,
                indestructible: false,
                friction: 1.0,
                min_gold_drop: 0,
                max_gold_drop: 0,
                color: Color::srgb(0.55, 0.27, 0.07),
            },
            BlockKind {
                id: BlockKindId::Ice,
                max_health: 15,
                indestructible: false,
                friction: 0.3,
                min_gold_drop: 0,
                max_gold_drop: 0,
                color: Color::srgb(0.65, 0.85, 0.95),
            },
            BlockKind {
                id: BlockKindId::Magma,
                max_health: 30,
                indestructible: false,
                friction: 0.9,
                min_gold_drop: 0,
                max_gold_drop: 0,
                color: Color::srgb(0.85, 0.25, 0.10),
            },
            BlockKind {
                id: BlockKindId::Ore,
                max_health: 50,
                indestructible: false,
                friction: 1.0,
                min_gold_drop: 1,
                max_gold_drop: 3,
                color: Color::srgb(0.85, 0.70, 0.20),
            },
            BlockKind {
                id: BlockKindId::LargeOre,
                max_health: 80,
                indestructible: false,
                friction: 1.0,
                min_gold_drop: 2,
                max_gold_drop: 5,
                color: Color::srgb(0.95, 0.80, 0.25),
            },
            BlockKind {
                id: BlockKindId::Barrier,
                max_health: 1,
                indestructible: true,
                friction: 1.0,
                min_gold_drop: 0,
                max_gold_drop: 0,
                color: Color::srgb(0.15, 0.15, 0.18),
            },
        ])
    }

    pub fn get(&self, id: BlockKindId) -> &BlockKind {
        &self.kinds[id.index()]
    }
}
