//! tuning knobs for generation, decay, collapse & lava

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::*;

/// Every numeric knob the simulation recognizes. Hosts usually insert a
/// customized copy before adding [`crate::BlockSimPlugin`]; absent that the
/// defaults below (tuned for a 40x100 run) apply. Loadable from TOML, any
/// omitted key falls back to its default.
#[derive(Resource, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub world_width: i32,
    pub world_height: i32,
    pub cell_size: f32,
    pub num_top_empty_layers: i32,

    pub dirt_noise_scale: f32,
    pub dirt_threshold: f32,
    pub dirt_threshold_depth_gain: f32,

    pub ice_noise_scale: f32,
    pub ice_threshold: f32,
    pub ice_threshold_depth_gain: f32,

    pub magma_noise_scale: f32,
    pub magma_threshold: f32,
    pub magma_threshold_depth_drop: f32,

    pub ore_noise_scale: f32,
    pub ore_threshold: f32,
    pub ore_threshold_depth_drop: f32,
    pub large_ore_threshold: f32,
    pub large_ore_threshold_depth_drop: f32,

    pub cave_noise_scale: f32,
    pub cave_threshold: f32,

    pub damage_noise_scale: f32,
    pub min_damage_threshold: f32,
    pub max_damage_threshold: f32,
    pub damage_threshold_step: f32,
    pub damage_interval: f32,
    pub damage_interval_step: f32,
    pub damage_interval_floor: f32,

    pub collapse_interval: f32,
    pub blocks_per_collapse: usize,

    pub lava_initial_speed: f32,
    pub lava_speed_step: f32,
    pub lava_ramp_interval: f32,

    pub damage_overlay_levels: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            cell_size: CELL_SIZE,
            num_top_empty_layers: NUM_TOP_EMPTY_LAYERS,

            dirt_noise_scale: DIRT_NOISE_SCALE,
            dirt_threshold: DIRT_THRESHOLD,
            dirt_threshold_depth_gain: DIRT_THRESHOLD_DEPTH_GAIN,

            ice_noise_scale: ICE_NOISE_SCALE,
            ice_threshold: ICE_THRESHOLD,
            ice_threshold_depth_gain: ICE_THRESHOLD_DEPTH_GAIN,

            magma_noise_scale: MAGMA_NOISE_SCALE,
            magma_threshold: MAGMA_THRESHOLD,
            magma_threshold_depth_drop: MAGMA_THRESHOLD_DEPTH_DROP,

            ore_noise_scale: ORE_NOISE_SCALE,
            ore_threshold: ORE_THRESHOLD,
            ore_threshold_depth_drop: ORE_THRESHOLD_DEPTH_DROP,
            large_ore_threshold: LARGE_ORE_THRESHOLD,
            large_ore_threshold_depth_drop: LARGE_ORE_THRESHOLD_DEPTH_DROP,

            cave_noise_scale: CAVE_NOISE_SCALE,
            cave_threshold: CAVE_THRESHOLD,

            damage_noise_scale: DAMAGE_NOISE_SCALE,
            min_damage_threshold: MIN_DAMAGE_THRESHOLD,
            max_damage_threshold: MAX_DAMAGE_THRESHOLD,
            damage_threshold_step: DAMAGE_THRESHOLD_STEP,
            damage_interval: DAMAGE_INTERVAL,
            damage_interval_step: DAMAGE_INTERVAL_STEP,
            damage_interval_floor: DAMAGE_INTERVAL_FLOOR,

            collapse_interval: COLLAPSE_INTERVAL,
            blocks_per_collapse: BLOCKS_PER_COLLAPSE,

            lava_initial_speed: LAVA_INITIAL_SPEED,
            lava_speed_step: LAVA_SPEED_STEP,
            lava_ramp_interval: LAVA_RAMP_INTERVAL,

            damage_overlay_levels: DAMAGE_OVERLAY_LEVELS,
        }
    }
}

impl WorldConfig {
    /// parse a (possibly partial) TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = WorldConfig::default();
        assert!(cfg.world_width > 0 && cfg.world_height > 0);
        assert!(cfg.min_damage_threshold <= cfg.max_damage_threshold);
        assert!(cfg.num_top_empty_layers < cfg.world_height);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = WorldConfig::from_toml_str(
            "world_width = 16\nworld_height = 32\ncave_threshold = 0.9\n",
        )
        .unwrap();
        assert_eq!(cfg.world_width, 16);
        assert_eq!(cfg.world_height, 32);
        assert_eq!(cfg.cave_threshold, 0.9);
        assert_eq!(cfg.collapse_interval, COLLAPSE_INTERVAL);
    }

    #[test]
    fn garbage_toml_is_rejected() {
        assert!(WorldConfig::from_toml_str("world_width = \"wide\"").is_err());
    }
}
