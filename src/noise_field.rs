//! coherent-noise channels feeding generation & decay
//!
//! One shared Perlin permutation table, one random per-axis offset per
//! channel. Offsets are redrawn every run, so terrain differs run to run but
//! every sample is stable within a run.

use bevy::prelude::*;
use noise::{NoiseFn, Perlin};
use rand::Rng;

use crate::config::WorldConfig;
use crate::constants::{COMBINED_FREQ_A, COMBINED_FREQ_B, NOISE_OFFSET_RANGE};

/* ===========================================================
   single channel
   =========================================================== */

#[derive(Clone, Copy)]
pub struct NoiseChannel {
    perlin: Perlin,
    offset: f64,
    scale: f64,
}

impl NoiseChannel {
    pub fn new(perlin: Perlin, rng: &mut impl Rng, scale: f32) -> Self {
        Self {
            perlin,
            offset: rng.gen_range(0.0..NOISE_OFFSET_RANGE),
            scale: scale as f64,
        }
    }

    /// `[0, 1]` sample at integer grid coordinates
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        self.sample_scaled(x, y, 1.0)
    }

    fn sample_scaled(&self, x: i32, y: i32, freq_mul: f64) -> f32 {
        let n = self.perlin.get([
            (x as f64 + self.offset) * self.scale * freq_mul,
            (y as f64 + self.offset) * self.scale * freq_mul,
        ]);
        // Perlin yields [-1, 1]; remap and clamp against numeric spill
        (((n + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }
}

/* ===========================================================
   dual-frequency blend (caves, decay)
   =========================================================== */

/// Two decorrelated channels averaged at 0.5x and 0.3x of the nominal scale.
/// The blend breaks up the axis-aligned banding a single octave produces.
#[derive(Clone, Copy)]
pub struct CombinedChannel {
    a: NoiseChannel,
    b: NoiseChannel,
}

impl CombinedChannel {
    pub fn new(perlin: Perlin, rng: &mut impl Rng, scale: f32) -> Self {
        Self {
            a: NoiseChannel::new(perlin, rng, scale),
            b: NoiseChannel::new(perlin, rng, scale),
        }
    }

    pub fn sample(&self, x: i32, y: i32) -> f32 {
        (self.a.sample_scaled(x, y, COMBINED_FREQ_A) + self.b.sample_scaled(x, y, COMBINED_FREQ_B))
            * 0.5
    }
}

/* ===========================================================
   resource: all generation channels for one run
   =========================================================== */

#[derive(Resource)]
pub struct NoiseLayers {
    perlin: Perlin,
    pub dirt: NoiseChannel,
    pub ice: NoiseChannel,
    pub magma: NoiseChannel,
    pub ore: NoiseChannel,
    pub cave: CombinedChannel,
}

impl NoiseLayers {
    pub fn new(cfg: &WorldConfig, rng: &mut impl Rng) -> Self {
        let perlin = Perlin::new(rng.gen());
        Self {
            perlin,
            dirt: NoiseChannel::new(perlin, rng, cfg.dirt_noise_scale),
            ice: NoiseChannel::new(perlin, rng, cfg.ice_noise_scale),
            magma: NoiseChannel::new(perlin, rng, cfg.magma_noise_scale),
            ore: NoiseChannel::new(perlin, rng, cfg.ore_noise_scale),
            cave: CombinedChannel::new(perlin, rng, cfg.cave_noise_scale),
        }
    }

    /// Decay passes draw fresh offsets every tick so the damaged patches
    /// wander instead of deepening in place.
    pub fn damage_channel(&self, cfg: &WorldConfig, rng: &mut impl Rng) -> CombinedChannel {
        CombinedChannel::new(self.perlin, rng, cfg.damage_noise_scale)
    }
}
