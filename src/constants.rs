/// -------- world size & geometry --------
pub const WORLD_WIDTH: i32 = 40;
pub const WORLD_HEIGHT: i32 = 100;
pub const CELL_SIZE: f32 = 1.0;
pub const NUM_TOP_EMPTY_LAYERS: i32 = 9;

/// -------- terrain noise --------
pub const DIRT_NOISE_SCALE: f32 = 0.1;
pub const DIRT_THRESHOLD: f32 = 0.5;
pub const DIRT_THRESHOLD_DEPTH_GAIN: f32 = 0.2;

pub const ICE_NOISE_SCALE: f32 = 0.1;
pub const ICE_THRESHOLD: f32 = 0.6;
pub const ICE_THRESHOLD_DEPTH_GAIN: f32 = 0.4;

pub const MAGMA_NOISE_SCALE: f32 = 0.1;
pub const MAGMA_THRESHOLD: f32 = 0.6;
pub const MAGMA_THRESHOLD_DEPTH_DROP: f32 = 0.4;

pub const ORE_NOISE_SCALE: f32 = 0.1;
pub const ORE_THRESHOLD: f32 = 0.7;
pub const ORE_THRESHOLD_DEPTH_DROP: f32 = 0.2;
pub const LARGE_ORE_THRESHOLD: f32 = 0.8;
pub const LARGE_ORE_THRESHOLD_DEPTH_DROP: f32 = 0.2;

/// -------- caves --------
pub const CAVE_NOISE_SCALE: f32 = 0.05;
pub const CAVE_THRESHOLD: f32 = 0.8;

/// -------- ambient decay --------
pub const DAMAGE_NOISE_SCALE: f32 = 0.05;
pub const MIN_DAMAGE_THRESHOLD: f32 = 0.5;
pub const MAX_DAMAGE_THRESHOLD: f32 = 0.6;
pub const DAMAGE_THRESHOLD_STEP: f32 = 0.1;
pub const DAMAGE_INTERVAL: f32 = 5.0;
pub const DAMAGE_INTERVAL_STEP: f32 = 0.1;
pub const DAMAGE_INTERVAL_FLOOR: f32 = 1.0;

/// -------- collapse --------
pub const COLLAPSE_INTERVAL: f32 = 3.0;
pub const BLOCKS_PER_COLLAPSE: usize = 12;

/// -------- lava --------
pub const LAVA_INITIAL_SPEED: f32 = 0.05;
pub const LAVA_SPEED_STEP: f32 = 0.05;
pub const LAVA_RAMP_INTERVAL: f32 = 10.0;

/// -------- damage overlay & loot --------
pub const DAMAGE_OVERLAY_LEVELS: u32 = 4;
pub const LOOT_JITTER: f32 = 0.25;
pub const LOOT_IMPULSE: f32 = 2.0;

/// per-axis offset range that decorrelates noise channels
pub const NOISE_OFFSET_RANGE: f64 = 1000.0;

/// frequency multipliers blended into "combined" noise (caves, decay)
pub const COMBINED_FREQ_A: f64 = 0.5;
pub const COMBINED_FREQ_B: f64 = 0.3;
