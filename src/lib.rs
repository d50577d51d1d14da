//! Frog Crossing - simulation core for a road-and-river crossing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, lanes, hazards, collisions, game state)
//! - `settings`: Data-driven game rules and lane layout
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{LaneKind, LaneSpec, Rider, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Size of one grid cell in world units
    pub const CELL: f32 = 32.0;

    /// Player hop: 8 sub-steps of 4 units, 10 ms apart
    pub const HOP_STEP: f32 = 4.0;
    pub const HOP_SUB_STEPS: u32 = (CELL / HOP_STEP) as u32;
    pub const HOP_STEP_DELAY_MS: u32 = 10;

    /// Collision radii
    pub const PLAYER_RADIUS: f32 = 10.0;
    pub const SEGMENT_RADIUS: f32 = 14.0;

    /// Zone boundaries (compared against shape centers, exclusive)
    pub const RIVER_TOP: f32 = CELL;
    pub const RIVER_BOTTOM: f32 = RIVER_TOP + 6.0 * CELL;
    pub const ROAD_TOP: f32 = 8.0 * CELL;
    pub const ROAD_BOTTOM: f32 = ROAD_TOP + 5.0 * CELL;

    /// Scoring
    pub const GOAL_POINTS: u64 = 100;

    /// Level timer ticks down once per second
    pub const TIMER_STEP_MS: u32 = 1000;

    /// Lane speed multiplier per level: 1 + level * LEVEL_SPEEDUP
    pub const LEVEL_SPEEDUP: f32 = 0.05;

    /// Vehicle spacing offset (logs use the negative)
    pub const SPACING_OFFSET: f32 = 32.0;
    /// First spawn window of a fresh lane
    pub const INITIAL_SPAWN_DELAY_MS: u32 = 1000;
    /// Production gates (percent)
    pub const VEHICLE_CHANCE: u32 = 50;
    pub const LOG_CHANCE: u32 = 80;
    pub const CAR_SHARE: u32 = 80;
    /// Enforcement car speed multiplier
    pub const ENFORCER_SPEEDUP: f32 = 5.0;

    /// Heat wave timing
    pub const HEAT_PERIOD_MS: u32 = 2000;
    pub const HEAT_DURATION_MS: u32 = 1000;
    /// Wind gust timing
    pub const WIND_PERIOD_MS: u32 = 5000;
    pub const WIND_DURATION_MS: u32 = 3000;
    /// Gust displacement range
    pub const WIND_SHIFT_MIN: f32 = 16.0;
    pub const WIND_SHIFT_MAX: f32 = 32.0;
    /// Per-level arming chance (percent)
    pub const HAZARD_CHANCE_PER_LEVEL: u32 = 10;
    /// Per-level window shrink (ms)
    pub const HAZARD_SHRINK_PER_LEVEL: u32 = 10;

    /// Ambient particles
    pub const PARTICLE_CHANCE: u32 = 10;
    pub const HEAT_PARTICLE_LIFE_MS: u32 = 1000;
    pub const WIND_PARTICLE_LIFE_MS: u32 = 2000;

    /// Level warm-up: 500 cycles of 10 ms before play starts
    pub const WARMUP_CYCLES: u32 = 500;
    pub const WARMUP_STEP_MS: u32 = 10;
}

/// Snap a coordinate to the nearest grid line
#[inline]
pub fn snap_to_grid(v: f32) -> f32 {
    (v / consts::CELL).round() * consts::CELL
}

/// Top-left world position of a grid cell
#[inline]
pub fn cell_to_world(col: i32, row: i32) -> Vec2 {
    Vec2::new(col as f32 * consts::CELL, row as f32 * consts::CELL)
}

/// Squared-distance circle overlap (touching circles do not overlap)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}
