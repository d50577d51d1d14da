//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only, one stream per random source
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod goals;
pub mod hazard;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Contact, DeathCause, Zone, classify_zone, detect};
pub use entity::{Category, CollisionShape, EntityKind, MobileEntity, Particle, ParticleKind};
pub use goals::{GoalRow, GoalTracker};
pub use hazard::{HeatTimer, WindTimer};
pub use player::{Direction, Motion, Player};
pub use spawner::{Lane, Spawn, build_lanes};
pub use state::{GameEvent, GameMode, GameState, Scoreboard, Snapshot};
pub use tick::{TickInput, tick};
