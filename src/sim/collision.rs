//! Collision detection for the player
//!
//! Discrete per-tick test: the player's shape (at its anchor, i.e. the hop
//! destination) against every shape of every active entity. The first
//! overlapping pair wins. Entities are scanned in insertion order, which is
//! ascending id; goal slots are inserted before any traffic when a level is
//! built, so a goal always takes priority over traffic touching the same spot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Category, EntityKind, MobileEntity};
use super::player::Player;
use crate::consts::*;
use crate::settings::Settings;

/// Vertical classification of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    OutOfBounds,
    River,
    Road,
    Safe,
}

/// Classify a shape center
pub fn classify_zone(center: Vec2, settings: &Settings) -> Zone {
    if center.y < CELL
        || center.y > settings.world_height()
        || center.x < 0.0
        || center.x > settings.world_width()
    {
        Zone::OutOfBounds
    } else if center.y > RIVER_TOP && center.y < RIVER_BOTTOM {
        Zone::River
    } else if center.y > ROAD_TOP && center.y < ROAD_BOTTOM {
        Zone::Road
    } else {
        Zone::Safe
    }
}

/// First overlapping entity shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Index into the entity slice
    pub index: usize,
    pub entity_id: u32,
    /// Index of the shape within the entity
    pub shape: usize,
}

/// Scan active entities in order and stop at the first overlap
pub fn first_hit(center: Vec2, radius: f32, entities: &[MobileEntity]) -> Option<Hit> {
    entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.active)
        .find_map(|(index, e)| {
            e.shapes
                .iter()
                .position(|s| crate::circles_overlap(center, radius, s.center(e.pos), s.radius))
                .map(|shape| Hit {
                    index,
                    entity_id: e.id,
                    shape,
                })
        })
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    OutOfBounds,
    Drowned,
    RunOver,
    Bitten,
    OutOfTime,
}

/// What the collision pass decided for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Player is dead; nothing tested
    Skipped,
    /// Standing on solid ground, nothing touched
    Clear,
    Lethal(DeathCause),
    Ride { carrier_id: u32 },
    Goal { slot: usize },
}

/// Classify the player's contact with the board
pub fn detect(player: &Player, entities: &[MobileEntity], settings: &Settings) -> Contact {
    if !player.is_alive() {
        return Contact::Skipped;
    }

    let center = player.shape_center();
    let zone = classify_zone(center, settings);
    if zone == Zone::OutOfBounds {
        return Contact::Lethal(DeathCause::OutOfBounds);
    }

    let Some(hit) = first_hit(center, player.shape.radius, entities) else {
        return if zone == Zone::River {
            Contact::Lethal(DeathCause::Drowned)
        } else {
            Contact::Clear
        };
    };

    let entity = &entities[hit.index];
    match (entity.category(), entity.kind) {
        (Category::Hazard, _) => Contact::Lethal(DeathCause::RunOver),
        (Category::Carrier, _) if entity.is_lethal_shape(hit.shape) => {
            Contact::Lethal(DeathCause::Bitten)
        }
        (Category::Carrier, _) => Contact::Ride {
            carrier_id: entity.id,
        },
        (Category::Goal, EntityKind::Goal { slot }) => Contact::Goal { slot },
        (Category::Goal, _) => Contact::Clear,
    }
}
