//! Mobile entities: traffic, river carriers, goal slots and particles
//!
//! Positions are the top-left of an entity's footprint. Each 32-unit segment
//! of a footprint carries one circular collision shape.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A circular collision bound, positioned relative to its owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    pub radius: f32,
    /// Offset from the owner's position to the circle center
    pub offset: Vec2,
}

impl CollisionShape {
    pub fn new(radius: f32, offset: Vec2) -> Self {
        Self { radius, offset }
    }

    /// Shape centered in the grid cell `segment` cells to the right of the owner
    pub fn segment(segment: u32) -> Self {
        Self::new(
            SEGMENT_RADIUS,
            Vec2::new(segment as f32 * CELL + CELL / 2.0, CELL / 2.0),
        )
    }

    /// World-space center for an owner at `owner`
    #[inline]
    pub fn center(&self, owner: Vec2) -> Vec2 {
        owner + self.offset
    }

    /// Circle overlap against another shape
    #[inline]
    pub fn overlaps(&self, owner: Vec2, other: &CollisionShape, other_owner: Vec2) -> bool {
        crate::circles_overlap(self.center(owner), self.radius, other.center(other_owner), other.radius)
    }
}

/// Outcome class of touching an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Lethal on contact
    Hazard,
    /// Can be ridden
    Carrier,
    /// Goal slot
    Goal,
}

/// Diving turtle cycle: surfaced then submerged
pub const TURTLE_SURFACE_MS: u32 = 3000;
pub const TURTLE_DIVE_MS: u32 = 1200;

/// Entity kinds and their kind-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Paint variant for the renderer
    Car { variant: u8 },
    Truck,
    /// High-speed car sent into an empty road lane
    Enforcer,
    ShortLog,
    LongLog,
    /// Turtle raft; diving rafts periodically go under
    Turtles { diving: bool, cycle_ms: u32 },
    /// Long carrier whose head shape bites
    Crocodile { head: usize },
    Goal { slot: usize },
}

/// Number of car paint variants
pub const CAR_VARIANTS: u8 = 4;

impl EntityKind {
    /// Footprint length in world units
    pub fn length(&self) -> f32 {
        match self {
            EntityKind::Car { .. } | EntityKind::Enforcer | EntityKind::Goal { .. } => CELL,
            EntityKind::Truck => 2.0 * CELL,
            EntityKind::ShortLog | EntityKind::Turtles { .. } => 3.0 * CELL,
            EntityKind::LongLog | EntityKind::Crocodile { .. } => 4.0 * CELL,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            EntityKind::Car { .. } | EntityKind::Truck | EntityKind::Enforcer => Category::Hazard,
            EntityKind::ShortLog
            | EntityKind::LongLog
            | EntityKind::Turtles { .. }
            | EntityKind::Crocodile { .. } => Category::Carrier,
            EntityKind::Goal { .. } => Category::Goal,
        }
    }

    /// Crocodile facing its direction of travel; the head is the leading segment
    pub fn crocodile(vel: Vec2) -> Self {
        let head = if vel.x >= 0.0 { 3 } else { 0 };
        EntityKind::Crocodile { head }
    }

    /// Lane spacing offset added to length + padding when scheduling the next spawn
    pub fn spacing_offset(&self) -> f32 {
        match self.category() {
            Category::Carrier => -SPACING_OFFSET,
            _ => SPACING_OFFSET,
        }
    }
}

/// Anything that moves across the board and can be collided with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileEntity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Units per millisecond
    pub vel: Vec2,
    pub shapes: Vec<CollisionShape>,
    /// Participates in collision tests
    pub active: bool,
}

impl MobileEntity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, vel: Vec2) -> Self {
        let segments = (kind.length() / CELL) as u32;
        let shapes = (0..segments).map(CollisionShape::segment).collect();
        Self {
            id,
            kind,
            pos,
            vel,
            shapes,
            active: true,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Advance position and kind-specific timers
    pub fn update(&mut self, dt_ms: u32) {
        self.pos += self.vel * dt_ms as f32;

        if let EntityKind::Turtles { diving: true, ref mut cycle_ms } = self.kind {
            let period = TURTLE_SURFACE_MS + TURTLE_DIVE_MS;
            *cycle_ms = (*cycle_ms + dt_ms % period) % period;
            self.active = *cycle_ms < TURTLE_SURFACE_MS;
        }
    }

    /// True once the entity has fully left the world in its direction of travel
    pub fn is_gone(&self, world_width: f32) -> bool {
        if self.vel.x > 0.0 {
            self.pos.x > world_width
        } else if self.vel.x < 0.0 {
            self.pos.x + self.kind.length() < 0.0
        } else {
            false
        }
    }

    /// Whether this shape index is the crocodile's head
    pub fn is_lethal_shape(&self, shape: usize) -> bool {
        match self.kind {
            EntityKind::Crocodile { head } => head == shape,
            _ => false,
        }
    }
}

/// A cosmetic particle (smoke puff, blown leaf). Never collides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in ms
    pub life_ms: u32,
    pub kind: ParticleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Smoke,
    Leaf,
}

impl Particle {
    pub fn update(&mut self, dt_ms: u32) {
        self.pos += self.vel * dt_ms as f32;
        self.life_ms = self.life_ms.saturating_sub(dt_ms);
    }

    pub fn is_alive(&self) -> bool {
        self.life_ms > 0
    }
}
