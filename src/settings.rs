//! Game rules and lane layout
//!
//! Everything a designer might want to tune without touching the simulation.
//! Loaded from JSON by hosts that ship custom rules, defaults otherwise.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CELL;
use crate::error::SimError;

/// What a river lane may swap its base log for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rider {
    /// Short logs, occasionally replaced by a turtle raft
    Turtles,
    /// Long logs, occasionally replaced by a crocodile
    Crocodile,
}

/// Traffic category of a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneKind {
    Road,
    River { rider: Rider, rider_chance: u32 },
}

/// One lane of the default layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSpec {
    /// Grid row the lane occupies
    pub row: u32,
    /// Spawn column (may be off-screen, e.g. -3)
    pub spawn_col: i32,
    /// Level-1 horizontal speed before scaling (units/ms, signed)
    pub speed: f32,
    pub kind: LaneKind,
}

impl LaneSpec {
    pub const fn road(row: u32, spawn_col: i32, speed: f32) -> Self {
        Self {
            row,
            spawn_col,
            speed,
            kind: LaneKind::Road,
        }
    }

    pub const fn river(row: u32, spawn_col: i32, speed: f32, rider: Rider, rider_chance: u32) -> Self {
        Self {
            row,
            spawn_col,
            speed,
            kind: LaneKind::River { rider, rider_chance },
        }
    }

    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(self.spawn_col as f32 * CELL, self.row as f32 * CELL)
    }
}

/// Game rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    /// World width in cells
    pub world_cols: u32,
    /// World height in cells
    pub world_rows: u32,
    /// Player start cell (column, row)
    pub start_cell: (u32, u32),

    // === Session ===
    pub starting_lives: u32,
    pub starting_level: u32,
    /// Level countdown in seconds
    pub level_time: u32,
    /// Delay between death and respawn
    pub respawn_delay_ms: u64,

    // === Traffic ===
    /// Gap kept between two entities of a lane
    pub lane_padding: f32,
    pub lanes: Vec<LaneSpec>,

    // === Cosmetics ===
    pub max_particles: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_cols: 13,
            world_rows: 14,
            start_cell: (6, 13),

            starting_lives: 5,
            starting_level: 1,
            level_time: 60,
            respawn_delay_ms: 2000,

            lane_padding: 64.0,
            lanes: default_lanes(),

            max_particles: 256,
        }
    }
}

/// River rows 2-6 then road rows 8-12; row 7 is the median strip
fn default_lanes() -> Vec<LaneSpec> {
    vec![
        LaneSpec::river(2, -3, 0.06, Rider::Turtles, 40),
        LaneSpec::river(3, 13, -0.04, Rider::Crocodile, 30),
        LaneSpec::river(4, -3, 0.09, Rider::Turtles, 50),
        LaneSpec::river(5, -4, 0.045, Rider::Crocodile, 20),
        LaneSpec::river(6, 13, -0.045, Rider::Turtles, 10),
        LaneSpec::road(8, 13, -0.1),
        LaneSpec::road(9, -4, 0.08),
        LaneSpec::road(10, 13, -0.12),
        LaneSpec::road(11, -4, 0.075),
        LaneSpec::road(12, 13, -0.05),
    ]
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject layouts the simulation cannot run
    pub fn validate(&self) -> Result<(), SimError> {
        if self.world_cols == 0 || self.world_rows < 2 {
            return Err(SimError::InvalidSettings(format!(
                "world of {}x{} cells is too small",
                self.world_cols, self.world_rows
            )));
        }
        let (col, row) = self.start_cell;
        if col >= self.world_cols || row == 0 || row >= self.world_rows {
            return Err(SimError::InvalidSettings(format!(
                "start cell ({col}, {row}) lies outside the world"
            )));
        }
        if self.starting_lives == 0 {
            return Err(SimError::InvalidSettings("starting lives must be positive".into()));
        }
        if self.level_time == 0 {
            return Err(SimError::InvalidSettings("level time must be positive".into()));
        }
        if let Some(lane) = self.lanes.iter().find(|l| l.speed == 0.0) {
            return Err(SimError::ZeroLaneSpeed { row: lane.row });
        }
        Ok(())
    }

    #[inline]
    pub fn world_width(&self) -> f32 {
        self.world_cols as f32 * CELL
    }

    #[inline]
    pub fn world_height(&self) -> f32 {
        self.world_rows as f32 * CELL
    }

    /// Top-left of the start cell
    pub fn start_position(&self) -> Vec2 {
        Vec2::new(
            self.start_cell.0 as f32 * CELL,
            self.start_cell.1 as f32 * CELL,
        )
    }

    /// Whether a player whose top-left is `pos` stands inside the playable
    /// rectangle. Row 0 is the border above the goals and never playable.
    pub fn contains_cell(&self, pos: Vec2) -> bool {
        pos.x >= 0.0
            && pos.x <= self.world_width() - CELL
            && pos.y >= CELL
            && pos.y <= self.world_height() - CELL
    }

    /// Lane speed multiplier for a level
    pub fn speed_scale(level: u32) -> f32 {
        1.0 + level as f32 * crate::consts::LEVEL_SPEEDUP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.world_width(), 416.0);
        assert_eq!(settings.world_height(), 448.0);
        assert_eq!(settings.start_position(), Vec2::new(192.0, 416.0));
    }

    #[test]
    fn test_zero_speed_lane_rejected() {
        let mut settings = Settings::default();
        settings.lanes.push(LaneSpec::road(9, 0, 0.0));
        assert!(matches!(settings.validate(), Err(SimError::ZeroLaneSpeed { row: 9 })));
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let settings = Settings::from_json(r#"{ "starting_lives": 3 }"#).unwrap();
        assert_eq!(settings.starting_lives, 3);
        assert_eq!(settings.level_time, 60);
        assert_eq!(settings.lanes.len(), 10);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(Settings::from_json("not json"), Err(SimError::Parse(_))));
        assert!(matches!(
            Settings::from_json(r#"{ "start_cell": [40, 2] }"#),
            Err(SimError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_lanes() {
        let settings = Settings::default();
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.lanes, settings.lanes);
    }

    #[test]
    fn test_contains_cell() {
        let settings = Settings::default();
        assert!(settings.contains_cell(Vec2::new(0.0, 32.0)));
        assert!(settings.contains_cell(Vec2::new(384.0, 416.0)));
        assert!(!settings.contains_cell(Vec2::new(-32.0, 416.0)));
        assert!(!settings.contains_cell(Vec2::new(416.0, 416.0)));
        assert!(!settings.contains_cell(Vec2::new(192.0, 0.0)));
        assert!(!settings.contains_cell(Vec2::new(192.0, 448.0)));
    }
}
