//! Goal slots along the far bank
//!
//! The game state only talks to goals through [`GoalTracker`], so a host can
//! swap in its own layout. [`GoalRow`] is the stock five-slot row with a
//! roaming bonus marker.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::cell_to_world;

/// Goal slot bookkeeping consumed by the game state
pub trait GoalTracker {
    /// Reset every slot for a new level
    fn initialize(&mut self, level: u32);

    fn slot_count(&self) -> usize;

    fn unreached_count(&self) -> usize;

    fn is_reached(&self, slot: usize) -> bool;

    /// Whether reaching `slot` right now awards the bonus
    fn is_bonus(&self, slot: usize) -> bool;

    fn mark_reached(&mut self, slot: usize);

    /// Top-left world position of a slot
    fn slot_position(&self, slot: usize) -> Vec2;

    fn update(&mut self, dt_ms: u32);
}

/// Grid row holding the goal slots
pub const GOAL_ROW: i32 = 1;
/// Slot columns, left to right
pub const GOAL_COLUMNS: [i32; 5] = [0, 3, 6, 9, 12];
/// Full bonus cycle
pub const BONUS_CYCLE_MS: u32 = 7000;
/// Portion of each cycle the bonus is shown, at the end of the cycle
pub const BONUS_VISIBLE_MS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSlot {
    pub col: i32,
    pub reached: bool,
}

/// Five slots on row 1. Once per cycle a random unreached slot carries the
/// bonus for `BONUS_VISIBLE_MS`.
#[derive(Debug, Clone)]
pub struct GoalRow {
    slots: Vec<GoalSlot>,
    bonus: Option<usize>,
    cycle_ms: u32,
    showing: bool,
    rng: Pcg32,
}

impl GoalRow {
    pub fn new(rng: Pcg32) -> Self {
        let slots = GOAL_COLUMNS
            .iter()
            .map(|&col| GoalSlot { col, reached: false })
            .collect();
        Self {
            slots,
            bonus: None,
            cycle_ms: 0,
            showing: false,
            rng,
        }
    }

    pub fn slots(&self) -> &[GoalSlot] {
        &self.slots
    }

    /// Slot currently carrying the bonus
    pub fn bonus_slot(&self) -> Option<usize> {
        self.bonus.filter(|&slot| !self.is_reached(slot))
    }

    fn pick_bonus(&mut self) -> Option<usize> {
        let open: Vec<usize> = (0..self.slots.len()).filter(|&i| !self.slots[i].reached).collect();
        if open.is_empty() {
            return None;
        }
        Some(open[self.rng.random_range(0..open.len())])
    }
}

impl GoalTracker for GoalRow {
    fn initialize(&mut self, level: u32) {
        for slot in &mut self.slots {
            slot.reached = false;
        }
        self.bonus = None;
        self.cycle_ms = 0;
        self.showing = false;
        log::debug!("Goal row reset for level {level}");
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn unreached_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.reached).count()
    }

    fn is_reached(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.reached)
    }

    fn is_bonus(&self, slot: usize) -> bool {
        self.bonus_slot() == Some(slot)
    }

    fn mark_reached(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.reached = true;
        }
    }

    fn slot_position(&self, slot: usize) -> Vec2 {
        let col = self.slots.get(slot).map_or(0, |s| s.col);
        cell_to_world(col, GOAL_ROW)
    }

    fn update(&mut self, dt_ms: u32) {
        self.cycle_ms = (self.cycle_ms + dt_ms % BONUS_CYCLE_MS) % BONUS_CYCLE_MS;
        let showing = self.cycle_ms >= BONUS_CYCLE_MS - BONUS_VISIBLE_MS;

        if showing && !self.showing {
            self.bonus = self.pick_bonus();
        } else if !showing && self.showing {
            self.bonus = None;
        }
        self.showing = showing;
    }
}
