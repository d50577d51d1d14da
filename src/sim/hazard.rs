//! Environmental hazards: heat waves on the road, wind gusts on the river
//!
//! Both follow the same cycle. Every `period` the timer rolls a
//! `level * 10` percent chance to arm. Once armed, the effect fires after a
//! window of `duration - level * 10` ms, at most once per arming.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Zone;
use super::entity::{Particle, ParticleKind};
use super::player::{Direction, Player};
use crate::consts::*;
use crate::settings::Settings;

/// Arming state shared by both hazards
#[derive(Debug, Clone, Default)]
struct ArmingClock {
    armed: bool,
    since_check_ms: u32,
    since_armed_ms: u32,
}

impl ArmingClock {
    fn update(&mut self, dt_ms: u32) {
        self.since_check_ms = self.since_check_ms.saturating_add(dt_ms);
        self.since_armed_ms = self.since_armed_ms.saturating_add(dt_ms);
    }

    /// Roll for arming once the period has passed. The check clock restarts
    /// whether or not the roll succeeds.
    fn try_arm(&mut self, rng: &mut Pcg32, period_ms: u32, level: u32) -> bool {
        if self.armed || self.since_check_ms <= period_ms {
            return false;
        }
        self.since_check_ms = 0;

        let chance = level.saturating_mul(HAZARD_CHANCE_PER_LEVEL);
        if rng.random_range(0..100) < chance {
            self.armed = true;
            self.since_armed_ms = 1;
            return true;
        }
        false
    }

    fn window_elapsed(&self, duration_ms: u32, level: u32) -> bool {
        let window = duration_ms.saturating_sub(level.saturating_mul(HAZARD_SHRINK_PER_LEVEL));
        self.armed && self.since_armed_ms > window
    }
}

/// Heat wave: a player standing still on hot pavement jumps on their own
#[derive(Debug, Clone)]
pub struct HeatTimer {
    clock: ArmingClock,
    rng: Pcg32,
}

impl HeatTimer {
    pub fn new(rng: Pcg32) -> Self {
        Self {
            clock: ArmingClock::default(),
            rng,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.clock.armed
    }

    pub fn disarm(&mut self) {
        self.clock.armed = false;
    }

    pub fn update(&mut self, dt_ms: u32) {
        self.clock.update(dt_ms);
    }

    /// Arm only on the road. Arming clears the player's moved flag so that the
    /// window measures stillness from now on.
    pub fn try_arm(&mut self, zone: Zone, player: &mut Player, level: u32) -> bool {
        if zone != Zone::Road || !player.is_alive() {
            return false;
        }
        if self.clock.try_arm(&mut self.rng, HEAT_PERIOD_MS, level) {
            player.clear_moved();
            return true;
        }
        false
    }

    /// Force a random hop if the player stayed put for the whole window.
    /// Returns the direction actually taken.
    pub fn perform(&mut self, player: &mut Player, level: u32, settings: &Settings) -> Option<Direction> {
        if !player.is_alive() {
            self.disarm();
            return None;
        }

        if self.clock.window_elapsed(HEAT_DURATION_MS, level) && !player.has_moved_since_arming() {
            self.disarm();
            if !player.is_idle() {
                return None;
            }
            let direction = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
            return player.request_move(direction, settings).then_some(direction);
        }

        if player.has_moved_since_arming() {
            self.disarm();
        }
        None
    }

    /// Smoke puffs rising off the player while the heat is on
    pub fn emit_particle(&mut self, origin: Vec2) -> Option<Particle> {
        if !self.clock.armed || self.rng.random_range(0..100) >= PARTICLE_CHANCE {
            return None;
        }
        let vel = Vec2::new(
            (self.rng.random::<f32>() - 0.5) * 0.1,
            (self.rng.random::<f32>() - 0.5) * 0.1,
        );
        Some(Particle {
            pos: origin,
            vel,
            life_ms: HEAT_PARTICLE_LIFE_MS,
            kind: ParticleKind::Smoke,
        })
    }
}

/// Wind gust: pushes a player on the river sideways
#[derive(Debug, Clone)]
pub struct WindTimer {
    clock: ArmingClock,
    /// +1 blows right, -1 blows left
    direction: f32,
    rng: Pcg32,
}

impl WindTimer {
    pub fn new(rng: Pcg32) -> Self {
        Self {
            clock: ArmingClock::default(),
            direction: 1.0,
            rng,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.clock.armed
    }

    pub fn disarm(&mut self) {
        self.clock.armed = false;
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn update(&mut self, dt_ms: u32) {
        self.clock.update(dt_ms);
    }

    /// Arm only while the player is on the river
    pub fn try_arm(&mut self, zone: Zone, level: u32) -> bool {
        if zone != Zone::River {
            return false;
        }
        if self.clock.try_arm(&mut self.rng, WIND_PERIOD_MS, level) {
            self.direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            return true;
        }
        false
    }

    /// Apply the gust once the window has passed. A player mid-hop is pushed
    /// as soon as they land. Returns the applied shift.
    pub fn perform(&mut self, player: &mut Player, level: u32) -> Option<f32> {
        if !player.is_alive() {
            self.disarm();
            return None;
        }
        if !self.clock.window_elapsed(WIND_DURATION_MS, level) || !player.is_idle() {
            return None;
        }

        let shift = self.direction * self.rng.random_range(WIND_SHIFT_MIN..=WIND_SHIFT_MAX);
        self.disarm();
        player.wind_shift(shift).then_some(shift)
    }

    /// Leaves blowing in from the upwind edge across the river
    pub fn emit_particle(&mut self, settings: &Settings) -> Option<Particle> {
        if !self.clock.armed || self.rng.random_range(0..100) >= PARTICLE_CHANCE {
            return None;
        }
        let x = if self.direction > 0.0 { 0.0 } else { settings.world_width() };
        let y = self.rng.random_range(RIVER_TOP..RIVER_BOTTOM);
        let vel = Vec2::new(
            self.direction * 0.2,
            (self.rng.random::<f32>() - 0.5) * 0.02,
        );
        Some(Particle {
            pos: Vec2::new(x, y),
            vel,
            life_ms: WIND_PARTICLE_LIFE_MS,
            kind: ParticleKind::Leaf,
        })
    }
}
