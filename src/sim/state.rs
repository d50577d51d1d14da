//! Game state and core simulation types
//!
//! Everything a tick touches lives here. Random sources are derived from the
//! run seed, so a seed plus an input sequence reproduces a run exactly.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Contact, DeathCause};
use super::entity::{EntityKind, MobileEntity, Particle};
use super::goals::{GoalRow, GoalTracker};
use super::hazard::{HeatTimer, WindTimer};
use super::player::{Direction, Player};
use super::spawner::{Lane, build_lanes};
use crate::consts::*;
use crate::error::SimError;
use crate::settings::Settings;

/// Current game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Title screen with ambient traffic
    Intro,
    /// Active gameplay
    Play,
    /// All goals reached, waiting to start the next level
    FinishLevel,
    Instructions,
    /// Out of lives
    Over,
}

/// Something the host may want to react to (sound, UI)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A hop started; `forced` when a heat wave made the player jump
    Moved { direction: Direction, forced: bool },
    Died { cause: DeathCause },
    GoalReached { slot: usize, bonus: bool },
    HeatArmed,
    WindArmed,
    LevelCleared { level: u32 },
    GameOver { score: u64 },
}

/// Score, lives and the level countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u64,
    pub lives: u32,
    /// Seconds left on the level timer
    pub level_timer: u32,
    /// Time accumulated toward the next timer step
    timer_ms: u32,
}

impl Scoreboard {
    pub fn new(settings: &Settings) -> Self {
        Self {
            score: 0,
            lives: settings.starting_lives,
            level_timer: settings.level_time,
            timer_ms: 0,
        }
    }

    pub fn reset_timer(&mut self, level_time: u32) {
        self.level_timer = level_time;
        self.timer_ms = 0;
    }

    /// Count the level timer down. Returns true on the tick it runs out.
    pub fn tick_timer(&mut self, dt_ms: u32) -> bool {
        if self.level_timer == 0 {
            return false;
        }
        self.timer_ms = self.timer_ms.saturating_add(dt_ms);
        while self.timer_ms >= TIMER_STEP_MS && self.level_timer > 0 {
            self.timer_ms -= TIMER_STEP_MS;
            self.level_timer -= 1;
        }
        self.level_timer == 0
    }
}

/// RNG stream ids
pub const HEAT_STREAM: u64 = 1;
pub const WIND_STREAM: u64 = 2;
pub const GOAL_STREAM: u64 = 3;
/// Lanes use `LANE_STREAM + lane index`
pub const LANE_STREAM: u64 = 16;

/// Independent generator for one random source of one level
pub fn stream_rng(seed: u64, level: u32, stream: u64) -> Pcg32 {
    let state = seed.wrapping_add((level as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    Pcg32::new(state, stream)
}

/// Renderer-facing view of one goal slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalView {
    pub slot: usize,
    pub pos: Vec2,
    pub reached: bool,
    pub bonus: bool,
}

/// Serializable picture of the state for hosts and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: GameMode,
    pub level: u32,
    pub score: u64,
    pub lives: u32,
    pub level_timer: u32,
    pub alive: bool,
    pub frame: u8,
    pub player_pos: Vec2,
    pub carrier: Option<u32>,
    pub cheating: bool,
    pub heat_armed: bool,
    pub wind_armed: bool,
    pub goals: Vec<GoalView>,
    pub entities: Vec<MobileEntity>,
    pub particles: Vec<Particle>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<G: GoalTracker = GoalRow> {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub mode: GameMode,
    /// Current level index
    pub level: u32,
    pub board: Scoreboard,
    pub player: Player,
    pub goals: G,
    /// Moving entities in insertion (ascending id) order
    pub entities: Vec<MobileEntity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub(crate) lanes: Vec<Lane>,
    pub(crate) heat: HeatTimer,
    pub(crate) wind: WindTimer,
    events: Vec<GameEvent>,
    /// Session clock, advanced by every tick
    now_ms: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState<GoalRow> {
    /// Create a game with the stock goal row
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SimError> {
        let goals = GoalRow::new(stream_rng(seed, 0, GOAL_STREAM));
        Self::with_goals(settings, seed, goals)
    }
}

impl<G: GoalTracker> GameState<G> {
    /// Create a game in the intro screen with traffic already flowing
    pub fn with_goals(settings: Settings, seed: u64, goals: G) -> Result<Self, SimError> {
        settings.validate()?;
        let level = settings.starting_level;
        let mut state = Self {
            seed,
            mode: GameMode::Intro,
            level,
            board: Scoreboard::new(&settings),
            player: Player::new(&settings),
            goals,
            entities: Vec::new(),
            particles: Vec::new(),
            lanes: Vec::new(),
            heat: HeatTimer::new(stream_rng(seed, level, HEAT_STREAM)),
            wind: WindTimer::new(stream_rng(seed, level, WIND_STREAM)),
            events: Vec::new(),
            now_ms: 0,
            next_id: 1,
            settings,
        };
        state.init_level()?;
        Ok(state)
    }

    /// Rebuild the board for the current level: goals first, then lanes,
    /// then a warm-up so every lane is populated.
    pub fn init_level(&mut self) -> Result<(), SimError> {
        self.lanes = build_lanes(&self.settings, self.level, self.seed)?;
        self.entities.clear();
        self.particles.clear();
        self.next_id = 1;
        self.heat = HeatTimer::new(stream_rng(self.seed, self.level, HEAT_STREAM));
        self.wind = WindTimer::new(stream_rng(self.seed, self.level, WIND_STREAM));

        self.goals.initialize(self.level);
        for slot in 0..self.goals.slot_count() {
            let pos = self.goals.slot_position(slot);
            self.insert_entity(EntityKind::Goal { slot }, pos, Vec2::ZERO);
        }

        for _ in 0..WARMUP_CYCLES {
            self.cycle_traffic(WARMUP_STEP_MS);
        }
        log::info!(
            "Level {} ready: {} lanes, {} entities",
            self.level,
            self.lanes.len(),
            self.entities.len()
        );
        Ok(())
    }

    /// Fresh session from the first level
    pub fn new_game(&mut self) -> Result<(), SimError> {
        let cheating = self.player.cheating;
        self.level = self.settings.starting_level;
        self.board = Scoreboard::new(&self.settings);
        self.player = Player::new(&self.settings);
        self.player.cheating = cheating;
        self.init_level()?;
        self.mode = GameMode::Play;
        log::info!("New game started (seed {})", self.seed);
        Ok(())
    }

    /// Advance to the next level with faster lanes
    pub fn next_level(&mut self) -> Result<(), SimError> {
        self.level += 1;
        self.init_level()?;
        self.player.reset(&self.settings, &mut self.board);
        self.mode = GameMode::Play;
        Ok(())
    }

    /// Allocate a new entity ID. Ids restart at every level; a single
    /// uninterrupted level would need years of traffic to wrap.
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Append an entity; ids grow monotonically so the list stays sorted
    pub fn insert_entity(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(MobileEntity::new(id, kind, pos, vel));
        id
    }

    /// Run every lane spawner, move all entities, drop the ones that left
    pub fn cycle_traffic(&mut self, dt_ms: u32) {
        let spawns: Vec<_> = self
            .lanes
            .iter_mut()
            .filter_map(|lane| {
                lane.update(dt_ms);
                lane.produce()
            })
            .collect();
        for spawn in spawns {
            self.insert_entity(spawn.kind, spawn.pos, spawn.vel);
        }

        let width = self.settings.world_width();
        for entity in &mut self.entities {
            entity.update(dt_ms);
        }
        self.entities.retain(|e| !e.is_gone(width));
    }

    pub fn update_particles(&mut self, dt_ms: u32) {
        for particle in &mut self.particles {
            particle.update(dt_ms);
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Add a particle unless the cap is reached
    pub fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() < self.settings.max_particles {
            self.particles.push(particle);
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub(crate) fn advance_clock(&mut self, dt_ms: u32) {
        self.now_ms += u64::from(dt_ms);
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Kill the player; a cheating player only gets the timer reset
    pub fn kill_player(&mut self, cause: DeathCause) {
        if !self.player.die(self.now_ms, &self.settings, &mut self.board) {
            return;
        }
        self.particles.clear();
        self.heat.disarm();
        self.wind.disarm();
        log::info!("Player died ({cause:?}), {} lives left", self.board.lives);
        self.emit(GameEvent::Died { cause });
    }

    /// Carry out the collision verdict for this tick
    pub fn apply_contact(&mut self, contact: Contact) {
        match contact {
            Contact::Skipped | Contact::Clear => {}
            Contact::Lethal(cause) => self.kill_player(cause),
            Contact::Ride { carrier_id } => self.player.follow(carrier_id),
            Contact::Goal { slot } => self.reach_goal(slot),
        }
    }

    fn reach_goal(&mut self, slot: usize) {
        if self.goals.is_reached(slot) {
            self.player.place(self.goals.slot_position(slot));
            return;
        }

        let bonus = self.goals.is_bonus(slot);
        self.board.score += GOAL_POINTS + u64::from(self.board.level_timer);
        if bonus {
            self.board.lives += 1;
        }
        self.goals.mark_reached(slot);
        self.player.reset(&self.settings, &mut self.board);
        log::info!(
            "Goal {slot} reached{}; score {}",
            if bonus { " with bonus" } else { "" },
            self.board.score
        );
        self.emit(GameEvent::GoalReached { slot, bonus });
    }

    pub fn snapshot(&self) -> Snapshot {
        let goals = (0..self.goals.slot_count())
            .map(|slot| GoalView {
                slot,
                pos: self.goals.slot_position(slot),
                reached: self.goals.is_reached(slot),
                bonus: self.goals.is_bonus(slot),
            })
            .collect();
        Snapshot {
            mode: self.mode,
            level: self.level,
            score: self.board.score,
            lives: self.board.lives,
            level_timer: self.board.level_timer,
            alive: self.player.is_alive(),
            frame: self.player.frame(),
            player_pos: self.player.pos,
            carrier: self.player.carrier(),
            cheating: self.player.cheating,
            heat_armed: self.heat.is_armed(),
            wind_armed: self.wind.is_armed(),
            goals,
            entities: self.entities.clone(),
            particles: self.particles.clone(),
        }
    }
}
