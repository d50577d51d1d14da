//! Per-frame simulation tick
//!
//! Advances the game by the host's elapsed milliseconds. In Play the order is
//! fixed: input, player, lanes and entity movement, hazards, collision, goals,
//! mode transition. Every other mode only keeps the goals and traffic moving.

use super::collision::{DeathCause, classify_zone, detect};
use super::goals::GoalTracker;
use super::player::Direction;
use super::state::{GameEvent, GameMode, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Hop request
    pub direction: Option<Direction>,
    /// Start / continue (enter, tap)
    pub confirm: bool,
    /// Back to the title screen
    pub cancel: bool,
    /// Show the instructions from the title screen
    pub help: bool,
    /// Turn invulnerability on or off
    pub cheat: Option<bool>,
}

/// Advance the game state by `dt_ms`
pub fn tick<G: GoalTracker>(state: &mut GameState<G>, input: &TickInput, dt_ms: u32) {
    state.advance_clock(dt_ms);

    if let Some(cheat) = input.cheat
        && cheat != state.player.cheating
    {
        state.player.cheating = cheat;
        log::info!("Cheat mode {}", if cheat { "on" } else { "off" });
    }

    match state.mode {
        GameMode::Play => play(state, input, dt_ms),
        GameMode::Intro if input.help => {
            log::debug!("Showing instructions");
            state.mode = GameMode::Instructions;
        }
        GameMode::Intro | GameMode::Instructions | GameMode::Over if input.confirm => {
            if let Err(err) = state.new_game() {
                log::error!("Failed to start a new game: {err}");
            }
        }
        GameMode::FinishLevel if input.confirm => {
            if let Err(err) = state.next_level() {
                log::error!("Failed to start level {}: {err}", state.level);
            }
        }
        _ => ambient(state, dt_ms),
    }
}

/// Goals, traffic and particles keep moving behind menus
fn ambient<G: GoalTracker>(state: &mut GameState<G>, dt_ms: u32) {
    state.goals.update(dt_ms);
    state.cycle_traffic(dt_ms);
    state.update_particles(dt_ms);
}

fn play<G: GoalTracker>(state: &mut GameState<G>, input: &TickInput, dt_ms: u32) {
    if input.cancel {
        log::info!("Back to title screen");
        state.mode = GameMode::Intro;
        return;
    }

    // Input
    if let Some(direction) = input.direction
        && state.player.request_move(direction, &state.settings)
    {
        state.emit(GameEvent::Moved { direction, forced: false });
    }

    // Player
    let now = state.now_ms();
    state
        .player
        .update(dt_ms, now, &state.settings, &mut state.board, &state.entities);
    if state.player.is_alive() && state.board.tick_timer(dt_ms) {
        state.kill_player(DeathCause::OutOfTime);
    }

    // Lanes and entity movement
    state.cycle_traffic(dt_ms);

    update_hazards(state, dt_ms);

    // Collision
    let contact = detect(&state.player, &state.entities, &state.settings);
    state.apply_contact(contact);

    state.goals.update(dt_ms);
    state.update_particles(dt_ms);

    // Mode transition
    if state.goals.unreached_count() == 0 {
        log::info!("Level {} cleared with score {}", state.level, state.board.score);
        state.mode = GameMode::FinishLevel;
        state.emit(GameEvent::LevelCleared { level: state.level });
    } else if state.board.lives == 0 {
        log::info!("Game over with score {}", state.board.score);
        state.mode = GameMode::Over;
        state.emit(GameEvent::GameOver { score: state.board.score });
    }
}

fn update_hazards<G: GoalTracker>(state: &mut GameState<G>, dt_ms: u32) {
    let level = state.level;
    state.heat.update(dt_ms);
    state.wind.update(dt_ms);

    if state.player.is_alive() {
        let zone = classify_zone(state.player.shape_center(), &state.settings);
        if state.heat.try_arm(zone, &mut state.player, level) {
            log::debug!("Heat wave armed");
            state.emit(GameEvent::HeatArmed);
        }
        if state.wind.try_arm(zone, level) {
            log::debug!("Wind gust armed, blowing {}", state.wind.direction());
            state.emit(GameEvent::WindArmed);
        }
    }

    if let Some(direction) = state.heat.perform(&mut state.player, level, &state.settings) {
        log::debug!("Heat forced a hop {direction:?}");
        state.emit(GameEvent::Moved { direction, forced: true });
    }
    if let Some(shift) = state.wind.perform(&mut state.player, level) {
        log::debug!("Wind pushed the player {shift}");
    }

    let origin = state.player.render_center();
    if let Some(particle) = state.heat.emit_particle(origin) {
        state.push_particle(particle);
    }
    if let Some(particle) = state.wind.emit_particle(&state.settings) {
        state.push_particle(particle);
    }
}
