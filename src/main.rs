//! Frog Crossing headless runner
//!
//! Plays one scripted session with a simple autopilot and prints the final
//! state as JSON.
//!
//! Usage: `frog-crossing [seed] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;

    use frog_crossing::Settings;
    use frog_crossing::consts::*;
    use frog_crossing::sim::{
        Category, Direction, GameEvent, GameMode, GameState, MobileEntity, TickInput, Zone, classify_zone,
        tick,
    };
    use glam::Vec2;

    const DEFAULT_SEED: u64 = 0x5EED;
    /// Host frame length
    const FRAME_MS: u32 = 10;
    /// Session cap (ten minutes of play)
    const MAX_FRAMES: u32 = 60_000;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .map(|s| s.parse::<u64>())
            .transpose()?
            .unwrap_or(DEFAULT_SEED);
        let settings = match args.next() {
            Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
            None => Settings::default(),
        };

        let mut state = GameState::new(settings, seed)?;
        log::info!("Frog Crossing (headless) starting with seed {seed}");

        let start = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut state, &start, FRAME_MS);

        for _ in 0..MAX_FRAMES {
            let input = TickInput {
                direction: autopilot(&state),
                ..Default::default()
            };
            tick(&mut state, &input, FRAME_MS);

            for event in state.drain_events() {
                match event {
                    GameEvent::Moved { .. } => {}
                    other => log::info!("{other:?}"),
                }
            }
            if matches!(state.mode, GameMode::Over | GameMode::FinishLevel) {
                break;
            }
        }

        println!("{}", state.snapshot().to_json()?);
        Ok(())
    }

    /// Hop up whenever the cell ahead looks survivable once the hop lands
    fn autopilot(state: &GameState) -> Option<Direction> {
        let player = &state.player;
        if !player.is_idle() {
            return None;
        }

        let target = player.anchor() + Direction::Up.unit() * CELL + Vec2::splat(CELL / 2.0);
        let safe = match classify_zone(target, &state.settings) {
            Zone::OutOfBounds => false,
            // Need something to stand on
            Zone::River => shapes_ahead(state).any(|(e, i, center, radius)| {
                e.category() != Category::Hazard
                    && !e.is_lethal_shape(i)
                    && frog_crossing::circles_overlap(target, PLAYER_RADIUS, center, radius)
            }),
            // Keep a full cell of clearance from traffic
            Zone::Road | Zone::Safe => !shapes_ahead(state).any(|(e, _, center, radius)| {
                e.category() == Category::Hazard
                    && frog_crossing::circles_overlap(target, CELL, center, radius)
            }),
        };
        safe.then_some(Direction::Up)
    }

    /// Every active shape where it will be once a hop started now has landed,
    /// with some margin
    fn shapes_ahead(state: &GameState) -> impl Iterator<Item = (&MobileEntity, usize, Vec2, f32)> + '_ {
        let lookahead = (HOP_SUB_STEPS * HOP_STEP_DELAY_MS * 2) as f32;
        state.entities.iter().filter(|e| e.active).flat_map(move |e| {
            let future = e.pos + e.vel * lookahead;
            e.shapes
                .iter()
                .enumerate()
                .map(move |(i, s)| (e, i, s.center(future), s.radius))
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = headless::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; hosts drive `sim::tick` themselves
}
