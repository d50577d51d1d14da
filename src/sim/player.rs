//! The player's hopper: movement, hop animation, death and respawn
//!
//! The collision anchor jumps to the destination cell as soon as a hop starts,
//! while the rendered position catches up over `HOP_SUB_STEPS` sub-steps.
//! Collisions are always tested against the anchor, so a hop never registers
//! hits along the visually interpolated path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{CollisionShape, MobileEntity};
use super::state::Scoreboard;
use crate::consts::*;
use crate::settings::Settings;
use crate::snap_to_grid;

/// Hop direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector in screen space (y grows downward)
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Sprite frame when facing this way
    fn frame(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Right => 2,
            Direction::Left => 3,
        }
    }
}

/// Sprite frame shown while dead
pub const DEAD_FRAME: u8 = 4;
/// Added to the facing frame while mid-hop
pub const HOP_FRAME_OFFSET: u8 = 5;

/// An in-progress hop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub direction: Direction,
    pub steps_done: u32,
    /// Time accumulated toward the next sub-step
    pub elapsed_ms: u32,
}

/// Player state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Idle,
    Hopping(Hop),
    Dead { since_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Rendered top-left position
    pub pos: Vec2,
    /// Position the collision shape is attached to
    anchor: Vec2,
    pub shape: CollisionShape,
    motion: Motion,
    facing: Direction,
    /// Entity id of the carrier being ridden
    carrier: Option<u32>,
    /// Deaths are ignored while set
    pub cheating: bool,
    /// Cleared when a hazard timer arms, set by any movement
    moved_since_arming: bool,
}

impl Player {
    pub fn new(settings: &Settings) -> Self {
        let start = settings.start_position();
        Self {
            pos: start,
            anchor: start,
            shape: CollisionShape::new(PLAYER_RADIUS, Vec2::splat(CELL / 2.0)),
            motion: Motion::Idle,
            facing: Direction::Up,
            carrier: None,
            cheating: false,
            moved_since_arming: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.motion, Motion::Dead { .. })
    }

    pub fn is_hopping(&self) -> bool {
        matches!(self.motion, Motion::Hopping(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.motion, Motion::Idle)
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn carrier(&self) -> Option<u32> {
        self.carrier
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// World-space center of the collision shape
    pub fn shape_center(&self) -> Vec2 {
        self.shape.center(self.anchor)
    }

    /// Center of the rendered sprite
    pub fn render_center(&self) -> Vec2 {
        self.pos + Vec2::splat(CELL / 2.0)
    }

    pub fn has_moved_since_arming(&self) -> bool {
        self.moved_since_arming
    }

    pub fn clear_moved(&mut self) {
        self.moved_since_arming = false;
    }

    /// Sprite frame index for the renderer
    pub fn frame(&self) -> u8 {
        match self.motion {
            Motion::Dead { .. } => DEAD_FRAME,
            Motion::Hopping(_) => self.facing.frame() + HOP_FRAME_OFFSET,
            Motion::Idle => self.facing.frame(),
        }
    }

    /// Start a hop. Returns false (and does nothing) when dead, mid-hop, or
    /// when the destination lies outside the world.
    pub fn request_move(&mut self, direction: Direction, settings: &Settings) -> bool {
        if !self.is_idle() {
            return false;
        }
        let destination = self.pos + direction.unit() * CELL;
        if !settings.contains_cell(destination) {
            return false;
        }

        self.carrier = None;
        self.anchor = destination;
        self.facing = direction;
        self.moved_since_arming = true;
        self.motion = Motion::Hopping(Hop {
            direction,
            steps_done: 0,
            elapsed_ms: 0,
        });
        true
    }

    /// Advance respawn, hop animation and carrier drag
    pub fn update(
        &mut self,
        dt_ms: u32,
        now_ms: u64,
        settings: &Settings,
        board: &mut Scoreboard,
        entities: &[MobileEntity],
    ) {
        if board.lives == 0 {
            return;
        }

        if let Motion::Dead { since_ms } = self.motion {
            if now_ms.saturating_sub(since_ms) >= settings.respawn_delay_ms {
                self.reset(settings, board);
                log::debug!("Player respawned ({} lives left)", board.lives);
            }
            return;
        }

        self.advance_hop(dt_ms);

        if self.is_idle() {
            self.follow_carrier(dt_ms, entities);
            self.align_to_grid();
            self.anchor = self.pos;
        }
    }

    fn advance_hop(&mut self, dt_ms: u32) {
        let mut finished = false;
        if let Motion::Hopping(hop) = &mut self.motion {
            hop.elapsed_ms = hop.elapsed_ms.saturating_add(dt_ms);
            while hop.steps_done < HOP_SUB_STEPS && hop.elapsed_ms >= HOP_STEP_DELAY_MS {
                hop.elapsed_ms -= HOP_STEP_DELAY_MS;
                hop.steps_done += 1;
                self.pos += hop.direction.unit() * HOP_STEP;
            }
            finished = hop.steps_done >= HOP_SUB_STEPS;
        }
        if finished {
            self.pos = self.anchor;
            self.motion = Motion::Idle;
        }
    }

    /// Drift with the carrier. A carrier that left the board drops the relation.
    fn follow_carrier(&mut self, dt_ms: u32, entities: &[MobileEntity]) {
        let Some(id) = self.carrier else {
            return;
        };
        match entities.binary_search_by_key(&id, |e| e.id) {
            Ok(index) => self.pos += entities[index].vel * dt_ms as f32,
            Err(_) => self.carrier = None,
        }
    }

    /// Re-align to the column grid when standing on solid ground
    fn align_to_grid(&mut self) {
        if self.carrier.is_some() {
            return;
        }
        self.pos.x = snap_to_grid(self.pos.x);
    }

    /// Start riding a carrier
    pub fn follow(&mut self, carrier_id: u32) {
        if self.is_alive() {
            self.carrier = Some(carrier_id);
        }
    }

    /// Kill the player. Returns true if a life was lost.
    ///
    /// The level timer restarts even when cheating.
    pub fn die(&mut self, now_ms: u64, settings: &Settings, board: &mut Scoreboard) -> bool {
        if !self.is_alive() {
            return false;
        }
        board.reset_timer(settings.level_time);
        if self.cheating {
            return false;
        }

        self.carrier = None;
        self.pos = self.anchor;
        self.motion = Motion::Dead { since_ms: now_ms };
        self.moved_since_arming = true;
        board.lives = board.lives.saturating_sub(1);
        true
    }

    /// Back to the start cell, alive and idle, with a fresh level timer
    pub fn reset(&mut self, settings: &Settings, board: &mut Scoreboard) {
        let start = settings.start_position();
        self.pos = start;
        self.anchor = start;
        self.motion = Motion::Idle;
        self.facing = Direction::Up;
        self.carrier = None;
        board.reset_timer(settings.level_time);
    }

    /// Pin both rendered and collision position to `pos`
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.anchor = pos;
    }

    /// Horizontal gust push; skipped while hopping so the anchor stays on the
    /// destination cell. Returns true if applied.
    pub fn wind_shift(&mut self, dx: f32) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.pos.x += dx;
        self.anchor = self.pos;
        self.moved_since_arming = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;

    fn setup() -> (Settings, Scoreboard, Player) {
        let settings = Settings::default();
        let board = Scoreboard::new(&settings);
        let player = Player::new(&settings);
        (settings, board, player)
    }

    fn finish_hop(player: &mut Player, settings: &Settings, board: &mut Scoreboard) {
        for _ in 0..HOP_SUB_STEPS {
            player.update(HOP_STEP_DELAY_MS, 0, settings, board, &[]);
        }
    }

    #[test]
    fn test_move_relocates_anchor_eagerly() {
        let (settings, mut board, mut player) = setup();
        let before = player.shape_center();

        assert!(player.request_move(Direction::Up, &settings));
        assert_eq!(player.shape_center(), before + Vec2::new(0.0, -CELL));
        // Rendered position has not moved yet
        assert_eq!(player.pos, settings.start_position());
        assert_eq!(player.frame(), HOP_FRAME_OFFSET);

        player.update(HOP_STEP_DELAY_MS, 0, &settings, &mut board, &[]);
        assert_eq!(player.pos.y, settings.start_position().y - HOP_STEP);
        assert!(player.is_hopping());
    }

    #[test]
    fn test_hop_completes_after_all_sub_steps() {
        let (settings, mut board, mut player) = setup();
        player.request_move(Direction::Left, &settings);

        for _ in 0..HOP_SUB_STEPS - 1 {
            player.update(HOP_STEP_DELAY_MS, 0, &settings, &mut board, &[]);
        }
        assert!(player.is_hopping());
        player.update(HOP_STEP_DELAY_MS, 0, &settings, &mut board, &[]);
        assert!(player.is_idle());
        assert_eq!(player.pos, settings.start_position() - Vec2::new(CELL, 0.0));
        assert_eq!(player.frame(), 3);
    }

    #[test]
    fn test_sub_steps_are_time_gated() {
        let (settings, mut board, mut player) = setup();
        player.request_move(Direction::Up, &settings);

        // 9 ms is not enough for one sub-step
        player.update(9, 0, &settings, &mut board, &[]);
        assert_eq!(player.pos, settings.start_position());

        // One long frame finishes the whole hop
        player.update(200, 0, &settings, &mut board, &[]);
        assert!(player.is_idle());
        assert_eq!(player.pos, settings.start_position() - Vec2::new(0.0, CELL));
    }

    #[test]
    fn test_huge_frame_mid_hop_lands() {
        let (settings, mut board, mut player) = setup();
        player.request_move(Direction::Up, &settings);
        player.update(5, 0, &settings, &mut board, &[]);
        player.update(u32::MAX - 2, 0, &settings, &mut board, &[]);
        assert!(player.is_idle());
        assert_eq!(player.pos, settings.start_position() - Vec2::new(0.0, CELL));
    }

    #[test]
    fn test_rapid_input_during_hop_moves_once() {
        let (settings, mut board, mut player) = setup();
        let start = player.shape_center();

        assert!(player.request_move(Direction::Up, &settings));
        assert!(!player.request_move(Direction::Up, &settings));
        player.update(HOP_STEP_DELAY_MS, 0, &settings, &mut board, &[]);
        assert!(!player.request_move(Direction::Up, &settings));
        finish_hop(&mut player, &settings, &mut board);

        assert_eq!(player.shape_center(), start - Vec2::new(0.0, CELL));
    }

    #[test]
    fn test_moves_outside_world_rejected() {
        let (settings, _, mut player) = setup();
        // Start row is the bottom row
        assert!(!player.request_move(Direction::Down, &settings));

        player.place(Vec2::new(0.0, CELL));
        assert!(!player.request_move(Direction::Left, &settings));
        assert!(!player.request_move(Direction::Up, &settings));

        player.place(Vec2::new(settings.world_width() - CELL, 5.0 * CELL));
        assert!(!player.request_move(Direction::Right, &settings));
        assert!(player.is_idle());
    }

    #[test]
    fn test_dead_player_ignores_moves() {
        let (settings, mut board, mut player) = setup();
        assert!(player.die(0, &settings, &mut board));
        assert!(!player.request_move(Direction::Up, &settings));
        assert_eq!(player.frame(), DEAD_FRAME);
    }

    #[test]
    fn test_death_and_respawn() {
        let (settings, mut board, mut player) = setup();
        player.request_move(Direction::Up, &settings);
        finish_hop(&mut player, &settings, &mut board);
        board.level_timer = 12;

        assert!(player.die(1000, &settings, &mut board));
        assert_eq!(board.lives, settings.starting_lives - 1);
        assert_eq!(board.level_timer, settings.level_time);
        // Already dead: no second life lost
        assert!(!player.die(1001, &settings, &mut board));
        assert_eq!(board.lives, settings.starting_lives - 1);

        player.update(10, 2999, &settings, &mut board, &[]);
        assert!(!player.is_alive());
        player.update(10, 3000, &settings, &mut board, &[]);
        assert!(player.is_alive());
        assert_eq!(player.pos, settings.start_position());
    }

    #[test]
    fn test_no_respawn_without_lives() {
        let (settings, mut board, mut player) = setup();
        board.lives = 1;
        player.die(0, &settings, &mut board);
        player.update(10, 10_000, &settings, &mut board, &[]);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_cheating_prevents_death() {
        let (settings, mut board, mut player) = setup();
        player.cheating = true;
        board.level_timer = 3;
        assert!(!player.die(0, &settings, &mut board));
        assert!(player.is_alive());
        assert_eq!(board.lives, settings.starting_lives);
        assert_eq!(board.level_timer, settings.level_time);
    }

    #[test]
    fn test_death_mid_hop_snaps_to_destination() {
        let (settings, mut board, mut player) = setup();
        player.request_move(Direction::Up, &settings);
        player.update(HOP_STEP_DELAY_MS * 3, 0, &settings, &mut board, &[]);
        player.die(0, &settings, &mut board);
        assert_eq!(player.pos, player.anchor());
    }

    #[test]
    fn test_follows_carrier_and_drops_missing_one() {
        let (settings, mut board, mut player) = setup();
        player.place(Vec2::new(64.0, 64.0));
        let log = MobileEntity::new(7, EntityKind::LongLog, Vec2::new(40.0, 64.0), Vec2::new(0.05, 0.0));
        player.follow(7);

        player.update(100, 0, &settings, &mut board, std::slice::from_ref(&log));
        assert!((player.pos.x - 69.0).abs() < 1e-4);
        // Anchor tracks the rendered position while riding
        assert_eq!(player.anchor(), player.pos);

        // Carrier gone: relation dropped, position snaps back to the grid
        player.update(10, 0, &settings, &mut board, &[]);
        assert_eq!(player.carrier(), None);
        assert_eq!(player.pos.x, 64.0);
    }

    #[test]
    fn test_hop_clears_carrier_and_suspends_drag() {
        let (settings, mut board, mut player) = setup();
        player.place(Vec2::new(64.0, 96.0));
        let log = MobileEntity::new(3, EntityKind::ShortLog, Vec2::new(40.0, 96.0), Vec2::new(0.05, 0.0));
        player.follow(3);
        player.request_move(Direction::Up, &settings);
        assert_eq!(player.carrier(), None);

        // Carrier set mid-hop (by collision) does not drag until landing
        player.follow(3);
        player.update(HOP_STEP_DELAY_MS, 0, &settings, &mut board, std::slice::from_ref(&log));
        assert_eq!(player.pos.x, 64.0);
    }

    #[test]
    fn test_wind_shift_syncs_anchor() {
        let (settings, mut board, mut player) = setup();
        player.clear_moved();
        assert!(player.wind_shift(20.0));
        assert_eq!(player.anchor(), player.pos);
        assert!(player.has_moved_since_arming());

        player.request_move(Direction::Up, &settings);
        assert!(!player.wind_shift(20.0));
        player.update(0, 0, &settings, &mut board, &[]);
    }

    proptest! {
        #[test]
        fn prop_valid_move_displaces_exactly_one_cell(col in 0u32..13, row in 1u32..14, dir in 0usize..4) {
            let (settings, _, mut player) = setup();
            player.place(Vec2::new(col as f32 * CELL, row as f32 * CELL));
            let before = player.shape_center();
            let direction = Direction::ALL[dir];

            if player.request_move(direction, &settings) {
                prop_assert_eq!(player.shape_center(), before + direction.unit() * CELL);
                prop_assert!(settings.contains_cell(player.anchor()));
            } else {
                prop_assert_eq!(player.shape_center(), before);
                prop_assert!(!settings.contains_cell(player.pos + direction.unit() * CELL));
            }
        }
    }
}
