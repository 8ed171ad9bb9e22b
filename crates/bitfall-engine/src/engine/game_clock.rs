use crate::{
    PieceCollisionError,
    core::{BoardMask, Piece, PieceKind, SettledBoard},
};

use super::{GameRules, GameStats, Intents, PieceSeed, PieceSequencer};

/// Lifecycle state of the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ClockState {
    /// The piece is falling.
    Active,
    /// The piece is resting and will lock on the next tick it is still resting.
    Locking,
    /// The last spawned piece collided; only a restart is accepted.
    GameOver,
}

/// What a single tick did, for consumers that track the game without rendering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickEvent {
    /// The active piece did not move.
    Idle,
    /// The active piece moved laterally or down.
    Moved,
    /// The active piece rotated (possibly kicked).
    Rotated,
    /// A piece locked and the next one spawned.
    Locked { kind: PieceKind, cleared_rows: usize },
    /// A piece locked and the next one collided at spawn.
    ToppedOut { kind: PieceKind, cleared_rows: usize },
    /// A finished game was restarted.
    Restarted,
}

/// The game state machine.
///
/// Owns the settled board, the active piece, the piece sequencer and the score, and advances
/// them one fixed tick at a time through [`Self::tick`]. Rejected moves are dropped silently;
/// game over is a state that only a restart leaves.
#[derive(Debug, Clone)]
pub struct GameClock {
    rules: GameRules,
    board: SettledBoard,
    // Meaningless while game over; see `active_piece`.
    piece: Piece,
    sequencer: PieceSequencer,
    stats: GameStats,
    state: ClockState,
    fall_counter: u32,
    rotation_counter: u32,
    rotation_ready: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    /// Starts a game with default rules and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sequencer(GameRules::DEFAULT, PieceSequencer::new())
    }

    /// Starts a game with default rules and a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_sequencer(GameRules::DEFAULT, PieceSequencer::with_seed(seed))
    }

    /// Starts a game drawing pieces from `sequencer` for its whole lifetime, restarts included.
    #[must_use]
    pub fn with_sequencer(rules: GameRules, mut sequencer: PieceSequencer) -> Self {
        let piece = Piece::new(sequencer.draw());
        Self {
            rules,
            board: SettledBoard::EMPTY,
            piece,
            sequencer,
            stats: GameStats::new(&rules),
            state: ClockState::Active,
            fall_counter: 0,
            rotation_counter: 0,
            rotation_ready: true,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn state(&self) -> ClockState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn board(&self) -> &SettledBoard {
        &self.board
    }

    /// The falling piece, or `None` once the game is over.
    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        (!self.state.is_game_over()).then_some(&self.piece)
    }

    // Read-only view for rendering

    /// Locked cells of each kind, indexed by [`PieceKind::index`].
    #[must_use]
    pub fn kind_masks(&self) -> &[BoardMask; PieceKind::LEN] {
        self.board.kind_masks()
    }

    /// All locked cells.
    #[must_use]
    pub fn union(&self) -> &BoardMask {
        self.board.union()
    }

    #[must_use]
    pub fn active_mask(&self) -> Option<BoardMask> {
        self.active_piece().map(Piece::mask)
    }

    #[must_use]
    pub fn active_kind(&self) -> Option<PieceKind> {
        self.active_piece().map(Piece::kind)
    }

    #[must_use]
    pub fn next_kind(&self) -> PieceKind {
        self.sequencer.peek_next()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Advances the game by one tick.
    ///
    /// In order:
    ///
    /// 1. When the game is over, a restart intent (`move_right`) starts a new game; every other
    ///    intent is ignored.
    /// 2. Lateral moves are applied independently, each only if it does not collide.
    /// 3. A rotation is attempted when requested and the rotation cooldown has elapsed. Any
    ///    attempt ends the tick.
    /// 4. A piece that rests on the stack while flagged [`ClockState::Locking`] locks: it is
    ///    merged into the board and the next piece spawns. The game is over when the spawned
    ///    piece collides with the board as it stood before full rows are cleared and scored.
    /// 5. A soft drop moves the piece down one row, or flags it for locking when it cannot.
    /// 6. The fall and rotation accumulators advance. A full fall unit moves the piece down one
    ///    row, or flags it for locking when it cannot.
    pub fn tick(&mut self, intents: Intents) -> TickEvent {
        if self.state.is_game_over() {
            if intents.is_restart() {
                self.restart();
                return TickEvent::Restarted;
            }
            return TickEvent::Idle;
        }

        let mut moved = false;
        if intents.move_left {
            moved |= self.try_move_left().is_ok();
        }
        if intents.move_right {
            moved |= self.try_move_right().is_ok();
        }
        let resting = self.update_resting();

        if intents.rotate && self.rotation_ready {
            if self.try_rotate().is_ok() {
                self.rotation_ready = false;
                self.rotation_counter = 0;
                return TickEvent::Rotated;
            }
            return Self::movement_event(moved);
        }

        if resting && self.state.is_locking() {
            return self.lock_piece();
        }

        if intents.soft_drop {
            if self.try_soft_drop().is_ok() {
                moved = true;
            } else {
                self.state = ClockState::Locking;
            }
        }

        self.rotation_counter = self.rotation_counter.saturating_add(self.rules.rotation_speed);
        if self.rotation_counter >= GameRules::ONE_ROW {
            self.rotation_counter = 0;
            self.rotation_ready = true;
        }

        self.fall_counter = self
            .fall_counter
            .saturating_add(self.stats.fall_speed())
            .min(GameRules::ONE_ROW);
        if self.fall_counter >= GameRules::ONE_ROW {
            if self.try_soft_drop().is_ok() {
                self.fall_counter = 0;
                moved = true;
            } else {
                self.state = ClockState::Locking;
            }
        }

        Self::movement_event(moved)
    }

    fn movement_event(moved: bool) -> TickEvent {
        if moved {
            TickEvent::Moved
        } else {
            TickEvent::Idle
        }
    }

    /// Whether the active piece sits on the floor or the stack.
    ///
    /// A piece flagged for locking that no longer rests goes back to falling.
    fn update_resting(&mut self) -> bool {
        let resting = self.board.is_colliding(&self.piece.down());
        if !resting && self.state.is_locking() {
            self.state = ClockState::Active;
        }
        resting
    }

    fn set_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.board.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.piece = piece;
        Ok(())
    }

    fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.set_piece(self.piece.left())
    }

    fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.set_piece(self.piece.right())
    }

    fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.set_piece(self.piece.down())?;
        self.update_resting();
        Ok(())
    }

    fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self
            .piece
            .rotated_with_kicks(self.board.union())
            .ok_or(PieceCollisionError)?;
        self.piece = piece;
        self.update_resting();
        Ok(())
    }

    fn lock_piece(&mut self) -> TickEvent {
        let kind = self.piece.kind();
        self.board.fill_piece(&self.piece);
        self.piece = Piece::new(self.sequencer.draw());
        self.fall_counter = 0;

        // Spawn collision is judged against the board before its full rows are removed
        let topped_out = self.board.is_colliding(&self.piece);
        let cleared_rows = self.board.clear_lines();
        self.stats.complete_piece_drop(cleared_rows, &self.rules);
        if topped_out {
            self.state = ClockState::GameOver;
            return TickEvent::ToppedOut { kind, cleared_rows };
        }
        self.state = ClockState::Active;
        TickEvent::Locked { kind, cleared_rows }
    }

    fn restart(&mut self) {
        self.board = SettledBoard::EMPTY;
        self.stats = GameStats::new(&self.rules);
        self.piece = Piece::new(self.sequencer.draw());
        self.state = ClockState::Active;
        self.fall_counter = 0;
        self.rotation_counter = 0;
        self.rotation_ready = true;
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::core::{PiecePosition, PieceRotation};

    const SEED: PieceSeed = PieceSeed::from_bytes([
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88,
    ]);

    const SOFT_DROP: Intents = Intents {
        soft_drop: true,
        ..Intents::NONE
    };
    const LEFT: Intents = Intents {
        move_left: true,
        ..Intents::NONE
    };
    const RIGHT: Intents = Intents {
        move_right: true,
        ..Intents::NONE
    };
    const ROTATE: Intents = Intents {
        rotate: true,
        ..Intents::NONE
    };

    fn clock_with(board: SettledBoard, piece: Piece) -> GameClock {
        let mut clock = GameClock::with_seed(SEED);
        clock.board = board;
        clock.piece = piece;
        clock
    }

    fn placed(kind: PieceKind, rotation: u8, x: i32, y: i32) -> Piece {
        Piece::with_placement(kind, PieceRotation::new(rotation), PiecePosition::new(x, y))
    }

    #[test]
    fn test_new_game_state() {
        let clock = GameClock::with_seed(SEED);
        assert_eq!(clock.state(), ClockState::Active);
        assert!(clock.union().is_empty());
        assert_eq!(clock.score(), 0);
        let piece = clock.active_piece().unwrap();
        assert_eq!(piece.position(), PiecePosition::SPAWN_POSITION);
        assert_eq!(piece.rotation(), PieceRotation::default());
        assert_eq!(clock.active_mask(), Some(piece.mask()));
        assert_eq!(clock.active_kind(), Some(piece.kind()));
    }

    #[test]
    fn test_idle_ticks_only_apply_gravity() {
        let mut clock = GameClock::with_seed(SEED);
        let start = *clock.active_piece().unwrap();
        let ticks_per_row = GameRules::ONE_ROW / clock.rules().initial_fall_speed;

        for tick in 1..ticks_per_row {
            assert_eq!(clock.tick(Intents::NONE), TickEvent::Idle, "tick {tick}");
            assert_eq!(clock.active_piece(), Some(&start));
            assert!(clock.union().is_empty());
            assert_eq!(clock.score(), 0);
        }
        assert_eq!(clock.tick(Intents::NONE), TickEvent::Moved);
        assert_eq!(clock.active_piece(), Some(&start.down()));
    }

    #[test]
    fn test_lateral_moves_are_independent() {
        let mut clock = GameClock::with_seed(SEED);
        let start = *clock.active_piece().unwrap();

        assert_eq!(clock.tick(LEFT), TickEvent::Moved);
        assert_eq!(clock.active_piece(), Some(&start.left()));

        // Both directions cancel out
        assert_eq!(clock.tick(LEFT.merged(RIGHT)), TickEvent::Moved);
        assert_eq!(clock.active_piece(), Some(&start.left()));
    }

    #[test]
    fn test_move_into_wall_is_dropped() {
        let piece = placed(PieceKind::O, 0, -1, 5);
        let mut clock = clock_with(SettledBoard::EMPTY, piece);
        assert_eq!(clock.tick(LEFT), TickEvent::Idle);
        assert_eq!(clock.active_piece(), Some(&piece));
    }

    #[test]
    fn test_rotation_cooldown() {
        let mut clock = GameClock::with_seed(SEED);
        assert_eq!(clock.tick(ROTATE), TickEvent::Rotated);
        let rotation = clock.active_piece().unwrap().rotation();

        // 250 milli-rows per tick: ready again after 4 more ticks
        for _ in 0..4 {
            assert_eq!(clock.tick(ROTATE), TickEvent::Idle);
            assert_eq!(clock.active_piece().unwrap().rotation(), rotation);
        }
        assert_eq!(clock.tick(ROTATE), TickEvent::Rotated);
        assert_eq!(
            clock.active_piece().unwrap().rotation(),
            rotation.rotated_right()
        );
    }

    #[test]
    fn test_rotation_attempt_ends_tick() {
        let piece = placed(PieceKind::O, 0, 3, 14);
        let mut clock = clock_with(SettledBoard::EMPTY, piece);
        assert_eq!(clock.tick(SOFT_DROP), TickEvent::Idle);
        assert_eq!(clock.state(), ClockState::Locking);

        // The rotation happens instead of the pending lock
        assert_eq!(clock.tick(ROTATE), TickEvent::Rotated);
        assert!(clock.union().is_empty());
        assert_eq!(clock.tick(Intents::NONE), TickEvent::Locked {
            kind: PieceKind::O,
            cleared_rows: 0,
        });
    }

    #[test]
    fn test_soft_drop_defers_lock_by_one_tick() {
        let board = SettledBoard::from_ascii(
            r"
            IIIII.....
            ",
        );
        // O occupies pattern columns 1..=2: cells (13..=14, 4..=5), resting on column 4
        let piece = placed(PieceKind::O, 0, 3, 13);
        let mut clock = clock_with(board, piece);

        assert_eq!(clock.tick(SOFT_DROP), TickEvent::Idle);
        assert_eq!(clock.state(), ClockState::Locking);
        assert_eq!(clock.active_piece(), Some(&piece));

        // Sliding off the ledge cancels the lock
        assert_eq!(clock.tick(RIGHT), TickEvent::Moved);
        assert_eq!(clock.state(), ClockState::Active);

        assert_eq!(clock.tick(SOFT_DROP), TickEvent::Moved);
        assert_eq!(clock.active_piece(), Some(&piece.right().down()));
        assert_eq!(clock.state(), ClockState::Active);

        assert_eq!(clock.tick(SOFT_DROP), TickEvent::Idle);
        assert_eq!(clock.state(), ClockState::Locking);
        let locked = *clock.active_piece().unwrap();
        assert_eq!(clock.tick(Intents::NONE), TickEvent::Locked {
            kind: PieceKind::O,
            cleared_rows: 0,
        });
        assert_eq!(clock.kind_masks()[PieceKind::O.index()], locked.mask());
        assert_eq!(clock.stats().locked_pieces(), 1);
        let spawned = clock.active_piece().unwrap();
        assert_eq!(spawned.position(), PiecePosition::SPAWN_POSITION);
        assert_eq!(spawned.rotation(), PieceRotation::default());
    }

    #[test]
    fn test_gravity_flags_resting_piece() {
        let piece = placed(PieceKind::O, 0, 3, 14);
        let mut clock = clock_with(SettledBoard::EMPTY, piece);
        let ticks_per_row = GameRules::ONE_ROW / clock.rules().initial_fall_speed;

        for _ in 1..ticks_per_row {
            assert_eq!(clock.tick(Intents::NONE), TickEvent::Idle);
            assert_eq!(clock.state(), ClockState::Active);
        }
        assert_eq!(clock.tick(Intents::NONE), TickEvent::Idle);
        assert_eq!(clock.state(), ClockState::Locking);
        assert!(clock.tick(Intents::NONE).is_locked());
    }

    #[test]
    fn test_two_line_clear() {
        let board = SettledBoard::from_ascii(
            r"
            JJJJ..LLLL
            SSSS..ZZZZ
            ",
        );
        let piece = placed(PieceKind::O, 0, 3, 14);
        let mut clock = clock_with(board, piece);
        let initial_speed = clock.stats().fall_speed();

        assert_eq!(clock.tick(SOFT_DROP), TickEvent::Idle);
        assert_eq!(clock.tick(Intents::NONE), TickEvent::Locked {
            kind: PieceKind::O,
            cleared_rows: 2,
        });
        assert_eq!(clock.score(), 200);
        assert_eq!(
            clock.stats().fall_speed(),
            initial_speed + clock.rules().fall_speed_increment
        );
        assert!(clock.union().is_empty());
        assert!(clock.kind_masks().iter().all(BoardMask::is_empty));
    }

    #[test]
    fn test_spawn_check_precedes_line_clear() {
        // Row 2 has a gap exactly where a horizontal I spawns; rows below keep it resting
        let mut art = String::from("IIIII....I\n");
        for _ in 3..16 {
            art.push_str("I.IIIIIIII\n");
        }
        let board = SettledBoard::from_ascii(&art);
        let piece = Piece::new(PieceKind::I);
        let mut clock = clock_with(board, piece);

        assert_eq!(clock.tick(SOFT_DROP), TickEvent::Idle);
        assert_eq!(clock.tick(Intents::NONE), TickEvent::ToppedOut {
            kind: PieceKind::I,
            cleared_rows: 1,
        });
        assert!(clock.is_game_over());
        assert_eq!(clock.score(), 100);
        assert_eq!(clock.stats().total_cleared_lines(), 1);
        assert!(!clock.board().union().is_row_full(2));
    }

    fn play_until_top_out(clock: &mut GameClock) {
        // Without lateral input every piece stacks in the spawn columns, so no row can fill
        for _ in 0..10_000 {
            if clock.tick(SOFT_DROP).is_topped_out() {
                return;
            }
        }
        panic!("game did not end");
    }

    #[test]
    fn test_game_over_accepts_only_restart() {
        let mut clock = GameClock::with_seed(SEED);
        play_until_top_out(&mut clock);

        assert!(clock.is_game_over());
        assert_eq!(clock.active_piece(), None);
        assert_eq!(clock.active_mask(), None);
        assert_eq!(clock.score(), 0);
        let board = clock.board().clone();
        let locked = clock.stats().locked_pieces();

        let everything_but_restart = Intents {
            move_left: true,
            rotate: true,
            soft_drop: true,
            ..Intents::NONE
        };
        for intents in [Intents::NONE, everything_but_restart] {
            for _ in 0..100 {
                assert_eq!(clock.tick(intents), TickEvent::Idle);
            }
            assert!(clock.is_game_over());
            assert_eq!(clock.board(), &board);
            assert_eq!(clock.stats().locked_pieces(), locked);
        }

        let next = clock.next_kind();
        assert_eq!(clock.tick(RIGHT), TickEvent::Restarted);
        assert_eq!(clock.state(), ClockState::Active);
        assert!(clock.union().is_empty());
        assert_eq!(clock.score(), 0);
        assert_eq!(clock.stats().locked_pieces(), 0);
        assert_eq!(clock.stats().fall_speed(), clock.rules().initial_fall_speed);
        assert_eq!(clock.active_kind(), Some(next));
    }

    #[test]
    fn test_same_seed_and_intents_replay_identically() {
        let mut first = GameClock::with_seed(SEED);
        let mut second = GameClock::with_seed(SEED);
        let mut rng = Pcg32::seed_from_u64(7);

        for _ in 0..5000 {
            let intents = Intents {
                move_left: rng.random_bool(0.1),
                move_right: rng.random_bool(0.1),
                rotate: rng.random_bool(0.1),
                soft_drop: rng.random_bool(0.3),
            };
            assert_eq!(first.tick(intents), second.tick(intents));
            assert_eq!(first.board(), second.board());
            assert_eq!(first.active_piece(), second.active_piece());
            assert_eq!(first.stats(), second.stats());
        }
    }

    #[test]
    fn test_invariants_hold_during_random_play() {
        let mut clock = GameClock::with_seed(SEED);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut score = 0;
        let mut fall_speed = clock.stats().fall_speed();

        for _ in 0..20_000 {
            let intents = Intents {
                move_left: rng.random_bool(0.15),
                move_right: rng.random_bool(0.15),
                rotate: rng.random_bool(0.1),
                soft_drop: rng.random_bool(0.4),
            };
            let event = clock.tick(intents);
            if event.is_restarted() {
                score = 0;
                fall_speed = clock.stats().fall_speed();
                continue;
            }
            assert!(clock.score() >= score);
            assert!(clock.stats().fall_speed() >= fall_speed);
            score = clock.score();
            fall_speed = clock.stats().fall_speed();

            let union = clock
                .kind_masks()
                .iter()
                .fold(BoardMask::EMPTY, |acc, mask| acc | *mask);
            assert_eq!(&union, clock.union());
            if let Some(mask) = clock.active_mask() {
                assert!(!mask.intersects(clock.union()));
                assert_eq!(mask.count_ones(), 4);
            }
        }
    }
}
