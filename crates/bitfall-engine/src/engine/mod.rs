//! Game state machine built on the [`core`](crate::core) primitives.
//!
//! - [`GameClock`] - the per-tick state machine (intents, gravity, lock, scoring, game over)
//! - [`Intents`] - the four per-tick player intents
//! - [`GameRules`] - fall and rotation speeds in fixed point
//! - [`GameStats`] - score, fall speed and line-clear bookkeeping
//! - [`PieceSequencer`] / [`PieceSeed`] - seeded random piece choice with one-piece lookahead
//!
//! # Tick Flow
//!
//! The clock is driven by calling [`GameClock::tick`] once per fixed tick with the intents
//! gathered since the previous tick. Between ticks the state is read through `&self`
//! accessors only.
//!
//! # Example
//!
//! ```
//! use bitfall_engine::{GameClock, Intents, PieceSeed, TickEvent};
//!
//! let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
//! let mut clock = GameClock::with_seed(seed);
//!
//! let event = clock.tick(Intents {
//!     move_left: true,
//!     ..Intents::NONE
//! });
//! assert_eq!(event, TickEvent::Moved);
//!
//! // Nothing happens until gravity crosses a full row
//! assert_eq!(clock.tick(Intents::NONE), TickEvent::Idle);
//! assert!(!clock.is_game_over());
//! ```

pub use self::{game_clock::*, game_stats::*, intents::*, piece_sequencer::*, rules::*};

mod game_clock;
mod game_stats;
mod intents;
mod piece_sequencer;
mod rules;
