//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the game rules, session state and simulation logic.
//! It has **no dependencies** on rendering, storage or async I/O, making it:
//!
//! - **Deterministic**: the same seed and inputs produce the same session
//! - **Testable**: every rule is covered by unit tests
//! - **Portable**: runs headless, in a terminal, or behind any frontend
//!
//! # Module Structure
//!
//! - [`board`]: variable-size grid with collision checks and row compaction
//! - [`pieces`]: tetromino matrices, quarter-turn rotation and the kick table
//! - [`rng`]: 7-bag generator with a pluggable random source
//! - [`scoring`]: line, T-Spin, combo, back-to-back and Perfect Clear rules
//! - [`game_state`]: the session state machine (controller, lock, clear)
//! - [`events`]: output events and end-of-session summaries
//! - [`replay`]: input logs and deterministic playback
//! - [`snapshot`]: flat render view for frontends
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: each bag holds every kind once, shuffled
//! - **Kick Table**: eight fixed offsets tried in order on every rotation
//! - **Lock Delay**: 500ms on the ground, at most 15 move/rotate resets
//! - **Line Clear Delay**: full rows stay visible for 200ms before removal
//! - **Hold**: one swap per piece
//! - **T-Spin Detection**: three of four corners around the T's hub
//! - **Modes**: marathon (endless), sprint (40 lines), ultra (120 seconds)
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_types::GameAction;
//!
//! let mut game = GameState::seeded(12345);
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateRight);
//! game.apply_action(GameAction::HardDrop);
//!
//! // Hard drop awards two points per row.
//! assert!(game.score() > 0);
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`](game_state::GameState::tick) with the elapsed
//! milliseconds (the runtime uses a fixed 16ms step), or
//! [`GameState::frame`](game_state::GameState::frame) with raw timestamps.
//! Gravity is `max(100, 1000 - 50 * level)` ms per row.

pub mod board;
pub mod clock;
pub mod config;
pub mod events;
pub mod game_state;
pub mod pieces;
pub mod replay;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::{ConfigError, GameConfig};
pub use events::{ClearReport, GameEvent, Outcome, PaceMetrics, SessionMetrics, SessionSummary};
pub use game_state::{GameState, PendingClear, Tetromino};
pub use pieces::{get_shape, try_rotate, PieceShape, KICK_OFFSETS};
pub use replay::{play, ReplayError, ReplayInput, ReplayLog, ReplayOutcome, ReplayRecorder};
pub use rng::{EntropyRng, PieceBag, PieceQueue, RandomSource, SimpleRng};
pub use scoring::{calculate_drop_score, calculate_score, ScoreResult};
pub use snapshot::{ActiveSnapshot, GameSnapshot, TimersSnapshot};
