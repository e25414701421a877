//! Replay logs - recording and deterministic playback
//!
//! A log holds the session config (including its bag seed), the fixed tick
//! length the session was stepped with, every accepted input stamped with
//! the game clock, and the kinds dispensed. Playback rebuilds the session
//! from the seed, applies each input before the first tick past its stamp,
//! and checks the dispensed kinds against the recorded ones.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameConfig;
use crate::events::{GameEvent, Outcome, SessionSummary};
use crate::game_state::GameState;
use crate::types::{GameAction, PieceKind, TICK_MS};

pub const REPLAY_VERSION: u32 = 1;

/// Upper bound on simulated time past the recorded end
const PLAYBACK_GRACE_MS: u64 = 60_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("session has no seed and cannot be replayed")]
    Unseeded,
    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u32),
    #[error("tick length must be positive")]
    ZeroTick,
    #[error("piece {index} diverged: recorded {expected:?}, replayed {actual:?}")]
    Diverged {
        index: usize,
        expected: PieceKind,
        actual: PieceKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayInput {
    /// Game-clock time the action was applied at
    pub at_ms: u64,
    pub action: GameAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetadata {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub elapsed_ms: u64,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayLog {
    pub version: u32,
    pub config: GameConfig,
    pub tick_ms: u32,
    pub inputs: Vec<ReplayInput>,
    pub pieces: Vec<PieceKind>,
    pub metadata: ReplayMetadata,
}

impl ReplayLog {
    pub fn seed(&self) -> Option<u32> {
        self.config.seed
    }
}

/// Collects inputs and dispensed kinds while a session runs
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    config: GameConfig,
    tick_ms: u32,
    inputs: Vec<ReplayInput>,
    pieces: Vec<PieceKind>,
}

impl ReplayRecorder {
    pub fn new(config: &GameConfig) -> Result<Self, ReplayError> {
        Self::with_tick(config, TICK_MS)
    }

    pub fn with_tick(config: &GameConfig, tick_ms: u32) -> Result<Self, ReplayError> {
        if config.seed.is_none() {
            return Err(ReplayError::Unseeded);
        }
        if tick_ms == 0 {
            return Err(ReplayError::ZeroTick);
        }
        Ok(Self {
            config: *config,
            tick_ms,
            inputs: Vec::new(),
            pieces: Vec::new(),
        })
    }

    /// Record an accepted action; pause toggles are not part of the log
    pub fn record_input(&mut self, at_ms: u64, action: GameAction) {
        if action.is_replayable() {
            self.inputs.push(ReplayInput { at_ms, action });
        }
    }

    pub fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::PieceDispensed { kind } = event {
                self.pieces.push(*kind);
            }
        }
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn finish(self, summary: &SessionSummary) -> ReplayLog {
        ReplayLog {
            version: REPLAY_VERSION,
            config: self.config,
            tick_ms: self.tick_ms,
            inputs: self.inputs,
            pieces: self.pieces,
            metadata: ReplayMetadata {
                score: summary.score,
                lines: summary.lines,
                level: summary.level,
                elapsed_ms: summary.elapsed_ms,
                outcome: Some(summary.outcome),
            },
        }
    }
}

/// Result of a playback
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub elapsed_ms: u64,
    pub summary: Option<SessionSummary>,
    /// Dispensed kinds checked against the log
    pub pieces_verified: usize,
}

impl ReplayOutcome {
    /// Whether playback landed on the recorded totals
    pub fn matches(&self, metadata: &ReplayMetadata) -> bool {
        self.score == metadata.score && self.lines == metadata.lines && self.level == metadata.level
    }
}

/// Re-run a log from its seed.
///
/// Stops when the session ends, or once every input is applied and the
/// recorded duration has elapsed.
pub fn play(log: &ReplayLog) -> Result<ReplayOutcome, ReplayError> {
    if log.version != REPLAY_VERSION {
        return Err(ReplayError::UnsupportedVersion(log.version));
    }
    if log.seed().is_none() {
        return Err(ReplayError::Unseeded);
    }
    if log.tick_ms == 0 {
        return Err(ReplayError::ZeroTick);
    }

    let mut game = GameState::new(log.config);
    let mut verified = 0;
    let mut next_input = 0;
    let deadline = log.metadata.elapsed_ms + PLAYBACK_GRACE_MS;

    game.start();
    loop {
        while let Some(input) = log.inputs.get(next_input) {
            if input.at_ms > game.elapsed_ms() {
                break;
            }
            game.apply_action(input.action);
            next_input += 1;
        }

        for event in game.take_events() {
            if let GameEvent::PieceDispensed { kind } = event {
                if let Some(&expected) = log.pieces.get(verified) {
                    if expected != kind {
                        return Err(ReplayError::Diverged {
                            index: verified,
                            expected,
                            actual: kind,
                        });
                    }
                    verified += 1;
                }
            }
        }

        let inputs_done = next_input >= log.inputs.len();
        if game.is_terminal()
            || (inputs_done && game.elapsed_ms() >= log.metadata.elapsed_ms)
            || game.elapsed_ms() >= deadline
        {
            break;
        }
        game.tick(log.tick_ms);
    }

    Ok(ReplayOutcome {
        score: game.score(),
        lines: game.lines(),
        level: game.level(),
        elapsed_ms: game.elapsed_ms(),
        summary: game.summary().cloned(),
        pieces_verified: verified,
    })
}
