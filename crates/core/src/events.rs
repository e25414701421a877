//! Output events and end-of-session summaries
//!
//! The game pushes events into a queue that the owner drains with
//! [`GameState::take_events`](crate::GameState::take_events). Nothing here
//! touches I/O; the store and runtime crates decide what to do with them.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::scoring::ScoreResult;
use crate::types::{GameMode, GridPreset, PieceKind, TSpinKind};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    GameOver,
    Victory,
}

/// Per-session play counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub pieces_placed: u32,
    /// Locks per kind, indexed by [`PieceKind::index`]
    pub piece_counts: [u32; 7],
    /// Successful horizontal moves
    pub moves: u32,
    pub rotations: u32,
    pub soft_drops: u32,
    pub hard_drops: u32,
    pub holds: u32,
    pub tspins: u32,
    pub tetrises: u32,
    pub perfect_clears: u32,
    pub max_combo: u32,
    pub max_back_to_back: u32,
}

/// Derived speed/efficiency figures
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceMetrics {
    /// Pieces per second
    pub pps: f64,
    /// Actions (moves, rotations, hard drops) per minute
    pub apm: f64,
    /// Actions per piece
    pub kpp: f64,
    /// Lines per piece, as a percentage
    pub efficiency: f64,
}

impl SessionMetrics {
    pub fn record_lock(&mut self, kind: PieceKind) {
        self.pieces_placed += 1;
        self.piece_counts[kind.index()] += 1;
    }

    pub fn pace(&self, elapsed_ms: u64, lines: u32) -> PaceMetrics {
        if elapsed_ms == 0 {
            return PaceMetrics::default();
        }
        let secs = elapsed_ms as f64 / 1000.0;
        let pieces = self.pieces_placed as f64;
        let actions = (self.moves + self.rotations + self.hard_drops) as f64;
        let (kpp, efficiency) = if self.pieces_placed > 0 {
            (actions / pieces, lines as f64 / pieces * 100.0)
        } else {
            (0.0, 0.0)
        };
        PaceMetrics {
            pps: pieces / secs,
            apm: actions / secs * 60.0,
            kpp,
            efficiency,
        }
    }
}

/// Final record of a session, emitted once on game over or victory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub outcome: Outcome,
    pub mode: GameMode,
    pub grid: GridPreset,
    pub seed: Option<u32>,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    /// Game-clock time, pauses excluded
    pub elapsed_ms: u64,
    pub metrics: SessionMetrics,
}

impl SessionSummary {
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    /// Only a sprint that reached its goal has a completion time
    pub fn sprint_time_secs(&self) -> Option<u64> {
        (self.mode == GameMode::Sprint && self.outcome == Outcome::Victory)
            .then(|| self.elapsed_secs())
    }

    pub fn pace(&self) -> PaceMetrics {
        self.metrics.pace(self.elapsed_ms, self.lines)
    }

    pub(crate) fn new(
        outcome: Outcome,
        config: &GameConfig,
        score: u32,
        lines: u32,
        level: u32,
        elapsed_ms: u64,
        metrics: SessionMetrics,
    ) -> Self {
        Self {
            outcome,
            mode: config.mode,
            grid: config.grid,
            seed: config.seed,
            score,
            lines,
            level,
            elapsed_ms,
            metrics,
        }
    }
}

/// Details of a completed line clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub rows: Vec<usize>,
    pub tspin: TSpinKind,
    pub perfect_clear: bool,
    pub score: ScoreResult,
    /// Counters after this clear
    pub combo: u32,
    pub back_to_back: u32,
    pub level: u32,
    /// e.g. "Back-to-Back Tetris"
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A kind left the next queue
    PieceDispensed { kind: PieceKind },
    /// The active piece was merged into the board
    PieceLocked {
        kind: PieceKind,
        tspin: TSpinKind,
        /// Rows now waiting for removal
        full_rows: Vec<usize>,
    },
    LinesCleared(ClearReport),
    GameOver(SessionSummary),
    Victory(SessionSummary),
}

impl GameEvent {
    pub fn summary(&self) -> Option<&SessionSummary> {
        match self {
            GameEvent::GameOver(summary) | GameEvent::Victory(summary) => Some(summary),
            _ => None,
        }
    }
}
