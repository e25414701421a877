//! Render snapshot - a flat, serializable view of a session for frontends

use serde::Serialize;

use crate::game_state::Tetromino;
use crate::types::{GameMode, GameStatus, PieceKind, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Absolute board cells, possibly above the top row
    pub cells: [(i8, i8); 4],
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        let mut cells = [(0, 0); 4];
        for (slot, cell) in cells
            .iter_mut()
            .zip(value.shape().cells_at(value.x, value.y))
        {
            *slot = cell;
        }
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
            cells,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimersSnapshot {
    pub drop_ms: u32,
    pub lock_ms: u32,
    pub line_clear_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Piece ids, row-major (0 = empty)
    pub board: Vec<u8>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub next_queue: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    /// Rows flashing before removal
    pub clearing_rows: Vec<usize>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub combo: u32,
    pub back_to_back: u32,
    pub status: GameStatus,
    pub mode: GameMode,
    pub elapsed_ms: u64,
    /// Ultra only
    pub time_remaining_ms: Option<u64>,
    /// Sprint only
    pub lines_remaining: Option<u32>,
    pub timers: TimersSnapshot,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.rows = 0;
        self.cols = 0;
        self.board.clear();
        self.active = None;
        self.ghost_y = None;
        self.next_queue.clear();
        self.hold = None;
        self.can_hold = true;
        self.clearing_rows.clear();
        self.score = 0;
        self.level = 0;
        self.lines = 0;
        self.combo = 0;
        self.back_to_back = 0;
        self.status = GameStatus::Idle;
        self.mode = GameMode::Marathon;
        self.elapsed_ms = 0;
        self.time_remaining_ms = None;
        self.lines_remaining = None;
        self.timers = TimersSnapshot::default();
    }

    pub fn playable(&self) -> bool {
        self.status == GameStatus::Running && self.active.is_some()
    }

    /// Piece id at `(x, y)`, 0 when empty or out of range
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        if x >= self.cols as usize || y >= self.rows as usize {
            return 0;
        }
        self.board[y * self.cols as usize + x]
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            board: Vec::new(),
            active: None,
            ghost_y: None,
            next_queue: Vec::new(),
            hold: None,
            can_hold: true,
            clearing_rows: Vec::new(),
            score: 0,
            level: 0,
            lines: 0,
            combo: 0,
            back_to_back: 0,
            status: GameStatus::Idle,
            mode: GameMode::Marathon,
            elapsed_ms: 0,
            time_remaining_ms: None,
            lines_remaining: None,
            timers: TimersSnapshot::default(),
        }
    }
}
