//! Game state module - manages the complete session state
//!
//! This module ties together all core components: board, pieces, bag and
//! scoring. It owns the piece controller (move, rotate, drop, hold), the
//! lock and clear pipeline, and the per-tick state machine.
//!
//! Status transitions: `Idle -> Running <-> Paused`, `Running -> GameOver`,
//! `Running -> Victory`. A locked piece that fills rows leaves the session
//! Running but with no active piece until the pending clear expires.

use crate::board::Board;
use crate::clock::FrameClock;
use crate::config::GameConfig;
use crate::events::{ClearReport, GameEvent, Outcome, SessionMetrics, SessionSummary};
use crate::pieces::{get_shape, spawn_x, try_rotate, PieceShape};
use crate::rng::{EntropyRng, PieceQueue, RandomSource, SimpleRng};
use crate::scoring::{
    calculate_drop_score, calculate_level, calculate_score, clear_label, get_drop_interval_ms,
};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, TimersSnapshot};
use crate::types::*;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Spawn orientation, centred on a board `cols` wide, top row
    pub fn spawn(kind: PieceKind, cols: u8) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: spawn_x(cols, &PieceShape::canonical(kind)),
            y: 0,
        }
    }

    /// Get the shape for current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn collides(&self, board: &Board) -> bool {
        board.collides(&self.shape(), self.x, self.y)
    }

    /// Check if the piece is resting on the floor or a filled cell
    pub fn is_grounded(&self, board: &Board) -> bool {
        self.shifted(0, 1).collides(board)
    }

    /// Rows the piece can fall before landing
    pub fn drop_distance(&self, board: &Board) -> u8 {
        let mut distance = 0;
        while !self.shifted(0, distance as i8 + 1).collides(board) {
            distance += 1;
        }
        distance
    }
}

/// Full rows waiting for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClear {
    pub rows: Vec<usize>,
    pub remaining_ms: u32,
    pub tspin: TSpinKind,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    active: Option<Tetromino>,
    hold: Option<PieceKind>,
    can_hold: bool,
    queue: PieceQueue,
    status: GameStatus,
    pending_clear: Option<PendingClear>,
    score: u32,
    level: u32,
    lines: u32,
    combo: u32,
    back_to_back: u32,
    drop_timer_ms: u32,
    lock_timer_ms: u32,
    lock_reset_count: u8,
    last_action_was_rotate: bool,
    /// Spin type recorded by the last T rotation, confirmed at lock
    pending_tspin: TSpinKind,
    /// Game clock; only advances while running
    elapsed_ms: u64,
    frame_clock: FrameClock,
    metrics: SessionMetrics,
    events: Vec<GameEvent>,
    summary: Option<SessionSummary>,
}

impl GameState {
    /// Create a session; seeded configs get the reproducible LCG, unseeded
    /// ones an entropy source
    pub fn new(config: GameConfig) -> Self {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SimpleRng::new(seed)),
            None => Box::new(EntropyRng::new()),
        };
        Self::with_rng(config, rng)
    }

    /// Default configuration with a fixed seed
    pub fn seeded(seed: u32) -> Self {
        Self::new(GameConfig::default().with_seed(seed))
    }

    /// Create a session drawing pieces from a custom random source
    pub fn with_rng(config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        let config = config.sanitized();
        Self {
            board: Board::from_preset(config.grid),
            active: None,
            hold: None,
            can_hold: true,
            queue: PieceQueue::new(rng, config.next_count),
            status: GameStatus::Idle,
            pending_clear: None,
            score: 0,
            level: config.start_level,
            lines: 0,
            combo: 0,
            back_to_back: 0,
            drop_timer_ms: 0,
            lock_timer_ms: 0,
            lock_reset_count: 0,
            last_action_was_rotate: false,
            pending_tspin: TSpinKind::None,
            elapsed_ms: 0,
            frame_clock: FrameClock::new(),
            metrics: SessionMetrics::default(),
            events: Vec::new(),
            summary: None,
            config,
        }
    }

    /// Replace the starting board (garbage setups, puzzles).
    ///
    /// Only meaningful before [`GameState::start`].
    pub fn with_board(mut self, board: Board) -> Self {
        if self.status == GameStatus::Idle {
            self.board = board;
        }
        self
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) -> bool {
        if self.status != GameStatus::Idle {
            return false;
        }
        self.status = GameStatus::Running;
        self.frame_clock.reanchor();
        self.spawn_next();
        true
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn paused(&self) -> bool {
        self.status == GameStatus::Paused
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Running with a piece under control
    pub fn is_playable(&self) -> bool {
        self.status == GameStatus::Running && self.active.is_some()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn back_to_back(&self) -> u32 {
        self.back_to_back
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn next_queue(&self) -> &[PieceKind] {
        self.queue.preview()
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pending_clear(&self) -> Option<&PendingClear> {
        self.pending_clear.as_ref()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn lock_timer_ms(&self) -> u32 {
        self.lock_timer_ms
    }

    pub fn lock_reset_count(&self) -> u8 {
        self.lock_reset_count
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Final summary once the session is over
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Get current gravity interval based on level
    pub fn drop_interval_ms(&self) -> u32 {
        get_drop_interval_ms(self.level)
    }

    /// Ultra: time left on the clock
    pub fn time_remaining_ms(&self) -> Option<u64> {
        (self.config.mode == GameMode::Ultra)
            .then(|| self.config.ultra_time_limit_ms().saturating_sub(self.elapsed_ms))
    }

    /// Sprint: lines still needed
    pub fn lines_remaining(&self) -> Option<u32> {
        (self.config.mode == GameMode::Sprint)
            .then(|| self.config.sprint_goal.saturating_sub(self.lines))
    }

    /// Drain queued output events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.rows = self.board.height();
        out.cols = self.board.width();
        self.board.write_id_grid(&mut out.board);
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost_y();
        out.next_queue.clear();
        out.next_queue.extend_from_slice(self.queue.preview());
        out.hold = self.hold;
        out.can_hold = self.can_hold;
        out.clearing_rows.clear();
        if let Some(pending) = &self.pending_clear {
            out.clearing_rows.extend_from_slice(&pending.rows);
        }
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.combo = self.combo;
        out.back_to_back = self.back_to_back;
        out.status = self.status;
        out.mode = self.config.mode;
        out.elapsed_ms = self.elapsed_ms;
        out.time_remaining_ms = self.time_remaining_ms();
        out.lines_remaining = self.lines_remaining();
        out.timers = TimersSnapshot {
            drop_ms: self.drop_timer_ms,
            lock_ms: self.lock_timer_ms,
            line_clear_ms: self.pending_clear.as_ref().map_or(0, |p| p.remaining_ms),
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn accepts_input(&self) -> bool {
        self.is_playable()
    }

    fn reset_piece_timers(&mut self) {
        self.drop_timer_ms = 0;
        self.lock_timer_ms = 0;
        self.lock_reset_count = 0;
        self.last_action_was_rotate = false;
        self.pending_tspin = TSpinKind::None;
    }

    /// Draw from the next queue and spawn it
    fn spawn_next(&mut self) -> bool {
        let kind = self.queue.draw();
        self.events.push(GameEvent::PieceDispensed { kind });
        self.spawn_kind(kind)
    }

    /// Place `kind` at the spawn position; a blocked spawn ends the game
    fn spawn_kind(&mut self, kind: PieceKind) -> bool {
        self.reset_piece_timers();
        let piece = Tetromino::spawn(kind, self.board.width());
        if piece.collides(&self.board) {
            self.active = None;
            self.finish(Outcome::GameOver);
            return false;
        }
        self.active = Some(piece);
        true
    }

    /// Grounded moves and rotations restart the lock timer and use up one
    /// of the limited resets
    fn reset_lock_delay(&mut self) {
        if self.is_grounded() {
            self.lock_timer_ms = 0;
            if self.lock_reset_count < LOCK_RESET_LIMIT {
                self.lock_reset_count += 1;
            }
        }
    }

    /// Shift the active piece one column (`dx` = -1 or 1)
    pub fn move_horizontal(&mut self, dx: i8) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let moved = active.shifted(dx, 0);
        if moved.collides(&self.board) {
            return false;
        }

        self.active = Some(moved);
        self.last_action_was_rotate = false;
        self.metrics.moves += 1;
        self.reset_lock_delay();
        true
    }

    /// Move down one row for one point
    pub fn soft_drop(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let moved = active.shifted(0, 1);
        if moved.collides(&self.board) {
            return false;
        }

        self.active = Some(moved);
        self.score = self.score.saturating_add(calculate_drop_score(1, false));
        self.last_action_was_rotate = false;
        self.metrics.soft_drops += 1;
        true
    }

    /// Drop to the landing row and lock immediately
    pub fn hard_drop(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let distance = active.drop_distance(&self.board);
        self.active = Some(active.shifted(0, distance as i8));
        self.score = self
            .score
            .saturating_add(calculate_drop_score(distance as u32, true));
        self.metrics.hard_drops += 1;
        self.lock_piece();
        true
    }

    /// Rotate with wall kicks
    pub fn rotate(&mut self, clockwise: bool) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let board = &self.board;
        let Some(result) = try_rotate(
            active.kind,
            active.rotation,
            active.x,
            active.y,
            clockwise,
            |shape, x, y| board.collides(shape, x, y),
        ) else {
            return false;
        };

        self.active = Some(Tetromino {
            rotation: result.rotation,
            x: result.x,
            y: result.y,
            ..active
        });
        self.last_action_was_rotate = true;
        if active.kind == PieceKind::T {
            self.pending_tspin = if result.kick_index > 0 {
                TSpinKind::Normal
            } else {
                TSpinKind::Mini
            };
        }
        self.metrics.rotations += 1;
        self.reset_lock_delay();
        true
    }

    /// Swap active piece with hold piece
    pub fn hold(&mut self) -> bool {
        if !self.accepts_input() || !self.can_hold {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        self.can_hold = false;
        self.metrics.holds += 1;
        match self.hold.replace(active.kind) {
            Some(held) => self.spawn_kind(held),
            None => self.spawn_next(),
        };
        true
    }

    /// Merge the active piece and either schedule a clear or spawn the next
    /// piece. Only a running session locks.
    fn lock_piece(&mut self) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        let Some(active) = self.active.take() else {
            return false;
        };

        let tspin = self.t_spin_kind(&active);
        if !self
            .board
            .merge(&active.shape(), active.x, active.y, active.kind)
        {
            // Only reachable if the board was edited under the piece.
            self.finish(Outcome::GameOver);
            return false;
        }

        self.metrics.record_lock(active.kind);
        self.can_hold = true;
        self.drop_timer_ms = 0;
        self.lock_timer_ms = 0;
        self.lock_reset_count = 0;

        let full_rows = self.board.find_full_rows();
        self.events.push(GameEvent::PieceLocked {
            kind: active.kind,
            tspin,
            full_rows: full_rows.clone(),
        });

        if full_rows.is_empty() {
            self.combo = 0;
            self.spawn_next();
        } else {
            self.pending_clear = Some(PendingClear {
                rows: full_rows,
                remaining_ms: LINE_CLEAR_DELAY_MS,
                tspin,
            });
        }
        true
    }

    /// Remove the pending rows, score them and move on
    fn complete_clear(&mut self) {
        let Some(pending) = self.pending_clear.take() else {
            return;
        };

        let lines = self.board.clear_rows(&pending.rows) as u32;
        let perfect_clear = self.board.is_empty();
        let result = calculate_score(
            lines,
            self.level,
            pending.tspin,
            self.combo,
            self.back_to_back,
            perfect_clear,
        );

        self.score = self.score.saturating_add(result.total);
        self.back_to_back = if result.qualifies_for_b2b {
            self.back_to_back + 1
        } else {
            0
        };
        self.combo += 1;
        self.lines += lines;
        self.level = calculate_level(self.lines, self.config.start_level);

        if pending.tspin.is_spin() {
            self.metrics.tspins += 1;
        }
        if lines == 4 {
            self.metrics.tetrises += 1;
        }
        if perfect_clear {
            self.metrics.perfect_clears += 1;
        }
        self.metrics.max_combo = self.metrics.max_combo.max(self.combo);
        self.metrics.max_back_to_back = self.metrics.max_back_to_back.max(self.back_to_back);

        self.events.push(GameEvent::LinesCleared(ClearReport {
            label: clear_label(lines, pending.tspin, result.b2b_applied),
            rows: pending.rows,
            tspin: pending.tspin,
            perfect_clear,
            score: result,
            combo: self.combo,
            back_to_back: self.back_to_back,
            level: self.level,
        }));

        if self.config.mode == GameMode::Sprint && self.lines >= self.config.sprint_goal {
            self.finish(Outcome::Victory);
            return;
        }
        self.spawn_next();
    }

    /// T-Spin check for a piece about to lock: a T whose last action was a
    /// rotation, with at least three blocked diagonal corners around its hub
    fn t_spin_kind(&self, piece: &Tetromino) -> TSpinKind {
        if piece.kind != PieceKind::T || !self.last_action_was_rotate {
            return TSpinKind::None;
        }

        let (hx, hy) = piece.shape().hub();
        let (cx, cy) = (piece.x + hx, piece.y + hy);
        let blocked = [(-1, -1), (1, -1), (-1, 1), (1, 1)]
            .iter()
            .filter(|&&(dx, dy)| {
                let (x, y) = (cx + dx, cy + dy);
                self.board.is_out_of_bounds(x, y) || self.board.is_occupied(x, y)
            })
            .count();

        if blocked < 3 {
            return TSpinKind::None;
        }
        match self.pending_tspin {
            TSpinKind::None => TSpinKind::Normal,
            recorded => recorded,
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.status.is_terminal() {
            return;
        }
        self.status = match outcome {
            Outcome::GameOver => GameStatus::GameOver,
            Outcome::Victory => GameStatus::Victory,
        };
        self.pending_clear = None;

        let summary = SessionSummary::new(
            outcome,
            &self.config,
            self.score,
            self.lines,
            self.level,
            self.elapsed_ms,
            self.metrics,
        );
        self.summary = Some(summary.clone());
        self.events.push(match outcome {
            Outcome::GameOver => GameEvent::GameOver(summary),
            Outcome::Victory => GameEvent::Victory(summary),
        });
    }

    /// Check if the active piece is on the ground
    pub fn is_grounded(&self) -> bool {
        match self.active {
            Some(ref piece) => piece.is_grounded(&self.board),
            None => false,
        }
    }

    /// Calculate the ghost piece Y position (where piece would land)
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        Some(active.y + active.drop_distance(&self.board) as i8)
    }

    pub fn pause(&mut self) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        self.status = GameStatus::Paused;
        self.frame_clock.reanchor();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != GameStatus::Paused {
            return false;
        }
        self.status = GameStatus::Running;
        self.frame_clock.reanchor();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.status {
            GameStatus::Running => self.pause(),
            GameStatus::Paused => self.resume(),
            _ => false,
        }
    }

    /// Animation-frame entry point: ticks by the time since the previous
    /// frame. The first frame after start or resume advances nothing.
    pub fn frame(&mut self, now_ms: u64) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        let delta = self.frame_clock.delta(now_ms);
        self.tick(delta)
    }

    /// Main game tick - advance the clock, timers, gravity and locking.
    ///
    /// Returns true when the piece moved, locked or a clear completed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }

        self.elapsed_ms += elapsed_ms as u64;
        if self.config.mode == GameMode::Ultra
            && self.elapsed_ms >= self.config.ultra_time_limit_ms()
        {
            self.finish(Outcome::Victory);
            return true;
        }

        if let Some(pending) = &mut self.pending_clear {
            pending.remaining_ms = pending.remaining_ms.saturating_sub(elapsed_ms);
            if pending.remaining_ms == 0 {
                self.complete_clear();
                return true;
            }
            return false;
        }

        let Some(active) = self.active else {
            return false;
        };

        if active.is_grounded(&self.board) {
            self.lock_timer_ms = self.lock_timer_ms.saturating_add(elapsed_ms);
            if self.lock_timer_ms >= LOCK_DELAY_MS || self.lock_reset_count >= LOCK_RESET_LIMIT {
                self.lock_piece();
                return true;
            }
            false
        } else {
            self.lock_timer_ms = 0;
            self.lock_reset_count = 0;
            self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
            if self.drop_timer_ms > self.drop_interval_ms() {
                self.drop_timer_ms = 0;
                self.active = Some(active.shifted(0, 1));
                return true;
            }
            false
        }
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_horizontal(-1),
            GameAction::MoveRight => self.move_horizontal(1),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateLeft => self.rotate(false),
            GameAction::RotateRight => self.rotate(true),
            GameAction::Hold => self.hold(),
            GameAction::Pause => self.toggle_pause(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::seeded(1)
    }
}
