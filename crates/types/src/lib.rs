//! Shared vocabulary for the engine, the store and the session runtime.
//!
//! Everything here is plain data: piece kinds, rotation states, player
//! actions, modes, grid presets and the timing/scoring constants the rules
//! are written against.
//!
//! # Board Dimensions
//!
//! The board size is chosen per session from a [`GridPreset`]:
//!
//! | Preset | Rows | Cols |
//! |--------|------|------|
//! | `standard` | 20 | 10 |
//! | `square` | 15 | 15 |
//! | `wide` | 15 | 25 |
//! | `tall` | 25 | 8 |
//! | `mini` | 12 | 8 |
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep used by headless drivers and replays |
//! | `BASE_DROP_MS` | 1000 | Gravity interval before the level speed-up |
//! | `DROP_SPEEDUP_PER_LEVEL_MS` | 50 | Interval reduction per level |
//! | `DROP_INTERVAL_MIN_MS` | 100 | Gravity never gets faster than this |
//! | `LOCK_DELAY_MS` | 500 | Time a resting piece waits before locking |
//! | `LOCK_RESET_LIMIT` | 15 | Grounded moves/rotations before a forced lock |
//! | `LINE_CLEAR_DELAY_MS` | 200 | Pending-clear duration before rows are removed |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{GameAction, GridPreset, PieceKind, Rotation};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.id(), 3);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//!
//! let action = GameAction::from_str("rotateRight").unwrap();
//! assert_eq!(action, GameAction::RotateRight);
//!
//! assert_eq!(GridPreset::Tall.rows(), 25);
//! assert_eq!(GridPreset::Tall.cols(), 8);
//! ```

use serde::{Deserialize, Serialize};

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval before any level speed-up (1 row per second)
pub const BASE_DROP_MS: u32 = 1000;

/// Gravity interval reduction per level
pub const DROP_SPEEDUP_PER_LEVEL_MS: u32 = 50;

/// Absolute minimum gravity interval (100ms)
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Lock delay when a piece rests on a surface (500ms)
pub const LOCK_DELAY_MS: u32 = 500;

/// Maximum number of grounded move/rotate resets per piece (15)
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Time between a clearing lock and the actual row removal (200ms)
pub const LINE_CLEAR_DELAY_MS: u32 = 200;

/// Lines needed per level step
pub const LINES_PER_LEVEL: u32 = 10;

/// Lowest selectable start level
pub const MIN_START_LEVEL: u32 = 1;

/// Highest selectable start level
pub const MAX_START_LEVEL: u32 = 20;

/// Default number of pieces shown in the next queue
pub const DEFAULT_NEXT_COUNT: usize = 2;

/// Largest supported next queue
pub const MAX_NEXT_COUNT: usize = 6;

/// Default sprint goal
pub const SPRINT_GOAL_LINES: u32 = 40;

/// Default ultra time limit (2 minutes)
pub const ULTRA_TIME_LIMIT_SECS: u32 = 120;

/// Points per row for a player soft drop
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per row for a hard drop
pub const HARD_DROP_POINTS: u32 = 2;

/// Number of high-score entries kept
pub const MAX_HIGH_SCORES: usize = 10;

/// Number of replays kept
pub const MAX_REPLAYS: usize = 10;

/// Line clear base points (before level multiplier)
///
/// Index is the number of lines cleared. Four lines use the Tetris values
/// below instead.
pub const LINE_SCORES: [u32; 4] = [0, 100, 300, 500];

/// Tetris (4 lines) base points
pub const TETRIS_POINTS: u32 = 800;

/// Tetris base points while back-to-back is active
pub const TETRIS_B2B_POINTS: u32 = 1200;

/// T-Spin base points for 1, 2 and 3 lines
pub const TSPIN_SCORES: [u32; 3] = [800, 1200, 1600];

/// T-Spin Mini base points: single, anything else
pub const TSPIN_MINI_SCORES: [u32; 2] = [200, 400];

/// Perfect Clear bonus for 1..=4 lines (not level-scaled)
pub const PERFECT_CLEAR_BONUS: [u32; 4] = [800, 1200, 1800, 2000];

/// Perfect Clear bonus for any other line count
pub const PERFECT_CLEAR_BONUS_FALLBACK: u32 = 3500;

/// Combo scoring base value (50 points per combo step, level-scaled)
pub const COMBO_BASE: u32 = 50;

/// Back-to-back bonus numerator (3/2 = 1.5x multiplier)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;


/// The seven tetromino piece kinds
///
/// Ids run 1..=7 in declaration order and are what the board grid export
/// carries; 0 means empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl PieceKind {
    /// Every kind, in id order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
    ];

    /// Zero-based index, handy for per-kind counters
    pub fn index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::L => 5,
            PieceKind::J => 6,
        }
    }

    /// Board id (1..=7)
    pub fn id(&self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=7 => Some(Self::ALL[id as usize - 1]),
            _ => None,
        }
    }

    /// Display colour as a `#RRGGBB` string
    pub fn color(&self) -> &'static str {
        match self {
            PieceKind::I => "#FF0000",
            PieceKind::O => "#00FF00",
            PieceKind::T => "#0000FF",
            PieceKind::S => "#FFFF00",
            PieceKind::Z => "#FF00FF",
            PieceKind::L => "#00FFFF",
            PieceKind::J => "#FFA500",
        }
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("J"), Some(PieceKind::J));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::L => "l",
            PieceKind::J => "j",
        }
    }
}

/// Rotation state of the active piece, counted in clockwise quarter turns
/// from the spawn orientation.
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns from North (0..=3)
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    pub fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Discrete player commands
///
/// Everything except `Pause` is recorded in replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell down (+1 point)
    SoftDrop,
    /// Drop to the lowest valid row and lock (+2 points per row)
    HardDrop,
    /// Rotate 90° counter-clockwise
    RotateLeft,
    /// Rotate 90° clockwise
    RotateRight,
    /// Swap with the hold slot (once per lock)
    Hold,
    /// Toggle pause
    Pause,
}

impl GameAction {
    pub const ALL: [GameAction; 8] = [
        GameAction::MoveLeft,
        GameAction::MoveRight,
        GameAction::SoftDrop,
        GameAction::HardDrop,
        GameAction::RotateLeft,
        GameAction::RotateRight,
        GameAction::Hold,
        GameAction::Pause,
    ];

    /// Parse action from its camelCase name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("HARDDROP"), Some(GameAction::HardDrop));
    /// assert_eq!(GameAction::from_str("restart"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotateleft" => Some(GameAction::RotateLeft),
            "rotateright" => Some(GameAction::RotateRight),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateLeft => "rotateLeft",
            GameAction::RotateRight => "rotateRight",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
        }
    }

    /// Whether the action belongs in a replay log
    pub fn is_replayable(&self) -> bool {
        !matches!(self, GameAction::Pause)
    }
}

/// T-Spin classification
///
/// - **None**: Not a T-spin
/// - **Mini**: the rotation succeeded without a kick
/// - **Normal**: the rotation needed a kick offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TSpinKind {
    #[default]
    None,
    Mini,
    Normal,
}

impl TSpinKind {
    pub fn is_spin(&self) -> bool {
        !matches!(self, TSpinKind::None)
    }

    /// Returns `None` for `TSpinKind::None`
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Normal => Some("normal"),
        }
    }
}

/// Session rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Endless; ends only on game over
    #[default]
    Marathon,
    /// Clear a fixed number of lines as fast as possible
    Sprint,
    /// Score as much as possible before the timer runs out
    Ultra,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Marathon, GameMode::Sprint, GameMode::Ultra];

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "marathon" => Some(GameMode::Marathon),
            "sprint" => Some(GameMode::Sprint),
            "ultra" => Some(GameMode::Ultra),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Marathon => "marathon",
            GameMode::Sprint => "sprint",
            GameMode::Ultra => "ultra",
        }
    }
}

/// Board dimension presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridPreset {
    /// 20 rows x 10 cols
    #[default]
    Standard,
    /// 15 x 15
    Square,
    /// 15 x 25
    Wide,
    /// 25 x 8
    Tall,
    /// 12 x 8
    Mini,
}

impl GridPreset {
    pub const ALL: [GridPreset; 5] = [
        GridPreset::Standard,
        GridPreset::Square,
        GridPreset::Wide,
        GridPreset::Tall,
        GridPreset::Mini,
    ];

    pub fn rows(&self) -> u8 {
        match self {
            GridPreset::Standard => 20,
            GridPreset::Square | GridPreset::Wide => 15,
            GridPreset::Tall => 25,
            GridPreset::Mini => 12,
        }
    }

    pub fn cols(&self) -> u8 {
        match self {
            GridPreset::Standard => 10,
            GridPreset::Square => 15,
            GridPreset::Wide => 25,
            GridPreset::Tall | GridPreset::Mini => 8,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(GridPreset::Standard),
            "square" => Some(GridPreset::Square),
            "wide" => Some(GridPreset::Wide),
            "tall" => Some(GridPreset::Tall),
            "mini" => Some(GridPreset::Mini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GridPreset::Standard => "standard",
            GridPreset::Square => "square",
            GridPreset::Wide => "wide",
            GridPreset::Tall => "tall",
            GridPreset::Mini => "mini",
        }
    }
}

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
    Victory,
}

impl GameStatus {
    /// Game over and victory freeze the session for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled with the specified piece kind
pub type Cell = Option<PieceKind>;
