//! Pieces module - tetromino shapes, rotation and the kick table
//!
//! Shapes are stored as bounding-box matrices anchored at their top-left
//! corner. Rotation turns the matrix a quarter turn, so width and height swap
//! and the anchor stays put; wall kicks then nudge the anchor.

use crate::types::{PieceKind, Rotation};

/// Offset of a single mino relative to the piece anchor
pub type MinoOffset = (i8, i8);

/// Kick offsets tried in order when a rotation collides.
///
/// The first entry is the plain rotation; negative y is up.
pub const KICK_OFFSETS: [MinoOffset; 8] = [
    (0, 0),
    (-1, 0),
    (1, 0),
    (-2, 0),
    (2, 0),
    (0, -1),
    (-1, -1),
    (1, -1),
];

/// Shape of a piece: four mino offsets inside a `width` x `height` box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    width: u8,
    height: u8,
    minos: [MinoOffset; 4],
}

impl PieceShape {
    fn new(width: u8, height: u8, mut minos: [MinoOffset; 4]) -> Self {
        minos.sort_by_key(|&(x, y)| (y, x));
        Self {
            width,
            height,
            minos,
        }
    }

    /// Spawn-orientation shape of a kind
    pub fn canonical(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => Self::new(4, 1, [(0, 0), (1, 0), (2, 0), (3, 0)]),
            PieceKind::O => Self::new(2, 2, [(0, 0), (1, 0), (0, 1), (1, 1)]),
            PieceKind::T => Self::new(3, 2, [(1, 0), (0, 1), (1, 1), (2, 1)]),
            PieceKind::S => Self::new(3, 2, [(1, 0), (2, 0), (0, 1), (1, 1)]),
            PieceKind::Z => Self::new(3, 2, [(0, 0), (1, 0), (1, 1), (2, 1)]),
            PieceKind::L => Self::new(3, 2, [(0, 0), (0, 1), (1, 1), (2, 1)]),
            PieceKind::J => Self::new(3, 2, [(2, 0), (0, 1), (1, 1), (2, 1)]),
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn minos(&self) -> &[MinoOffset; 4] {
        &self.minos
    }

    /// Absolute cells when anchored at `(x, y)`
    pub fn cells_at(&self, x: i8, y: i8) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.minos.iter().map(move |&(dx, dy)| (x + dx, y + dy))
    }

    /// Quarter turn clockwise: (x, y) -> (h-1-y, x)
    pub fn rotated_cw(&self) -> Self {
        let h = self.height as i8;
        let minos = self.minos.map(|(x, y)| (h - 1 - y, x));
        Self::new(self.height, self.width, minos)
    }

    /// Quarter turn counter-clockwise: (x, y) -> (y, w-1-x)
    pub fn rotated_ccw(&self) -> Self {
        let w = self.width as i8;
        let minos = self.minos.map(|(x, y)| (y, w - 1 - x));
        Self::new(self.height, self.width, minos)
    }

    /// The mino with the most orthogonal neighbours inside the shape.
    ///
    /// For a T this is the centre of the bar, the cell its corners are
    /// measured around.
    pub fn hub(&self) -> MinoOffset {
        let neighbours = |&(x, y): &MinoOffset| {
            [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .iter()
                .filter(|&&(dx, dy)| self.minos.contains(&(x + dx, y + dy)))
                .count()
        };
        let mut best = self.minos[0];
        for mino in &self.minos[1..] {
            if neighbours(mino) > neighbours(&best) {
                best = *mino;
            }
        }
        best
    }
}

/// Get the shape for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let mut shape = PieceShape::canonical(kind);
    for _ in 0..rotation.quarter_turns() {
        shape = shape.rotated_cw();
    }
    shape
}

/// Spawn column for a shape: centred, rounding towards the left
pub fn spawn_x(cols: u8, shape: &PieceShape) -> i8 {
    (cols / 2) as i8 - (shape.width() / 2) as i8
}

/// Outcome of a successful rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationResult {
    pub shape: PieceShape,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Index into [`KICK_OFFSETS`] of the offset that fit
    pub kick_index: usize,
}

/// Try to rotate a piece, walking the kick table in order.
///
/// `collides(shape, x, y)` reports whether a placement is blocked. Returns
/// `None` when every offset collides.
pub fn try_rotate<F>(
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
    clockwise: bool,
    collides: F,
) -> Option<RotationResult>
where
    F: Fn(&PieceShape, i8, i8) -> bool,
{
    let current = get_shape(kind, rotation);
    let (shape, target) = if clockwise {
        (current.rotated_cw(), rotation.rotate_cw())
    } else {
        (current.rotated_ccw(), rotation.rotate_ccw())
    };

    KICK_OFFSETS
        .iter()
        .enumerate()
        .find(|(_, &(kx, ky))| !collides(&shape, x + kx, y + ky))
        .map(|(kick_index, &(kx, ky))| RotationResult {
            shape,
            rotation: target,
            x: x + kx,
            y: y + ky,
            kick_index,
        })
}
