//! Autoplay - greedy one-piece lookahead over every reachable placement
//!
//! Each candidate is planned with [`plan_place`], merged into a scratch copy
//! of the board, cleared, and scored by a weighted sum of lines, holes,
//! stack height and surface bumpiness.

use blockfall_core::{Board, GameState};
use blockfall_types::{GameAction, Rotation};

use crate::place::{plan_place, Placement};

/// Heuristic weights; holes and height are penalties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    pub lines: i32,
    pub holes: i32,
    pub aggregate_height: i32,
    pub max_height: i32,
    pub bumpiness: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            lines: 40,
            holes: 35,
            aggregate_height: 5,
            max_height: 2,
            bumpiness: 4,
        }
    }
}

/// Shape features of a settled board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardFeatures {
    pub holes: u32,
    pub aggregate_height: u32,
    pub max_height: u32,
    pub bumpiness: u32,
}

impl BoardFeatures {
    pub fn of(board: &Board) -> Self {
        let rows = board.height() as i8;
        let heights: Vec<u32> = (0..board.width() as i8)
            .map(|x| {
                (0..rows)
                    .find(|&y| board.is_occupied(x, y))
                    .map_or(0, |top| (rows - top) as u32)
            })
            .collect();

        let mut holes = 0;
        for x in 0..board.width() as i8 {
            let mut covered = false;
            for y in 0..rows {
                if board.is_occupied(x, y) {
                    covered = true;
                } else if covered {
                    holes += 1;
                }
            }
        }

        Self {
            holes,
            aggregate_height: heights.iter().sum(),
            max_height: heights.iter().copied().max().unwrap_or(0),
            bumpiness: heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum(),
        }
    }
}

pub fn evaluate(board: &Board, lines: u32, weights: &Weights) -> i32 {
    let f = BoardFeatures::of(board);
    lines as i32 * weights.lines
        - f.holes as i32 * weights.holes
        - f.aggregate_height as i32 * weights.aggregate_height
        - f.max_height as i32 * weights.max_height
        - f.bumpiness as i32 * weights.bumpiness
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub placement: Placement,
    pub actions: Vec<GameAction>,
    pub lines: u32,
    pub score: i32,
}

/// Best placement for the current piece (and the hold alternative)
pub fn best_placement(state: &GameState, weights: &Weights) -> Option<Candidate> {
    let board = state.board();
    let mut best: Option<Candidate> = None;
    let hold_options: &[bool] = if state.can_hold() {
        &[false, true]
    } else {
        &[false]
    };

    for &use_hold in hold_options {
        for rotation in [Rotation::North, Rotation::East, Rotation::South, Rotation::West] {
            for x in 0..board.width() as i8 {
                let placement = Placement {
                    x,
                    rotation,
                    use_hold,
                };
                let Ok(plan) = plan_place(state, placement) else {
                    continue;
                };

                let mut scratch = board.clone();
                let landed = plan.landed;
                if !scratch.merge(&landed.shape(), landed.x, landed.y, landed.kind) {
                    continue;
                }
                let full = scratch.find_full_rows();
                let lines = scratch.clear_rows(&full) as u32;
                let score = evaluate(&scratch, lines, weights);

                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(Candidate {
                        placement,
                        actions: plan.actions,
                        lines,
                        score,
                    });
                }
            }
        }
    }
    best
}

/// Drives a session by placing one piece per call
#[derive(Debug, Clone, Default)]
pub struct Autoplayer {
    weights: Weights,
    pieces_planned: u32,
}

impl Autoplayer {
    pub fn new(weights: Weights) -> Self {
        Self {
            weights,
            pieces_planned: 0,
        }
    }

    pub fn pieces_planned(&self) -> u32 {
        self.pieces_planned
    }

    /// Actions for the next piece, or `None` when there is nothing to place
    pub fn next_actions(&mut self, state: &GameState) -> Option<Vec<GameAction>> {
        if !state.is_playable() {
            return None;
        }
        let candidate = best_placement(state, &self.weights)?;
        self.pieces_planned += 1;
        Some(candidate.actions)
    }
}
