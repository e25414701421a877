//! Placement planning - turn "put this piece here" into game actions
//!
//! Plans are simulated against the current board with the same collision
//! and kick rules the session uses, so replaying the returned actions on an
//! unchanged session lands the piece exactly where the plan did.

use blockfall_core::{try_rotate, Board, GameState, Tetromino};
use blockfall_types::{GameAction, GameStatus, Rotation};

/// Target of a placement: final anchor column and rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: i8,
    pub rotation: Rotation,
    pub use_hold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    HoldUnavailable,
    RotationBlocked,
    XOutOfBounds,
    XBlocked,
    NotPlayable,
    NoActive,
    Rejected(GameAction),
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold_unavailable",
            PlaceError::NotPlayable => "not_playable",
            PlaceError::RotationBlocked
            | PlaceError::XOutOfBounds
            | PlaceError::XBlocked
            | PlaceError::NoActive
            | PlaceError::Rejected(_) => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold requested when unavailable",
            PlaceError::RotationBlocked => "could not rotate to target rotation",
            PlaceError::XOutOfBounds => "target x would place piece out of bounds",
            PlaceError::XBlocked => "could not move to target x due to collision",
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoActive => "no active piece",
            PlaceError::Rejected(_) => "planned action was rejected",
        }
    }
}

/// A planned placement and where the piece comes to rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacePlan {
    pub actions: Vec<GameAction>,
    pub landed: Tetromino,
}

/// Rotate `piece` to `target` step by step, preferring the shorter
/// direction; each step walks the kick table.
fn rotate_to(board: &Board, piece: Tetromino, target: Rotation) -> Option<(Tetromino, Vec<GameAction>)> {
    let current = piece.rotation.quarter_turns() as i8;
    let wanted = target.quarter_turns() as i8;
    let cw = (wanted - current).rem_euclid(4) as u8;
    let ccw = (current - wanted).rem_euclid(4) as u8;

    let mut plans = [(true, cw), (false, ccw)];
    if plans[1].1 < plans[0].1 {
        plans.swap(0, 1);
    }

    'plans: for (clockwise, steps) in plans {
        let mut p = piece;
        for _ in 0..steps {
            let Some(result) = try_rotate(p.kind, p.rotation, p.x, p.y, clockwise, |shape, x, y| {
                board.collides(shape, x, y)
            }) else {
                continue 'plans;
            };
            p = Tetromino {
                rotation: result.rotation,
                x: result.x,
                y: result.y,
                ..p
            };
        }
        let action = if clockwise {
            GameAction::RotateRight
        } else {
            GameAction::RotateLeft
        };
        return Some((p, vec![action; steps as usize]));
    }
    None
}

/// Plan the actions that bring the current (or held) piece to `target` and
/// hard-drop it.
pub fn plan_place(state: &GameState, target: Placement) -> Result<PlacePlan, PlaceError> {
    if state.status() != GameStatus::Running {
        return Err(PlaceError::NotPlayable);
    }
    let Some(active) = state.active() else {
        return Err(PlaceError::NoActive);
    };

    let board = state.board();
    let mut actions = Vec::new();

    let piece = if target.use_hold {
        if !state.can_hold() {
            return Err(PlaceError::HoldUnavailable);
        }
        let kind = match state.hold_piece() {
            Some(kind) => kind,
            None => *state.next_queue().first().ok_or(PlaceError::HoldUnavailable)?,
        };
        let swapped = Tetromino::spawn(kind, board.width());
        if swapped.collides(board) {
            return Err(PlaceError::HoldUnavailable);
        }
        actions.push(GameAction::Hold);
        swapped
    } else {
        active
    };

    let (mut piece, turns) =
        rotate_to(board, piece, target.rotation).ok_or(PlaceError::RotationBlocked)?;
    actions.extend(turns);

    let width = piece.shape().width() as i8;
    if target.x < 0 || target.x + width > board.width() as i8 {
        return Err(PlaceError::XOutOfBounds);
    }

    let step = (target.x - piece.x).signum();
    while piece.x != target.x {
        let moved = piece.shifted(step, 0);
        if moved.collides(board) {
            return Err(PlaceError::XBlocked);
        }
        piece = moved;
        actions.push(if step > 0 {
            GameAction::MoveRight
        } else {
            GameAction::MoveLeft
        });
    }

    let landed = piece.shifted(0, piece.drop_distance(board) as i8);
    actions.push(GameAction::HardDrop);
    Ok(PlacePlan { actions, landed })
}

/// Plan and execute a placement on `state`
pub fn apply_place(state: &mut GameState, target: Placement) -> Result<(), PlaceError> {
    let plan = plan_place(state, target)?;
    for action in plan.actions {
        if !state.apply_action(action) {
            return Err(PlaceError::Rejected(action));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_core::GameConfig;

    fn running(seed: u32) -> GameState {
        let mut gs = GameState::seeded(seed);
        gs.start();
        gs
    }

    #[test]
    fn place_rejected_when_paused() {
        let mut gs = running(1);
        assert!(gs.apply_action(GameAction::Pause));

        let a = gs.active().expect("expected active piece");
        let target = Placement {
            x: a.x,
            rotation: a.rotation,
            use_hold: false,
        };
        assert_eq!(apply_place(&mut gs, target), Err(PlaceError::NotPlayable));
    }

    #[test]
    fn place_rejected_when_x_out_of_bounds() {
        let mut gs = running(1);
        let a = gs.active().expect("expected active piece");
        let target = Placement {
            x: -50,
            rotation: a.rotation,
            use_hold: false,
        };
        assert_eq!(apply_place(&mut gs, target), Err(PlaceError::XOutOfBounds));
    }

    #[test]
    fn place_rejected_when_x_blocked_by_collision() {
        let rows: Vec<String> = (0..20)
            .map(|y| if y < 4 { "I.........".to_string() } else { "..........".to_string() })
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let mut gs = GameState::new(GameConfig::default().with_seed(1))
            .with_board(Board::from_ascii(&rows));
        gs.start();

        let a = gs.active().expect("expected active piece");
        let target = Placement {
            x: 0,
            rotation: a.rotation,
            use_hold: false,
        };
        assert_eq!(plan_place(&gs, target), Err(PlaceError::XBlocked));
    }

    #[test]
    fn plan_reaches_target_and_lands() {
        let gs = running(3);
        let a = gs.active().unwrap();
        let plan = plan_place(
            &gs,
            Placement {
                x: 0,
                rotation: a.rotation.rotate_cw(),
                use_hold: false,
            },
        )
        .unwrap();

        assert_eq!(plan.actions.first(), Some(&GameAction::RotateRight));
        assert_eq!(plan.actions.last(), Some(&GameAction::HardDrop));
        assert_eq!(plan.landed.x, 0);
        assert!(plan.landed.is_grounded(gs.board()));
    }

    #[test]
    fn counter_clockwise_is_preferred_for_three_quarter_turns() {
        let gs = running(3);
        let a = gs.active().unwrap();
        let plan = plan_place(
            &gs,
            Placement {
                x: 0,
                rotation: a.rotation.rotate_ccw(),
                use_hold: false,
            },
        )
        .unwrap();
        assert_eq!(plan.actions[0], GameAction::RotateLeft);
        assert_ne!(plan.actions[1], GameAction::RotateLeft);
    }

    #[test]
    fn apply_place_with_hold_swaps_piece() {
        let mut gs = running(5);
        let first = gs.active().unwrap().kind;
        let upcoming = gs.next_queue()[0];
        let target = Placement {
            x: 0,
            rotation: Rotation::North,
            use_hold: true,
        };
        apply_place(&mut gs, target).unwrap();
        assert_eq!(gs.hold_piece(), Some(first));
        assert_eq!(gs.metrics().pieces_placed, 1);
        assert_eq!(gs.metrics().piece_counts[upcoming.index()], 1);
    }

    #[test]
    fn hold_refused_twice() {
        let mut gs = running(5);
        assert!(gs.apply_action(GameAction::Hold));
        let target = Placement {
            x: 0,
            rotation: Rotation::North,
            use_hold: true,
        };
        assert_eq!(plan_place(&gs, target), Err(PlaceError::HoldUnavailable));
        assert_eq!(PlaceError::HoldUnavailable.code(), "hold_unavailable");
    }
}
