//! Integration tests - whole sessions driven through the public API

use blockfall::core::scoring::calculate_score;
use blockfall::core::{Board, GameConfig, GameEvent, GameState, Outcome, PieceQueue};
use blockfall::types::{
    GameAction, GameMode, GameStatus, PieceKind, TSpinKind, LINE_CLEAR_DELAY_MS, TICK_MS,
};

/// Standard board: bottom row full except columns 3..=6, plus one block
/// above so a clear never empties the board
fn single_setup() -> Board {
    let mut rows = vec![".........."; 18];
    rows.push("J.........");
    rows.push("JJJ....JJJ");
    Board::from_ascii(&rows)
}

/// First seed (from `config`'s mode and grid) whose first piece is an I
fn started_with_i(config: GameConfig, board: Board) -> GameState {
    (1..500)
        .map(|seed| {
            let mut gs = GameState::new(config.with_seed(seed)).with_board(board.clone());
            gs.start();
            gs
        })
        .find(|gs| gs.active().map(|a| a.kind) == Some(PieceKind::I))
        .expect("some seed deals an I first")
}

#[test]
fn test_complete_game_flow() {
    let mut game = GameState::seeded(12345);
    assert_eq!(game.status(), GameStatus::Idle);
    assert!(!game.apply_action(GameAction::MoveLeft));

    assert!(game.start());
    assert_eq!(game.status(), GameStatus::Running);
    assert!(game.active().is_some());
    assert!(!game.start());

    game.apply_action(GameAction::MoveLeft);
    game.apply_action(GameAction::RotateRight);
    assert!(game.apply_action(GameAction::HardDrop));

    // Hard drop locks and the next piece is in play at once
    assert!(game.active().is_some());
    assert_eq!(game.metrics().pieces_placed, 1);
    assert!(game.score() > 0);
}

#[test]
fn test_same_seed_same_session() {
    let script = [
        GameAction::MoveLeft,
        GameAction::RotateRight,
        GameAction::HardDrop,
        GameAction::Hold,
        GameAction::MoveRight,
        GameAction::MoveRight,
        GameAction::HardDrop,
        GameAction::RotateLeft,
        GameAction::SoftDrop,
    ];

    let run = || {
        let mut game = GameState::seeded(777);
        game.start();
        for (i, &action) in script.iter().cycle().take(90).enumerate() {
            game.apply_action(action);
            for _ in 0..(i % 5) {
                game.tick(TICK_MS);
            }
        }
        (game.snapshot(), game.take_events())
    };

    let (a, events_a) = run();
    let (b, events_b) = run();
    assert_eq!(a, b);
    assert_eq!(events_a, events_b);
}

#[test]
fn test_bag_deals_every_kind_per_seven() {
    let mut queue = PieceQueue::seeded(99, 2);
    for _ in 0..10 {
        let mut bag: Vec<PieceKind> = (0..7).map(|_| queue.draw()).collect();
        bag.sort_by_key(|k| k.index());
        assert_eq!(bag, PieceKind::ALL.to_vec());
    }
}

#[test]
fn test_single_line_clear_waits_then_scores() {
    let mut game = started_with_i(GameConfig::default(), single_setup());
    assert!(game.hard_drop());

    let after_drop = game.score();
    assert_eq!(after_drop, 19 * 2);
    assert_eq!(game.snapshot().clearing_rows, vec![19]);
    assert!(!game.apply_action(GameAction::MoveLeft));

    game.tick(LINE_CLEAR_DELAY_MS - 1);
    assert!(game.pending_clear().is_some());
    assert_eq!(game.lines(), 0);

    game.tick(1);
    assert!(game.pending_clear().is_none());
    assert_eq!(game.score() - after_drop, 100);
    assert_eq!(game.lines(), 1);
    assert_eq!(game.combo(), 1);
    assert_eq!(game.back_to_back(), 0);
    assert!(game.active().is_some());

    let cleared: Vec<_> = game
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::LinesCleared(report) => Some(report),
            _ => None,
        })
        .collect();
    assert_eq!(cleared.len(), 1);
    assert_eq!(cleared[0].rows, vec![19]);
    assert_eq!(cleared[0].label, "Single");
    assert!(!cleared[0].perfect_clear);
}

#[test]
fn test_combo_bonus_progression() {
    let first = calculate_score(1, 1, TSpinKind::None, 0, 0, false);
    let second = calculate_score(1, 1, TSpinKind::None, 1, 0, false);
    let third = calculate_score(1, 1, TSpinKind::None, 2, 0, false);
    assert_eq!(
        [first.combo_bonus, second.combo_bonus, third.combo_bonus],
        [0, 50, 100]
    );
    assert_eq!([first.total, second.total, third.total], [100, 150, 200]);

    // Level multiplies both parts
    let level_three = calculate_score(2, 3, TSpinKind::None, 2, 0, false);
    assert_eq!(level_three.total, 300 * 3 + 2 * 50 * 3);
}

#[test]
fn test_back_to_back_chain() {
    let tetris = calculate_score(4, 1, TSpinKind::None, 0, 0, false);
    assert_eq!(tetris.total, 800);
    assert!(tetris.qualifies_for_b2b);

    let b2b_tetris = calculate_score(4, 1, TSpinKind::None, 0, 1, false);
    assert_eq!(b2b_tetris.base_points, 1200);
    assert!(b2b_tetris.b2b_applied);

    let b2b_tspin_double = calculate_score(2, 1, TSpinKind::Normal, 0, 1, false);
    assert_eq!(b2b_tspin_double.base_points, 1800);

    // An ordinary clear breaks the chain
    let single = calculate_score(1, 1, TSpinKind::None, 0, 3, false);
    assert!(!single.qualifies_for_b2b);
    assert!(!single.b2b_applied);
}

#[test]
fn test_hold_flow() {
    let mut game = GameState::seeded(4242);
    game.start();
    let first = game.active().unwrap().kind;
    let upcoming = game.next_queue()[0];

    assert!(game.apply_action(GameAction::Hold));
    assert_eq!(game.hold_piece(), Some(first));
    assert_eq!(game.active().unwrap().kind, upcoming);
    assert!(!game.can_hold());
    assert!(!game.apply_action(GameAction::Hold));

    game.apply_action(GameAction::HardDrop);
    assert!(game.can_hold());

    assert!(game.apply_action(GameAction::Hold));
    let active = game.active().unwrap();
    assert_eq!(active.kind, first);
    assert_eq!(active.y, 0);
    assert_eq!(game.metrics().holds, 2);
}

#[test]
fn test_gravity_by_start_level() {
    let config = GameConfig {
        start_level: 5,
        ..GameConfig::default().with_seed(3)
    };
    let mut game = GameState::new(config);
    game.start();
    assert_eq!(game.level(), 5);
    assert_eq!(game.drop_interval_ms(), 750);

    let y0 = game.active().unwrap().y;
    game.tick(750);
    assert_eq!(game.active().unwrap().y, y0);
    game.tick(1);
    assert_eq!(game.active().unwrap().y, y0 + 1);
}

#[test]
fn test_sprint_victory_on_goal() {
    let config = GameConfig {
        mode: GameMode::Sprint,
        sprint_goal: 1,
        ..GameConfig::default()
    };
    let mut game = started_with_i(config, single_setup());
    assert_eq!(game.lines_remaining(), Some(1));

    game.hard_drop();
    game.tick(LINE_CLEAR_DELAY_MS);
    assert_eq!(game.status(), GameStatus::Victory);
    assert_eq!(game.lines_remaining(), Some(0));
    assert!(game.active().is_none());

    let summary = game.summary().expect("victory summary");
    assert_eq!(summary.outcome, Outcome::Victory);
    assert_eq!(summary.lines, 1);
    assert_eq!(summary.sprint_time_secs(), Some(0));

    let ends = game
        .take_events()
        .iter()
        .filter(|e| e.summary().is_some())
        .count();
    assert_eq!(ends, 1);
    assert!(!game.apply_action(GameAction::HardDrop));
}

#[test]
fn test_ultra_runs_out_of_time() {
    let config = GameConfig {
        mode: GameMode::Ultra,
        ultra_time_limit_secs: 2,
        ..GameConfig::default().with_seed(8)
    };
    let mut game = GameState::new(config);
    game.start();
    assert_eq!(game.time_remaining_ms(), Some(2000));

    while !game.is_terminal() {
        game.tick(TICK_MS);
    }
    assert_eq!(game.status(), GameStatus::Victory);
    assert_eq!(game.elapsed_ms(), 2000);
    assert_eq!(game.time_remaining_ms(), Some(0));
    assert_eq!(game.summary().map(|s| s.outcome), Some(Outcome::Victory));
}

#[test]
fn test_marathon_ends_in_game_over() {
    let mut game = GameState::seeded(5);
    game.start();

    let mut drops = 0;
    while !game.is_terminal() && drops < 500 {
        game.apply_action(GameAction::HardDrop);
        if game.pending_clear().is_some() {
            game.tick(LINE_CLEAR_DELAY_MS);
        }
        drops += 1;
    }
    assert_eq!(game.status(), GameStatus::GameOver);

    let summary = game.summary().cloned().expect("game over summary");
    assert_eq!(summary.outcome, Outcome::GameOver);
    assert_eq!(summary.mode, GameMode::Marathon);
    assert_eq!(summary.seed, Some(5));
    assert_eq!(summary.metrics.hard_drops, summary.metrics.pieces_placed);

    let before = game.snapshot();
    game.tick(10_000);
    assert!(!game.toggle_pause());
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_pause_freezes_everything() {
    let mut game = GameState::seeded(21);
    game.start();
    game.tick(100);

    assert!(game.apply_action(GameAction::Pause));
    assert!(game.paused());
    let frozen = game.snapshot();
    game.tick(5_000);
    assert!(!game.apply_action(GameAction::MoveLeft));
    assert_eq!(game.snapshot(), frozen);

    assert!(game.apply_action(GameAction::Pause));
    assert_eq!(game.status(), GameStatus::Running);
    game.tick(16);
    assert_eq!(game.elapsed_ms(), 116);
}

#[test]
fn test_frame_clock_ignores_pause_gap() {
    let mut game = GameState::seeded(2);
    game.start();
    game.frame(10_000);
    game.frame(10_016);
    assert_eq!(game.elapsed_ms(), 16);

    game.pause();
    game.resume();
    game.frame(60_000);
    game.frame(60_032);
    assert_eq!(game.elapsed_ms(), 48);
}

#[test]
fn test_grid_presets_spawn_centred() {
    for (grid, x) in [
        (blockfall::types::GridPreset::Wide, 10),
        (blockfall::types::GridPreset::Mini, 2),
    ] {
        let config = GameConfig {
            grid,
            ..GameConfig::default()
        };
        let game = started_with_i(config, Board::from_preset(grid));
        assert_eq!(game.active().unwrap().x, x);
        assert_eq!(game.snapshot().cols, grid.cols());
    }
}

#[test]
fn test_snapshot_json_shape() {
    let mut game = GameState::seeded(1);
    game.start();
    let json = serde_json::to_value(game.snapshot()).unwrap();
    for key in [
        "rows",
        "cols",
        "board",
        "active",
        "ghostY",
        "nextQueue",
        "canHold",
        "clearingRows",
        "backToBack",
        "timers",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["board"].as_array().map(|b| b.len()), Some(200));
}

#[test]
fn test_sprint_forty_lines_with_autoplayer() {
    use blockfall::engine::Autoplayer;

    let config = GameConfig {
        mode: GameMode::Sprint,
        ..GameConfig::default().with_seed(2718)
    };
    let mut game = GameState::new(config);
    game.start();
    let mut bot = Autoplayer::default();
    let mut events = Vec::new();

    let mut guard = 0;
    while !game.is_terminal() && guard < 50_000 {
        guard += 1;
        if let Some(actions) = bot.next_actions(&game) {
            for action in actions {
                game.apply_action(action);
            }
        }
        game.tick(TICK_MS);
        events.extend(game.take_events());
    }

    assert_eq!(game.status(), GameStatus::Victory);
    assert!(game.lines() >= 40);

    let victory_at = events
        .iter()
        .position(|e| matches!(e, GameEvent::Victory(_)))
        .expect("victory event");
    assert_eq!(events.iter().filter(|e| e.summary().is_some()).count(), 1);
    assert!(!events[victory_at..]
        .iter()
        .any(|e| matches!(e, GameEvent::PieceLocked { .. })));

    // Frozen afterwards
    assert!(!game.apply_action(GameAction::HardDrop));
    game.tick(1_000);
    assert!(game.take_events().is_empty());
}

#[test]
fn test_score_never_decreases() {
    use blockfall::engine::Autoplayer;

    let config = GameConfig {
        mode: GameMode::Ultra,
        ultra_time_limit_secs: 30,
        ..GameConfig::default().with_seed(555)
    };
    let mut game = GameState::new(config);
    game.start();
    let mut bot = Autoplayer::default();

    let mut last = game.score();
    let mut guard = 0;
    while !game.is_terminal() && guard < 50_000 {
        guard += 1;
        if let Some(actions) = bot.next_actions(&game) {
            for action in actions {
                game.apply_action(action);
                assert!(game.score() >= last, "score dropped after {:?}", action);
                last = game.score();
            }
        }
        game.tick(TICK_MS);
        assert!(game.score() >= last, "score dropped on tick");
        last = game.score();
    }

    assert!(game.is_terminal());
    assert!(game.lines() > 0);
}
