use std::fs;
use std::time::Duration;

use blockfall::core::{GameConfig, GameEvent, GameSnapshot};
use blockfall::runtime::{spawn_session, ClockMode, Command, DriverOptions, Outbound, SessionHandle};
use blockfall::store::{FileStorage, MemoryStorage, Settings, Store};
use blockfall::types::{GameAction, GameMode, GameStatus, GridPreset, TICK_MS};

fn stepped() -> DriverOptions {
    DriverOptions {
        clock: ClockMode::Stepped,
        ..DriverOptions::default()
    }
}

async fn recv(session: &mut SessionHandle) -> Outbound {
    tokio::time::timeout(Duration::from_secs(2), session.recv())
        .await
        .expect("timeout waiting for outbound message")
        .expect("session closed")
}

/// Read until the next snapshot, collecting the events before it
async fn next_snapshot(session: &mut SessionHandle) -> (GameSnapshot, Vec<GameEvent>) {
    let mut events = Vec::new();
    loop {
        match recv(session).await {
            Outbound::Snapshot(s) => return (*s, events),
            Outbound::Event(e) => events.push(e),
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_stepped_session_only_moves_on_step() {
    let mut session = spawn_session::<MemoryStorage>(GameConfig::default().with_seed(3), stepped(), None);

    let (start, events) = next_snapshot(&mut session).await;
    assert_eq!(start.status, GameStatus::Running);
    assert_eq!(start.elapsed_ms, 0);
    assert!(matches!(events.as_slice(), [GameEvent::PieceDispensed { .. }]));

    tokio::time::sleep(Duration::from_millis(50)).await;
    session.send(Command::Snapshot).await.unwrap();
    let (idle, _) = next_snapshot(&mut session).await;
    assert_eq!(idle.elapsed_ms, 0);

    session.send(Command::Step(10)).await.unwrap();
    let (stepped, _) = next_snapshot(&mut session).await;
    assert_eq!(stepped.elapsed_ms, 10 * TICK_MS as u64);

    assert_eq!(session.shutdown().await.unwrap(), None);
}

#[tokio::test]
async fn test_actions_and_pause_through_channel() {
    let mut session = spawn_session::<MemoryStorage>(GameConfig::default().with_seed(8), stepped(), None);
    let (start, _) = next_snapshot(&mut session).await;
    let x0 = start.active.unwrap().x;

    session.send(Command::Action(GameAction::MoveLeft)).await.unwrap();
    let (moved, _) = next_snapshot(&mut session).await;
    assert_eq!(moved.active.unwrap().x, x0 - 1);

    session.send(Command::Pause).await.unwrap();
    let (paused, _) = next_snapshot(&mut session).await;
    assert_eq!(paused.status, GameStatus::Paused);

    session.send(Command::Step(50)).await.unwrap();
    let (still, _) = next_snapshot(&mut session).await;
    assert_eq!(still.elapsed_ms, 0);

    session.send(Command::Resume).await.unwrap();
    let (resumed, _) = next_snapshot(&mut session).await;
    assert_eq!(resumed.status, GameStatus::Running);

    session.send(Command::Action(GameAction::HardDrop)).await.unwrap();
    let (_, events) = next_snapshot(&mut session).await;
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::PieceLocked { .. })));

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_restart_with_new_config() {
    let mut session = spawn_session::<MemoryStorage>(GameConfig::default().with_seed(1), stepped(), None);
    next_snapshot(&mut session).await;
    session.send(Command::Step(30)).await.unwrap();
    next_snapshot(&mut session).await;

    let sprint = GameConfig {
        mode: GameMode::Sprint,
        ..GameConfig::default().with_seed(2)
    };
    session.send(Command::Restart(Some(sprint))).await.unwrap();
    let (fresh, _) = next_snapshot(&mut session).await;
    assert_eq!(fresh.mode, GameMode::Sprint);
    assert_eq!(fresh.elapsed_ms, 0);
    assert_eq!(fresh.lines_remaining, Some(40));

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_autoplayed_ultra_persists_to_disk() {
    let dir = std::env::temp_dir().join(format!("blockfall-runtime-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let config = GameConfig {
        mode: GameMode::Ultra,
        ultra_time_limit_secs: 3,
        ..GameConfig::default().with_seed(77)
    };
    let options = DriverOptions {
        autoplay: true,
        ..stepped()
    };
    let store = Store::new(FileStorage::new(&dir));
    let mut session = spawn_session(config, options, Some(store));
    next_snapshot(&mut session).await;

    session.send(Command::Step(1_000)).await.unwrap();
    let report = loop {
        if let Outbound::SessionEnded(report) = recv(&mut session).await {
            break report;
        }
    };
    assert_eq!(report.summary.elapsed_ms, 3_008);
    assert!(report.summary.metrics.pieces_placed > 0);
    assert_eq!(report.rank, Some(1));

    let final_report = session.shutdown().await.unwrap();
    assert_eq!(final_report.as_ref(), Some(report.as_ref()));

    let mut reopened = Store::new(FileStorage::new(&dir));
    assert_eq!(reopened.high_scores().len(), 1);
    assert_eq!(reopened.stats().games_won, 1);
    let replays = reopened.replays();
    assert_eq!(replays.len(), 1);
    assert_eq!(replays[0].log.metadata.score, report.summary.score);

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_realtime_clock_advances_by_itself() {
    let options = DriverOptions {
        snapshot_every: 5,
        ..DriverOptions::default()
    };
    let mut session = spawn_session::<MemoryStorage>(GameConfig::default().with_seed(4), options, None);
    next_snapshot(&mut session).await;

    let (later, _) = next_snapshot(&mut session).await;
    assert_eq!(later.elapsed_ms, 5 * TICK_MS as u64);

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_saved_settings_shape_new_session() {
    let mut store = Store::new(MemoryStorage::new());
    let settings = Settings {
        config: GameConfig {
            grid: GridPreset::Wide,
            next_count: 5,
            ..GameConfig::default()
        },
        ..Settings::default()
    };
    assert!(store.save_settings(&settings));

    let config = store.session_config().with_seed(12);
    let mut session = spawn_session(config, stepped(), Some(store));
    let (start, _) = next_snapshot(&mut session).await;
    assert_eq!(start.next_queue.len(), 5);
    assert_eq!(start.cols, GridPreset::Wide.cols());

    session.shutdown().await.unwrap();
}
