//! Headless blockfall runner (default binary).
//!
//! Sessions run on the stepped clock, so an autoplayed game takes as long
//! as the CPU needs rather than wall-clock time.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use blockfall::core::{play, GameConfig, GameEvent, GameSnapshot, ReplayLog};
use blockfall::runtime::{spawn_session, ClockMode, Command, DriverOptions, Outbound};
use blockfall::store::{FileStorage, Store, StoredReplay};
use blockfall::types::{GameMode, GridPreset};

/// Ticks per `Step` command while autoplaying
const STEP_CHUNK: u32 = 60;

#[derive(Parser, Debug)]
#[command(name = "blockfall", version, about = "Deterministic falling-block puzzle engine")]
struct Cli {
    /// Directory for scores, stats and replays (default: XDG data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Let the heuristic autoplayer run a session
    Autoplay {
        /// Defaults to the saved settings, then BLOCKFALL_MODE
        #[arg(long, value_parser = parse_mode)]
        mode: Option<GameMode>,
        #[arg(long, value_parser = parse_grid)]
        grid: Option<GridPreset>,
        #[arg(long)]
        start_level: Option<u32>,
        /// Bag seed; random when neither this nor BLOCKFALL_SEED is set
        #[arg(long)]
        seed: Option<u32>,
        /// Stop after this many locked pieces
        #[arg(long, default_value_t = 500)]
        pieces: u32,
        /// Do not persist the result
        #[arg(long)]
        no_save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Re-simulate a replay and check it against its recorded result
    Replay {
        /// Replay JSON file; omitted means a saved replay
        file: Option<PathBuf>,
        /// Which saved replay, newest first
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Print the high-score table
    Scores {
        #[arg(long)]
        json: bool,
    },
    /// Print lifetime statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn parse_mode(s: &str) -> Result<GameMode, String> {
    GameMode::from_str(s).ok_or_else(|| format!("unknown mode '{}'", s))
}

fn parse_grid(s: &str) -> Result<GridPreset, String> {
    GridPreset::from_str(s).ok_or_else(|| format!("unknown grid '{}'", s))
}

fn open_store(data_dir: Option<PathBuf>) -> Store<FileStorage> {
    match data_dir {
        Some(dir) => Store::new(FileStorage::new(dir)),
        None => Store::open_default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Cmd::Autoplay {
            mode,
            grid,
            start_level,
            seed,
            pieces,
            no_save,
            json,
        } => {
            let mut store = open_store(cli.data_dir);
            let base = store.session_config();
            let config = GameConfig {
                mode: mode.unwrap_or(base.mode),
                grid: grid.unwrap_or(base.grid),
                start_level: start_level.unwrap_or(base.start_level),
                seed: seed.or(base.seed),
                ..base
            };
            config.validate().context("invalid session config")?;
            // Already logged by the store
            store.take_warnings();
            let store = (!no_save).then_some(store);
            autoplay(config, store, pieces, json).await
        }
        Cmd::Replay { file, index } => {
            let log = match file {
                Some(path) => read_replay(&path)?,
                None => {
                    let mut store = open_store(cli.data_dir);
                    let replays = store.replays();
                    match replays.into_iter().nth(index) {
                        Some(stored) => stored.log,
                        None => bail!("no saved replay at index {}", index),
                    }
                }
            };
            verify_replay(&log)
        }
        Cmd::Scores { json } => {
            let mut store = open_store(cli.data_dir);
            let scores = store.high_scores();
            if json {
                println!("{}", serde_json::to_string_pretty(&scores)?);
            } else if scores.is_empty() {
                println!("no high scores yet");
            } else {
                for (i, e) in scores.iter().enumerate() {
                    println!(
                        "{:>2}. {:>8}  lines {:>4}  level {:>2}  {:>5}s  {}",
                        i + 1,
                        e.score,
                        e.lines,
                        e.level,
                        e.time,
                        e.mode.as_str()
                    );
                }
            }
            Ok(())
        }
        Cmd::Stats { json } => {
            let mut store = open_store(cli.data_dir);
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("games:        {}", stats.total_games);
                println!("won / lost:   {} / {}", stats.games_won, stats.games_lost);
                println!("lines:        {}", stats.total_lines);
                println!("score:        {}", stats.total_score);
                println!("play time:    {}s", stats.total_play_time);
                println!("best combo:   {}", stats.highest_combo);
                println!("best b2b:     {}", stats.highest_back_to_back);
                println!("t-spins:      {}", stats.total_t_spins);
                println!("tetrises:     {}", stats.total_tetrises);
                println!("perfect:      {}", stats.total_perfect_clears);
                match stats.fastest_sprint {
                    Some(secs) => println!("best sprint:  {}s", secs),
                    None => println!("best sprint:  -"),
                }
            }
            Ok(())
        }
    }
}

async fn autoplay(
    config: GameConfig,
    store: Option<Store<FileStorage>>,
    piece_limit: u32,
    json: bool,
) -> Result<()> {
    let options = DriverOptions {
        clock: ClockMode::Stepped,
        autoplay: true,
        ..DriverOptions::default()
    };
    let mut session = spawn_session(config, options, store);

    let mut locked = 0u32;
    let mut last: Option<GameSnapshot> = None;
    let mut ended = None;

    // Skip the snapshot sent when the session starts.
    while let Some(msg) = session.recv().await {
        if matches!(msg, Outbound::Snapshot(_)) {
            break;
        }
    }

    'outer: loop {
        session.send(Command::Step(STEP_CHUNK)).await?;
        // Every Step is answered by events and then one snapshot.
        loop {
            let Some(msg) = session.recv().await else {
                break 'outer;
            };
            match msg {
                Outbound::Event(GameEvent::PieceLocked { .. }) => locked += 1,
                Outbound::Event(_) => {}
                Outbound::Warning(w) => eprintln!("[Runner] warning: {}", w),
                Outbound::SessionEnded(report) => ended = Some(report),
                Outbound::Snapshot(snapshot) => {
                    let done = snapshot.status.is_terminal();
                    last = Some(*snapshot);
                    if done || ended.is_some() || locked >= piece_limit {
                        break 'outer;
                    }
                    break;
                }
            }
        }
    }

    let report = session.shutdown().await?;
    let report = report.or(ended.map(|r| *r));

    match (report, last) {
        (Some(report), _) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let s = &report.summary;
                let pace = s.pace();
                println!(
                    "[Runner] {:?}: score={} lines={} level={} time={}s pieces={}",
                    s.outcome,
                    s.score,
                    s.lines,
                    s.level,
                    s.elapsed_secs(),
                    s.metrics.pieces_placed
                );
                println!(
                    "[Runner] pps={:.2} apm={:.1} efficiency={:.1}%",
                    pace.pps, pace.apm, pace.efficiency
                );
                if let Some(rank) = report.rank {
                    println!("[Runner] new high score, rank {}", rank);
                }
            }
        }
        (None, Some(snapshot)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!(
                    "[Runner] stopped after {} pieces: score={} lines={} level={} time={}s",
                    locked,
                    snapshot.score,
                    snapshot.lines,
                    snapshot.level,
                    snapshot.elapsed_ms / 1000
                );
            }
        }
        (None, None) => bail!("session produced no output"),
    }
    Ok(())
}

fn read_replay(path: &Path) -> Result<ReplayLog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if let Ok(log) = serde_json::from_str::<ReplayLog>(&raw) {
        return Ok(log);
    }
    let stored: StoredReplay = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a replay", path.display()))?;
    Ok(stored.log)
}

fn verify_replay(log: &ReplayLog) -> Result<()> {
    let outcome = play(log).context("replay failed")?;
    println!(
        "[Runner] replayed {} inputs, {} pieces verified",
        log.inputs.len(),
        outcome.pieces_verified
    );
    println!(
        "[Runner] recorded: score={} lines={} level={}  replayed: score={} lines={} level={}",
        log.metadata.score,
        log.metadata.lines,
        log.metadata.level,
        outcome.score,
        outcome.lines,
        outcome.level
    );
    if !outcome.matches(&log.metadata) {
        bail!("replay does not reproduce the recorded result");
    }
    println!("[Runner] replay matches");
    Ok(())
}
