//! Session driver - the single task that owns and mutates a session.
//!
//! Commands and clock ticks are handled one at a time from one `select!`
//! loop. In `Realtime` mode a tokio interval drives the fixed tick step; in
//! `Stepped` mode the clock only moves on `Command::Step`.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use blockfall_core::{
    GameConfig, GameEvent, GameSnapshot, GameState, ReplayLog, ReplayRecorder, SessionSummary,
};
use blockfall_engine::Autoplayer;
use blockfall_store::{LifetimeStats, Storage, Store};
use blockfall_types::{GameAction, TICK_MS};

/// Command delivered to the session task.
#[derive(Debug, Clone)]
pub enum Command {
    Action(GameAction),
    Pause,
    Resume,
    /// Start a new session, optionally with a different config
    Restart(Option<GameConfig>),
    /// Advance `n` ticks (stepped clock)
    Step(u32),
    /// Ask for a snapshot now
    Snapshot,
    Shutdown,
}

/// Message from the session task to the presentation side.
#[derive(Debug, Clone)]
pub enum Outbound {
    Snapshot(Box<GameSnapshot>),
    Event(GameEvent),
    /// Non-fatal problem (persistence, replay recording)
    Warning(String),
    SessionEnded(Box<SessionReport>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    #[default]
    Realtime,
    Stepped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    pub clock: ClockMode,
    pub tick_ms: u32,
    /// Record a replay log; unseeded configs get a generated seed
    pub record_replay: bool,
    /// Let the heuristic autoplayer place every piece
    pub autoplay: bool,
    /// Realtime: emit a snapshot every this many ticks (0 = never)
    pub snapshot_every: u32,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            clock: ClockMode::Realtime,
            tick_ms: TICK_MS,
            record_replay: true,
            autoplay: false,
            snapshot_every: 1,
        }
    }
}

/// Result of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub summary: SessionSummary,
    /// High-score rank, when persisted and placed
    pub rank: Option<usize>,
    pub stats: Option<LifetimeStats>,
    pub replay: Option<ReplayLog>,
}

/// Whether the driver keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct SessionDriver<S: Storage> {
    game: GameState,
    /// Config as requested; an unseeded one is reseeded on every restart
    base_config: GameConfig,
    options: DriverOptions,
    store: Option<Store<S>>,
    recorder: Option<ReplayRecorder>,
    pilot: Option<Autoplayer>,
    out: mpsc::UnboundedSender<Outbound>,
    ticks: u64,
    last_report: Option<SessionReport>,
}

impl<S: Storage> SessionDriver<S> {
    pub fn new(
        config: GameConfig,
        options: DriverOptions,
        store: Option<Store<S>>,
        out: mpsc::UnboundedSender<Outbound>,
    ) -> Self {
        let mut driver = Self {
            game: GameState::new(config),
            base_config: config,
            options,
            store,
            recorder: None,
            pilot: options.autoplay.then(Autoplayer::default),
            out,
            ticks: 0,
            last_report: None,
        };
        driver.begin(config);
        driver
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Report of the most recently finished session
    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    fn send(&self, msg: Outbound) {
        // A closed receiver only means nobody is watching.
        let _ = self.out.send(msg);
    }

    fn warn(&self, message: String) {
        eprintln!("[Runtime] {}", message);
        self.send(Outbound::Warning(message));
    }

    fn begin(&mut self, config: GameConfig) {
        let config = if self.options.record_replay && config.seed.is_none() {
            config.with_seed(rand::random())
        } else {
            config
        };

        self.game = GameState::new(config);
        self.recorder = None;
        if self.options.record_replay {
            match ReplayRecorder::with_tick(self.game.config(), self.options.tick_ms) {
                Ok(recorder) => self.recorder = Some(recorder),
                Err(e) => self.warn(format!("replay recording disabled: {}", e)),
            }
        }
        self.game.start();
        println!(
            "[Runtime] session started: mode={} grid={} seed={:?}",
            config.mode.as_str(),
            config.grid.as_str(),
            config.seed
        );
        self.flush();
        self.emit_snapshot();
    }

    fn emit_snapshot(&self) {
        self.send(Outbound::Snapshot(Box::new(self.game.snapshot())));
    }

    fn apply(&mut self, action: GameAction) -> bool {
        let applied = self.game.apply_action(action);
        if applied {
            if let Some(recorder) = &mut self.recorder {
                recorder.record_input(self.game.elapsed_ms(), action);
            }
        }
        self.flush();
        applied
    }

    /// Forward queued game events; persist on the terminal one
    fn flush(&mut self) {
        let events = self.game.take_events();
        if let Some(recorder) = &mut self.recorder {
            recorder.observe(&events);
        }
        for event in events {
            let ended = event.summary().cloned();
            self.send(Outbound::Event(event));
            if let Some(summary) = ended {
                self.finish(summary);
            }
        }
    }

    fn finish(&mut self, summary: SessionSummary) {
        let replay = self.recorder.take().map(|r| r.finish(&summary));
        println!(
            "[Runtime] session ended: {:?} score={} lines={} level={} time={}s",
            summary.outcome,
            summary.score,
            summary.lines,
            summary.level,
            summary.elapsed_secs()
        );

        let mut report = SessionReport {
            summary,
            rank: None,
            stats: None,
            replay,
        };
        let mut warnings = Vec::new();
        if let Some(store) = &mut self.store {
            let record = store.record_session(&report.summary, report.replay.clone());
            report.rank = record.rank;
            report.stats = Some(record.stats);
            warnings = store.take_warnings();
        }
        for warning in warnings {
            self.send(Outbound::Warning(warning));
        }

        self.last_report = Some(report.clone());
        self.send(Outbound::SessionEnded(Box::new(report)));
    }

    /// One fixed clock step, autoplayer first
    fn step(&mut self) {
        let planned = match &mut self.pilot {
            Some(pilot) => pilot.next_actions(&self.game),
            None => None,
        };
        for action in planned.unwrap_or_default() {
            if !self.apply(action) {
                break;
            }
        }
        self.game.tick(self.options.tick_ms);
        self.ticks += 1;
        self.flush();
    }

    /// Apply one command synchronously
    pub fn handle(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Action(action) => {
                self.apply(action);
                self.emit_snapshot();
            }
            Command::Pause => {
                self.game.pause();
                self.emit_snapshot();
            }
            Command::Resume => {
                self.game.resume();
                self.emit_snapshot();
            }
            Command::Restart(config) => {
                if let Some(config) = config {
                    self.base_config = config;
                }
                self.begin(self.base_config);
            }
            Command::Step(n) => {
                for _ in 0..n {
                    if self.game.is_terminal() {
                        break;
                    }
                    self.step();
                }
                self.emit_snapshot();
            }
            Command::Snapshot => self.emit_snapshot(),
            Command::Shutdown => return Flow::Stop,
        }
        Flow::Continue
    }

    /// Process commands (and realtime ticks) until shutdown or until every
    /// command sender is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Option<SessionReport> {
        let period = Duration::from_millis(self.options.tick_ms.max(1) as u64);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let realtime = self.options.clock == ClockMode::Realtime;

        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle(cmd) == Flow::Stop {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ticker.tick(), if realtime => {
                    if self.game.is_terminal() || self.game.paused() {
                        continue;
                    }
                    self.step();
                    let every = self.options.snapshot_every as u64;
                    if every > 0 && self.ticks % every == 0 {
                        self.emit_snapshot();
                    }
                }
            }
        }

        println!("[Runtime] driver stopped after {} ticks", self.ticks);
        self.last_report
    }
}
