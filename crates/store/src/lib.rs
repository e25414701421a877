//! Best-effort persistence: high scores, lifetime stats, settings, replays
//!
//! Nothing here is fatal to a session. Read failures and malformed or
//! out-of-range data fall back to defaults, failed writes are reported as
//! `false`; both are logged and kept as warnings for the caller to surface.

pub mod records;
pub mod storage;

use serde::de::DeserializeOwned;
use serde::Serialize;

use blockfall_core::{GameConfig, ReplayLog, SessionSummary};
use blockfall_types::{GameMode, MAX_HIGH_SCORES, MAX_REPLAYS};

pub use records::{unix_now, HighScoreEntry, LifetimeStats, Settings, StoredReplay};
pub use storage::{default_data_dir, FileStorage, MemoryStorage, Storage, StoreError};

pub const HIGH_SCORES_KEY: &str = "high_scores";
pub const STATS_KEY: &str = "stats";
pub const SETTINGS_KEY: &str = "settings";
pub const REPLAYS_KEY: &str = "replays";

/// What [`Store::record_session`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// 1-based position in the high-score table, if the score made it
    pub rank: Option<usize>,
    pub stats: LifetimeStats,
    pub saved: bool,
}

#[derive(Debug)]
pub struct Store<S: Storage> {
    storage: S,
    warnings: Vec<String>,
}

impl<S: Storage> Store<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            warnings: Vec::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Drain warnings collected since the last call
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, err: StoreError) {
        let message = err.to_string();
        eprintln!("[Store] {}", message);
        self.warnings.push(message);
    }

    fn try_load<T: DeserializeOwned>(
        &self,
        key: &str,
        validate: impl Fn(&T) -> Result<(), String>,
    ) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        let value: T = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            key: key.to_string(),
            source,
        })?;
        validate(&value).map_err(|reason| StoreError::Invalid {
            key: key.to_string(),
            reason,
        })?;
        Ok(Some(value))
    }

    /// Stored value, or `default` when missing or unusable
    fn load_or<T: DeserializeOwned>(
        &mut self,
        key: &str,
        default: T,
        validate: impl Fn(&T) -> Result<(), String>,
    ) -> T {
        match self.try_load(key, validate) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                self.warn(err);
                default
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(|source| StoreError::Parse {
                key: key.to_string(),
                source,
            })
            .and_then(|json| self.storage.set(key, &json));
        match result {
            Ok(()) => true,
            Err(err) => {
                self.warn(err);
                false
            }
        }
    }

    /// Top scores, highest first
    pub fn high_scores(&mut self) -> Vec<HighScoreEntry> {
        let mut scores = self.load_or(HIGH_SCORES_KEY, Vec::new(), |scores: &Vec<HighScoreEntry>| {
            scores.iter().try_for_each(HighScoreEntry::validate)
        });
        // Stable, so equal scores keep their stored order
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores.truncate(MAX_HIGH_SCORES);
        scores
    }

    /// Insert into the table; returns the 1-based rank when it stays in the
    /// top ten. Ties keep the older entry ahead.
    pub fn record_high_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let mut scores = self.high_scores();
        let pos = scores
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(scores.len());
        if pos >= MAX_HIGH_SCORES {
            return None;
        }
        scores.insert(pos, entry);
        scores.truncate(MAX_HIGH_SCORES);
        self.save(HIGH_SCORES_KEY, &scores);
        Some(pos + 1)
    }

    pub fn best_for_mode(&mut self, mode: GameMode) -> Option<HighScoreEntry> {
        self.high_scores().into_iter().find(|e| e.mode == mode)
    }

    pub fn stats(&mut self) -> LifetimeStats {
        self.load_or(STATS_KEY, LifetimeStats::default(), LifetimeStats::validate)
    }

    pub fn settings(&mut self) -> Settings {
        self.load_or(SETTINGS_KEY, Settings::default(), Settings::validate)
    }

    pub fn save_settings(&mut self, settings: &Settings) -> bool {
        self.save(SETTINGS_KEY, settings)
    }

    /// Config for a new session: saved settings, then `BLOCKFALL_*`
    /// environment overrides. Command-line flags go on top of this.
    pub fn session_config(&mut self) -> GameConfig {
        self.settings().config.with_env()
    }

    /// Saved replays, newest first
    pub fn replays(&mut self) -> Vec<StoredReplay> {
        self.load_or(REPLAYS_KEY, Vec::new(), |replays: &Vec<StoredReplay>| {
            replays.iter().try_for_each(StoredReplay::validate)
        })
    }

    pub fn save_replay(&mut self, log: ReplayLog) -> bool {
        let mut replays = self.replays();
        replays.insert(
            0,
            StoredReplay {
                date: unix_now(),
                log,
            },
        );
        replays.truncate(MAX_REPLAYS);
        self.save(REPLAYS_KEY, &replays)
    }

    /// Persist everything a finished session produces
    pub fn record_session(
        &mut self,
        summary: &SessionSummary,
        replay: Option<ReplayLog>,
    ) -> SessionRecord {
        let rank = self.record_high_score(HighScoreEntry::from_summary(summary, unix_now()));

        let mut stats = self.stats();
        stats.record(summary);
        let mut saved = self.save(STATS_KEY, &stats);

        if let Some(log) = replay {
            saved &= self.save_replay(log);
        }
        SessionRecord { rank, stats, saved }
    }

    pub fn clear_all(&mut self) -> bool {
        let mut ok = true;
        for key in [HIGH_SCORES_KEY, STATS_KEY, SETTINGS_KEY, REPLAYS_KEY] {
            if let Err(err) = self.storage.remove(key) {
                self.warn(err);
                ok = false;
            }
        }
        ok
    }
}

impl Store<FileStorage> {
    /// Store rooted at the default data directory
    pub fn open_default() -> Self {
        Self::new(FileStorage::from_env())
    }
}
