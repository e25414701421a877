//! Persisted record types and their validation

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use blockfall_core::{GameConfig, Outcome, ReplayLog, SessionSummary};
use blockfall_types::{GameMode, MIN_START_LEVEL};

/// Seconds since the Unix epoch (0 if the clock is before it)
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    /// Session length in seconds
    pub time: u64,
    /// Unix seconds
    pub date: u64,
    #[serde(default)]
    pub mode: GameMode,
}

impl HighScoreEntry {
    pub fn from_summary(summary: &SessionSummary, date: u64) -> Self {
        Self {
            score: summary.score,
            lines: summary.lines,
            level: summary.level,
            time: summary.elapsed_secs(),
            date,
            mode: summary.mode,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.level < MIN_START_LEVEL {
            return Err(format!("level {} below {}", self.level, MIN_START_LEVEL));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeStats {
    pub total_games: u32,
    pub total_lines: u64,
    pub total_score: u64,
    /// Seconds
    pub total_play_time: u64,
    /// Locks per kind, indexed by `PieceKind::index`
    pub piece_stats: [u64; 7],
    pub highest_combo: u32,
    pub highest_back_to_back: u32,
    pub total_t_spins: u32,
    pub total_perfect_clears: u32,
    pub total_tetrises: u32,
    /// Seconds; sprint wins only
    pub fastest_sprint: Option<u64>,
    pub games_won: u32,
    pub games_lost: u32,
}

impl LifetimeStats {
    /// Fold one finished session into the totals
    pub fn record(&mut self, summary: &SessionSummary) {
        let m = &summary.metrics;
        self.total_games = self.total_games.saturating_add(1);
        self.total_lines = self.total_lines.saturating_add(summary.lines as u64);
        self.total_score = self.total_score.saturating_add(summary.score as u64);
        self.total_play_time = self.total_play_time.saturating_add(summary.elapsed_secs());
        for (total, count) in self.piece_stats.iter_mut().zip(m.piece_counts) {
            *total = total.saturating_add(count as u64);
        }
        self.highest_combo = self.highest_combo.max(m.max_combo);
        self.highest_back_to_back = self.highest_back_to_back.max(m.max_back_to_back);
        self.total_t_spins = self.total_t_spins.saturating_add(m.tspins);
        self.total_perfect_clears = self.total_perfect_clears.saturating_add(m.perfect_clears);
        self.total_tetrises = self.total_tetrises.saturating_add(m.tetrises);
        if let Some(secs) = summary.sprint_time_secs() {
            self.fastest_sprint = Some(self.fastest_sprint.map_or(secs, |best| best.min(secs)));
        }
        match summary.outcome {
            Outcome::Victory => self.games_won = self.games_won.saturating_add(1),
            Outcome::GameOver => self.games_lost = self.games_lost.saturating_add(1),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.games_won.checked_add(self.games_lost) {
            Some(results) if results <= self.total_games => {}
            Some(_) => return Err("more results than games".to_string()),
            None => return Err("result counters overflow".to_string()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Used for new sessions
    pub config: GameConfig,
    pub show_ghost: bool,
    pub show_grid_lines: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            show_ghost: true,
            show_grid_lines: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        self.config.validate().map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReplay {
    pub date: u64,
    pub log: ReplayLog,
}

impl StoredReplay {
    pub fn validate(&self) -> Result<(), String> {
        if self.log.seed().is_none() {
            return Err("replay without seed".to_string());
        }
        if self.log.tick_ms == 0 {
            return Err("replay with zero tick".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_core::SessionMetrics;
    use blockfall_types::PieceKind;

    fn summary(outcome: Outcome, mode: GameMode, elapsed_ms: u64) -> SessionSummary {
        let mut metrics = SessionMetrics::default();
        metrics.record_lock(PieceKind::T);
        metrics.tspins = 1;
        metrics.max_combo = 3;
        SessionSummary {
            outcome,
            mode,
            grid: Default::default(),
            seed: Some(1),
            score: 1200,
            lines: 12,
            level: 2,
            elapsed_ms,
            metrics,
        }
    }

    #[test]
    fn stats_accumulate() {
        let mut stats = LifetimeStats::default();
        stats.record(&summary(Outcome::GameOver, GameMode::Marathon, 90_500));
        stats.record(&summary(Outcome::Victory, GameMode::Sprint, 75_000));
        stats.record(&summary(Outcome::Victory, GameMode::Sprint, 61_000));

        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.total_score, 3600);
        assert_eq!(stats.total_play_time, 90 + 75 + 61);
        assert_eq!(stats.piece_stats[PieceKind::T.index()], 3);
        assert_eq!(stats.highest_combo, 3);
        assert_eq!(stats.total_t_spins, 3);
        assert_eq!(stats.fastest_sprint, Some(61));
        assert_eq!((stats.games_won, stats.games_lost), (2, 1));
        assert_eq!(stats.validate(), Ok(()));
    }

    #[test]
    fn lost_sprint_has_no_time() {
        let mut stats = LifetimeStats::default();
        stats.record(&summary(Outcome::GameOver, GameMode::Sprint, 30_000));
        assert_eq!(stats.fastest_sprint, None);
    }

    #[test]
    fn stats_json_field_names() {
        let json = serde_json::to_value(LifetimeStats::default()).unwrap();
        for field in [
            "totalGames",
            "totalPlayTime",
            "pieceStats",
            "highestBackToBack",
            "totalTSpins",
            "fastestSprint",
            "gamesLost",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn overflowing_result_counts_are_invalid() {
        let stats = LifetimeStats {
            total_games: u32::MAX,
            games_won: u32::MAX,
            games_lost: 1,
            ..LifetimeStats::default()
        };
        assert_eq!(stats.validate(), Err("result counters overflow".to_string()));
    }

    #[test]
    fn record_saturates_at_max() {
        let mut stats = LifetimeStats {
            total_games: u32::MAX,
            games_won: u32::MAX,
            total_score: u64::MAX,
            total_t_spins: u32::MAX,
            ..LifetimeStats::default()
        };
        stats.record(&summary(Outcome::Victory, GameMode::Marathon, 1_000));
        assert_eq!(stats.total_games, u32::MAX);
        assert_eq!(stats.games_won, u32::MAX);
        assert_eq!(stats.total_score, u64::MAX);
        assert_eq!(stats.total_t_spins, u32::MAX);
        assert_eq!(stats.total_lines, 12);
    }

    #[test]
    fn negative_values_do_not_parse() {
        let parsed: Result<HighScoreEntry, _> =
            serde_json::from_str(r#"{"score":-5,"lines":1,"level":1,"time":3,"date":0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn legacy_entry_defaults_to_marathon() {
        let entry: HighScoreEntry =
            serde_json::from_str(r#"{"score":5,"lines":1,"level":1,"time":3,"date":0}"#).unwrap();
        assert_eq!(entry.mode, GameMode::Marathon);
        let zero_level = HighScoreEntry { level: 0, ..entry };
        assert!(zero_level.validate().is_err());
    }
}
