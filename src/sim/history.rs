/// Completion history per team and level, persisted as pretty JSON.
///
/// ## File format
///
/// ```json
/// { "teams": { "<team>": { "completed_levels": {
///     "<level>": [ { "time": 12.3, "points": 2, "timestamp": "2024-05-01T12:00:00.123" } ]
/// } } } }
/// ```
///
/// A missing file is an empty history; the file is only created by the
/// first recorded attempt. Each record is saved immediately.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history file {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Sink for level completions. The simulation calls this exactly once
/// per completed level.
pub trait HistoryRecorder {
    fn record_attempt(
        &mut self,
        team: &str,
        level: &str,
        elapsed_secs: f64,
        points: u32,
    ) -> Result<(), HistoryError>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub time: f64,
    pub points: u32,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    #[serde(default)]
    pub completed_levels: BTreeMap<String, Vec<Attempt>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    #[serde(default)]
    pub teams: BTreeMap<String, TeamRecord>,
}

#[derive(Debug)]
pub struct LevelHistory {
    /// `None` keeps the history in memory only.
    path: Option<PathBuf>,
    pub data: HistoryData,
}

impl LevelHistory {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|source| HistoryError::Json { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryData::default(),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };
        Ok(LevelHistory { path: Some(path), data })
    }

    pub fn in_memory() -> Self {
        LevelHistory { path: None, data: HistoryData::default() }
    }

    pub fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&self.data)
            .map_err(|source| HistoryError::Json { path: path.clone(), source })?;
        fs::write(path, text).map_err(|source| HistoryError::Io { path: path.clone(), source })
    }

    pub fn has_completed(&self, team: &str, level: &str) -> bool {
        self.data
            .teams
            .get(team)
            .map_or(false, |t| t.completed_levels.contains_key(level))
    }

    pub fn attempts(&self, team: &str, level: &str) -> &[Attempt] {
        self.data
            .teams
            .get(team)
            .and_then(|t| t.completed_levels.get(level))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn completed_levels(&self, team: &str) -> Vec<&str> {
        self.data
            .teams
            .get(team)
            .map(|t| t.completed_levels.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every attempt of every team, one row each.
    pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
        let mut rows = Vec::new();
        for (team, record) in &self.data.teams {
            for (level, attempts) in &record.completed_levels {
                for a in attempts {
                    rows.push(LeaderboardRow {
                        team: team.clone(),
                        level: level.clone(),
                        time: a.time,
                        points: a.points,
                        timestamp: a.timestamp.clone(),
                    });
                }
            }
        }
        rows
    }
}

impl HistoryRecorder for LevelHistory {
    fn record_attempt(
        &mut self,
        team: &str,
        level: &str,
        elapsed_secs: f64,
        points: u32,
    ) -> Result<(), HistoryError> {
        let timestamp = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();
        self.data
            .teams
            .entry(team.to_string())
            .or_default()
            .completed_levels
            .entry(level.to_string())
            .or_default()
            .push(Attempt { time: elapsed_secs, points, timestamp });
        self.save()
    }
}

// ══════════════════════════════════════════════════════════════
// Leaderboard
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardRow {
    pub team: String,
    pub level: String,
    pub time: f64,
    pub points: u32,
    pub timestamp: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SortKey {
    Team,
    Level,
    Time,
    Points,
    #[default]
    Timestamp,
}

impl SortKey {
    pub const ALL: [SortKey; 5] =
        [SortKey::Team, SortKey::Level, SortKey::Time, SortKey::Points, SortKey::Timestamp];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Team => "team",
            SortKey::Level => "level",
            SortKey::Time => "time",
            SortKey::Points => "points",
            SortKey::Timestamp => "timestamp",
        }
    }
}

/// Stable sort by one column. ISO timestamps sort correctly as text.
pub fn sort_leaderboard(rows: &mut [LeaderboardRow], key: SortKey, ascending: bool) {
    rows.sort_by(|a, b| {
        let ord = match key {
            SortKey::Team => a.team.cmp(&b.team),
            SortKey::Level => a.level.cmp(&b.level),
            SortKey::Time => a.time.total_cmp(&b.time),
            SortKey::Points => a.points.cmp(&b.points),
            SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
        };
        if ascending { ord } else { ord.reverse() }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_and_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let h = LevelHistory::open(&path).unwrap();
        assert!(h.data.teams.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn record_attempt_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut h = LevelHistory::open(&path).unwrap();
        h.record_attempt("TeamA", "Level1", 12.3, 100).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &saved["teams"]["TeamA"]["completed_levels"]["Level1"][0];
        assert_eq!(entry["time"], 12.3);
        assert_eq!(entry["points"], 100);
        assert!(entry["timestamp"].as_str().unwrap().contains('T'));

        let reopened = LevelHistory::open(&path).unwrap();
        assert_eq!(reopened.attempts("TeamA", "Level1").len(), 1);
    }

    #[test]
    fn has_completed_tracks_team_and_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = LevelHistory::open(dir.path().join("history.json")).unwrap();
        assert!(!h.has_completed("team", "level"));
        h.record_attempt("team", "level", 1.0, 1).unwrap();
        assert!(h.has_completed("team", "level"));
        assert!(!h.has_completed("team", "level2"));
        assert!(!h.has_completed("other", "level"));
        assert_eq!(h.completed_levels("team"), vec!["level"]);
        assert!(h.attempts("other", "level").is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(LevelHistory::open(&path), Err(HistoryError::Json { .. })));
    }

    #[test]
    fn in_memory_history_never_touches_disk() {
        let mut h = LevelHistory::in_memory();
        h.record_attempt("t", "l", 2.0, 3).unwrap();
        assert!(h.has_completed("t", "l"));
    }

    #[test]
    fn leaderboard_flattens_and_sorts() {
        let mut h = LevelHistory::in_memory();
        h.data.teams.entry("b".into()).or_default().completed_levels.insert(
            "L1".into(),
            vec![
                Attempt { time: 5.0, points: 1, timestamp: "2024-01-02T00:00:00".into() },
                Attempt { time: 3.0, points: 4, timestamp: "2024-01-01T00:00:00".into() },
            ],
        );
        h.data.teams.entry("a".into()).or_default().completed_levels.insert(
            "L2".into(),
            vec![Attempt { time: 9.0, points: 2, timestamp: "2024-01-03T00:00:00".into() }],
        );

        let mut rows = h.leaderboard();
        assert_eq!(rows.len(), 3);

        sort_leaderboard(&mut rows, SortKey::default(), false);
        assert_eq!(rows[0].timestamp, "2024-01-03T00:00:00");
        assert_eq!(rows[2].timestamp, "2024-01-01T00:00:00");

        sort_leaderboard(&mut rows, SortKey::Time, true);
        let times: Vec<f64> = rows.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![3.0, 5.0, 9.0]);

        sort_leaderboard(&mut rows, SortKey::Team, true);
        assert_eq!(rows[0].team, "a");
    }
}
