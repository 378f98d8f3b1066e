use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// A comparison about to be recorded.
#[derive(Debug, Clone)]
pub struct NewComparison {
    pub team1: String,
    pub team2: String,
    pub sport: String,
    pub predicted_winner: String,
    pub win_probability: f64,
    pub confidence_label: String,
    /// Full serialized report for later retrieval.
    pub result_json: String,
}

/// A stored comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub team1: String,
    pub team2: String,
    pub sport: String,
    pub predicted_winner: String,
    pub win_probability: f64,
    pub confidence_label: String,
    pub result_json: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only store of past comparisons. Best-effort from the engine's
/// perspective: a failed write is logged and dropped, never surfaced.
pub trait HistoryStore: Send + Sync {
    fn add(&self, record: &NewComparison) -> Result<i64>;
    /// Most recent entries, optionally filtered to comparisons involving a
    /// team (either side).
    fn recent(&self, limit: i64, team: Option<&str>) -> Result<Vec<HistoryEntry>>;
}

/// SQLite-backed history (single connection behind a mutex).
#[derive(Clone)]
pub struct SqliteHistory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistory {
    /// Open (or create) the database at the given path.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = SqliteHistory {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// In-memory database, for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteHistory {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

impl HistoryStore for SqliteHistory {
    fn add(&self, record: &NewComparison) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO comparisons (
                team1, team2, sport, predicted_winner,
                win_probability, confidence_label, result_json, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                record.team1,
                record.team2,
                record.sport,
                record.predicted_winner,
                record.win_probability,
                record.confidence_label,
                record.result_json,
                Utc::now(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn recent(&self, limit: i64, team: Option<&str>) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut entries = Vec::new();

        match team {
            Some(team) => {
                let mut stmt = conn.prepare(
                    "SELECT id, team1, team2, sport, predicted_winner,
                            win_probability, confidence_label, result_json, created_at
                     FROM comparisons
                     WHERE lower(team1) = lower(?1) OR lower(team2) = lower(?1)
                     ORDER BY created_at DESC LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![team, limit], map_entry)?;
                for row in rows {
                    entries.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, team1, team2, sport, predicted_winner,
                            win_probability, confidence_label, result_json, created_at
                     FROM comparisons ORDER BY created_at DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], map_entry)?;
                for row in rows {
                    entries.push(row?);
                }
            }
        }

        Ok(entries)
    }
}

fn map_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get(0)?,
        team1: row.get(1)?,
        team2: row.get(2)?,
        sport: row.get(3)?,
        predicted_winner: row.get(4)?,
        win_probability: row.get(5)?,
        confidence_label: row.get(6)?,
        result_json: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Idempotent schema.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS comparisons (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    team1            TEXT    NOT NULL,
    team2            TEXT    NOT NULL,
    sport            TEXT    NOT NULL,
    predicted_winner TEXT    NOT NULL,
    win_probability  REAL    NOT NULL,
    confidence_label TEXT    NOT NULL,
    result_json      TEXT    NOT NULL,
    created_at       TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comparisons_created ON comparisons(created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(team1: &str, team2: &str) -> NewComparison {
        NewComparison {
            team1: team1.to_string(),
            team2: team2.to_string(),
            sport: "basketball".to_string(),
            predicted_winner: team1.to_string(),
            win_probability: 0.62,
            confidence_label: "Medium".to_string(),
            result_json: "{}".to_string(),
        }
    }

    #[test]
    fn add_and_read_back() {
        let store = SqliteHistory::in_memory().unwrap();
        let id = store.add(&record("Boston Celtics", "Los Angeles Lakers")).unwrap();
        assert!(id > 0);

        let entries = store.recent(10, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].predicted_winner, "Boston Celtics");
        assert!((entries[0].win_probability - 0.62).abs() < 1e-9);
    }

    #[test]
    fn team_filter_matches_either_side_case_insensitively() {
        let store = SqliteHistory::in_memory().unwrap();
        store.add(&record("Boston Celtics", "Los Angeles Lakers")).unwrap();
        store.add(&record("Miami Heat", "Boston Celtics")).unwrap();
        store.add(&record("Denver Nuggets", "Phoenix Suns")).unwrap();

        let celtics = store.recent(10, Some("boston celtics")).unwrap();
        assert_eq!(celtics.len(), 2);

        let suns = store.recent(10, Some("Phoenix Suns")).unwrap();
        assert_eq!(suns.len(), 1);
    }

    #[test]
    fn limit_is_respected() {
        let store = SqliteHistory::in_memory().unwrap();
        for _ in 0..5 {
            store.add(&record("A", "B")).unwrap();
        }
        assert_eq!(store.recent(3, None).unwrap().len(), 3);
    }
}
