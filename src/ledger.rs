use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::app_dirs::AppDirs;
use crate::game::Completion;
use crate::scoring;

/// Storage namespace every record is written under
pub const SCORES_NAMESPACE: &str = "cookfinity-scores";
pub const ANONYMOUS_PLAYER: &str = "Anonymous Chef";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[strum(serialize = "easy")]
    Easy,
    #[default]
    #[strum(serialize = "medium")]
    Medium,
    #[strum(serialize = "hard")]
    Hard,
    #[strum(serialize = "expert")]
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(label.trim()))
    }
}

/// One finished session as kept on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: String,
    pub player_name: String,
    pub recipe_id: u64,
    pub recipe_title: String,
    pub score: u64,
    pub time_secs: u64,
    pub accuracy: u8,
    pub completion_rate: u8,
    pub completed_at: DateTime<Local>,
    pub difficulty: Difficulty,
}

impl ScoreRecord {
    pub fn from_completion(
        player_name: &str,
        recipe_id: u64,
        recipe_title: &str,
        completion: &Completion,
        difficulty: Difficulty,
        completed_at: DateTime<Local>,
    ) -> Self {
        let player_name = match player_name.trim() {
            "" => ANONYMOUS_PLAYER.to_string(),
            name => name.to_string(),
        };
        Self {
            id: format!("{}-{}", recipe_id, completed_at.timestamp_millis()),
            player_name,
            recipe_id,
            recipe_title: recipe_title.to_string(),
            score: completion.final_score,
            time_secs: completion.elapsed_secs,
            accuracy: scoring::accuracy(completion.final_score),
            completion_rate: 100,
            completed_at,
            difficulty,
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("score database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cannot prepare score database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt score record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Append-only store of score records
pub trait ScoreLedger {
    fn append(&mut self, record: &ScoreRecord) -> Result<(), LedgerError>;
    /// All records in insertion order
    fn read_all(&self) -> Result<Vec<ScoreRecord>, LedgerError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    records: Vec<ScoreRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreLedger for MemoryLedger {
    fn append(&mut self, record: &ScoreRecord) -> Result<(), LedgerError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.records.clone())
    }
}

#[derive(Debug)]
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Opens the database under the local state directory
    pub fn open_default() -> Result<Self, LedgerError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("cookfinity_scores.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening score database");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                namespace TEXT NOT NULL,
                id TEXT NOT NULL,
                player_name TEXT NOT NULL,
                recipe_id INTEGER NOT NULL,
                recipe_title TEXT NOT NULL,
                score INTEGER NOT NULL,
                time_secs INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                completion_rate INTEGER NOT NULL,
                completed_at TEXT NOT NULL,
                difficulty TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_namespace ON scores(namespace)",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl ScoreLedger for SqliteLedger {
    fn append(&mut self, record: &ScoreRecord) -> Result<(), LedgerError> {
        self.conn.execute(
            r#"
            INSERT INTO scores
            (namespace, id, player_name, recipe_id, recipe_title, score, time_secs,
             accuracy, completion_rate, completed_at, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                SCORES_NAMESPACE,
                record.id,
                record.player_name,
                record.recipe_id,
                record.recipe_title,
                record.score,
                record.time_secs,
                record.accuracy,
                record.completion_rate,
                record.completed_at.to_rfc3339(),
                record.difficulty.to_string(),
            ],
        )?;
        debug!(id = %record.id, score = record.score, "score recorded");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, player_name, recipe_id, recipe_title, score, time_secs,
                   accuracy, completion_rate, completed_at, difficulty
            FROM scores
            WHERE namespace = ?1
            ORDER BY seq
            "#,
        )?;

        let rows = stmt.query_map([SCORES_NAMESPACE], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u64>(4)?,
                row.get::<_, u64>(5)?,
                row.get::<_, u8>(6)?,
                row.get::<_, u8>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (
                id,
                player_name,
                recipe_id,
                recipe_title,
                score,
                time_secs,
                accuracy,
                completion_rate,
                completed_at,
                difficulty,
            ) = row?;

            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| LedgerError::Corrupt {
                    id: id.clone(),
                    reason: e.to_string(),
                })?
                .with_timezone(&Local);
            let difficulty =
                Difficulty::from_label(&difficulty).ok_or_else(|| LedgerError::Corrupt {
                    id: id.clone(),
                    reason: format!("unknown difficulty {difficulty:?}"),
                })?;

            records.push(ScoreRecord {
                id,
                player_name,
                recipe_id,
                recipe_title,
                score,
                time_secs,
                accuracy,
                completion_rate,
                completed_at,
                difficulty,
            });
        }
        Ok(records)
    }
}
