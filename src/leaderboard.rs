//! Ranked, filterable view over the seed scores plus the player's ledger.

use std::io::Write;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serde::Serialize;
use time_humanize::{Accuracy, HumanTime, Tense};
use tracing::debug;

use crate::ledger::{Difficulty, LedgerError, ScoreLedger, ScoreRecord};
use crate::util::{mean, truncate_to_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    /// all -> easy -> medium -> hard -> expert -> all
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Only(Difficulty::Easy),
            Self::Only(Difficulty::Easy) => Self::Only(Difficulty::Medium),
            Self::Only(Difficulty::Medium) => Self::Only(Difficulty::Hard),
            Self::Only(Difficulty::Hard) => Self::Only(Difficulty::Expert),
            Self::Only(Difficulty::Expert) => Self::All,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Only(d) => d.to_string(),
        }
    }

    pub fn matches(&self, record: &ScoreRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(d) => record.difficulty == *d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum TimeWindow {
    #[default]
    #[strum(serialize = "all-time")]
    AllTime,
    #[strum(serialize = "month")]
    Month,
    #[strum(serialize = "week")]
    Week,
    #[strum(serialize = "today")]
    Today,
}

impl TimeWindow {
    pub fn next(self) -> Self {
        match self {
            Self::AllTime => Self::Month,
            Self::Month => Self::Week,
            Self::Week => Self::Today,
            Self::Today => Self::AllTime,
        }
    }

    pub fn contains(&self, at: DateTime<Local>, now: DateTime<Local>) -> bool {
        match self {
            Self::AllTime => true,
            Self::Month => now - at <= Duration::days(30),
            Self::Week => now - at <= Duration::days(7),
            Self::Today => at.date_naive() == now.date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub record: ScoreRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub entries: usize,
    pub best_score: Option<u64>,
    pub mean_accuracy: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    records: Vec<ScoreRecord>,
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    player: &str,
    recipe_id: u64,
    recipe_title: &str,
    score: u64,
    time_secs: u64,
    accuracy: u8,
    date: (i32, u32, u32),
    difficulty: Difficulty,
) -> ScoreRecord {
    let completed_at = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or_else(Local::now);
    ScoreRecord {
        id: format!("seed-{id}"),
        player_name: player.to_string(),
        recipe_id,
        recipe_title: recipe_title.to_string(),
        score,
        time_secs,
        accuracy,
        completion_rate: 100,
        completed_at,
        difficulty,
    }
}

impl Leaderboard {
    /// The fixed sample scores every leaderboard starts with
    pub fn seed_records() -> Vec<ScoreRecord> {
        const CARBONARA: &str = "Classic Spaghetti Carbonara";
        vec![
            seed("1", "ChefMaster2024", 1, CARBONARA, 9850, 1200, 98, (2024, 1, 15), Difficulty::Hard),
            seed("2", "CookingNinja", 3, "Beef Stir Fry", 9720, 900, 95, (2024, 1, 14), Difficulty::Medium),
            seed("3", "KitchenWizard", 4, "Chocolate Chip Cookies", 9650, 1800, 92, (2024, 1, 13), Difficulty::Easy),
            seed("4", "FoodieGamer", 1, CARBONARA, 9500, 1350, 90, (2024, 1, 12), Difficulty::Hard),
            seed("5", "VirtualChef", 5, "Caesar Salad", 9400, 600, 94, (2024, 1, 11), Difficulty::Easy),
        ]
    }

    pub fn from_records(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }

    /// Seed records followed by everything in the ledger
    pub fn load(ledger: &dyn ScoreLedger) -> Result<Self, LedgerError> {
        let mut records = Self::seed_records();
        let saved = ledger.read_all()?;
        debug!(saved = saved.len(), "leaderboard loaded");
        records.extend(saved);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Filtered records sorted by score, highest first. Ties keep load order.
    pub fn ranked(
        &self,
        difficulty: DifficultyFilter,
        window: TimeWindow,
        now: DateTime<Local>,
    ) -> Vec<LeaderboardEntry> {
        let mut records: Vec<&ScoreRecord> = self
            .records
            .iter()
            .filter(|r| difficulty.matches(r) && window.contains(r.completed_at, now))
            .collect();
        records.sort_by(|a, b| b.score.cmp(&a.score));

        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i + 1,
                record: record.clone(),
            })
            .collect()
    }
}

pub fn summarize(entries: &[LeaderboardEntry]) -> Summary {
    let accuracies: Vec<f64> = entries.iter().map(|e| e.record.accuracy as f64).collect();
    Summary {
        entries: entries.len(),
        best_score: entries.iter().map(|e| e.record.score).max(),
        mean_accuracy: mean(&accuracies),
    }
}

/// `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn humanize_date(at: DateTime<Local>, now: DateTime<Local>) -> String {
    match (now - at).to_std() {
        Ok(elapsed) if elapsed.as_secs() >= 60 => {
            HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
        }
        _ => "just now".to_string(),
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    player: &'a str,
    recipe: &'a str,
    score: u64,
    time: String,
    accuracy: u8,
    difficulty: String,
    date: String,
}

pub fn write_csv<W: Write>(entries: &[LeaderboardEntry], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in entries {
        let r = &entry.record;
        writer.serialize(CsvRow {
            rank: entry.rank,
            player: &r.player_name,
            recipe: &r.recipe_title,
            score: r.score,
            time: format_time(r.time_secs),
            accuracy: r.accuracy,
            difficulty: r.difficulty.to_string(),
            date: r.completed_at.format("%Y-%m-%d").to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Plain-text table for printing outside the TUI
pub fn format_table(entries: &[LeaderboardEntry], now: DateTime<Local>) -> String {
    let mut out = format!(
        "{:<5} {:<16} {:<28} {:>6} {:>6} {:>4}  {:<7} {}\n",
        "rank", "player", "recipe", "score", "time", "acc", "level", "when"
    );
    for entry in entries {
        let r = &entry.record;
        out.push_str(&format!(
            "{:<5} {:<16} {:<28} {:>6} {:>6} {:>3}%  {:<7} {}\n",
            format!("#{}", entry.rank),
            truncate_to_width(&r.player_name, 16),
            truncate_to_width(&r.recipe_title, 28),
            r.score,
            format_time(r.time_secs),
            r.accuracy,
            r.difficulty.to_string(),
            humanize_date(r.completed_at, now),
        ));
    }
    let summary = summarize(entries);
    if let (Some(best), Some(acc)) = (summary.best_score, summary.mean_accuracy) {
        out.push_str(&format!(
            "\n{} scores, best {}, average accuracy {:.0}%\n",
            summary.entries, best, acc
        ));
    }
    out
}
