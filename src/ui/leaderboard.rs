use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::app::App;
use crate::leaderboard::{format_time, humanize_date, summarize, LeaderboardEntry};
use crate::ledger::Difficulty;

fn rank_style(rank: usize) -> Style {
    match rank {
        1 => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        2 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        3 => Style::default().fg(Color::LightRed),
        _ => Style::default(),
    }
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
        Difficulty::Expert => Color::Magenta,
    }
}

/// Pure presenter for a single leaderboard row
pub fn present_row(entry: &LeaderboardEntry, highlight: bool, now: DateTime<Local>) -> Row<'static> {
    let r = &entry.record;
    let row = Row::new(vec![
        Cell::from(format!("#{}", entry.rank)).style(rank_style(entry.rank)),
        Cell::from(r.player_name.clone()),
        Cell::from(r.recipe_title.clone()),
        Cell::from(r.score.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format_time(r.time_secs)),
        Cell::from(format!("{}%", r.accuracy)),
        Cell::from(r.difficulty.to_string())
            .style(Style::default().fg(difficulty_color(r.difficulty))),
        Cell::from(humanize_date(r.completed_at, now)),
    ]);
    if highlight {
        row.style(Style::default().bg(Color::DarkGray))
    } else {
        row
    }
}

pub fn render_leaderboard(app: &App, area: Rect, buf: &mut Buffer) {
    let view = &app.leaderboard;
    let now = Local::now();
    let entries = app.ranked_entries();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // table
            Constraint::Length(1), // summary
            Constraint::Length(2), // instructions
        ])
        .split(area);

    Paragraph::new(format!(
        "Leaderboard (difficulty: {}  period: {})",
        view.difficulty.label(),
        view.window
    ))
    .block(Block::default().borders(Borders::ALL).title("Hall of Fame"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    if entries.is_empty() {
        Paragraph::new("No scores match these filters yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .render(chunks[1], buf);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let max_scroll = entries.len().saturating_sub(table_height);
        let scroll = view.scroll.min(max_scroll);
        let latest = app.last_record.as_ref().map(|r| r.id.as_str());

        let header = Row::new(vec![
            "Rank", "Player", "Recipe", "Score", "Time", "Acc", "Level", "When",
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let rows: Vec<Row> = entries
            .iter()
            .skip(scroll)
            .take(table_height)
            .map(|e| present_row(e, Some(e.record.id.as_str()) == latest, now))
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(16),
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(14),
        ];
        Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Scores"))
            .column_spacing(1)
            .render(chunks[1], buf);
    }

    let summary = summarize(&entries);
    let summary_text = match (summary.best_score, summary.mean_accuracy) {
        (Some(best), Some(acc)) => format!(
            "{} scores   best {}   average accuracy {:.0}%",
            summary.entries, best, acc
        ),
        _ => "no scores".to_string(),
    };
    Paragraph::new(summary_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new("(↑/↓) scroll  (d) difficulty  (t) period  (b/esc) back")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);
}
