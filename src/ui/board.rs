//! The kitchen board: where the cooking session is drawn, and how terminal
//! cells map onto play-area units.

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::kitchen::{self, PlayArea, Point, TOKEN_SIZE};
use crate::leaderboard::format_time;
use crate::util::truncate_to_width;

pub const UNITS_PER_COL: f64 = 8.0;
pub const UNITS_PER_ROW: f64 = 16.0;

const HEADER_ROWS: u16 = 3;
const FOOTER_ROWS: u16 = 3;

/// Bordered frame around the board
pub fn board_frame(area: Rect) -> Rect {
    Rect::new(
        area.x,
        area.y + HEADER_ROWS.min(area.height),
        area.width,
        area.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS),
    )
}

/// Cells tokens and stations are drawn in
pub fn board_area(area: Rect) -> Rect {
    Block::default()
        .borders(Borders::ALL)
        .inner(board_frame(area))
}

pub fn play_area_for(board: Rect) -> PlayArea {
    PlayArea::new(
        board.width as f64 * UNITS_PER_COL,
        board.height as f64 * UNITS_PER_ROW,
    )
}

/// Centre of the cell in play-area units, or None outside the board
pub fn cell_to_point(board: Rect, col: u16, row: u16) -> Option<Point> {
    let inside = col >= board.x
        && row >= board.y
        && col < board.x.saturating_add(board.width)
        && row < board.y.saturating_add(board.height);
    inside.then(|| {
        Point::new(
            (col - board.x) as f64 * UNITS_PER_COL + UNITS_PER_COL / 2.0,
            (row - board.y) as f64 * UNITS_PER_ROW + UNITS_PER_ROW / 2.0,
        )
    })
}

/// Cells covered by a play-area rectangle, clipped to the board
pub fn rect_to_cells(board: Rect, r: &kitchen::Rect) -> Rect {
    let x = (r.x / UNITS_PER_COL).round().max(0.0) as u16;
    let y = (r.y / UNITS_PER_ROW).round().max(0.0) as u16;
    let width = (r.width / UNITS_PER_COL).round() as u16;
    let height = (r.height / UNITS_PER_ROW).round() as u16;
    Rect::new(
        board.x.saturating_add(x),
        board.y.saturating_add(y),
        width,
        height,
    )
    .intersection(board)
}

pub fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(game) = app.game.as_ref() else {
        return;
    };
    let snap = game.snapshot();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let header = vec![
        Line::from(Span::styled(snap.recipe_title.clone(), bold.fg(Color::Cyan))),
        Line::from(vec![
            Span::styled(format!("Score {}", snap.score), bold.fg(Color::Yellow)),
            Span::raw("   "),
            Span::styled(format!("Time {}", format_time(snap.elapsed_secs)), bold),
            Span::raw("   "),
            Span::raw(format!("Ingredients {}/{}", snap.processed, snap.total)),
            Span::raw("   "),
            Span::raw(format!("Step {}/{}", snap.step_index + 1, snap.step_count)),
        ]),
        Line::from(Span::styled(snap.step_text.clone(), dim)),
    ];
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(Rect::new(area.x, area.y, area.width, HEADER_ROWS.min(area.height)), buf);

    let frame = board_frame(area);
    Block::default()
        .borders(Borders::ALL)
        .title(" Kitchen ")
        .render(frame, buf);
    let board = board_area(area);

    for station in &snap.stations {
        let cells = rect_to_cells(board, &station.rect);
        if cells.area() == 0 {
            continue;
        }
        let border = if station.is_hovered {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut lines = vec![Line::from(Span::styled(station.kind.description(), dim))];
        lines.extend(station.contents().iter().filter_map(|id| {
            snap.tokens.iter().find(|t| t.id == *id).map(|t| {
                Line::from(Span::styled(
                    format!("✓ {}", t.name),
                    Style::default().fg(Color::Green),
                ))
            })
        }));
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(station.name.as_str()),
            )
            .wrap(Wrap { trim: true })
            .render(cells, buf);
    }

    // the dragged token is drawn last so it sits on top
    let mut tokens: Vec<_> = snap.tokens.iter().filter(|t| !t.is_processed()).collect();
    tokens.sort_by_key(|t| t.is_dragging);
    for token in tokens {
        let cells = rect_to_cells(board, &token.bounds());
        if cells.area() == 0 {
            continue;
        }
        let style = if token.is_dragging {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let label_width = (TOKEN_SIZE / UNITS_PER_COL) as usize - 2;
        Clear.render(cells, buf);
        Paragraph::new(truncate_to_width(&token.name, label_width))
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style))
            .render(cells, buf);
    }

    let now = Instant::now();
    let mut flash = Vec::new();
    if let Some((text, points)) = &snap.popup {
        flash.push(Span::styled(
            format!("+{points} {text}"),
            bold.fg(Color::Green),
        ));
    }
    if let Some(step) = game.observer().banner(now) {
        flash.push(Span::raw("   "));
        flash.push(Span::styled(
            format!("Step {} reached!", step + 1),
            bold.fg(Color::Yellow),
        ));
    }
    if snap.completed {
        flash = vec![Span::styled("Dish complete!", bold.fg(Color::Magenta))];
    }
    if !flash.is_empty() && board.height > 0 {
        let row = Rect::new(board.x, board.y + board.height - 1, board.width, 1);
        Paragraph::new(Line::from(flash))
            .alignment(Alignment::Center)
            .render(row, buf);
    }

    let footer = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(FOOTER_ROWS),
        area.width,
        FOOTER_ROWS.min(area.height),
    );
    Paragraph::new("drag ingredients onto a station with the mouse\n(n)ext step   (r)estart   (esc) leave")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .render(footer, buf);
}
