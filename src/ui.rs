pub mod board;
pub mod browse;
pub mod charting;
pub mod leaderboard;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::app::App;
use crate::celebration::{headline_for, Celebration};
use crate::leaderboard::format_time;
use crate::ui::charting::{chart_series, compute_chart_params, format_label};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.state).render(self, area, buf);

        if self.celebration.is_active() {
            render_celebration_particles(&self.celebration, area, buf);
        }
    }
}

pub(crate) fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let (Some(record), Some(game)) = (app.last_record.as_ref(), app.game.as_ref()) else {
        Paragraph::new("No finished dish yet")
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };
    let completion = game.completion().unwrap_or_default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // headline
            Constraint::Min(1),    // chart
            Constraint::Length(1), // score
            Constraint::Length(1), // breakdown
            Constraint::Length(1), // status
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled(
            headline_for(record.score),
            bold_style.fg(Color::Magenta),
        )),
        Line::from(Span::styled(
            record.recipe_title.clone(),
            Style::default().fg(Color::Cyan),
        )),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let tuples = chart_series(game.timeline(), completion.elapsed_secs);
    let (overall_duration, highest_score) = compute_chart_params(&tuples);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .bounds([0.0, highest_score])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(highest_score), bold_style),
                ]),
        )
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} points   {}   {}% acc",
            record.score,
            format_time(record.time_secs),
            record.accuracy
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} base + {} time bonus   saved as {} ({})",
            completion.base_score, completion.time_bonus, record.player_name, record.difficulty
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    if let Some(status) = &app.status {
        Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(r)etry / (l)eaderboard / (enter) browse",
        italic_style,
    ))
    .render(chunks[6], buf);
}

/// Render celebration particles on top of the current screen
fn render_celebration_particles(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;

        if x < area.width && y < area.height {
            let color = colors[particle.color_index % colors.len()];
            let alpha = 1.0 - (particle.age / particle.max_age);

            let style = if particle.is_letter() {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else if alpha > 0.7 {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else if alpha > 0.3 {
                Style::default().fg(color)
            } else {
                Style::default().fg(color).add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&particle.symbol.to_string());
                cell.set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use crate::game::COMPLETION_DELAY;
    use crate::kitchen::TokenId;
    use crate::ledger::MemoryLedger;
    use std::sync::mpsc;
    use std::time::Instant;

    fn create_test_app() -> App {
        let (tx, _rx) = mpsc::channel();
        let config = Config {
            sound_enabled: false,
            ..Config::default()
        };
        App::new(
            Catalog::offline().unwrap(),
            Box::new(MemoryLedger::new()),
            config,
            tx,
        )
    }

    fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn cook_everything(app: &mut App) {
        let game = app.game.as_mut().unwrap();
        let plate = game.state().stations[3].rect;
        for i in 0..game.state().total_tokens() {
            assert!(game.begin_drag(TokenId(i)));
            game.end_drag(plate.x + 1.0, plate.y + 1.0);
        }
        app.on_tick(Instant::now() + COMPLETION_DELAY);
    }

    #[test]
    fn browse_lists_recipes() {
        let app = create_test_app();
        let text = rendered(&app, Rect::new(0, 0, 100, 30));
        assert!(text.contains("Cookfinity"));
        assert!(text.contains("Caesar Salad"));
        assert!(text.contains("(/) search"));
    }

    #[test]
    fn detail_shows_ingredients_and_method() {
        let mut app = create_test_app();
        app.open_recipe(2);
        let text = rendered(&app, Rect::new(0, 0, 120, 32));
        assert!(text.contains("Simple Scrambled Eggs"));
        assert!(text.contains("Ingredients"));
        assert!(text.contains("Method"));
        assert!(text.contains("(p)lay"));
    }

    #[test]
    fn cooking_shows_stations_and_score() {
        let mut app = create_test_app();
        app.open_recipe(2);
        app.start_game();
        let text = rendered(&app, app.terminal_area);
        assert!(text.contains("Score 0"));
        assert!(text.contains("Step 1/"));
        assert!(text.contains("Kitchen"));
        assert!(text.contains("Plate"));
    }

    #[test]
    fn results_after_completion() {
        let mut app = create_test_app();
        app.open_recipe(2);
        app.start_game();
        cook_everything(&mut app);
        assert_eq!(app.state, AppState::Results);

        let text = rendered(&app, app.terminal_area);
        let record = app.last_record.as_ref().unwrap();
        assert!(text.contains(&format!("{} points", record.score)));
        assert!(text.contains("(r)etry"));
        assert!(text.contains("seconds"));
    }

    #[test]
    fn leaderboard_screen() {
        let mut app = create_test_app();
        app.show_leaderboard();
        let text = rendered(&app, Rect::new(0, 0, 120, 30));
        assert!(text.contains("Hall of Fame"));
        assert!(text.contains("ChefMaster2024"));
        assert!(text.contains("5 scores"));
    }

    #[test]
    fn celebration_overlays_the_board() {
        let mut app = create_test_app();
        app.open_recipe(2);
        app.start_game();
        app.celebration.start(80, 24, 9850);

        let text = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(text.contains('M'));
        assert!(app.celebration.is_active());
    }

    #[test]
    fn tiny_and_huge_areas_render() {
        let mut app = create_test_app();
        for state in [AppState::Browse, AppState::Leaderboard] {
            app.state = state;
            for area in [Rect::new(0, 0, 10, 5), Rect::new(0, 0, 300, 120)] {
                let mut buffer = Buffer::empty(area);
                (&app).render(area, &mut buffer);
                assert_eq!(*buffer.area(), area);
            }
        }
        app.open_recipe(1);
        app.start_game();
        let area = Rect::new(0, 0, 12, 4);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }
}
