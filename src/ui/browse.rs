use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::app::App;
use crate::recipe::Recipe;

fn stars_label(recipe: &Recipe) -> String {
    let full = recipe.stars().round() as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full.min(5)))
}

fn status_line(app: &App) -> Line<'static> {
    match (&app.search_input, &app.status) {
        (Some(input), _) => Line::from(vec![
            Span::styled("search: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(input.clone()),
            Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        (None, Some(status)) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        (None, None) => Line::default(),
    }
}

pub fn render_browse(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // recipe list
            Constraint::Length(1), // search prompt / status
            Constraint::Length(2), // legend
        ])
        .split(area);

    Paragraph::new("Cookfinity")
        .block(Block::default().borders(Borders::ALL).title("Recipes"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if app.recipes.is_empty() {
        Paragraph::new("No recipes to show. Press / to search.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .render(chunks[1], buf);
    } else {
        let visible = chunks[1].height.saturating_sub(3) as usize;
        let skip = (app.selected + 1).saturating_sub(visible);

        let header = Row::new(vec!["Recipe", "Time", "Serves", "Rating"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let rows: Vec<Row> = app
            .recipes
            .iter()
            .enumerate()
            .skip(skip)
            .take(visible)
            .map(|(i, recipe)| {
                let row = Row::new(vec![
                    Cell::from(recipe.title.clone()),
                    Cell::from(format!("{} min", recipe.ready_in_minutes)),
                    Cell::from(recipe.servings.to_string()),
                    Cell::from(stars_label(recipe)).style(Style::default().fg(Color::Yellow)),
                ]);
                if i == app.selected {
                    row.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    row
                }
            })
            .collect();

        Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(8),
                Constraint::Length(7),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "{} recipes",
            app.recipes.len()
        )))
        .column_spacing(2)
        .render(chunks[1], buf);
    }

    Paragraph::new(status_line(app)).render(chunks[2], buf);

    Paragraph::new("(↑/↓) select  (enter) open  (/) search  (l) leaderboard  (q) quit")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);
}

pub fn render_detail(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(recipe) = app.recipe.as_ref() else {
        return;
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area);

    let mut meta = vec![
        Span::raw(format!("{} min", recipe.ready_in_minutes)),
        Span::raw("  ·  "),
        Span::raw(format!("serves {}", recipe.servings)),
        Span::raw("  ·  "),
        Span::styled(stars_label(recipe), Style::default().fg(Color::Yellow)),
    ];
    if !recipe.cuisines.is_empty() {
        meta.push(Span::raw("  ·  "));
        meta.push(Span::raw(recipe.cuisines.iter().join(", ")));
    }
    Paragraph::new(vec![
        Line::from(Span::styled(recipe.title.clone(), bold.fg(Color::Cyan))),
        Line::from(meta),
    ])
    .block(Block::default().borders(Borders::BOTTOM))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let ingredients: Vec<Line> = recipe
        .extended_ingredients
        .iter()
        .map(|i| Line::from(format!("• {}", i.display_line())))
        .collect();
    Paragraph::new(ingredients)
        .block(Block::default().borders(Borders::ALL).title("Ingredients"))
        .wrap(Wrap { trim: true })
        .render(body[0], buf);

    let mut method = vec![
        Line::from(Span::styled(
            recipe.summary.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ];
    method.extend(
        recipe
            .steps()
            .into_iter()
            .map(|s| Line::from(vec![Span::styled(format!("{}. ", s.number), bold), Span::raw(s.step)])),
    );
    Paragraph::new(method)
        .block(Block::default().borders(Borders::ALL).title("Method"))
        .wrap(Wrap { trim: true })
        .render(body[1], buf);

    Paragraph::new(status_line(app)).render(chunks[2], buf);

    let legend = if recipe.source_url().is_some() {
        "(p)lay  (o)pen source  (l) leaderboard  (esc) back"
    } else {
        "(p)lay  (l) leaderboard  (esc) back"
    };
    Paragraph::new(legend)
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}
