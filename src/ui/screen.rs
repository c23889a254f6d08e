use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};
use crate::ui::{board, browse, leaderboard, render_results};

/// A UI Screen boundary: draws one shell state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct BrowseScreen;

impl Screen for BrowseScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        browse::render_browse(app, area, buf);
    }
}

pub struct DetailScreen;

impl Screen for DetailScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        browse::render_detail(app, area, buf);
    }
}

pub struct CookingScreen;

impl Screen for CookingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        board::render_game(app, area, buf);
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_results(app, area, buf);
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        leaderboard::render_leaderboard(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Browse => Box::new(BrowseScreen),
        AppState::Detail => Box::new(DetailScreen),
        AppState::Cooking => Box::new(CookingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Leaderboard => Box::new(LeaderboardScreen),
    }
}
