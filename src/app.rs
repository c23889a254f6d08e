//! Terminal shell state: which screen is showing, the running cooking
//! session, and the translation of terminal input into engine calls.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};
use webbrowser::Browser;

use crate::audio::{CueSink, MutedSink, TerminalBell};
use crate::catalog::{Catalog, RecipeProvider};
use crate::celebration::Celebration;
use crate::config::Config;
use crate::events::GameObserver;
use crate::game::{Completion, CookingGame, COMPLETION_DELAY};
use crate::leaderboard::{DifficultyFilter, Leaderboard, LeaderboardEntry, TimeWindow};
use crate::ledger::{ScoreLedger, ScoreRecord};
use crate::recipe::{Recipe, SearchFilter};
use crate::runtime::{SecondTicker, ShellEvent};
use crate::session::SessionConfig;
use crate::ui::board;

/// How long the "step complete" banner stays up
pub const BANNER_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Browse,
    Detail,
    Cooking,
    Results,
    Leaderboard,
}

/// Observer backing the in-game heads-up display
#[derive(Debug, Default)]
pub struct Hud {
    pub step_banner: Option<(usize, Instant)>,
}

impl Hud {
    pub fn banner(&self, now: Instant) -> Option<usize> {
        self.step_banner
            .filter(|(_, at)| now.duration_since(*at) < BANNER_DURATION)
            .map(|(step, _)| step)
    }
}

impl GameObserver for Hud {
    fn on_step_change(&mut self, step: usize) {
        self.step_banner = Some((step, Instant::now()));
    }

    fn on_complete(&mut self, final_score: u64, elapsed_secs: u64) {
        debug!(final_score, elapsed_secs, "completion delivered to shell");
    }
}

#[derive(Debug)]
pub struct LeaderboardView {
    pub board: Leaderboard,
    pub difficulty: DifficultyFilter,
    pub window: TimeWindow,
    pub scroll: usize,
    return_to: AppState,
}

impl Default for LeaderboardView {
    fn default() -> Self {
        Self {
            board: Leaderboard::default(),
            difficulty: DifficultyFilter::All,
            window: TimeWindow::AllTime,
            scroll: 0,
            return_to: AppState::Browse,
        }
    }
}

pub struct App {
    pub state: AppState,
    pub config: Config,
    pub recipes: Vec<Recipe>,
    pub selected: usize,
    /// Some while the search prompt is open
    pub search_input: Option<String>,
    pub recipe: Option<Recipe>,
    pub game: Option<CookingGame<Hud>>,
    pub celebration: Celebration,
    pub last_record: Option<ScoreRecord>,
    pub leaderboard: LeaderboardView,
    pub status: Option<String>,
    pub should_quit: bool,
    pub terminal_area: Rect,
    catalog: Catalog,
    ledger: Box<dyn ScoreLedger>,
    events: Sender<ShellEvent>,
    ticker: Option<SecondTicker>,
    session_seq: u64,
}

impl App {
    pub fn new(
        catalog: Catalog,
        ledger: Box<dyn ScoreLedger>,
        config: Config,
        events: Sender<ShellEvent>,
    ) -> Self {
        let mut app = Self {
            state: AppState::Browse,
            config,
            recipes: Vec::new(),
            selected: 0,
            search_input: None,
            recipe: None,
            game: None,
            celebration: Celebration::new(COMPLETION_DELAY),
            last_record: None,
            leaderboard: LeaderboardView::default(),
            status: None,
            should_quit: false,
            terminal_area: Rect::new(0, 0, 120, 32),
            catalog,
            ledger,
            events,
            ticker: None,
            session_seq: 0,
        };
        app.load_featured();
        app
    }

    fn load_featured(&mut self) {
        match self.catalog.random(SearchFilter::DEFAULT_NUMBER) {
            Ok(recipes) => self.recipes = recipes,
            Err(err) => {
                warn!(%err, "no recipes to show");
                self.status = Some("No recipes available".to_string());
            }
        }
        self.selected = 0;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_area = Rect::new(0, 0, width, height);
    }

    pub fn board_rect(&self) -> Rect {
        board::board_area(self.terminal_area)
    }

    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.load_featured();
            return;
        }
        match self.catalog.search(&SearchFilter::query(query)) {
            Ok(response) => {
                self.status = response
                    .results
                    .is_empty()
                    .then(|| format!("No recipes found for \"{query}\""));
                self.recipes = response.results;
            }
            Err(err) => {
                warn!(%err, query, "search failed");
                self.recipes.clear();
                self.status = Some("Search unavailable".to_string());
            }
        }
        self.selected = 0;
        self.state = AppState::Browse;
    }

    pub fn open_recipe(&mut self, id: u64) {
        match self.catalog.recipe_by_id(id) {
            Ok(recipe) => {
                self.recipe = Some(recipe);
                self.status = None;
                self.state = AppState::Detail;
            }
            Err(err) => {
                warn!(%err, id, "recipe lookup failed");
                self.status = Some("Recipe not found".to_string());
            }
        }
    }

    fn open_selected(&mut self) {
        if let Some(id) = self.recipes.get(self.selected).map(|r| r.id) {
            self.open_recipe(id);
        }
    }

    fn cue_sink(&self) -> Box<dyn CueSink> {
        if self.config.sound_enabled {
            Box::new(TerminalBell::stdout())
        } else {
            Box::new(MutedSink)
        }
    }

    /// Starts a fresh session for the open recipe, ending any current one.
    pub fn start_game(&mut self) {
        let Some(recipe) = self.recipe.clone() else {
            return;
        };
        self.end_session();

        self.session_seq += 1;
        let area = board::play_area_for(self.board_rect());
        let game = CookingGame::new(&recipe, &SessionConfig::new(area), Hud::default())
            .with_cues(self.cue_sink());
        self.game = Some(game);
        self.ticker = Some(SecondTicker::start(self.events.clone(), self.session_seq));
        self.celebration.stop();
        self.last_record = None;
        self.state = AppState::Cooking;
    }

    fn end_session(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
        if let Some(game) = self.game.as_mut() {
            game.abandon();
        }
    }

    pub fn show_leaderboard(&mut self) {
        let board = Leaderboard::load(self.ledger.as_ref()).unwrap_or_else(|err| {
            warn!(%err, "showing seed scores only");
            Leaderboard::from_records(Leaderboard::seed_records())
        });
        let return_to = match self.state {
            AppState::Leaderboard => self.leaderboard.return_to,
            AppState::Cooking => AppState::Browse,
            other => other,
        };
        self.leaderboard = LeaderboardView {
            board,
            return_to,
            ..LeaderboardView::default()
        };
        self.state = AppState::Leaderboard;
    }

    pub fn ranked_entries(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.board.ranked(
            self.leaderboard.difficulty,
            self.leaderboard.window,
            Local::now(),
        )
    }

    pub fn handle(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::Key(key) => self.on_key(key),
            ShellEvent::Mouse(mouse) => self.on_mouse(mouse),
            ShellEvent::Second(session) => self.on_second(session),
            ShellEvent::Tick => self.on_tick(Instant::now()),
            ShellEvent::Resize => {}
        }
    }

    fn on_second(&mut self, session: u64) {
        // ticks queued by an earlier session are dropped
        if session != self.session_seq {
            return;
        }
        if let Some(game) = self.game.as_mut() {
            game.tick_second();
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.celebration.update();
        let completion = self.game.as_mut().and_then(|game| game.poll(now));
        if let Some(completion) = completion {
            self.record(completion);
        }
    }

    fn record(&mut self, completion: Completion) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let record = ScoreRecord::from_completion(
            &self.config.player_name,
            game.recipe_id(),
            game.recipe_title(),
            &completion,
            self.config.difficulty,
            Local::now(),
        );
        match self.ledger.append(&record) {
            Ok(()) => info!(score = record.score, recipe = record.recipe_id, "score saved"),
            Err(err) => {
                warn!(%err, "score not saved");
                self.status = Some("Score could not be saved".to_string());
            }
        }
        self.last_record = Some(record);
        self.celebration.stop();
        self.state = AppState::Results;
    }

    /// Called after each drop. A completed session stops its clock and
    /// starts the celebration.
    fn after_drop(&mut self) {
        let Some(completion) = self.game.as_ref().and_then(|g| g.completion()) else {
            return;
        };
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
            self.celebration.start(
                self.terminal_area.width,
                self.terminal_area.height,
                completion.final_score,
            );
        }
    }

    /// Reports a finished but not yet reported session so quitting during
    /// the celebration still keeps the score.
    pub fn shutdown(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
        let pending = self
            .game
            .as_mut()
            .and_then(|game| game.poll(Instant::now() + COMPLETION_DELAY));
        if let Some(completion) = pending {
            self.record(completion);
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.state != AppState::Cooking {
            return;
        }
        let board = self.board_rect();
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let pointer = board::cell_to_point(board, mouse.column, mouse.row);

        match (mouse.kind, pointer) {
            (MouseEventKind::Down(MouseButton::Left), Some(p)) => {
                if let Some(id) = game.token_at(p.x, p.y) {
                    game.begin_drag(id);
                }
            }
            (MouseEventKind::Drag(MouseButton::Left), Some(p)) => game.update_drag(p.x, p.y),
            (MouseEventKind::Moved, Some(p)) => game.hover(p.x, p.y),
            (MouseEventKind::Up(MouseButton::Left), pointer) => {
                // released off the board: nothing is under the pointer
                let (x, y) = pointer.map_or((-1.0, -1.0), |p| (p.x, p.y));
                let result = game.end_drag(x, y);
                debug!(?result, "drop");
                self.after_drop();
            }
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Some(input) = self.search_input.as_mut() {
            match key.code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => {
                    let query = input.clone();
                    self.search_input = None;
                    self.search(&query);
                }
                KeyCode::Esc => self.search_input = None,
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Browse => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected + 1 < self.recipes.len() {
                        self.selected += 1;
                    }
                }
                KeyCode::Enter => self.open_selected(),
                KeyCode::Char('/') => self.search_input = Some(String::new()),
                KeyCode::Char('l') => self.show_leaderboard(),
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            AppState::Detail => match key.code {
                KeyCode::Char('p') | KeyCode::Enter => self.start_game(),
                KeyCode::Char('o') => self.open_source(),
                KeyCode::Char('l') => self.show_leaderboard(),
                KeyCode::Esc | KeyCode::Char('b') => self.state = AppState::Browse,
                _ => {}
            },
            AppState::Cooking => {
                // the finished dish is on its way to the results screen
                if self.game.as_ref().is_some_and(|g| g.is_completed()) {
                    return;
                }
                match key.code {
                    KeyCode::Char('n') => {
                        if let Some(game) = self.game.as_mut() {
                            game.advance_step();
                        }
                    }
                    KeyCode::Char('r') => self.start_game(),
                    KeyCode::Esc => {
                        self.end_session();
                        self.state = AppState::Detail;
                    }
                    _ => {}
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Char('p') => self.start_game(),
                KeyCode::Char('l') => self.show_leaderboard(),
                KeyCode::Enter | KeyCode::Esc => self.state = AppState::Browse,
                _ => {}
            },
            AppState::Leaderboard => match key.code {
                KeyCode::Char('d') => {
                    self.leaderboard.difficulty = self.leaderboard.difficulty.next();
                    self.leaderboard.scroll = 0;
                }
                KeyCode::Char('t') => {
                    self.leaderboard.window = self.leaderboard.window.next();
                    self.leaderboard.scroll = 0;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.leaderboard.scroll = self.leaderboard.scroll.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => self.leaderboard.scroll += 1,
                KeyCode::Esc | KeyCode::Char('b') => self.state = self.leaderboard.return_to,
                _ => {}
            },
        }
    }

    fn open_source(&mut self) {
        let Some(url) = self.recipe.as_ref().and_then(|r| r.source_url()) else {
            self.status = Some("This recipe has no source link".to_string());
            return;
        };
        if !Browser::is_available() {
            self.status = Some(format!("Open {url} in your browser"));
            return;
        }
        if let Err(err) = webbrowser::open(url) {
            warn!(%err, url, "could not open browser");
            self.status = Some(format!("Open {url} in your browser"));
        }
    }

    pub fn ledger(&self) -> &dyn ScoreLedger {
        self.ledger.as_ref()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}
