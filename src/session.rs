use crate::kitchen::{
    build_stations, build_tokens, IngredientToken, PlayArea, StationTarget, TokenId, ViewportClass,
};
use crate::recipe::Recipe;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub play_area: PlayArea,
}

impl SessionConfig {
    pub fn new(play_area: PlayArea) -> Self {
        Self { play_area }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(PlayArea::default())
    }
}

/// Aggregate play state of one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub viewport: ViewportClass,
    pub tokens: Vec<IngredientToken>,
    pub stations: Vec<StationTarget>,
    pub step_index: usize,
    pub step_count: usize,
    pub score: u64,
    pub elapsed_secs: u64,
    pub completed: bool,
    // the automatic step advance fires once per session
    pub auto_advanced: bool,
}

impl SessionState {
    pub fn new(recipe: &Recipe, step_count: usize, config: &SessionConfig) -> Self {
        // captured once; later resizes do not move anything
        let viewport = config.play_area.viewport_class();
        Self {
            viewport,
            tokens: build_tokens(recipe, viewport),
            stations: build_stations(&config.play_area),
            step_index: 0,
            step_count: step_count.max(1),
            score: 0,
            elapsed_secs: 0,
            completed: false,
            auto_advanced: false,
        }
    }

    pub fn processed_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_processed()).count()
    }

    pub fn total_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 >= self.step_count
    }

    pub fn token(&self, id: TokenId) -> Option<&IngredientToken> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub(crate) fn token_index(&self, id: TokenId) -> Option<usize> {
        self.tokens.iter().position(|t| t.id == id)
    }

    /// Share of processed tokens in `[0, 1]`; zero for an empty session.
    pub fn progress(&self) -> f64 {
        match self.total_tokens() {
            0 => 0.0,
            total => self.processed_count() as f64 / total as f64,
        }
    }
}
