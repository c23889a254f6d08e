use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::audio::{play_cue, Cue, CueSink, MutedSink};
use crate::events::{EventLog, GameObserver};
use crate::kitchen::{IngredientToken, PlayArea, Point, StationTarget, TokenId};
use crate::recipe::{Recipe, Step};
use crate::scoring::{
    self, processing_for, reaches, Processing, AUTO_STEP_BONUS, COMPLETION_PERCENT,
    MANUAL_STEP_BONUS, STEP_ADVANCE_PERCENT,
};
use crate::session::{SessionConfig, SessionState};
use crate::time_series::ScorePoint;

/// How long a "points earned" popup stays visible
pub const POPUP_DURATION: Duration = Duration::from_secs(2);
/// Gap between the session completing and the result being reported
pub const COMPLETION_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub struct ScorePopup {
    pub text: String,
    pub points: u64,
    pub expires_at: Instant,
}

/// Result of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completion {
    pub base_score: u64,
    pub time_bonus: u64,
    pub final_score: u64,
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    /// No drag was in progress
    NoDrag,
    /// Released outside every station
    Missed,
    /// Released on a station, but the token had already been processed
    AlreadyProcessed { station: usize },
    Placed { station: usize, points: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Playing,
    Completing { due_at: Instant },
    Reported,
    Abandoned,
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub recipe_title: String,
    pub tokens: Vec<IngredientToken>,
    pub stations: Vec<StationTarget>,
    pub step_index: usize,
    pub step_count: usize,
    pub step_text: String,
    pub score: u64,
    pub elapsed_secs: u64,
    pub processed: usize,
    pub total: usize,
    pub completed: bool,
    pub popup: Option<(String, u64)>,
}

/// One play-through of the cooking mini-game.
///
/// The engine is driven entirely by its caller: pointer events go through
/// [`begin_drag`](Self::begin_drag), [`update_drag`](Self::update_drag) and
/// [`end_drag`](Self::end_drag), the once-per-second clock through
/// [`tick_second`](Self::tick_second), and timed effects (popup expiry,
/// delayed completion report) through [`poll`](Self::poll).
pub struct CookingGame<O: GameObserver = EventLog> {
    recipe_id: u64,
    recipe_title: String,
    steps: Vec<Step>,
    area: PlayArea,
    state: SessionState,
    drag: Option<TokenId>,
    phase: Phase,
    popup: Option<ScorePopup>,
    completion: Option<Completion>,
    timeline: Vec<ScorePoint>,
    observer: O,
    cues: Box<dyn CueSink>,
}

impl<O: GameObserver> CookingGame<O> {
    pub fn new(recipe: &Recipe, config: &SessionConfig, observer: O) -> Self {
        let steps = recipe.steps();
        let state = SessionState::new(recipe, steps.len(), config);
        info!(
            recipe = recipe.id,
            tokens = state.total_tokens(),
            steps = steps.len(),
            viewport = %state.viewport,
            "cooking session started"
        );

        Self {
            recipe_id: recipe.id,
            recipe_title: recipe.title.clone(),
            steps,
            area: config.play_area,
            state,
            drag: None,
            phase: Phase::Playing,
            popup: None,
            completion: None,
            timeline: vec![ScorePoint::new(0, 0)],
            observer,
            cues: Box::new(MutedSink),
        }
    }

    pub fn with_cues(mut self, cues: Box<dyn CueSink>) -> Self {
        self.cues = cues;
        self
    }

    pub fn begin_drag(&mut self, id: TokenId) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        let Some(idx) = self.state.token_index(id) else {
            return false;
        };

        // a press without a matching release leaves a stale drag behind
        if let Some(prev) = self.drag.take() {
            if let Some(prev_idx) = self.state.token_index(prev) {
                self.state.tokens[prev_idx].is_dragging = false;
            }
        }

        self.state.tokens[idx].is_dragging = true;
        self.drag = Some(id);
        true
    }

    pub fn update_drag(&mut self, x: f64, y: f64) {
        let Some(idx) = self.drag.and_then(|id| self.state.token_index(id)) else {
            return;
        };
        self.state.tokens[idx].position = self.area.clamp_token(Point::new(x, y));
        self.hover(x, y);
    }

    pub fn end_drag(&mut self, x: f64, y: f64) -> DropResult {
        let Some(id) = self.drag.take() else {
            return DropResult::NoDrag;
        };

        let pointer = Point::new(x, y);
        // first station in creation order wins when rectangles overlap
        let target = self
            .state
            .stations
            .iter()
            .position(|station| station.rect.contains(pointer));

        let token = self.state.token_index(id);
        let result = match (token, target) {
            (Some(token), Some(station)) => self.resolve_drop(token, station),
            _ => DropResult::Missed,
        };

        // a processed token stays on the station that took it
        if let Some(idx) = token.filter(|&idx| self.state.tokens[idx].is_processed()) {
            if let Some(home) = self.state.stations.iter().find(|s| s.contents().contains(&id)) {
                self.state.tokens[idx].position = home.resting_point();
            }
        }

        for token in &mut self.state.tokens {
            token.is_dragging = false;
        }
        for station in &mut self.state.stations {
            station.is_hovered = false;
        }
        result
    }

    fn resolve_drop(&mut self, token_idx: usize, station_idx: usize) -> DropResult {
        let station = &self.state.stations[station_idx];
        let kind = station.kind;
        let resting = station.resting_point();

        let token = &mut self.state.tokens[token_idx];
        if !token.mark_processed(kind) {
            return DropResult::AlreadyProcessed {
                station: station_idx,
            };
        }
        token.position = resting;
        let (token_id, name) = (token.id, token.name.clone());
        self.state.stations[station_idx].push_content(token_id);

        let Processing { label, points } = processing_for(kind);
        debug!(token = %token_id, station = %kind, points, "ingredient processed");

        self.add_score(points);
        self.popup = Some(ScorePopup {
            text: format!("{label} {name}!"),
            points,
            expires_at: Instant::now() + POPUP_DURATION,
        });
        self.observer.on_points(label, points);
        play_cue(self.cues.as_mut(), Cue::for_station(kind));

        self.check_step_completion();

        DropResult::Placed {
            station: station_idx,
            points,
        }
    }

    fn check_step_completion(&mut self) {
        let processed = self.state.processed_count();
        let total = self.state.total_tokens();

        if !self.state.auto_advanced
            && !self.state.is_last_step()
            && reaches(processed, total, STEP_ADVANCE_PERCENT)
        {
            self.state.auto_advanced = true;
            self.state.step_index += 1;
            self.observer.on_step_change(self.state.step_index);
            self.add_score(AUTO_STEP_BONUS);
            play_cue(self.cues.as_mut(), Cue::AUTO_STEP);
        }

        if reaches(processed, total, COMPLETION_PERCENT) {
            self.complete();
        }
    }

    /// Manual step advance. Returns false at the last step or once the
    /// session has ended.
    pub fn advance_step(&mut self) -> bool {
        if self.phase != Phase::Playing || self.state.is_last_step() {
            return false;
        }
        self.state.step_index += 1;
        self.observer.on_step_change(self.state.step_index);
        self.add_score(MANUAL_STEP_BONUS);
        play_cue(self.cues.as_mut(), Cue::MANUAL_STEP);
        true
    }

    fn add_score(&mut self, points: u64) {
        self.state.score += points;
        self.timeline
            .push(ScorePoint::new(self.state.elapsed_secs, self.state.score));
        self.observer.on_score_update(self.state.score);
    }

    fn complete(&mut self) {
        if self.state.completed {
            return;
        }
        self.state.completed = true;

        let elapsed = self.state.elapsed_secs;
        let completion = Completion {
            base_score: self.state.score,
            time_bonus: scoring::time_bonus(elapsed),
            final_score: scoring::final_score(self.state.score, elapsed),
            elapsed_secs: elapsed,
        };
        info!(
            recipe = self.recipe_id,
            final_score = completion.final_score,
            elapsed_secs = elapsed,
            "cooking session completed"
        );
        self.completion = Some(completion);
        self.phase = Phase::Completing {
            due_at: Instant::now() + COMPLETION_DELAY,
        };
    }

    /// One elapsed second. Ignored once the session has completed or been
    /// abandoned.
    pub fn tick_second(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.state.elapsed_secs += 1;
        self.observer.on_time_update(self.state.elapsed_secs);
    }

    /// Expires the popup and delivers the completion report once its delay
    /// has passed. Returns the completion on the call that reports it.
    pub fn poll(&mut self, now: Instant) -> Option<Completion> {
        if self.popup.as_ref().is_some_and(|p| now >= p.expires_at) {
            self.popup = None;
        }

        match self.phase {
            Phase::Completing { due_at } if now >= due_at => {
                self.phase = Phase::Reported;
                let completion = self.completion?;
                self.observer
                    .on_complete(completion.final_score, completion.elapsed_secs);
                Some(completion)
            }
            _ => None,
        }
    }

    /// Ends the session without a result: restart or navigating away.
    pub fn abandon(&mut self) {
        if matches!(self.phase, Phase::Reported | Phase::Abandoned) {
            return;
        }
        debug!(recipe = self.recipe_id, "cooking session abandoned");
        self.phase = Phase::Abandoned;
        self.drag = None;
        for token in &mut self.state.tokens {
            token.is_dragging = false;
        }
    }

    /// Marks stations under the pointer as hovered
    pub fn hover(&mut self, x: f64, y: f64) {
        let pointer = Point::new(x, y);
        for station in &mut self.state.stations {
            station.is_hovered = station.rect.contains(pointer);
        }
    }

    /// Topmost unprocessed token under the pointer, in board stacking order:
    /// the dragged token first, then by descending index.
    pub fn token_at(&self, x: f64, y: f64) -> Option<TokenId> {
        let pointer = Point::new(x, y);
        self.state
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_processed() && t.bounds().contains(pointer))
            .max_by_key(|(i, t)| (t.is_dragging, *i))
            .map(|(_, t)| t.id)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            recipe_title: self.recipe_title.clone(),
            tokens: self.state.tokens.clone(),
            stations: self.state.stations.clone(),
            step_index: self.state.step_index,
            step_count: self.state.step_count,
            step_text: self.current_step().step.clone(),
            score: self.state.score,
            elapsed_secs: self.state.elapsed_secs,
            processed: self.state.processed_count(),
            total: self.state.total_tokens(),
            completed: self.state.completed,
            popup: self.popup.as_ref().map(|p| (p.text.clone(), p.points)),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> &Step {
        let last = self.steps.len().saturating_sub(1);
        &self.steps[self.state.step_index.min(last)]
    }

    pub fn popup(&self) -> Option<&ScorePopup> {
        self.popup.as_ref()
    }

    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    pub fn timeline(&self) -> &[ScorePoint] {
        &self.timeline
    }

    pub fn dragging(&self) -> Option<TokenId> {
        self.drag
    }

    pub fn play_area(&self) -> PlayArea {
        self.area
    }

    pub fn recipe_id(&self) -> u64 {
        self.recipe_id
    }

    pub fn recipe_title(&self) -> &str {
        &self.recipe_title
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    pub fn is_reported(&self) -> bool {
        self.phase == Phase::Reported
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GameEvent;
    use crate::kitchen::{Rect, StationKind, ViewportClass};
    use crate::recipe::{Ingredient, InstructionGroup};
    use assert_matches::assert_matches;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::{cell::RefCell, rc::Rc};

    const CUTTING_BOARD: (f64, f64) = (510.0, 140.0);
    const PAN: (f64, f64) = (650.0, 140.0);
    const POT: (f64, f64) = (510.0, 240.0);
    const PLATE: (f64, f64) = (650.0, 240.0);
    const NOWHERE: (f64, f64) = (300.0, 420.0);

    fn recipe(ingredients: usize, steps: usize) -> Recipe {
        Recipe {
            id: 42,
            title: "Test Dish".into(),
            extended_ingredients: (0..ingredients)
                .map(|i| Ingredient {
                    id: i as u64,
                    name: format!("ing{i}"),
                    ..Ingredient::default()
                })
                .collect(),
            analyzed_instructions: vec![InstructionGroup {
                name: String::new(),
                steps: (0..steps)
                    .map(|i| Step::new(i as u32 + 1, format!("step {}", i + 1)))
                    .collect(),
            }],
            ..Recipe::default()
        }
    }

    fn game(ingredients: usize, steps: usize) -> CookingGame {
        CookingGame::new(
            &recipe(ingredients, steps),
            &SessionConfig::default(),
            EventLog::new(),
        )
    }

    fn drop_on(game: &mut CookingGame, token: usize, at: (f64, f64)) -> DropResult {
        assert!(game.begin_drag(TokenId(token)));
        game.update_drag(at.0, at.1);
        game.end_drag(at.0, at.1)
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<Cue>>>);

    impl CueSink for RecordingSink {
        fn play(&mut self, cue: Cue) -> Result<(), crate::audio::AudioError> {
            self.0.borrow_mut().push(cue);
            Ok(())
        }
    }

    #[test]
    fn new_session_starts_clean() {
        let game = game(6, 4);
        let snap = game.snapshot();
        assert_eq!(snap.score, 0);
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.elapsed_secs, 0);
        assert_eq!(snap.total, 6);
        assert!(!snap.completed);
        assert!(game.is_running());
        assert_eq!(snap.step_text, "step 1");
    }

    #[test]
    fn each_station_awards_its_points() {
        for (at, kind, points, label) in [
            (CUTTING_BOARD, StationKind::CuttingBoard, 100, "chopped"),
            (PAN, StationKind::Pan, 150, "fried"),
            (POT, StationKind::Pot, 150, "boiled"),
            (PLATE, StationKind::Plate, 200, "plated"),
        ] {
            // a single step keeps the step bonus out of the score
            let mut game = game(6, 1);
            let result = drop_on(&mut game, 0, at);
            assert_matches!(result, DropResult::Placed { points: p, .. } if p == points);
            assert_eq!(game.state().score, points);

            let token = game.state().token(TokenId(0)).unwrap();
            assert!(token.is_processed());
            assert_eq!(token.processed_as(), Some(kind));
            assert!(!token.is_dragging);

            let station = game
                .state()
                .stations
                .iter()
                .find(|s| s.kind == kind)
                .unwrap();
            assert_eq!(station.contents(), &[TokenId(0)]);
            assert_eq!(token.position, station.resting_point());

            let popup = game.popup().unwrap();
            assert_eq!(popup.text, format!("{label} ing0!"));
            assert_eq!(popup.points, points);
        }
    }

    #[test]
    fn drop_outside_stations_changes_nothing_but_position() {
        let mut game = game(6, 4);
        let result = drop_on(&mut game, 1, NOWHERE);
        assert_eq!(result, DropResult::Missed);
        assert_eq!(game.state().score, 0);

        let token = game.state().token(TokenId(1)).unwrap();
        assert!(!token.is_processed());
        assert!(!token.is_dragging);
        assert_eq!(
            token.position,
            game.play_area().clamp_token(Point::new(NOWHERE.0, NOWHERE.1))
        );
        assert!(game.dragging().is_none());
    }

    #[test]
    fn drag_without_target_is_noop() {
        let mut game = game(3, 3);
        assert!(!game.begin_drag(TokenId(99)));
        game.update_drag(10.0, 10.0);
        assert_eq!(game.end_drag(PAN.0, PAN.1), DropResult::NoDrag);
        assert_eq!(game.state().score, 0);
        assert!(game.observer().events().is_empty());
    }

    #[test]
    fn update_drag_clamps_to_play_area() {
        let mut game = game(2, 2);
        game.begin_drag(TokenId(0));
        game.update_drag(-50.0, 9999.0);
        let token = game.state().token(TokenId(0)).unwrap();
        assert_eq!(token.position.x, 0.0);
        assert_eq!(token.position.y, game.play_area().height - 96.0);
        assert!(token.is_dragging);
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn step_bonus_fires_once_at_thirty_percent() {
        let mut game = game(6, 4);

        drop_on(&mut game, 0, CUTTING_BOARD);
        assert_eq!(game.state().step_index, 0);
        assert_eq!(game.state().score, 100);

        drop_on(&mut game, 1, CUTTING_BOARD);
        assert_eq!(game.state().step_index, 1);
        assert_eq!(game.state().score, 100 + 100 + 300);

        drop_on(&mut game, 2, CUTTING_BOARD);
        assert_eq!(game.state().step_index, 1);
        assert_eq!(game.state().score, 600);
    }

    #[test]
    fn completion_at_five_of_six_not_four() {
        let mut game = game(6, 4);
        for i in 0..4 {
            drop_on(&mut game, i, POT);
        }
        assert!(!game.is_completed());
        assert!(game.is_running());

        drop_on(&mut game, 4, POT);
        assert!(game.is_completed());
        assert!(!game.is_running());
    }

    #[test]
    fn completion_is_reported_once_after_delay() {
        let mut game = game(1, 2);
        drop_on(&mut game, 0, PLATE);
        assert!(game.is_completed());

        assert_eq!(game.poll(Instant::now()), None);
        assert_eq!(game.observer().completions(), 0);

        let later = Instant::now() + COMPLETION_DELAY + Duration::from_millis(10);
        let completion = game.poll(later).unwrap();
        assert_eq!(completion.final_score, 500 + 3000);
        assert!(game.is_reported());
        assert_eq!(game.observer().completions(), 1);

        assert_eq!(game.poll(later + Duration::from_secs(5)), None);
        assert_eq!(game.observer().completions(), 1);
    }

    #[test]
    fn final_score_includes_time_bonus() {
        let mut game = game(1, 2);
        for _ in 0..100 {
            game.tick_second();
        }
        // plate (200) + automatic step bonus (300)
        drop_on(&mut game, 0, PLATE);
        let completion = game.completion().unwrap();
        assert_eq!(completion.base_score, 500);
        assert_eq!(completion.time_bonus, 2000);
        assert_eq!(completion.final_score, 2500);
        assert_eq!(completion.elapsed_secs, 100);
    }

    #[test]
    fn slow_sessions_get_no_time_bonus() {
        let mut game = game(1, 1);
        for _ in 0..301 {
            game.tick_second();
        }
        drop_on(&mut game, 0, CUTTING_BOARD);
        let completion = game.completion().unwrap();
        assert_eq!(completion.time_bonus, 0);
        assert_eq!(completion.final_score, 100);
    }

    #[test]
    fn manual_advance_awards_bonus_until_last_step() {
        let mut game = game(6, 3);
        assert!(game.advance_step());
        assert!(game.advance_step());
        assert!(!game.advance_step());
        assert_eq!(game.state().step_index, 2);
        assert_eq!(game.state().score, 200);
        assert_eq!(game.current_step().step, "step 3");
    }

    #[test]
    fn auto_advance_skipped_at_last_step() {
        let mut game = game(6, 2);
        game.advance_step();
        drop_on(&mut game, 0, PAN);
        drop_on(&mut game, 1, PAN);
        assert_eq!(game.state().step_index, 1);
        assert_eq!(game.state().score, 100 + 150 + 150);
    }

    #[test]
    fn processed_token_cannot_be_processed_again() {
        let mut game = game(6, 1);
        drop_on(&mut game, 0, PAN);
        let result = drop_on(&mut game, 0, PLATE);
        assert_matches!(result, DropResult::AlreadyProcessed { station: 3 });
        assert_eq!(game.state().score, 150);
        let token = game.state().token(TokenId(0)).unwrap();
        assert_eq!(token.processed_as(), Some(StationKind::Pan));
        assert!(game.state().stations[3].contents().is_empty());
    }

    #[test]
    fn empty_recipe_never_completes() {
        let mut game = CookingGame::new(
            &Recipe::default(),
            &SessionConfig::default(),
            EventLog::new(),
        );
        assert_eq!(game.steps().len(), 3);
        assert!(!game.begin_drag(TokenId(0)));
        assert_eq!(game.end_drag(PLATE.0, PLATE.1), DropResult::NoDrag);
        assert!(game.advance_step());
        assert!(!game.is_completed());
        assert_eq!(game.snapshot().step_text, "Cook according to recipe");
    }

    #[test]
    fn abandon_stops_the_clock() {
        let mut game = game(3, 3);
        game.tick_second();
        game.tick_second();
        game.abandon();
        game.tick_second();
        game.tick_second();
        assert_eq!(game.state().elapsed_secs, 2);
        assert_eq!(game.observer().time_updates(), 2);
        assert!(!game.begin_drag(TokenId(0)));
        assert!(!game.advance_step());
    }

    #[test]
    fn completion_stops_the_clock_and_input() {
        let mut game = game(1, 1);
        game.tick_second();
        drop_on(&mut game, 0, POT);
        game.tick_second();
        assert_eq!(game.state().elapsed_secs, 1);
        assert_eq!(game.observer().time_updates(), 1);
        assert!(!game.begin_drag(TokenId(0)));
    }

    #[test]
    fn observer_sees_score_and_step_changes() {
        let mut game = game(6, 4);
        drop_on(&mut game, 0, CUTTING_BOARD);
        drop_on(&mut game, 1, PAN);
        let events = game.observer_mut().drain();
        assert_eq!(
            events,
            vec![
                GameEvent::ScoreUpdated(100),
                GameEvent::PointsEarned {
                    label: "chopped".into(),
                    points: 100
                },
                GameEvent::ScoreUpdated(250),
                GameEvent::PointsEarned {
                    label: "fried".into(),
                    points: 150
                },
                GameEvent::StepChanged(1),
                GameEvent::ScoreUpdated(550),
            ]
        );
    }

    #[test]
    fn cues_follow_station_and_step() {
        let sink = RecordingSink::default();
        let played = sink.0.clone();
        let mut game = game(6, 4).with_cues(Box::new(sink));
        drop_on(&mut game, 0, CUTTING_BOARD);
        drop_on(&mut game, 1, PLATE);
        game.advance_step();
        assert_eq!(
            *played.borrow(),
            vec![
                Cue::for_station(StationKind::CuttingBoard),
                Cue::for_station(StationKind::Plate),
                Cue::AUTO_STEP,
                Cue::MANUAL_STEP,
            ]
        );
    }

    #[test]
    fn popup_expires() {
        let mut game = game(6, 4);
        drop_on(&mut game, 0, PAN);
        assert!(game.popup().is_some());
        game.poll(Instant::now());
        assert!(game.popup().is_some());
        game.poll(Instant::now() + POPUP_DURATION + Duration::from_millis(10));
        assert!(game.popup().is_none());
    }

    #[test]
    fn narrow_area_uses_compact_layout() {
        let config = SessionConfig::new(PlayArea::new(500.0, 400.0));
        let game = CookingGame::new(&recipe(2, 2), &config, EventLog::new());
        assert_eq!(game.state().viewport, ViewportClass::Narrow);
        assert_eq!(
            game.state().stations[0].rect,
            Rect::new(260.0, 80.0, 80.0, 60.0)
        );
    }

    #[test]
    fn token_at_finds_token_under_pointer() {
        let game = game(6, 4);
        assert_eq!(game.token_at(40.0, 110.0), Some(TokenId(0)));
        assert_eq!(game.token_at(160.0, 230.0), Some(TokenId(4)));
        assert_eq!(game.token_at(1000.0, 5.0), None);
    }

    #[test]
    fn hover_tracks_pointer() {
        let mut game = game(2, 2);
        game.hover(PAN.0, PAN.1);
        let hovered: Vec<bool> = game.state().stations.iter().map(|s| s.is_hovered).collect();
        assert_eq!(hovered, vec![false, true, false, false]);
    }

    #[test]
    fn dragging_moves_hover_and_release_clears_it() {
        let mut game = game(2, 2);
        assert!(game.begin_drag(TokenId(0)));
        game.update_drag(POT.0, POT.1);
        assert!(game.state().stations[2].is_hovered);
        game.update_drag(NOWHERE.0, NOWHERE.1);
        assert!(game.state().stations.iter().all(|s| !s.is_hovered));
        game.update_drag(PLATE.0, PLATE.1);
        assert!(game.state().stations[3].is_hovered);

        game.end_drag(PLATE.0, PLATE.1);
        assert!(game.state().stations.iter().all(|s| !s.is_hovered));
    }

    #[test]
    fn processed_token_cannot_be_picked_up_from_its_station() {
        let mut game = game(3, 3);
        assert!(game.begin_drag(TokenId(0)));
        game.update_drag(CUTTING_BOARD.0, CUTTING_BOARD.1);
        assert_matches!(
            game.end_drag(CUTTING_BOARD.0, CUTTING_BOARD.1),
            DropResult::Placed { station: 0, .. }
        );
        let resting = game.state().stations[0].resting_point();
        assert_eq!(game.state().tokens[0].position, resting);

        // pressing on the station finds nothing to grab
        assert_eq!(game.token_at(resting.x + 40.0, resting.y + 40.0), None);

        // even a drag started by id leaves the token where it was processed
        assert!(game.begin_drag(TokenId(0)));
        game.update_drag(NOWHERE.0, NOWHERE.1);
        assert_eq!(game.end_drag(NOWHERE.0, NOWHERE.1), DropResult::Missed);
        assert_eq!(game.state().tokens[0].position, resting);

        assert!(game.begin_drag(TokenId(0)));
        game.update_drag(PAN.0, PAN.1);
        assert_matches!(
            game.end_drag(PAN.0, PAN.1),
            DropResult::AlreadyProcessed { station: 1 }
        );
        assert_eq!(game.state().tokens[0].position, resting);
        assert_eq!(game.state().stations[0].contents(), &[TokenId(0)]);
        assert!(game.state().stations[1].contents().is_empty());
    }

    #[test]
    fn token_at_prefers_the_token_drawn_on_top() {
        let mut game = game(3, 3);
        // drop token 2 onto token 0 away from every station
        let under = game.state().tokens[0].position;
        assert!(game.begin_drag(TokenId(2)));
        game.update_drag(under.x + 10.0, under.y + 10.0);
        let grab = (under.x + 20.0, under.y + 20.0);
        assert_eq!(game.token_at(grab.0, grab.1), Some(TokenId(2)));
        assert_eq!(game.end_drag(under.x + 10.0, under.y + 10.0), DropResult::Missed);

        // released tokens stack by index, highest on top
        assert_eq!(game.token_at(grab.0, grab.1), Some(TokenId(2)));

        // while token 0 is held over token 2 it is the one on top
        assert!(game.begin_drag(TokenId(0)));
        let held = game.state().tokens[2].position;
        game.update_drag(held.x, held.y);
        assert_eq!(game.token_at(held.x + 30.0, held.y + 30.0), Some(TokenId(0)));
    }

    #[test]
    fn invariants_hold_under_random_play() {
        let targets = [CUTTING_BOARD, PAN, POT, PLATE, NOWHERE];
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = game(rng.gen_range(0..=6), rng.gen_range(1..=5));
            let mut last_score = 0;
            let mut last_step = 0;
            let mut completions = 0;
            let mut was_completed = false;

            for _ in 0..60 {
                match rng.gen_range(0..4) {
                    0 => {
                        let token = TokenId(rng.gen_range(0..7));
                        let at = targets[rng.gen_range(0..targets.len())];
                        if game.begin_drag(token) {
                            game.update_drag(at.0, at.1);
                            game.end_drag(at.0, at.1);
                        }
                    }
                    1 => {
                        game.advance_step();
                    }
                    2 => game.tick_second(),
                    _ => {
                        if game
                            .poll(Instant::now() + COMPLETION_DELAY + Duration::from_millis(1))
                            .is_some()
                        {
                            completions += 1;
                        }
                    }
                }

                let state = game.state();
                assert!(state.score >= last_score);
                assert!(state.step_index >= last_step);
                assert!(state.step_index < state.step_count);
                assert!(!(was_completed && !state.completed));
                last_score = state.score;
                last_step = state.step_index;
                was_completed = state.completed;
            }
            assert!(completions <= 1);
        }
    }
}
