/// Notifications emitted by a cooking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    ScoreUpdated(u64),
    TimeUpdated(u64),
    StepChanged(usize),
    PointsEarned { label: String, points: u64 },
    Completed { final_score: u64, elapsed_secs: u64 },
}

/// Observer the engine reports to. Every hook defaults to a no-op so a
/// shell only implements what it renders.
pub trait GameObserver {
    fn on_score_update(&mut self, _score: u64) {}
    fn on_time_update(&mut self, _seconds: u64) {}
    fn on_step_change(&mut self, _step: usize) {}
    fn on_points(&mut self, _label: &str, _points: u64) {}
    /// Fires exactly once per session, after the completion display delay.
    fn on_complete(&mut self, _final_score: u64, _elapsed_secs: u64) {}
}

/// Observer that queues every notification for the caller to drain
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn time_updates(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::TimeUpdated(_)))
            .count()
    }

    pub fn completions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Completed { .. }))
            .count()
    }
}

impl GameObserver for EventLog {
    fn on_score_update(&mut self, score: u64) {
        self.events.push(GameEvent::ScoreUpdated(score));
    }

    fn on_time_update(&mut self, seconds: u64) {
        self.events.push(GameEvent::TimeUpdated(seconds));
    }

    fn on_step_change(&mut self, step: usize) {
        self.events.push(GameEvent::StepChanged(step));
    }

    fn on_points(&mut self, label: &str, points: u64) {
        self.events.push(GameEvent::PointsEarned {
            label: label.to_string(),
            points,
        });
    }

    fn on_complete(&mut self, final_score: u64, elapsed_secs: u64) {
        self.events.push(GameEvent::Completed {
            final_score,
            elapsed_secs,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_and_drains() {
        let mut log = EventLog::new();
        log.on_score_update(100);
        log.on_time_update(1);
        log.on_time_update(2);
        log.on_complete(2500, 2);

        assert_eq!(log.time_updates(), 2);
        assert_eq!(log.completions(), 1);
        assert_eq!(log.events()[0], GameEvent::ScoreUpdated(100));

        let drained = log.drain();
        assert_eq!(drained.len(), 4);
        assert!(log.events().is_empty());
    }
}
