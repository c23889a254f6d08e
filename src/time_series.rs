/// Cumulative score at an elapsed second, for the results chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePoint {
    pub t: u64,
    pub score: u64,
}

impl ScorePoint {
    pub fn new(t: u64, score: u64) -> Self {
        Self { t, score }
    }
}

impl From<(u64, u64)> for ScorePoint {
    fn from(v: (u64, u64)) -> Self {
        ScorePoint { t: v.0, score: v.1 }
    }
}

impl From<ScorePoint> for (f64, f64) {
    fn from(p: ScorePoint) -> Self {
        (p.t as f64, p.score as f64)
    }
}
