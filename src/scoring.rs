//! Point tables and the pure arithmetic behind step progression and the
//! final score.

use crate::kitchen::StationKind;

/// Share of tokens (percent) that must be processed for the automatic step advance
pub const STEP_ADVANCE_PERCENT: usize = 30;
/// Share of tokens (percent) that completes the session
pub const COMPLETION_PERCENT: usize = 80;
pub const AUTO_STEP_BONUS: u64 = 300;
pub const MANUAL_STEP_BONUS: u64 = 100;
/// Sessions finished faster than this earn a time bonus
pub const PAR_SECONDS: u64 = 300;
pub const TIME_BONUS_PER_SECOND: u64 = 10;
/// Score that maps to 100% accuracy
pub const ACCURACY_FULL_SCORE: f64 = 10_000.0;

/// What a station does to an ingredient and what it pays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Processing {
    pub label: &'static str,
    pub points: u64,
}

pub fn processing_for(kind: StationKind) -> Processing {
    let (label, points) = match kind {
        StationKind::CuttingBoard => ("chopped", 100),
        StationKind::Pan => ("fried", 150),
        StationKind::Pot => ("boiled", 150),
        StationKind::Oven => ("baked", 150),
        StationKind::Plate => ("plated", 200),
    };
    Processing { label, points }
}

/// `ceil(total * percent / 100)` in integers, or `None` for an empty session
pub fn threshold(total: usize, percent: usize) -> Option<usize> {
    (total > 0).then(|| (total * percent).div_ceil(100))
}

pub fn reaches(processed: usize, total: usize, percent: usize) -> bool {
    threshold(total, percent).is_some_and(|needed| processed >= needed)
}

pub fn time_bonus(elapsed_secs: u64) -> u64 {
    PAR_SECONDS.saturating_sub(elapsed_secs) * TIME_BONUS_PER_SECOND
}

pub fn final_score(score: u64, elapsed_secs: u64) -> u64 {
    score + time_bonus(elapsed_secs)
}

/// Percentage derived linearly from the final score, capped at 100
pub fn accuracy(final_score: u64) -> u8 {
    ((final_score as f64 / ACCURACY_FULL_SCORE) * 100.0)
        .round()
        .min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_table() {
        assert_eq!(processing_for(StationKind::CuttingBoard).points, 100);
        assert_eq!(processing_for(StationKind::Pan).label, "fried");
        assert_eq!(processing_for(StationKind::Pot).points, 150);
        assert_eq!(processing_for(StationKind::Plate).points, 200);
        assert_eq!(processing_for(StationKind::Plate).label, "plated");
    }

    #[test]
    fn thresholds_for_six_tokens() {
        assert_eq!(threshold(6, STEP_ADVANCE_PERCENT), Some(2));
        assert_eq!(threshold(6, COMPLETION_PERCENT), Some(5));
        assert!(!reaches(4, 6, COMPLETION_PERCENT));
        assert!(reaches(5, 6, COMPLETION_PERCENT));
    }

    #[test]
    fn thresholds_for_small_sessions() {
        assert_eq!(threshold(1, STEP_ADVANCE_PERCENT), Some(1));
        assert_eq!(threshold(3, STEP_ADVANCE_PERCENT), Some(1));
        assert_eq!(threshold(5, COMPLETION_PERCENT), Some(4));
        assert_eq!(threshold(10, STEP_ADVANCE_PERCENT), Some(3));
    }

    #[test]
    fn empty_session_never_reaches() {
        assert_eq!(threshold(0, COMPLETION_PERCENT), None);
        assert!(!reaches(0, 0, STEP_ADVANCE_PERCENT));
    }

    #[test]
    fn final_score_with_time_bonus() {
        assert_eq!(final_score(500, 100), 2500);
        assert_eq!(time_bonus(300), 0);
        assert_eq!(time_bonus(1200), 0);
        assert_eq!(final_score(700, 450), 700);
    }

    #[test]
    fn accuracy_mapping() {
        assert_eq!(accuracy(8000), 80);
        assert_eq!(accuracy(0), 0);
        assert_eq!(accuracy(9400), 94);
        assert_eq!(accuracy(25_000), 100);
    }
}
