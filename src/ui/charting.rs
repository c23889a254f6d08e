use crate::time_series::ScorePoint;

/// Compute X (seconds) and Y (score) bounds for the results chart
pub fn compute_chart_params(series: &[(f64, f64)]) -> (f64, f64) {
    let highest_score = series.iter().map(|&(_, score)| score).fold(1.0, f64::max);
    let overall_duration = series.last().map_or(1.0, |&(t, _)| t).max(1.0);

    (overall_duration, highest_score)
}

/// Chart series with a closing point at the session's final second so the
/// line reaches the right edge.
pub fn chart_series(points: &[ScorePoint], elapsed_secs: u64) -> Vec<(f64, f64)> {
    let mut series: Vec<(f64, f64)> = points.iter().map(|p| (*p).into()).collect();
    if let Some(last) = points.last() {
        if last.t < elapsed_secs {
            series.push((elapsed_secs as f64, last.score as f64));
        }
    }
    series
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
