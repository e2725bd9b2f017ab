/// Trend analysis over recent risk scores.
///
/// Input is ordered most-recent-last, semantically the last ≤5 history
/// records for a source. The signal is a 3-point window: the delta between
/// the newest score and the third-from-newest, with a ±10 dead band.

use crate::model::Trend;

/// Delta beyond which the trend counts as directional rather than noise.
pub const TREND_DEAD_BAND: f64 = 10.0;

/// Number of history records the callers feed this analysis.
pub const TREND_WINDOW: usize = 5;

/// Classify the direction of a recent-score sequence.
///
/// Fewer than 3 scores is defined as `Stable` — insufficient data is a
/// default, never an error.
pub fn calculate_trend(scores: &[f64]) -> Trend {
    if scores.len() < 3 {
        return Trend::Stable;
    }

    let delta = scores[scores.len() - 1] - scores[scores.len() - 3];

    if delta > TREND_DEAD_BAND {
        Trend::Rising
    } else if delta < -TREND_DEAD_BAND {
        Trend::Falling
    } else {
        Trend::Stable
    }
}
