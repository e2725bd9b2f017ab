/// Near-term risk forecasting.
///
/// The pipeline depends only on the [`ForecastModel`] contract: given a
/// chronological score sequence, return one extrapolated next value,
/// deterministically and without side effects. [`LinearForecaster`] is the
/// default implementation — an ordinary least-squares fit over the
/// index-vs-score series, extrapolated one step ahead.
///
/// The prediction is a raw float: it is not clamped to [0, 100] here;
/// callers apply presentation rounding only.

/// Minimum history length before a forecast is attempted. Below this the
/// pipeline reports "no prediction available" rather than extrapolating
/// from noise.
pub const MIN_FORECAST_HISTORY: usize = 5;

/// Numeric collaborator contract consumed by the pipeline.
pub trait ForecastModel {
    /// Fit the model to a chronological score sequence and predict the next
    /// value. Only called with at least [`MIN_FORECAST_HISTORY`] scores.
    fn fit_and_predict_next(&self, scores: &[f64]) -> f64;
}

/// Forecast the next risk score for a source, or `None` when the history is
/// too short. The insufficient-data case is a defined sentinel, not an
/// error.
pub fn forecast_next_risk(history: &[f64], model: &dyn ForecastModel) -> Option<f64> {
    if history.len() < MIN_FORECAST_HISTORY {
        return None;
    }
    Some(model.fit_and_predict_next(history))
}

// ---------------------------------------------------------------------------
// Least-squares implementation
// ---------------------------------------------------------------------------

/// Ordinary least-squares line fit over (index, score) pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearForecaster;

impl ForecastModel for LinearForecaster {
    fn fit_and_predict_next(&self, scores: &[f64]) -> f64 {
        let n = scores.len();
        let n_f64 = n as f64;

        let sum_x: f64 = (0..n).map(|i| i as f64).sum();
        let sum_y: f64 = scores.iter().sum();
        let sum_xy: f64 = scores.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
        let sum_xx: f64 = (0..n).map(|i| (i * i) as f64).sum();

        let denominator = n_f64 * sum_xx - sum_x * sum_x;
        if denominator.abs() < 1e-10 {
            // Degenerate series; a flat continuation is the only sane answer.
            return scores[n - 1];
        }

        let slope = (n_f64 * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n_f64;

        // One step past the last observed index.
        slope * n_f64 + intercept
    }
}
