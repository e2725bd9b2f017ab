/// Derived-signal analysis over a source's risk history.
///
/// Both submodules are pure: they take ordered score sequences and return
/// defined defaults when there is too little history, never an error.
///
/// Submodules:
/// - `trends` — coarse rising/falling/stable direction over recent scores.
/// - `forecast` — one-step linear extrapolation over the full history.

pub mod forecast;
pub mod trends;

use crate::model::{StoreError, Trend};
use crate::store::RiskStore;

/// Trend over a source's full persisted history, for analytics queries
/// (the dashboard uses only the recent window).
pub fn source_trend(store: &mut dyn RiskStore, source_id: i32) -> Result<Trend, StoreError> {
    let history = store.full_history(source_id)?;
    Ok(trends::calculate_trend(&history))
}

/// One-step forecast over a source's full persisted history, or `None`
/// when there is not enough data.
pub fn source_forecast(
    store: &mut dyn RiskStore,
    source_id: i32,
    model: &dyn forecast::ForecastModel,
) -> Result<Option<f64>, StoreError> {
    let history = store.full_history(source_id)?;
    Ok(forecast::forecast_next_risk(&history, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::forecast::LinearForecaster;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_source_trend_over_full_history() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well", 0.0, 0.0, None, None, 1);
        for score in [0, 40, 60] {
            store.append_history(id, 1, score).unwrap();
        }

        assert_eq!(source_trend(&mut store, id).unwrap(), Trend::Rising);
    }

    #[test]
    fn test_source_forecast_needs_five_records() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well", 0.0, 0.0, None, None, 1);
        for score in [40, 40, 40, 40] {
            store.append_history(id, 1, score).unwrap();
        }
        assert_eq!(
            source_forecast(&mut store, id, &LinearForecaster).unwrap(),
            None
        );

        store.append_history(id, 1, 40).unwrap();
        let predicted = source_forecast(&mut store, id, &LinearForecaster)
            .unwrap()
            .expect("five records should forecast");
        assert!((predicted - 40.0).abs() < 1e-9);
    }
}
