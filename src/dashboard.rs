/// Dashboard projection builder.
///
/// Assembles the per-source read model served to clients: current score (one
/// decimal), trend over the recent window, one-step forecast, UI status, and
/// optionally the attached explanation. Derived, never persisted; building
/// it twice from unchanged history yields identical output.

use serde::Serialize;

use crate::analysis::forecast::{forecast_next_risk, ForecastModel};
use crate::analysis::trends::{calculate_trend, TREND_WINDOW};
use crate::explain::RiskExplanation;
use crate::model::{DashboardStatus, Trend, WaterSource};
use crate::simulate::round1;

/// UI status breakpoints. Coarser than the alert tiers in
/// `alert::engine` by design; see the note on [`DashboardStatus`].
pub fn map_status(risk: f64) -> DashboardStatus {
    if risk >= 80.0 {
        DashboardStatus::Critical
    } else if risk >= 60.0 {
        DashboardStatus::High
    } else if risk >= 30.0 {
        DashboardStatus::Moderate
    } else {
        DashboardStatus::Safe
    }
}

/// Per-source dashboard read model, field-exact to the realtime payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardEntry {
    pub id: i32,
    pub name: String,
    pub risk_score: f64,
    pub trend: Trend,
    pub forecast: Option<f64>,
    pub status: DashboardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<RiskExplanation>,
}

/// Build the dashboard entry for one source from its full chronological
/// score history.
pub fn build_source_dashboard(
    source: &WaterSource,
    history: &[f64],
    model: &dyn ForecastModel,
) -> DashboardEntry {
    let start = history.len().saturating_sub(TREND_WINDOW);
    let trend = calculate_trend(&history[start..]);
    let forecast = forecast_next_risk(history, model).map(round1);
    let risk_score = round1(source.risk_score.unwrap_or(0.0));

    DashboardEntry {
        id: source.id,
        name: source.name.clone(),
        risk_score,
        trend,
        forecast,
        status: map_status(risk_score),
        explanation: None,
    }
}
