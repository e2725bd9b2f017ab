/// Recalculation scheduler.
///
/// The periodic driver of the whole pipeline. One cycle walks every source
/// in strict per-source order — simulate readings, score, append history,
/// evaluate alerts, trend, forecast — and commits all writes together at
/// the end. Any unhandled error mid-cycle rolls the entire cycle back:
/// one source's failure must not half-apply another's uncommitted rows.
///
/// The run loop is single-threaded (run, sleep, repeat), so overlapping
/// cycles cannot occur in-process.

use rand::Rng;
use std::time::Duration;

use crate::alert::{self, engine};
use crate::analysis::forecast::ForecastModel;
use crate::logging::{log_cycle_summary, Logger, Subsystem};
use crate::model::StoreError;
use crate::orchestrate::apply_risk_update;
use crate::push::PushGateway;
use crate::realtime::EventPublisher;
use crate::risk::calculate_risk;
use crate::simulate::{simulate_rainfall, simulate_water_level};
use crate::store::RiskStore;

/// Forecasted score at or above which a "forecasted critical" warning is
/// logged. Logged only — forecasts never raise alerts.
pub const FORECAST_WARNING_THRESHOLD: f64 = 80.0;

/// Counters for one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub sources: usize,
    pub alerts_created: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub forecast_warnings: usize,
}

/// Run one recalculation cycle over all sources, inside a single
/// transaction on the store.
pub fn run_cycle<R: Rng>(
    store: &mut dyn RiskStore,
    publisher: &mut dyn EventPublisher,
    gateway: &dyn PushGateway,
    model: &dyn ForecastModel,
    logger: &Logger,
    rng: &mut R,
) -> Result<CycleSummary, StoreError> {
    store.begin()?;

    match cycle_body(store, publisher, gateway, model, logger, rng) {
        Ok(summary) => {
            store.commit()?;
            log_cycle_summary(
                logger,
                summary.sources,
                summary.alerts_created,
                summary.notifications_failed,
            );
            Ok(summary)
        }
        Err(e) => {
            logger.error(Subsystem::Scheduler, None, &format!("Cycle failed: {}", e));
            if let Err(rollback_err) = store.rollback() {
                logger.error(
                    Subsystem::Scheduler,
                    None,
                    &format!("Rollback failed: {}", rollback_err),
                );
            }
            Err(e)
        }
    }
}

fn cycle_body<R: Rng>(
    store: &mut dyn RiskStore,
    publisher: &mut dyn EventPublisher,
    gateway: &dyn PushGateway,
    model: &dyn ForecastModel,
    logger: &Logger,
    rng: &mut R,
) -> Result<CycleSummary, StoreError> {
    let mut summary = CycleSummary::default();

    for source in store.get_all_sources()? {
        summary.sources += 1;

        // Simulate and persist fresh environmental readings.
        let rainfall = simulate_rainfall(source.rainfall, rng);
        let water_level = simulate_water_level(source.water_level, rng);
        store.update_readings(source.id, rainfall, water_level)?;

        let mut current = source.clone();
        current.rainfall = Some(rainfall);
        current.water_level = Some(water_level);

        // Score and append the immutable history record.
        let risk = calculate_risk(rainfall, water_level);
        store.append_history(current.id, current.organization_id, risk)?;
        logger.info(
            Subsystem::Scheduler,
            Some(current.id),
            &format!("Risk recalculated: {}", risk),
        );

        // Alert tiers below the notify threshold are recorded here; the
        // orchestrator raises and escalates notify-threshold alerts itself.
        if let Some(level) = engine::level_for(risk) {
            if !engine::evaluate_alert(risk) {
                let outcome = alert::create_or_update(store, &current, risk, level)?;
                if outcome.created {
                    summary.alerts_created += 1;
                }
            }
        }

        // Score persist, trend, explanation, alert escalation, dashboard,
        // realtime publish.
        let outcome = apply_risk_update(store, publisher, gateway, model, logger, &current, risk)?;
        if outcome.alert.as_ref().is_some_and(|a| a.created) {
            summary.alerts_created += 1;
        }
        summary.notifications_sent += outcome.notifications.sent;
        summary.notifications_failed += outcome.notifications.failed;

        // Forecast lookahead: a projected breach is logged, never alerted.
        if let Some(forecast) = outcome.entry.forecast {
            if forecast >= FORECAST_WARNING_THRESHOLD {
                summary.forecast_warnings += 1;
                logger.warn(
                    Subsystem::Scheduler,
                    Some(current.id),
                    &format!("Forecasted CRITICAL risk: {:.1}", forecast),
                );
            }
        }
    }

    Ok(summary)
}

/// Run recalculation cycles forever at the configured interval. A failed
/// cycle is logged and the next scheduled run proceeds independently.
pub fn run_forever<R: Rng>(
    store: &mut dyn RiskStore,
    publisher: &mut dyn EventPublisher,
    gateway: &dyn PushGateway,
    model: &dyn ForecastModel,
    logger: &Logger,
    rng: &mut R,
    interval: Duration,
) -> ! {
    loop {
        // run_cycle already logged any failure and rolled the cycle back.
        let _ = run_cycle(store, publisher, gateway, model, logger, rng);
        std::thread::sleep(interval);
    }
}
