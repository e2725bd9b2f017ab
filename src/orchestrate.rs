/// Risk update orchestrator.
///
/// The effectful shell around the pure scoring components: given a source
/// and its newly computed score, persist the score, derive trend and
/// explanation, raise/escalate the alert when the score crosses the notify
/// threshold, build the dashboard projection, and publish it on the
/// realtime channel.
///
/// Failure semantics: the realtime publish and the push fan-out are
/// best-effort — their failures are logged and never unwind the already
/// persisted steps. Store failures propagate to the caller, which owns the
/// cycle transaction boundary.

use crate::alert::{self, engine, AlertOutcome};
use crate::analysis::forecast::ForecastModel;
use crate::analysis::trends::{calculate_trend, TREND_WINDOW};
use crate::dashboard::{build_source_dashboard, DashboardEntry};
use crate::explain::explain_risk;
use crate::logging::{Logger, Subsystem};
use crate::model::{StoreError, WaterSource};
use crate::push::{send_alert_notifications, FanoutSummary, PushGateway};
use crate::realtime::{EventPublisher, RiskEvent};
use crate::store::RiskStore;

/// What one orchestration pass did for a source.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub entry: DashboardEntry,
    /// Alert evaluation result when the score crossed the notify threshold.
    pub alert: Option<AlertOutcome>,
    pub notifications: FanoutSummary,
}

/// Run the full side-effecting update pipeline for one source.
///
/// `source` must carry the readings the score was computed from; the
/// history record for `new_score` must already be appended.
pub fn apply_risk_update(
    store: &mut dyn RiskStore,
    publisher: &mut dyn EventPublisher,
    gateway: &dyn PushGateway,
    model: &dyn ForecastModel,
    logger: &Logger,
    source: &WaterSource,
    new_score: i32,
) -> Result<UpdateOutcome, StoreError> {
    // 1. Persist the new score on the source.
    store.update_risk_score(source.id, new_score as f64)?;

    // 2. Trend over the recent window.
    let recent = store.recent_scores(source.id, TREND_WINDOW)?;
    let trend = calculate_trend(&recent);

    // 3. Explanation from the readings behind the score.
    let rainfall = source.rainfall.unwrap_or(0.0);
    let water_level = source.water_level.unwrap_or(0.0);
    let explanation = explain_risk(rainfall, water_level, new_score as f64, trend);

    // 4. Alert evaluation at the notify threshold, then push fan-out for a
    //    freshly created alert. Fan-out failures are contained here.
    let mut alert_outcome = None;
    let mut notifications = FanoutSummary::default();
    if engine::evaluate_alert(new_score) {
        if let Some(level) = engine::level_for(new_score) {
            let outcome = alert::create_or_update(store, source, new_score, level)?;
            if outcome.created {
                logger.warn(
                    Subsystem::Orchestrator,
                    Some(source.id),
                    &format!("ALERT: {} risk at {}%", source.name, new_score),
                );
                match send_alert_notifications(
                    store,
                    gateway,
                    logger,
                    &outcome.alert,
                    &source.name,
                    new_score as f64,
                ) {
                    Ok(summary) => notifications = summary,
                    Err(e) => logger.error(
                        Subsystem::Orchestrator,
                        Some(source.id),
                        &format!("Notification fan-out failed: {}", e),
                    ),
                }
            }
            alert_outcome = Some(outcome);
        }
    }

    // 5. Dashboard projection with the explanation attached.
    let mut updated = source.clone();
    updated.risk_score = Some(new_score as f64);
    let history = store.full_history(source.id)?;
    let mut entry = build_source_dashboard(&updated, &history, model);
    entry.explanation = Some(explanation);

    // 6. Realtime publish, keyed by source id. Fire-and-forget: a broken
    //    transport must not roll back the committed update.
    match serde_json::to_value(&entry) {
        Ok(payload) => {
            let event = RiskEvent::risk_update(source.id, payload);
            if let Err(e) = publisher.publish(&event) {
                logger.error(Subsystem::Realtime, Some(source.id), &e.to_string());
            }
        }
        Err(e) => logger.error(
            Subsystem::Realtime,
            Some(source.id),
            &format!("Payload serialization failed: {}", e),
        ),
    }

    Ok(UpdateOutcome {
        entry,
        alert: alert_outcome,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::forecast::LinearForecaster;
    use crate::logging::{LogLevel, Logger};
    use crate::model::{AlertLevel, DashboardStatus, Trend};
    use crate::push::{PushError, PushReceipt};
    use crate::realtime::{MemoryPublisher, PublishError};
    use crate::store::memory::MemoryStore;

    struct OkGateway;

    impl PushGateway for OkGateway {
        fn send(
            &self,
            _token: &str,
            _title: &str,
            _body: &str,
            _data: Option<serde_json::Value>,
        ) -> Result<PushReceipt, PushError> {
            Ok(PushReceipt {
                delivered: true,
                ticket_id: Some("t".into()),
            })
        }

        fn send_batch(
            &self,
            tokens: &[String],
            title: &str,
            body: &str,
            data: Option<serde_json::Value>,
        ) -> Vec<Result<PushReceipt, PushError>> {
            tokens
                .iter()
                .map(|t| self.send(t, title, body, data.clone()))
                .collect()
        }
    }

    struct BrokenPublisher;

    impl EventPublisher for BrokenPublisher {
        fn publish(&mut self, _event: &RiskEvent) -> Result<(), PublishError> {
            Err(PublishError("channel closed".into()))
        }
    }

    fn setup() -> (MemoryStore, WaterSource) {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well A", 1.0, 2.0, Some(30.0), Some(10.0), 1);
        store.add_user(1, Some("ExponentPushToken[aaa]"), true);
        let source = store
            .get_all_sources()
            .unwrap()
            .into_iter()
            .find(|s| s.id == id)
            .unwrap();
        (store, source)
    }

    #[test]
    fn test_critical_score_creates_alert_and_notifies() {
        let (mut store, source) = setup();
        store.append_history(source.id, 1, 100).unwrap();

        let mut publisher = MemoryPublisher::new();
        let logger = Logger::console(LogLevel::Error);
        let outcome = apply_risk_update(
            &mut store,
            &mut publisher,
            &OkGateway,
            &LinearForecaster,
            &logger,
            &source,
            100,
        )
        .unwrap();

        let alert = outcome.alert.expect("score 100 must evaluate an alert");
        assert!(alert.created);
        assert_eq!(alert.alert.level, AlertLevel::Critical);
        assert_eq!(outcome.notifications.sent, 1);
        assert_eq!(store.get_all_sources().unwrap()[0].risk_score, Some(100.0));
    }

    #[test]
    fn test_sub_threshold_score_skips_alert_path() {
        let (mut store, source) = setup();
        store.append_history(source.id, 1, 60).unwrap();

        let mut publisher = MemoryPublisher::new();
        let logger = Logger::console(LogLevel::Error);
        let outcome = apply_risk_update(
            &mut store,
            &mut publisher,
            &OkGateway,
            &LinearForecaster,
            &logger,
            &source,
            60,
        )
        .unwrap();

        assert!(outcome.alert.is_none(), "score 60 is below the notify threshold");
        assert!(store.alerts().is_empty());
        assert_eq!(outcome.notifications.attempted, 0);
        // The dashboard and publish steps still run.
        assert_eq!(publisher.events.len(), 1);
    }

    #[test]
    fn test_repeat_critical_suppresses_duplicate_and_renotification() {
        let (mut store, source) = setup();
        let mut publisher = MemoryPublisher::new();
        let logger = Logger::console(LogLevel::Error);

        for _ in 0..2 {
            store.append_history(source.id, 1, 100).unwrap();
            apply_risk_update(
                &mut store,
                &mut publisher,
                &OkGateway,
                &LinearForecaster,
                &logger,
                &source,
                100,
            )
            .unwrap();
        }

        assert_eq!(store.alerts().len(), 1, "same open level must not duplicate");
        assert_eq!(store.notifications().len(), 1, "suppressed alert must not re-notify");
        assert_eq!(publisher.events.len(), 2, "dashboard still publishes every pass");
    }

    #[test]
    fn test_publish_failure_does_not_abort_persisted_steps() {
        let (mut store, source) = setup();
        store.append_history(source.id, 1, 100).unwrap();

        let logger = Logger::console(LogLevel::Error);
        let outcome = apply_risk_update(
            &mut store,
            &mut BrokenPublisher,
            &OkGateway,
            &LinearForecaster,
            &logger,
            &source,
            100,
        );

        assert!(outcome.is_ok(), "broken realtime channel must not fail the update");
        assert_eq!(store.get_all_sources().unwrap()[0].risk_score, Some(100.0));
        assert_eq!(store.alerts().len(), 1);
    }

    #[test]
    fn test_published_payload_matches_dashboard_shape() {
        let (mut store, source) = setup();
        for score in [40, 40, 60, 60, 100] {
            store.append_history(source.id, 1, score).unwrap();
        }

        let mut publisher = MemoryPublisher::new();
        let logger = Logger::console(LogLevel::Error);
        apply_risk_update(
            &mut store,
            &mut publisher,
            &OkGateway,
            &LinearForecaster,
            &logger,
            &source,
            100,
        )
        .unwrap();

        let event = &publisher.events[0];
        assert_eq!(event.source_id, source.id);
        assert_eq!(event.data["status"], "critical");
        assert_eq!(event.data["risk_score"], 100.0);
        assert!(event.data["forecast"].is_number(), "5 records should forecast");
        assert_eq!(event.data["explanation"]["primary_driver"], "rainfall");
    }

    #[test]
    fn test_trend_and_status_reflect_history() {
        let (mut store, source) = setup();
        for score in [40, 40, 40, 60, 100] {
            store.append_history(source.id, 1, score).unwrap();
        }

        let mut publisher = MemoryPublisher::new();
        let logger = Logger::console(LogLevel::Error);
        let outcome = apply_risk_update(
            &mut store,
            &mut publisher,
            &OkGateway,
            &LinearForecaster,
            &logger,
            &source,
            100,
        )
        .unwrap();

        assert_eq!(outcome.entry.trend, Trend::Rising);
        assert_eq!(outcome.entry.status, DashboardStatus::Critical);
    }
}
