//! Alert evaluation: pure decisions in `engine`, side-effecting
//! creation/dedup here.

pub mod engine;

use crate::model::{Alert, AlertLevel, StoreError, WaterSource};
use crate::store::RiskStore;

/// Result of an alert evaluation pass for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertOutcome {
    pub alert: Alert,
    /// True when a fresh alert row was inserted this pass; false when the
    /// existing open alert suppressed it.
    pub created: bool,
}

/// Create a new alert for the source unless the canonical suppression rule
/// says the open alert already covers it.
///
/// The rule is [`engine::should_trigger`] — suppress only a same-level
/// unacknowledged alert; re-trigger on level change or after
/// acknowledgement. This is the single dedup call site for both the
/// scheduler and the orchestrator.
pub fn create_or_update(
    store: &mut dyn RiskStore,
    source: &WaterSource,
    risk_score: i32,
    level: AlertLevel,
) -> Result<AlertOutcome, StoreError> {
    match store.open_alert(source.id)? {
        Some(existing) if !engine::should_trigger(Some(&existing), level) => Ok(AlertOutcome {
            alert: existing,
            created: false,
        }),
        _ => {
            let message = format!("Risk level is {} ({}%)", level.as_upper(), risk_score);
            let alert = store.create_alert(source.id, source.organization_id, level, &message)?;
            Ok(AlertOutcome { alert, created: true })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn source(store: &mut MemoryStore) -> WaterSource {
        let id = store.add_source("Test Borehole", 0.0, 0.0, Some(30.0), Some(10.0), 1);
        store
            .get_all_sources()
            .expect("memory store never fails")
            .into_iter()
            .find(|s| s.id == id)
            .expect("source just added")
    }

    #[test]
    fn test_first_alert_is_created_with_message() {
        let mut store = MemoryStore::new();
        let src = source(&mut store);

        let outcome = create_or_update(&mut store, &src, 100, AlertLevel::Critical)
            .expect("memory store never fails");
        assert!(outcome.created);
        assert_eq!(outcome.alert.level, AlertLevel::Critical);
        assert!(outcome.alert.message.contains("CRITICAL"));
        assert!(outcome.alert.message.contains("100"));
    }

    #[test]
    fn test_same_open_level_is_suppressed() {
        let mut store = MemoryStore::new();
        let src = source(&mut store);

        let first = create_or_update(&mut store, &src, 70, AlertLevel::High).unwrap();
        let second = create_or_update(&mut store, &src, 72, AlertLevel::High).unwrap();
        assert!(first.created);
        assert!(!second.created, "same-level open alert must suppress");
        assert_eq!(second.alert.id, first.alert.id);
    }

    #[test]
    fn test_escalation_creates_fresh_alert_while_open() {
        let mut store = MemoryStore::new();
        let src = source(&mut store);

        let first = create_or_update(&mut store, &src, 70, AlertLevel::High).unwrap();
        let second = create_or_update(&mut store, &src, 90, AlertLevel::Critical).unwrap();
        assert!(second.created, "level change must re-trigger");
        assert_ne!(second.alert.id, first.alert.id);
    }

    #[test]
    fn test_acknowledged_alert_does_not_suppress() {
        let mut store = MemoryStore::new();
        let src = source(&mut store);

        let first = create_or_update(&mut store, &src, 70, AlertLevel::High).unwrap();
        store.acknowledge_alert(first.alert.id);

        let second = create_or_update(&mut store, &src, 70, AlertLevel::High).unwrap();
        assert!(second.created, "acknowledged alert reopens the trigger window");
    }
}
