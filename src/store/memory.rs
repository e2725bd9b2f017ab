//! In-memory store for development and deterministic tests.
//!
//! When a live database is unavailable, the whole pipeline can run against
//! this store: same trait, same transactional semantics. `begin` snapshots
//! the full state and `rollback` restores it, so cycle-abort behavior is
//! exercised for real in tests rather than mocked.

use chrono::Utc;

use crate::model::{Alert, AlertLevel, RiskHistoryRecord, StoreError, WaterSource};
use crate::store::{NotificationRecord, Recipient, RiskStore};

#[derive(Debug, Clone)]
struct MemoryUser {
    user_id: i32,
    organization_id: i32,
    expo_push_token: Option<String>,
    push_notifications_enabled: bool,
}

#[derive(Debug, Clone, Default)]
struct State {
    sources: Vec<WaterSource>,
    history: Vec<RiskHistoryRecord>,
    alerts: Vec<Alert>,
    users: Vec<MemoryUser>,
    notifications: Vec<NotificationRecord>,
    next_source_id: i32,
    next_history_id: i32,
    next_alert_id: i32,
    next_user_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: State,
    snapshot: Option<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    // --- fixture helpers (not part of the RiskStore contract) -------------

    pub fn add_source(
        &mut self,
        name: &str,
        latitude: f64,
        longitude: f64,
        rainfall: Option<f64>,
        water_level: Option<f64>,
        organization_id: i32,
    ) -> i32 {
        self.state.next_source_id += 1;
        let id = self.state.next_source_id;
        self.state.sources.push(WaterSource {
            id,
            name: name.to_string(),
            latitude,
            longitude,
            rainfall,
            water_level,
            risk_score: None,
            organization_id,
        });
        id
    }

    pub fn add_user(
        &mut self,
        organization_id: i32,
        expo_push_token: Option<&str>,
        push_notifications_enabled: bool,
    ) -> i32 {
        self.state.next_user_id += 1;
        let user_id = self.state.next_user_id;
        self.state.users.push(MemoryUser {
            user_id,
            organization_id,
            expo_push_token: expo_push_token.map(String::from),
            push_notifications_enabled,
        });
        user_id
    }

    pub fn acknowledge_alert(&mut self, alert_id: i32) {
        if let Some(alert) = self.state.alerts.iter_mut().find(|a| a.id == alert_id) {
            alert.acknowledged = true;
        }
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.state.alerts
    }

    pub fn notifications(&self) -> &[NotificationRecord] {
        &self.state.notifications
    }

    pub fn history(&self) -> &[RiskHistoryRecord] {
        &self.state.history
    }

    fn source_mut(&mut self, source_id: i32) -> Result<&mut WaterSource, StoreError> {
        self.state
            .sources
            .iter_mut()
            .find(|s| s.id == source_id)
            .ok_or(StoreError::SourceNotFound(source_id))
    }

    fn scores_for(&self, source_id: i32) -> Vec<f64> {
        self.state
            .history
            .iter()
            .filter(|h| h.water_source_id == source_id)
            .map(|h| h.risk_score as f64)
            .collect()
    }
}

impl RiskStore for MemoryStore {
    fn get_all_sources(&mut self) -> Result<Vec<WaterSource>, StoreError> {
        Ok(self.state.sources.clone())
    }

    fn update_readings(
        &mut self,
        source_id: i32,
        rainfall: f64,
        water_level: f64,
    ) -> Result<(), StoreError> {
        let source = self.source_mut(source_id)?;
        source.rainfall = Some(rainfall);
        source.water_level = Some(water_level);
        Ok(())
    }

    fn update_risk_score(&mut self, source_id: i32, score: f64) -> Result<(), StoreError> {
        self.source_mut(source_id)?.risk_score = Some(score);
        Ok(())
    }

    fn append_history(
        &mut self,
        source_id: i32,
        organization_id: i32,
        score: i32,
    ) -> Result<(), StoreError> {
        // Insertion order is the authoritative history sequence.
        self.state.next_history_id += 1;
        let id = self.state.next_history_id;
        self.state.history.push(RiskHistoryRecord {
            id,
            water_source_id: source_id,
            organization_id,
            risk_score: score,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    fn recent_scores(&mut self, source_id: i32, limit: usize) -> Result<Vec<f64>, StoreError> {
        let all = self.scores_for(source_id);
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }

    fn full_history(&mut self, source_id: i32) -> Result<Vec<f64>, StoreError> {
        Ok(self.scores_for(source_id))
    }

    fn open_alert(&mut self, source_id: i32) -> Result<Option<Alert>, StoreError> {
        Ok(self
            .state
            .alerts
            .iter()
            .rev()
            .find(|a| a.water_source_id == source_id && !a.acknowledged)
            .cloned())
    }

    fn create_alert(
        &mut self,
        source_id: i32,
        organization_id: i32,
        level: AlertLevel,
        message: &str,
    ) -> Result<Alert, StoreError> {
        self.state.next_alert_id += 1;
        let alert = Alert {
            id: self.state.next_alert_id,
            water_source_id: source_id,
            organization_id,
            level,
            message: message.to_string(),
            acknowledged: false,
            created_at: Utc::now(),
        };
        self.state.alerts.push(alert.clone());
        Ok(alert)
    }

    fn notification_recipients(&mut self, organization_id: i32) -> Result<Vec<Recipient>, StoreError> {
        Ok(self
            .state
            .users
            .iter()
            .filter(|u| {
                u.organization_id == organization_id
                    && u.push_notifications_enabled
                    && u.expo_push_token.is_some()
            })
            .filter_map(|u| {
                u.expo_push_token.as_ref().map(|token| Recipient {
                    user_id: u.user_id,
                    expo_push_token: token.clone(),
                })
            })
            .collect())
    }

    fn record_notification(&mut self, record: &NotificationRecord) -> Result<(), StoreError> {
        self.state.notifications.push(record.clone());
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(snapshot) = self.snapshot.take() {
            self.state = snapshot;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_scores_are_most_recent_last() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well A", 0.0, 0.0, None, None, 1);
        for score in [10, 20, 30, 40, 50, 60] {
            store.append_history(id, 1, score).unwrap();
        }

        let recent = store.recent_scores(id, 5).unwrap();
        assert_eq!(recent, vec![20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn test_recent_scores_shorter_history_returns_all() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well A", 0.0, 0.0, None, None, 1);
        store.append_history(id, 1, 40).unwrap();

        assert_eq!(store.recent_scores(id, 5).unwrap(), vec![40.0]);
    }

    #[test]
    fn test_open_alert_is_most_recent_unacknowledged() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well A", 0.0, 0.0, None, None, 1);
        let first = store
            .create_alert(id, 1, AlertLevel::High, "Risk level is HIGH (70%)")
            .unwrap();
        let second = store
            .create_alert(id, 1, AlertLevel::Critical, "Risk level is CRITICAL (90%)")
            .unwrap();

        assert_eq!(store.open_alert(id).unwrap().unwrap().id, second.id);

        store.acknowledge_alert(second.id);
        assert_eq!(store.open_alert(id).unwrap().unwrap().id, first.id);

        store.acknowledge_alert(first.id);
        assert!(store.open_alert(id).unwrap().is_none());
    }

    #[test]
    fn test_rollback_restores_pre_cycle_state() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well A", 0.0, 0.0, Some(60.0), Some(30.0), 1);

        store.begin().unwrap();
        store.update_readings(id, 10.0, 5.0).unwrap();
        store.append_history(id, 1, 100).unwrap();
        store
            .create_alert(id, 1, AlertLevel::Critical, "Risk level is CRITICAL (100%)")
            .unwrap();
        store.rollback().unwrap();

        let source = &store.get_all_sources().unwrap()[0];
        assert_eq!(source.rainfall, Some(60.0));
        assert!(store.full_history(id).unwrap().is_empty());
        assert!(store.alerts().is_empty());
    }

    #[test]
    fn test_commit_makes_writes_durable() {
        let mut store = MemoryStore::new();
        let id = store.add_source("Well A", 0.0, 0.0, None, None, 1);

        store.begin().unwrap();
        store.append_history(id, 1, 40).unwrap();
        store.commit().unwrap();
        // A later rollback without begin must not undo committed writes.
        store.rollback().unwrap();

        assert_eq!(store.full_history(id).unwrap(), vec![40.0]);
    }

    #[test]
    fn test_recipients_scoped_by_organization_and_flags() {
        let mut store = MemoryStore::new();
        store.add_user(1, Some("ExponentPushToken[aaa]"), true);
        store.add_user(1, Some("ExponentPushToken[bbb]"), false); // opted out
        store.add_user(1, None, true); // no device token
        store.add_user(2, Some("ExponentPushToken[ccc]"), true); // other org

        let recipients = store.notification_recipients(1).unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].expo_push_token, "ExponentPushToken[aaa]");
    }

    #[test]
    fn test_unknown_source_is_not_found() {
        let mut store = MemoryStore::new();
        match store.update_risk_score(999, 40.0) {
            Err(StoreError::SourceNotFound(999)) => {}
            other => panic!("expected SourceNotFound(999), got {:?}", other),
        }
    }
}
