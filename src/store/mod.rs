//! Storage collaborator contract.
//!
//! The pipeline talks to storage exclusively through the [`RiskStore`]
//! trait: the scheduler and orchestrator never see SQL. Two
//! implementations exist — [`pg::PgStore`] for production and
//! [`memory::MemoryStore`] for development and deterministic tests.
//!
//! History ordering: `recent_scores` and `full_history` return scores
//! oldest-first (most-recent-last), which is the orientation the trend
//! analyzer and forecaster expect.

pub mod memory;
pub mod pg;

use crate::model::{Alert, AlertLevel, StoreError, WaterSource};

// ---------------------------------------------------------------------------
// Notification records
// ---------------------------------------------------------------------------

/// A user eligible to receive push notifications for an organization's
/// alerts: has a registered device token and notifications enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub user_id: i32,
    pub expo_push_token: String,
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

/// One notification-history entry, recorded per delivery attempt whether
/// it succeeded or not.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub user_id: i32,
    pub alert_id: i32,
    pub title: String,
    pub body: String,
    /// Structured payload as a JSON string.
    pub data: String,
    pub status: NotificationStatus,
    /// Provider ticket id from the push gateway, when delivery succeeded.
    pub ticket_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// Read/write operations the recalculation pipeline needs from storage.
///
/// `begin`/`commit`/`rollback` bracket one recalculation cycle: all writes
/// between them land atomically or not at all. The store is expected to
/// provide at least read-committed isolation.
pub trait RiskStore {
    fn get_all_sources(&mut self) -> Result<Vec<WaterSource>, StoreError>;

    /// Persist fresh simulated readings on the source.
    fn update_readings(
        &mut self,
        source_id: i32,
        rainfall: f64,
        water_level: f64,
    ) -> Result<(), StoreError>;

    /// Persist the newly computed score on the source.
    fn update_risk_score(&mut self, source_id: i32, score: f64) -> Result<(), StoreError>;

    /// Append one immutable history record for this cycle.
    fn append_history(
        &mut self,
        source_id: i32,
        organization_id: i32,
        score: i32,
    ) -> Result<(), StoreError>;

    /// Last `limit` scores for the source, oldest-first (most-recent-last).
    fn recent_scores(&mut self, source_id: i32, limit: usize) -> Result<Vec<f64>, StoreError>;

    /// Full chronological score history for the source.
    fn full_history(&mut self, source_id: i32) -> Result<Vec<f64>, StoreError>;

    /// Most recent unacknowledged alert for the source, if any.
    fn open_alert(&mut self, source_id: i32) -> Result<Option<Alert>, StoreError>;

    fn create_alert(
        &mut self,
        source_id: i32,
        organization_id: i32,
        level: AlertLevel,
        message: &str,
    ) -> Result<Alert, StoreError>;

    /// Users to notify for an alert in this organization.
    fn notification_recipients(&mut self, organization_id: i32) -> Result<Vec<Recipient>, StoreError>;

    fn record_notification(&mut self, record: &NotificationRecord) -> Result<(), StoreError>;

    // --- cycle transaction boundary ---------------------------------------

    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;
}
