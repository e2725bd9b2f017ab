//! Alert level thresholds and trigger/suppress decisions.
//!
//! Everything here is pure; the side-effecting half (querying the open
//! alert and inserting a new row) lives in the parent module. Threshold
//! breakpoints deliberately differ from the dashboard status map in
//! `dashboard.rs` — alerting is the stricter, notification-facing
//! classification.

use crate::model::{Alert, AlertLevel};

/// Score at or above which an alert is raised, per tier.
pub const CRITICAL_LEVEL_THRESHOLD: i32 = 85;
pub const HIGH_LEVEL_THRESHOLD: i32 = 65;
pub const MEDIUM_LEVEL_THRESHOLD: i32 = 40;

/// Score at or above which the orchestrator escalates to push
/// notifications. Distinct from the tier breakpoints above.
pub const CRITICAL_NOTIFY_THRESHOLD: i32 = 80;

/// Map a risk score to an alert severity tier, or `None` below the
/// lowest alertable tier.
pub fn level_for(risk_score: i32) -> Option<AlertLevel> {
    if risk_score >= CRITICAL_LEVEL_THRESHOLD {
        Some(AlertLevel::Critical)
    } else if risk_score >= HIGH_LEVEL_THRESHOLD {
        Some(AlertLevel::High)
    } else if risk_score >= MEDIUM_LEVEL_THRESHOLD {
        Some(AlertLevel::Medium)
    } else {
        None
    }
}

/// Whether the score is high enough to escalate to push notifications.
pub fn evaluate_alert(risk_score: i32) -> bool {
    risk_score >= CRITICAL_NOTIFY_THRESHOLD
}

/// Decide whether a new alert at `new_level` should be raised given the
/// most recent open alert for the source.
///
/// Alerts are deduplicated per open-severity-window, not per cycle:
/// - no existing alert                      → trigger
/// - existing alert already acknowledged    → trigger (window reopened)
/// - existing open alert at another level   → trigger (escalation or
///   de-escalation always produces a fresh record)
/// - existing open alert at the same level  → suppress (no duplicate spam)
pub fn should_trigger(existing: Option<&Alert>, new_level: AlertLevel) -> bool {
    match existing {
        None => true,
        Some(alert) if alert.acknowledged => true,
        Some(alert) => alert.level != new_level,
    }
}
