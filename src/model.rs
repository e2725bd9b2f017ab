/// Core data types for the water-source risk monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies beyond
/// serde/chrono derives — only types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Water sources
// ---------------------------------------------------------------------------

/// A monitored water source (borehole, river, well).
///
/// `rainfall` and `water_level` hold the latest environmental readings and
/// are `None` until the first reading arrives. `risk_score` is `None` until
/// the first recalculation cycle has run for this source.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterSource {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Latest rainfall reading, in millimetres.
    pub rainfall: Option<f64>,
    /// Latest water level reading, in metres.
    pub water_level: Option<f64>,
    /// Latest computed risk score, 0–100.
    pub risk_score: Option<f64>,
    pub organization_id: i32,
}

/// One immutable risk-history fact: the score computed for a source during
/// one recalculation cycle. Ordering by `recorded_at` (insertion order) is
/// the authoritative history sequence for trend analysis and forecasting.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskHistoryRecord {
    pub id: i32,
    pub water_source_id: i32,
    pub organization_id: i32,
    pub risk_score: i32,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Alert severity tiers, in ascending order.
///
/// These gate notification dispatch. They are deliberately distinct from
/// [`DashboardStatus`], which uses different breakpoints for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Lowercase wire name, e.g. `"critical"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "low",
            AlertLevel::Medium => "medium",
            AlertLevel::High => "high",
            AlertLevel::Critical => "critical",
        }
    }

    /// Uppercase form used in alert messages, e.g. `"CRITICAL"`.
    pub fn as_upper(&self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    /// Parse the lowercase wire name back into a level.
    pub fn parse(s: &str) -> Option<AlertLevel> {
        match s {
            "low" => Some(AlertLevel::Low),
            "medium" => Some(AlertLevel::Medium),
            "high" => Some(AlertLevel::High),
            "critical" => Some(AlertLevel::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert raised when a source's risk crossed the notify threshold.
///
/// At most one unacknowledged alert per source is "open" for suppression
/// purposes; acknowledging an alert (a CRUD-layer concern) reopens the
/// trigger window.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: i32,
    pub water_source_id: i32,
    pub organization_id: i32,
    pub level: AlertLevel,
    pub message: String,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Derived signals
// ---------------------------------------------------------------------------

/// Coarse direction of a source's recent risk scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI-facing severity classification shown on the dashboard.
///
/// Thresholds differ from [`AlertLevel`] by design: dashboard status is the
/// coarser read-model classification, alert level is the stricter
/// notification-triggering one. Do not unify them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardStatus {
    Critical,
    High,
    Moderate,
    Safe,
}

impl std::fmt::Display for DashboardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DashboardStatus::Critical => "critical",
            DashboardStatus::High => "high",
            DashboardStatus::Moderate => "moderate",
            DashboardStatus::Safe => "safe",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise from the storage collaborator.
#[derive(Debug)]
pub enum StoreError {
    /// The requested water source does not exist.
    SourceNotFound(i32),
    /// Underlying database failure (connection, query, transaction).
    Database(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::SourceNotFound(id) => write!(f, "Water source not found: {}", id),
            StoreError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<postgres::Error> for StoreError {
    fn from(err: postgres::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
