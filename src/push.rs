/// Expo push gateway client and alert notification fan-out.
///
/// The gateway is an external HTTP collaborator; delivery is best-effort
/// with a bounded per-call timeout and no retry queue. Fan-out is
/// per-recipient failure-isolated: one recipient's failure is logged and
/// recorded, and the remaining recipients are still attempted. Every
/// attempt produces a notification-history entry with status sent/failed.
///
/// API documentation: https://docs.expo.dev/push-notifications/sending-notifications/

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PushConfig;
use crate::logging::{Logger, Subsystem};
use crate::model::{Alert, AlertLevel, StoreError};
use crate::store::{NotificationRecord, NotificationStatus, RiskStore};

// ---------------------------------------------------------------------------
// Token validation
// ---------------------------------------------------------------------------

/// Shape check on an Expo push token. The token is an opaque string; only
/// the `ExponentPushToken[...]` envelope is validated, nothing
/// cryptographic.
pub fn validate_token(token: &str) -> bool {
    token.starts_with("ExponentPushToken[") && token.ends_with(']')
}

// ---------------------------------------------------------------------------
// Wire structures
// ---------------------------------------------------------------------------

/// Single push message in the Expo wire format.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub sound: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl PushMessage {
    pub fn new(token: &str, title: &str, body: &str, data: Option<serde_json::Value>) -> Self {
        PushMessage {
            to: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            sound: "default".to_string(),
            priority: "high".to_string(),
            data,
        }
    }
}

/// Envelope of a single-send response: `{"data": {"status": "ok", "id": ...}}`.
#[derive(Debug, Deserialize)]
pub struct PushResponse {
    pub data: PushTicket,
}

/// Envelope of a batch response: `{"data": [{...}, ...]}`.
#[derive(Debug, Deserialize)]
pub struct PushBatchResponse {
    pub data: Vec<PushTicket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushTicket {
    pub status: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Delivery outcome the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct PushReceipt {
    pub delivered: bool,
    /// Provider ticket id, when the gateway accepted the message.
    pub ticket_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum PushError {
    /// Token failed the `ExponentPushToken[...]` shape check.
    InvalidToken(String),
    /// Transport-level failure (connect, timeout, non-2xx).
    Http(String),
    /// The gateway answered but the body could not be interpreted.
    Gateway(String),
}

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushError::InvalidToken(token) => write!(f, "Invalid Expo push token: {}", token),
            PushError::Http(msg) => write!(f, "Push HTTP error: {}", msg),
            PushError::Gateway(msg) => write!(f, "Push gateway error: {}", msg),
        }
    }
}

impl std::error::Error for PushError {}

// ---------------------------------------------------------------------------
// Gateway seam
// ---------------------------------------------------------------------------

/// Notification delivery contract consumed by the fan-out.
pub trait PushGateway {
    fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Result<PushReceipt, PushError>;

    /// One result per token, in input order. Tokens failing the shape check
    /// are skipped before the HTTP call, mirroring single-send behavior.
    fn send_batch(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Vec<Result<PushReceipt, PushError>>;
}

// ---------------------------------------------------------------------------
// Expo HTTP client
// ---------------------------------------------------------------------------

pub struct ExpoPushClient {
    client: reqwest::blocking::Client,
    url: String,
    send_timeout: Duration,
    batch_timeout: Duration,
}

impl ExpoPushClient {
    pub fn new(config: &PushConfig) -> Result<Self, PushError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| PushError::Http(e.to_string()))?;

        Ok(ExpoPushClient {
            client,
            url: config.url.clone(),
            send_timeout: Duration::from_secs(config.send_timeout_secs),
            batch_timeout: Duration::from_secs(config.batch_timeout_secs),
        })
    }

    fn receipt_from_ticket(ticket: PushTicket) -> PushReceipt {
        PushReceipt {
            delivered: ticket.status == "ok",
            ticket_id: ticket.id,
        }
    }
}

impl PushGateway for ExpoPushClient {
    fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Result<PushReceipt, PushError> {
        if !validate_token(token) {
            return Err(PushError::InvalidToken(token.to_string()));
        }

        let message = PushMessage::new(token, title, body, data);

        let response = self
            .client
            .post(&self.url)
            .timeout(self.send_timeout)
            .json(&message)
            .send()
            .map_err(|e| PushError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PushError::Http(format!("HTTP {}", response.status())));
        }

        let parsed: PushResponse = response
            .json()
            .map_err(|e| PushError::Gateway(e.to_string()))?;

        Ok(Self::receipt_from_ticket(parsed.data))
    }

    fn send_batch(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Vec<Result<PushReceipt, PushError>> {
        let messages: Vec<PushMessage> = tokens
            .iter()
            .filter(|t| validate_token(t))
            .map(|t| PushMessage::new(t, title, body, data.clone()))
            .collect();

        if messages.is_empty() {
            return tokens
                .iter()
                .map(|t| Err(PushError::InvalidToken(t.clone())))
                .collect();
        }

        let response = self
            .client
            .post(&self.url)
            .timeout(self.batch_timeout)
            .json(&messages)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PushError::Http(e.to_string()));

        let tickets = match response.and_then(|r| {
            r.json::<PushBatchResponse>()
                .map_err(|e| PushError::Gateway(e.to_string()))
        }) {
            Ok(batch) => batch.data,
            Err(e) => {
                // Whole-batch transport failure: every token failed.
                let msg = e.to_string();
                return tokens
                    .iter()
                    .map(|_| Err(PushError::Http(msg.clone())))
                    .collect();
            }
        };

        let mut tickets = tickets.into_iter();
        tokens
            .iter()
            .map(|t| {
                if !validate_token(t) {
                    return Err(PushError::InvalidToken(t.clone()));
                }
                match tickets.next() {
                    Some(ticket) => Ok(Self::receipt_from_ticket(ticket)),
                    None => Err(PushError::Gateway("missing ticket in batch response".into())),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Alert fan-out
// ---------------------------------------------------------------------------

/// Delivery counts for one fan-out pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanoutSummary {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

fn level_emoji(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Critical => "🔴",
        AlertLevel::High => "🟠",
        _ => "🟡",
    }
}

/// Push the alert to every eligible user in the alert's organization.
///
/// Only high/critical alerts notify; lower tiers return an empty summary.
/// Each recipient is attempted independently, and every attempt — success
/// or failure — is recorded as a notification-history entry.
pub fn send_alert_notifications(
    store: &mut dyn RiskStore,
    gateway: &dyn PushGateway,
    logger: &Logger,
    alert: &Alert,
    source_name: &str,
    risk_score: f64,
) -> Result<FanoutSummary, StoreError> {
    if alert.level < AlertLevel::High {
        return Ok(FanoutSummary::default());
    }

    let recipients = store.notification_recipients(alert.organization_id)?;
    if recipients.is_empty() {
        logger.warn(
            Subsystem::Push,
            Some(alert.water_source_id),
            "No notification recipients with registered push tokens",
        );
        return Ok(FanoutSummary::default());
    }

    let title = format!("{} Water Risk Alert", level_emoji(alert.level));
    let body = format!(
        "{} risk is {} ({:.1}%)",
        source_name,
        alert.level.as_upper(),
        risk_score
    );
    let data = serde_json::json!({
        "type": "alert",
        "alert_id": alert.id,
        "source_name": source_name,
        "risk_score": risk_score,
        "level": alert.level.as_str(),
    });

    let mut summary = FanoutSummary::default();

    for recipient in recipients {
        summary.attempted += 1;

        let result = gateway.send(&recipient.expo_push_token, &title, &body, Some(data.clone()));
        let (status, ticket_id) = match result {
            Ok(receipt) if receipt.delivered => {
                summary.sent += 1;
                (NotificationStatus::Sent, receipt.ticket_id)
            }
            Ok(receipt) => {
                summary.failed += 1;
                logger.warn(
                    Subsystem::Push,
                    Some(alert.water_source_id),
                    &format!("Gateway rejected push for user {}", recipient.user_id),
                );
                (NotificationStatus::Failed, receipt.ticket_id)
            }
            Err(e) => {
                summary.failed += 1;
                logger.error(
                    Subsystem::Push,
                    Some(alert.water_source_id),
                    &format!("Push to user {} failed: {}", recipient.user_id, e),
                );
                (NotificationStatus::Failed, None)
            }
        };

        store.record_notification(&NotificationRecord {
            user_id: recipient.user_id,
            alert_id: alert.id,
            title: title.clone(),
            body: body.clone(),
            data: data.to_string(),
            status,
            ticket_id,
        })?;
    }

    Ok(summary)
}
