/// Realtime broadcast seam.
///
/// The transport holding open client connections is an external
/// collaborator; the pipeline depends only on [`EventPublisher::publish`],
/// fire-and-forget. Publishes from concurrent orchestration calls carry no
/// ordering guarantee across different sources.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RiskUpdate,
    ForecastUpdate,
    AlertTriggered,
}

/// A broadcast message, keyed by source id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub source_id: i32,
    pub data: serde_json::Value,
}

impl RiskEvent {
    pub fn risk_update(source_id: i32, data: serde_json::Value) -> Self {
        RiskEvent {
            event_type: EventType::RiskUpdate,
            source_id,
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher seam
// ---------------------------------------------------------------------------

/// Failure delivering an event to the broadcast transport.
#[derive(Debug)]
pub struct PublishError(pub String);

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Publish failed: {}", self.0)
    }
}

impl std::error::Error for PublishError {}

/// Fire-and-forget publish contract. No acknowledgement is required by the
/// pipeline; a returned error is logged by the caller and never rolled back
/// into already-committed state.
pub trait EventPublisher {
    fn publish(&mut self, event: &RiskEvent) -> Result<(), PublishError>;
}

/// Publisher that writes events to stdout as JSON lines. Stands in for the
/// external broadcast transport when the binary runs standalone.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

impl EventPublisher for StdoutPublisher {
    fn publish(&mut self, event: &RiskEvent) -> Result<(), PublishError> {
        let line = serde_json::to_string(event).map_err(|e| PublishError(e.to_string()))?;
        println!("{}", line);
        Ok(())
    }
}

/// Publisher that buffers events in memory. Used in tests and development
/// alongside `MemoryStore`.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    pub events: Vec<RiskEvent>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        MemoryPublisher::default()
    }
}

impl EventPublisher for MemoryPublisher {
    fn publish(&mut self, event: &RiskEvent) -> Result<(), PublishError> {
        self.events.push(event.clone());
        Ok(())
    }
}
