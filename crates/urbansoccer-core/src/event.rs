//! Metadata attached to every notification the engine publishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;

/// Metadata attached to every engine notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Dotted type name, e.g. `session.turn_applied`.
    pub event_type: String,
    /// Campaign the event belongs to, when one is loaded.
    pub campaign_id: Option<String>,
    /// Turn sequence number current when the event was raised.
    pub turn_sequence: u64,
    /// Correlation ID of the request that caused the event, if any.
    pub correlation_id: Option<Uuid>,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Builds metadata stamped with a fresh event id and the clock's time.
    #[must_use]
    pub fn new(
        event_type: &str,
        campaign_id: Option<String>,
        turn_sequence: u64,
        correlation_id: Option<Uuid>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            campaign_id,
            turn_sequence,
            correlation_id,
            occurred_at: clock.now(),
        }
    }
}
