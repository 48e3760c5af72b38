use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_core::AggregateId;

/// A published change: the event plus where it sits in its aggregate's stream.
///
/// `sequence_number` is the aggregate version right after the event was
/// applied, so consecutive events of one cart differ by exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_id: AggregateId,
    aggregate_type: String,
    sequence_number: u64,
    published_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            published_at: Utc::now(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Wall-clock time the envelope was built, not the business time of the event.
    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }

    /// True when `self` is the next event of the same stream as `previous`.
    /// Subscribers use this to detect gaps.
    pub fn follows(&self, previous: &EventEnvelope<E>) -> bool {
        self.aggregate_id == previous.aggregate_id
            && self.aggregate_type == previous.aggregate_type
            && self.sequence_number == previous.sequence_number + 1
    }
}
