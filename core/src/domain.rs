//! Core domain types shared across the recorder, the records catalog, and
//! the clients that reach the remote schedule service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an event, owned by the remote schedule service.
pub type EventId = Uuid;

/// The variety tag on an [`Event`]. Only `Live` is recordable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventVariety {
    /// A live broadcast; the only variety this service will record.
    Live,
    /// Any other catalog variety (e.g. pre-recorded, playlist).
    #[serde(other)]
    Other,
}

/// A broadcast item owned by the remote schedule service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// Recordability tag.
    pub variety: EventVariety,
    /// IANA timezone name the event's instances are expressed in.
    pub timezone: String,
}

/// One scheduled occurrence of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInstance {
    /// Local naive start datetime, in `event.timezone`.
    pub start: NaiveDateTime,
}

/// A queried slice of an event's instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// The event these instances belong to.
    pub event: Event,
    /// Instances within the queried window, in no particular order.
    pub instances: Vec<EventInstance>,
}

/// A short-lived token bound to a single SRT listener session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Opaque printable token (hex), ≥128 bits of entropy.
    pub token: String,
    /// UTC instant after which the bound listener must refuse connections.
    pub expires_at: DateTime<Utc>,
}

/// Request to begin recording an event's nearest instance.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingRequest {
    /// The event to record.
    pub event: EventId,
    /// Desired container format; defaults to [`crate::protocol_constants::DEFAULT_FORMAT`].
    pub format: Option<String>,
}

/// Response to a successful [`RecordingRequest`].
#[derive(Debug, Clone, Serialize)]
pub struct RecordingResponse {
    /// The minted credential the broadcast source must present.
    pub credentials: Credentials,
    /// The reserved SRT listener port.
    pub port: u16,
}
