//! Client for the remote schedule service.
//!
//! The schedule service owns event metadata and occurrences; the core only
//! ever queries it, never mutates it.

mod http;

pub use http::HttpScheduleClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, Schedule};
use crate::error::RecorderResult;

/// Capability interface over the remote schedule service.
///
/// Implementations are injected; tests use fakes rather than a live service.
#[async_trait]
pub trait ScheduleClient: Send + Sync {
    /// Returns every schedule whose event id matches `event` and that has
    /// at least one instance within `[start, end]`.
    async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event: EventId,
    ) -> RecorderResult<Vec<Schedule>>;

    /// Looks up a single event by id.
    async fn get(&self, event: EventId) -> RecorderResult<Event>;
}
