//! Request/response shapes for the records catalog's public operations.

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::domain::EventId;

/// Sort order for [`ListRequest::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending by start time.
    Asc,
    /// Descending by start time.
    Desc,
}

/// Query parameters for [`super::RecordsCatalog::list`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    /// Keep only records with `start > after`.
    pub after: Option<NaiveDateTime>,
    /// Keep only records with `start < before`.
    pub before: Option<NaiveDateTime>,
    /// Maximum records to return; defaults to [`crate::protocol_constants::DEFAULT_LIST_LIMIT`].
    pub limit: Option<usize>,
    /// Records to skip before collecting `limit`.
    pub offset: Option<usize>,
    /// Sort order; unordered (store order) if omitted.
    pub order: Option<SortOrder>,
}

/// A catalog entry: the `(event, start)` a stored object was parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    /// The event the record belongs to.
    pub event: EventId,
    /// The instance start the record was captured at.
    pub start: NaiveDateTime,
}

/// Result of [`super::RecordsCatalog::list`].
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    /// Total records matching the filter, before pagination.
    pub count: usize,
    /// The `limit` that was applied.
    pub limit: usize,
    /// The `offset` that was applied.
    pub offset: usize,
    /// The page of records.
    pub records: Vec<Record>,
}

/// Result of [`super::RecordsCatalog::download`] or `head`.
pub struct RecordContent {
    /// MIME type the record was stored with.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag as reported by the object store.
    pub etag: String,
    /// Last-modified instant as reported by the object store.
    pub last_modified: DateTime<Utc>,
    /// Body stream; `None` for a `head`-only result.
    pub body: Option<BoxStream<'static, Result<Bytes, std::io::Error>>>,
}
