//! The records catalog: list/download/head/upload/delete over the object
//! store, cross-referenced against the remote schedule service.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, NaiveTime};
use futures::stream::BoxStream;

use crate::domain::{EventId, EventVariety};
use crate::error::{RecorderError, RecorderResult};
use crate::objectstore::ObjectStoreClient;
use crate::protocol_constants::DEFAULT_LIST_LIMIT;
use crate::schedule::ScheduleClient;
use crate::timezone::to_utc;

use super::key::{make_key, make_prefix, parse_key};
use super::models::{ListRequest, ListResponse, Record, RecordContent, SortOrder};

/// Validates event recordability and translates between catalog keys and
/// the object store's flat namespace.
pub struct RecordsCatalog {
    schedule: Arc<dyn ScheduleClient>,
    object_store: Arc<dyn ObjectStoreClient>,
}

impl RecordsCatalog {
    /// Wires the catalog's collaborators together.
    #[must_use]
    pub fn new(schedule: Arc<dyn ScheduleClient>, object_store: Arc<dyn ObjectStoreClient>) -> Self {
        Self {
            schedule,
            object_store,
        }
    }

    async fn require_live_event(&self, event: EventId) -> RecorderResult<crate::domain::Event> {
        let found = self.schedule.get(event).await.map_err(|e| {
            log::warn!("[Catalog] event lookup failed for {event}: {e}");
            e
        })?;
        if found.variety != EventVariety::Live {
            log::warn!("[Catalog] rejected {event}: not a live event");
            return Err(RecorderError::BadEventType(event.to_string()));
        }
        Ok(found)
    }

    /// Confirms an instance at exactly `start` is scheduled for `event`,
    /// by querying the event-local day containing `start`.
    async fn require_instance(
        &self,
        event: EventId,
        start: chrono::NaiveDateTime,
    ) -> RecorderResult<()> {
        let live_event = self.require_live_event(event).await?;

        let day_start = start.date().and_time(NaiveTime::MIN);
        let utc_start = to_utc(day_start, &live_event.timezone)
            .map_err(|e| RecorderError::ScheduleUnavailable(e.to_string()))?;
        let utc_end = utc_start + Duration::days(1);

        let schedules = self.schedule.list(utc_start, utc_end, event).await?;
        let has_instance = schedules
            .iter()
            .find(|s| s.event.id == event)
            .is_some_and(|s| s.instances.iter().any(|i| i.start == start));

        if has_instance {
            Ok(())
        } else {
            log::warn!("[Catalog] instance not found: {event}/{start}");
            Err(RecorderError::InstanceNotFound(format!("{event}/{start}")))
        }
    }

    /// Lists records under `event`, filtered/sorted/paginated per `request`.
    pub async fn list(&self, event: EventId, request: ListRequest) -> RecorderResult<ListResponse> {
        self.require_live_event(event).await?;

        let prefix = make_prefix(event);
        let objects = self.object_store.list(&prefix).await?;

        let mut records: Vec<Record> = objects
            .iter()
            .filter_map(|object| parse_key(&object.name))
            .map(|key| Record {
                event: key.event,
                start: key.start,
            })
            .collect();

        if let Some(after) = request.after {
            records.retain(|r| r.start > after);
        }
        if let Some(before) = request.before {
            records.retain(|r| r.start < before);
        }

        if let Some(order) = request.order {
            records.sort_by_key(|r| r.start);
            if order == SortOrder::Desc {
                records.reverse();
            }
        }

        let count = records.len();
        let limit = request.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let offset = request.offset.unwrap_or(0);

        let page: Vec<Record> = records.into_iter().skip(offset).take(limit).collect();

        Ok(ListResponse {
            count,
            limit,
            offset,
            records: page,
        })
    }

    /// Downloads a record's metadata and body.
    pub async fn download(
        &self,
        event: EventId,
        start: chrono::NaiveDateTime,
    ) -> RecorderResult<RecordContent> {
        self.require_instance(event, start).await?;
        let key = make_key(event, start);
        let download = self.object_store.get(&key).await?;
        Ok(RecordContent {
            content_type: download.content_type,
            size: download.size,
            etag: download.etag,
            last_modified: download.last_modified,
            body: Some(download.body),
        })
    }

    /// Returns a record's metadata without its body.
    pub async fn head(
        &self,
        event: EventId,
        start: chrono::NaiveDateTime,
    ) -> RecorderResult<RecordContent> {
        self.require_instance(event, start).await?;
        let key = make_key(event, start);
        let meta = self.object_store.head(&key).await?;
        Ok(RecordContent {
            content_type: meta.content_type,
            size: meta.size,
            etag: meta.etag,
            last_modified: meta.last_modified,
            body: None,
        })
    }

    /// Uploads `body` as the record for `(event, start)`.
    ///
    /// Rejects with [`RecorderError::RecordAlreadyExists`] if a record
    /// already exists under the resolved key, per the reference behaviour
    /// chosen in this implementation: `head` before `put`.
    pub async fn upload(
        &self,
        event: EventId,
        start: chrono::NaiveDateTime,
        content_type: &str,
        body: BoxStream<'static, Result<Bytes, std::io::Error>>,
    ) -> RecorderResult<()> {
        self.require_instance(event, start).await?;
        let key = make_key(event, start);

        match self.object_store.head(&key).await {
            Ok(_) => {
                log::warn!("[Catalog] upload rejected, record already exists: {key}");
                return Err(RecorderError::RecordAlreadyExists(format!("{event}/{start}")));
            }
            Err(RecorderError::RecordNotFound(_)) => {}
            Err(other) => return Err(other),
        }

        self.object_store.put(&key, content_type, body).await?;
        log::info!("[Catalog] uploaded record {key}");
        Ok(())
    }

    /// Deletes the record for `(event, start)`.
    pub async fn delete(&self, event: EventId, start: chrono::NaiveDateTime) -> RecorderResult<()> {
        self.require_instance(event, start).await?;
        let key = make_key(event, start);
        self.object_store.delete(&key).await?;
        log::info!("[Catalog] deleted record {key}");
        Ok(())
    }
}
