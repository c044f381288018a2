//! Reqwest-backed [`ScheduleClient`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::{Event, EventId, Schedule};
use crate::error::{RecorderError, RecorderResult};

use super::ScheduleClient;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Queries a remote schedule service over its HTTP API.
pub struct HttpScheduleClient {
    client: Client,
    base_url: String,
}

impl HttpScheduleClient {
    /// Creates a client against `base_url` (no trailing slash expected).
    #[must_use]
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builds with static configuration");
        Self { client, base_url }
    }
}

#[derive(Deserialize)]
struct ListResponse {
    schedules: Vec<Schedule>,
}

#[async_trait]
impl ScheduleClient for HttpScheduleClient {
    async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event: EventId,
    ) -> RecorderResult<Vec<Schedule>> {
        let url = format!("{}/schedules", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("start", start.to_rfc3339()),
                ("end", end.to_rfc3339()),
                ("where_id", event.to_string()),
            ])
            .send()
            .await
            .map_err(|e| RecorderError::ScheduleUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RecorderError::ScheduleUnavailable(format!(
                "schedule service returned {}",
                response.status()
            )));
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| RecorderError::ScheduleUnavailable(e.to_string()))?;
        Ok(body.schedules)
    }

    async fn get(&self, event: EventId) -> RecorderResult<Event> {
        let url = format!("{}/events/{event}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RecorderError::ScheduleUnavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RecorderError::EventNotFound(event.to_string())),
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| RecorderError::ScheduleUnavailable(e.to_string())),
            status => Err(RecorderError::ScheduleUnavailable(format!(
                "schedule service returned {status}"
            ))),
        }
    }
}
