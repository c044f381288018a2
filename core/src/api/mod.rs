//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to [`crate::recorder::Recorder`]
//! and [`crate::records::RecordsCatalog`]. It provides the router construction and
//! server startup functionality.

use std::sync::Arc;

use thiserror::Error;

use crate::bootstrap::BootstrappedServices;
use crate::recorder::Recorder;
use crate::records::RecordsCatalog;

pub mod http;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// This is a thin wrapper that holds references to services. All business
/// logic lives in [`Recorder`] and [`RecordsCatalog`] themselves.
#[derive(Clone)]
pub struct AppState {
    /// The recording orchestrator.
    pub recorder: Arc<Recorder>,
    /// The records catalog.
    pub records: Arc<RecordsCatalog>,
}

/// Builder for constructing an `AppState`.
#[derive(Default)]
pub struct AppStateBuilder {
    recorder: Option<Arc<Recorder>>,
    records: Option<Arc<RecordsCatalog>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates both fields from a `BootstrappedServices` container.
    #[must_use]
    pub fn from_services(mut self, services: &BootstrappedServices) -> Self {
        self.recorder = Some(Arc::clone(&services.recorder));
        self.records = Some(Arc::clone(&services.records));
        self
    }

    /// Sets the recorder.
    #[must_use]
    pub fn recorder(mut self, recorder: Arc<Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Sets the records catalog.
    #[must_use]
    pub fn records(mut self, records: Arc<RecordsCatalog>) -> Self {
        self.records = Some(records);
        self
    }

    /// Builds the `AppState`, panicking if a required field is missing.
    #[must_use]
    pub fn build(self) -> AppState {
        AppState {
            recorder: self.recorder.expect("recorder is required"),
            records: self.records.expect("records is required"),
        }
    }
}

impl AppState {
    /// Creates a new builder for constructing an `AppState`.
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }
}

/// Starts the HTTP server, binding to `host:port`.
pub async fn start_server(state: AppState, host: &str, port: u16) -> Result<(), ServerError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("[Server] listening on {addr}");

    let app = http::create_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;
    Ok(())
}
