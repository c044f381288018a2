//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where all
//! services are instantiated and wired together. This pattern provides:
//!
//! - **Clarity**: All dependency relationships are visible in one place
//! - **Testability**: Easy to swap implementations for testing
//! - **Maintainability**: Service creation logic is isolated from usage

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::credentials::{CredentialMinter, RandomCredentialMinter};
use crate::objectstore::{ObjectStoreClient, S3ObjectStoreClient};
use crate::pipeline::{PipelineFactory, ProcessPipelineFactory};
use crate::port_pool::PortPool;
use crate::recorder::Recorder;
use crate::records::RecordsCatalog;
use crate::runtime::TokioSpawner;
use crate::schedule::{HttpScheduleClient, ScheduleClient};

/// Container for all bootstrapped services.
///
/// This struct holds all the wired services created during bootstrap.
/// It's consumed by `AppState` to build the final application state.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// The recording orchestrator.
    pub recorder: Arc<Recorder>,
    /// The records catalog.
    pub records: Arc<RecordsCatalog>,
    /// Shared SRT listener port pool, exposed for diagnostics.
    pub ports: Arc<PortPool>,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
}

impl BootstrappedServices {
    /// Initiates graceful shutdown.
    ///
    /// Detached pipelines are intentionally not cancelled: per the design,
    /// a recording outlives the request (and the process's own shutdown
    /// signal) that started it.
    pub fn shutdown(&self) {
        log::info!("[Bootstrap] beginning graceful shutdown");
        self.cancel_token.cancel();
    }
}

/// Bootstraps all application services with their dependencies.
///
/// This is the composition root where all services are instantiated and
/// wired together, in dependency order:
///
/// 1. Clock (wall time for expirations and key stamps)
/// 2. Port pool (configured SRT listener ports)
/// 3. Credential minter (depends on clock, recording timeout)
/// 4. Schedule client, object store client (external collaborators)
/// 5. Pipeline factory (depends on object store client)
/// 6. Recorder (composes 1-5)
/// 7. Records catalog (depends on schedule + object store clients)
#[must_use]
pub fn bootstrap_services(config: &Config) -> BootstrappedServices {
    let clock: Arc<dyn Clock> = SystemClock::arc();
    let cancel_token = CancellationToken::new();

    let ports = Arc::new(PortPool::new(config.server.ports.srt.clone()));

    let credentials: Arc<dyn CredentialMinter> = Arc::new(RandomCredentialMinter::new(
        Arc::clone(&clock),
        config.recording.timeout(),
    ));

    let schedule: Arc<dyn ScheduleClient> =
        Arc::new(HttpScheduleClient::new(config.emishows.http.url()));

    let object_store: Arc<dyn ObjectStoreClient> = Arc::new(S3ObjectStoreClient::new(
        &config.datarecords.s3.url(),
        &config.datarecords.s3.user,
        &config.datarecords.s3.password,
        config.datarecords.s3.bucket.clone(),
    ));

    let pipelines: Arc<dyn PipelineFactory> =
        Arc::new(ProcessPipelineFactory::new(Arc::clone(&object_store)));

    let spawner = Arc::new(TokioSpawner::current());

    let recorder = Arc::new(Recorder::new(
        Arc::clone(&clock),
        Arc::clone(&schedule),
        credentials,
        Arc::clone(&ports),
        pipelines,
        spawner,
        config.server.host.clone(),
        config.recording.window(),
    ));

    let records = Arc::new(RecordsCatalog::new(schedule, object_store));

    BootstrappedServices {
        recorder,
        records,
        ports,
        cancel_token,
    }
}
