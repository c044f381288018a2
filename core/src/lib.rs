//! Recorder core - shared library for the live-broadcast recording service.
//!
//! This crate implements the recording orchestrator and records catalog
//! described in the service's design: on demand, it resolves a scheduled
//! event instance, reserves an SRT listener port, mints a single-use
//! credential, and supervises a detached media pipeline that uploads the
//! result to an S3-compatible object store. It also serves a catalog of
//! previously recorded instances, cross-referenced against the same
//! remote schedule service.
//!
//! # Architecture
//!
//! - [`runtime`]: task spawning abstraction for async runtime independence
//! - [`clock`]: wall-clock abstraction for expirations and key stamps
//! - [`domain`]: shared domain types (events, instances, credentials, requests)
//! - [`config`]: layered YAML + environment configuration
//! - [`error`]: centralized error kinds and their HTTP mapping
//! - [`port_pool`]: the bounded SRT listener port pool
//! - [`credentials`]: single-use passphrase credential minting
//! - [`schedule`]: client for the remote schedule service
//! - [`objectstore`]: client for the S3-compatible object store
//! - [`pipeline`]: the two-stage media pipeline and its factory
//! - [`recorder`]: the recording orchestrator
//! - [`records`]: the records catalog
//! - [`timezone`]: event-local-time to UTC conversion
//! - [`bootstrap`]: composition root wiring the above into [`BootstrappedServices`]
//! - [`api`]: the HTTP surface

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod api;
pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod objectstore;
pub mod pipeline;
pub mod port_pool;
pub mod protocol_constants;
pub mod recorder;
pub mod records;
pub mod runtime;
pub mod schedule;
pub mod timezone;
pub mod utils;

pub use bootstrap::{bootstrap_services, BootstrappedServices};
pub use config::Config;
pub use error::{RecorderError, RecorderResult};
pub use recorder::Recorder;
pub use records::RecordsCatalog;
pub use runtime::{TaskSpawner, TokioSpawner};

pub use api::{start_server, AppState, AppStateBuilder};
