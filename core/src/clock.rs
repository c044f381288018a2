//! Clock abstraction for expirations and key stamps.
//!
//! Mirrors the [`crate::context::IpDetector`]-style trait-plus-default-impl
//! pattern: core services depend on `Arc<dyn Clock>` so tests can inject a
//! fixed point in time instead of racing the system clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Abstraction over wall-clock time.
///
/// All timestamps the core deals with are UTC; conversions to/from an
/// event's local timezone happen at the edges (see [`crate::timezone`]).
pub trait Clock: Send + Sync {
    /// Returns the current instant, as naive UTC (no offset attached).
    fn now_utc_naive(&self) -> NaiveDateTime;

    /// Returns the current instant, as a UTC-aware timestamp.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new `SystemClock` wrapped in an `Arc`.
    #[must_use]
    pub fn arc() -> Arc<dyn Clock> {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now_utc_naive(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock that always reports `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Creates a `FixedClock` wrapped in an `Arc`.
    #[must_use]
    pub fn arc(now: DateTime<Utc>) -> Arc<dyn Clock> {
        Arc::new(Self::new(now))
    }
}

impl Clock for FixedClock {
    fn now_utc_naive(&self) -> NaiveDateTime {
        self.now.naive_utc()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}
