//! Bounded SRT listener port pool.
//!
//! A tagged `{Free, InUse}` partition over a configured set of ports,
//! protected by a single mutex. No RPC ever runs inside the critical
//! section — `reserve`/`release` only read, mutate, and write the in-use set.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::error::{RecorderError, RecorderResult};

/// Bounded set of SRT listener ports with mutually exclusive reservation.
pub struct PortPool {
    all: HashSet<u16>,
    in_use: Mutex<HashSet<u16>>,
}

impl PortPool {
    /// Creates a pool over the given configured port set.
    #[must_use]
    pub fn new(ports: HashSet<u16>) -> Self {
        Self {
            all: ports,
            in_use: Mutex::new(HashSet::new()),
        }
    }

    /// Reserves and returns any free port, or [`RecorderError::RecorderBusy`]
    /// if none remain. Which free port is chosen is unspecified.
    pub fn reserve(&self) -> RecorderResult<u16> {
        let mut in_use = self.in_use.lock();
        let port = self
            .all
            .iter()
            .copied()
            .find(|p| !in_use.contains(p))
            .ok_or(RecorderError::RecorderBusy)?;
        in_use.insert(port);
        Ok(port)
    }

    /// Releases a previously reserved port.
    ///
    /// Releasing a port that isn't reserved is a programmer error: it
    /// panics in debug builds and is a no-op in release builds, matching
    /// the specification's "fatal assertion in debug, no-op in release".
    pub fn release(&self, port: u16) {
        let mut in_use = self.in_use.lock();
        let removed = in_use.remove(&port);
        debug_assert!(removed, "released port {port} was not reserved");
    }

    /// Returns the number of ports currently reserved.
    #[must_use]
    pub fn in_use_count(&self) -> usize {
        self.in_use.lock().len()
    }

    /// Returns the total number of configured ports.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.all.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_then_release_frees_the_port() {
        let pool = PortPool::new(HashSet::from([31000]));
        let port = pool.reserve().unwrap();
        assert_eq!(port, 31000);
        assert_eq!(pool.in_use_count(), 1);
        pool.release(port);
        assert_eq!(pool.in_use_count(), 0);
    }

    #[test]
    fn reserve_fails_when_exhausted() {
        let pool = PortPool::new(HashSet::from([31000]));
        let _port = pool.reserve().unwrap();
        let err = pool.reserve().unwrap_err();
        assert!(matches!(err, RecorderError::RecorderBusy));
    }

    #[test]
    fn concurrent_reservations_never_collide() {
        use std::sync::Arc;
        use std::thread;

        let pool = Arc::new(PortPool::new((30000..30100).collect()));
        let mut handles = Vec::new();
        for _ in 0..50 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || pool.reserve().unwrap()));
        }
        let mut reserved: Vec<u16> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        reserved.sort_unstable();
        let before = reserved.len();
        reserved.dedup();
        assert_eq!(reserved.len(), before, "no two reservations returned the same port");
        assert_eq!(pool.in_use_count(), 50);
    }

    #[test]
    #[should_panic]
    fn release_of_unreserved_port_panics_in_debug() {
        let pool = PortPool::new(HashSet::from([31000]));
        pool.release(31000);
    }
}
