//! Shared cache store
//!
//! One store per learning target. Sessions clone the handle; all clones see
//! the same automaton behind a single reader/writer lock.

use super::automaton::{CacheAutomaton, InsertStats};
use super::error::{CacheError, CacheResult};
use super::metrics::CacheMetrics;
use crate::shared::models::{Response, Symbol};
use parking_lot::lock_api::ArcRwLockReadGuard;
use parking_lot::{RawRwLock, RwLock, RwLockReadGuard};
use prometheus::Registry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read guard a session holds between `pre` and its first miss
pub type SessionReadGuard = ArcRwLockReadGuard<RawRwLock, CacheAutomaton>;

#[derive(Clone)]
pub struct CacheStore {
    automaton: Arc<RwLock<CacheAutomaton>>,
    metrics: Arc<CacheMetrics>,
}

impl CacheStore {
    pub fn new(payload_limit: usize, registry: &Registry) -> CacheResult<Self> {
        Ok(Self {
            automaton: Arc::new(RwLock::new(CacheAutomaton::new(payload_limit))),
            metrics: Arc::new(CacheMetrics::new(registry)?),
        })
    }

    /// Store whose metrics live in a private registry
    pub fn unregistered(payload_limit: usize) -> CacheResult<Self> {
        Self::new(payload_limit, &Registry::new())
    }

    pub fn read(&self) -> RwLockReadGuard<'_, CacheAutomaton> {
        self.automaton.read()
    }

    /// Owned read guard, may outlive the borrow of `self`
    pub fn read_arc(&self) -> SessionReadGuard {
        self.automaton.read_arc()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn lookup_outputs(&self, inputs: &[Symbol]) -> Option<Vec<Response>> {
        self.automaton.read().outputs_for(inputs)
    }

    /// Insert one session under the exclusive lock
    pub fn insert(
        &self,
        inputs: &[Symbol],
        outputs: &[Response],
        overwrite: bool,
    ) -> CacheResult<InsertStats> {
        let result = self.automaton.write().insert(inputs, outputs, overwrite);
        match &result {
            Ok(stats) => {
                self.metrics.inserts.inc_by(stats.added);
                if stats.replaced > 0 {
                    debug!(
                        replaced = stats.replaced,
                        len = inputs.len(),
                        "Overwrote stale cache subtree"
                    );
                }
            }
            Err(e @ CacheError::Conflict { .. }) => {
                self.metrics.conflicts.inc();
                warn!(error = %e, "Cache conflict");
            }
            Err(_) => {}
        }
        result
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let automaton = self.automaton.read();
        f.debug_struct("CacheStore")
            .field("nodes", &automaton.node_count())
            .field("edges", &automaton.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::MessageKind;

    #[test]
    fn test_clones_share_automaton() {
        let store = CacheStore::unregistered(32).unwrap();
        let other = store.clone();
        store
            .insert(&[Symbol::Heartbeat], &[Response::of_kinds(&[MessageKind::Heartbeat])], false)
            .unwrap();
        assert!(other.lookup_outputs(&[Symbol::Heartbeat]).is_some());
        assert_eq!(other.metrics().inserts.get(), 1);
    }

    #[test]
    fn test_conflict_counted() {
        let store = CacheStore::unregistered(32).unwrap();
        store
            .insert(&[Symbol::Finished], &[Response::silent()], false)
            .unwrap();
        assert!(store
            .insert(&[Symbol::Finished], &[Response::IllegalTransition], false)
            .is_err());
        assert_eq!(store.metrics().conflicts.get(), 1);
    }

    #[test]
    fn test_many_readers() {
        let store = CacheStore::unregistered(32).unwrap();
        let a = store.read_arc();
        let b = store.read_arc();
        assert_eq!(a.node_count(), b.node_count());
    }
}
