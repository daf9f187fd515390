/*
 * SUL Cache
 *
 * Consistency-checking response cache between the learner and the live
 * implementation.
 *
 * Architecture:
 * - CacheAutomaton: prefix tree of observed sessions (petgraph arena)
 * - ResponsePool: semantic deduplication of stored responses
 * - CacheStore: shared handle, reader/writer lock, prometheus counters
 * - SulCache: per-session SUL wrapper with filters and lazy escalation
 */

pub mod automaton;
pub mod error;
pub mod filters;
pub mod metrics;
pub mod response_pool;
pub mod session;
pub mod store;

pub use automaton::{CacheAutomaton, InsertStats};
pub use error::{CacheError, CacheResult};
pub use filters::{FilterReason, SessionFilter};
pub use metrics::CacheMetrics;
pub use response_pool::ResponsePool;
pub use session::{SessionPhase, SulCache};
pub use store::{CacheStore, SessionReadGuard};
