/// Equivalence Oracles
///
/// Search the live system for words on which a hypothesis is wrong.
///
/// ## Architecture
/// - **Domain**: Counterexample, seeded WordSampler
/// - **Ports**: EquivalenceOracle trait, `probe` helper
/// - **Infrastructure**: happy-flow, analyzer-guided, counting random-words
///   and state-bound random-words strategies
/// - **Application**: OracleChain
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
pub use ports::*;
