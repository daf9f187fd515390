/// Classifier Pipeline
///
/// Labels the states of a learned hypothesis and emits typed state-machine
/// findings with witness paths.
///
/// ## Architecture
/// - **Domain**: StateMachineIssue, IssueKind, Divergence, GraphDetails
/// - **Ports**: Classifier trait, AnalysisInput, partial-result buffer
/// - **Infrastructure**: one classifier per finding family
/// - **Application**: Analyzer (sequential workers with per-classifier deadline)
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::*;
pub use domain::*;
pub use error::{AnalysisError, AnalysisResult};
pub use infrastructure::*;
pub use ports::*;
