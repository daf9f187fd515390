pub mod graph_details;
pub mod issue;

pub use graph_details::{BenignStateInfo, GraphDetails, StateEntry};
pub use issue::{Divergence, IssueKind, StateMachineIssue};
