pub mod benign_state;
pub mod critical_order;
pub mod error_state;
pub mod happy_flow;
pub mod odd_error_transition;
pub mod redundant_state;
pub mod response_content;
pub mod state_confusion;

#[cfg(test)]
pub(crate) mod fixtures;

pub use benign_state::{BenignStateClassifier, INITIAL_STATE_NAME};
pub use critical_order::CriticalMessageOutOfOrderClassifier;
pub use error_state::{ErrorStateClassifier, ERROR_STATE_NAME};
pub use happy_flow::HappyFlowClassifier;
pub use odd_error_transition::OddErrorStateTransitionClassifier;
pub use redundant_state::RedundantStateClassifier;
pub use response_content::{InternalErrorClassifier, KeyblockLeakClassifier, UnknownMessageClassifier};
pub use state_confusion::StateConfusionClassifier;
