//! Learning-loop orchestration

pub mod learner;
pub mod learning_loop;
pub mod outcome;

pub use learner::HypothesisLearner;
pub use learning_loop::{cached_sul, ensure_complete, LearningLoop};
pub use outcome::LearningOutcome;
