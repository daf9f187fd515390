pub mod analyzer_guided;
pub mod happy_flow;
pub mod random_words;
pub mod state_bound;

#[cfg(test)]
pub(crate) mod fixtures;

pub use analyzer_guided::AnalyzerGuidedOracle;
pub use happy_flow::HappyFlowOracle;
pub use random_words::CountingRandomWordsOracle;
pub use state_bound::StateBoundRandomWordsOracle;
