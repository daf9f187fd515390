pub mod analyzer;

pub use analyzer::TransitionAnalyzer;
