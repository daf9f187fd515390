pub mod analyzer;

pub use analyzer::{classifiers_for_role, AnalysisReport, Analyzer};
