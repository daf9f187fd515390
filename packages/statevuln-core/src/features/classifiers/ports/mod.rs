pub mod classifier;

pub use classifier::{AnalysisInput, Classifier, FindingCollector, PartialFindings};
