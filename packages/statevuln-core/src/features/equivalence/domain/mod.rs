pub mod counterexample;
pub mod words;

pub use counterexample::Counterexample;
pub use words::WordSampler;
