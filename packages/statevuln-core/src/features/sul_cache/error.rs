//! Error types for the SUL cache

use crate::shared::models::{format_path, Response, Symbol};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Cached and observed outputs disagree for the same input prefix
    #[error(
        "Cache conflict on [{}]: cached [{}], observed [{}]",
        format_path(.inputs),
        format_outputs(.cached),
        format_outputs(.observed)
    )]
    Conflict {
        inputs: Vec<Symbol>,
        cached: Vec<Response>,
        observed: Vec<Response>,
    },

    #[error("Length mismatch: {inputs} inputs, {outputs} outputs")]
    LengthMismatch { inputs: usize, outputs: usize },

    #[error("Metrics registration failed: {0}")]
    Metrics(String),
}

impl CacheError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "cache_conflict",
            Self::LengthMismatch { .. } => "cache_length_mismatch",
            Self::Metrics(_) => "cache_metrics",
        }
    }
}

impl From<prometheus::Error> for CacheError {
    fn from(e: prometheus::Error) -> Self {
        Self::Metrics(e.to_string())
    }
}

fn format_outputs(outputs: &[Response]) -> String {
    outputs
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type CacheResult<T> = Result<T, CacheError>;
