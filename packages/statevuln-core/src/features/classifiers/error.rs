//! Error types for the classifier pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Automaton is incomplete: state {state} has no transition for {input}")]
    IncompleteAutomaton { state: usize, input: String },

    #[error("Classifier {classifier} failed: {message}")]
    ClassifierFailed {
        classifier: &'static str,
        message: String,
    },

    #[error("Worker spawn failed: {0}")]
    Spawn(String),
}

impl AnalysisError {
    pub fn failed(classifier: &'static str, message: impl Into<String>) -> Self {
        Self::ClassifierFailed {
            classifier,
            message: message.into(),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::IncompleteAutomaton { .. } => "analysis_incomplete_automaton",
            Self::ClassifierFailed { .. } => "analysis_classifier_failed",
            Self::Spawn(_) => "analysis_spawn",
        }
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
