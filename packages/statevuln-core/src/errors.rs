//! Error types for statevuln-core
//!
//! Feature errors convert into `StateVulnError` at the orchestration
//! boundary.

use crate::config::ConfigError;
use crate::features::classifiers::AnalysisError;
use crate::features::sul::SulError;
use crate::features::sul_cache::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateVulnError {
    /// Session or limit error from the live system
    #[error("SUL error: {0}")]
    Sul(SulError),

    /// Cache errors, conflicts included, whether raised directly or inside a session
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// The external learning algorithm failed
    #[error("Learner error: {0}")]
    Learner(String),
}

impl From<SulError> for StateVulnError {
    fn from(e: SulError) -> Self {
        match e {
            SulError::Cache(cache) => Self::Cache(cache),
            other => Self::Sul(other),
        }
    }
}

impl StateVulnError {
    pub fn learner(msg: impl Into<String>) -> Self {
        Self::Learner(msg.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Cache(CacheError::Conflict { .. }))
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Sul(e) => e.category(),
            Self::Cache(e) => e.category(),
            Self::Config(e) => e.category(),
            Self::Analysis(e) => e.category(),
            Self::Learner(_) => "learner",
        }
    }
}

/// Result type alias for statevuln operations
pub type StateVulnResult<T> = std::result::Result<T, StateVulnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_conflict_surfaces_as_cache_error() {
        let conflict = CacheError::Conflict {
            inputs: vec![],
            cached: vec![],
            observed: vec![],
        };
        let err: StateVulnError = SulError::Cache(conflict).into();
        assert!(err.is_conflict());
        assert_eq!(err.category(), "cache_conflict");
    }

    #[test]
    fn test_limit_errors_stay_sul_errors() {
        let err: StateVulnError = SulError::ConnectionLimitExceeded { limit: 3 }.into();
        assert!(matches!(err, StateVulnError::Sul(_)));
        assert_eq!(err.category(), "connection_limit");
    }
}
