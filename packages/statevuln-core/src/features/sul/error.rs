//! Error types for system-under-learning sessions

use crate::features::sul_cache::CacheError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SulError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Soft limit: the current learning attempt stops, a later run may resume
    #[error("Connection limit exceeded: {limit} connections")]
    ConnectionLimitExceeded { limit: u64 },

    /// Hard limit
    #[error("Time limit exceeded: {limit:?}")]
    TimeLimitExceeded { limit: Duration },

    /// Hard: the implementation never came up
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl SulError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Stop immediately, do not retry
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            Self::TimeLimitExceeded { .. } | Self::Initialization(_)
        )
    }

    /// Abort the attempt but allow a later resume
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::ConnectionLimitExceeded { .. })
    }

    /// Session-limit conditions handled at the orchestration boundary
    pub fn is_limit(&self) -> bool {
        self.is_hard() || self.is_resumable()
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Cache(CacheError::Conflict { .. }))
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Cache(e) => e.category(),
            Self::ConnectionLimitExceeded { .. } => "connection_limit",
            Self::TimeLimitExceeded { .. } => "time_limit",
            Self::Initialization(_) => "initialization",
            Self::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for SulError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type SulResult<T> = Result<T, SulError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_classification() {
        let soft = SulError::ConnectionLimitExceeded { limit: 10 };
        assert!(soft.is_resumable());
        assert!(!soft.is_hard());

        let hard = SulError::TimeLimitExceeded {
            limit: Duration::from_secs(60),
        };
        assert!(hard.is_hard());
        assert!(hard.is_limit());
        assert_eq!(SulError::initialization("refused").category(), "initialization");
        assert!(!SulError::io("reset").is_limit());
    }
}
