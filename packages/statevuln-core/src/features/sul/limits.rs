//! Connection-count and wall-clock limits around a live SUL

use super::error::{SulError, SulResult};
use super::ports::SystemUnderLearning;
use crate::shared::models::{Response, Symbol};
use std::time::{Duration, Instant};
use tracing::warn;

pub struct LimitedSul<S> {
    inner: S,
    connection_limit: Option<u64>,
    time_limit: Option<Duration>,
    connections: u64,
    started: Instant,
}

impl<S: SystemUnderLearning> LimitedSul<S> {
    pub fn new(inner: S, connection_limit: Option<u64>, time_limit: Option<Duration>) -> Self {
        Self {
            inner,
            connection_limit,
            time_limit,
            connections: 0,
            started: Instant::now(),
        }
    }

    pub fn connections(&self) -> u64 {
        self.connections
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Start a fresh connection budget (resuming after a soft abort)
    pub fn reset_connection_budget(&mut self) {
        self.connections = 0;
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn check_time(&self) -> SulResult<()> {
        match self.time_limit {
            Some(limit) if self.started.elapsed() > limit => {
                warn!(?limit, "Learning time limit exceeded");
                Err(SulError::TimeLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

impl<S: SystemUnderLearning> SystemUnderLearning for LimitedSul<S> {
    fn pre(&mut self) -> SulResult<()> {
        self.check_time()?;
        if let Some(limit) = self.connection_limit {
            if self.connections >= limit {
                warn!(limit, "Connection limit exceeded");
                return Err(SulError::ConnectionLimitExceeded { limit });
            }
        }
        self.connections += 1;
        match self.inner.pre() {
            Err(SulError::Io(msg)) if self.connections == 1 => Err(SulError::Initialization(msg)),
            other => other,
        }
    }

    fn step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        self.check_time()?;
        self.inner.step(symbol)
    }

    fn step_with_hint(&mut self, symbol: &Symbol, expected: &Response) -> SulResult<Response> {
        self.check_time()?;
        self.inner.step_with_hint(symbol, expected)
    }

    fn post(&mut self) -> SulResult<()> {
        self.inner.post()
    }
}
