//! Section configuration types
//!
//! Each section has preset defaults, builder methods and range validation.

use super::error::ConfigResult;
use super::preset::Preset;
use super::validation::{check_range, Validatable};
use crate::shared::models::ProtocolRole;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// SUL cache
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Pass every query straight to the live implementation
    pub disable_cache: bool,

    /// Re-query the live implementation after a cached illegal transition
    pub disable_cache_trap: bool,

    /// Drop attack probes sent without their prerequisite state
    pub fast_filter: bool,

    /// Replace contradicting cache entries instead of failing
    pub overwrite_on_conflict: bool,

    /// Payloads above this many bytes are dropped before caching (0..=65536)
    pub payload_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl CacheConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            disable_cache: false,
            disable_cache_trap: false,
            fast_filter: matches!(preset, Preset::Fast),
            overwrite_on_conflict: false,
            payload_limit: 32,
        }
    }

    pub fn disable_cache(mut self, v: bool) -> Self {
        self.disable_cache = v;
        self
    }

    pub fn disable_cache_trap(mut self, v: bool) -> Self {
        self.disable_cache_trap = v;
        self
    }

    pub fn fast_filter(mut self, v: bool) -> Self {
        self.fast_filter = v;
        self
    }

    pub fn overwrite_on_conflict(mut self, v: bool) -> Self {
        self.overwrite_on_conflict = v;
        self
    }

    pub fn payload_limit(mut self, v: usize) -> Self {
        self.payload_limit = v;
        self
    }
}

impl Validatable for CacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "payload_limit",
            self.payload_limit,
            0,
            65_536,
            "Larger payloads make every distinct nonce a new cache entry",
        )
    }

    fn config_name(&self) -> &'static str {
        "CacheConfig"
    }
}

// ============================================================================
// Equivalence oracles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalenceConfig {
    /// Minimum random word length (1..=200)
    pub min_length: usize,

    /// Maximum random word length (1..=200)
    pub max_length: usize,

    /// Random words per counting-oracle round (0..=1000000)
    pub random_queries: usize,

    /// Random extensions per reachable state (0..=10000)
    pub queries_per_state: usize,

    /// Random extensions per divergent finding (0..=10000)
    pub guided_extensions: usize,

    /// Above this many candidates prefix deduplication is skipped
    pub max_guided_candidates: usize,

    /// Seed for every random extension
    pub seed: u64,

    pub happy_flows: bool,
    pub analyzer_guided: bool,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl EquivalenceConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let (min_length, max_length, random_queries, queries_per_state, guided_extensions) =
            match preset {
                Preset::Fast => (2, 8, 100, 5, 5),
                Preset::Balanced => (3, 12, 1_000, 20, 20),
                Preset::Thorough => (4, 20, 5_000, 50, 50),
            };
        Self {
            min_length,
            max_length,
            random_queries,
            queries_per_state,
            guided_extensions,
            max_guided_candidates: 1_000,
            seed: 42,
            happy_flows: true,
            analyzer_guided: !matches!(preset, Preset::Fast),
        }
    }

    pub fn min_length(mut self, v: usize) -> Self {
        self.min_length = v;
        self
    }

    pub fn max_length(mut self, v: usize) -> Self {
        self.max_length = v;
        self
    }

    pub fn random_queries(mut self, v: usize) -> Self {
        self.random_queries = v;
        self
    }

    pub fn queries_per_state(mut self, v: usize) -> Self {
        self.queries_per_state = v;
        self
    }

    pub fn guided_extensions(mut self, v: usize) -> Self {
        self.guided_extensions = v;
        self
    }

    pub fn max_guided_candidates(mut self, v: usize) -> Self {
        self.max_guided_candidates = v;
        self
    }

    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub fn happy_flows(mut self, v: bool) -> Self {
        self.happy_flows = v;
        self
    }

    pub fn analyzer_guided(mut self, v: bool) -> Self {
        self.analyzer_guided = v;
        self
    }
}

impl Validatable for EquivalenceConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("min_length", self.min_length, 1, 200, "Probe words need at least one symbol")?;
        check_range("max_length", self.max_length, 1, 200, "Probe words need at least one symbol")?;
        check_range(
            "random_queries",
            self.random_queries,
            0,
            1_000_000,
            "Use the state-bound oracle for deeper coverage instead",
        )?;
        check_range("queries_per_state", self.queries_per_state, 0, 10_000, "")?;
        check_range("guided_extensions", self.guided_extensions, 0, 10_000, "")?;
        check_range(
            "max_guided_candidates",
            self.max_guided_candidates,
            1,
            100_000,
            "Prefix deduplication is quadratic in the candidate count",
        )
    }

    fn config_name(&self) -> &'static str {
        "EquivalenceConfig"
    }
}

// ============================================================================
// Classifier pipeline
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Wall-clock deadline per classifier in milliseconds (1..=3600000)
    pub classifier_timeout_ms: u64,

    /// Concurrently running (including abandoned) classifier workers (1..=64)
    pub max_running_workers: usize,

    /// Longest benign path explored per state (1..=256)
    pub max_benign_depth: usize,

    /// Entry contexts remembered per state (1..=1024)
    pub max_entries_per_state: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl AnalysisConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                classifier_timeout_ms: 10_000,
                max_running_workers: 2,
                max_benign_depth: 16,
                max_entries_per_state: 4,
            },
            Preset::Balanced => Self {
                classifier_timeout_ms: 60_000,
                max_running_workers: 4,
                max_benign_depth: 32,
                max_entries_per_state: 8,
            },
            Preset::Thorough => Self {
                classifier_timeout_ms: 300_000,
                max_running_workers: 8,
                max_benign_depth: 64,
                max_entries_per_state: 32,
            },
        }
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }

    pub fn classifier_timeout_ms(mut self, v: u64) -> Self {
        self.classifier_timeout_ms = v;
        self
    }

    pub fn max_running_workers(mut self, v: usize) -> Self {
        self.max_running_workers = v;
        self
    }

    pub fn max_benign_depth(mut self, v: usize) -> Self {
        self.max_benign_depth = v;
        self
    }

    pub fn max_entries_per_state(mut self, v: usize) -> Self {
        self.max_entries_per_state = v;
        self
    }
}

impl Validatable for AnalysisConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "classifier_timeout_ms",
            self.classifier_timeout_ms,
            1,
            3_600_000,
            "A timed-out classifier still contributes its partial findings",
        )?;
        check_range(
            "max_running_workers",
            self.max_running_workers,
            1,
            64,
            "Abandoned workers keep running until they finish",
        )?;
        check_range("max_benign_depth", self.max_benign_depth, 1, 256, "")?;
        check_range("max_entries_per_state", self.max_entries_per_state, 1, 1_024, "")
    }

    fn config_name(&self) -> &'static str {
        "AnalysisConfig"
    }
}

// ============================================================================
// Learning loop
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub role: ProtocolRole,

    /// Hypothesis refinement rounds (1..=10000)
    pub max_rounds: usize,

    /// Soft limit on live connections
    pub connection_limit: Option<u64>,

    /// Hard wall-clock limit in seconds
    pub time_limit_secs: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl LearningConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            role: ProtocolRole::Server,
            max_rounds: match preset {
                Preset::Fast => 20,
                Preset::Balanced => 100,
                Preset::Thorough => 1_000,
            },
            connection_limit: None,
            time_limit_secs: None,
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    pub fn role(mut self, role: ProtocolRole) -> Self {
        self.role = role;
        self
    }

    pub fn max_rounds(mut self, v: usize) -> Self {
        self.max_rounds = v;
        self
    }

    pub fn connection_limit(mut self, v: Option<u64>) -> Self {
        self.connection_limit = v;
        self
    }

    pub fn time_limit_secs(mut self, v: Option<u64>) -> Self {
        self.time_limit_secs = v;
        self
    }
}

impl Validatable for LearningConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("max_rounds", self.max_rounds, 1, 10_000, "")?;
        if let Some(limit) = self.connection_limit {
            check_range(
                "connection_limit",
                limit,
                1,
                u64::MAX,
                "Use None for an unlimited connection budget",
            )?;
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "LearningConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_fast_preset_enables_filter() {
        assert!(CacheConfig::from_preset(Preset::Fast).fast_filter);
        assert!(!CacheConfig::from_preset(Preset::Thorough).fast_filter);
    }

    #[test]
    fn test_equivalence_range_validation() {
        let cfg = EquivalenceConfig::default().max_length(0);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Range { ref field, .. } if field == "max_length"));
    }

    #[test]
    fn test_analysis_timeout_duration() {
        let cfg = AnalysisConfig::default().classifier_timeout_ms(250);
        assert_eq!(cfg.classifier_timeout(), Duration::from_millis(250));
        assert!(cfg.validate().is_ok());
        assert!(cfg.max_running_workers(0).validate().is_err());
    }

    #[test]
    fn test_zero_connection_limit_rejected() {
        assert!(LearningConfig::default()
            .connection_limit(Some(0))
            .validate()
            .is_err());
    }
}
