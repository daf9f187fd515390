/*
 * Learning Run Configuration
 *
 * Level 1: preset only
 *   StateVulnConfig::preset(Preset::Fast).build()?
 * Level 2: section overrides through closures
 *   StateVulnConfig::preset(Preset::Balanced)
 *       .equivalence(|c| c.max_length(16).seed(7))
 *       .build()?
 * Level 3: YAML v1 file
 *   StateVulnConfig::from_yaml("run.yaml")?
 */

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use super::sections::{AnalysisConfig, CacheConfig, EquivalenceConfig, LearningConfig};
use super::validation::Validatable;
use std::path::Path;
use tracing::warn;

pub const SUPPORTED_VERSIONS: [u32; 1] = [1];

#[derive(Debug, Clone, Default)]
pub struct StateVulnConfig {
    preset: Preset,
    cache: Option<CacheConfig>,
    equivalence: Option<EquivalenceConfig>,
    analysis: Option<AnalysisConfig>,
    learning: Option<LearningConfig>,
}

impl StateVulnConfig {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    pub fn cache<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CacheConfig) -> CacheConfig,
    {
        let base = self
            .cache
            .take()
            .unwrap_or_else(|| CacheConfig::from_preset(self.preset));
        self.cache = Some(f(base));
        self
    }

    pub fn equivalence<F>(mut self, f: F) -> Self
    where
        F: FnOnce(EquivalenceConfig) -> EquivalenceConfig,
    {
        let base = self
            .equivalence
            .take()
            .unwrap_or_else(|| EquivalenceConfig::from_preset(self.preset));
        self.equivalence = Some(f(base));
        self
    }

    pub fn analysis<F>(mut self, f: F) -> Self
    where
        F: FnOnce(AnalysisConfig) -> AnalysisConfig,
    {
        let base = self
            .analysis
            .take()
            .unwrap_or_else(|| AnalysisConfig::from_preset(self.preset));
        self.analysis = Some(f(base));
        self
    }

    pub fn learning<F>(mut self, f: F) -> Self
    where
        F: FnOnce(LearningConfig) -> LearningConfig,
    {
        let base = self
            .learning
            .take()
            .unwrap_or_else(|| LearningConfig::from_preset(self.preset));
        self.learning = Some(f(base));
        self
    }

    /// Validate every section and the cross-section constraints
    pub fn build(self) -> ConfigResult<ValidatedConfig> {
        self.cache.validate()?;
        self.equivalence.validate()?;
        self.analysis.validate()?;
        self.learning.validate()?;

        let validated = ValidatedConfig(self);
        let equivalence = validated.equivalence();
        if equivalence.min_length > equivalence.max_length {
            return Err(ConfigError::conflict(
                format!(
                    "equivalence.min_length ({}) exceeds equivalence.max_length ({})",
                    equivalence.min_length, equivalence.max_length
                ),
                "lower min_length or raise max_length",
            ));
        }

        let cache = validated.cache();
        if cache.disable_cache && cache.overwrite_on_conflict {
            warn!("overwrite_on_conflict has no effect while the cache is disabled");
        }
        if cache.disable_cache_trap && cache.fast_filter {
            warn!("fast_filter is bypassed while replaying prefixes with cache trapping disabled");
        }
        Ok(validated)
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<ValidatedConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<ValidatedConfig> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset: Preset = export.preset.parse()?;
        let overrides = export.overrides.unwrap_or_default();
        let config = Self {
            preset,
            cache: overrides.cache,
            equivalence: overrides.equivalence,
            analysis: overrides.analysis,
            learning: overrides.learning,
        };
        config.build()
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                cache: self.cache.clone(),
                equivalence: self.equivalence.clone(),
                analysis: self.analysis.clone(),
                learning: self.learning.clone(),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}

/// Validated configuration (immutable)
#[derive(Debug, Clone)]
pub struct ValidatedConfig(StateVulnConfig);

impl Default for ValidatedConfig {
    fn default() -> Self {
        Self(StateVulnConfig::default())
    }
}

impl ValidatedConfig {
    pub fn into_inner(self) -> StateVulnConfig {
        self.0
    }

    pub fn preset(&self) -> Preset {
        self.0.preset
    }

    pub fn cache(&self) -> CacheConfig {
        self.0
            .cache
            .clone()
            .unwrap_or_else(|| CacheConfig::from_preset(self.0.preset))
    }

    pub fn equivalence(&self) -> EquivalenceConfig {
        self.0
            .equivalence
            .clone()
            .unwrap_or_else(|| EquivalenceConfig::from_preset(self.0.preset))
    }

    pub fn analysis(&self) -> AnalysisConfig {
        self.0
            .analysis
            .clone()
            .unwrap_or_else(|| AnalysisConfig::from_preset(self.0.preset))
    }

    pub fn learning(&self) -> LearningConfig {
        self.0
            .learning
            .clone()
            .unwrap_or_else(|| LearningConfig::from_preset(self.0.preset))
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.0.to_yaml()
    }
}
