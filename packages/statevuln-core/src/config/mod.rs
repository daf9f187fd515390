//! Configuration
//!
//! Three levels of control:
//! - Preset: one-liner defaults
//! - Section override: closures on the builder
//! - YAML v1 file: full control
//!
//! ```rust,ignore
//! use statevuln_core::config::{Preset, StateVulnConfig};
//!
//! let config = StateVulnConfig::preset(Preset::Balanced)
//!     .cache(|c| c.fast_filter(true))
//!     .analysis(|c| c.classifier_timeout_ms(30_000))
//!     .build()?;
//! ```

pub mod error;
pub mod io;
pub mod preset;
pub mod sections;
pub mod statevuln_config;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use sections::{AnalysisConfig, CacheConfig, EquivalenceConfig, LearningConfig};
pub use statevuln_config::{StateVulnConfig, ValidatedConfig};
pub use validation::Validatable;
