/*
 * statevuln-core - TLS State-Machine Learning Core
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Symbol, Response, Alphabet, MealyMachine, automaton port
 * - features/    : Vertical slices (context -> rules -> transition analysis,
 *                  sul -> sul_cache, classifiers, equivalence)
 * - pipeline/    : Learning loop orchestration
 * - config/      : Presets, sections, YAML v1
 *
 * The protocol engine and the learning algorithm are external: they plug in
 * through `SystemUnderLearning` and `HypothesisLearner`.
 */

#![allow(clippy::too_many_arguments)] // Loop wiring takes one Arc per collaborator
#![allow(clippy::type_complexity)]
#![allow(clippy::new_without_default)]

/// Shared models and ports
pub mod shared;

/// Feature modules
pub mod features;

/// Learning loop orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use errors::{StateVulnError, StateVulnResult};
pub use features::sul::{OutputQuery, SystemUnderLearning};
pub use pipeline::{HypothesisLearner, LearningLoop, LearningOutcome};
pub use shared::models::{Alphabet, MealyMachine, Response, Symbol};
