//! Feature modules
//!
//! Vertical slices, bottom-up: context replay and rules feed the transition
//! analyzer; the cache wraps the live SUL; classifiers and equivalence
//! oracles consume learned hypotheses.

pub mod classifiers;
pub mod context;
pub mod equivalence;
pub mod rules;
pub mod sul;
pub mod sul_cache;
pub mod transition_analysis;
