/*
 * Transition Analysis
 *
 * Answers "may this symbol come next?" for a replayed path and computes the
 * effective predecessor used for chain matching.
 */

pub mod application;
pub mod domain;

pub use application::TransitionAnalyzer;
pub use domain::effective_last_sent;
