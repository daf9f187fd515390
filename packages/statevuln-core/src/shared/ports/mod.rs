//! Ports shared across features

pub mod automaton;

pub use automaton::{MealyView, StateId};
