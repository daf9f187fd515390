//! Error-state detection
//!
//! A state is an error state when every non-reset input loops back to it with
//! a dead response. Runs first: later classifiers treat error states as sinks.

use crate::features::classifiers::domain::StateMachineIssue;
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{AnalysisInput, Classifier, PartialFindings};
use crate::shared::ports::{MealyView, StateId};
use std::collections::BTreeSet;
use tracing::debug;

pub const ERROR_STATE_NAME: &str = "ERROR";

pub struct ErrorStateClassifier;

impl ErrorStateClassifier {
    pub fn error_states<A: MealyView + ?Sized>(automaton: &A) -> BTreeSet<StateId> {
        automaton
            .states()
            .into_iter()
            .filter(|state| Self::is_error_state(automaton, *state))
            .collect()
    }

    fn is_error_state<A: MealyView + ?Sized>(automaton: &A, state: StateId) -> bool {
        let mut checked = 0;
        for input in automaton.inputs().iter().filter(|i| !i.is_reset()) {
            match automaton.transition(state, input) {
                Some((next, output)) if next == state && output.is_dead() => checked += 1,
                _ => return false,
            }
        }
        checked > 0
    }
}

impl Classifier for ErrorStateClassifier {
    fn name(&self) -> &'static str {
        "error_state"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        _partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let error_states = Self::error_states(&*input.automaton);
        debug!(count = error_states.len(), "Error states identified");

        let mut details = input.details.write();
        for state in &error_states {
            details
                .info_mut(*state)
                .names
                .insert(ERROR_STATE_NAME.to_string());
        }
        details.error_states = error_states;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures::{self, ERROR};

    #[test]
    fn test_single_error_state() {
        let input = fixtures::input_for(fixtures::rsa_server());
        let findings = ErrorStateClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert!(findings.is_empty());
        let details = input.details.read();
        assert_eq!(details.error_states.iter().copied().collect::<Vec<_>>(), vec![ERROR]);
        assert!(details.info(ERROR).unwrap().names.contains(ERROR_STATE_NAME));
    }
}
