//! Odd transitions around error states
//!
//! - a reset from an error state must land where a reset from the initial
//!   state lands
//! - an error state should only be entered with an alert or a closed socket

use crate::features::classifiers::domain::StateMachineIssue;
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::shared::models::MessageKind;
use crate::shared::ports::{MealyView, StateId};

pub struct OddErrorStateTransitionClassifier;

impl Classifier for OddErrorStateTransitionClassifier {
    fn name(&self) -> &'static str {
        "odd_error_state_transition"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let automaton = &*input.automaton;
        let error_states = input.details.read().error_states.clone();
        let paths = input.analyzer().access_paths();
        let mut reachable: Vec<StateId> = paths.keys().copied().collect();
        reachable.sort_unstable();
        let mut findings = FindingCollector::new(partial);

        let initial = automaton.initial_state();
        let reset = automaton.inputs().iter().find(|s| s.is_reset()).copied();
        if let Some(reset) = reset {
            let expected = automaton.transition(initial, &reset).map(|(t, _)| t);
            for error in reachable.iter().filter(|s| error_states.contains(s)) {
                let Some((target, _)) = automaton.transition(*error, &reset) else {
                    continue;
                };
                if target != initial && Some(target) != expected {
                    let mut witness = paths[error].clone();
                    witness.push(reset);
                    findings.push(StateMachineIssue::odd_error_state_transition(
                        witness,
                        format!("reset from error state {} leads to {}", error, target),
                    ));
                }
            }
        }

        for state in reachable.iter().filter(|s| !error_states.contains(s)) {
            for symbol in automaton.inputs().iter().filter(|s| !s.is_reset()) {
                let Some((next, output)) = automaton.transition(*state, symbol) else {
                    continue;
                };
                if error_states.contains(&next)
                    && !output.is_dead()
                    && !output.contains(MessageKind::Alert)
                {
                    let mut witness = paths[state].clone();
                    witness.push(*symbol);
                    findings.push(StateMachineIssue::odd_error_state_transition(
                        witness,
                        format!("error state entered without alert ({})", output),
                    ));
                }
            }
        }
        Ok(findings.into_findings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::error_state::ErrorStateClassifier;
    use crate::features::classifiers::infrastructure::fixtures::{self, ch, ERROR};
    use crate::shared::models::{MealyMachine, Response, Symbol};

    fn run(machine: MealyMachine) -> Vec<StateMachineIssue> {
        let input = fixtures::input_for(machine);
        let partial = fixtures::partial();
        ErrorStateClassifier.vulnerabilities_of_class(&input, &partial).unwrap();
        OddErrorStateTransitionClassifier
            .vulnerabilities_of_class(&input, &partial)
            .unwrap()
    }

    #[test]
    fn test_compliant_server() {
        assert!(run(fixtures::rsa_server()).is_empty());
    }

    #[test]
    fn test_silent_entry_into_error_state() {
        let mut m = fixtures::rsa_server();
        m.set_transition(1, Symbol::Finished, Response::silent(), ERROR);
        let findings = run(m);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].witness, vec![ch(), Symbol::Finished]);
    }

    #[test]
    fn test_reset_out_of_error_state() {
        let mut m = fixtures::rsa_server();
        m.set_transition(ERROR, Symbol::ResetConnection, Response::silent(), 1);
        let findings = run(m);
        assert_eq!(findings.len(), 1);
        // Shortest path into the error state takes the first non-benign input
        assert_eq!(
            findings[0].witness,
            vec![Symbol::ClientKeyExchange, Symbol::ResetConnection]
        );
    }
}
