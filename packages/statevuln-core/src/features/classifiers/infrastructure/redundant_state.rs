/*
 * Redundant States
 *
 * Moore-style partition refinement over the reachable states:
 *
 *   round 0: group by per-input output signature (payloads stripped)
 *   round n: group by (class, successor class per input)
 *   stop when the number of classes no longer grows
 *
 * Two states left in one class behave identically on every input sequence;
 * the pair is reported with both access paths for confirmation.
 */

use crate::features::classifiers::domain::{Divergence, StateMachineIssue};
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::shared::models::Response;
use crate::shared::ports::{MealyView, StateId};
use rustc_hash::FxHashMap;
use std::hash::Hash;

pub struct RedundantStateClassifier;

fn semantic_key(output: &Response) -> Response {
    match output {
        Response::Observed(fp) => Response::observed(fp.reduced(0)),
        Response::IllegalTransition => Response::IllegalTransition,
    }
}

/// Dense class ids in order of first appearance
fn assign_classes<K: Hash + Eq>(keyed: Vec<(StateId, K)>) -> FxHashMap<StateId, usize> {
    let mut ids: FxHashMap<K, usize> = FxHashMap::default();
    let mut classes = FxHashMap::default();
    for (state, key) in keyed {
        let next = ids.len();
        let id = *ids.entry(key).or_insert(next);
        classes.insert(state, id);
    }
    classes
}

fn class_count(classes: &FxHashMap<StateId, usize>) -> usize {
    classes.values().max().map_or(0, |max| max + 1)
}

impl RedundantStateClassifier {
    pub fn equivalence_classes<A: MealyView + ?Sized>(
        automaton: &A,
        states: &[StateId],
    ) -> FxHashMap<StateId, usize> {
        let inputs = automaton.inputs();
        let mut classes = assign_classes(
            states
                .iter()
                .map(|s| {
                    let signature: Vec<Option<Response>> = inputs
                        .iter()
                        .map(|i| automaton.transition(*s, i).map(|(_, o)| semantic_key(o)))
                        .collect();
                    (*s, signature)
                })
                .collect(),
        );

        loop {
            let refined = assign_classes(
                states
                    .iter()
                    .map(|s| {
                        let successors: Vec<Option<usize>> = inputs
                            .iter()
                            .map(|i| {
                                automaton
                                    .transition(*s, i)
                                    .and_then(|(next, _)| classes.get(&next).copied())
                            })
                            .collect();
                        (*s, (classes[s], successors))
                    })
                    .collect(),
            );
            if class_count(&refined) == class_count(&classes) {
                return refined;
            }
            classes = refined;
        }
    }
}

impl Classifier for RedundantStateClassifier {
    fn name(&self) -> &'static str {
        "redundant_state"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let automaton = &*input.automaton;
        let paths = input.analyzer().access_paths();
        let mut states: Vec<StateId> = paths.keys().copied().collect();
        states.sort_unstable();

        let classes = Self::equivalence_classes(automaton, &states);
        let mut groups: FxHashMap<usize, Vec<StateId>> = FxHashMap::default();
        for state in &states {
            groups.entry(classes[state]).or_default().push(*state);
        }

        let mut groups: Vec<Vec<StateId>> = groups.into_values().filter(|g| g.len() > 1).collect();
        groups.sort();

        let mut findings = FindingCollector::new(partial);
        for group in groups {
            let first = group[0];
            for other in &group[1..] {
                findings.push(StateMachineIssue::redundant_state(
                    Divergence {
                        first_path: paths[&first].clone(),
                        second_path: paths[other].clone(),
                        first_state: first,
                        second_state: *other,
                    },
                    format!("states {} and {} are equivalent", first, other),
                ));
            }
        }
        Ok(findings.into_findings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures;
    use crate::shared::models::{MessageKind, Symbol};

    #[test]
    fn test_minimal_machine() {
        let input = fixtures::input_for(fixtures::rsa_server());
        assert!(RedundantStateClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_duplicated_established_state() {
        let mut m = fixtures::rsa_server();
        let twin = m.add_state();
        let heartbeat = Response::of_kinds(&[MessageKind::Heartbeat]);
        for symbol in fixtures::alphabet().iter() {
            m.set_transition(twin, *symbol, Response::IllegalTransition, fixtures::ERROR);
        }
        m.set_transition(twin, Symbol::ResetConnection, Response::silent(), 0);
        m.set_transition(twin, Symbol::Heartbeat, heartbeat.clone(), 5);
        m.set_transition(5, Symbol::Heartbeat, heartbeat, twin);

        let input = fixtures::input_for(m);
        let findings = RedundantStateClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert_eq!(findings.len(), 1);
        let divergence = findings[0].divergence.as_ref().unwrap();
        assert_eq!((divergence.first_state, divergence.second_state), (5, twin));
        let mut expected = fixtures::happy_path();
        expected.push(Symbol::Heartbeat);
        assert_eq!(divergence.second_path, expected);
    }
}
