/*
 * Benign-State Walk
 *
 * Breadth-first exploration of every benign path from the initial state,
 * bounded by `max_benign_depth`. Nodes are keyed by
 * (state, active properties, last sent type) so a state is revisited only
 * under a context it was not seen with before.
 *
 * Per state it records names, allowed and rejected inputs, entry contexts
 * and effective predecessor types into `GraphDetails`, one node at a time.
 *
 * Findings:
 * - LeavingHappyFlow: a required successor leads into an error state
 * - UnexpectedResponse: a benign step answered outside every response rule
 */

use crate::features::classifiers::domain::{IssueKind, StateMachineIssue};
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::features::context::{ContextProperty, ContextPropertyContainer};
use crate::shared::models::{Symbol, SymbolType};
use crate::shared::ports::{MealyView, StateId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::debug;

pub const INITIAL_STATE_NAME: &str = "INITIAL";

pub struct BenignStateClassifier;

impl Classifier for BenignStateClassifier {
    fn name(&self) -> &'static str {
        "benign_state"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let analyzer = input.analyzer();
        let automaton = &*input.automaton;
        let max_depth = input.config.max_benign_depth;
        let max_entries = input.config.max_entries_per_state;

        let mut findings = FindingCollector::new(partial);
        let mut reported: FxHashSet<(IssueKind, StateId, Symbol)> = FxHashSet::default();
        let mut visited: FxHashSet<(StateId, Vec<ContextProperty>, SymbolType)> =
            FxHashSet::default();

        let initial = automaton.initial_state();
        let root = ContextPropertyContainer::new(Some(initial));
        {
            let mut details = input.details.write();
            details
                .info_mut(initial)
                .names
                .insert(INITIAL_STATE_NAME.to_string());
            details.record_entry(initial, &[], &root, SymbolType::ResetConnection, max_entries);
        }

        let mut queue: VecDeque<(Vec<Symbol>, ContextPropertyContainer)> = VecDeque::new();
        queue.push_back((Vec::new(), root));

        while let Some((path, context)) = queue.pop_front() {
            let Some(state) = context.cursor() else {
                continue;
            };
            // One node per write lock: a copy taken between nodes is consistent
            let mut details = input.details.write();

            for symbol in automaton.inputs() {
                let Some((next, output)) = automaton.transition(state, symbol) else {
                    continue;
                };
                let rejected = details.is_error_state(next) || output.is_illegal();

                if !analyzer.is_benign_step(symbol, &context) {
                    if rejected {
                        details.info_mut(state).rejected_inputs.insert(*symbol);
                    }
                    continue;
                }

                let mut witness = path.clone();
                witness.push(*symbol);
                details.info_mut(state).allowed_inputs.insert(*symbol);

                if rejected {
                    details.info_mut(state).rejected_inputs.insert(*symbol);
                    if analyzer.is_required_step(symbol, &context)
                        && reported.insert((IssueKind::LeavingHappyFlow, state, *symbol))
                    {
                        findings.push(StateMachineIssue::leaving_happy_flow(
                            witness,
                            format!("required {} rejected with {}", symbol, output),
                        ));
                    }
                    continue;
                }

                if !analyzer.is_expected_response(symbol, output, &context)
                    && reported.insert((IssueKind::UnexpectedResponse, state, *symbol))
                {
                    findings.push(StateMachineIssue::unexpected_response(
                        witness.clone(),
                        format!("{} answered with {}", symbol, output),
                    ));
                }

                if witness.len() > max_depth {
                    continue;
                }

                let mut next_context = context.clone();
                next_context.step_through(automaton, symbol);
                let predecessor = analyzer.effective_last_sent(&next_context, SymbolType::Any);
                if !visited.insert((next, next_context.properties(), predecessor)) {
                    continue;
                }
                details.record_entry(next, &witness, &next_context, predecessor, max_entries);
                if next != initial {
                    details
                        .info_mut(next)
                        .names
                        .insert(format!("AFTER_{}", symbol));
                }
                queue.push_back((witness, next_context));
            }
        }

        debug!(
            states = input.details.read().benign_states().count(),
            findings = findings.len(),
            "Benign walk finished"
        );
        Ok(findings.into_findings())
    }
}
