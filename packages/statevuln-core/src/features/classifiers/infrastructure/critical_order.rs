//! Critical messages accepted out of order
//!
//! From every benign entry context, a critical message (key exchange,
//! certificate, CCS, finished ...) that no letter chain allows must be
//! rejected. Accepting it without moving to an error state can skip
//! authentication or key agreement.

use crate::features::classifiers::domain::StateMachineIssue;
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::shared::models::Symbol;
use crate::shared::ports::{MealyView, StateId};
use rustc_hash::FxHashSet;

pub struct CriticalMessageOutOfOrderClassifier;

impl Classifier for CriticalMessageOutOfOrderClassifier {
    fn name(&self) -> &'static str {
        "critical_message_out_of_order"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let analyzer = input.analyzer();
        let automaton = &*input.automaton;
        let details = input.details.read().clone();
        let mut findings = FindingCollector::new(partial);
        let mut reported: FxHashSet<(StateId, Symbol)> = FxHashSet::default();

        let critical: Vec<Symbol> = automaton
            .inputs()
            .iter()
            .filter(|s| s.symbol_type().is_critical())
            .copied()
            .collect();

        for (state, info) in &details.state_info {
            if details.is_error_state(*state) {
                continue;
            }
            for entry in &info.entries {
                let context = analyzer.context_after(&entry.path);
                for symbol in &critical {
                    if analyzer.is_benign_step(symbol, &context) {
                        continue;
                    }
                    let Some((next, output)) = automaton.transition(*state, symbol) else {
                        continue;
                    };
                    if output.is_illegal() || details.is_error_state(next) {
                        continue;
                    }
                    if !reported.insert((*state, *symbol)) {
                        continue;
                    }
                    let mut witness = entry.path.clone();
                    witness.push(*symbol);
                    findings.push(StateMachineIssue::critical_message_out_of_order(
                        witness,
                        format!("{} accepted with {} in state {}", symbol, output, state),
                    ));
                }
            }
        }
        Ok(findings.into_findings())
    }
}
