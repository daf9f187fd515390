//! Happy-flow replay against the hypothesis

use crate::features::classifiers::domain::StateMachineIssue;
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::shared::ports::MealyView;

pub struct HappyFlowClassifier;

impl Classifier for HappyFlowClassifier {
    fn name(&self) -> &'static str {
        "happy_flow"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let automaton = &*input.automaton;
        let error_states = input.details.read().error_states.clone();
        let mut findings = FindingCollector::new(partial);

        for flow in input.happy_flows.flows() {
            let mut state = automaton.initial_state();
            for (index, symbol) in flow.iter().enumerate() {
                let Some((next, output)) = automaton.transition(state, symbol) else {
                    break;
                };
                if output.is_illegal() || error_states.contains(&next) {
                    findings.push(StateMachineIssue::no_happy_flow(
                        flow.clone(),
                        format!("rejected at step {} ({}) with {}", index, symbol, output),
                    ));
                    break;
                }
                state = next;
            }
        }
        Ok(findings.into_findings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::domain::IssueKind;
    use crate::features::classifiers::infrastructure::fixtures::{self, ERROR};
    use crate::shared::models::{Response, Symbol};

    #[test]
    fn test_happy_path_accepted() {
        let input = fixtures::input_for(fixtures::rsa_server());
        let findings = HappyFlowClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_broken_finished() {
        let mut m = fixtures::rsa_server();
        m.set_transition(3, Symbol::Finished, Response::IllegalTransition, ERROR);
        let input = fixtures::input_for(m);
        let partial = fixtures::partial();
        let findings = HappyFlowClassifier
            .vulnerabilities_of_class(&input, &partial)
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, IssueKind::NoHappyFlow);
        assert_eq!(findings[0].witness, fixtures::happy_path());
        assert_eq!(partial.lock().len(), 1);
    }
}
