//! State confusion
//!
//! Two benign paths into the same state whose state-defining properties
//! disagree: the implementation merged two protocol situations.

use crate::features::classifiers::domain::{Divergence, StateMachineIssue};
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::features::context::ContextProperty;
use crate::shared::models::format_path;

pub struct StateConfusionClassifier;

fn state_defining(properties: &[ContextProperty]) -> Vec<ContextProperty> {
    properties
        .iter()
        .copied()
        .filter(ContextProperty::is_state_defining)
        .collect()
}

impl Classifier for StateConfusionClassifier {
    fn name(&self) -> &'static str {
        "state_confusion"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let details = input.details.read().clone();
        let mut findings = FindingCollector::new(partial);

        for (state, info) in &details.state_info {
            if details.is_error_state(*state) {
                continue;
            }
            let Some((first, rest)) = info.entries.split_first() else {
                continue;
            };
            let reference = state_defining(&first.properties);
            let Some(other) = rest
                .iter()
                .find(|entry| state_defining(&entry.properties) != reference)
            else {
                continue;
            };
            let reason = format!(
                "state {} entered as [{}] and as [{}]",
                state,
                format_path(&first.path),
                format_path(&other.path)
            );
            findings.push(StateMachineIssue::state_confusion(
                Divergence {
                    first_path: first.path.clone(),
                    second_path: other.path.clone(),
                    first_state: *state,
                    second_state: *state,
                },
                reason,
            ));
        }
        Ok(findings.into_findings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::domain::{GraphDetails, StateEntry};
    use crate::features::classifiers::infrastructure::fixtures;
    use crate::shared::models::Symbol;
    use ContextProperty::*;

    #[test]
    fn test_disagreeing_entries() {
        let input = fixtures::input_for(fixtures::rsa_server());
        {
            let mut details = input.details.write();
            *details = GraphDetails::new(0);
            let info = details.info_mut(3);
            info.entries.push(StateEntry {
                path: vec![Symbol::Finished],
                properties: vec![HandshakeUnfinished, Tls12Flow],
            });
            info.entries.push(StateEntry {
                path: vec![Symbol::Heartbeat, Symbol::Finished],
                properties: vec![HandshakeFinishedCorrectly, Tls12Flow, CanResumeTicket],
            });
        }
        let findings = StateConfusionClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert_eq!(findings.len(), 1);
        let divergence = findings[0].divergence.as_ref().unwrap();
        assert_eq!(divergence.first_state, 3);
        assert_eq!(divergence.second_path, vec![Symbol::Heartbeat, Symbol::Finished]);
    }

    #[test]
    fn test_cross_connection_properties_ignored() {
        let input = fixtures::input_for(fixtures::rsa_server());
        {
            let mut details = input.details.write();
            let info = details.info_mut(0);
            info.entries.push(StateEntry {
                path: vec![],
                properties: vec![HandshakeUnfinished],
            });
            info.entries.push(StateEntry {
                path: vec![Symbol::ResetConnection],
                properties: vec![HandshakeUnfinished, CanResumeSessionId],
            });
        }
        let findings = StateConfusionClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert!(findings.is_empty());
    }
}
