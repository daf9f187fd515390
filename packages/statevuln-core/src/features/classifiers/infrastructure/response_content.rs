/*
 * Response-Content Classifiers
 *
 * Scan the output of every reachable transition:
 *   InternalError   internal_error alert
 *   KeyblockLeak    record protected with leaked key material (server role)
 *   UnknownMessage  message the protocol engine could not classify
 *
 * Witnesses are the shortest access path of the source state plus the input.
 */

use crate::features::classifiers::domain::StateMachineIssue;
use crate::features::classifiers::error::AnalysisResult;
use crate::features::classifiers::ports::{
    AnalysisInput, Classifier, FindingCollector, PartialFindings,
};
use crate::shared::models::{
    AlertDescription, MessageKind, RecordProtection, Response, Symbol,
};
use crate::shared::ports::MealyView;

/// Calls `emit(witness, response)` for every reachable transition
fn scan_transitions(input: &AnalysisInput, mut emit: impl FnMut(Vec<Symbol>, &Response)) {
    let automaton = &*input.automaton;
    let mut paths: Vec<_> = input.analyzer().access_paths().into_iter().collect();
    paths.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then(a.0.cmp(&b.0)));

    for (state, path) in paths {
        for symbol in automaton.inputs() {
            let Some((_, output)) = automaton.transition(state, symbol) else {
                continue;
            };
            let mut witness = path.clone();
            witness.push(*symbol);
            emit(witness, output);
        }
    }
}

pub struct InternalErrorClassifier;

impl Classifier for InternalErrorClassifier {
    fn name(&self) -> &'static str {
        "internal_error"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let mut findings = FindingCollector::new(partial);
        scan_transitions(input, |witness, output| {
            if output
                .fingerprint()
                .is_some_and(|fp| fp.contains_alert(AlertDescription::INTERNAL_ERROR))
            {
                findings.push(StateMachineIssue::internal_error(
                    witness,
                    format!("internal_error alert in {}", output),
                ));
            }
        });
        Ok(findings.into_findings())
    }
}

pub struct KeyblockLeakClassifier;

impl Classifier for KeyblockLeakClassifier {
    fn name(&self) -> &'static str {
        "keyblock_leak"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let mut findings = FindingCollector::new(partial);
        scan_transitions(input, |witness, output| {
            let leaked = output.fingerprint().is_some_and(|fp| {
                fp.messages
                    .iter()
                    .any(|m| m.protection == RecordProtection::LeakedKeys)
            });
            if leaked {
                findings.push(StateMachineIssue::keyblock_leak(
                    witness,
                    "record decryptable with keys derivable by the peer",
                ));
            }
        });
        Ok(findings.into_findings())
    }
}

pub struct UnknownMessageClassifier;

impl Classifier for UnknownMessageClassifier {
    fn name(&self) -> &'static str {
        "unknown_message"
    }

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>> {
        let mut findings = FindingCollector::new(partial);
        scan_transitions(input, |witness, output| {
            if output.contains(MessageKind::Unknown) {
                findings.push(StateMachineIssue::unknown_message(
                    witness,
                    format!("unclassified message in {}", output),
                ));
            }
        });
        Ok(findings.into_findings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures::{self, ch};
    use crate::shared::models::{ObservedMessage, ResponseFingerprint, SocketState};

    fn response(message: ObservedMessage) -> Response {
        Response::observed(ResponseFingerprint::new(vec![message], 1, SocketState::Closed))
    }

    #[test]
    fn test_internal_error_alert() {
        let mut m = fixtures::rsa_server();
        m.set_transition(
            1,
            Symbol::Finished,
            response(ObservedMessage::alert(AlertDescription::INTERNAL_ERROR)),
            fixtures::ERROR,
        );
        let input = fixtures::input_for(m);
        let findings = InternalErrorClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].witness, vec![ch(), Symbol::Finished]);
    }

    #[test]
    fn test_leaked_key_record() {
        let mut m = fixtures::rsa_server();
        m.set_transition(
            2,
            Symbol::Finished,
            response(
                ObservedMessage::new(MessageKind::Finished)
                    .with_protection(RecordProtection::LeakedKeys),
            ),
            fixtures::ERROR,
        );
        let input = fixtures::input_for(m);
        let findings = KeyblockLeakClassifier
            .vulnerabilities_of_class(&input, &fixtures::partial())
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].witness,
            vec![ch(), Symbol::ClientKeyExchange, Symbol::Finished]
        );
    }

    #[test]
    fn test_compliant_server_is_clean() {
        let input = fixtures::input_for(fixtures::rsa_server());
        let partial = fixtures::partial();
        assert!(UnknownMessageClassifier
            .vulnerabilities_of_class(&input, &partial)
            .unwrap()
            .is_empty());
        assert!(InternalErrorClassifier
            .vulnerabilities_of_class(&input, &partial)
            .unwrap()
            .is_empty());
    }
}
