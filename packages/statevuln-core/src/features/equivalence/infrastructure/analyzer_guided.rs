/*
 * Analyzer-Guided Oracle
 *
 * Runs the classifier pipeline on the hypothesis and retests each finding
 * against the live system.
 *
 * Candidates:
 * - a finding whose witness is a strict prefix of another witness is dropped
 * - above `max_guided_candidates` the raw list is used (pairwise prefix
 *   comparison is quadratic)
 *
 * Confirmation:
 * - path findings: replay the witness
 * - divergence findings: append the same random suffixes to both prefixes
 */

use crate::config::{AnalysisConfig, EquivalenceConfig};
use crate::features::classifiers::{Analyzer, Divergence, StateMachineIssue};
use crate::features::equivalence::domain::{Counterexample, WordSampler};
use crate::features::equivalence::ports::{probe, EquivalenceOracle};
use crate::features::rules::{HappyFlowCatalog, RuleBook};
use crate::features::sul::{OutputQuery, SulResult};
use crate::shared::models::{MealyMachine, Symbol};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AnalyzerGuidedOracle {
    analyzer: Analyzer,
    rules: Arc<RuleBook>,
    happy_flows: Arc<HappyFlowCatalog>,
    analysis: AnalysisConfig,
    sampler: WordSampler,
    extensions: usize,
    max_candidates: usize,
}

impl AnalyzerGuidedOracle {
    pub fn new(
        analyzer: Analyzer,
        rules: Arc<RuleBook>,
        happy_flows: Arc<HappyFlowCatalog>,
        analysis: AnalysisConfig,
        config: &EquivalenceConfig,
    ) -> Self {
        Self {
            analyzer,
            rules,
            happy_flows,
            analysis,
            sampler: WordSampler::new(config.seed, config.min_length, config.max_length),
            extensions: config.guided_extensions,
            max_candidates: config.max_guided_candidates,
        }
    }

    fn confirm_divergence(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
        divergence: &Divergence,
        queried: &mut FxHashSet<Vec<Symbol>>,
    ) -> SulResult<Option<Counterexample>> {
        let alphabet = hypothesis.alphabet().symbols();
        for _ in 0..self.extensions {
            let suffix = self.sampler.word(alphabet);
            for prefix in [&divergence.first_path, &divergence.second_path] {
                let mut word = prefix.clone();
                word.extend_from_slice(&suffix);
                if !queried.insert(word.clone()) {
                    continue;
                }
                if let Some(ce) = probe(hypothesis, sul, &word)? {
                    return Ok(Some(ce));
                }
            }
        }
        Ok(None)
    }
}

fn is_strict_prefix(prefix: &[Symbol], of: &[Symbol]) -> bool {
    prefix.len() < of.len() && of.starts_with(prefix)
}

/// Drop findings whose witness another finding extends
pub(crate) fn deduplicate_candidates(
    findings: Vec<StateMachineIssue>,
    cap: usize,
) -> Vec<StateMachineIssue> {
    if findings.len() > cap {
        warn!(
            candidates = findings.len(),
            cap, "Too many candidates, prefix deduplication skipped"
        );
        return findings;
    }
    let keep: Vec<bool> = findings
        .iter()
        .map(|f| {
            !findings
                .iter()
                .any(|other| is_strict_prefix(&f.witness, &other.witness))
        })
        .collect();
    findings
        .into_iter()
        .zip(keep)
        .filter_map(|(finding, keep)| keep.then_some(finding))
        .collect()
}

impl EquivalenceOracle for AnalyzerGuidedOracle {
    fn name(&self) -> &'static str {
        "analyzer_guided"
    }

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>> {
        let report = self.analyzer.analyze(
            Arc::new(hypothesis.clone()),
            Arc::clone(&self.rules),
            Arc::clone(&self.happy_flows),
            &self.analysis,
        );
        let raw = report.findings.len();
        let candidates = deduplicate_candidates(report.findings, self.max_candidates);
        debug!(raw, candidates = candidates.len(), "Guided candidates");

        let mut queried: FxHashSet<Vec<Symbol>> = FxHashSet::default();
        for finding in &candidates {
            let found = match &finding.divergence {
                Some(divergence) => {
                    self.confirm_divergence(hypothesis, sul, divergence, &mut queried)?
                }
                None if queried.insert(finding.witness.clone()) => {
                    probe(hypothesis, sul, &finding.witness)?
                }
                None => None,
            };
            if let Some(ce) = found {
                info!(finding = %finding, counterexample = %ce, "Finding refuted the hypothesis");
                return Ok(Some(ce));
            }
        }
        debug!(queries = queried.len(), "Guided candidates agree with hypothesis");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures::{self, ch, ERROR};
    use crate::features::classifiers::{
        AnalysisInput, AnalysisResult, Classifier, PartialFindings,
    };
    use crate::features::equivalence::infrastructure::fixtures::MachineSul;
    use crate::shared::models::{MessageKind, ProtocolRole, Response};

    /// Reports one fixed divergence
    struct FixedDivergence(Divergence);

    impl Classifier for FixedDivergence {
        fn name(&self) -> &'static str {
            "fixed_divergence"
        }

        fn vulnerabilities_of_class(
            &self,
            _input: &AnalysisInput,
            _partial: &PartialFindings,
        ) -> AnalysisResult<Vec<StateMachineIssue>> {
            Ok(vec![StateMachineIssue::state_confusion(self.0.clone(), "fixed")])
        }
    }

    fn oracle(analyzer: Analyzer) -> AnalyzerGuidedOracle {
        let config = EquivalenceConfig::default()
            .min_length(1)
            .max_length(2)
            .guided_extensions(50)
            .seed(5);
        let hypothesis = fixtures::rsa_server();
        AnalyzerGuidedOracle::new(
            analyzer,
            Arc::new(RuleBook::for_role(ProtocolRole::Server)),
            Arc::new(HappyFlowCatalog::for_alphabet(
                ProtocolRole::Server,
                hypothesis.alphabet(),
            )),
            AnalysisConfig::default(),
            &config,
        )
    }

    #[test]
    fn test_prefix_deduplication() {
        let short = StateMachineIssue::internal_error(vec![ch()], "a");
        let long = StateMachineIssue::internal_error(vec![ch(), Symbol::Finished], "b");
        let other = StateMachineIssue::internal_error(vec![Symbol::Heartbeat], "c");

        let kept = deduplicate_candidates(vec![short.clone(), long.clone(), other.clone()], 10);
        assert_eq!(kept, vec![long.clone(), other.clone()]);

        // Over the cap the raw list comes back
        let raw = deduplicate_candidates(vec![short.clone(), long, other], 2);
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0], short);
    }

    #[test]
    fn test_witness_replay_refutes_hypothesis() {
        // Hypothesis wrongly rejects the final Finished
        let mut hypothesis = fixtures::rsa_server();
        hypothesis.set_transition(3, Symbol::Finished, Response::IllegalTransition, ERROR);
        let mut sul = MachineSul::new(fixtures::rsa_server());

        let ce = oracle(Analyzer::for_role(ProtocolRole::Server))
            .find_counterexample(&hypothesis, &mut sul)
            .unwrap()
            .unwrap();
        assert_eq!(ce.inputs[ce.divergence_index()], Symbol::Finished);
    }

    #[test]
    fn test_divergence_confirmed_by_extension() {
        let divergence = Divergence {
            first_path: vec![ch()],
            second_path: vec![ch(), Symbol::Heartbeat],
            first_state: 1,
            second_state: 1,
        };
        let analyzer = Analyzer::with_classifiers(vec![Arc::new(FixedDivergence(divergence))]);

        // Live state 1 alerts on heartbeats; the hypothesis echoes them
        let mut live = fixtures::rsa_server();
        live.set_transition(1, Symbol::Heartbeat, Response::of_kinds(&[MessageKind::Alert]), 1);
        let mut sul = MachineSul::new(live);

        let ce = oracle(analyzer)
            .find_counterexample(&fixtures::rsa_server(), &mut sul)
            .unwrap()
            .unwrap();
        assert_eq!(ce.inputs[0], ch());
        assert_eq!(ce.inputs[ce.divergence_index()], Symbol::Heartbeat);
    }

    #[test]
    fn test_compliant_hypothesis_has_no_counterexample() {
        let mut sul = MachineSul::new(fixtures::rsa_server());
        assert!(oracle(Analyzer::for_role(ProtocolRole::Server))
            .find_counterexample(&fixtures::rsa_server(), &mut sul)
            .unwrap()
            .is_none());
        assert_eq!(sul.sessions, 0);
    }
}
