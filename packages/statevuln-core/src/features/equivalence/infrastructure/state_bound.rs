/*
 * State-Bound Random-Words Oracle
 *
 * Every reachable hypothesis state gets `queries_per_state` probes: its
 * shortest access path followed by a random suffix. Deep states receive the
 * same pressure as states near the initial one.
 */

use crate::config::EquivalenceConfig;
use crate::features::equivalence::domain::{Counterexample, WordSampler};
use crate::features::equivalence::ports::{probe, EquivalenceOracle};
use crate::features::rules::RuleBook;
use crate::features::sul::{OutputQuery, SulResult};
use crate::features::transition_analysis::TransitionAnalyzer;
use crate::shared::models::{MealyMachine, Symbol};
use crate::shared::ports::StateId;
use std::sync::Arc;
use tracing::{debug, info};

pub struct StateBoundRandomWordsOracle {
    rules: Arc<RuleBook>,
    sampler: WordSampler,
    queries_per_state: usize,
}

impl StateBoundRandomWordsOracle {
    pub fn new(rules: Arc<RuleBook>, config: &EquivalenceConfig) -> Self {
        Self {
            rules,
            sampler: WordSampler::new(config.seed, config.min_length, config.max_length),
            queries_per_state: config.queries_per_state,
        }
    }

    fn access_paths(&self, hypothesis: &MealyMachine) -> Vec<(StateId, Vec<Symbol>)> {
        let mut paths: Vec<_> = TransitionAnalyzer::new(&self.rules, hypothesis)
            .access_paths()
            .into_iter()
            .collect();
        paths.sort_by_key(|(state, _)| *state);
        paths
    }
}

impl EquivalenceOracle for StateBoundRandomWordsOracle {
    fn name(&self) -> &'static str {
        "state_bound_random_words"
    }

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>> {
        let alphabet = hypothesis.alphabet().symbols();
        let paths = self.access_paths(hypothesis);
        let mut issued = 0usize;
        for (state, path) in &paths {
            for _ in 0..self.queries_per_state {
                issued += 1;
                let word = self.sampler.extend(path, alphabet);
                if let Some(ce) = probe(hypothesis, sul, &word)? {
                    info!(
                        state = *state,
                        probes = issued,
                        counterexample = %ce,
                        "State-bound probe diverged"
                    );
                    return Ok(Some(ce));
                }
            }
        }
        debug!(states = paths.len(), probes = issued, "No state-bound counterexample");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures;
    use crate::features::equivalence::infrastructure::fixtures::MachineSul;
    use crate::shared::models::{MessageKind, ProtocolRole, Response};

    fn oracle(per_state: usize) -> StateBoundRandomWordsOracle {
        let config = EquivalenceConfig::default()
            .min_length(1)
            .max_length(1)
            .queries_per_state(per_state)
            .seed(11);
        StateBoundRandomWordsOracle::new(Arc::new(RuleBook::for_role(ProtocolRole::Server)), &config)
    }

    #[test]
    fn test_every_state_probed() {
        let hypothesis = fixtures::rsa_server();
        let mut sul = MachineSul::new(fixtures::rsa_server());
        assert!(oracle(3)
            .find_counterexample(&hypothesis, &mut sul)
            .unwrap()
            .is_none());
        assert_eq!(sul.sessions, 3 * hypothesis.state_count());
    }

    #[test]
    fn test_reaches_deep_difference() {
        // Only the established state differs
        let mut live = fixtures::rsa_server();
        live.set_transition(5, Symbol::Heartbeat, Response::of_kinds(&[MessageKind::Alert]), 5);
        let mut sul = MachineSul::new(live);
        let ce = oracle(50)
            .find_counterexample(&fixtures::rsa_server(), &mut sul)
            .unwrap()
            .unwrap();
        assert!(ce.inputs.starts_with(&fixtures::happy_path()));
        assert_eq!(ce.inputs.last(), Some(&Symbol::Heartbeat));
    }
}
