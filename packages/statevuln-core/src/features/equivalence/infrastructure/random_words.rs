//! Counting random-words oracle
//!
//! A bounded number of uniformly random words per round, evaluated in order.
//! The first divergence wins.

use crate::config::EquivalenceConfig;
use crate::features::equivalence::domain::{Counterexample, WordSampler};
use crate::features::equivalence::ports::{probe, EquivalenceOracle};
use crate::features::sul::{OutputQuery, SulResult};
use crate::shared::models::MealyMachine;
use tracing::{debug, info};

pub struct CountingRandomWordsOracle {
    sampler: WordSampler,
    queries: usize,
}

impl CountingRandomWordsOracle {
    pub fn new(config: &EquivalenceConfig) -> Self {
        Self {
            sampler: WordSampler::new(config.seed, config.min_length, config.max_length),
            queries: config.random_queries,
        }
    }
}

impl EquivalenceOracle for CountingRandomWordsOracle {
    fn name(&self) -> &'static str {
        "random_words"
    }

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>> {
        let alphabet = hypothesis.alphabet().symbols();
        for issued in 1..=self.queries {
            let word = self.sampler.word(alphabet);
            if let Some(ce) = probe(hypothesis, sul, &word)? {
                info!(probes = issued, counterexample = %ce, "Random word diverged");
                return Ok(Some(ce));
            }
        }
        debug!(probes = self.queries, "No random counterexample");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures::{self, ERROR};
    use crate::features::equivalence::infrastructure::fixtures::MachineSul;
    use crate::shared::models::{MessageKind, Response, Symbol};

    fn config() -> EquivalenceConfig {
        EquivalenceConfig::default()
            .min_length(1)
            .max_length(4)
            .random_queries(500)
            .seed(3)
    }

    #[test]
    fn test_identical_machines_use_every_probe() {
        let mut sul = MachineSul::new(fixtures::rsa_server());
        let mut oracle = CountingRandomWordsOracle::new(&config());
        assert!(oracle
            .find_counterexample(&fixtures::rsa_server(), &mut sul)
            .unwrap()
            .is_none());
        assert_eq!(sul.sessions, 500);
    }

    #[test]
    fn test_finds_shallow_difference() {
        // Live server answers a heartbeat in the error state
        let mut live = fixtures::rsa_server();
        live.set_transition(
            ERROR,
            Symbol::Heartbeat,
            Response::of_kinds(&[MessageKind::Heartbeat]),
            ERROR,
        );
        let mut sul = MachineSul::new(live.clone());
        let ce = CountingRandomWordsOracle::new(&config())
            .find_counterexample(&fixtures::rsa_server(), &mut sul)
            .unwrap()
            .unwrap();
        assert!(ce.inputs.contains(&Symbol::Heartbeat));
        assert_eq!(live.run(&ce.inputs).unwrap(), ce.live_outputs);
    }

    #[test]
    fn test_same_seed_same_counterexample() {
        let mut live = fixtures::rsa_server();
        live.set_transition(0, Symbol::Finished, Response::silent(), ERROR);
        let run = || {
            let mut sul = MachineSul::new(live.clone());
            CountingRandomWordsOracle::new(&config())
                .find_counterexample(&fixtures::rsa_server(), &mut sul)
                .unwrap()
        };
        assert_eq!(run(), run());
    }
}
