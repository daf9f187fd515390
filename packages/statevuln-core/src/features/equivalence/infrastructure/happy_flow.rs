//! Happy-flow oracle
//!
//! Replays every catalog flow twice in one session, so the second run
//! exercises renegotiation and reuse of the established connection.

use crate::features::equivalence::domain::Counterexample;
use crate::features::equivalence::ports::{probe, EquivalenceOracle};
use crate::features::rules::HappyFlowCatalog;
use crate::features::sul::{OutputQuery, SulResult};
use crate::shared::models::{MealyMachine, Symbol};
use std::sync::Arc;
use tracing::{debug, info};

pub struct HappyFlowOracle {
    catalog: Arc<HappyFlowCatalog>,
}

impl HappyFlowOracle {
    pub fn new(catalog: Arc<HappyFlowCatalog>) -> Self {
        Self { catalog }
    }

    fn doubled(flow: &[Symbol]) -> Vec<Symbol> {
        let mut word = Vec::with_capacity(flow.len() * 2);
        word.extend_from_slice(flow);
        word.extend_from_slice(flow);
        word
    }
}

impl EquivalenceOracle for HappyFlowOracle {
    fn name(&self) -> &'static str {
        "happy_flow"
    }

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>> {
        let alphabet = hypothesis.alphabet();
        let mut queried = 0usize;
        for flow in self.catalog.all() {
            if !alphabet.contains_all(flow) {
                continue;
            }
            queried += 1;
            if let Some(ce) = probe(hypothesis, sul, &Self::doubled(flow))? {
                info!(flows = queried, counterexample = %ce, "Happy flow diverged");
                return Ok(Some(ce));
            }
        }
        debug!(flows = queried, "Happy flows agree with hypothesis");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classifiers::infrastructure::fixtures::{self, ch};
    use crate::features::equivalence::infrastructure::fixtures::MachineSul;
    use crate::shared::models::{MessageKind, Response};

    fn oracle() -> HappyFlowOracle {
        HappyFlowOracle::new(Arc::new(HappyFlowCatalog::from_flows(vec![
            fixtures::happy_path(),
        ])))
    }

    #[test]
    fn test_agreeing_flows() {
        let hypothesis = fixtures::rsa_server();
        let mut sul = MachineSul::new(fixtures::rsa_server());
        assert!(oracle()
            .find_counterexample(&hypothesis, &mut sul)
            .unwrap()
            .is_none());
        assert_eq!(sul.sessions, 1);
    }

    #[test]
    fn test_second_run_diverges() {
        // Live server accepts renegotiation after the first handshake
        let mut live = fixtures::rsa_server();
        live.set_transition(
            5,
            ch(),
            Response::of_kinds(&[MessageKind::ServerHello, MessageKind::Certificate]),
            1,
        );
        let hypothesis = fixtures::rsa_server();
        let mut sul = MachineSul::new(live);

        let ce = oracle()
            .find_counterexample(&hypothesis, &mut sul)
            .unwrap()
            .unwrap();
        assert_eq!(ce.inputs.len(), 8);
        assert_eq!(ce.divergence_index(), 4);
    }

    #[test]
    fn test_flows_outside_alphabet_skipped() {
        let catalog = HappyFlowCatalog::from_flows(vec![vec![Symbol::EndOfEarlyData]]);
        let mut oracle = HappyFlowOracle::new(Arc::new(catalog));
        let mut sul = MachineSul::new(fixtures::rsa_server());
        assert!(oracle
            .find_counterexample(&fixtures::rsa_server(), &mut sul)
            .unwrap()
            .is_none());
        assert_eq!(sul.sessions, 0);
    }
}
