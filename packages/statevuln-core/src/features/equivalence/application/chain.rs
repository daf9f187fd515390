//! Oracle chain: strategies in order, first counterexample wins

use crate::config::{AnalysisConfig, EquivalenceConfig};
use crate::features::classifiers::Analyzer;
use crate::features::equivalence::domain::Counterexample;
use crate::features::equivalence::infrastructure::{
    AnalyzerGuidedOracle, CountingRandomWordsOracle, HappyFlowOracle, StateBoundRandomWordsOracle,
};
use crate::features::equivalence::ports::EquivalenceOracle;
use crate::features::rules::{HappyFlowCatalog, RuleBook};
use crate::features::sul::{OutputQuery, SulResult};
use crate::shared::models::{MealyMachine, ProtocolRole};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Default)]
pub struct OracleChain {
    oracles: Vec<Box<dyn EquivalenceOracle>>,
    rounds: usize,
}

impl OracleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard chain for a role
    ///
    /// Order: happy flows, analyzer-guided, state-bound, counting random
    /// words. Disabled or zero-budget strategies are left out.
    pub fn from_config(
        role: ProtocolRole,
        rules: Arc<RuleBook>,
        happy_flows: Arc<HappyFlowCatalog>,
        equivalence: &EquivalenceConfig,
        analysis: &AnalysisConfig,
    ) -> Self {
        let mut chain = Self::new();
        if equivalence.happy_flows {
            chain = chain.with(HappyFlowOracle::new(Arc::clone(&happy_flows)));
        }
        if equivalence.analyzer_guided {
            chain = chain.with(AnalyzerGuidedOracle::new(
                Analyzer::for_role(role),
                Arc::clone(&rules),
                Arc::clone(&happy_flows),
                analysis.clone(),
                equivalence,
            ));
        }
        if equivalence.queries_per_state > 0 {
            chain = chain.with(StateBoundRandomWordsOracle::new(rules, equivalence));
        }
        if equivalence.random_queries > 0 {
            chain = chain.with(CountingRandomWordsOracle::new(equivalence));
        }
        chain
    }

    pub fn with<O: EquivalenceOracle + 'static>(mut self, oracle: O) -> Self {
        self.oracles.push(Box::new(oracle));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.oracles.iter().map(|o| o.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    /// Rounds run so far
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

impl EquivalenceOracle for OracleChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>> {
        self.rounds += 1;
        let round = self.rounds;
        for oracle in &mut self.oracles {
            let started = Instant::now();
            let found = oracle.find_counterexample(hypothesis, sul)?;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if let Some(ce) = found {
                info!(
                    round,
                    oracle = oracle.name(),
                    length = ce.len(),
                    elapsed_ms,
                    "Counterexample found"
                );
                return Ok(Some(ce));
            }
            debug!(round, oracle = oracle.name(), elapsed_ms, "Oracle exhausted");
        }
        info!(round, states = hypothesis.state_count(), "No counterexample, hypothesis accepted");
        Ok(None)
    }
}
