/*
 * Learning Loop
 *
 * learn -> (oracle chain -> refine)* -> analyze
 *
 * Error policy at this boundary:
 * - connection limit       -> Aborted { resumable: true }
 * - time limit, init fail  -> Aborted { resumable: false }
 * - cache conflict         -> propagated, the caller picks overwrite or abort
 * - anything else          -> propagated
 */

use super::learner::HypothesisLearner;
use super::outcome::LearningOutcome;
use crate::config::{AnalysisConfig, LearningConfig, ValidatedConfig};
use crate::errors::StateVulnResult;
use crate::features::classifiers::{AnalysisError, Analyzer};
use crate::features::equivalence::{EquivalenceOracle, OracleChain};
use crate::features::rules::{HappyFlowCatalog, RuleBook};
use crate::features::sul::{LimitedSul, OutputQuery, SulResult, SystemUnderLearning};
use crate::features::sul_cache::{CacheStore, SulCache};
use crate::shared::models::{Alphabet, MealyMachine};
use crate::shared::ports::MealyView;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Live SUL behind session limits, then the cache
///
/// Limits wrap the live side only, so cache hits never count as connections.
pub fn cached_sul<S: SystemUnderLearning>(
    live: S,
    config: &ValidatedConfig,
    registry: &Registry,
) -> StateVulnResult<SulCache<LimitedSul<S>>> {
    let learning = config.learning();
    let cache = config.cache();
    let limited = LimitedSul::new(live, learning.connection_limit, learning.time_limit());
    let store = CacheStore::new(cache.payload_limit, registry)?;
    Ok(SulCache::new(limited, store, &cache))
}

/// Every state defines every alphabet symbol
pub fn ensure_complete(hypothesis: &MealyMachine) -> Result<(), AnalysisError> {
    for state in hypothesis.states() {
        for input in hypothesis.alphabet().iter() {
            if hypothesis.transition(state, input).is_none() {
                return Err(AnalysisError::IncompleteAutomaton {
                    state,
                    input: input.to_string(),
                });
            }
        }
    }
    Ok(())
}

struct Progress {
    hypothesis: Option<MealyMachine>,
    rounds: usize,
}

pub struct LearningLoop<L> {
    learner: L,
    oracles: OracleChain,
    analyzer: Analyzer,
    rules: Arc<RuleBook>,
    happy_flows: Arc<HappyFlowCatalog>,
    learning: LearningConfig,
    analysis: AnalysisConfig,
}

impl<L: HypothesisLearner> LearningLoop<L> {
    pub fn new(
        learner: L,
        oracles: OracleChain,
        analyzer: Analyzer,
        rules: Arc<RuleBook>,
        happy_flows: Arc<HappyFlowCatalog>,
        learning: LearningConfig,
        analysis: AnalysisConfig,
    ) -> Self {
        Self {
            learner,
            oracles,
            analyzer,
            rules,
            happy_flows,
            learning,
            analysis,
        }
    }

    /// Standard wiring for the configured role and `alphabet`
    pub fn from_config(learner: L, config: &ValidatedConfig, alphabet: &Alphabet) -> Self {
        let learning = config.learning();
        let analysis = config.analysis();
        let rules = Arc::new(RuleBook::for_role(learning.role));
        let happy_flows = Arc::new(HappyFlowCatalog::for_alphabet(learning.role, alphabet));
        let oracles = OracleChain::from_config(
            learning.role,
            Arc::clone(&rules),
            Arc::clone(&happy_flows),
            &config.equivalence(),
            &analysis,
        );
        Self::new(
            learner,
            oracles,
            Analyzer::for_role(learning.role),
            rules,
            happy_flows,
            learning,
            analysis,
        )
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    pub fn oracles(&self) -> &OracleChain {
        &self.oracles
    }

    pub fn run(&mut self, sul: &mut dyn OutputQuery) -> StateVulnResult<LearningOutcome> {
        let started = Instant::now();
        let mut progress = Progress {
            hypothesis: None,
            rounds: 0,
        };

        let (hypothesis, converged) = match self.refine_until_stable(sul, &mut progress) {
            Ok(result) => result,
            Err(e) if e.is_limit() => {
                warn!(
                    error = %e,
                    resumable = e.is_resumable(),
                    rounds = progress.rounds,
                    "Learning aborted"
                );
                return Ok(LearningOutcome::Aborted {
                    resumable: e.is_resumable(),
                    reason: e.to_string(),
                    last_hypothesis: progress.hypothesis,
                    rounds: progress.rounds,
                });
            }
            Err(e) => return Err(e.into()),
        };

        ensure_complete(&hypothesis)?;
        let report = self.analyzer.analyze(
            Arc::new(hypothesis.clone()),
            Arc::clone(&self.rules),
            Arc::clone(&self.happy_flows),
            &self.analysis,
        );
        info!(
            states = hypothesis.state_count(),
            rounds = progress.rounds,
            converged,
            findings = report.findings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Learning finished"
        );
        Ok(LearningOutcome::Completed {
            hypothesis,
            rounds: progress.rounds,
            converged,
            report,
        })
    }

    fn refine_until_stable(
        &mut self,
        sul: &mut dyn OutputQuery,
        progress: &mut Progress,
    ) -> SulResult<(MealyMachine, bool)> {
        let mut current = self.learner.learn(sul)?;
        progress.hypothesis = Some(current.clone());

        for round in 1..=self.learning.max_rounds {
            progress.rounds = round;
            let Some(ce) = self.oracles.find_counterexample(&current, sul)? else {
                return Ok((current, true));
            };
            info!(
                round,
                states = current.state_count(),
                counterexample = %ce,
                "Refining hypothesis"
            );
            current = self.learner.refine(&ce, sul)?;
            progress.hypothesis = Some(current.clone());
        }

        warn!(
            max_rounds = self.learning.max_rounds,
            "Round limit reached, analyzing last hypothesis"
        );
        Ok((current, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StateVulnError;
    use crate::features::classifiers::infrastructure::fixtures::{self, ERROR};
    use crate::features::equivalence::infrastructure::fixtures::MachineSul;
    use crate::features::equivalence::{Counterexample, HappyFlowOracle};
    use crate::features::sul::SulError;
    use crate::features::sul_cache::CacheError;
    use crate::shared::models::{ProtocolRole, Response, Symbol};
    use std::collections::VecDeque;

    /// Hands out prepared hypotheses in order
    struct ScriptedLearner {
        hypotheses: VecDeque<MealyMachine>,
        refinements: Vec<Vec<Symbol>>,
    }

    impl ScriptedLearner {
        fn new(hypotheses: Vec<MealyMachine>) -> Self {
            Self {
                hypotheses: hypotheses.into(),
                refinements: Vec::new(),
            }
        }

        fn next(&mut self) -> SulResult<MealyMachine> {
            self.hypotheses
                .pop_front()
                .ok_or_else(|| SulError::io("script exhausted"))
        }
    }

    impl HypothesisLearner for ScriptedLearner {
        fn learn(&mut self, _sul: &mut dyn OutputQuery) -> SulResult<MealyMachine> {
            self.next()
        }

        fn refine(
            &mut self,
            counterexample: &Counterexample,
            _sul: &mut dyn OutputQuery,
        ) -> SulResult<MealyMachine> {
            self.refinements.push(counterexample.inputs.clone());
            self.next()
        }
    }

    struct Conflicting;

    impl EquivalenceOracle for Conflicting {
        fn name(&self) -> &'static str {
            "conflicting"
        }

        fn find_counterexample(
            &mut self,
            _hypothesis: &MealyMachine,
            _sul: &mut dyn OutputQuery,
        ) -> SulResult<Option<Counterexample>> {
            Err(SulError::Cache(CacheError::Conflict {
                inputs: vec![Symbol::Finished],
                cached: vec![Response::silent()],
                observed: vec![Response::IllegalTransition],
            }))
        }
    }

    fn wrong_hypothesis() -> MealyMachine {
        let mut m = fixtures::rsa_server();
        m.set_transition(3, Symbol::Finished, Response::IllegalTransition, ERROR);
        m
    }

    fn learning_loop(learner: ScriptedLearner, oracles: OracleChain) -> LearningLoop<ScriptedLearner> {
        LearningLoop::new(
            learner,
            oracles,
            Analyzer::for_role(ProtocolRole::Server),
            Arc::new(RuleBook::for_role(ProtocolRole::Server)),
            Arc::new(HappyFlowCatalog::for_alphabet(
                ProtocolRole::Server,
                &fixtures::alphabet(),
            )),
            LearningConfig::default().max_rounds(5),
            AnalysisConfig::default(),
        )
    }

    fn happy_flow_chain() -> OracleChain {
        let catalog = HappyFlowCatalog::from_flows(vec![fixtures::happy_path()]);
        OracleChain::new().with(HappyFlowOracle::new(Arc::new(catalog)))
    }

    #[test]
    fn test_refines_until_no_counterexample() {
        let learner = ScriptedLearner::new(vec![wrong_hypothesis(), fixtures::rsa_server()]);
        let mut lp = learning_loop(learner, happy_flow_chain());
        let mut sul = MachineSul::new(fixtures::rsa_server());

        let outcome = lp.run(&mut sul).unwrap();
        let LearningOutcome::Completed {
            hypothesis,
            rounds,
            converged,
            report,
        } = outcome
        else {
            panic!("expected completion");
        };
        assert_eq!(hypothesis, fixtures::rsa_server());
        assert_eq!(rounds, 2);
        assert!(converged);
        assert!(report.findings.is_empty());
        assert_eq!(lp.learner().refinements.len(), 1);
    }

    #[test]
    fn test_round_limit_still_analyzes() {
        let learner = ScriptedLearner::new(vec![wrong_hypothesis(); 6]);
        let mut lp = learning_loop(learner, happy_flow_chain());
        let mut sul = MachineSul::new(fixtures::rsa_server());

        let outcome = lp.run(&mut sul).unwrap();
        assert!(outcome.is_completed());
        assert_eq!(outcome.rounds(), 5);
        assert!(!outcome.report().unwrap().findings.is_empty());
    }

    #[test]
    fn test_connection_limit_aborts_resumably() {
        let learner = ScriptedLearner::new(vec![wrong_hypothesis()]);
        let mut lp = learning_loop(learner, happy_flow_chain());
        let mut sul = LimitedSul::new(MachineSul::new(fixtures::rsa_server()), Some(0), None);

        let outcome = lp.run(&mut sul).unwrap();
        match outcome {
            LearningOutcome::Aborted {
                resumable,
                last_hypothesis,
                rounds,
                ..
            } => {
                assert!(resumable);
                assert_eq!(last_hypothesis, Some(wrong_hypothesis()));
                assert_eq!(rounds, 1);
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[test]
    fn test_conflict_propagates() {
        let learner = ScriptedLearner::new(vec![fixtures::rsa_server()]);
        let mut lp = learning_loop(learner, OracleChain::new().with(Conflicting));
        let mut sul = MachineSul::new(fixtures::rsa_server());

        let err = lp.run(&mut sul).unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(err, StateVulnError::Cache(_)));
    }

    #[test]
    fn test_incomplete_hypothesis_rejected() {
        let mut partial = MealyMachine::new(fixtures::alphabet(), 1, 0);
        partial.set_transition(0, Symbol::Heartbeat, Response::silent(), 0);
        let learner = ScriptedLearner::new(vec![partial]);
        let mut lp = learning_loop(learner, OracleChain::new());
        let mut sul = MachineSul::new(fixtures::rsa_server());

        let err = lp.run(&mut sul).unwrap_err();
        assert!(matches!(
            err,
            StateVulnError::Analysis(AnalysisError::IncompleteAutomaton { state: 0, .. })
        ));
    }
}
