//! Classifier port
//!
//! A classifier is handed a read-only hypothesis plus its own copy of the
//! `GraphDetails` of the current pass. It pushes every finding into the
//! partial-result buffer as soon as it is known, so a pass abandoned on
//! timeout still contributes what it found.

use crate::config::AnalysisConfig;
use crate::features::classifiers::domain::{GraphDetails, StateMachineIssue};
use crate::features::classifiers::error::AnalysisResult;
use crate::features::rules::{HappyFlowCatalog, RuleBook};
use crate::features::transition_analysis::TransitionAnalyzer;
use crate::shared::models::MealyMachine;
use crate::shared::ports::MealyView;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Findings recorded so far by one running classifier
pub type PartialFindings = Arc<Mutex<Vec<StateMachineIssue>>>;

/// Everything a classifier may read
#[derive(Clone)]
pub struct AnalysisInput {
    pub automaton: Arc<MealyMachine>,
    pub rules: Arc<RuleBook>,
    pub details: Arc<RwLock<GraphDetails>>,
    pub happy_flows: Arc<HappyFlowCatalog>,
    pub config: AnalysisConfig,
}

impl AnalysisInput {
    pub fn new(
        automaton: Arc<MealyMachine>,
        rules: Arc<RuleBook>,
        happy_flows: Arc<HappyFlowCatalog>,
        config: AnalysisConfig,
    ) -> Self {
        let details = GraphDetails::new(automaton.initial_state());
        Self {
            automaton,
            rules,
            details: Arc::new(RwLock::new(details)),
            happy_flows,
            config,
        }
    }

    /// Same input over a private copy of the details
    ///
    /// Each worker writes into its own copy; only the coordinator touches the
    /// details of the pass.
    pub fn detached(&self) -> Self {
        let details = self.details.read().clone();
        Self {
            details: Arc::new(RwLock::new(details)),
            ..self.clone()
        }
    }

    pub fn analyzer(&self) -> TransitionAnalyzer<'_> {
        TransitionAnalyzer::new(&self.rules, &*self.automaton)
    }
}

pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn vulnerabilities_of_class(
        &self,
        input: &AnalysisInput,
        partial: &PartialFindings,
    ) -> AnalysisResult<Vec<StateMachineIssue>>;
}

/// Collects findings locally and mirrors them into the partial buffer
pub struct FindingCollector<'a> {
    partial: &'a PartialFindings,
    found: Vec<StateMachineIssue>,
}

impl<'a> FindingCollector<'a> {
    pub fn new(partial: &'a PartialFindings) -> Self {
        Self {
            partial,
            found: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: StateMachineIssue) {
        self.partial.lock().push(issue.clone());
        self.found.push(issue);
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn into_findings(self) -> Vec<StateMachineIssue> {
        self.found
    }
}
