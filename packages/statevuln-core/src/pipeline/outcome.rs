use crate::features::classifiers::AnalysisReport;
use crate::shared::models::MealyMachine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LearningOutcome {
    Completed {
        hypothesis: MealyMachine,
        rounds: usize,
        /// False when the round limit stopped refinement
        converged: bool,
        report: AnalysisReport,
    },

    /// A session limit stopped learning
    Aborted {
        /// Connection limit: a later run may continue
        resumable: bool,
        reason: String,
        last_hypothesis: Option<MealyMachine>,
        rounds: usize,
    },
}

impl LearningOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn hypothesis(&self) -> Option<&MealyMachine> {
        match self {
            Self::Completed { hypothesis, .. } => Some(hypothesis),
            Self::Aborted {
                last_hypothesis, ..
            } => last_hypothesis.as_ref(),
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Completed { report, .. } => Some(report),
            Self::Aborted { .. } => None,
        }
    }

    pub fn rounds(&self) -> usize {
        match self {
            Self::Completed { rounds, .. } | Self::Aborted { rounds, .. } => *rounds,
        }
    }
}
