//! Black-box learner port
//!
//! The active-learning algorithm itself lives outside this crate. It only has
//! to produce hypotheses from membership queries and accept counterexamples.

use crate::features::equivalence::Counterexample;
use crate::features::sul::{OutputQuery, SulResult};
use crate::shared::models::MealyMachine;

pub trait HypothesisLearner {
    /// Build the first hypothesis
    fn learn(&mut self, sul: &mut dyn OutputQuery) -> SulResult<MealyMachine>;

    /// Incorporate a counterexample and return the refined hypothesis
    fn refine(
        &mut self,
        counterexample: &Counterexample,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<MealyMachine>;
}

impl<L: HypothesisLearner + ?Sized> HypothesisLearner for Box<L> {
    fn learn(&mut self, sul: &mut dyn OutputQuery) -> SulResult<MealyMachine> {
        (**self).learn(sul)
    }

    fn refine(
        &mut self,
        counterexample: &Counterexample,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<MealyMachine> {
        (**self).refine(counterexample, sul)
    }
}
