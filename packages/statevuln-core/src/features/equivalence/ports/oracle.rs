/*
 * Equivalence Oracle Port
 *
 * Given a hypothesis, search the live system for an input word on which the
 * two disagree. `Ok(None)` means the strategy found nothing this round, not
 * that the hypothesis is correct.
 *
 * Session-limit and cache-conflict errors from the live system propagate
 * unchanged.
 */

use crate::features::equivalence::domain::Counterexample;
use crate::features::sul::{OutputQuery, SulResult};
use crate::shared::models::{MealyMachine, Symbol};
use tracing::trace;

pub trait EquivalenceOracle {
    fn name(&self) -> &'static str;

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>>;
}

impl<O: EquivalenceOracle + ?Sized> EquivalenceOracle for Box<O> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn find_counterexample(
        &mut self,
        hypothesis: &MealyMachine,
        sul: &mut dyn OutputQuery,
    ) -> SulResult<Option<Counterexample>> {
        (**self).find_counterexample(hypothesis, sul)
    }
}

/// Query `inputs` live and compare against the hypothesis
pub fn probe(
    hypothesis: &MealyMachine,
    sul: &mut dyn OutputQuery,
    inputs: &[Symbol],
) -> SulResult<Option<Counterexample>> {
    if inputs.is_empty() {
        return Ok(None);
    }
    let live = sul.output_query(inputs)?;
    let found = Counterexample::compare(hypothesis, inputs, live);
    if let Some(ce) = &found {
        trace!(counterexample = %ce, "Live outputs diverge");
    }
    Ok(found)
}
