/*
 * Automaton Port
 *
 * Read-only Mealy view shared by the learned hypothesis and the cache
 * automaton. Classifiers, context replay and reachability only see this.
 */

use crate::shared::models::{Response, Symbol};

/// Opaque state handle (dense index for hypotheses, arena index for the cache)
pub type StateId = usize;

/// Read-only Mealy automaton
pub trait MealyView {
    fn initial_state(&self) -> StateId;

    /// All states currently present
    fn states(&self) -> Vec<StateId>;

    /// Successor and stored output for `input`, if the transition is known
    fn transition(&self, state: StateId, input: &Symbol) -> Option<(StateId, &Response)>;

    /// Inputs that may label transitions
    fn inputs(&self) -> &[Symbol];

    /// Walk `path` from the initial state
    fn walk(&self, path: &[Symbol]) -> Option<StateId> {
        path.iter().try_fold(self.initial_state(), |state, input| {
            self.transition(state, input).map(|(next, _)| next)
        })
    }

    /// Outputs along `path`, or None if a transition is missing
    fn outputs(&self, path: &[Symbol]) -> Option<Vec<Response>> {
        let mut state = self.initial_state();
        let mut outputs = Vec::with_capacity(path.len());
        for input in path {
            let (next, output) = self.transition(state, input)?;
            outputs.push(output.clone());
            state = next;
        }
        Some(outputs)
    }
}
