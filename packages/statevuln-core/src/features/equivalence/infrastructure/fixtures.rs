//! Live-system stand-in for the oracle tests

use crate::features::sul::{SulResult, SystemUnderLearning};
use crate::shared::models::{MealyMachine, Response, Symbol};
use crate::shared::ports::{MealyView, StateId};

/// Answers from a fixed machine, counting sessions
pub struct MachineSul {
    machine: MealyMachine,
    state: StateId,
    pub sessions: usize,
}

impl MachineSul {
    pub fn new(machine: MealyMachine) -> Self {
        let state = machine.initial_state();
        Self {
            machine,
            state,
            sessions: 0,
        }
    }
}

impl SystemUnderLearning for MachineSul {
    fn pre(&mut self) -> SulResult<()> {
        self.sessions += 1;
        self.state = self.machine.initial_state();
        Ok(())
    }

    fn step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        match self.machine.transition(self.state, symbol) {
            Some((next, output)) => {
                let output = output.clone();
                self.state = next;
                Ok(output)
            }
            None => Ok(Response::IllegalTransition),
        }
    }

    fn post(&mut self) -> SulResult<()> {
        Ok(())
    }
}
