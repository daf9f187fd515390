use statevuln_core::features::sul::{SulResult, SystemUnderLearning};
use statevuln_core::shared::ports::{MealyView, StateId};
use statevuln_core::{MealyMachine, Response, Symbol};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Call counters readable after the SUL moved into a wrapper
#[derive(Debug, Default)]
pub struct SulCounters {
    pub pres: AtomicUsize,
    pub steps: AtomicUsize,
    pub hinted: AtomicUsize,
    pub posts: AtomicUsize,
}

impl SulCounters {
    pub fn pres(&self) -> usize {
        self.pres.load(Ordering::SeqCst)
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::SeqCst)
    }

    pub fn hinted(&self) -> usize {
        self.hinted.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }
}

/// Live implementation simulated by a fixed Mealy machine
pub struct FakeSul {
    machine: MealyMachine,
    state: StateId,
    counters: Arc<SulCounters>,
}

impl FakeSul {
    pub fn new(machine: MealyMachine) -> (Self, Arc<SulCounters>) {
        let counters = Arc::new(SulCounters::default());
        let state = machine.initial_state();
        (
            Self {
                machine,
                state,
                counters: Arc::clone(&counters),
            },
            counters,
        )
    }

    fn advance(&mut self, symbol: &Symbol) -> Response {
        match self.machine.transition(self.state, symbol) {
            Some((next, output)) => {
                let output = output.clone();
                self.state = next;
                output
            }
            None => Response::IllegalTransition,
        }
    }
}

impl SystemUnderLearning for FakeSul {
    fn pre(&mut self) -> SulResult<()> {
        self.counters.pres.fetch_add(1, Ordering::SeqCst);
        self.state = self.machine.initial_state();
        Ok(())
    }

    fn step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        self.counters.steps.fetch_add(1, Ordering::SeqCst);
        Ok(self.advance(symbol))
    }

    fn step_with_hint(&mut self, symbol: &Symbol, _expected: &Response) -> SulResult<Response> {
        self.counters.hinted.fetch_add(1, Ordering::SeqCst);
        self.step(symbol)
    }

    fn post(&mut self) -> SulResult<()> {
        self.counters.posts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
