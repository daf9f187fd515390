/*
 * System-Under-Learning Port
 *
 * One session = `pre`, a sequence of `step`s, `post`. A `pre`/`post` pair
 * resets the implementation to its initial state.
 */

use super::error::SulResult;
use crate::shared::models::{Response, Symbol};

pub trait SystemUnderLearning {
    /// Begin a session
    fn pre(&mut self) -> SulResult<()>;

    /// Send one symbol and collect the response
    fn step(&mut self, symbol: &Symbol) -> SulResult<Response>;

    /// Step with the response seen for this prefix before
    ///
    /// The hint may only shorten internal waiting. It never changes the
    /// returned response.
    fn step_with_hint(&mut self, symbol: &Symbol, expected: &Response) -> SulResult<Response> {
        let _ = expected;
        self.step(symbol)
    }

    /// End the session
    fn post(&mut self) -> SulResult<()>;
}

impl<S: SystemUnderLearning + ?Sized> SystemUnderLearning for Box<S> {
    fn pre(&mut self) -> SulResult<()> {
        (**self).pre()
    }

    fn step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        (**self).step(symbol)
    }

    fn step_with_hint(&mut self, symbol: &Symbol, expected: &Response) -> SulResult<Response> {
        (**self).step_with_hint(symbol, expected)
    }

    fn post(&mut self) -> SulResult<()> {
        (**self).post()
    }
}

impl<S: SystemUnderLearning + ?Sized> SystemUnderLearning for &mut S {
    fn pre(&mut self) -> SulResult<()> {
        (**self).pre()
    }

    fn step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        (**self).step(symbol)
    }

    fn step_with_hint(&mut self, symbol: &Symbol, expected: &Response) -> SulResult<Response> {
        (**self).step_with_hint(symbol, expected)
    }

    fn post(&mut self) -> SulResult<()> {
        (**self).post()
    }
}

/// Whole-word membership query
pub trait OutputQuery {
    fn output_query(&mut self, inputs: &[Symbol]) -> SulResult<Vec<Response>>;
}

impl<S: SystemUnderLearning + ?Sized> OutputQuery for S {
    fn output_query(&mut self, inputs: &[Symbol]) -> SulResult<Vec<Response>> {
        self.pre()?;
        let mut outputs = Vec::with_capacity(inputs.len());
        for symbol in inputs {
            match self.step(symbol) {
                Ok(response) => outputs.push(response),
                Err(e) => {
                    // Close the session, the step error wins
                    let _ = self.post();
                    return Err(e);
                }
            }
        }
        self.post()?;
        Ok(outputs)
    }
}
