//! Counterexample model

use crate::shared::models::{format_path, outputs_match, MealyMachine, Response, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input word on which the hypothesis and the live system disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    pub inputs: Vec<Symbol>,

    /// None when the hypothesis is undefined on `inputs`
    pub hypothesis_outputs: Option<Vec<Response>>,

    pub live_outputs: Vec<Response>,
}

impl Counterexample {
    /// Compare a live observation against the hypothesis
    pub fn compare(
        hypothesis: &MealyMachine,
        inputs: &[Symbol],
        live_outputs: Vec<Response>,
    ) -> Option<Self> {
        let hypothesis_outputs = hypothesis.run(inputs);
        let agrees = hypothesis_outputs
            .as_deref()
            .is_some_and(|expected| outputs_match(expected, &live_outputs));
        if agrees {
            return None;
        }
        Some(Self {
            inputs: inputs.to_vec(),
            hypothesis_outputs,
            live_outputs,
        })
    }

    /// Index of the first differing output
    pub fn divergence_index(&self) -> usize {
        let Some(expected) = &self.hypothesis_outputs else {
            return 0;
        };
        expected
            .iter()
            .zip(&self.live_outputs)
            .position(|(e, o)| !e.semantically_equals(o))
            .unwrap_or_else(|| expected.len().min(self.live_outputs.len()))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.divergence_index();
        write!(f, "{}", format_path(&self.inputs))?;
        match (
            self.hypothesis_outputs.as_ref().and_then(|h| h.get(at)),
            self.live_outputs.get(at),
        ) {
            (Some(expected), Some(observed)) => {
                write!(f, " (at {}: expected {}, observed {})", at, expected, observed)
            }
            (None, _) => write!(f, " (hypothesis undefined)"),
            _ => Ok(()),
        }
    }
}
