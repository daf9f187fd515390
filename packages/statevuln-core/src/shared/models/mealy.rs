/*
 * Mealy Machine
 *
 * Learned hypothesis: dense state ids with one transition table per state.
 *
 * The edge-list form (`MealyGraph`) is the lossless interchange format: every
 * edge keeps its exact (symbol, response) pair, so a serialize/deserialize
 * cycle rebuilds the same machine.
 */

use super::alphabet::Alphabet;
use super::response::Response;
use super::symbol::Symbol;
use crate::shared::ports::{MealyView, StateId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One labeled edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealyEdge {
    pub from: StateId,
    pub input: Symbol,
    pub output: Response,
    pub to: StateId,
}

/// Edge-labeled graph form of a Mealy machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealyGraph {
    pub initial: StateId,
    pub state_count: usize,
    pub alphabet: Alphabet,
    pub edges: Vec<MealyEdge>,
}

/// Learned hypothesis automaton
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MealyGraph", try_from = "MealyGraph")]
pub struct MealyMachine {
    alphabet: Alphabet,
    initial: StateId,
    transitions: Vec<FxHashMap<Symbol, (StateId, Response)>>,
}

impl MealyMachine {
    /// Create a machine with `state_count` states and no transitions
    ///
    /// `initial` must be below `state_count`; see [`MealyMachine::try_new`]
    /// for untrusted sizes.
    pub fn new(alphabet: Alphabet, state_count: usize, initial: StateId) -> Self {
        debug_assert!(
            initial < state_count.max(1),
            "initial state {initial} out of range (state_count = {state_count})"
        );
        Self {
            alphabet,
            initial,
            transitions: vec![FxHashMap::default(); state_count.max(1)],
        }
    }

    pub fn try_new(
        alphabet: Alphabet,
        state_count: usize,
        initial: StateId,
    ) -> Result<Self, String> {
        if state_count == 0 {
            return Err("Mealy machine has no states".to_string());
        }
        if initial >= state_count {
            return Err(format!(
                "Initial state {} out of range (state_count = {})",
                initial, state_count
            ));
        }
        Ok(Self::new(alphabet, state_count, initial))
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Add a state, returning its id
    pub fn add_state(&mut self) -> StateId {
        self.transitions.push(FxHashMap::default());
        self.transitions.len() - 1
    }

    /// Set (or replace) a transition
    ///
    /// Panics if `from` or `to` is out of range.
    pub fn set_transition(&mut self, from: StateId, input: Symbol, output: Response, to: StateId) {
        assert!(to < self.transitions.len(), "target state {} out of range", to);
        self.transitions[from].insert(input, (to, output));
    }

    /// Outputs produced by `inputs`, or None if the machine is undefined on them
    pub fn run(&self, inputs: &[Symbol]) -> Option<Vec<Response>> {
        self.outputs(inputs)
    }

    /// Whether every state defines every alphabet symbol
    pub fn is_complete(&self) -> bool {
        self.transitions
            .iter()
            .all(|table| self.alphabet.iter().all(|s| table.contains_key(s)))
    }

    pub fn to_graph(&self) -> MealyGraph {
        let mut edges = Vec::new();
        for (from, table) in self.transitions.iter().enumerate() {
            // Alphabet order first, then stray inputs sorted
            let mut extra: Vec<&Symbol> = table
                .keys()
                .filter(|k| !self.alphabet.contains(k))
                .collect();
            extra.sort();
            for input in self.alphabet.iter().chain(extra) {
                if let Some((to, output)) = table.get(input) {
                    edges.push(MealyEdge {
                        from,
                        input: *input,
                        output: output.clone(),
                        to: *to,
                    });
                }
            }
        }
        MealyGraph {
            initial: self.initial,
            state_count: self.transitions.len(),
            alphabet: self.alphabet.clone(),
            edges,
        }
    }

    pub fn from_graph(graph: MealyGraph) -> Result<Self, String> {
        let mut machine = Self::try_new(graph.alphabet, graph.state_count, graph.initial)?;
        for edge in graph.edges {
            if edge.from >= graph.state_count || edge.to >= graph.state_count {
                return Err(format!(
                    "Edge {} -{}-> {} references a missing state",
                    edge.from, edge.input, edge.to
                ));
            }
            machine.set_transition(edge.from, edge.input, edge.output, edge.to);
        }
        Ok(machine)
    }
}

impl MealyView for MealyMachine {
    fn initial_state(&self) -> StateId {
        self.initial
    }

    fn states(&self) -> Vec<StateId> {
        (0..self.transitions.len()).collect()
    }

    fn transition(&self, state: StateId, input: &Symbol) -> Option<(StateId, &Response)> {
        self.transitions
            .get(state)?
            .get(input)
            .map(|(to, output)| (*to, output))
    }

    fn inputs(&self) -> &[Symbol] {
        self.alphabet.symbols()
    }
}

impl From<MealyMachine> for MealyGraph {
    fn from(machine: MealyMachine) -> Self {
        machine.to_graph()
    }
}

impl TryFrom<MealyGraph> for MealyMachine {
    type Error = String;

    fn try_from(graph: MealyGraph) -> Result<Self, Self::Error> {
        Self::from_graph(graph)
    }
}
