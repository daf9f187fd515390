//! Per-analysis view over the learned automaton
//!
//! Filled by the classifiers in pipeline order: error states first, then the
//! benign-state walk that later classifiers read.

use super::issue::StateMachineIssue;
use crate::features::context::{ContextProperty, ContextPropertyContainer};
use crate::shared::models::{Symbol, SymbolType};
use crate::shared::ports::StateId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One benign way into a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub path: Vec<Symbol>,
    pub properties: Vec<ContextProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenignStateInfo {
    pub names: BTreeSet<String>,
    /// Inputs taken on some benign path out of this state
    pub allowed_inputs: BTreeSet<Symbol>,
    /// Inputs leading into an error state
    pub rejected_inputs: BTreeSet<Symbol>,
    /// Distinct contexts on entry, capped per state
    pub entries: Vec<StateEntry>,
    /// Effective predecessor types seen on entry
    pub input_type_history: BTreeSet<SymbolType>,
}

impl BenignStateInfo {
    pub fn has_entry(&self, properties: &[ContextProperty]) -> bool {
        self.entries.iter().any(|e| e.properties == properties)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDetails {
    pub initial_state: StateId,
    pub error_states: BTreeSet<StateId>,
    pub state_info: BTreeMap<StateId, BenignStateInfo>,
    pub findings: Vec<StateMachineIssue>,
}

impl GraphDetails {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            initial_state,
            error_states: BTreeSet::new(),
            state_info: BTreeMap::new(),
            findings: Vec::new(),
        }
    }

    pub fn is_error_state(&self, state: StateId) -> bool {
        self.error_states.contains(&state)
    }

    pub fn info(&self, state: StateId) -> Option<&BenignStateInfo> {
        self.state_info.get(&state)
    }

    pub fn info_mut(&mut self, state: StateId) -> &mut BenignStateInfo {
        self.state_info.entry(state).or_default()
    }

    /// States reached by at least one benign path
    pub fn benign_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.state_info
            .iter()
            .filter(|(_, info)| !info.entries.is_empty())
            .map(|(state, _)| *state)
    }

    /// Remember how `state` was entered; false if the context was already known
    /// or the per-state cap is reached
    pub fn record_entry(
        &mut self,
        state: StateId,
        path: &[Symbol],
        context: &ContextPropertyContainer,
        predecessor: SymbolType,
        max_entries: usize,
    ) -> bool {
        let properties = context.properties();
        let info = self.info_mut(state);
        info.input_type_history.insert(predecessor);
        if info.has_entry(&properties) || info.entries.len() >= max_entries {
            return false;
        }
        info.entries.push(StateEntry {
            path: path.to_vec(),
            properties,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_deduplicated_and_capped() {
        let mut details = GraphDetails::new(0);
        let ctx = ContextPropertyContainer::default();
        assert!(details.record_entry(1, &[Symbol::Heartbeat], &ctx, SymbolType::Heartbeat, 1));
        assert!(!details.record_entry(1, &[], &ctx, SymbolType::ResetConnection, 1));
        let info = details.info(1).unwrap();
        assert_eq!(info.entries.len(), 1);
        assert_eq!(info.input_type_history.len(), 2);
        assert_eq!(details.benign_states().collect::<Vec<_>>(), vec![1]);
    }
}
