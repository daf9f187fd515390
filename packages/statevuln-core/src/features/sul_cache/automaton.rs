/*
 * Cache Automaton
 *
 * Prefix tree of every observed session, stored in a petgraph
 * `StableDiGraph` so node indices stay valid when a stale subtree is removed.
 *
 * Node weight: symbol -> outgoing edge index (O(1) lookup)
 * Edge weight: (input, canonical output)
 *
 * # Insert
 * ```text
 * 1. walk from root comparing stored outputs   (read-only)
 *    first semantic mismatch, no overwrite  -> Conflict, nothing changed
 * 2. walk again, mutating
 *    mismatch with overwrite -> drop target subtree, re-add edge
 *    missing edge            -> append node + edge
 * ```
 */

use super::error::{CacheError, CacheResult};
use super::response_pool::ResponsePool;
use crate::shared::models::{Response, Symbol};
use crate::shared::ports::{MealyView, StateId};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct CacheNode {
    transitions: FxHashMap<Symbol, EdgeIndex>,
}

#[derive(Debug, Clone)]
pub struct CacheEdge {
    pub input: Symbol,
    pub output: Response,
}

/// What an insert changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertStats {
    pub added: u64,
    pub replaced: u64,
}

#[derive(Debug)]
pub struct CacheAutomaton {
    graph: StableDiGraph<CacheNode, CacheEdge>,
    root: NodeIndex,
    pool: ResponsePool,
    inputs: Vec<Symbol>,
    seen_inputs: FxHashSet<Symbol>,
}

impl CacheAutomaton {
    pub fn new(payload_limit: usize) -> Self {
        let mut graph = StableDiGraph::default();
        let root = graph.add_node(CacheNode::default());
        Self {
            graph,
            root,
            pool: ResponsePool::new(payload_limit),
            inputs: Vec::new(),
            seen_inputs: FxHashSet::default(),
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn pool(&self) -> &ResponsePool {
        &self.pool
    }

    /// Successor and stored output for `symbol` from `node`
    pub fn lookup(&self, node: NodeIndex, symbol: &Symbol) -> Option<(NodeIndex, &Response)> {
        let edge = self.edge_of(node, symbol)?;
        let (_, target) = self.graph.edge_endpoints(edge)?;
        Some((target, &self.graph.edge_weight(edge)?.output))
    }

    /// Stored outputs for the whole word, if fully cached
    pub fn outputs_for(&self, inputs: &[Symbol]) -> Option<Vec<Response>> {
        let mut node = self.root;
        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (next, output) = self.lookup(node, input)?;
            outputs.push(output.clone());
            node = next;
        }
        Some(outputs)
    }

    pub fn insert(
        &mut self,
        inputs: &[Symbol],
        outputs: &[Response],
        overwrite: bool,
    ) -> CacheResult<InsertStats> {
        if inputs.len() != outputs.len() {
            return Err(CacheError::LengthMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }

        if !overwrite {
            self.check_conflict(inputs, outputs)?;
        }

        let mut stats = InsertStats::default();
        let mut node = self.root;
        for (input, observed) in inputs.iter().zip(outputs) {
            if let Some((next, stored)) = self.lookup(node, input) {
                if stored.semantically_equals(observed) {
                    node = next;
                    continue;
                }
                self.remove_subtree(next);
                self.graph[node].transitions.remove(input);
                stats.replaced += 1;
            }

            let output = self.pool.canonicalize(observed);
            let next = self.graph.add_node(CacheNode::default());
            let edge = self.graph.add_edge(
                node,
                next,
                CacheEdge {
                    input: *input,
                    output,
                },
            );
            self.graph[node].transitions.insert(*input, edge);
            if self.seen_inputs.insert(*input) {
                self.inputs.push(*input);
            }
            stats.added += 1;
            node = next;
        }
        Ok(stats)
    }

    fn check_conflict(&self, inputs: &[Symbol], outputs: &[Response]) -> CacheResult<()> {
        let mut node = self.root;
        let mut cached = Vec::new();
        for (index, (input, observed)) in inputs.iter().zip(outputs).enumerate() {
            let Some((next, stored)) = self.lookup(node, input) else {
                return Ok(());
            };
            cached.push(stored.clone());
            if !stored.semantically_equals(observed) {
                return Err(CacheError::Conflict {
                    inputs: inputs[..=index].to_vec(),
                    cached,
                    observed: outputs[..=index].to_vec(),
                });
            }
            node = next;
        }
        Ok(())
    }

    fn edge_of(&self, node: NodeIndex, symbol: &Symbol) -> Option<EdgeIndex> {
        self.graph.node_weight(node)?.transitions.get(symbol).copied()
    }

    /// Remove `start` and everything below it
    fn remove_subtree(&mut self, start: NodeIndex) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            let Some(weight) = self.graph.node_weight(node) else {
                continue;
            };
            for edge in weight.transitions.values() {
                if let Some((_, child)) = self.graph.edge_endpoints(*edge) {
                    stack.push(child);
                }
            }
            // Incident edges go with the node
            self.graph.remove_node(node);
        }
    }
}

impl MealyView for CacheAutomaton {
    fn initial_state(&self) -> StateId {
        self.root.index()
    }

    fn states(&self) -> Vec<StateId> {
        self.graph.node_indices().map(|n| n.index()).collect()
    }

    fn transition(&self, state: StateId, input: &Symbol) -> Option<(StateId, &Response)> {
        self.lookup(NodeIndex::new(state), input)
            .map(|(next, output)| (next.index(), output))
    }

    fn inputs(&self) -> &[Symbol] {
        &self.inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::MessageKind;

    fn r(kind: MessageKind) -> Response {
        Response::of_kinds(&[kind])
    }

    #[test]
    fn test_insert_then_read_back() {
        let mut cache = CacheAutomaton::new(32);
        let inputs = [Symbol::Finished, Symbol::ChangeCipherSpec];
        let outputs = [r(MessageKind::Alert), Response::IllegalTransition];
        cache.insert(&inputs, &outputs, false).unwrap();
        assert_eq!(cache.outputs_for(&inputs).unwrap(), outputs.to_vec());
        assert!(cache.outputs_for(&[Symbol::Heartbeat]).is_none());
    }

    #[test]
    fn test_conflict_leaves_cache_untouched() {
        let mut cache = CacheAutomaton::new(32);
        let inputs = [Symbol::Finished, Symbol::ChangeCipherSpec];
        cache
            .insert(&inputs, &[r(MessageKind::Alert), Response::silent()], false)
            .unwrap();
        let before = cache.edge_count();

        let err = cache
            .insert(
                &[Symbol::Finished, Symbol::ChangeCipherSpec, Symbol::Heartbeat],
                &[
                    r(MessageKind::Alert),
                    r(MessageKind::Finished),
                    Response::silent(),
                ],
                false,
            )
            .unwrap_err();
        match err {
            CacheError::Conflict {
                inputs,
                cached,
                observed,
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(cached[1], Response::silent());
                assert_eq!(observed[1], r(MessageKind::Finished));
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(cache.edge_count(), before);
    }

    #[test]
    fn test_overwrite_drops_stale_subtree() {
        let mut cache = CacheAutomaton::new(32);
        cache
            .insert(
                &[Symbol::Finished, Symbol::ChangeCipherSpec, Symbol::Heartbeat],
                &[r(MessageKind::Alert), Response::silent(), Response::silent()],
                false,
            )
            .unwrap();
        let stats = cache
            .insert(
                &[Symbol::Finished, Symbol::ChangeCipherSpec],
                &[r(MessageKind::Alert), Response::IllegalTransition],
                true,
            )
            .unwrap();
        assert_eq!(stats, InsertStats { added: 1, replaced: 1 });
        // Root, post-FIN, new post-CCS
        assert_eq!(cache.node_count(), 3);
        assert!(cache
            .outputs_for(&[Symbol::Finished, Symbol::ChangeCipherSpec, Symbol::Heartbeat])
            .is_none());
    }

    #[test]
    fn test_length_mismatch() {
        let mut cache = CacheAutomaton::new(32);
        assert!(matches!(
            cache.insert(&[Symbol::Finished], &[], false),
            Err(CacheError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_mealy_view_over_cache() {
        let mut cache = CacheAutomaton::new(32);
        cache
            .insert(&[Symbol::Heartbeat], &[r(MessageKind::Heartbeat)], false)
            .unwrap();
        let state = cache.walk(&[Symbol::Heartbeat]).unwrap();
        assert_ne!(state, cache.initial_state());
        assert_eq!(cache.inputs(), &[Symbol::Heartbeat]);
        assert_eq!(cache.states().len(), 2);
    }
}
