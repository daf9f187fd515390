/*
 * Transition Analyzer
 *
 * Composes the rule book with context replay over one automaton.
 *
 * Every query that needs a response reads the stored transition output; the
 * automaton is never re-executed.
 */

use crate::features::context::{ContextProperty, ContextPropertyContainer};
use crate::features::rules::RuleBook;
use crate::features::transition_analysis::domain::effective_last_sent;
use crate::shared::models::{MessageKind, Response, Symbol, SymbolType};
use crate::shared::ports::{MealyView, StateId};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::trace;

pub struct TransitionAnalyzer<'a> {
    rules: &'a RuleBook,
    automaton: &'a dyn MealyView,
}

impl<'a> TransitionAnalyzer<'a> {
    pub fn new(rules: &'a RuleBook, automaton: &'a dyn MealyView) -> Self {
        Self { rules, automaton }
    }

    pub fn rules(&self) -> &RuleBook {
        self.rules
    }

    pub fn automaton(&self) -> &dyn MealyView {
        self.automaton
    }

    /// Context after replaying `path` against the stored outputs
    pub fn context_after(&self, path: &[Symbol]) -> ContextPropertyContainer {
        ContextPropertyContainer::replay(self.automaton, path)
    }

    pub fn effective_last_sent(
        &self,
        context: &ContextPropertyContainer,
        successor: SymbolType,
    ) -> SymbolType {
        effective_last_sent(context.history(), successor)
    }

    pub fn is_allowed_successor(
        &self,
        predecessor: SymbolType,
        successor: SymbolType,
        context: &ContextPropertyContainer,
    ) -> bool {
        self.rules
            .chains_for(context)
            .any(|chain| chain.applies_to(predecessor, successor, context))
    }

    pub fn is_required_successor(
        &self,
        predecessor: SymbolType,
        successor: SymbolType,
        context: &ContextPropertyContainer,
    ) -> bool {
        self.rules
            .chains_for(context)
            .any(|chain| chain.required && chain.applies_to(predecessor, successor, context))
    }

    /// Allowed by some chain, required by none
    pub fn is_optional_successor(
        &self,
        predecessor: SymbolType,
        successor: SymbolType,
        context: &ContextPropertyContainer,
    ) -> bool {
        self.is_allowed_successor(predecessor, successor, context)
            && !self.is_required_successor(predecessor, successor, context)
    }

    /// Session state a symbol needs before it can be meaningful
    pub fn symbol_precondition(&self, symbol: &Symbol, context: &ContextPropertyContainer) -> bool {
        match symbol {
            Symbol::ResumingHello(kind) => context.can_resume(*kind),
            Symbol::EndOfEarlyData => context.has(ContextProperty::EarlyDataOffered),
            _ => true,
        }
    }

    /// Whether sending `symbol` next keeps the flow benign
    pub fn is_benign_step(&self, symbol: &Symbol, context: &ContextPropertyContainer) -> bool {
        let successor = symbol.symbol_type();
        let predecessor = self.effective_last_sent(context, successor);
        self.is_allowed_successor(predecessor, successor, context)
            && self.symbol_precondition(symbol, context)
    }

    /// Required successor of the current effective predecessor
    pub fn is_required_step(&self, symbol: &Symbol, context: &ContextPropertyContainer) -> bool {
        let successor = symbol.symbol_type();
        let predecessor = self.effective_last_sent(context, successor);
        self.is_required_successor(predecessor, successor, context)
            && self.symbol_precondition(symbol, context)
    }

    /// Index of the first symbol violating every letter chain
    ///
    /// Context is never computed past the violation.
    pub fn first_violation(&self, path: &[Symbol]) -> Option<usize> {
        let mut context = ContextPropertyContainer::new(Some(self.automaton.initial_state()));
        for (index, symbol) in path.iter().enumerate() {
            if !self.is_benign_step(symbol, &context) {
                return Some(index);
            }
            context.step_through(self.automaton, symbol);
        }
        None
    }

    pub fn is_benign_flow(&self, path: &[Symbol]) -> bool {
        self.first_violation(path).is_none()
    }

    /// Benign inputs from the automaton's input set under `context`
    pub fn benign_successors(&self, context: &ContextPropertyContainer) -> Vec<Symbol> {
        self.automaton
            .inputs()
            .iter()
            .filter(|symbol| self.is_benign_step(symbol, context))
            .copied()
            .collect()
    }

    /// Whether `response` is an acceptable answer to `symbol` sent in `context`
    ///
    /// The sent-symbol update is applied to a copy before rule lookup.
    pub fn is_expected_response(
        &self,
        symbol: &Symbol,
        response: &Response,
        context: &ContextPropertyContainer,
    ) -> bool {
        let Some(fingerprint) = response.fingerprint() else {
            return false;
        };
        let mut speculative = context.clone();
        speculative.update_context_for_sent(symbol);

        let observed: Vec<MessageKind> = fingerprint.kinds().collect();
        let sent = symbol.symbol_type();
        self.rules
            .responses_for(&speculative)
            .filter(|rule| rule.applies(sent, &speculative))
            .any(|rule| rule.accepts(&observed, self.rules.ignorable()))
    }

    /// Shortest access path to every reachable state
    ///
    /// Breadth-first; among equally short paths the one taking benign
    /// successors first wins.
    pub fn access_paths(&self) -> FxHashMap<StateId, Vec<Symbol>> {
        let initial = self.automaton.initial_state();
        let mut paths: FxHashMap<StateId, Vec<Symbol>> = FxHashMap::default();
        paths.insert(initial, Vec::new());

        let mut queue = VecDeque::new();
        queue.push_back((
            initial,
            Vec::new(),
            ContextPropertyContainer::new(Some(initial)),
        ));

        while let Some((state, path, context)) = queue.pop_front() {
            let (benign, other): (Vec<Symbol>, Vec<Symbol>) = self
                .automaton
                .inputs()
                .iter()
                .copied()
                .partition(|symbol| self.is_benign_step(symbol, &context));

            for symbol in benign.into_iter().chain(other) {
                let Some((next, _)) = self.automaton.transition(state, &symbol) else {
                    continue;
                };
                if paths.contains_key(&next) {
                    continue;
                }
                let mut next_path = path.clone();
                next_path.push(symbol);
                let mut next_context = context.clone();
                next_context.step_through(self.automaton, &symbol);

                paths.insert(next, next_path.clone());
                queue.push_back((next, next_path, next_context));
            }
        }
        trace!(reachable = paths.len(), "Access paths computed");
        paths
    }
}
