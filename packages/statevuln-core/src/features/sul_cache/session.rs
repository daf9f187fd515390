/*
 * Caching SUL
 *
 * Wraps a live `SystemUnderLearning` and answers from the shared cache while
 * the session stays on a cached path.
 *
 * # Session phases
 * ```text
 *            hit                  illegal hit (trap enabled)
 *   Cached ───────► Cached ─────────────────────────────► Trapped
 *      │ miss
 *      ▼
 *   escalate: drop read guard, replay prefix live (hinted)
 *      ▼
 *    Live ── filter hit / illegal (trap enabled) ──► dead, no more live queries
 * ```
 *
 * `post` closes the live connection (if one was opened) and inserts the
 * session under the exclusive lock when any output did not come from the
 * cache. A conflict is reported ahead of a failing live `post`.
 *
 * The live `pre` is deferred until a symbol actually has to be sent, so a
 * session answered entirely by filters never opens a connection.
 *
 * Filters run before every live query. While replaying a cached prefix they
 * run only when cache trapping is enabled; with trapping disabled the prefix
 * is resent as is.
 */

use super::filters::{FilterReason, SessionFilter};
use super::store::{CacheStore, SessionReadGuard};
use crate::config::CacheConfig;
use crate::features::context::ContextPropertyContainer;
use crate::features::sul::{OutputQuery, SulError, SulResult, SystemUnderLearning};
use crate::shared::models::{format_path, Response, Symbol};
use petgraph::stable_graph::NodeIndex;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Cached,
    Trapped,
    Live,
}

struct Session {
    guard: Option<SessionReadGuard>,
    phase: SessionPhase,
    /// Cache node matching the prefix, `None` once off the tree
    node: Option<NodeIndex>,
    inputs: Vec<Symbol>,
    outputs: Vec<Response>,
    tracker: ContextPropertyContainer,
    connected: bool,
    dead: bool,
    novel: bool,
    failed: bool,
}

impl Session {
    fn idle() -> Self {
        Self {
            guard: None,
            phase: SessionPhase::Idle,
            node: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tracker: ContextPropertyContainer::default(),
            connected: false,
            dead: false,
            novel: false,
            failed: false,
        }
    }

    fn record(&mut self, symbol: Symbol, response: Response) {
        self.tracker.observe(&symbol, &response);
        self.inputs.push(symbol);
        self.outputs.push(response);
    }
}

pub struct SulCache<S> {
    live: S,
    store: CacheStore,
    config: CacheConfig,
    filter: SessionFilter,
    session: Session,
    force_live: bool,
    overwrite_next: bool,
}

impl<S: SystemUnderLearning> SulCache<S> {
    pub fn new(live: S, store: CacheStore, config: &CacheConfig) -> Self {
        Self {
            live,
            store,
            filter: SessionFilter::new(config.fast_filter),
            config: config.clone(),
            session: Session::idle(),
            force_live: false,
            overwrite_next: false,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn live(&self) -> &S {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut S {
        &mut self.live
    }

    pub fn into_live(self) -> S {
        self.live
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    /// Context derived from this session's symbols and responses so far
    pub fn tracker(&self) -> &ContextPropertyContainer {
        &self.session.tracker
    }

    /// Run `inputs` against the live implementation and overwrite what the
    /// cache holds for them
    pub fn query_overwriting(&mut self, inputs: &[Symbol]) -> SulResult<Vec<Response>> {
        self.force_live = true;
        self.overwrite_next = true;
        let result = self.output_query(inputs);
        self.force_live = false;
        self.overwrite_next = false;
        result
    }

    fn trapping(&self) -> bool {
        !self.config.disable_cache_trap
    }

    fn ensure_connected(&mut self) -> SulResult<()> {
        if !self.session.connected {
            self.live.pre()?;
            self.session.connected = true;
        }
        Ok(())
    }

    fn cached_step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        let hit = match (&self.session.guard, self.session.node) {
            (Some(guard), Some(node)) => guard
                .lookup(node, symbol)
                .map(|(next, output)| (next, output.clone())),
            _ => None,
        };

        match hit {
            Some((next, output)) => {
                self.store.metrics().hits.inc();
                trace!(symbol = %symbol, "Cache hit");
                self.session.node = Some(next);
                if output.is_illegal() && self.trapping() {
                    self.session.phase = SessionPhase::Trapped;
                }
                self.session.record(*symbol, output.clone());
                Ok(output)
            }
            None => {
                self.escalate()?;
                self.live_step(symbol)
            }
        }
    }

    fn trapped_step(&mut self, symbol: &Symbol) -> Response {
        let next = match (&self.session.guard, self.session.node) {
            (Some(guard), Some(node)) => guard.lookup(node, symbol).map(|(next, _)| next),
            _ => None,
        };
        if next.is_none() {
            self.session.novel = true;
        }
        self.session.node = next;
        self.session.record(*symbol, Response::IllegalTransition);
        Response::IllegalTransition
    }

    /// Leave the cached path: release the read lock and resend the prefix live
    fn escalate(&mut self) -> SulResult<()> {
        self.store.metrics().misses.inc();
        debug!(
            prefix = %format_path(&self.session.inputs),
            "Cache miss, escalating to live implementation"
        );
        self.session.guard = None;
        self.session.node = None;
        self.session.phase = SessionPhase::Live;
        self.session.novel = true;

        let prefix = std::mem::take(&mut self.session.inputs);
        let cached = std::mem::take(&mut self.session.outputs);
        self.session.tracker = ContextPropertyContainer::default();

        let filtered = self.trapping();
        for (symbol, expected) in prefix.into_iter().zip(cached) {
            let response = if filtered {
                self.send_live(&symbol, Some(&expected))?
            } else {
                self.ensure_connected()?;
                self.store.metrics().live_queries.inc();
                self.live.step_with_hint(&symbol, &expected)?
            };
            self.session.record(symbol, response);
        }
        Ok(())
    }

    fn live_step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        let response = self.send_live(symbol, None)?;
        self.session.record(*symbol, response.clone());
        Ok(response)
    }

    /// One symbol to the live implementation, after the filters
    fn send_live(&mut self, symbol: &Symbol, hint: Option<&Response>) -> SulResult<Response> {
        if self.session.dead {
            return Ok(Response::IllegalTransition);
        }

        let previous = self.session.inputs.last();
        if let Some(reason) = self.filter.check(symbol, previous, &self.session.tracker) {
            self.on_filtered(symbol, reason);
            return Ok(Response::IllegalTransition);
        }

        self.ensure_connected()?;
        self.store.metrics().live_queries.inc();
        let response = match hint {
            Some(expected) => self.live.step_with_hint(symbol, expected)?,
            None => self.live.step(symbol)?,
        };
        if response.is_illegal() && self.trapping() {
            self.session.dead = true;
        }
        Ok(response)
    }

    fn on_filtered(&mut self, symbol: &Symbol, reason: FilterReason) {
        self.store.metrics().filtered.inc();
        debug!(symbol = %symbol, reason = %reason, "Symbol filtered");
        if self.trapping() {
            self.session.dead = true;
        }
    }
}

impl<S: SystemUnderLearning> SystemUnderLearning for SulCache<S> {
    fn pre(&mut self) -> SulResult<()> {
        let mut session = Session::idle();
        if self.config.disable_cache || self.force_live {
            session.phase = SessionPhase::Live;
            session.novel = self.force_live;
        } else {
            let guard = self.store.read_arc();
            session.node = Some(guard.root());
            session.guard = Some(guard);
            session.phase = SessionPhase::Cached;
        }
        self.session = session;
        Ok(())
    }

    fn step(&mut self, symbol: &Symbol) -> SulResult<Response> {
        let result = match self.session.phase {
            SessionPhase::Idle => Err(SulError::io("step called outside a session")),
            SessionPhase::Cached => self.cached_step(symbol),
            SessionPhase::Trapped => Ok(self.trapped_step(symbol)),
            SessionPhase::Live => self.live_step(symbol),
        };
        if result.is_err() {
            self.session.failed = true;
        }
        result
    }

    fn post(&mut self) -> SulResult<()> {
        let mut session = std::mem::replace(&mut self.session, Session::idle());
        let live_post = if session.connected {
            self.live.post()
        } else {
            Ok(())
        };
        drop(session.guard.take());

        if session.novel && !session.failed && !self.config.disable_cache {
            let overwrite = self.config.overwrite_on_conflict || self.overwrite_next;
            self.store
                .insert(&session.inputs, &session.outputs, overwrite)?;
        }
        live_post
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sul_cache::CacheError;
    use crate::shared::models::{MessageKind, ResumptionKind};
    use std::collections::VecDeque;

    /// Replays scripted responses and counts calls
    #[derive(Default)]
    struct Scripted {
        responses: VecDeque<Response>,
        pres: usize,
        steps: usize,
        hinted: usize,
    }

    impl Scripted {
        fn with(responses: &[Response]) -> Self {
            Self {
                responses: responses.iter().cloned().collect(),
                ..Default::default()
            }
        }
    }

    impl SystemUnderLearning for Scripted {
        fn pre(&mut self) -> SulResult<()> {
            self.pres += 1;
            Ok(())
        }

        fn step(&mut self, _symbol: &Symbol) -> SulResult<Response> {
            self.steps += 1;
            self.responses
                .pop_front()
                .ok_or_else(|| SulError::io("script exhausted"))
        }

        fn step_with_hint(&mut self, symbol: &Symbol, _expected: &Response) -> SulResult<Response> {
            self.hinted += 1;
            self.step(symbol)
        }

        fn post(&mut self) -> SulResult<()> {
            Ok(())
        }
    }

    fn alert() -> Response {
        Response::of_kinds(&[MessageKind::Alert])
    }

    fn cache(live: Scripted, config: CacheConfig) -> SulCache<Scripted> {
        SulCache::new(live, CacheStore::unregistered(32).unwrap(), &config)
    }

    #[test]
    fn test_second_query_is_served_from_cache() {
        let mut sul = cache(Scripted::with(&[alert()]), CacheConfig::default());
        let first = sul.output_query(&[Symbol::Finished]).unwrap();
        let second = sul.output_query(&[Symbol::Finished]).unwrap();
        assert_eq!(first, second);
        assert_eq!(sul.live().steps, 1);
        assert_eq!(sul.store().metrics().hits.get(), 1);
    }

    #[test]
    fn test_miss_replays_prefix_with_hints() {
        let responses = [alert(), alert(), Response::silent()];
        let mut sul = cache(Scripted::with(&responses), CacheConfig::default());
        sul.output_query(&[Symbol::Heartbeat]).unwrap();
        sul.pre().unwrap();
        sul.step(&Symbol::Heartbeat).unwrap();
        assert_eq!(sul.phase(), SessionPhase::Cached);
        sul.step(&Symbol::Finished).unwrap();
        assert_eq!(sul.phase(), SessionPhase::Live);
        sul.post().unwrap();
        assert_eq!(sul.live().hinted, 1);
        assert_eq!(sul.live().pres, 2);
    }

    #[test]
    fn test_cached_illegal_traps_session() {
        let mut sul = cache(
            Scripted::with(&[Response::IllegalTransition]),
            CacheConfig::default(),
        );
        sul.output_query(&[Symbol::Finished]).unwrap();
        let out = sul
            .output_query(&[Symbol::Finished, Symbol::Heartbeat, Symbol::Finished])
            .unwrap();
        assert!(out.iter().all(Response::is_illegal));
        assert_eq!(sul.live().steps, 1);
        assert_eq!(sul.live().pres, 1);
    }

    #[test]
    fn test_disabled_trap_requeries_live() {
        let config = CacheConfig::default().disable_cache_trap(true);
        let responses = [
            Response::IllegalTransition,
            Response::IllegalTransition,
            alert(),
        ];
        let mut sul = cache(Scripted::with(&responses), config);
        sul.output_query(&[Symbol::Finished]).unwrap();
        let out = sul
            .output_query(&[Symbol::Finished, Symbol::Heartbeat])
            .unwrap();
        assert_eq!(out[1], alert());
        assert_eq!(sul.live().steps, 3);
    }

    #[test]
    fn test_filtered_first_symbol_opens_no_connection() {
        let mut sul = cache(Scripted::default(), CacheConfig::default());
        let resume = Symbol::ResumingHello(ResumptionKind::Tls12Ticket);
        let out = sul.output_query(&[resume, Symbol::Heartbeat]).unwrap();
        assert_eq!(out, vec![Response::IllegalTransition; 2]);
        assert_eq!(sul.live().pres, 0);
        assert_eq!(sul.live().steps, 0);
        assert_eq!(sul.store().metrics().filtered.get(), 1);
    }

    #[test]
    fn test_conflict_surfaces_at_post() {
        let store = CacheStore::unregistered(32).unwrap();
        store.insert(&[Symbol::Finished], &[alert()], false).unwrap();
        let mut sul = SulCache::new(
            Scripted::with(&[Response::silent()]),
            store,
            &CacheConfig::default(),
        );
        sul.query_overwriting(&[Symbol::Finished]).unwrap();
        assert_eq!(
            sul.store().lookup_outputs(&[Symbol::Finished]).unwrap(),
            vec![Response::silent()]
        );

        sul.live_mut().responses.push_back(alert());
        sul.pre().unwrap();
        // Forced past the cached edge by a miss on the second symbol
        sul.step(&Symbol::Finished).unwrap();
        sul.live_mut().responses.push_back(Response::silent());
        sul.step(&Symbol::Heartbeat).unwrap();
        let err = sul.post().unwrap_err();
        assert!(matches!(err, SulError::Cache(CacheError::Conflict { .. })));
    }

    #[test]
    fn test_disabled_cache_passes_through() {
        let config = CacheConfig::default().disable_cache(true);
        let mut sul = cache(Scripted::with(&[alert(), alert()]), config);
        sul.output_query(&[Symbol::Finished]).unwrap();
        sul.output_query(&[Symbol::Finished]).unwrap();
        assert_eq!(sul.live().steps, 2);
        assert!(sul.store().lookup_outputs(&[Symbol::Finished]).is_none());
    }
}
