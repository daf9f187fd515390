/*
 * Context Property Container
 *
 * Replays a sent-symbol sequence and derives the active property set.
 *
 * # Per-symbol update order
 * 1. `update_context_for_sent`     symbol-type rules
 * 2. `update_context_for_response` rules driven by the stored output
 * 3. `advance`                     automaton cursor moves to the successor
 *
 * A container is created fresh for every replay and never shared between two
 * replays.
 */

use crate::features::context::domain::{ContextProperty, Prop, PropertyTier};
use crate::shared::models::{
    AlertDescription, HelloParams, MessageKind, ProtocolVersion, Response, ResumptionKind,
    Symbol, SymbolType,
};
use crate::shared::ports::{MealyView, StateId};
use rustc_hash::FxHashSet;

use ContextProperty::*;

/// One sent symbol plus the facts the effective-predecessor rules need
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub symbol: Symbol,
    /// HandshakeUnfinished held when the symbol was sent
    pub during_handshake: bool,
    /// Tls13Flow held when the symbol was sent
    pub tls13: bool,
    /// The peer answered (HelloRequest followed by a ClientHello)
    pub answered: bool,
    /// Renegotiation attempt refused with a warning alert
    pub rejected: bool,
    /// Application data interleaved with a renegotiation in progress
    pub renegotiation_race: bool,
    context_before: Option<FxHashSet<ContextProperty>>,
}

impl SentRecord {
    pub fn symbol_type(&self) -> SymbolType {
        self.symbol.symbol_type()
    }
}

/// Active context properties for one path replay
#[derive(Debug, Clone)]
pub struct ContextPropertyContainer {
    active: FxHashSet<ContextProperty>,
    cursor: Option<StateId>,
    history: Vec<SentRecord>,
}

impl Default for ContextPropertyContainer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ContextPropertyContainer {
    /// Fresh container: only HandshakeUnfinished is set
    pub fn new(cursor: Option<StateId>) -> Self {
        let mut active = FxHashSet::default();
        active.insert(HandshakeUnfinished);
        Self {
            active,
            cursor,
            history: Vec::new(),
        }
    }

    /// Replay `path` against `automaton`, reading responses from stored outputs
    pub fn replay<A: MealyView + ?Sized>(automaton: &A, path: &[Symbol]) -> Self {
        let mut ctx = Self::new(Some(automaton.initial_state()));
        for symbol in path {
            ctx.step_through(automaton, symbol);
        }
        ctx
    }

    /// Apply one symbol, taking its response from the automaton transition
    pub fn step_through<A: MealyView + ?Sized>(&mut self, automaton: &A, symbol: &Symbol) {
        let transition = self
            .cursor
            .and_then(|state| automaton.transition(state, symbol));
        self.update_context_for_sent(symbol);
        self.update_context_for_response(transition.map(|(_, output)| output));
        self.advance(transition.map(|(target, _)| target));
    }

    /// Apply one symbol with an explicitly observed response (no automaton)
    pub fn observe(&mut self, symbol: &Symbol, response: &Response) {
        self.update_context_for_sent(symbol);
        self.update_context_for_response(Some(response));
    }

    pub fn cursor(&self) -> Option<StateId> {
        self.cursor
    }

    pub fn advance(&mut self, next: Option<StateId>) {
        self.cursor = next;
    }

    pub fn history(&self) -> &[SentRecord] {
        &self.history
    }

    pub fn has(&self, property: ContextProperty) -> bool {
        self.active.contains(&property)
    }

    /// Active properties, sorted
    pub fn properties(&self) -> Vec<ContextProperty> {
        let mut props: Vec<_> = self.active.iter().copied().collect();
        props.sort();
        props
    }

    pub fn active_set(&self) -> &FxHashSet<ContextProperty> {
        &self.active
    }

    /// `Not(X)` holds iff X is absent; every `Is(X)` must be present
    pub fn does_properties_apply(&self, props: &[Prop]) -> bool {
        props.iter().all(|prop| match prop {
            Prop::Is(p) => self.active.contains(p),
            Prop::Not(p) => !self.active.contains(p),
        })
    }

    /// `Is(X)` adds X; `Not(X)` removes X (no negative state is stored)
    pub fn set_context_properties(&mut self, props: &[Prop]) {
        for prop in props {
            match prop {
                Prop::Is(p) => {
                    self.active.insert(*p);
                }
                Prop::Not(p) => {
                    self.active.remove(p);
                }
            }
        }
    }

    /// New full handshake: drop InHandshake and Established tiers
    pub fn handshake_started_property_update(&mut self) {
        self.active.retain(|p| {
            !matches!(
                p.tier(),
                PropertyTier::InHandshake | PropertyTier::Established
            )
        });
        self.active.insert(HandshakeUnfinished);
    }

    /// Connection reset: only CrossConnection properties survive
    pub fn connection_reset_property_update(&mut self) {
        self.active
            .retain(|p| p.tier() == PropertyTier::CrossConnection);
        self.active.insert(HandshakeUnfinished);
    }

    /// Handshake completed: drop InHandshake tier, mark established
    pub fn handshake_finished_property_update(&mut self) {
        self.active.retain(|p| p.tier() != PropertyTier::InHandshake);
        self.active.insert(HandshakeFinishedCorrectly);
        self.active.insert(HandshakeCompletedOnce);
        if self.has(Tls12Flow) {
            self.active.insert(CanResumeSessionId);
        }
    }

    /// Whether the prior session state a resuming hello needs was observed
    pub fn can_resume(&self, kind: ResumptionKind) -> bool {
        match kind {
            ResumptionKind::Tls12SessionId => self.has(CanResumeSessionId),
            ResumptionKind::Tls12Ticket => self.has(CanResumeTicket),
            ResumptionKind::Tls13Psk | ResumptionKind::Tls13EarlyData => self.has(CanResumeTls13),
        }
    }

    pub fn update_context_for_sent(&mut self, symbol: &Symbol) {
        let mut record = SentRecord {
            symbol: *symbol,
            during_handshake: self.has(HandshakeUnfinished),
            tls13: self.has(Tls13Flow),
            answered: false,
            rejected: false,
            renegotiation_race: matches!(symbol, Symbol::ApplicationData)
                && self.has(HandshakeUnfinished)
                && self.has(HandshakeCompletedOnce),
            context_before: None,
        };

        match symbol {
            Symbol::ClientHello(params) => {
                if self.has(HelloRetryExchanged) {
                    // Second hello answering a retry request
                    self.active.remove(&HelloRetryExchanged);
                } else {
                    record.context_before = self.renegotiation_snapshot();
                    self.handshake_started_property_update();
                }
                self.apply_hello_params(params);
            }
            Symbol::ResumingHello(kind) => {
                record.context_before = self.renegotiation_snapshot();
                self.handshake_started_property_update();
                self.active.insert(InResumptionFlow);
                match kind.version() {
                    ProtocolVersion::Tls12 => {
                        self.active.insert(Tls12Flow);
                    }
                    ProtocolVersion::Tls13 => {
                        self.active.insert(Tls13Flow);
                        self.active.insert(EphemeralKeyExchange);
                    }
                }
                if *kind == ResumptionKind::Tls13EarlyData {
                    self.active.insert(EarlyDataOffered);
                }
            }
            Symbol::ServerHello(params) => {
                if self.has(HandshakeFinishedCorrectly) {
                    self.handshake_started_property_update();
                }
                self.apply_hello_params(params);
            }
            Symbol::HelloRetryRequest => {
                self.active.insert(HelloRetryExchanged);
            }
            Symbol::Certificate => {
                self.active.insert(CertificateSent);
            }
            Symbol::CertificateRequest => {
                self.active.insert(ClientAuthRequested);
            }
            Symbol::ChangeCipherSpec => {
                self.active.insert(CcsSent);
            }
            Symbol::Finished => {
                self.active.insert(FinishedSent);
            }
            Symbol::EndOfEarlyData => {
                self.active.remove(&EarlyDataOffered);
            }
            Symbol::BleichenbacherProbe { .. } => {
                self.active.insert(BleichenbacherPath);
            }
            Symbol::ResetConnection => {
                self.connection_reset_property_update();
            }
            _ => {}
        }

        self.history.push(record);
        self.check_handshake_finished();
    }

    pub fn update_context_for_response(&mut self, response: Option<&Response>) {
        let Some(fingerprint) = response.and_then(|r| r.fingerprint()) else {
            return;
        };
        let last_sent = self.history.last().map(|r| r.symbol_type());

        let mut peer_hello = false;
        let mut renegotiation_refused = false;
        for message in &fingerprint.messages {
            match message.kind {
                MessageKind::NewSessionTicket => {
                    if self.has(Tls13Flow) {
                        self.active.insert(CanResumeTls13);
                    } else if self.has(Tls12Flow) {
                        self.active.insert(CanResumeTicket);
                    }
                }
                MessageKind::Finished => {
                    self.active.insert(PeerFinishedReceived);
                }
                MessageKind::CertificateRequest => {
                    self.active.insert(ClientAuthRequested);
                }
                MessageKind::HelloRetryRequest => {
                    self.active.insert(HelloRetryExchanged);
                }
                MessageKind::ClientHello => peer_hello = true,
                MessageKind::Alert
                    if message.alert == Some(AlertDescription::NO_RENEGOTIATION) =>
                {
                    renegotiation_refused = true;
                }
                _ => {}
            }
        }

        if peer_hello && last_sent == Some(SymbolType::HelloRequest) {
            if let Some(record) = self.history.last_mut() {
                record.answered = true;
            }
            self.handshake_started_property_update();
        }

        if renegotiation_refused {
            let restored = self
                .history
                .last_mut()
                .and_then(|record| {
                    record.context_before.take().map(|before| {
                        record.rejected = true;
                        before
                    })
                });
            if let Some(before) = restored {
                self.active = before;
                self.active.insert(RenegotiationRejected);
            }
        }

        self.check_handshake_finished();
    }

    fn apply_hello_params(&mut self, params: &HelloParams) {
        match params.version {
            ProtocolVersion::Tls12 => {
                self.active.remove(&Tls13Flow);
                self.active.insert(Tls12Flow);
            }
            ProtocolVersion::Tls13 => {
                self.active.remove(&Tls12Flow);
                self.active.insert(Tls13Flow);
            }
        }
        if params.suite.is_ephemeral() {
            self.active.insert(EphemeralKeyExchange);
        } else {
            self.active.insert(RsaKeyExchange);
        }
    }

    fn renegotiation_snapshot(&self) -> Option<FxHashSet<ContextProperty>> {
        self.has(HandshakeCompletedOnce)
            .then(|| self.active.clone())
    }

    fn check_handshake_finished(&mut self) {
        if self.has(HandshakeUnfinished)
            && self.has(FinishedSent)
            && self.has(PeerFinishedReceived)
            && !self.has(BleichenbacherPath)
        {
            self.handshake_finished_property_update();
        }
    }
}
