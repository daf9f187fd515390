/*
 * Rule Book
 *
 * Per-role container for the letter-chain and expected-response tables.
 *
 * Version selection (from the current context):
 *   Tls13Flow set -> TLS 1.3 tables
 *   Tls12Flow set -> TLS 1.2 tables
 *   neither       -> union of both
 */

use crate::features::context::{ContextProperty, ContextPropertyContainer};
use crate::features::rules::domain::{ExpectedResponse, LetterChain};
use crate::features::rules::infrastructure::{client_tables, server_tables};
use crate::shared::models::{MessageKind, ProtocolRole};
use serde::{Deserialize, Serialize};

/// Message kinds removed from observed responses before matching
pub const DEFAULT_IGNORABLE: [MessageKind; 2] =
    [MessageKind::ApplicationData, MessageKind::NewSessionTicket];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionScope {
    Tls12,
    Tls13,
    Undetermined,
}

impl VersionScope {
    pub fn of(context: &ContextPropertyContainer) -> Self {
        if context.has(ContextProperty::Tls13Flow) {
            Self::Tls13
        } else if context.has(ContextProperty::Tls12Flow) {
            Self::Tls12
        } else {
            Self::Undetermined
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBook {
    role: ProtocolRole,
    tls12_chains: Vec<LetterChain>,
    tls13_chains: Vec<LetterChain>,
    tls12_responses: Vec<ExpectedResponse>,
    tls13_responses: Vec<ExpectedResponse>,
    ignorable: Vec<MessageKind>,
}

impl RuleBook {
    pub fn for_role(role: ProtocolRole) -> Self {
        match role {
            ProtocolRole::Server => Self::new(
                role,
                server_tables::tls12_chains(),
                server_tables::tls13_chains(),
                server_tables::tls12_responses(),
                server_tables::tls13_responses(),
            ),
            ProtocolRole::Client => Self::new(
                role,
                client_tables::tls12_chains(),
                client_tables::tls13_chains(),
                client_tables::tls12_responses(),
                client_tables::tls13_responses(),
            ),
        }
    }

    pub fn new(
        role: ProtocolRole,
        tls12_chains: Vec<LetterChain>,
        tls13_chains: Vec<LetterChain>,
        tls12_responses: Vec<ExpectedResponse>,
        tls13_responses: Vec<ExpectedResponse>,
    ) -> Self {
        Self {
            role,
            tls12_chains,
            tls13_chains,
            tls12_responses,
            tls13_responses,
            ignorable: DEFAULT_IGNORABLE.to_vec(),
        }
    }

    pub fn with_ignorable(mut self, kinds: &[MessageKind]) -> Self {
        self.ignorable = kinds.to_vec();
        self
    }

    pub fn role(&self) -> ProtocolRole {
        self.role
    }

    pub fn ignorable(&self) -> &[MessageKind] {
        &self.ignorable
    }

    /// Letter chains for the protocol version implied by `context`
    pub fn chains_for<'a>(
        &'a self,
        context: &ContextPropertyContainer,
    ) -> impl Iterator<Item = &'a LetterChain> + 'a {
        let (first, second) = select(VersionScope::of(context), &self.tls12_chains, &self.tls13_chains);
        first.iter().chain(second.iter())
    }

    /// Expected-response rows for the protocol version implied by `context`
    pub fn responses_for<'a>(
        &'a self,
        context: &ContextPropertyContainer,
    ) -> impl Iterator<Item = &'a ExpectedResponse> + 'a {
        let (first, second) =
            select(VersionScope::of(context), &self.tls12_responses, &self.tls13_responses);
        first.iter().chain(second.iter())
    }
}

fn select<'a, T>(scope: VersionScope, tls12: &'a [T], tls13: &'a [T]) -> (&'a [T], &'a [T]) {
    match scope {
        VersionScope::Tls12 => (tls12, &[]),
        VersionScope::Tls13 => (tls13, &[]),
        VersionScope::Undetermined => (tls12, tls13),
    }
}
