/// State-machine finding model
use crate::shared::models::{format_path, Symbol};
use crate::shared::ports::StateId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finding kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueKind {
    NoHappyFlow,
    LeavingHappyFlow,
    UnexpectedResponse,
    StateConfusion,
    CriticalMessageOutOfOrder,
    InternalError,
    KeyblockLeak,
    UnknownMessage,
    RedundantState,
    OddErrorStateTransition,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHappyFlow => "no_happy_flow",
            Self::LeavingHappyFlow => "leaving_happy_flow",
            Self::UnexpectedResponse => "unexpected_response",
            Self::StateConfusion => "state_confusion",
            Self::CriticalMessageOutOfOrder => "critical_message_out_of_order",
            Self::InternalError => "internal_error",
            Self::KeyblockLeak => "keyblock_leak",
            Self::UnknownMessage => "unknown_message",
            Self::RedundantState => "redundant_state",
            Self::OddErrorStateTransition => "odd_error_state_transition",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two prefixes reaching states that should (or should not) coincide
///
/// Confirmed by extending both prefixes with the same suffix, not by
/// replaying a single witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub first_path: Vec<Symbol>,
    pub second_path: Vec<Symbol>,
    pub first_state: StateId,
    pub second_state: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachineIssue {
    pub kind: IssueKind,

    /// Input sequence reproducing the finding
    pub witness: Vec<Symbol>,

    pub reason: String,

    /// Present for findings confirmed by comparing two successor states
    pub divergence: Option<Divergence>,
}

impl StateMachineIssue {
    fn new(kind: IssueKind, witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            witness,
            reason: reason.into(),
            divergence: None,
        }
    }

    pub fn no_happy_flow(flow: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::NoHappyFlow, flow, reason)
    }

    pub fn leaving_happy_flow(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::LeavingHappyFlow, witness, reason)
    }

    pub fn unexpected_response(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::UnexpectedResponse, witness, reason)
    }

    pub fn state_confusion(divergence: Divergence, reason: impl Into<String>) -> Self {
        Self {
            witness: divergence.second_path.clone(),
            divergence: Some(divergence),
            ..Self::new(IssueKind::StateConfusion, Vec::new(), reason)
        }
    }

    pub fn critical_message_out_of_order(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::CriticalMessageOutOfOrder, witness, reason)
    }

    pub fn internal_error(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::InternalError, witness, reason)
    }

    pub fn keyblock_leak(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::KeyblockLeak, witness, reason)
    }

    pub fn unknown_message(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::UnknownMessage, witness, reason)
    }

    pub fn redundant_state(divergence: Divergence, reason: impl Into<String>) -> Self {
        Self {
            witness: divergence.second_path.clone(),
            divergence: Some(divergence),
            ..Self::new(IssueKind::RedundantState, Vec::new(), reason)
        }
    }

    pub fn odd_error_state_transition(witness: Vec<Symbol>, reason: impl Into<String>) -> Self {
        Self::new(IssueKind::OddErrorStateTransition, witness, reason)
    }

    /// Confirmable by replaying `witness` alone
    pub fn is_path_confirmable(&self) -> bool {
        self.divergence.is_none()
    }
}

impl fmt::Display for StateMachineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.kind, format_path(&self.witness), self.reason)
    }
}
