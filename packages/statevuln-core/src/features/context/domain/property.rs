/*
 * Context Properties
 *
 * Boolean facts derived from protocol history. Each property has a lifetime
 * tier deciding which bulk update clears it:
 *
 *   InHandshake      cleared when a handshake starts or finishes correctly
 *   Established      cleared when the next handshake starts
 *   Connection       survives renegotiation, cleared by a connection reset
 *   CrossConnection  survives a connection reset
 *
 * Negations are literals (`Prop::Not`), never stored state.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime tier of a context property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyTier {
    InHandshake,
    Established,
    Connection,
    CrossConnection,
}

/// Context property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContextProperty {
    // InHandshake
    HandshakeUnfinished,
    CcsSent,
    FinishedSent,
    PeerFinishedReceived,
    ClientAuthRequested,
    CertificateSent,
    BleichenbacherPath,
    InResumptionFlow,
    EarlyDataOffered,
    HelloRetryExchanged,

    // Established
    HandshakeFinishedCorrectly,
    Tls12Flow,
    Tls13Flow,
    EphemeralKeyExchange,
    RsaKeyExchange,

    // Connection
    HandshakeCompletedOnce,
    RenegotiationRejected,

    // CrossConnection
    CanResumeSessionId,
    CanResumeTicket,
    CanResumeTls13,
}

impl ContextProperty {
    pub fn tier(&self) -> PropertyTier {
        use ContextProperty::*;
        match self {
            HandshakeUnfinished | CcsSent | FinishedSent | PeerFinishedReceived
            | ClientAuthRequested | CertificateSent | BleichenbacherPath | InResumptionFlow
            | EarlyDataOffered | HelloRetryExchanged => PropertyTier::InHandshake,
            HandshakeFinishedCorrectly | Tls12Flow | Tls13Flow | EphemeralKeyExchange
            | RsaKeyExchange => PropertyTier::Established,
            HandshakeCompletedOnce | RenegotiationRejected => PropertyTier::Connection,
            CanResumeSessionId | CanResumeTicket | CanResumeTls13 => {
                PropertyTier::CrossConnection
            }
        }
    }

    /// Properties whose disagreement between two paths into one state is a confusion
    pub fn is_state_defining(&self) -> bool {
        use ContextProperty::*;
        matches!(
            self,
            HandshakeUnfinished
                | HandshakeFinishedCorrectly
                | Tls12Flow
                | Tls13Flow
                | ClientAuthRequested
                | InResumptionFlow
                | PeerFinishedReceived
                | FinishedSent
        )
    }
}

impl fmt::Display for ContextProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Property literal: `Is(X)` or `Not(X)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prop {
    Is(ContextProperty),
    Not(ContextProperty),
}

impl Prop {
    pub fn property(&self) -> ContextProperty {
        match self {
            Self::Is(p) | Self::Not(p) => *p,
        }
    }

    pub fn is_negating(&self) -> bool {
        matches!(self, Self::Not(_))
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Is(p) => write!(f, "{}", p),
            Self::Not(p) => write!(f, "NOT_{}", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(
            ContextProperty::HandshakeUnfinished.tier(),
            PropertyTier::InHandshake
        );
        assert_eq!(ContextProperty::Tls13Flow.tier(), PropertyTier::Established);
        assert_eq!(
            ContextProperty::RenegotiationRejected.tier(),
            PropertyTier::Connection
        );
        assert_eq!(
            ContextProperty::CanResumeTicket.tier(),
            PropertyTier::CrossConnection
        );
    }

    #[test]
    fn test_prop_display() {
        assert_eq!(Prop::Not(ContextProperty::Tls12Flow).to_string(), "NOT_Tls12Flow");
        assert_eq!(Prop::Is(ContextProperty::Tls12Flow).property(), ContextProperty::Tls12Flow);
    }
}
