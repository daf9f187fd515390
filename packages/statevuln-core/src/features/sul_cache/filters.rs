/*
 * Session Pre-Filters
 *
 * Symbols answered as `IllegalTransition` without touching the live
 * implementation.
 *
 * | Rule                      | Applies                             |
 * |---------------------------|-------------------------------------|
 * | RedundantReset            | reset first in session / after reset |
 * | ResumptionWithoutState    | resuming hello, no prior session    |
 * | ProbeWithoutPrerequisite  | fast mode only                      |
 */

use crate::features::context::{ContextProperty, ContextPropertyContainer};
use crate::shared::models::Symbol;
use std::fmt;

use ContextProperty::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterReason {
    RedundantReset,
    ResumptionWithoutState,
    ProbeWithoutPrerequisite,
}

impl FilterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RedundantReset => "redundant_reset",
            Self::ResumptionWithoutState => "resumption_without_state",
            Self::ProbeWithoutPrerequisite => "probe_without_prerequisite",
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFilter {
    fast: bool,
}

impl SessionFilter {
    pub fn new(fast: bool) -> Self {
        Self { fast }
    }

    pub fn is_fast(&self) -> bool {
        self.fast
    }

    /// Reason to skip `symbol`, given the previous symbol of this session
    pub fn check(
        &self,
        symbol: &Symbol,
        previous: Option<&Symbol>,
        tracker: &ContextPropertyContainer,
    ) -> Option<FilterReason> {
        match symbol {
            Symbol::ResetConnection if previous.map_or(true, Symbol::is_reset) => {
                Some(FilterReason::RedundantReset)
            }
            Symbol::ResumingHello(kind) if !tracker.can_resume(*kind) => {
                Some(FilterReason::ResumptionWithoutState)
            }
            _ if self.fast && !probe_prerequisite_met(symbol, tracker) => {
                Some(FilterReason::ProbeWithoutPrerequisite)
            }
            _ => None,
        }
    }
}

fn probe_prerequisite_met(symbol: &Symbol, tracker: &ContextPropertyContainer) -> bool {
    let required: &[ContextProperty] = match symbol {
        // Premaster oracle only means something on an RSA key exchange
        Symbol::BleichenbacherProbe { .. } => &[HandshakeUnfinished, RsaKeyExchange],
        // Needs a keyed TLS 1.2 record layer
        Symbol::PaddingOracleProbe { .. } => &[HandshakeFinishedCorrectly, Tls12Flow],
        Symbol::InvalidCurveProbe { .. } => &[HandshakeUnfinished, EphemeralKeyExchange],
        _ => return true,
    };
    required.iter().all(|p| tracker.has(*p))
}
