//! Effective predecessor: the last sent symbol type that counts for chain matching

use crate::features::context::SentRecord;
use crate::shared::models::SymbolType;

/// Protocol-aware collapse of the sent history
///
/// Skipped when walking backwards:
/// - heartbeats
/// - HelloRequest sent mid-handshake and never answered
/// - rejected renegotiation hellos
/// - application data racing a renegotiation
/// - ChangeCipherSpec mid-handshake, always under TLS 1.3 and only before
///   another ChangeCipherSpec under TLS 1.2
///
/// An exhausted history yields `ResetConnection` (session start).
pub fn effective_last_sent(history: &[SentRecord], successor: SymbolType) -> SymbolType {
    for record in history.iter().rev() {
        let ty = record.symbol_type();
        let skip = match ty {
            SymbolType::Heartbeat => true,
            SymbolType::HelloRequest => record.during_handshake && !record.answered,
            SymbolType::ClientHello | SymbolType::ResumingHello => record.rejected,
            SymbolType::ApplicationData => record.renegotiation_race,
            SymbolType::ChangeCipherSpec if record.during_handshake => {
                record.tls13 || successor == SymbolType::ChangeCipherSpec
            }
            _ => false,
        };
        if !skip {
            return ty;
        }
    }
    SymbolType::ResetConnection
}
