/*
 * Responses
 *
 * A response is either a reduced fingerprint of what the implementation sent
 * back (messages, record count, socket state) or the IllegalTransition
 * sentinel.
 *
 * Two equality notions exist:
 * - `PartialEq`: structural, byte-for-byte (payloads included)
 * - `semantically_equals`: payload bytes ignored, used for cache merging and
 *   hypothesis/live comparison
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of a message observed in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    ClientHello,
    ServerHello,
    HelloRetryRequest,
    EncryptedExtensions,
    Certificate,
    CertificateRequest,
    ServerKeyExchange,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    ChangeCipherSpec,
    Finished,
    NewSessionTicket,
    EndOfEarlyData,
    KeyUpdate,
    HelloRequest,
    ApplicationData,
    Heartbeat,
    Alert,
    /// Bytes the protocol engine could not parse as any known message
    Unknown,
}

impl MessageKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::ClientHello => "CH",
            Self::ServerHello => "SH",
            Self::HelloRetryRequest => "HRR",
            Self::EncryptedExtensions => "EE",
            Self::Certificate => "CERT",
            Self::CertificateRequest => "CERT_REQ",
            Self::ServerKeyExchange => "SKE",
            Self::ServerHelloDone => "SHD",
            Self::CertificateVerify => "CV",
            Self::ClientKeyExchange => "CKE",
            Self::ChangeCipherSpec => "CCS",
            Self::Finished => "FIN",
            Self::NewSessionTicket => "NST",
            Self::EndOfEarlyData => "EOED",
            Self::KeyUpdate => "KEY_UPDATE",
            Self::HelloRequest => "HELLO_REQ",
            Self::ApplicationData => "APP",
            Self::Heartbeat => "HEARTBEAT",
            Self::Alert => "ALERT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Alert description code (RFC 8446 §6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertDescription(pub u8);

impl AlertDescription {
    pub const CLOSE_NOTIFY: Self = Self(0);
    pub const UNEXPECTED_MESSAGE: Self = Self(10);
    pub const BAD_RECORD_MAC: Self = Self(20);
    pub const HANDSHAKE_FAILURE: Self = Self(40);
    pub const DECODE_ERROR: Self = Self(50);
    pub const DECRYPT_ERROR: Self = Self(51);
    pub const INTERNAL_ERROR: Self = Self(80);
    pub const NO_RENEGOTIATION: Self = Self(100);
}

/// How the record carrying a message was protected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecordProtection {
    #[default]
    Plaintext,
    Encrypted,
    /// Decryptable with key material the learner should never have been able to derive
    LeakedKeys,
}

/// Socket state after the response was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SocketState {
    #[default]
    Up,
    Closed,
    Reset,
    Timeout,
}

/// One message observed in a response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedMessage {
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertDescription>,
    #[serde(default)]
    pub protection: RecordProtection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<u8>,
}

impl ObservedMessage {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            alert: None,
            protection: RecordProtection::Plaintext,
            payload: Vec::new(),
        }
    }

    pub fn alert(description: AlertDescription) -> Self {
        Self {
            alert: Some(description),
            ..Self::new(MessageKind::Alert)
        }
    }

    pub fn with_protection(mut self, protection: RecordProtection) -> Self {
        self.protection = protection;
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    fn semantically_equals(&self, other: &ObservedMessage) -> bool {
        self.kind == other.kind && self.alert == other.alert && self.protection == other.protection
    }
}

/// Reduced, comparable summary of everything produced for one input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseFingerprint {
    pub messages: Vec<ObservedMessage>,
    pub record_count: usize,
    pub socket: SocketState,
}

impl ResponseFingerprint {
    pub fn new(messages: Vec<ObservedMessage>, record_count: usize, socket: SocketState) -> Self {
        Self {
            messages,
            record_count,
            socket,
        }
    }

    /// Fingerprint with one record per message and an open socket
    pub fn of_kinds(kinds: &[MessageKind]) -> Self {
        Self::new(
            kinds.iter().copied().map(ObservedMessage::new).collect(),
            kinds.len(),
            SocketState::Up,
        )
    }

    /// Cheap bucket key used before deep comparison
    pub fn structural_key(&self) -> (usize, usize) {
        (self.record_count, self.messages.len())
    }

    pub fn semantically_equals(&self, other: &ResponseFingerprint) -> bool {
        self.structural_key() == other.structural_key()
            && self.socket == other.socket
            && self
                .messages
                .iter()
                .zip(&other.messages)
                .all(|(a, b)| a.semantically_equals(b))
    }

    /// Copy with every payload larger than `limit` bytes dropped
    pub fn reduced(&self, limit: usize) -> ResponseFingerprint {
        let mut reduced = self.clone();
        for message in &mut reduced.messages {
            if message.payload.len() > limit {
                message.payload = Vec::new();
            }
        }
        reduced
    }

    pub fn kinds(&self) -> impl Iterator<Item = MessageKind> + '_ {
        self.messages.iter().map(|m| m.kind)
    }

    pub fn contains(&self, kind: MessageKind) -> bool {
        self.messages.iter().any(|m| m.kind == kind)
    }

    pub fn contains_alert(&self, description: AlertDescription) -> bool {
        self.messages
            .iter()
            .any(|m| m.kind == MessageKind::Alert && m.alert == Some(description))
    }
}

/// Output of one step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Response {
    Observed(Arc<ResponseFingerprint>),
    /// The implementation rejected or dead-ended this path
    IllegalTransition,
}

impl Response {
    pub fn observed(fingerprint: ResponseFingerprint) -> Self {
        Self::Observed(Arc::new(fingerprint))
    }

    pub fn of_kinds(kinds: &[MessageKind]) -> Self {
        Self::observed(ResponseFingerprint::of_kinds(kinds))
    }

    /// Empty response on an open socket
    pub fn silent() -> Self {
        Self::observed(ResponseFingerprint::new(Vec::new(), 0, SocketState::Up))
    }

    pub fn is_illegal(&self) -> bool {
        matches!(self, Self::IllegalTransition)
    }

    pub fn fingerprint(&self) -> Option<&ResponseFingerprint> {
        match self {
            Self::Observed(fp) => Some(fp),
            Self::IllegalTransition => None,
        }
    }

    pub fn semantically_equals(&self, other: &Response) -> bool {
        match (self, other) {
            (Self::IllegalTransition, Self::IllegalTransition) => true,
            (Self::Observed(a), Self::Observed(b)) => {
                Arc::ptr_eq(a, b) || a.semantically_equals(b)
            }
            _ => false,
        }
    }

    pub fn contains(&self, kind: MessageKind) -> bool {
        self.fingerprint().is_some_and(|fp| fp.contains(kind))
    }

    /// No messages and the socket is no longer usable, or the sentinel
    pub fn is_dead(&self) -> bool {
        match self {
            Self::IllegalTransition => true,
            Self::Observed(fp) => fp.messages.is_empty() && fp.socket != SocketState::Up,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalTransition => write!(f, "ILLEGAL"),
            Self::Observed(fp) => {
                let names: Vec<&str> = fp.kinds().map(|k| k.short_name()).collect();
                if names.is_empty() {
                    write!(f, "-")?;
                } else {
                    write!(f, "{}", names.join(","))?;
                }
                match fp.socket {
                    SocketState::Up => Ok(()),
                    SocketState::Closed => write!(f, "|CLOSED"),
                    SocketState::Reset => write!(f, "|RST"),
                    SocketState::Timeout => write!(f, "|TIMEOUT"),
                }
            }
        }
    }
}

/// Pairwise semantic comparison of two output sequences
pub fn outputs_match(expected: &[Response], observed: &[Response]) -> bool {
    expected.len() == observed.len()
        && expected
            .iter()
            .zip(observed)
            .all(|(a, b)| a.semantically_equals(b))
}
