/*
 * Input Symbols
 *
 * One closed tagged union for every message the learner can send, plus the
 * symbol-type enumeration used by rule tables.
 *
 * Wildcard types (AnyClientHello, AnyProbe, Any) only ever appear in rule
 * patterns. They are resolved by `SymbolType::matches`, never by equality.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version negotiated by a hello
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtocolVersion {
    Tls12,
    Tls13,
}

impl ProtocolVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tls12 => "TLS12",
            Self::Tls13 => "TLS13",
        }
    }
}

/// Key exchange category of the offered/selected cipher suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuiteCategory {
    Rsa,
    Dhe,
    Ecdhe,
}

impl SuiteCategory {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Dhe | Self::Ecdhe)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Dhe => "DHE",
            Self::Ecdhe => "ECDHE",
        }
    }
}

/// Parameters of a ClientHello / ServerHello symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HelloParams {
    pub suite: SuiteCategory,
    pub version: ProtocolVersion,
}

impl HelloParams {
    pub fn new(suite: SuiteCategory, version: ProtocolVersion) -> Self {
        Self { suite, version }
    }

    pub fn tls12(suite: SuiteCategory) -> Self {
        Self::new(suite, ProtocolVersion::Tls12)
    }

    pub fn tls13() -> Self {
        Self::new(SuiteCategory::Ecdhe, ProtocolVersion::Tls13)
    }
}

/// Which prior session state a resuming hello relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResumptionKind {
    Tls12SessionId,
    Tls12Ticket,
    Tls13Psk,
    Tls13EarlyData,
}

impl ResumptionKind {
    pub fn version(&self) -> ProtocolVersion {
        match self {
            Self::Tls12SessionId | Self::Tls12Ticket => ProtocolVersion::Tls12,
            Self::Tls13Psk | Self::Tls13EarlyData => ProtocolVersion::Tls13,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Tls12SessionId => "TLS12_ID",
            Self::Tls12Ticket => "TLS12_TICKET",
            Self::Tls13Psk => "TLS13_PSK",
            Self::Tls13EarlyData => "TLS13_0RTT",
        }
    }
}

/// Symbol type (rule-table key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolType {
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
    ResetConnection,
    ResumingHello,
    BleichenbacherProbe,
    PaddingOracleProbe,
    InvalidCurveProbe,

    // Patterns
    /// ClientHello or ResumingHello
    AnyClientHello,
    /// Any attack probe
    AnyProbe,
    /// Matches every concrete type
    Any,
}

impl SymbolType {
    /// Whether this value is a wildcard pattern rather than a concrete type
    pub fn is_pattern(self) -> bool {
        matches!(self, Self::AnyClientHello | Self::AnyProbe | Self::Any)
    }

    /// Check whether `concrete` is covered by `pattern`
    ///
    /// Concrete patterns match only themselves.
    pub fn matches(concrete: SymbolType, pattern: SymbolType) -> bool {
        match pattern {
            Self::Any => true,
            Self::AnyClientHello => {
                matches!(concrete, Self::ClientHello | Self::ResumingHello)
            }
            Self::AnyProbe => matches!(
                concrete,
                Self::BleichenbacherProbe | Self::PaddingOracleProbe | Self::InvalidCurveProbe
            ),
            exact => concrete == exact,
        }
    }

    pub fn is_probe(self) -> bool {
        Self::matches(self, Self::AnyProbe)
    }

    /// Messages whose misplacement may skip authentication or key agreement
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            Self::ChangeCipherSpec
                | Self::Finished
                | Self::ClientKeyExchange
                | Self::ServerKeyExchange
                | Self::Certificate
                | Self::CertificateVerify
                | Self::ServerHelloDone
                | Self::EncryptedExtensions
        )
    }
}

/// Input symbol sent to the implementation under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    ClientHello(HelloParams),
    ServerHello(HelloParams),
    ResumingHello(ResumptionKind),
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
    ResetConnection,
    /// ClientKeyExchange with a malformed PKCS#1 premaster secret
    BleichenbacherProbe { vector: u8 },
    /// Application data record with manipulated CBC padding
    PaddingOracleProbe { vector: u8 },
    /// Key share with an off-curve (or twisted-curve) point
    InvalidCurveProbe { twisted: bool },
}

impl Symbol {
    pub fn symbol_type(&self) -> SymbolType {
        match self {
            Self::ClientHello(_) => SymbolType::ClientHello,
            Self::ServerHello(_) => SymbolType::ServerHello,
            Self::ResumingHello(_) => SymbolType::ResumingHello,
            Self::HelloRetryRequest => SymbolType::HelloRetryRequest,
            Self::EncryptedExtensions => SymbolType::EncryptedExtensions,
            Self::Certificate => SymbolType::Certificate,
            Self::CertificateRequest => SymbolType::CertificateRequest,
            Self::ServerKeyExchange => SymbolType::ServerKeyExchange,
            Self::ServerHelloDone => SymbolType::ServerHelloDone,
            Self::CertificateVerify => SymbolType::CertificateVerify,
            Self::ClientKeyExchange => SymbolType::ClientKeyExchange,
            Self::ChangeCipherSpec => SymbolType::ChangeCipherSpec,
            Self::Finished => SymbolType::Finished,
            Self::NewSessionTicket => SymbolType::NewSessionTicket,
            Self::EndOfEarlyData => SymbolType::EndOfEarlyData,
            Self::KeyUpdate => SymbolType::KeyUpdate,
            Self::HelloRequest => SymbolType::HelloRequest,
            Self::ApplicationData => SymbolType::ApplicationData,
            Self::Heartbeat => SymbolType::Heartbeat,
            Self::Alert => SymbolType::Alert,
            Self::ResetConnection => SymbolType::ResetConnection,
            Self::BleichenbacherProbe { .. } => SymbolType::BleichenbacherProbe,
            Self::PaddingOracleProbe { .. } => SymbolType::PaddingOracleProbe,
            Self::InvalidCurveProbe { .. } => SymbolType::InvalidCurveProbe,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, Self::ResetConnection)
    }

    pub fn hello_params(&self) -> Option<HelloParams> {
        match self {
            Self::ClientHello(params) | Self::ServerHello(params) => Some(*params),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientHello(p) => write!(f, "CH_{}_{}", p.suite.as_str(), p.version.as_str()),
            Self::ServerHello(p) => write!(f, "SH_{}_{}", p.suite.as_str(), p.version.as_str()),
            Self::ResumingHello(kind) => write!(f, "RESUMING_HELLO_{}", kind.as_str()),
            Self::HelloRetryRequest => write!(f, "HRR"),
            Self::EncryptedExtensions => write!(f, "EE"),
            Self::Certificate => write!(f, "CERT"),
            Self::CertificateRequest => write!(f, "CERT_REQ"),
            Self::ServerKeyExchange => write!(f, "SKE"),
            Self::ServerHelloDone => write!(f, "SHD"),
            Self::CertificateVerify => write!(f, "CV"),
            Self::ClientKeyExchange => write!(f, "CKE"),
            Self::ChangeCipherSpec => write!(f, "CCS"),
            Self::Finished => write!(f, "FIN"),
            Self::NewSessionTicket => write!(f, "NST"),
            Self::EndOfEarlyData => write!(f, "EOED"),
            Self::KeyUpdate => write!(f, "KEY_UPDATE"),
            Self::HelloRequest => write!(f, "HELLO_REQ"),
            Self::ApplicationData => write!(f, "APP"),
            Self::Heartbeat => write!(f, "HEARTBEAT"),
            Self::Alert => write!(f, "ALERT"),
            Self::ResetConnection => write!(f, "RESET"),
            Self::BleichenbacherProbe { vector } => write!(f, "BB_PROBE_{}", vector),
            Self::PaddingOracleProbe { vector } => write!(f, "PO_PROBE_{}", vector),
            Self::InvalidCurveProbe { twisted } => {
                write!(f, "IC_PROBE{}", if *twisted { "_TWIST" } else { "" })
            }
        }
    }
}

/// Render a symbol sequence as `A,B,C`
pub fn format_path(path: &[Symbol]) -> String {
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
