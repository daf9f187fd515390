//! Value objects shared by every feature

pub mod alphabet;
pub mod mealy;
pub mod response;
pub mod symbol;

pub use alphabet::{Alphabet, ProtocolRole};
pub use mealy::{MealyEdge, MealyGraph, MealyMachine};
pub use response::{
    outputs_match, AlertDescription, MessageKind, ObservedMessage, RecordProtection, Response,
    ResponseFingerprint, SocketState,
};
pub use symbol::{
    format_path, HelloParams, ProtocolVersion, ResumptionKind, SuiteCategory, Symbol, SymbolType,
};
