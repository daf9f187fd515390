//! Built-in rule tables and flow catalog

pub mod client_tables;
pub mod happy_flows;
pub mod server_tables;

pub use happy_flows::HappyFlowCatalog;
