pub mod oracle;

pub use oracle::{probe, EquivalenceOracle};
