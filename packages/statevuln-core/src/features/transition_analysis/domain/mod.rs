pub mod predecessor;

pub use predecessor::effective_last_sent;
