pub mod rule_book;

pub use rule_book::{RuleBook, VersionScope, DEFAULT_IGNORABLE};
