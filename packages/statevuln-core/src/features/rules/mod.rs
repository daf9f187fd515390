/*
 * Transition Rules
 *
 * Declarative grammar of legal symbol orderings plus acceptable response
 * shapes, evaluated by one generic interpreter.
 *
 * Architecture:
 * - Domain: LetterChain, ExpectedResponse
 * - Infrastructure: per-role tables, happy-flow catalog
 * - Application: RuleBook (version-aware table selection)
 */

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{RuleBook, VersionScope};
pub use domain::{ChainShape, ExpectedMessage, ExpectedResponse, LetterChain};
pub use infrastructure::HappyFlowCatalog;
