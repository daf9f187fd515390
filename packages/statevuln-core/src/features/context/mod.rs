/*
 * Context Property Engine
 *
 * Derives boolean protocol-history facts from a replayed symbol sequence.
 *
 * Architecture:
 * - Domain: ContextProperty, PropertyTier, Prop literals
 * - Application: ContextPropertyContainer (per-replay state)
 */

pub mod application;
pub mod domain;

pub use application::{ContextPropertyContainer, SentRecord};
pub use domain::{ContextProperty, Prop, PropertyTier};
