/*
 * Letter Chains
 *
 * A letter chain is one row of the "what may legally follow what" grammar.
 *
 *   Simple  one predecessor type  -> one successor type
 *   Multi   one predecessor type  -> any of a set of successor types
 *   Pool    entry type or any pool member -> any pool member
 *
 * Every chain carries context conditions and a required/optional flag. The
 * same interpreter (`applies_to`) evaluates all shapes.
 */

use crate::features::context::{ContextPropertyContainer, Prop};
use crate::shared::models::SymbolType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainShape {
    Simple {
        from: SymbolType,
        to: SymbolType,
    },
    Multi {
        from: SymbolType,
        to: Vec<SymbolType>,
    },
    Pool {
        entry: SymbolType,
        pool: Vec<SymbolType>,
    },
}

impl ChainShape {
    /// Whether (predecessor, successor) is linked by this shape
    pub fn links(&self, predecessor: SymbolType, successor: SymbolType) -> bool {
        match self {
            Self::Simple { from, to } => {
                SymbolType::matches(predecessor, *from) && SymbolType::matches(successor, *to)
            }
            Self::Multi { from, to } => {
                SymbolType::matches(predecessor, *from)
                    && to.iter().any(|t| SymbolType::matches(successor, *t))
            }
            Self::Pool { entry, pool } => {
                let entered = SymbolType::matches(predecessor, *entry)
                    || pool.iter().any(|p| SymbolType::matches(predecessor, *p));
                entered && pool.iter().any(|p| SymbolType::matches(successor, *p))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterChain {
    pub shape: ChainShape,
    pub conditions: Vec<Prop>,
    pub required: bool,
}

impl LetterChain {
    pub fn simple(from: SymbolType, to: SymbolType) -> Self {
        Self::from_shape(ChainShape::Simple { from, to })
    }

    pub fn multi(from: SymbolType, to: &[SymbolType]) -> Self {
        Self::from_shape(ChainShape::Multi {
            from,
            to: to.to_vec(),
        })
    }

    pub fn pool(entry: SymbolType, pool: &[SymbolType]) -> Self {
        Self::from_shape(ChainShape::Pool {
            entry,
            pool: pool.to_vec(),
        })
    }

    fn from_shape(shape: ChainShape) -> Self {
        Self {
            shape,
            conditions: Vec::new(),
            required: false,
        }
    }

    /// Add context conditions (all must hold)
    pub fn when(mut self, conditions: &[Prop]) -> Self {
        self.conditions.extend_from_slice(conditions);
        self
    }

    /// Mark the successor as mandatory in this context
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn applies_to(
        &self,
        predecessor: SymbolType,
        successor: SymbolType,
        context: &ContextPropertyContainer,
    ) -> bool {
        self.shape.links(predecessor, successor) && context.does_properties_apply(&self.conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::context::ContextProperty;

    #[test]
    fn test_pool_chains_among_members() {
        let chain = LetterChain::pool(
            SymbolType::Finished,
            &[SymbolType::ApplicationData, SymbolType::Heartbeat],
        );
        let ctx = ContextPropertyContainer::default();
        assert!(chain.applies_to(SymbolType::Finished, SymbolType::Heartbeat, &ctx));
        assert!(chain.applies_to(SymbolType::Heartbeat, SymbolType::ApplicationData, &ctx));
        assert!(!chain.applies_to(SymbolType::Finished, SymbolType::Finished, &ctx));
        assert!(!chain.applies_to(SymbolType::ClientHello, SymbolType::Heartbeat, &ctx));
    }

    #[test]
    fn test_conditions_gate_chain() {
        let chain = LetterChain::simple(SymbolType::ChangeCipherSpec, SymbolType::Finished)
            .when(&[Prop::Is(ContextProperty::Tls12Flow)])
            .required();
        let mut ctx = ContextPropertyContainer::default();
        assert!(!chain.applies_to(SymbolType::ChangeCipherSpec, SymbolType::Finished, &ctx));
        ctx.set_context_properties(&[Prop::Is(ContextProperty::Tls12Flow)]);
        assert!(chain.applies_to(SymbolType::ChangeCipherSpec, SymbolType::Finished, &ctx));
        assert!(chain.required);
    }

    #[test]
    fn test_wildcard_predecessor() {
        let chain = LetterChain::multi(
            SymbolType::Any,
            &[SymbolType::ResetConnection, SymbolType::Heartbeat],
        );
        let ctx = ContextPropertyContainer::default();
        assert!(chain.applies_to(SymbolType::CertificateVerify, SymbolType::Heartbeat, &ctx));
        assert!(!chain.applies_to(SymbolType::CertificateVerify, SymbolType::Finished, &ctx));
    }
}
