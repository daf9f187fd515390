//! Expected-response rows and the ordered message matcher

use crate::features::context::{ContextPropertyContainer, Prop};
use crate::shared::models::{MessageKind, SymbolType};
use serde::{Deserialize, Serialize};

/// One slot of an expected message sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedMessage {
    pub kind: MessageKind,
    pub required: bool,
    pub multiple: bool,
}

impl ExpectedMessage {
    /// Exactly one
    pub fn one(kind: MessageKind) -> Self {
        Self {
            kind,
            required: true,
            multiple: false,
        }
    }

    /// Zero or one
    pub fn optional(kind: MessageKind) -> Self {
        Self {
            kind,
            required: false,
            multiple: false,
        }
    }

    /// One or more
    pub fn repeated(kind: MessageKind) -> Self {
        Self {
            kind,
            required: true,
            multiple: true,
        }
    }
}

/// Acceptable response shape for a sent symbol type under some context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResponse {
    pub trigger: SymbolType,
    pub conditions: Vec<Prop>,
    pub messages: Vec<ExpectedMessage>,
}

impl ExpectedResponse {
    pub fn new(trigger: SymbolType, messages: &[ExpectedMessage]) -> Self {
        Self {
            trigger,
            conditions: Vec::new(),
            messages: messages.to_vec(),
        }
    }

    /// Empty response expected
    pub fn nothing(trigger: SymbolType) -> Self {
        Self::new(trigger, &[])
    }

    /// Gate on at most two context conditions
    pub fn when(mut self, conditions: &[Prop]) -> Self {
        debug_assert!(
            self.conditions.len() + conditions.len() <= 2,
            "expected-response rows carry at most two conditions"
        );
        self.conditions.extend_from_slice(conditions);
        self
    }

    pub fn applies(&self, sent: SymbolType, context: &ContextPropertyContainer) -> bool {
        SymbolType::matches(sent, self.trigger) && context.does_properties_apply(&self.conditions)
    }

    /// Ordered greedy match after removing ignorable kinds from `observed`
    pub fn accepts(&self, observed: &[MessageKind], ignorable: &[MessageKind]) -> bool {
        let filtered: Vec<MessageKind> = observed
            .iter()
            .copied()
            .filter(|k| !ignorable.contains(k))
            .collect();

        let mut pos = 0;
        for slot in &self.messages {
            let mut consumed = 0;
            while pos < filtered.len() && filtered[pos] == slot.kind {
                pos += 1;
                consumed += 1;
                if !slot.multiple {
                    break;
                }
            }
            if slot.required && consumed == 0 {
                return false;
            }
        }
        pos == filtered.len()
    }
}
