//! Input alphabet and protocol role

use super::symbol::{Symbol, SymbolType};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Role of the implementation under test
///
/// `Server`: the learner acts as a client and sends client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolRole {
    #[default]
    Server,
    Client,
}

impl ProtocolRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
        }
    }
}

/// Ordered, duplicate-free symbol collection
///
/// Stable for the lifetime of one learning run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct Alphabet {
    symbols: Vec<Symbol>,
}

impl Alphabet {
    /// Build from symbols, keeping the first occurrence of duplicates
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut seen = FxHashSet::default();
        let symbols = symbols.into_iter().filter(|s| seen.insert(*s)).collect();
        Self { symbols }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn contains_all(&self, symbols: &[Symbol]) -> bool {
        symbols.iter().all(|s| self.contains(s))
    }

    pub fn of_type(&self, ty: SymbolType) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(move |s| SymbolType::matches(s.symbol_type(), ty))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }
}

impl From<Vec<Symbol>> for Alphabet {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols)
    }
}

impl From<Alphabet> for Vec<Symbol> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.symbols
    }
}

impl<'a> IntoIterator for &'a Alphabet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
