use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// An atomic name used in a grammar.
///
/// A symbol carries no terminal/nonterminal flag of its own: whether it is a
/// terminal is decided by the grammar it lives in, by looking at whether it has
/// any productions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol from anything string-like
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    /// The name of this symbol
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Symbol {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol(name.to_string())
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(name)
    }
}

impl From<&String> for Symbol {
    fn from(name: &String) -> Self {
        Symbol(name.clone())
    }
}

impl From<&Symbol> for Symbol {
    fn from(symbol: &Symbol) -> Self {
        symbol.clone()
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_symbol_lookup_by_str() {
        let mut symbols = BTreeSet::new();
        symbols.insert(Symbol::from("expr"));

        assert!(symbols.contains("expr"));
        assert!(!symbols.contains("term"));
    }

    #[test]
    fn test_symbol_serializes_as_plain_string() {
        let symbol = Symbol::new("$accept");
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"$accept\"");
        assert_eq!(symbol, "$accept");
    }
}
