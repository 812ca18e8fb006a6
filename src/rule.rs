use serde::{Deserialize, Serialize};
use std::fmt;

use crate::symbol::Symbol;

/// A production rule: a left-hand side symbol and the ordered sequence of
/// symbols it expands to.
///
/// Rules are plain values. Two rules with the same `lhs` and `rhs` are equal and
/// hash the same, no matter when or where they were created. An empty `rhs` is
/// an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rule {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

impl Rule {
    /// Create a rule `lhs => rhs[0] rhs[1] ...`
    pub fn new<L, I, S>(lhs: L, rhs: I) -> Self
    where
        L: Into<Symbol>,
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Rule {
            lhs: lhs.into(),
            rhs: rhs.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an epsilon production for `lhs`
    pub fn epsilon(lhs: impl Into<Symbol>) -> Self {
        Rule {
            lhs: lhs.into(),
            rhs: Vec::new(),
        }
    }

    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// Whether the rule derives the empty sequence directly
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Symbol, Vec<Symbol>) {
        (self.lhs, self.rhs)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' =>", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " '{}'", symbol)?;
        }
        Ok(())
    }
}

/// Handle of one stored production inside a [`Grammar`](crate::Grammar).
///
/// Ids are minted from a per-grammar monotonic counter and are never reused,
/// not even after the rule they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u64);

impl RuleId {
    pub(crate) fn new(id: u64) -> Self {
        RuleId(id)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
