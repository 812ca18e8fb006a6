use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::rule::Rule;
use crate::symbol::Symbol;

/// Custom error types for grammar operations
///
/// Every variant is an expected outcome of bad input supplied by the caller.
/// Operations that fail leave the grammar exactly as it was before the call.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid argument type: {0}")]
    InvalidArgumentType(String),

    #[error("{0} not in symbols")]
    UnknownSymbol(Symbol),

    #[error("{0} not in rules")]
    RuleNotFound(Rule),

    #[error("{tool} executable not found. PATH: {path}")]
    ImportToolMissing { tool: String, path: String },

    #[error("Failed to decode grammar file: {}", .0.display())]
    ImportDecodeFailed(PathBuf),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Trait extension for Option<T> to convert a failed symbol lookup into
/// [`GrammarError::UnknownSymbol`]
pub trait OptionExt<T> {
    fn ok_or_unknown(self, symbol: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unknown(self, symbol: &str) -> Result<T> {
        self.ok_or_else(|| GrammarError::UnknownSymbol(Symbol::from(symbol)))
    }
}

/// Combine independent per-position choices into full sequences.
///
/// `positions[i]` lists the alternatives available at position `i`; each
/// alternative is itself a sequence. The result holds one entry for every way
/// of picking one alternative per position, formed by concatenating the picks
/// in position order. Later positions vary fastest.
///
/// This is the Cartesian product, so an empty `positions` yields exactly one
/// empty sequence and a position without alternatives yields nothing at all.
/// The output size is the product of the alternative counts.
pub fn merge_expansions<T: Clone>(positions: &[Vec<Vec<T>>]) -> Vec<Vec<T>> {
    let mut merged: Vec<Vec<T>> = vec![Vec::new()];

    for alternatives in positions {
        let mut next = Vec::with_capacity(merged.len() * alternatives.len());
        for prefix in &merged {
            for alternative in alternatives {
                let mut sequence = Vec::with_capacity(prefix.len() + alternative.len());
                sequence.extend_from_slice(prefix);
                sequence.extend_from_slice(alternative);
                next.push(sequence);
            }
        }
        merged = next;
    }

    merged
}
