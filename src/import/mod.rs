//! Importers turning grammar sources into sets of [`Rule`]s.
//!
//! Importers only produce rules; adding them to a [`Grammar`](crate::Grammar)
//! and applying importer specific conventions (such as bison's `$end` and
//! `$accept` symbols) is left to the caller.

mod bison;
mod json;
mod text;

use std::collections::HashSet;
use std::path::Path;

use crate::rule::Rule;
use crate::utils::Result;

pub use bison::{BisonImporter, parse_bison_xml};
pub use json::JsonImporter;
pub use text::TextImporter;

/// A source of grammar rules
pub trait GrammarImporter {
    /// Read the rules defined in the file at `path`, in the order they are
    /// defined and without duplicates
    fn import(&self, path: &Path) -> Result<Vec<Rule>>;
}

/// Drop repeated rules, keeping the first occurrence
fn dedup_rules(rules: impl IntoIterator<Item = Rule>) -> Vec<Rule> {
    let mut seen = HashSet::new();
    rules
        .into_iter()
        .filter(|rule| seen.insert(rule.clone()))
        .collect()
}
