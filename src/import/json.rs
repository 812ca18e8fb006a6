use serde_json::error::Category;
use std::fs;
use std::path::Path;

use super::{GrammarImporter, dedup_rules};
use crate::rule::Rule;
use crate::utils::{GrammarError, Result};

/// Imports a JSON list of rules: `[{"lhs": "S", "rhs": ["A", "b"]}, ...]`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonImporter;

impl JsonImporter {
    /// Parse rules from a JSON document.
    ///
    /// Well-formed JSON holding values of the wrong kind, such as an `rhs`
    /// that is not an array, is reported as [`GrammarError::InvalidArgumentType`].
    pub fn parse(&self, content: &str) -> Result<Vec<Rule>> {
        let rules: Vec<Rule> = serde_json::from_str(content).map_err(|err| match err.classify() {
            Category::Data => GrammarError::InvalidArgumentType(err.to_string()),
            _ => GrammarError::Json(err),
        })?;
        Ok(dedup_rules(rules))
    }
}

impl GrammarImporter for JsonImporter {
    fn import(&self, path: &Path) -> Result<Vec<Rule>> {
        let content = fs::read_to_string(path)?;
        self.parse(&content)
    }
}
