use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use super::{GrammarImporter, dedup_rules};
use crate::rule::Rule;
use crate::symbol::Symbol;
use crate::utils::{GrammarError, Result};

static RULE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*(.*?)\s*::=\s*\[(.*)\]\s*$").unwrap());
static LHS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<([^<>\s]+)>$").unwrap());

/// Imports the plain text rule format:
///
/// ```text
/// # comment
/// <greeting> ::= ["Hello", <subject>]
/// <subject>  ::= [world]
/// <subject>  ::= []
/// ```
///
/// `<name>` elements, quoted elements and bare words all become plain symbols;
/// whether a symbol is terminal is decided by the grammar. An empty list is an
/// epsilon production. A rule may span several lines until its closing `]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextImporter;

impl TextImporter {
    /// Parse rules from text
    pub fn parse(&self, content: &str) -> Result<Vec<Rule>> {
        let mut rules = Vec::new();
        let mut pending: Option<(usize, String)> = None;

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            // Continuation of a rule spanning multiple lines
            let (start_line, buffer) = match pending.take() {
                Some((start_line, mut buffer)) => {
                    buffer.push(' ');
                    buffer.push_str(trimmed);
                    (start_line, buffer)
                }
                None => (line_number, trimmed.to_string()),
            };

            if !buffer.ends_with(']') {
                if !buffer.contains("::=") {
                    return Err(GrammarError::Parse(format!(
                        "line {}: expected `<symbol> ::= [...]`",
                        start_line
                    )));
                }
                pending = Some((start_line, buffer));
                continue;
            }

            rules.push(Self::parse_rule(&buffer, start_line)?);
        }

        if let Some((start_line, _)) = pending {
            return Err(GrammarError::Parse(format!(
                "line {}: rule is missing its closing `]`",
                start_line
            )));
        }

        Ok(dedup_rules(rules))
    }

    fn parse_rule(text: &str, line: usize) -> Result<Rule> {
        let captures = RULE_REGEX.captures(text).ok_or_else(|| {
            GrammarError::Parse(format!("line {}: expected `<symbol> ::= [...]`", line))
        })?;

        let lhs = LHS_REGEX.captures(&captures[1]).ok_or_else(|| {
            GrammarError::InvalidArgumentType(format!(
                "line {}: lhs must be a single <symbol>, found `{}`",
                line, &captures[1]
            ))
        })?;

        Ok(Rule::new(&lhs[1], Self::parse_production(&captures[2])))
    }

    /// Split the inside of `[...]` into symbols
    pub fn parse_production(elements: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        let mut current_pos = 0;
        let chars: Vec<char> = elements.chars().collect();

        while current_pos < chars.len() {
            // Skip whitespace and separators
            while current_pos < chars.len()
                && (chars[current_pos].is_whitespace() || chars[current_pos] == ',')
            {
                current_pos += 1;
            }

            if current_pos >= chars.len() {
                break;
            }

            let token: String = match chars[current_pos] {
                '<' => {
                    let start_pos = current_pos + 1;
                    while current_pos < chars.len() && chars[current_pos] != '>' {
                        current_pos += 1;
                    }
                    let name = chars[start_pos..current_pos].iter().collect();
                    current_pos += 1; // Skip the '>'
                    name
                }
                quote @ ('"' | '\'') => {
                    let start_pos = current_pos + 1;
                    current_pos += 1;
                    while current_pos < chars.len() && chars[current_pos] != quote {
                        current_pos += 1;
                    }
                    let text = chars[start_pos..current_pos].iter().collect();
                    current_pos += 1; // Skip the closing quote
                    text
                }
                _ => {
                    let start_pos = current_pos;
                    while current_pos < chars.len()
                        && chars[current_pos] != ','
                        && chars[current_pos] != '<'
                        && !chars[current_pos].is_whitespace()
                    {
                        current_pos += 1;
                    }
                    chars[start_pos..current_pos].iter().collect()
                }
            };

            symbols.push(Symbol::from(token));
        }

        symbols
    }
}

impl GrammarImporter for TextImporter {
    fn import(&self, path: &Path) -> Result<Vec<Rule>> {
        let content = fs::read_to_string(path)?;
        self.parse(&content)
    }
}
