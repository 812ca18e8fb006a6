use log::debug;
use regex::{Captures, Regex};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tempfile::NamedTempFile;

use super::{GrammarImporter, dedup_rules};
use crate::rule::Rule;
use crate::utils::{GrammarError, Result};

static RULE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<rule\b[^>]*>(.*?)</rule>").unwrap());
static LHS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<lhs>(.*?)</lhs>").unwrap());
static RHS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<rhs>(.*?)</rhs>").unwrap());
static SYMBOL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<symbol>(.*?)</symbol>").unwrap());
static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").unwrap());

/// Imports yacc grammars by running them through `bison --xml`.
///
/// Bison adds a synthetic root rule `$accept => <start> $end` to every grammar.
/// Both symbols are passed through unchanged.
#[derive(Debug, Clone, Default)]
pub struct BisonImporter {
    /// Replacement `PATH` used to look up the `bison` executable
    pub bison_path: Option<PathBuf>,
}

impl BisonImporter {
    /// Run bison on `path`, leaving its XML report in a temporary file
    fn yacc_to_xml(&self, path: &Path) -> Result<NamedTempFile> {
        let xml_file = NamedTempFile::new()?;

        let mut command = Command::new("bison");
        command
            .arg(format!("--xml={}", xml_file.path().display()))
            .arg("--output=/dev/null")
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(bison_path) = &self.bison_path {
            command.env("PATH", bison_path);
        }

        debug!("Running {:?}", command);
        let status = command.status().map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => GrammarError::ImportToolMissing {
                tool: "bison".to_string(),
                path: self.search_path(),
            },
            _ => GrammarError::Io(err),
        })?;

        if !status.success() {
            return Err(GrammarError::ImportDecodeFailed(path.to_path_buf()));
        }
        Ok(xml_file)
    }

    fn search_path(&self) -> String {
        match &self.bison_path {
            Some(path) => path.display().to_string(),
            None => env::var("PATH").unwrap_or_default(),
        }
    }
}

impl GrammarImporter for BisonImporter {
    fn import(&self, path: &Path) -> Result<Vec<Rule>> {
        let xml_file = self.yacc_to_xml(path)?;
        let xml = fs::read_to_string(xml_file.path())?;
        parse_bison_xml(&xml)
    }
}

/// Extract the rules of a bison XML report. An `<empty/>` rhs becomes an
/// epsilon rule.
pub fn parse_bison_xml(xml: &str) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();

    for rule in RULE_REGEX.captures_iter(xml) {
        let body = &rule[1];
        let lhs = LHS_REGEX
            .captures(body)
            .ok_or_else(|| GrammarError::Parse(format!("rule without lhs: {}", body.trim())))?;
        let rhs = RHS_REGEX
            .captures(body)
            .ok_or_else(|| GrammarError::Parse(format!("rule without rhs: {}", body.trim())))?;

        let symbols = SYMBOL_REGEX
            .captures_iter(&rhs[1])
            .map(|symbol| unescape(symbol[1].trim()));
        rules.push(Rule::new(unescape(lhs[1].trim()), symbols));
    }

    debug!("Decoded {} rules from bison report", rules.len());
    Ok(dedup_rules(rules))
}

/// Decode the predefined XML entities and numeric character references.
/// A reference to an invalid code point is kept as written.
fn unescape(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let decoded = match &caps[1] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                reference => {
                    let digits = &reference[1..];
                    let code = match digits.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => digits.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
