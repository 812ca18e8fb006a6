use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis;
use crate::import::{self, BisonImporter, GrammarImporter};
use crate::rule::{Rule, RuleId};
use crate::sentences::{self, Sentence};
use crate::symbol::Symbol;
use crate::utils::{GrammarError, OptionExt, Result};

/// Symbol the bison importer appends to the root production
pub const END_OF_INPUT: &str = "$end";
/// Synthetic root symbol produced by the bison importer
pub const ACCEPT: &str = "$accept";

/// Configuration options for loading grammars and rendering sentences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Text placed between the terminals of a rendered sentence
    pub separator: String,
    /// Maximum number of sentences a caller should print or hand out.
    /// Enumeration itself is never cut short by this value.
    pub max_sentences: Option<usize>,
    /// Replacement `PATH` used when looking up the `bison` executable
    pub bison_path: Option<PathBuf>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        GrammarConfig {
            separator: " ".to_string(),
            max_sentences: None,
            bison_path: None,
        }
    }
}

impl GrammarConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Join the terminals of a sentence with the configured separator
    pub fn render(&self, sentence: &[Symbol]) -> String {
        sentence
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// Adjacency of a single symbol.
#[derive(Debug, Clone, Default)]
struct SymbolNode {
    /// Rules that have this symbol as their lhs.
    productions: BTreeSet<RuleId>,
    /// Rules that mention this symbol at least once in their rhs.
    occurrences: BTreeSet<RuleId>,
}

#[derive(Debug, Clone)]
struct RuleNode {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

/// A dynamically modifiable context-free grammar.
///
/// The grammar is stored as two owned maps: every symbol knows which rules
/// produce it and which rules mention it, and every [`RuleId`] knows its lhs
/// and its ordered rhs. A symbol is a terminal exactly when it has no
/// productions; nothing else marks it as such.
///
/// Symbols come into existence when a rule mentions them and stay until they
/// are removed explicitly, even when no rule refers to them any more. Use
/// [`Grammar::prune_unreferenced_symbols`] to collect them.
///
/// Every fallible operation validates its input before touching the grammar,
/// so an `Err` means nothing was changed.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    symbols: HashMap<Symbol, SymbolNode>,
    rules: BTreeMap<RuleId, RuleNode>,
    next_rule_id: u64,
    start_symbol: Option<Symbol>,
}

impl Grammar {
    /// Create a new empty grammar
    pub fn new() -> Self {
        Grammar::default()
    }

    /// Load a grammar from a file, picking the importer by file extension
    ///
    /// `.y` and `.yy` files go through bison, `.json` files are read as a list
    /// of rules and everything else is read with the text rule format.
    pub fn from_file<P: AsRef<Path>>(path: P, config: &GrammarConfig) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("y") | Some("yy") => {
                let mut grammar = Grammar::new();
                grammar.load_yacc_file(path, config.bison_path.as_deref())?;
                Ok(grammar)
            }
            Some("json") => Ok(import::JsonImporter.import(path)?.into_iter().collect()),
            _ => Ok(import::TextImporter.import(path)?.into_iter().collect()),
        }
    }

    /// Add the rules of a yacc file by running it through bison.
    ///
    /// Bison wraps the grammar into `$accept => <start> $end`. The end marker
    /// is removed again and `$accept` becomes the start symbol.
    pub fn load_yacc_file<P: AsRef<Path>>(&mut self, path: P, bison_path: Option<&Path>) -> Result<()> {
        let importer = BisonImporter {
            bison_path: bison_path.map(Path::to_path_buf),
        };
        let rules = importer.import(path.as_ref())?;

        let mut staged = self.clone();
        staged.extend(rules);
        staged.remove_symbol(END_OF_INPUT)?;
        staged.set_start_symbol(ACCEPT)?;

        info!(
            "Loaded {} rules from {}",
            staged.len(),
            path.as_ref().display()
        );
        *self = staged;
        Ok(())
    }

    /// Add a rule to the grammar.
    ///
    /// Symbols mentioned by the rule are added when missing. Adding a rule that
    /// is already present does nothing. Returns whether the rule was new.
    pub fn add_rule(&mut self, rule: Rule) -> bool {
        if self.find_rule(rule.lhs(), rule.rhs()).is_some() {
            return false;
        }

        let id = self.mint_rule_id();
        debug!("Adding rule {} as {}", rule, id);

        let (lhs, rhs) = rule.into_parts();
        self.symbols
            .entry(lhs.clone())
            .or_default()
            .productions
            .insert(id);
        for symbol in &rhs {
            self.symbols
                .entry(symbol.clone())
                .or_default()
                .occurrences
                .insert(id);
        }
        self.rules.insert(id, RuleNode { lhs, rhs });

        true
    }

    /// Remove a rule from the grammar, matched by content.
    ///
    /// The symbols of the rule stay in the grammar.
    pub fn remove_rule(&mut self, rule: &Rule) -> Result<()> {
        let matching: Vec<RuleId> = match self.symbols.get(rule.lhs().as_str()) {
            Some(node) => node
                .productions
                .iter()
                .copied()
                .filter(|id| self.rules[id].rhs == rule.rhs())
                .collect(),
            None => Vec::new(),
        };

        if matching.is_empty() {
            return Err(GrammarError::RuleNotFound(rule.clone()));
        }

        for id in matching {
            self.remove_rule_by_id(id);
        }
        Ok(())
    }

    /// Remove a symbol from the grammar.
    ///
    /// Rules with `symbol` as their lhs are removed. Every occurrence of
    /// `symbol` is dropped from the rhs of the remaining rules, which keep their
    /// other symbols in order.
    pub fn remove_symbol(&mut self, symbol: &str) -> Result<()> {
        self.make_symbol_terminal(symbol)?;

        let node = self.symbols.remove(symbol).ok_or_unknown(symbol)?;
        debug!("Removing symbol {}", symbol);

        for id in node.occurrences {
            // An earlier rewrite may have dropped this rule as a duplicate.
            let Some(rule) = self.rules.get(&id) else {
                continue;
            };
            let rhs = rule
                .rhs
                .iter()
                .filter(|s| s.as_str() != symbol)
                .cloned()
                .collect();
            self.rewrite_rhs(id, rhs);
        }

        if self.start_symbol.as_ref().is_some_and(|s| s == symbol) {
            self.start_symbol = None;
        }
        Ok(())
    }

    /// Check whether a symbol is terminal, i.e. has no productions
    pub fn is_symbol_terminal(&self, symbol: &str) -> Result<bool> {
        let node = self.symbols.get(symbol).ok_or_unknown(symbol)?;
        Ok(node.productions.is_empty())
    }

    /// Make a symbol terminal by removing every rule it is the lhs of.
    ///
    /// The symbol itself and the symbols those rules referenced stay.
    pub fn make_symbol_terminal(&mut self, symbol: &str) -> Result<()> {
        let node = self.symbols.get(symbol).ok_or_unknown(symbol)?;
        let productions: Vec<RuleId> = node.productions.iter().copied().collect();

        for id in productions {
            self.remove_rule_by_id(id);
        }
        Ok(())
    }

    /// Remove every symbol that is neither the lhs nor part of an rhs of any
    /// rule. An explicitly set start symbol is kept.
    ///
    /// Returns the removed symbols.
    pub fn prune_unreferenced_symbols(&mut self) -> BTreeSet<Symbol> {
        let unreferenced: BTreeSet<Symbol> = self
            .symbols
            .iter()
            .filter(|(symbol, node)| {
                node.productions.is_empty()
                    && node.occurrences.is_empty()
                    && self.start_symbol.as_ref() != Some(*symbol)
            })
            .map(|(symbol, _)| symbol.clone())
            .collect();

        for symbol in &unreferenced {
            self.symbols.remove(symbol);
        }
        if !unreferenced.is_empty() {
            debug!("Pruned {} unreferenced symbols", unreferenced.len());
        }
        unreferenced
    }

    /// All symbols of the grammar
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.symbols.keys().cloned().collect()
    }

    /// The symbols without productions
    pub fn terminals(&self) -> BTreeSet<Symbol> {
        self.symbols
            .iter()
            .filter(|(_, node)| node.productions.is_empty())
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// The symbols with at least one production
    pub fn nonterminals(&self) -> BTreeSet<Symbol> {
        self.symbols
            .iter()
            .filter(|(_, node)| !node.productions.is_empty())
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// The rules that define the grammar
    pub fn rules(&self) -> BTreeSet<Rule> {
        self.rules.keys().map(|&id| self.rule_by_id(id)).collect()
    }

    /// The rules that have `symbol` as their lhs or anywhere in their rhs.
    ///
    /// An unknown symbol yields no rules.
    pub fn rules_containing(&self, symbol: &str) -> BTreeSet<Rule> {
        match self.symbols.get(symbol) {
            Some(node) => node
                .productions
                .union(&node.occurrences)
                .map(|&id| self.rule_by_id(id))
                .collect(),
            None => BTreeSet::new(),
        }
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    pub fn contains_rule(&self, rule: &Rule) -> bool {
        self.find_rule(rule.lhs(), rule.rhs()).is_some()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the grammar has no rules. It may still hold symbols.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The symbol sentence generation starts from.
    ///
    /// Unless set explicitly, this is the lhs of the oldest rule still present,
    /// or `None` when there are no rules.
    pub fn start_symbol(&self) -> Option<&Symbol> {
        match &self.start_symbol {
            Some(symbol) if self.symbols.contains_key(symbol.as_str()) => Some(symbol),
            _ => self.rules.values().next().map(|rule| &rule.lhs),
        }
    }

    /// Set the start symbol. The symbol must already be part of the grammar.
    pub fn set_start_symbol(&mut self, symbol: &str) -> Result<()> {
        let (symbol, _) = self.symbols.get_key_value(symbol).ok_or_unknown(symbol)?;
        self.start_symbol = Some(symbol.clone());
        Ok(())
    }

    /// An independent copy of the grammar, including its rule id counter and
    /// start symbol
    pub fn copy(&self) -> Grammar {
        self.clone()
    }

    /// Whether derivation from the start symbol is free of recursion.
    ///
    /// A grammar without a start symbol is finite.
    pub fn is_finite(&self) -> bool {
        match self.start_symbol() {
            Some(start) => analysis::is_finite_from(self, start),
            None => true,
        }
    }

    /// A copy of the grammar where every rhs occurrence that closes a
    /// recursion reachable from the start symbol has been dropped.
    pub fn without_loops(&self) -> Grammar {
        let mut pruned = self.copy();
        if let Some(start) = self.start_symbol().cloned() {
            pruned.start_symbol = Some(start.clone());
            analysis::remove_loops(&mut pruned, &start);
        }
        pruned
    }

    /// Every sentence derivable from the start symbol.
    ///
    /// A grammar that is not finite is enumerated on a loop-free copy, so only
    /// derivations that do not recurse are included.
    ///
    /// The number of sentences grows with the product of the alternatives at
    /// every rhs position along a derivation, which quickly becomes huge.
    /// Callers must bound the grammar themselves; nothing here caps it.
    pub fn sentences(&self) -> BTreeSet<Sentence> {
        let Some(start) = self.start_symbol() else {
            return BTreeSet::new();
        };

        let grammar = self.finite_view();
        sentences::SentenceGenerator::new(&grammar).sentences(start)
    }

    /// Derive one sentence by picking a random production at every
    /// nonterminal. Runs on a loop-free copy when the grammar is not finite,
    /// so it always terminates.
    pub fn sample_sentence<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Sentence> {
        let start = self.start_symbol()?;
        let grammar = self.finite_view();
        Some(sentences::SentenceGenerator::new(&grammar).sample(start, rng))
    }

    fn finite_view(&self) -> Cow<'_, Grammar> {
        if self.is_finite() {
            Cow::Borrowed(self)
        } else {
            debug!("Grammar is not finite, generating from a loop-free copy");
            Cow::Owned(self.without_loops())
        }
    }

    pub(crate) fn productions(&self, symbol: &str) -> impl Iterator<Item = RuleId> + '_ {
        self.symbols
            .get(symbol)
            .into_iter()
            .flat_map(|node| node.productions.iter().copied())
    }

    pub(crate) fn rhs(&self, id: RuleId) -> &[Symbol] {
        &self.rules[&id].rhs
    }

    /// The rhs of `id`, or `None` once the rule has been removed
    pub(crate) fn get_rhs(&self, id: RuleId) -> Option<&[Symbol]> {
        self.rules.get(&id).map(|rule| rule.rhs.as_slice())
    }

    /// Replace the rhs of a stored rule, keeping the occurrence index in sync.
    ///
    /// If the new rhs duplicates another production of the same lhs, only the
    /// older of the two ids survives, so the default start symbol never moves.
    pub(crate) fn rewrite_rhs(&mut self, id: RuleId, rhs: Vec<Symbol>) {
        let Some(lhs) = self.rules.get(&id).map(|rule| rule.lhs.clone()) else {
            return;
        };

        match self.find_rule(&lhs, &rhs) {
            Some(other) if other < id => {
                debug!("Dropping {} as a duplicate of {} after rewrite", id, other);
                self.remove_rule_by_id(id);
                return;
            }
            Some(other) if other > id => {
                debug!("Dropping {} as a duplicate of {} after rewrite", other, id);
                self.remove_rule_by_id(other);
            }
            _ => {}
        }

        let Some(rule) = self.rules.get_mut(&id) else {
            return;
        };
        let old = std::mem::replace(&mut rule.rhs, rhs);

        for symbol in &old {
            if let Some(node) = self.symbols.get_mut(symbol.as_str()) {
                node.occurrences.remove(&id);
            }
        }
        for symbol in &self.rules[&id].rhs {
            self.symbols
                .entry(symbol.clone())
                .or_default()
                .occurrences
                .insert(id);
        }
    }

    fn find_rule(&self, lhs: &str, rhs: &[Symbol]) -> Option<RuleId> {
        self.productions(lhs).find(|id| self.rules[id].rhs == rhs)
    }

    fn mint_rule_id(&mut self) -> RuleId {
        let id = RuleId::new(self.next_rule_id);
        self.next_rule_id += 1;
        id
    }

    fn rule_by_id(&self, id: RuleId) -> Rule {
        let node = &self.rules[&id];
        Rule::new(node.lhs.clone(), node.rhs.iter().cloned())
    }

    fn remove_rule_by_id(&mut self, id: RuleId) {
        let Some(rule) = self.rules.remove(&id) else {
            return;
        };
        debug!("Removing rule {}", id);

        if let Some(node) = self.symbols.get_mut(rule.lhs.as_str()) {
            node.productions.remove(&id);
        }
        for symbol in &rule.rhs {
            if let Some(node) = self.symbols.get_mut(symbol.as_str()) {
                node.occurrences.remove(&id);
            }
        }
    }
}

impl Extend<Rule> for Grammar {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, rules: I) {
        for rule in rules {
            self.add_rule(rule);
        }
    }
}

impl FromIterator<Rule> for Grammar {
    fn from_iter<I: IntoIterator<Item = Rule>>(rules: I) -> Self {
        let mut grammar = Grammar::new();
        grammar.extend(rules);
        grammar
    }
}

/// Builder for constructing Grammar instances
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    grammar: Grammar,
    start_symbol: Option<String>,
}

impl GrammarBuilder {
    /// Create a new grammar builder
    pub fn new() -> Self {
        GrammarBuilder::default()
    }

    /// Add a rule to the grammar
    pub fn add_rule(mut self, lhs: &str, rhs: &[&str]) -> Self {
        self.grammar.add_rule(Rule::new(lhs, rhs.iter().copied()));
        self
    }

    /// Add an epsilon production for `lhs`
    pub fn add_epsilon(mut self, lhs: &str) -> Self {
        self.grammar.add_rule(Rule::epsilon(lhs));
        self
    }

    /// Set the start symbol, checked when the grammar is built
    pub fn start_symbol(mut self, symbol: &str) -> Self {
        self.start_symbol = Some(symbol.to_string());
        self
    }

    /// Build the grammar
    pub fn build(self) -> Result<Grammar> {
        let mut grammar = self.grammar;
        if let Some(start) = self.start_symbol {
            grammar.set_start_symbol(&start)?;
        }
        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn symbols(names: &[&str]) -> BTreeSet<Symbol> {
        names.iter().map(|&name| Symbol::from(name)).collect()
    }

    fn sentence(names: &[&str]) -> Sentence {
        names.iter().map(|&name| Symbol::from(name)).collect()
    }

    fn fixture() -> Grammar {
        vec![
            Rule::new("NT_start", ["NT_1"]),
            Rule::new("NT_1", ["t_1", "t_2", "t_2"]),
            Rule::new("NT_1", ["t_3", "t_4", "NT_1"]),
            Rule::new("NT_1", ["t_5", "NT_2"]),
            Rule::epsilon("NT_1"),
            Rule::new("NT_2", ["t_6"]),
            Rule::new("NT_2", ["t_7"]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_symbols() {
        let grammar = fixture();
        assert_eq!(
            grammar.symbols(),
            symbols(&[
                "NT_start", "NT_1", "NT_2", "t_1", "t_2", "t_3", "t_4", "t_5", "t_6", "t_7"
            ])
        );
        assert_eq!(
            grammar.terminals(),
            symbols(&["t_1", "t_2", "t_3", "t_4", "t_5", "t_6", "t_7"])
        );
        assert_eq!(grammar.nonterminals(), symbols(&["NT_start", "NT_1", "NT_2"]));
    }

    #[test]
    fn test_rules_containing() {
        let grammar = fixture();
        let expected: BTreeSet<Rule> = [
            Rule::new("NT_start", ["NT_1"]),
            Rule::new("NT_1", ["t_1", "t_2", "t_2"]),
            Rule::new("NT_1", ["t_3", "t_4", "NT_1"]),
            Rule::new("NT_1", ["t_5", "NT_2"]),
            Rule::epsilon("NT_1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(grammar.rules_containing("NT_1"), expected);
        assert!(grammar.rules_containing("NT_99").is_empty());
    }

    #[test]
    fn test_add_rule_existing() {
        let mut grammar = fixture();
        let before = grammar.rules();

        assert!(!grammar.add_rule(Rule::new("NT_1", ["t_3", "t_4", "NT_1"])));
        assert_eq!(grammar.rules(), before);
        assert_eq!(grammar.len(), 7);
    }

    #[test]
    fn test_remove_rule_keeps_symbols() {
        let mut grammar = fixture();
        grammar.remove_rule(&Rule::new("NT_1", ["t_5", "NT_2"])).unwrap();

        assert!(!grammar.contains_rule(&Rule::new("NT_1", ["t_5", "NT_2"])));
        assert_eq!(grammar.len(), 6);
        assert!(grammar.contains_symbol("t_5"));
        assert!(grammar.rules_containing("t_5").is_empty());
    }

    #[test]
    fn test_remove_rule_not_present() {
        let mut grammar = fixture();
        let before = grammar.rules();

        let err = grammar.remove_rule(&Rule::epsilon("NT_2")).unwrap_err();
        assert!(matches!(err, GrammarError::RuleNotFound(_)));

        let err = grammar.remove_rule(&Rule::epsilon("NT_99")).unwrap_err();
        assert!(matches!(err, GrammarError::RuleNotFound(_)));
        assert_eq!(grammar.rules(), before);
    }

    #[test]
    fn test_remove_symbol() {
        let mut grammar = fixture();
        grammar.remove_symbol("NT_2").unwrap();

        let expected: BTreeSet<Rule> = [
            Rule::new("NT_start", ["NT_1"]),
            Rule::new("NT_1", ["t_1", "t_2", "t_2"]),
            Rule::new("NT_1", ["t_3", "t_4", "NT_1"]),
            Rule::new("NT_1", ["t_5"]),
            Rule::epsilon("NT_1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(grammar.rules(), expected);
        assert!(!grammar.contains_symbol("NT_2"));
        // Retained even though nothing references them any more.
        assert!(grammar.contains_symbol("t_6"));
        assert!(grammar.contains_symbol("t_7"));
    }

    #[test]
    fn test_remove_symbol_repeated_in_rhs() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Rule::new("a", ["b", "c", "b", "d"]));
        grammar.remove_symbol("b").unwrap();

        assert_eq!(grammar.rules(), [Rule::new("a", ["c", "d"])].into_iter().collect());
        assert_eq!(grammar.rules_containing("c").len(), 1);
    }

    #[test]
    fn test_remove_symbol_merges_duplicates() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Rule::new("a", ["b", "c"]));
        grammar.add_rule(Rule::new("a", ["b"]));
        grammar.remove_symbol("c").unwrap();

        assert_eq!(grammar.rules(), [Rule::new("a", ["b"])].into_iter().collect());
        assert_eq!(grammar.len(), 1);
        assert_eq!(grammar.rules_containing("b").len(), 1);
    }

    #[test]
    fn test_remove_symbol_keeps_oldest_duplicate() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Rule::new("a", ["b", "c"]));
        grammar.add_rule(Rule::new("z", ["q"]));
        grammar.add_rule(Rule::new("a", ["b"]));
        grammar.remove_symbol("c").unwrap();

        assert_eq!(grammar.start_symbol().unwrap(), "a");
        assert_eq!(grammar.len(), 2);
        assert!(grammar.contains_rule(&Rule::new("a", ["b"])));
        assert_eq!(grammar.rules_containing("b").len(), 1);
    }

    #[test]
    fn test_without_loops_keeps_start_symbol() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Rule::new("s", ["s"]));
        grammar.add_rule(Rule::new("z", ["q"]));
        grammar.add_rule(Rule::epsilon("s"));

        let pruned = grammar.without_loops();
        assert_eq!(pruned.start_symbol().unwrap(), "s");
        assert!(pruned.is_finite());
        assert_eq!(pruned.rules_containing("s").len(), 1);
        assert_eq!(grammar.sentences(), [sentence(&[])].into_iter().collect());
    }

    #[test]
    fn test_remove_symbol_not_present() {
        let mut grammar = fixture();
        let err = grammar.remove_symbol("NT_99").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownSymbol(ref s) if s == "NT_99"));
        assert_eq!(grammar.len(), 7);
    }

    #[test]
    fn test_make_symbol_terminal() {
        let mut grammar = fixture();
        grammar.make_symbol_terminal("NT_1").unwrap();

        let expected: BTreeSet<Rule> = [
            Rule::new("NT_start", ["NT_1"]),
            Rule::new("NT_2", ["t_6"]),
            Rule::new("NT_2", ["t_7"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(grammar.rules(), expected);
        assert!(grammar.is_symbol_terminal("NT_1").unwrap());
        assert!(grammar.contains_symbol("t_1"));
    }

    #[test]
    fn test_is_symbol_terminal() {
        let grammar = fixture();
        assert!(!grammar.is_symbol_terminal("NT_1").unwrap());
        assert!(grammar.is_symbol_terminal("t_1").unwrap());
        assert!(matches!(
            grammar.is_symbol_terminal("NT_99"),
            Err(GrammarError::UnknownSymbol(_))
        ));
        assert!(matches!(
            Grammar::new().make_symbol_terminal("NT_99"),
            Err(GrammarError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_start_symbol_default() {
        let mut grammar = Grammar::new();
        assert_eq!(grammar.start_symbol(), None);

        let rule = Rule::new("NT_start", ["t_1", "t_2"]);
        grammar.add_rule(rule.clone());
        assert_eq!(grammar.start_symbol().unwrap(), "NT_start");

        grammar.remove_rule(&rule).unwrap();
        assert_eq!(grammar.start_symbol(), None);
    }

    #[test]
    fn test_start_symbol_recomputed_after_removal() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Rule::new("first", ["x"]));
        grammar.add_rule(Rule::new("second", ["y"]));
        grammar.add_rule(Rule::new("third", ["z"]));

        grammar.remove_rule(&Rule::new("first", ["x"])).unwrap();
        assert_eq!(grammar.start_symbol().unwrap(), "second");

        // Re-adding mints a fresh, higher id.
        grammar.add_rule(Rule::new("first", ["x"]));
        assert_eq!(grammar.start_symbol().unwrap(), "second");
    }

    #[test]
    fn test_start_symbol_setter() {
        let mut grammar = fixture();
        grammar.set_start_symbol("NT_1").unwrap();
        assert_eq!(grammar.start_symbol().unwrap(), "NT_1");

        let err = grammar.set_start_symbol("NT_99").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownSymbol(_)));
        assert_eq!(grammar.start_symbol().unwrap(), "NT_1");

        grammar.remove_symbol("NT_1").unwrap();
        assert_eq!(grammar.start_symbol().unwrap(), "NT_start");
    }

    #[test]
    fn test_prune_unreferenced_symbols() {
        let mut grammar = fixture();
        grammar.remove_rule(&Rule::new("NT_2", ["t_6"])).unwrap();
        grammar.make_symbol_terminal("NT_1").unwrap();
        grammar.set_start_symbol("t_1").unwrap();

        let pruned = grammar.prune_unreferenced_symbols();
        assert_eq!(pruned, symbols(&["t_2", "t_3", "t_4", "t_5", "t_6"]));
        assert_eq!(grammar.symbols(), symbols(&["NT_start", "NT_1", "NT_2", "t_7", "t_1"]));
    }

    #[test]
    fn test_copy_is_independent() {
        let grammar = fixture();
        let mut copied = grammar.copy();

        assert_eq!(copied.rules(), grammar.rules());
        assert_eq!(copied.symbols(), grammar.symbols());
        assert_eq!(copied.start_symbol(), grammar.start_symbol());

        let new_rule = Rule::new("NT_1", ["foo"]);
        copied.add_rule(new_rule.clone());
        copied.remove_symbol("NT_2").unwrap();

        assert!(copied.contains_rule(&new_rule));
        assert!(!grammar.contains_rule(&new_rule));
        assert!(grammar.contains_symbol("NT_2"));
    }

    #[test]
    fn test_copy_keeps_rule_id_counter() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Rule::new("a", ["x"]));
        grammar.add_rule(Rule::new("b", ["y"]));
        grammar.remove_rule(&Rule::new("a", ["x"])).unwrap();

        let mut copied = grammar.copy();
        copied.add_rule(Rule::new("a", ["x"]));

        // "a" was re-added with an id above "b"'s.
        assert_eq!(copied.start_symbol().unwrap(), "b");
    }

    #[test]
    fn test_is_finite() {
        let mut grammar = fixture();
        assert!(!grammar.is_finite());

        grammar.remove_rule(&Rule::new("NT_1", ["t_3", "t_4", "NT_1"])).unwrap();
        assert!(grammar.is_finite());

        assert!(Grammar::new().is_finite());
    }

    #[test]
    fn test_sentences() {
        let grammar = fixture();
        let expected: BTreeSet<Sentence> = [
            sentence(&["t_1", "t_2", "t_2"]),
            sentence(&["t_3", "t_4"]),
            sentence(&["t_5", "t_6"]),
            sentence(&["t_5", "t_7"]),
            sentence(&[]),
        ]
        .into_iter()
        .collect();

        assert_eq!(grammar.sentences(), expected);
        // Generating from a pruned copy leaves the grammar untouched.
        assert!(grammar.contains_rule(&Rule::new("NT_1", ["t_3", "t_4", "NT_1"])));
        assert!(Grammar::new().sentences().is_empty());
    }

    #[test]
    fn test_grammar_builder() {
        let grammar = GrammarBuilder::new()
            .add_rule("greeting", &["Hello", "subject"])
            .add_rule("subject", &["world"])
            .add_rule("subject", &["Rust", "programmer"])
            .add_epsilon("subject")
            .start_symbol("greeting")
            .build()
            .unwrap();

        assert_eq!(grammar.len(), 4);
        assert_eq!(grammar.sentences().len(), 3);

        let err = GrammarBuilder::new()
            .add_rule("a", &["b"])
            .start_symbol("missing")
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarError::UnknownSymbol(_)));
    }

    #[test]
    fn test_config_render() {
        let mut config = GrammarConfig::default();
        assert_eq!(config.render(&sentence(&["SELECT", "*"])), "SELECT *");

        config.separator = String::new();
        assert_eq!(config.render(&sentence(&["a", "b"])), "ab");
        assert_eq!(config.render(&[]), "");
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: GrammarConfig = serde_json::from_str(r#"{"max_sentences": 10}"#).unwrap();
        assert_eq!(config.max_sentences, Some(10));
        assert_eq!(config.separator, " ");
        assert_eq!(config.bison_path, None);
    }
}
