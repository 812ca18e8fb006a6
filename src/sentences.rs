use log::trace;
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::{BTreeSet, HashMap};

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::utils::merge_expansions;

/// A finite ordered sequence of terminal symbols
pub type Sentence = Vec<Symbol>;

/// Expands symbols of a grammar into the sentences they derive.
///
/// The grammar must be finite from every symbol expanded; callers run this on
/// a loop-free copy otherwise. Expansions are cached per symbol, which is
/// sound because a symbol derives the same sentences wherever it occurs.
pub(crate) struct SentenceGenerator<'g> {
    grammar: &'g Grammar,
    cache: HashMap<&'g str, Vec<Sentence>>,
}

impl<'g> SentenceGenerator<'g> {
    pub(crate) fn new(grammar: &'g Grammar) -> Self {
        SentenceGenerator {
            grammar,
            cache: HashMap::new(),
        }
    }

    /// Every distinct sentence derivable from `start`
    pub(crate) fn sentences(&mut self, start: &'g str) -> BTreeSet<Sentence> {
        self.expand(start).into_iter().collect()
    }

    /// The distinct terminal sequences `symbol` derives. A terminal derives
    /// only itself.
    ///
    /// Symbols are expanded bottom-up from an explicit stack: a symbol is
    /// combined once every symbol in its productions has been cached.
    fn expand(&mut self, symbol: &'g str) -> Vec<Sentence> {
        let grammar = self.grammar;
        let mut pending = vec![symbol];

        while let Some(&current) = pending.last() {
            if self.cache.contains_key(current) {
                pending.pop();
                continue;
            }

            let missing: Vec<&'g str> = grammar
                .productions(current)
                .flat_map(|id| grammar.rhs(id))
                .map(Symbol::as_str)
                .filter(|next| !self.cache.contains_key(next))
                .collect();

            if missing.is_empty() {
                let expansions = self.combine(current);
                trace!("{} expands to {} sentences", current, expansions.len());
                self.cache.insert(current, expansions);
                pending.pop();
            } else {
                pending.extend(missing);
            }
        }

        self.cache.get(symbol).cloned().unwrap_or_default()
    }

    /// Merge the cached expansions of every production of `symbol`. An
    /// epsilon rule yields the empty sentence.
    fn combine(&self, symbol: &str) -> Vec<Sentence> {
        let grammar = self.grammar;
        let mut expansions = BTreeSet::new();
        let mut productions = grammar.productions(symbol).peekable();

        if productions.peek().is_none() {
            expansions.insert(vec![Symbol::from(symbol)]);
        }
        for id in productions {
            let positions: Vec<Vec<Sentence>> = grammar
                .rhs(id)
                .iter()
                .map(|next| self.cache.get(next.as_str()).cloned().unwrap_or_default())
                .collect();
            expansions.extend(merge_expansions(&positions));
        }

        expansions.into_iter().collect()
    }

    /// Derive one sentence from `symbol`, choosing uniformly among the
    /// productions at every nonterminal.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, symbol: &'g str, rng: &mut R) -> Sentence {
        let grammar = self.grammar;
        let mut sentence = Vec::new();
        let mut pending = vec![symbol];

        while let Some(current) = pending.pop() {
            match grammar.productions(current).choose(rng) {
                Some(id) => pending.extend(grammar.rhs(id).iter().rev().map(Symbol::as_str)),
                None => sentence.push(Symbol::from(current)),
            }
        }

        sentence
    }
}
