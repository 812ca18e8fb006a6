//! Finiteness analysis of a grammar.
//!
//! Both routines walk the derivation graph depth-first from a start symbol
//! and track the symbols on the current path. Reaching a symbol that is still
//! on the path means derivation can recurse forever. Reaching a symbol a
//! second time through a different branch (a diamond) is harmless: symbols
//! leave the path on backtrack, and symbols whose subgraph has been fully
//! explored are not descended into again.
//!
//! A rule is only ever reached through its lhs, so a cycle always closes on
//! a symbol, through one rhs occurrence of some rule.
//!
//! The walks keep their own stack of frames instead of recursing, so the
//! depth of a derivation is bounded by memory, not by the thread's stack.

use log::{debug, trace};
use std::collections::HashSet;

use crate::grammar::Grammar;
use crate::rule::RuleId;
use crate::symbol::Symbol;

/// Whether no recursion is reachable from `start`
pub fn is_finite_from(grammar: &Grammar, start: &str) -> bool {
    let mut on_path: HashSet<&str> = HashSet::new();
    let mut finished: HashSet<&str> = HashSet::new();

    on_path.insert(start);
    let mut stack = vec![Frame::new(grammar, start)];

    while let Some(frame) = stack.last_mut() {
        let Some((id, next)) = frame.next_occurrence(grammar) else {
            on_path.remove(frame.symbol);
            finished.insert(frame.symbol);
            stack.pop();
            continue;
        };

        if on_path.contains(next) {
            trace!("{} reaches {} again through {}", frame.symbol, next, id);
            return false;
        }
        if finished.contains(next) {
            continue;
        }
        on_path.insert(next);
        stack.push(Frame::new(grammar, next));
    }

    true
}

/// Drop every rhs occurrence that closes a recursion reachable from `start`.
///
/// Afterwards `is_finite_from(grammar, start)` holds. Every symbol that was
/// reachable before stays reachable, and derivations that never revisit a
/// symbol on their own path are kept. The result depends only on the rules'
/// content.
pub fn remove_loops(grammar: &mut Grammar, start: &Symbol) {
    let mut on_path: HashSet<Symbol> = HashSet::new();
    let mut finished: HashSet<Symbol> = HashSet::new();
    let mut removed = 0;

    on_path.insert(start.clone());
    let mut stack = vec![PruneFrame::new(grammar, start.clone())];

    while let Some(frame) = stack.last_mut() {
        let Some(next) = frame.next_occurrence(grammar) else {
            on_path.remove(&frame.symbol);
            if let Some(frame) = stack.pop() {
                finished.insert(frame.symbol);
            }
            continue;
        };

        if on_path.contains(&next) {
            trace!("Dropping {} from a production of {} to break a loop", next, frame.symbol);
            removed += 1;
            continue;
        }

        frame.keep(next.clone());
        if !finished.contains(&next) {
            on_path.insert(next.clone());
            stack.push(PruneFrame::new(grammar, next));
        }
    }

    debug!("Removed {} recursive occurrences reachable from {}", removed, start);
}

/// Position of the walk inside the productions of one symbol
struct Frame<'g> {
    symbol: &'g str,
    productions: Vec<RuleId>,
    production: usize,
    position: usize,
}

impl<'g> Frame<'g> {
    fn new(grammar: &'g Grammar, symbol: &'g str) -> Self {
        Frame {
            symbol,
            productions: grammar.productions(symbol).collect(),
            production: 0,
            position: 0,
        }
    }

    fn next_occurrence(&mut self, grammar: &'g Grammar) -> Option<(RuleId, &'g str)> {
        while let Some(&id) = self.productions.get(self.production) {
            if let Some(next) = grammar.rhs(id).get(self.position) {
                self.position += 1;
                return Some((id, next.as_str()));
            }
            self.production += 1;
            self.position = 0;
        }
        None
    }
}

/// Like [`Frame`], but owns its symbols so the grammar can be edited while
/// walking it. Each production is rewritten once all of its rhs has been seen.
struct PruneFrame {
    symbol: Symbol,
    /// Productions still to visit, the next one last
    pending: Vec<RuleId>,
    current: Option<Production>,
}

struct Production {
    id: RuleId,
    rhs: Vec<Symbol>,
    position: usize,
    kept: Vec<Symbol>,
}

impl PruneFrame {
    fn new(grammar: &Grammar, symbol: Symbol) -> Self {
        // Visit productions by content, not by id, so the pruned grammar does
        // not depend on the order rules were added in.
        let mut pending: Vec<RuleId> = grammar.productions(&symbol).collect();
        pending.sort_by(|a, b| grammar.rhs(*b).cmp(grammar.rhs(*a)));

        PruneFrame {
            symbol,
            pending,
            current: None,
        }
    }

    /// The next rhs symbol to look at, rewriting each finished production
    fn next_occurrence(&mut self, grammar: &mut Grammar) -> Option<Symbol> {
        loop {
            match self.current.take() {
                Some(mut production) => {
                    if let Some(next) = production.rhs.get(production.position).cloned() {
                        production.position += 1;
                        self.current = Some(production);
                        return Some(next);
                    }
                    if production.kept.len() != production.rhs.len() {
                        grammar.rewrite_rhs(production.id, production.kept);
                    }
                }
                None => {
                    let id = self.pending.pop()?;
                    // A rewrite of a sibling may have merged this rule away.
                    if let Some(rhs) = grammar.get_rhs(id) {
                        self.current = Some(Production {
                            id,
                            rhs: rhs.to_vec(),
                            position: 0,
                            kept: Vec::with_capacity(rhs.len()),
                        });
                    }
                }
            }
        }
    }

    fn keep(&mut self, symbol: Symbol) {
        if let Some(production) = &mut self.current {
            production.kept.push(symbol);
        }
    }
}
