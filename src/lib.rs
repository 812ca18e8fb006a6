//! A dynamically modifiable context-free grammar.
//!
//! The grammar is an in-memory, editable set of production rules. Rules and
//! symbols can be added and removed at any time, symbols are classified as
//! terminal or nonterminal by whether they have productions, recursion
//! reachable from the start symbol can be detected and cut, and every
//! sentence the grammar derives can be enumerated. It is meant for tools that
//! build and reshape grammars programmatically, such as fuzzers and test-case
//! generators. It does not parse input.
//!
//! # Example
//!
//! ```rust
//! use dcfg::{Grammar, Rule, Symbol};
//!
//! let mut grammar = Grammar::new();
//! grammar.add_rule(Rule::new("S", ["A"]));
//! grammar.add_rule(Rule::new("A", ["x", "y"]));
//! grammar.add_rule(Rule::new("A", ["z"]));
//!
//! let sentences = grammar.sentences();
//! assert_eq!(sentences.len(), 2);
//! assert!(sentences.contains(&vec![Symbol::from("z")]));
//! ```
//!
//! The number of sentences is the product of the alternatives along every
//! derivation, so enumeration can explode on modest grammars. Bound the
//! grammar before calling [`Grammar::sentences`], or draw single sentences
//! with [`Grammar::sample_sentence`].

pub mod analysis;
pub mod grammar;
pub mod import;
pub mod rule;
pub mod sentences;
pub mod symbol;
pub mod utils;

pub use grammar::{Grammar, GrammarBuilder, GrammarConfig};
pub use import::{BisonImporter, GrammarImporter, JsonImporter, TextImporter};
pub use rule::{Rule, RuleId};
pub use sentences::Sentence;
pub use symbol::Symbol;
pub use utils::{GrammarError, Result};
