use dcfg::{Grammar, GrammarConfig, Rule};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;

/// Build an arithmetic expression grammar, reshape it, and list what it derives
fn main() -> Result<(), Box<dyn Error>> {
    let mut grammar = Grammar::new();
    grammar.add_rule(Rule::new("expr", ["term"]));
    grammar.add_rule(Rule::new("expr", ["term", "+", "expr"]));
    grammar.add_rule(Rule::new("term", ["factor"]));
    grammar.add_rule(Rule::new("term", ["factor", "*", "term"]));
    grammar.add_rule(Rule::new("factor", ["number"]));
    grammar.add_rule(Rule::new("factor", ["(", "expr", ")"]));
    grammar.add_rule(Rule::new("number", ["0"]));
    grammar.add_rule(Rule::new("number", ["1"]));

    let config = GrammarConfig::default();

    println!("Finite: {}", grammar.is_finite());
    println!("Sentences without recursion:");
    for sentence in grammar.sentences() {
        println!("  {}", config.render(&sentence));
    }

    // Drop parenthesized expressions and the multiplication operator
    grammar.remove_rule(&Rule::new("factor", ["(", "expr", ")"]))?;
    grammar.remove_symbol("*")?;
    grammar.prune_unreferenced_symbols();

    println!("\nAfter removing parentheses and `*`:");
    for rule in grammar.rules() {
        println!("  {}", rule);
    }

    let mut rng = StdRng::seed_from_u64(2024);
    println!("\nRandom samples:");
    for _ in 0..5 {
        if let Some(sentence) = grammar.sample_sentence(&mut rng) {
            println!("  {}", config.render(&sentence));
        }
    }

    Ok(())
}
