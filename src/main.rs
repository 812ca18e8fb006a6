use clap::{ArgAction, Parser, Subcommand};
use dcfg::{Grammar, GrammarConfig};
use log::{LevelFilter, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

/// Dynamically modifiable context-free grammar tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory list searched for the bison executable
    #[arg(long, global = true)]
    bison_path: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every sentence the grammar derives
    Sentences {
        /// Grammar file (.y/.yy bison, .json rule list, otherwise text rules)
        grammar_file: PathBuf,

        /// Symbol to derive from instead of the grammar's start symbol
        #[arg(short, long)]
        start: Option<String>,

        /// Print at most this many sentences
        #[arg(short, long)]
        limit: Option<usize>,

        /// Text placed between terminals
        #[arg(long)]
        separator: Option<String>,
    },
    /// Print randomly derived sentences
    Sample {
        grammar_file: PathBuf,

        #[arg(short, long)]
        start: Option<String>,

        /// Number of sentences to draw
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a summary of the grammar
    Info { grammar_file: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mut config = match &cli.config {
        Some(path) => GrammarConfig::from_file(path)?,
        None => GrammarConfig::default(),
    };
    if cli.bison_path.is_some() {
        config.bison_path = cli.bison_path;
    }

    match cli.command {
        Commands::Sentences {
            grammar_file,
            start,
            limit,
            separator,
        } => {
            if let Some(separator) = separator {
                config.separator = separator;
            }
            let grammar = load(&grammar_file, start.as_deref(), &config)?;
            if !grammar.is_finite() {
                info!("Grammar is not finite, recursive derivations are skipped");
            }

            let limit = limit.or(config.max_sentences).unwrap_or(usize::MAX);
            for sentence in grammar.sentences().iter().take(limit) {
                println!("{}", config.render(sentence));
            }
        }
        Commands::Sample {
            grammar_file,
            start,
            count,
            seed,
        } => {
            let grammar = load(&grammar_file, start.as_deref(), &config)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            for _ in 0..count {
                match grammar.sample_sentence(&mut rng) {
                    Some(sentence) => println!("{}", config.render(&sentence)),
                    None => break,
                }
            }
        }
        Commands::Info { grammar_file } => {
            let grammar = load(&grammar_file, None, &config)?;
            println!("rules:        {}", grammar.len());
            println!("symbols:      {}", grammar.symbols().len());
            println!("terminals:    {}", grammar.terminals().len());
            println!("nonterminals: {}", grammar.nonterminals().len());
            match grammar.start_symbol() {
                Some(start) => println!("start symbol: {}", start),
                None => println!("start symbol: none"),
            }
            println!("finite:       {}", grammar.is_finite());
        }
    }

    Ok(())
}

fn load(
    path: &Path,
    start: Option<&str>,
    config: &GrammarConfig,
) -> Result<Grammar, Box<dyn std::error::Error>> {
    info!("Loading grammar from {}", path.display());
    let mut grammar = Grammar::from_file(path, config)?;
    if let Some(start) = start {
        grammar.set_start_symbol(start)?;
    }
    info!(
        "Loaded {} rules over {} symbols",
        grammar.len(),
        grammar.symbols().len()
    );
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_with_start_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeting.txt");
        fs::write(&path, "<start> ::= [<subject>]\n<subject> ::= [world]\n").unwrap();

        let config = GrammarConfig::default();
        let grammar = load(path.as_path(), Some("subject"), &config).unwrap();
        assert_eq!(grammar.start_symbol().unwrap(), "subject");
        assert!(load(dir.path().join("missing.txt").as_path(), None, &config).is_err());
    }
}
