//! medinterp CLI: batch interpretation of parsed medical narratives.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use medinterp::config::InterpreterConfig;
use medinterp::interpreter::Interpreter;
use medinterp::pattern::ParseTree;
use medinterp::thesaurus::ThesaurusGraph;

#[derive(Parser)]
#[command(name = "medinterp", version, about = "Medical narrative interpreter")]
struct Cli {
    /// Interpreter configuration file.
    #[arg(long, global = true, default_value = "medinterp.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret parse trees and print the retained assertions as JSON.
    Interpret {
        /// File with one bracketed parse tree per line.
        #[arg(long)]
        trees: PathBuf,

        /// Override the configured retention threshold.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Fuzzy ontology lookup for a word sequence.
    Concepts {
        /// Words to look up, in order.
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Shortest ancestral path between two words in the thesaurus.
    Sap { word_a: String, word_b: String },

    /// Load every resource and report counts and rejected patterns.
    Check,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = InterpreterConfig::load(&cli.config)?;

    match cli.command {
        Commands::Interpret { trees, threshold } => {
            if let Some(threshold) = threshold {
                config.reasoning.threshold = threshold;
            }
            let content = std::fs::read_to_string(&trees).into_diagnostic()?;
            let trees = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(ParseTree::from_bracketed)
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let interpreter = Interpreter::from_config(&config)?;
            let interpretation = interpreter.interpret(&trees)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&interpretation).into_diagnostic()?
            );
        }

        Commands::Concepts { words } => {
            let interpreter = Interpreter::from_config(&config)?;
            let hits = interpreter.concepts(&words);
            println!("{}", serde_json::to_string_pretty(&hits).into_diagnostic()?);
        }

        Commands::Sap { word_a, word_b } => {
            let thesaurus =
                ThesaurusGraph::load(config.thesaurus.clone(), config.resources.thesaurus_files())?;
            let report = match thesaurus.sap(&word_a, &word_b)? {
                Some(path) => serde_json::json!({
                    "word_a": word_a,
                    "word_b": word_b,
                    "length": path.length,
                    "ancestor": path.ancestor,
                    "ancestor_words": thesaurus.synset_name(path.ancestor)?,
                }),
                None => serde_json::json!({
                    "word_a": word_a,
                    "word_b": word_b,
                    "length": null,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }

        Commands::Check => {
            let interpreter = Interpreter::from_config(&config)?;
            let r = interpreter.resources();
            println!("Concepts:       {}", r.ontology.concept_count());
            println!("Relationships:  {}", r.ontology.relationship_count());
            println!("Skipped names:  {}", r.ontology.skipped_name_count());
            println!("Synsets:        {}", r.thesaurus.synset_count());
            println!("Words:          {}", r.thesaurus.word_count());
            println!("Patterns:       {}", r.patterns.len());
            println!("Binding slots:  {}", r.bindings.len());
            if let Some(crosswalk) = &r.crosswalk {
                println!("Crosswalk:      {}", crosswalk.len());
            }
            for rejected in r.patterns.rejected() {
                println!(
                    "rejected pattern (line {}): {} [{}]",
                    rejected.line, rejected.content, rejected.reason
                );
            }
        }
    }

    Ok(())
}
