use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexis_simplifier::{
    EvaluationReport, SimplificationOutcome, SimplifierConfig, SimplifierEngine,
};
use serde::Serialize;
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "lexis", version, about = "Lexical simplification for readers with dyslexia")]
struct Cli {
    /// Engine configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides `logging.level` and logs to stderr unless a log path is set.
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simplifies text from an argument, a file, or stdin.
    Simplify(SimplifyArgs),
    /// Compares the readability of two texts.
    Evaluate {
        /// File holding the original text.
        #[arg(long)]
        original: PathBuf,
        /// File holding the simplified text.
        #[arg(long)]
        simplified: PathBuf,
        /// Lists the changed words.
        #[arg(long)]
        diff: bool,
        #[arg(long)]
        json: bool,
    },
    /// Mines a Word Map from a parallel corpus.
    Mine {
        /// Corpus of two-line pairs separated by `*******`.
        #[arg(long)]
        corpus: PathBuf,
        /// Writes the map as JSON instead of printing it.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Shows the engine state after loading the configuration.
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
struct SimplifyArgs {
    /// Text to simplify.
    text: Option<String>,
    /// Reads the text from a file.
    #[arg(long, conflicts_with = "text")]
    input: Option<PathBuf>,
    /// Tier name (beginner, intermediate, advanced, adv-ele, adv-int).
    #[arg(long)]
    tier: Option<String>,
    /// Difficult words of this reader, comma separated.
    #[arg(long, value_delimiter = ',')]
    difficult: Vec<String>,
    /// Appends a readability report.
    #[arg(long)]
    evaluate: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SimplifyOutput<'a> {
    outcome: &'a SimplificationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a EvaluationReport>,
}

fn main() -> Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.log_level)?;
    let mut engine = SimplifierEngine::from_config(config)?;
    match cli.command {
        Commands::Simplify(args) => handle_simplify(&mut engine, args),
        Commands::Evaluate {
            original,
            simplified,
            diff,
            json,
        } => {
            let original = read_text(&original)?;
            let simplified = read_text(&simplified)?;
            let report = engine.evaluate(&original, &simplified);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if diff {
                println!("{report:#}");
            } else {
                println!("{report}");
            }
            Ok(())
        }
        Commands::Mine { corpus, output } => {
            let map = engine.mine_corpus(&corpus)?;
            match output {
                Some(path) => {
                    map.save(&path)?;
                    println!("{} entries written to {}", map.len(), path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&map)?),
            }
            Ok(())
        }
        Commands::Status { json } => {
            let status = engine.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!(
                    "tier {} | word map {} | frequencies {} | keywords {} | antonyms {} | model {}",
                    status.tier,
                    status.word_map_entries,
                    status.frequency_entries,
                    status.keyword_count,
                    status.antonym_entries,
                    if status.model_available { "online" } else { "offline" }
                );
            }
            Ok(())
        }
    }
}

fn handle_simplify(engine: &mut SimplifierEngine, args: SimplifyArgs) -> Result<()> {
    if let Some(tier) = &args.tier {
        engine.set_tier(tier)?;
    }
    if !args.difficult.is_empty() {
        engine.set_difficulty_profile(&args.difficult);
    }
    let text = match (&args.text, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_text(path)?,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            buffer
        }
    };
    let (outcome, report) = if args.evaluate {
        let (outcome, report) = engine.simplify_and_evaluate(&text)?;
        (outcome, Some(report))
    } else {
        (engine.simplify(&text)?, None)
    };
    if args.json {
        let output = SimplifyOutput {
            outcome: &outcome,
            report: report.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    println!("{}", outcome.text);
    eprintln!(
        "replaced {} of {} words ({:.1}%)",
        outcome.replacement_count(),
        outcome.total_words_checked(),
        outcome.session.ratio * 100.0
    );
    if let Some(report) = report {
        println!();
        println!("{report}");
    }
    Ok(())
}

fn load_config(path: Option<&Path>, log_level: Option<LogLevel>) -> Result<SimplifierConfig> {
    let mut config = match path {
        Some(path) => SimplifierConfig::load(path)?,
        None => SimplifierConfig::default(),
    };
    if let Some(level) = log_level {
        config.logging.level = level.as_str().to_string();
        config.logging.stderr = true;
    }
    Ok(config)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
