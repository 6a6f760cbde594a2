use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use bleep::audit::TracingAuditSink;
use bleep::config::Config;
use bleep::moderation::{ModerateOptions, ModerationRequest, Moderator};
use bleep::semantic::ollama::OllamaDetector;
use bleep::words::{ListKind, WordStore};

/// Bleep: obfuscation-resistant profanity detection and censoring.
///
/// Normalizes text to defeat leetspeak, stretching and symbol tricks, matches
/// it against a blacklist/whitelist, optionally asks a semantic detector, and
/// censors what it finds.
#[derive(Parser)]
#[command(name = "bleep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the normalized form of a text
    Normalize {
        /// Text to normalize
        text: String,
    },

    /// Check a text for profanity
    Moderate {
        /// Text to check (read from stdin when omitted)
        text: Option<String>,

        /// Also ask the semantic detector
        #[arg(long)]
        semantic: bool,

        /// Report rule hits with their positions in the original text
        #[arg(long)]
        locate: bool,

        /// Treat the input as a JSON request body: {"text": "...", "useSemantic": true}
        #[arg(long)]
        request: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a censored copy of a text
    Censor {
        /// Text to censor (read from stdin when omitted)
        text: Option<String>,

        /// Also ask the semantic detector
        #[arg(long)]
        semantic: bool,

        /// Censor rule hits by position instead of by literal term
        #[arg(long)]
        locate: bool,
    },

    /// Moderate every line of a file
    Batch {
        /// File with one text per line
        file: PathBuf,

        /// Also ask the semantic detector
        #[arg(long)]
        semantic: bool,

        /// Number of texts to moderate in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Print one JSON result per line
        #[arg(long)]
        json: bool,
    },

    /// Show the configured word list
    Words {
        /// Only show one list (black or white)
        #[arg(long)]
        list: Option<ListKind>,
    },

    /// Report word list entries whose stored normalized form is stale
    CheckWords,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bleep=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { text } => {
            println!("{}", bleep::normalize(&text));
        }

        Commands::Moderate {
            text,
            semantic,
            locate,
            request,
            json,
        } => {
            let config = Config::load()?;
            let input = read_text(text)?;

            let (text, options) = if request {
                let request = ModerationRequest::parse(&input)?;
                let options = request.options();
                (request.text, options)
            } else {
                let options = ModerateOptions {
                    use_semantic: semantic,
                    locate_rule_spans: locate,
                };
                (input, options)
            };

            let moderator = build_moderator(&config, options.use_semantic)?;
            let result = moderator.moderate(&text, &options).await;
            moderator.flush_audit().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let censored = result
                    .contains_profanity
                    .then(|| bleep::censor_result(&text, &result));
                bleep::output::terminal::display_result(&text, &result, censored.as_deref());
            }
        }

        Commands::Censor {
            text,
            semantic,
            locate,
        } => {
            let config = Config::load()?;
            let text = read_text(text)?;
            let options = ModerateOptions {
                use_semantic: semantic,
                locate_rule_spans: locate,
            };

            let moderator = build_moderator(&config, semantic)?;
            let result = moderator.moderate(&text, &options).await;
            moderator.flush_audit().await;
            println!("{}", bleep::censor_result(&text, &result));
        }

        Commands::Batch {
            file,
            semantic,
            concurrency,
            json,
        } => {
            let config = Config::load()?;
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let texts: Vec<String> = contents
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect();

            let moderator = build_moderator(&config, semantic)?;
            let options = ModerateOptions {
                use_semantic: semantic,
                locate_rule_spans: false,
            };

            info!(texts = texts.len(), concurrency, "Moderating batch");
            let results = moderator
                .moderate_batch(&texts, &options, concurrency)
                .await;
            moderator.flush_audit().await;

            if json {
                for result in &results {
                    println!("{}", serde_json::to_string(result)?);
                }
            } else {
                println!(
                    "\n{}",
                    format!("=== Batch ({} texts) ===", texts.len()).bold()
                );
                for (i, (text, result)) in texts.iter().zip(&results).enumerate() {
                    bleep::output::terminal::display_batch_line(i, text, result);
                }
                let flagged = results.iter().filter(|r| r.contains_profanity).count();
                println!("\n  {} of {} texts flagged", flagged, results.len());
            }
        }

        Commands::Words { list } => {
            let config = Config::load()?;
            let path = config.require_words_path()?;
            let (store, _stale) = WordStore::load_json(path)?;
            let terms = match list {
                Some(ListKind::Black) => store.blacklist(),
                Some(ListKind::White) => store.whitelist(),
                None => store.snapshot().as_ref().clone(),
            };
            bleep::output::terminal::display_terms(&terms);
        }

        Commands::CheckWords => {
            let config = Config::load()?;
            let path = config.require_words_path()?;
            let (store, stale) = WordStore::load_json(path)?;
            println!("Word list: {} ({} terms)", path.display(), store.len());
            bleep::output::terminal::display_stale_entries(&stale);
        }
    }

    Ok(())
}

/// Use the argument if given, otherwise read all of stdin.
fn read_text(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            Ok(buffer.trim_end_matches(['\n', '\r']).to_string())
        }
    }
}

/// Build the moderator from configuration.
///
/// The semantic detector is only constructed when the caller asked for it, so
/// rule-only runs never touch the network.
fn build_moderator(config: &Config, with_semantic: bool) -> Result<Moderator> {
    let mut builder = Moderator::builder()
        .default_terms(config.default_terms.terms())
        .semantic_timeout(config.semantic_timeout)
        .audit(Arc::new(TracingAuditSink));

    if let Some(path) = &config.words_path {
        let (store, stale) = WordStore::load_json(path)?;
        if !stale.is_empty() {
            warn!(
                stale = stale.len(),
                "Word list has stale normalized terms; run `bleep check-words`"
            );
        }
        builder = builder.words(Arc::new(store));
    }

    if with_semantic {
        info!(
            url = %config.semantic_url,
            model = %config.semantic_model,
            "Using semantic detector"
        );
        let detector = OllamaDetector::new(
            &config.semantic_url,
            &config.semantic_model,
            config.semantic_timeout,
        )?;
        builder = builder.detector(Arc::new(detector));
    }

    Ok(builder.build())
}
