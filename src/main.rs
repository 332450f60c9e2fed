//! # FlashLearn CLI (`flashlearn`)
//!
//! ## Usage
//!
//! ```bash
//! flashlearn --config ./config/flashlearn.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `flashlearn card <topic>` | Generate a flashcard and add it to recent topics |
//! | `flashlearn ask <kind> <topic>` | Run one generation kind without touching the session |
//! | `flashlearn recent` | List recent topics |
//! | `flashlearn again <n>` | Regenerate recent topic `n` |
//! | `flashlearn study` | Interactive study session |
//! | `flashlearn serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! flashlearn card "Rust ownership" --pdf
//! flashlearn ask short-summary "Kubernetes" --json
//! flashlearn again 1 --copy
//! RUST_LOG=flashlearn=debug flashlearn serve
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use flashlearn::actions::Actions;
use flashlearn::clipboard::{copy_card, StdoutClipboard};
use flashlearn::config::{self, Config};
use flashlearn::export::{export_card, PdfExporter};
use flashlearn::file_store::JsonFileStore;
use flashlearn::generation::create_client;
use flashlearn::interactive::{run_study, StudyIo};
use flashlearn::notify::ConsoleNotifier;
use flashlearn::render::{render_card, render_generated, render_recent, Position, Style};
use flashlearn::server;
use flashlearn::session::{Session, SessionError};
use flashlearn_core::store::{load_json, RECENT_TOPICS_KEY};
use flashlearn_core::{Flashcard, GenerationKind, GenerationResult, RecentTopics};

/// FlashLearn: generate study flashcards for any topic.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/flashlearn.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "flashlearn",
    about = "FlashLearn: generate study flashcards for any topic with a large language model",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/flashlearn.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a flashcard for a topic.
    ///
    /// The card is generated with up-to-date information and a difficulty
    /// rating, and the topic is added to the recent topics list.
    Card {
        topic: String,

        /// Also export the card to PDF in `[export].dir`.
        #[arg(long)]
        pdf: bool,

        /// Also print the card as plain text for copying.
        #[arg(long)]
        copy: bool,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a single generation kind.
    ///
    /// Kinds: `flashcard`, `flashcard-plain`, `short-summary`,
    /// `detailed-explanation`. Does not affect recent topics.
    Ask {
        kind: GenerationKind,
        topic: String,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List recent topics, newest first.
    Recent,

    /// Regenerate the flashcard for a recent topic.
    Again {
        /// Position in `flashlearn recent` (1 = newest).
        n: usize,

        #[arg(long)]
        pdf: bool,

        #[arg(long)]
        copy: bool,

        #[arg(long)]
        json: bool,
    },

    /// Interactive study session.
    Study,

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

struct CardOutput {
    pdf: bool,
    copy: bool,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Card {
            topic,
            pdf,
            copy,
            json,
        } => {
            let mut session = open_session(&cfg).await?;
            let outcome = session.submit(&topic).await;
            print_card_outcome(&session, &cfg, outcome, CardOutput { pdf, copy, json })?;
        }
        Commands::Ask { kind, topic, json } => {
            let actions = Actions::new(create_client(&cfg.generation)?);
            let result = actions.perform(kind, &topic).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            match result {
                GenerationResult::Success(generated) if !json => {
                    print!("{}", render_generated(&generated, Style::detect()))
                }
                GenerationResult::Success(_) => {}
                GenerationResult::Failure(message) => {
                    if !json {
                        eprintln!("✗ {}", message);
                    }
                    std::process::exit(1);
                }
            }
        }
        Commands::Recent => {
            let store = JsonFileStore::new(&cfg.session.store_path);
            let stored: Option<Vec<String>> = load_json(&store, RECENT_TOPICS_KEY).await?;
            let recent = RecentTopics::from_stored(stored.unwrap_or_default());
            print!("{}", render_recent(recent.as_slice()));
        }
        Commands::Again {
            n,
            pdf,
            copy,
            json,
        } => {
            if n == 0 {
                anyhow::bail!("Recent topics are numbered from 1");
            }
            let mut session = open_session(&cfg).await?;
            let outcome = session.select_recent_index(n - 1).await;
            print_card_outcome(&session, &cfg, outcome, CardOutput { pdf, copy, json })?;
        }
        Commands::Study => {
            let mut session = open_session(&cfg).await?;
            let exporter = PdfExporter::from_config(&cfg.export);
            let io = StudyIo {
                exporter: &exporter,
                clipboard: &StdoutClipboard,
                style: Style::detect(),
            };
            let stdin = std::io::stdin();
            run_study(&mut session, io, stdin.lock(), std::io::stdout()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

async fn open_session(cfg: &Config) -> Result<Session> {
    let actions = Actions::new(create_client(&cfg.generation)?);
    let store = Arc::new(JsonFileStore::new(&cfg.session.store_path));
    Ok(Session::start(actions, store, Arc::new(ConsoleNotifier)).await)
}

fn print_card_outcome(
    session: &Session,
    cfg: &Config,
    outcome: std::result::Result<GenerationResult<Flashcard>, SessionError>,
    output: CardOutput,
) -> Result<()> {
    let result = outcome?;
    if output.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    // The session has already notified the failure on stderr.
    let GenerationResult::Success(card) = result else {
        std::process::exit(1);
    };

    if !output.json {
        let position = Position {
            index: session.cursor(),
            len: session.history().len(),
            is_new: session.is_current_card_new(),
        };
        print!("{}", render_card(&card, Some(position), Style::detect()));
    }
    if output.copy {
        copy_card(&StdoutClipboard, &card, session.notifier());
    }
    if output.pdf {
        let exporter = PdfExporter::from_config(&cfg.export);
        if export_card(&exporter, &card, session.notifier()).is_none() {
            std::process::exit(1);
        }
    }
    Ok(())
}
