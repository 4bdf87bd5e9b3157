//! # Stressometer CLI (`stress`)
//!
//! Record how stressed you are, tag the moment, and look back at it.
//!
//! ## Usage
//!
//! ```bash
//! stress --config ./config/stress.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stress init` | Create the SQLite database and run schema migrations |
//! | `stress log <level> [note...]` | Record an entry; `#tags` and `@tags` come from the note |
//! | `stress history` | Full history, oldest first (`--tag`, `--json`) |
//! | `stress recent` | Newest entries with level bars |
//! | `stress tags` | Every tag used so far |
//! | `stress chart` | Terminal chart of levels over time (`--tag`) |
//! | `stress delete <id>` | Delete an entry after confirmation (`--yes` skips it) |
//! | `stress serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! stress init
//! stress log 70 стомлены пасля нарады #праца @шэф
//! stress chart --tag '#праца'
//! ```
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG=debug` for more.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use stressometer::service::StressLog;
use stressometer::{config, delete, history, log_cmd, migrate, server};

/// Stressometer CLI: a local-first stress level journal.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Only `[db].path` is required.
#[derive(Parser)]
#[command(
    name = "stress",
    about = "Stressometer: record stress levels with tagged notes and chart them over time",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/stress.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the users, meters, and logs
    /// tables. Running it multiple times is safe.
    Init,

    /// Record a stress level with an optional note.
    Log {
        /// Stress level from 0 (calm) to 100 (overwhelmed).
        #[arg(value_parser = clap::value_parser!(i64).range(0..=100))]
        level: i64,

        /// Free-text note; `#word` and `@word` become tags. `--tag` may
        /// appear before, between, or after the note words.
        #[arg(num_args = 0..)]
        note: Vec<String>,

        /// Extra tag to attach (repeatable). `#` is added when missing.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Print the full history, oldest first.
    History {
        /// Only entries carrying this tag (e.g. `#праца`).
        #[arg(long)]
        tag: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the newest entries, newest first.
    Recent {
        /// How many entries to show. Defaults to `[history].recent_limit`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List every tag used so far, in first-seen order.
    Tags,

    /// Draw stress levels over time.
    Chart {
        /// Only entries carrying this tag.
        #[arg(long)]
        tag: Option<String>,
    },

    /// Permanently delete an entry.
    Delete {
        /// Entry id, as shown by `history` or `recent`.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

fn init_logging() {
    // stderr keeps stdout clean for `history --json` and scripts.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,sqlx=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        command => {
            let log = StressLog::open(&cfg).await?;
            match command {
                Commands::Log { level, note, tags } => {
                    log_cmd::run_log(&log, level, &note, &tags).await?;
                }
                Commands::History { tag, json } => {
                    history::run_history(&log, tag.as_deref(), json).await?;
                }
                Commands::Recent { limit } => {
                    let limit = limit.unwrap_or(cfg.history.recent_limit);
                    history::run_recent(&log, limit).await?;
                }
                Commands::Tags => {
                    history::run_tags(&log).await?;
                }
                Commands::Chart { tag } => {
                    history::run_chart(&log, tag.as_deref()).await?;
                }
                Commands::Delete { id, yes } => {
                    delete::run_delete(&log, &id, yes).await?;
                }
                Commands::Init | Commands::Serve => {}
            }
        }
    }

    Ok(())
}
