//! newsnotes CLI
//!
//! Local entry point over the article store. Every command prints its
//! result as JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use newsnotes::{
    NewsDesk,
    error::Result,
    models::{ArticleId, Config, NoteId},
    storage::LocalStorage,
};

/// newsnotes - scrape articles, save the good ones, keep notes
#[derive(Parser, Debug)]
#[command(name = "newsnotes", version, about = "Scrape, save and annotate news articles")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Storage directory (overrides storage.data_dir)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the configured page and store new articles
    Ingest,

    /// List articles
    List {
        /// List saved articles instead of unsaved ones
        #[arg(long)]
        saved: bool,
    },

    /// Show an article with its notes
    Show { id: String },

    /// Mark an article as saved
    Save { id: String },

    /// Clear an article's saved flag (the article is kept)
    Unsave { id: String },

    /// Manage notes on an article
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
enum NoteCommand {
    /// Attach a new note to an article
    Add { id: String, title: String },

    /// Delete a note and detach it from its article
    Remove { id: String, note_id: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(dir) = cli.storage_dir {
        config.storage.data_dir = dir;
    }

    match cli.command {
        Command::Validate => validate(&config),
        command => run(command, &config).await,
    }
}

fn validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK (endpoint: {})", config.fetcher.endpoint);
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let storage = LocalStorage::open(&config.storage.data_dir).await?;
    let desk = NewsDesk::from_config(config, Arc::new(storage))?;

    match command {
        Command::Ingest => {
            let report = desk.ingest().await?;
            log::info!(
                "Created {}, skipped {}, failed {}",
                report.created,
                report.skipped,
                report.failed
            );
            print_json(&report)?;
        }
        Command::List { saved } => {
            let articles = if saved {
                desk.list_saved().await?
            } else {
                desk.list_unsaved().await?
            };
            print_json(&articles)?;
        }
        Command::Show { id } => {
            let detail = desk.article_detail(&ArticleId::from(id)).await?;
            if !detail.is_consistent() {
                log::warn!(
                    "Article references {} missing note(s)",
                    detail.unresolved.len()
                );
            }
            print_json(&detail)?;
        }
        Command::Save { id } => print_json(&desk.save(&ArticleId::from(id)).await?)?,
        Command::Unsave { id } => print_json(&desk.unsave(&ArticleId::from(id)).await?)?,
        Command::Note { action } => match action {
            NoteCommand::Add { id, title } => {
                print_json(&desk.attach_note(&ArticleId::from(id), &title).await?)?
            }
            NoteCommand::Remove { id, note_id } => print_json(
                &desk
                    .detach_note(&ArticleId::from(id), &NoteId::from(note_id))
                    .await?,
            )?,
        },
        Command::Validate => validate(config)?,
    }

    Ok(())
}
