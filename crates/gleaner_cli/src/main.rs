//! Gleaner CLI - command-line interface for the good-first-issue harvester.

mod commands;
mod config;
mod progress;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "Harvests GitHub good-first-issues into a relational store")]
#[command(
    long_about = "Gleaner searches GitHub for open issues labeled \"good first issue\", keeps \
those whose repository is popular enough, and maintains them in a local \
database together with repository and label data. It is meant to run as a \
scheduled job; a separate serving stack reads the harvested rows."
)]
#[command(after_long_help = r#"EXAMPLES
    Run the full refresh pipeline (new issues, then stale ones):
        $ gleaner refresh

    Only re-validate stale issues, with a larger batch:
        $ gleaner refresh-existing --batch-size 100

    Inspect the result of the last run:
        $ gleaner status

CONFIGURATION
    Gleaner reads configuration from:
      1. ~/.config/gleaner/config.toml (or $XDG_CONFIG_HOME/gleaner/config.toml)
      2. ./gleaner.toml
      3. Environment variables (GLEANER_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GLEANER_DATABASE_URL      Database connection string (default: ~/.local/state/gleaner/gleaner.db)
    GLEANER_GITHUB_TOKEN      GitHub personal access token
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Run the full refresh pipeline: new issues, then stale issues
    Refresh {
        /// Skip discovery of new issues
        #[arg(long)]
        skip_new: bool,

        /// Skip re-validation of existing issues
        #[arg(long)]
        skip_existing: bool,
    },
    /// Re-validate previously harvested issues that have gone stale
    RefreshExisting {
        /// Re-validate issues not refreshed within this many days
        #[arg(short = 'a', long)]
        age_days: Option<u32>,

        /// How many stale issues to re-validate
        #[arg(short = 'b', long)]
        batch_size: Option<u32>,
    },
    /// Show the last refresh operation and row counts
    Status,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gleaner=info,gleaner_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = config::Config::load();
    let cli = Cli::parse();

    // Completions don't need database access.
    if let Commands::Completions { shell } = &cli.command {
        commands::completions::handle_completions(*shell)?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL")?;

    // Ensure the database directory exists for SQLite.
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Refresh {
            skip_new,
            skip_existing,
        } => {
            commands::refresh::handle_refresh(&config, &database_url, skip_new, skip_existing)
                .await?;
        }
        Commands::RefreshExisting {
            age_days,
            batch_size,
        } => {
            commands::refresh::handle_refresh_existing(
                &config,
                &database_url,
                age_days,
                batch_size,
            )
            .await?;
        }
        Commands::Status => {
            commands::status::handle_status(&database_url).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
