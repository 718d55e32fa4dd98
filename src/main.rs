// src/main.rs

//! fortuned: timeline archiver and fortune server
//!
//! Harvests a public timeline into a durable local archive, keeps it fresh
//! with a periodic poll, and serves records over HTTP and from the CLI.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use fortuned::config::Config;
use fortuned::error::{AppError, Result};
use fortuned::pipeline::{run_backfill, run_poller};
use fortuned::server;
use fortuned::services::{FeedClient, RetrievalService, TimelineClient};
use fortuned::storage::{LocalStore, RecordStore};

#[derive(Parser, Debug)]
#[command(
    name = "fortuned",
    version = "0.1.0",
    about = "Timeline archiver and fortune server"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Backfill the archive, then poll for new records and serve HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the startup backfill only
    Backfill {
        #[arg(long)]
        target: Option<usize>,
    },
    /// Print one record (random if no position is given)
    Get {
        #[arg(long)]
        position: Option<usize>,
    },
    /// Print the archive in fortune-file format
    Dump {
        #[arg(long)]
        upto: Option<usize>,
    },
    /// Validate the configuration
    Validate,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let store: Arc<dyn RecordStore> =
                Arc::new(LocalStore::open(&config.store.path).await?);
            let feed: Arc<dyn FeedClient> = Arc::new(TimelineClient::new(&config.upstream)?);

            // Startup precondition: the backfill must finish before anything
            // is served; any error here is fatal.
            run_backfill(
                store.as_ref(),
                feed.as_ref(),
                config.ingest.backfill_target,
                config.upstream.page_size,
            )
            .await?;

            let period = Duration::from_secs(config.ingest.poll_interval_secs);
            tokio::spawn(run_poller(Arc::clone(&store), Arc::clone(&feed), period));

            let service = Arc::new(RetrievalService::new(store));
            server::serve(service, &config.server.bind, port).await
        }
        Command::Backfill { target } => {
            let store = LocalStore::open(&config.store.path).await?;
            let feed = TimelineClient::new(&config.upstream)?;
            let target = target.unwrap_or(config.ingest.backfill_target);
            let summary = run_backfill(&store, &feed, target, config.upstream.page_size).await?;
            println!(
                "Stored {} new records in {} pages{}",
                summary.stored,
                summary.pages,
                if summary.exhausted {
                    " (upstream exhausted)"
                } else {
                    ""
                }
            );
            Ok(())
        }
        Command::Get { position } => {
            let store = LocalStore::open(&config.store.path).await?;
            let service = RetrievalService::new(Arc::new(store));
            let text = service.pick(position).await?.ok_or(AppError::NotFound)?;
            println!("{text}");
            Ok(())
        }
        Command::Dump { upto } => {
            let store = LocalStore::open(&config.store.path).await?;
            let service = RetrievalService::new(Arc::new(store));
            let texts = service.dump(upto).await?;
            print!("{}", server::fortune_format(&texts));
            Ok(())
        }
        Command::Validate => {
            println!("Configuration OK");
            Ok(())
        }
    }
}
