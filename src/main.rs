//! LogLens CLI
//!
//! Thin serving layer over the query core: each subcommand maps to one
//! engine operation and prints its result as JSON.

use clap::{Parser, Subcommand};
use loglens::config::Config;
use loglens::engine::LogEngine;
use loglens::query::{LevelFilter, LogFilter, QueryOptions, SortDirection, SortField};
use loglens::types::TimeWindow;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "loglens")]
#[command(about = "Flat-file log ingestion, search and statistics")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/loglens.toml")]
    config: PathBuf,

    /// Log directory override (repeatable)
    #[arg(short, long)]
    directory: Vec<PathBuf>,

    /// Scan directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered hosts
    Hosts,

    /// Fetch a filtered, paginated page of a host's logs
    Logs {
        /// Host to query
        host: String,
        /// Level filter: ALL, INFO, WARN, ERROR or UNKNOWN
        #[arg(long, default_value = "ALL")]
        level: String,
        /// Case-insensitive substring over the process field
        #[arg(long)]
        process: Option<String>,
        /// Case-insensitive substring over the service field
        #[arg(long)]
        service: Option<String>,
        /// Case-insensitive substring over the message field
        #[arg(long)]
        message: Option<String>,
        /// Sort field: timestamp, level, process, service or message
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        direction: String,
        /// Records to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Maximum records in the page
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// Aggregate statistics for a host
    Stats {
        /// Host to aggregate
        host: String,
        /// Time window: 1h, 1d, 1w, 1m or all
        #[arg(long, default_value = "1h")]
        window: String,
    },

    /// Extract raw lines for the external analysis boundary
    Extract {
        /// Host to extract from
        host: String,
        /// Maximum lines to extract (defaults to the configured value)
        #[arg(long)]
        max: Option<usize>,
        /// Level filter: ALL, INFO, WARN, ERROR or UNKNOWN
        #[arg(long, default_value = "ALL")]
        level: String,
        /// Case-insensitive substring over the process field
        #[arg(long)]
        process: Option<String>,
        /// Case-insensitive substring over the service field
        #[arg(long)]
        service: Option<String>,
        /// Case-insensitive substring over the message field
        #[arg(long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if args.verbose {
            "loglens=debug,info"
        } else {
            "loglens=warn,error"
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Load configuration
    let mut config = if args.config.exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    config.apply_env_overrides();

    // Override config with CLI arguments
    if !args.directory.is_empty() {
        config.discovery.directories = args.directory.clone();
    }
    if args.recursive {
        config.discovery.recursive = true;
    }

    config.validate()?;

    let engine = LogEngine::new(config)?;

    match args.command {
        Command::Hosts => {
            print_json(&engine.list_hosts())?;
        }
        Command::Logs {
            host,
            level,
            process,
            service,
            message,
            sort,
            direction,
            offset,
            limit,
        } => {
            let options = QueryOptions {
                filter: parse_filter(&level, process, service, message)?,
                sort_field: sort
                    .as_deref()
                    .map(str::parse::<SortField>)
                    .transpose()?,
                sort_direction: direction.parse::<SortDirection>()?,
                offset,
                limit,
            };
            let page = engine.list_logs(&host, &options).await;
            print_json(&page)?;
        }
        Command::Stats { host, window } => {
            let window = window.parse::<TimeWindow>()?;
            let stats = engine.get_stats(&host, window).await;
            print_json(&stats)?;
        }
        Command::Extract {
            host,
            max,
            level,
            process,
            service,
            message,
        } => {
            let filter = parse_filter(&level, process, service, message)?;
            let max_count = max.unwrap_or(engine.config().analysis.max_lines);
            let lines = engine.prepare_analysis_input(&host, &filter, max_count).await;
            print_json(&lines)?;
        }
    }

    Ok(())
}

fn parse_filter(
    level: &str,
    process: Option<String>,
    service: Option<String>,
    message: Option<String>,
) -> Result<LogFilter, String> {
    Ok(LogFilter {
        level: level.parse::<LevelFilter>()?,
        process,
        service,
        message,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
