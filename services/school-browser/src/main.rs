//! Terminal browser for the NYC high school directory.
//!
//! Loads the school list and SAT results from the city's open-data portal,
//! merges them, and lets you search by name:
//! - `--query TEXT` prints the matches once and exits
//! - otherwise an interactive prompt reads queries and `:` commands from stdin

mod config;
mod render;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use school_directory::{DirectoryLoader, DirectoryService};

use config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "school-browser")]
#[command(about = "Search NYC high schools and their SAT results")]
struct Args {
    /// YAML file with endpoint and timeout settings
    #[arg(long, env = "SCHOOL_BROWSER_CONFIG")]
    config: Option<PathBuf>,

    /// School directory endpoint
    #[arg(long, env = "SCHOOLS_URL")]
    schools_url: Option<String>,

    /// SAT results endpoint
    #[arg(long, env = "SAT_SCORES_URL")]
    sat_url: Option<String>,

    /// Whole-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Request both datasets at once instead of one after the other
    #[arg(long)]
    parallel: bool,

    /// Print schools matching this text and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Maximum rows to print per listing
    #[arg(long, default_value = "25")]
    limit: usize,

    /// Print matches as JSON (with --query)
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_tracing(&args.log_level, args.json_logs)?;

    let overrides = ConfigOverrides {
        schools_url: args.schools_url.clone(),
        sat_scores_url: args.sat_url.clone(),
        request_timeout_secs: args.timeout_secs,
        parallel: args.parallel,
    };
    let config = config::resolve(args.config.as_deref(), &overrides)?;

    info!(
        schools_url = %config.schools_url,
        sat_scores_url = %config.sat_scores_url,
        fetch_mode = ?config.fetch_mode,
        "Starting school browser"
    );

    let service = Arc::new(DirectoryService::new(DirectoryLoader::from_config(config)?));

    match &args.query {
        Some(query) => run_once(&service, query, args.limit, args.json).await,
        None => shell::run_interactive(service, args.limit).await,
    }
}

/// Load once, print the matches for `query`, and exit.
async fn run_once(service: &DirectoryService, query: &str, limit: usize, json: bool) -> Result<()> {
    if let Err(e) = service.refresh().await {
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }

    service.set_query(query).await;
    let schools = service.filtered_schools().await;

    if json {
        let shown: Vec<_> = schools.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print!("{}", render::listing(&schools, limit));
    }
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout carries the listings.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
