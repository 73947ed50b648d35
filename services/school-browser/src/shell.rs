//! Interactive prompt.
//!
//! Any line not starting with `:` becomes the search query. Commands:
//! `:refresh`, `:show N`, `:clear`, `:quit`.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use school_directory::{DirectoryService, LoadPhase};

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Refresh,
    Show(usize),
    Clear,
    Quit,
    Help,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Query(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("refresh" | "r"), None) => Ok(Command::Refresh),
            (Some("clear" | "c"), None) => Ok(Command::Clear),
            (Some("quit" | "q"), None) => Ok(Command::Quit),
            (Some("help" | "h"), None) => Ok(Command::Help),
            (Some("show" | "s"), Some(index)) => index
                .parse()
                .map(Command::Show)
                .map_err(|_| format!("not a row number: {}", index)),
            (Some("show" | "s"), None) => Err("usage: :show N".to_string()),
            _ => Err(format!("unknown command: {}", line)),
        }
    }
}

const HELP: &str = "\
Type text to search by school name.
  :refresh   reload both datasets
  :show N    details for row N of the current list
  :clear     drop the search text
  :quit      exit
";

/// Run one command and return what to print. `None` means quit.
pub async fn execute(service: &DirectoryService, command: Command, limit: usize) -> Option<String> {
    let output = match command {
        Command::Quit => return None,
        Command::Help => HELP.to_string(),
        Command::Refresh => match service.refresh().await {
            Ok(_) => render::listing(&service.filtered_schools().await, limit),
            Err(e) => format!("{}\n", e.user_message()),
        },
        Command::Query(text) => {
            service.set_query(&text).await;
            render::listing(&service.filtered_schools().await, limit)
        }
        Command::Clear => {
            service.clear_query().await;
            render::listing(&service.filtered_schools().await, limit)
        }
        Command::Show(index) => match service.item(index).await {
            Some(school) => render::detail(&school),
            None => format!("No row {} in the current list\n", index),
        },
    };
    Some(output)
}

pub async fn run_interactive(service: Arc<DirectoryService>, limit: usize) -> Result<()> {
    let status = tokio::spawn(report_status(Arc::clone(&service)));

    // First load runs in the background so the prompt is usable right away.
    let _initial = service.spawn_refresh();

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Ok(command) => match execute(&service, command, limit).await {
                Some(output) => print!("{}", output),
                None => break,
            },
            Err(message) => println!("{}", message),
        }
    }

    service.shutdown();
    status.abort();
    Ok(())
}

/// Print a line whenever the load phase changes.
async fn report_status(service: Arc<DirectoryService>) {
    let mut updates = service.subscribe();
    let mut last_phase = updates.borrow().phase.clone();

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.phase == last_phase {
            continue;
        }
        match &snapshot.phase {
            LoadPhase::Loading {
                schools_fetched: false,
            } => println!("Loading school list..."),
            LoadPhase::Loading {
                schools_fetched: true,
            } => println!("Loading SAT results..."),
            LoadPhase::Merged => println!("{} schools loaded", snapshot.total),
            LoadPhase::Error { message } => {
                warn!(%message, "Load failed");
                println!("{}", message);
            }
            LoadPhase::Empty => {}
        }
        last_phase = snapshot.phase;
    }
}
