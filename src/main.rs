use anyhow::Result;
use clap::{Parser, Subcommand};
use fim::engine::EngineConfig;
use fim::search::{self, SearchRequest};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of results to display
const DEFAULT_TOPK: usize = 5;

/// Default bound on the wait for an engine response, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "fim")]
#[command(about = "Terminal-first image similarity search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search query (when no subcommand is given)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Directory to search in
    #[arg(short, long, default_value = ".")]
    path: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank images in a directory by similarity to a query
    Search {
        /// One or more query strings describing a single concept
        #[arg(required = true)]
        query: Vec<String>,

        /// Directory to search in
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// How many results should be displayed
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOPK)]
        topk: usize,

        /// Engine command override, e.g. "python3 search.py"
        #[arg(long)]
        engine: Option<String>,

        /// Seconds to wait for an engine response
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// List the candidate images a search would consider
    List {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search {
            query,
            path,
            topk,
            engine,
            timeout_secs,
            json,
            no_color,
        }) => {
            run_search(query, path, topk, engine, timeout_secs, json, no_color)?;
        }
        Some(Commands::List { path }) => {
            search::run_list(&path)?;
        }
        None => {
            if cli.query.is_empty() {
                anyhow::bail!("no query given; try `fim search <query>`");
            }
            // Direct query mode with default settings
            run_search(
                cli.query,
                cli.path,
                DEFAULT_TOPK,
                None,
                DEFAULT_TIMEOUT_SECS,
                false,
                false,
            )?;
        }
    }

    Ok(())
}

fn run_search(
    queries: Vec<String>,
    path: PathBuf,
    topk: usize,
    engine: Option<String>,
    timeout_secs: u64,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let engine = EngineConfig::from_command(engine, Duration::from_secs(timeout_secs), path);
    let request = SearchRequest {
        queries,
        topk,
        engine,
        json,
        color: !no_color,
    };
    search::run_search(&request)
}
