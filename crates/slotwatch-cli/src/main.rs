//! Slotwatch CLI
//!
//! Operator commands against the snapshot store configured for the server.

use clap::{Parser, Subcommand};
use slotwatch_core::logging_facility::{self, Profile};
use slotwatch_core_types::{Origin, RequestContext};
use tracing::Instrument;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "slotwatch")]
#[command(about = "Slotwatch - appointment availability snapshots", long_about = None)]
struct Cli {
    /// Use an in-process store; nothing outlives this invocation
    #[arg(long, global = true)]
    memory: bool,

    /// Emit development logs alongside command output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch current data and store today's snapshot
    Capture,
    /// Print the snapshot captured on a date
    Show(commands::history::ShowArgs),
    /// Print the most recently captured snapshot
    Latest,
    /// Print index dates or a trailing window of summaries
    Range(commands::history::RangeArgs),
    /// Print indexed dates, newest first
    Dates,
    /// Compare the latest snapshot with an earlier one
    Compare(commands::compare::CompareArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    if cli.verbose {
        logging_facility::init(Profile::Development);
    }

    let ctx = RequestContext::new(Origin::Cli);
    let span = tracing::info_span!("cli.command", request_id = %ctx.request_id);
    let result = run(cli).instrument(span).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let engine = commands::engine_context(cli.memory)?;
    let output = match cli.command {
        Commands::Capture => commands::capture::execute(&engine).await?,
        Commands::Show(args) => commands::history::execute_show(args, &engine).await?,
        Commands::Latest => commands::history::execute_latest(&engine).await?,
        Commands::Range(args) => commands::history::execute_range(args, &engine).await?,
        Commands::Dates => commands::history::execute_dates(&engine).await?,
        Commands::Compare(args) => commands::compare::execute(args, &engine).await?,
    };
    println!("{}", output);
    Ok(())
}
