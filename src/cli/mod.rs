pub mod debug;
pub mod report;
pub mod track;

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    store::{file::FileKvStore, kv::KvStore},
    utils::{dir::create_application_default_path, logging::enable_logging},
};

use debug::{process_debug_command, DebugCommand};
use report::{process_averages_command, process_history_command, AveragesCommand, HistoryCommand};
use track::{process_log_command, process_reset_command, process_today_command, LogCommand};

#[derive(Parser, Debug)]
#[command(name = "Fittrack", version, long_about = None)]
#[command(about = "Daily tracker for calories, protein, and distance", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add to or remove from today's counters")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show today's counters")]
    Today,
    #[command(about = "Show weekly and monthly averages over recorded days")]
    Averages {
        #[command(flatten)]
        command: AveragesCommand,
    },
    #[command(about = "List all recorded days, most recent first")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Zero today's counters and delete today's stored record")]
    Reset {
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Inspect and manipulate the raw key-value store. Intended for debugging")]
    Debug {
        #[command(subcommand)]
        command: DebugCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(&app_dir, logging_level, args.log)?;

    let store: Arc<dyn KvStore> = Arc::new(FileKvStore::new(app_dir.join("store"))?);

    match args.commands {
        Commands::Log { command } => process_log_command(store, command).await,
        Commands::Today => process_today_command(store).await,
        Commands::Averages { command } => process_averages_command(store, command).await,
        Commands::History { command } => process_history_command(store, command).await,
        Commands::Reset { yes } => process_reset_command(store, yes).await,
        Commands::Debug { command } => process_debug_command(store, command).await,
    }
}

/// Asks for a y/N confirmation before a destructive command. `assume_yes` skips the prompt for
/// non-interactive use.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
