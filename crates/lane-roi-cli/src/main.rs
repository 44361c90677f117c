mod commands;
mod export;
mod input;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use commands::roi::RoiArgs;
use commands::worksheets::{ExportArgs, HistoryArgs, ShowArgs, TimelineArgs};

/// Run, save and export ROI worksheets
#[derive(Parser)]
#[command(
    name = "lane-roi",
    version,
    about = "Run, save and export ROI worksheets",
    long_about = "Projects a flat monthly cash flow against an upfront investment \
                  with decimal precision: cumulative net position, ROI % and payback \
                  month. Runs can be saved to a local worksheet store and exported \
                  as an HTML strategy snapshot or a JSON artifact."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Worksheet database file (defaults to the platform data directory)
    #[arg(long, env = "LANE_ROI_DB", global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the ROI projection, optionally saving and exporting it
    Roi(RoiArgs),
    /// List saved worksheet runs
    History(HistoryArgs),
    /// Show a saved worksheet run
    Show(ShowArgs),
    /// Export a saved worksheet run as HTML and/or JSON
    Export(ExportArgs),
    /// List timeline entries recorded for saved runs
    Timeline(TimelineArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let db = cli.db.as_deref();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Roi(args) => commands::roi::run_roi(args, db),
        Commands::History(args) => commands::worksheets::run_history(args, db),
        Commands::Show(args) => commands::worksheets::run_show(args, db),
        Commands::Export(args) => commands::worksheets::run_export(args, db),
        Commands::Timeline(args) => commands::worksheets::run_timeline(args, db),
        Commands::Version => {
            println!("lane-roi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
