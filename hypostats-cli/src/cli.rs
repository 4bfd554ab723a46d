use clap::{Parser, Subcommand};

use crate::commands::{analyze::AnalyzeArgs, run::RunArgs};
use crate::output::OutputFormat;

/// Hypothesis tests from the command line
#[derive(Debug, Parser)]
#[command(name = "hypostats", version, about)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a hypothesis test on CSV data
    Run(RunArgs),

    /// Extract test parameters from a word problem
    Analyze(AnalyzeArgs),
}
