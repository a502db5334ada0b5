//! CLI argument parsing

use clap::{Parser, Subcommand};
use marketlens_core::DEFAULT_ROWS;
use std::path::PathBuf;

/// Ask questions about Gold, SPY and Sensex prices
#[derive(Debug, Parser)]
#[command(name = "marketlens", version)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Data folder holding the CSV files
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Mode; interactive chat when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI modes
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Print the first (or last) rows of the dataset
    Show {
        /// Show the last rows instead of the first
        #[arg(long)]
        tail: bool,

        /// Number of rows
        #[arg(short = 'n', long = "rows", default_value_t = DEFAULT_ROWS)]
        rows: usize,
    },

    /// List the files in the data folder
    Files,

    /// Build the merged dataset from the raw exports
    Merge {
        /// Gold prices CSV (Date, Gold_Price)
        #[arg(long)]
        gold: Option<PathBuf>,

        /// SPY yfinance export
        #[arg(long)]
        spy: Option<PathBuf>,

        /// Sensex export
        #[arg(long)]
        sensex: Option<PathBuf>,

        /// Output file (defaults to the configured dataset path)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Selected command, defaulting to chat
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}
