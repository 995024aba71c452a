pub mod anomalies;
pub mod categories;
pub mod config;
pub mod dashboard;
pub mod demo;
pub mod export;
pub mod forecast;
pub mod import;
pub mod init;
pub mod ledger;
pub mod reset;
pub mod status;
pub mod train;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rusqlite::Connection;

use crate::ai::{FileModelStore, FinanceAi};
use crate::db::get_connection;
use crate::error::{Result, WealthError};
use crate::settings::Settings;

/// Transactions needed before a forecast is attempted.
pub(crate) const MIN_FORECAST_HISTORY: usize = 10;

/// Opens the configured database, failing with a hint when `init` has not run.
pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let path = settings.db_path();
    if !path.exists() {
        return Err(WealthError::Settings(format!(
            "No database found at {}\nRun `wealthpath init` first.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn open_ai(settings: &Settings) -> FinanceAi<FileModelStore> {
    FinanceAi::new(FileModelStore::new(settings.model_path()))
}

/// Explanatory line printed only in guided mode.
pub(crate) fn guide(settings: &Settings, message: &str) {
    if let Some(line) = guide_line(settings, message) {
        println!("{line}");
    }
}

fn guide_line(settings: &Settings, message: &str) -> Option<String> {
    settings
        .guided_mode
        .then(|| format!("{} {}", "\u{2139}".blue().bold(), message.blue()))
}

#[derive(Parser)]
#[command(
    name = "wealthpath",
    about = "Personal-finance dashboard: import bank CSVs, auto-categorize, forecast and spot unusual spending."
)]
pub struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up WealthPath: choose a data directory and initialize the database.
    Init {
        /// Path for WealthPath data (default: ~/Documents/wealthpath)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a bank CSV, mapping its columns to date, description and amount.
    Import {
        /// Path to the CSV file
        file: String,
        /// Column holding the transaction date (guessed when omitted)
        #[arg(long = "date-col")]
        date_col: Option<String>,
        /// Column holding the description (guessed when omitted)
        #[arg(long = "desc-col")]
        desc_col: Option<String>,
        /// Column holding the signed amount (guessed when omitted)
        #[arg(long = "amount-col")]
        amount_col: Option<String>,
    },
    /// Financial health overview: totals, spending breakdown, forecast, anomalies.
    Dashboard,
    /// View or edit the transaction ledger.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommands,
    },
    /// Retrain the categorizer on the current ledger.
    Train,
    /// Project the daily balance forward.
    Forecast {
        /// Days to project (default from settings)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,
    },
    /// List unusually large spending for its category.
    Anomalies,
    /// Manage the category list.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Export all transactions to a spreadsheet.
    Export {
        /// Output path (default: <data_dir>/exports/wealthpath_data-YYYY-MM-DD.<ext>)
        #[arg(long)]
        output: Option<String>,
        /// xlsx or csv
        #[arg(long, default_value = "xlsx")]
        format: String,
    },
    /// Delete all transactions.
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show current data directory and summary statistics.
    Status,
    /// Show or change settings.
    Config {
        /// Print explanatory hints with each command
        #[arg(long)]
        guided: Option<bool>,
        /// Default forecast horizon in days
        #[arg(long = "forecast-days", value_parser = clap::value_parser!(u32).range(1..))]
        forecast_days: Option<u32>,
    },
    /// Load a few months of sample transactions to explore WealthPath.
    Demo,
}

#[derive(Subcommand)]
pub enum LedgerCommands {
    /// List transactions with their row numbers.
    List {
        /// Only the most recent N rows
        #[arg(long)]
        limit: Option<usize>,
        /// Only rows categorized by the model
        #[arg(long)]
        predicted: bool,
    },
    /// Set a row's category, save, and retrain.
    Set {
        /// Row number (shown in `wealthpath ledger list`)
        row: usize,
        /// Category name
        category: String,
        /// Save without retraining the categorizer
        #[arg(long = "no-train")]
        no_train: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories.
    List,
    /// Add a category.
    Add {
        /// Category name
        name: String,
    },
}
