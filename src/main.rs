mod ai;
mod cli;
mod db;
mod error;
mod export;
mod fmt;
mod importer;
mod models;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use cli::{CategoriesCommands, Cli, Commands, LedgerCommands};

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --verbose; otherwise only warnings reach stderr.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            date_col,
            desc_col,
            amount_col,
        } => cli::import::run(&file, date_col, desc_col, amount_col),
        Commands::Dashboard => cli::dashboard::run(),
        Commands::Ledger { command } => match command {
            LedgerCommands::List { limit, predicted } => cli::ledger::list(limit, predicted),
            LedgerCommands::Set {
                row,
                category,
                no_train,
            } => cli::ledger::set(row, &category, no_train),
        },
        Commands::Train => cli::train::run(),
        Commands::Forecast { days } => cli::forecast::run(days),
        Commands::Anomalies => cli::anomalies::run(),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { name } => cli::categories::add(&name),
        },
        Commands::Export { output, format } => cli::export::run(output, &format),
        Commands::Reset { yes } => cli::reset::run(yes),
        Commands::Status => cli::status::run(),
        Commands::Config {
            guided,
            forecast_days,
        } => cli::config::run(guided, forecast_days),
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
