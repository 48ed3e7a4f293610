mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::receipt::{ReceiptArgs, ReceiptFromCalculationArgs};
use commands::tariff::{CalculateArgs, ParametersArgs};

/// Public-lighting tariff calculations (CREG 101 013)
#[derive(Parser)]
#[command(
    name = "ltc",
    version,
    about = "Public-lighting tariff calculations (CREG 101 013)",
    long_about = "A CLI for the regulated public-lighting cost model with decimal precision. \
                  Computes CSEE, CINV, CAOM, COTR and the CAP total, applies the optional \
                  price-index update, and renders simple receipts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log per-level figures to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full tariff calculation
    Calculate(CalculateArgs),
    /// Render a simple receipt from component totals
    Receipt(ReceiptArgs),
    /// Calculate, then render a receipt from the result
    ReceiptFromCalculation(ReceiptFromCalculationArgs),
    /// Show the regulatory parameters for an application year
    Parameters(ParametersArgs),
    /// Print a blank receipt template
    ReceiptTemplate,
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
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::tariff::run_calculate(args),
        Commands::Receipt(args) => commands::receipt::run_receipt(args),
        Commands::ReceiptFromCalculation(args) => {
            commands::receipt::run_receipt_from_calculation(args)
        }
        Commands::Parameters(args) => commands::tariff::run_parameters(args),
        Commands::ReceiptTemplate => commands::receipt::run_receipt_template(),
        Commands::Version => {
            println!("ltc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
