//! Vigil - Solana Wallet Privacy Analyzer
//!
//! CLI wrapper around the heuristic engine: load a normalized scan context
//! from JSON, generate the privacy report, and optionally render the
//! adversary narrative.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use vigil::narrative::{self, NarrativeOptions};
use vigil::report::{self, OutputFormat};
use vigil::{generate_narrative, generate_narrative_text, generate_report, load_context};

/// Vigil - Solana Wallet Privacy Analyzer
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author = "Solana Privacy Hackathon Team")]
#[command(version = "0.1.0")]
#[command(about = "Behavioral privacy analysis for Solana wallets", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a privacy report from a normalized scan context
    Report {
        /// Path to a ScanContext JSON file
        context: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Minimum severity to print in text output: low, medium, high
        #[arg(short, long, default_value = "low")]
        severity: String,
    },

    /// Render the adversary narrative for a scan context
    Narrative {
        /// Path to a ScanContext JSON file
        context: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Exclude LOW-severity signals from the story
        #[arg(long)]
        skip_low: bool,

        /// Omit per-statement evidence details
        #[arg(long)]
        no_details: bool,

        /// Maximum statements per category
        #[arg(long, default_value = "5")]
        max_statements: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !is_structured_output(&cli) {
        print_banner();
    }

    match cli.command {
        Commands::Report { context, output, severity } => {
            let scan = load_context(&context)?;
            if cli.verbose {
                eprintln!(
                    "Loaded context for {} ({} transactions)",
                    scan.target, scan.transaction_count
                );
            }
            let privacy_report = generate_report(&scan);
            match OutputFormat::from_str(&output) {
                OutputFormat::Json => println!("{}", report::to_json(&privacy_report)?),
                OutputFormat::Text => {
                    report::print_text_report(&privacy_report, report::parse_severity(&severity));
                }
            }
        }
        Commands::Narrative { context, output, skip_low, no_details, max_statements } => {
            let scan = load_context(&context)?;
            let privacy_report = generate_report(&scan);
            let options = NarrativeOptions {
                include_low_severity: !skip_low,
                include_details: !no_details,
                max_statements_per_category: max_statements,
            };
            let story = generate_narrative(&privacy_report, &options);
            match OutputFormat::from_str(&output) {
                OutputFormat::Json => println!("{}", narrative::to_json(&story)?),
                OutputFormat::Text => println!("{}", generate_narrative_text(&story)),
            }
        }
    }

    Ok(())
}

fn is_structured_output(cli: &Cli) -> bool {
    match &cli.command {
        Commands::Report { output, .. } | Commands::Narrative { output, .. } => {
            output.to_lowercase() == "json"
        }
    }
}

fn print_banner() {
    println!();
    println!("{}", "  Vigil - Solana Wallet Privacy Analyzer".bright_cyan().bold());
    println!("{}", "  Heuristic signals + adversary narrative".dimmed());
    println!();
}
