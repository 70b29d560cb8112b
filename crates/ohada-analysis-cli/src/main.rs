mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::process;

use commands::analyze::AnalyzeArgs;
use commands::compliance::ComplianceArgs;
use commands::extract::ExtractArgs;
use commands::layout::LayoutArgs;
use commands::norms::NormsArgs;
use commands::ocr::OcrArgs;
use commands::ratios::RatiosArgs;
use commands::score::ScoreArgs;

/// Financial statement analysis for OHADA companies
#[derive(Parser)]
#[command(
    name = "ohada",
    version,
    about = "Financial statement analysis for OHADA companies",
    long_about = "Extracts SYSCOHADA balance sheet, income statement and cash-flow \
                  figures from the standard workbook template, manual entry forms or \
                  OCR text, then computes financial ratios, BCEAO norm compliance, \
                  a composite score, insights and recommendations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace); RUST_LOG
    /// takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract statement figures from a SYSCOHADA workbook
    Extract(ExtractArgs),
    /// Run the full analysis (ratios, compliance, score, insights, recommendations)
    Analyze(AnalyzeArgs),
    /// Compute financial ratios from statement figures
    Ratios(RatiosArgs),
    /// Check ratios against BCEAO norms
    Compliance(ComplianceArgs),
    /// Compute the composite score and risk level
    Score(ScoreArgs),
    /// Print the effective BCEAO norm table
    Norms(NormsArgs),
    /// Print the workbook template cell layout
    Layout(LayoutArgs),
    /// Extract statement figures from OCR text
    Ocr(OcrArgs),
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

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Extract(args) => commands::extract::run_extract(args),
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Ratios(args) => commands::ratios::run_ratios(args),
        Commands::Compliance(args) => commands::compliance::run_compliance(args),
        Commands::Score(args) => commands::score::run_score(args),
        Commands::Norms(args) => commands::norms::run_norms(args),
        Commands::Layout(args) => commands::layout::run_layout(args),
        Commands::Ocr(args) => commands::ocr::run_ocr(args),
        Commands::Version => {
            println!("ohada {}", env!("CARGO_PKG_VERSION"));
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
