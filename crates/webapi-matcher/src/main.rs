//! Web API pattern matcher CLI
//!
//! Compares an expected JSON document, which may contain type tokens, with
//! an actual response body stored on disk.
//!
//! Usage:
//!   webapi-match <pattern_file> <actual_file> [OPTIONS]

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use webapi_matcher::{
    check_files, ChainMatcher, CheckMode, CheckOptions, CheckReport, CheckStatus,
};

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Web API response pattern matcher
#[derive(Parser, Debug)]
#[command(name = "webapi-match")]
#[command(
    author,
    version,
    about = "Check a JSON response against an expected pattern document"
)]
struct Args {
    /// File holding the expected JSON (or a bare pattern with --key)
    #[arg(required = true)]
    pattern_file: PathBuf,

    /// File holding the actual JSON response body
    #[arg(required = true)]
    actual_file: PathBuf,

    /// Only match the value under this top-level key (pattern mode only)
    #[arg(short, long)]
    key: Option<String>,

    /// Comparison mode: pattern (default), contains
    #[arg(short, long, default_value = "pattern")]
    mode: CheckMode,

    /// Output format: text (default), json
    #[arg(short, long, default_value = "text")]
    output: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let options = CheckOptions {
        mode: args.mode,
        key: args.key.clone(),
    };
    let chain = ChainMatcher::standard();
    let report = check_files(&chain, &args.pattern_file, &args.actual_file, &options);

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    std::process::exit(report.status.exit_code());
}

fn print_report(report: &CheckReport) {
    println!("{BOLD}{CYAN}Web API Matcher{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!(
        "{DIM}Pattern:{RESET} {CYAN}{}{RESET}",
        report.pattern_file.display()
    );
    println!(
        "{DIM}Actual:{RESET}  {CYAN}{}{RESET}",
        report.actual_file.display()
    );
    match &report.key {
        Some(key) => println!(
            "{DIM}Mode:{RESET}    {BOLD}{}{RESET} (key {CYAN}{key}{RESET})\n",
            report.mode
        ),
        None => println!("{DIM}Mode:{RESET}    {BOLD}{}{RESET}\n", report.mode),
    }

    match report.status {
        CheckStatus::Passed => println!("{GREEN}{BOLD}Response matches!{RESET}"),
        CheckStatus::Failed => {
            println!("{RED}FAIL{RESET} {BOLD}Response does not match{RESET}");
            if let Some(message) = &report.message {
                println!("  {RED}|{RESET} {message}");
            }
        }
        CheckStatus::Error => {
            println!("{YELLOW}ERROR{RESET} {BOLD}Could not check response{RESET}");
            if let Some(message) = &report.message {
                println!("  {YELLOW}|{RESET} {message}");
            }
        }
    }
}
