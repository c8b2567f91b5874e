//! normgate CLI - document audits, rule listing and offline record verification.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;
mod request;
mod telemetry;

use commands::{audit, canonicalize, rules, verify};
use config::Config;

#[derive(Parser)]
#[command(name = "normgate")]
#[command(about = "Deterministic document audits with fail-on-blocking-failure decisions")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical bytes and digest for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Also print the hygiene report
        #[arg(long)]
        report: bool,
    },
    /// Audit a document request against the layout rules
    Audit {
        /// Path to the audit request JSON
        request: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Exit with error code if the decision is FAIL
        #[arg(long)]
        strict: bool,
        /// Run identifier (default: derived from the request digest)
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Verify the ids of every record in a records file
    Verify {
        /// Path to the records JSON (e.g. the output of `audit --json`)
        records: String,
        /// Exit with error code if any verification fails
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in layout rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    telemetry::init_tracing(config.logging.json, config.log_level());

    let result = match cli.command {
        Commands::Canonicalize { input, report } => canonicalize::run(input, report),
        Commands::Audit {
            request,
            json,
            strict,
            run_id,
        } => audit::run(request, json, strict || config.audit.strict, run_id, &config),
        Commands::Verify {
            records,
            strict,
            json,
        } => verify::run(records, strict, json),
        Commands::Rules { json } => rules::run(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
