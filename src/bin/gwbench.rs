//! CLI for the latency-analysis pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Decode captures, compute statistics, export artifacts
//! gwbench analyze --results ./run-2024-06-01 --output ./run-2024-06-01/out
//!
//! # Assemble the consolidated report from exported artifacts
//! gwbench report --results ./run-2024-06-01/out --template report.html.j2
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gwbench::{Analyzer, Reporter, WkhtmltopdfConverter};

/// Post-hoc latency analysis for trading-gateway benchmark runs.
#[derive(Parser, Debug)]
#[command(name = "gwbench")]
#[command(about = "Analyze trading-gateway benchmark captures and build reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode captures, compute latency statistics, export artifacts
    Analyze {
        /// Path to the results directory holding the capture files
        #[arg(long)]
        results: PathBuf,

        /// Directory the generated artifacts are moved into
        #[arg(long)]
        output: PathBuf,
    },
    /// Merge exported summaries into an HTML + PDF report
    Report {
        /// Path to the directory holding the exported summary documents
        #[arg(long)]
        results: PathBuf,

        /// Path to the report template
        #[arg(long)]
        template: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Analyze { results, output } => {
            Analyzer::new(&results, &output).and_then(|analyzer| analyzer.run())
        }
        Command::Report { results, template } => Reporter::new(&results, &template)
            .and_then(|reporter| reporter.assemble(&WkhtmltopdfConverter::new()))
            .map(|_| ()),
    };

    if let Err(err) = result {
        eprintln!("gwbench: {}", err);
        process::exit(1);
    }
}
