//! solution-metrics CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use solution_metrics::{analyze, render_json, render_text, Cli, OutputFormat, Solution};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .init();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> solution_metrics::Result<String> {
    info!("solution-metrics v{}", env!("CARGO_PKG_VERSION"));

    let solution = Solution::open(&cli.solution)?;
    let report = analyze(&solution, &cli.config())?;

    match cli.format {
        OutputFormat::Text => Ok(render_text(&report)),
        OutputFormat::Json => render_json(&report),
    }
}
