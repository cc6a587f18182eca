//! IdlePipe CLI - pipe stdin to stdout with an idle watchdog
//!
//! Copies standard input to standard output and terminates if nothing
//! has been sent for longer than the given timeout.

use anyhow::Context;
use clap::Parser;
use idlepipe::config::{CliArgs, PipeConfig};
use idlepipe::core::FlowControlUnit;
use idlepipe::exec::FollowUpCommand;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging; stdout carries the data, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(args.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    // Validate everything before touching stdin
    let config = PipeConfig::from_cli(&args).context("invalid pipe configuration")?;
    let follow_up = FollowUpCommand::from_cli(args.cmd.as_deref(), args.sh_wrap)?;

    tracing::debug!("Configuration: {:?}", config);

    let unit = FlowControlUnit::start(std::io::stdin(), std::io::stdout(), config)
        .context("failed to start pipe")?;
    let stats = unit.stats();

    let outcome = unit.wait();
    tracing::info!("quitting, outcome: {}", outcome);

    if args.summary {
        stats.summarize(&outcome, &config).print(args.output_format);
    }

    if let Some(command) = follow_up {
        command.spawn().context("follow-up command failed")?;
    }

    Ok(())
}
