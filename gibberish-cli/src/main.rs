//! Gibberish - command-line front end
//!
//! Trains digraph models and classifies text with them.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
	let cli = cli::Cli::parse();

	// Initialize logging, RUST_LOG takes precedence over --log-level
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(filter)
		.init();

	cli::run(cli)
}
