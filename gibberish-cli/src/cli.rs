//! CLI command definitions and handlers

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing::info;

use gibberish_core::config::{
	DEFAULT_ALPHABET, DEFAULT_BAD_FILE, DEFAULT_CORPUS_FILE, DEFAULT_GOOD_FILE, DEFAULT_MODEL_FILE, MAX_WORKERS,
};
use gibberish_core::model::scorer::is_degenerate;
use gibberish_core::model::SMOOTHING_PRIOR;
use gibberish_core::{persistence, GibberishModel, Trainer, TrainingConfig, TrainingPaths};

const PROMPT: &str = "Insert something to check: ";

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
	let n: usize = s
		.parse()
		.map_err(|_| format!("'{}' is not a valid number", s))?;
	if n == 0 {
		Err("workers must be at least 1".to_string())
	} else if n > MAX_WORKERS {
		Err(format!("workers cannot exceed {MAX_WORKERS}"))
	} else {
		Ok(n)
	}
}

/// Gibberish detector based on character digraph statistics
#[derive(Parser, Debug)]
#[command(name = "gibberish")]
#[command(
	version,
	about = "Tell plausible text from random character sequences",
	after_help = "\
Examples:
  gibberish train                              Train from big.txt, good.txt and bad.txt
  gibberish train --output model.bin           Store the model in binary form
  gibberish check                              Classify lines typed on stdin
  gibberish classify hello xqzjkx              Classify the given strings"
)]
pub struct Cli {
	/// Log level (error, warn, info, debug, trace)
	#[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
	pub log_level: String,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Train a model and write it to disk
	Train {
		/// Accepted characters, in index order, without duplicates
		#[arg(long, env = "GIBBERISH_ALPHABET", default_value = DEFAULT_ALPHABET)]
		alphabet: String,

		/// Reference corpus, one sample per line
		#[arg(long, env = "GIBBERISH_CORPUS", default_value = DEFAULT_CORPUS_FILE)]
		corpus: PathBuf,

		/// Known plausible lines
		#[arg(long, env = "GIBBERISH_GOOD", default_value = DEFAULT_GOOD_FILE)]
		good: PathBuf,

		/// Known gibberish lines
		#[arg(long, env = "GIBBERISH_BAD", default_value = DEFAULT_BAD_FILE)]
		bad: PathBuf,

		/// Model destination (.bin for binary, JSON otherwise)
		#[arg(long, short = 'o', env = "GIBBERISH_MODEL", default_value = DEFAULT_MODEL_FILE)]
		output: PathBuf,

		/// Number of parallel workers (1-64, defaults to the CPU count)
		#[arg(long, value_parser = parse_workers)]
		workers: Option<usize>,

		/// Initial count of every transition
		#[arg(long, default_value_t = SMOOTHING_PRIOR)]
		prior: f64,

		/// Skip corpus characters outside the alphabet instead of failing
		#[arg(long)]
		lenient: bool,
	},

	/// Interactively classify lines read from stdin
	Check {
		/// Trained model file
		#[arg(long, short = 'm', env = "GIBBERISH_MODEL", default_value = DEFAULT_MODEL_FILE)]
		model: PathBuf,
	},

	/// Classify the given strings
	Classify {
		/// Trained model file
		#[arg(long, short = 'm', env = "GIBBERISH_MODEL", default_value = DEFAULT_MODEL_FILE)]
		model: PathBuf,

		/// Strings to classify
		#[arg(required = true)]
		texts: Vec<String>,
	},

	/// Print a summary of a trained model
	Inspect {
		/// Trained model file
		#[arg(long, short = 'm', env = "GIBBERISH_MODEL", default_value = DEFAULT_MODEL_FILE)]
		model: PathBuf,
	},
}

pub fn run(cli: Cli) -> Result<()> {
	match cli.command {
		Commands::Train { alphabet, corpus, good, bad, output, workers, prior, lenient } => {
			let mut config = TrainingConfig::default()
				.with_alphabet(alphabet)
				.with_smoothing_prior(prior)
				.with_strict(!lenient);
			if let Some(workers) = workers {
				config = config.with_workers(workers);
			}
			let paths = TrainingPaths { corpus, good, bad, output };
			train(config, &paths)
		}
		Commands::Check { model } => {
			let model = load_model(&model)?;
			check(&model, io::stdin().lock(), io::stdout().lock())?;
			Ok(())
		}
		Commands::Classify { model, texts } => {
			let model = load_model(&model)?;
			classify(&model, &texts, io::stdout().lock())?;
			Ok(())
		}
		Commands::Inspect { model } => {
			let model = load_model(&model)?;
			inspect(&model, io::stdout().lock())?;
			Ok(())
		}
	}
}

fn train(config: TrainingConfig, paths: &TrainingPaths) -> Result<()> {
	let trainer = Trainer::new(config).context("invalid training configuration")?;
	let report = trainer.train_files(paths).context("training failed")?;
	info!(
		output = %paths.output.display(),
		lines = report.corpus_lines,
		digraphs = report.digraphs,
		threshold = report.calibration.threshold,
		"model trained"
	);
	println!(
		"{} {} (threshold {:.6}, worst good {:.6}, best bad {:.6})",
		style("Model written to").green(),
		paths.output.display(),
		report.calibration.threshold,
		report.calibration.minimum_good,
		report.calibration.maximum_bad,
	);
	Ok(())
}

fn load_model(path: &Path) -> Result<GibberishModel> {
	persistence::load(path).with_context(|| format!("unable to load model {}", path.display()))
}

/// Prompts for a line, classifies it, and repeats until end of input.
fn check<R: BufRead, W: Write>(model: &GibberishModel, mut reader: R, mut writer: W) -> io::Result<()> {
	let mut input = String::new();
	loop {
		write!(writer, "{PROMPT}")?;
		writer.flush()?;

		input.clear();
		if reader.read_line(&mut input)? == 0 {
			writeln!(writer)?;
			return Ok(());
		}

		let text = input.trim();
		writeln!(writer, "Input: {}: is gibberish? {}\n", text, verdict(model.is_gibberish(text)))?;
	}
}

fn classify<W: Write>(model: &GibberishModel, texts: &[String], mut writer: W) -> io::Result<()> {
	for text in texts {
		let text = text.trim();
		let score = model.score(text);
		let score = if is_degenerate(score) { "-inf".to_owned() } else { format!("{score:.6}") };
		writeln!(writer, "{}\t{}\t{}", score, verdict(model.is_gibberish(text)), text)?;
	}
	Ok(())
}

fn inspect<W: Write>(model: &GibberishModel, mut writer: W) -> io::Result<()> {
	writeln!(writer, "alphabet:  {:?}", model.index().as_string())?;
	writeln!(writer, "size:      {}", model.matrix().size())?;
	writeln!(writer, "threshold: {}", model.threshold())
}

fn verdict(gibberish: bool) -> String {
	if gibberish {
		style("true").red().to_string()
	} else {
		style("false").green().to_string()
	}
}
