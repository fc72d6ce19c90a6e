use std::path::PathBuf;

use crate::error::{GibberishError, Result};
use crate::model::SMOOTHING_PRIOR;

/// Characters accepted by default: lower-case ASCII letters and the space.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz ";

pub const DEFAULT_CORPUS_FILE: &str = "big.txt";
pub const DEFAULT_GOOD_FILE: &str = "good.txt";
pub const DEFAULT_BAD_FILE: &str = "bad.txt";
pub const DEFAULT_MODEL_FILE: &str = "knowledge.json";

/// Number of corpus chunks created per worker for parallel accumulation.
pub(crate) const CHUNKS_PER_WORKER: usize = 8;

/// Upper bound on `TrainingConfig::workers`.
pub const MAX_WORKERS: usize = 64;

/// Training parameters.
///
/// # Fields
/// - `alphabet`: ordered, distinct accepted characters.
/// - `smoothing_prior`: initial count of every transition.
/// - `workers`: number of threads accumulating the reference corpus.
/// - `strict`: when true, a corpus character outside the alphabet aborts
///   training. When false, pairs touching such characters are skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
	pub alphabet: String,
	pub smoothing_prior: f64,
	pub workers: usize,
	pub strict: bool,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self {
			alphabet: DEFAULT_ALPHABET.to_owned(),
			smoothing_prior: SMOOTHING_PRIOR,
			workers: num_cpus::get().clamp(1, MAX_WORKERS),
			strict: true,
		}
	}
}

impl TrainingConfig {
	pub fn with_alphabet(mut self, alphabet: impl Into<String>) -> Self {
		self.alphabet = alphabet.into();
		self
	}

	pub fn with_smoothing_prior(mut self, smoothing_prior: f64) -> Self {
		self.smoothing_prior = smoothing_prior;
		self
	}

	pub fn with_workers(mut self, workers: usize) -> Self {
		self.workers = workers;
		self
	}

	pub fn with_strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Checks the numeric parameters. The alphabet is checked when the
	/// index is built.
	///
	/// # Errors
	/// `InvalidConfig` if the prior is not a finite positive number or if
	/// `workers` is outside `1..=MAX_WORKERS`.
	pub fn validate(&self) -> Result<()> {
		if !(self.smoothing_prior.is_finite() && self.smoothing_prior > 0.0) {
			return Err(GibberishError::InvalidConfig(format!(
				"smoothing prior must be finite and > 0, got {}",
				self.smoothing_prior
			)));
		}
		if self.workers == 0 {
			return Err(GibberishError::InvalidConfig("workers must be at least 1".to_owned()));
		}
		if self.workers > MAX_WORKERS {
			return Err(GibberishError::InvalidConfig(format!(
				"workers cannot exceed {MAX_WORKERS}, got {}",
				self.workers
			)));
		}
		Ok(())
	}
}

/// Input and output files of a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingPaths {
	/// Unlabeled reference corpus, one sample per line.
	pub corpus: PathBuf,
	/// Known plausible lines.
	pub good: PathBuf,
	/// Known gibberish lines.
	pub bad: PathBuf,
	/// Destination of the trained model.
	pub output: PathBuf,
}

impl Default for TrainingPaths {
	fn default() -> Self {
		Self {
			corpus: PathBuf::from(DEFAULT_CORPUS_FILE),
			good: PathBuf::from(DEFAULT_GOOD_FILE),
			bad: PathBuf::from(DEFAULT_BAD_FILE),
			output: PathBuf::from(DEFAULT_MODEL_FILE),
		}
	}
}
