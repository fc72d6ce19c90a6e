use std::path::Path;
use std::sync::mpsc;
use std::thread;

use tracing::{debug, info};

use super::calibration::{score_lines, Calibration};
use crate::config::{TrainingConfig, TrainingPaths, CHUNKS_PER_WORKER};
use crate::error::Result;
use crate::io::read_lines;
use crate::model::{AlphabetIndex, Digraph, Digraphs, GibberishModel, TransitionCounts};
use crate::persistence;

/// Outcome of a training run.
#[derive(Clone, Debug)]
pub struct TrainingReport {
	pub model: GibberishModel,
	pub calibration: Calibration,
	/// Number of reference corpus lines read.
	pub corpus_lines: usize,
	/// Number of digraphs accumulated into the matrix.
	pub digraphs: u64,
}

/// Builds a [`GibberishModel`] from a reference corpus and labeled examples.
///
/// # Responsibilities
/// - Count digraphs of the reference corpus, in parallel shards
/// - Normalize counts into log-probabilities
/// - Calibrate the threshold against known-good and known-bad lines
///
/// Training is a pure function of its inputs: the count table is threaded
/// through each shard as a fold and shards are summed, so the result does
/// not depend on scheduling.
#[derive(Clone, Debug)]
pub struct Trainer {
	config: TrainingConfig,
	index: AlphabetIndex,
}

impl Trainer {
	/// # Errors
	/// `InvalidConfig`, `EmptyAlphabet` or `DuplicateCharacter` when the
	/// configuration cannot produce a model.
	pub fn new(config: TrainingConfig) -> Result<Self> {
		config.validate()?;
		let index = AlphabetIndex::new(&config.alphabet)?;
		Ok(Self { config, index })
	}

	pub fn config(&self) -> &TrainingConfig {
		&self.config
	}

	pub fn index(&self) -> &AlphabetIndex {
		&self.index
	}

	/// Trains a model from in-memory lines.
	///
	/// # Errors
	/// - `UnknownCharacter` (strict mode) with the offending corpus line.
	/// - `EmptyLabelSet` or `Calibration` when no usable threshold exists.
	pub fn train<S: AsRef<str> + Sync>(&self, corpus: &[S], good: &[S], bad: &[S]) -> Result<TrainingReport> {
		info!(
			lines = corpus.len(),
			alphabet = self.index.len(),
			workers = self.config.workers,
			strict = self.config.strict,
			"accumulating reference corpus"
		);
		let (counts, digraphs) = self.accumulate(corpus)?;
		let matrix = counts.normalize();
		debug!(digraphs, "transition matrix normalized");

		let good_scores = score_lines(good, &matrix, &self.index, "good");
		let bad_scores = score_lines(bad, &matrix, &self.index, "bad");
		let calibration = Calibration::from_scores(&good_scores, &bad_scores)?;
		info!(
			minimum_good = calibration.minimum_good,
			maximum_bad = calibration.maximum_bad,
			threshold = calibration.threshold,
			"threshold calibrated"
		);

		let model = GibberishModel::new(self.index.clone(), matrix, calibration.threshold)?;
		Ok(TrainingReport { model, calibration, corpus_lines: corpus.len(), digraphs })
	}

	/// Reads the three input files, trains, and saves the model to
	/// `paths.output`.
	///
	/// Every input is read and the model fully calibrated before anything is
	/// written, so a failure never leaves a model file behind.
	pub fn train_files(&self, paths: &TrainingPaths) -> Result<TrainingReport> {
		let corpus = read_lines(&paths.corpus)?;
		let good = read_lines(&paths.good)?;
		let bad = read_lines(&paths.bad)?;

		let report = self.train(&corpus, &good, &bad)?;
		persistence::save(&report.model, &paths.output)?;
		Ok(report)
	}

	/// Counts the digraphs of `lines` into a table initialized with the
	/// smoothing prior.
	///
	/// Lines are split into `workers * CHUNKS_PER_WORKER` chunks, each chunk
	/// is counted on its own thread into a zero table, and the partial tables
	/// are summed. When several chunks fail, the error of the earliest one is
	/// returned.
	pub fn accumulate<S: AsRef<str> + Sync>(&self, lines: &[S]) -> Result<(TransitionCounts, u64)> {
		let size = self.index.len();
		let mut total = TransitionCounts::with_prior(size, self.config.smoothing_prior);
		if lines.is_empty() {
			return Ok((total, 0));
		}

		let chunks = self.config.workers.saturating_mul(CHUNKS_PER_WORKER);
		let chunk_size = lines.len().div_ceil(chunks);

		let mut partials: Vec<(usize, Result<(TransitionCounts, u64)>)> = thread::scope(|scope| {
			let (tx, rx) = mpsc::channel();
			for (chunk_number, chunk) in lines.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				let first_line = chunk_number * chunk_size;
				scope.spawn(move || {
					let partial = self.accumulate_chunk(chunk, first_line);
					// The receiver outlives every sender inside the scope.
					let _ = tx.send((first_line, partial));
				});
			}
			drop(tx);
			rx.iter().collect()
		});
		partials.sort_by_key(|(first_line, _)| *first_line);

		let mut digraphs = 0;
		for (_, partial) in partials {
			let (counts, observed) = partial?;
			total.merge(&counts)?;
			digraphs += observed;
		}

		Ok((total, digraphs))
	}

	/// Counts one chunk into a zero table. `first_line` is the 0-based
	/// position of the chunk's first line in the corpus.
	fn accumulate_chunk<S: AsRef<str>>(&self, chunk: &[S], first_line: usize) -> Result<(TransitionCounts, u64)> {
		let start = (TransitionCounts::empty(self.index.len()), 0u64);

		chunk.iter().enumerate().try_fold(start, |acc, (offset, line)| {
			let line = line.as_ref();
			let folded = if self.config.strict {
				fold_pairs(acc, Digraphs::new(line), &self.index)
			} else {
				fold_pairs(acc, Digraphs::new(line).accepted(&self.index), &self.index)
			};
			folded.map_err(|e| e.at_line(first_line + offset + 1))
		})
	}
}

/// Threads `acc` through `pairs`, counting each one.
fn fold_pairs<I>(acc: (TransitionCounts, u64), mut pairs: I, index: &AlphabetIndex) -> Result<(TransitionCounts, u64)>
where
	I: Iterator<Item = Digraph>,
{
	pairs.try_fold(acc, |(mut counts, observed), pair| {
		counts.accumulate(pair, index)?;
		Ok((counts, observed + 1))
	})
}

/// Trains a model with the given alphabet and default settings, and writes
/// it to `output`.
///
/// Nothing is written unless every step succeeds.
pub fn train_model<P: AsRef<Path>>(alphabet: &str, corpus: P, good: P, bad: P, output: P) -> Result<TrainingReport> {
	let trainer = Trainer::new(TrainingConfig::default().with_alphabet(alphabet))?;
	trainer.train_files(&TrainingPaths {
		corpus: corpus.as_ref().to_path_buf(),
		good: good.as_ref().to_path_buf(),
		bad: bad.as_ref().to_path_buf(),
		output: output.as_ref().to_path_buf(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::GibberishError;

	fn trainer(alphabet: &str, workers: usize) -> Trainer {
		Trainer::new(TrainingConfig::default().with_alphabet(alphabet).with_workers(workers)).unwrap()
	}

	#[test]
	fn test_accumulate_applies_prior_once() {
		let lines = vec!["ab"; 100];
		let (counts, digraphs) = trainer("ab", 4).accumulate(&lines).unwrap();
		assert_eq!(digraphs, 100);
		assert_eq!(counts.count(0, 1), 110.0);
		assert_eq!(counts.count(0, 0), 10.0);
		assert_eq!(counts.count(1, 0), 10.0);
	}

	#[test]
	fn test_parallel_matches_sequential() {
		let lines: Vec<String> = (0..257).map(|i| format!("{} ab ba", "abc".repeat(i % 7))).collect();
		let (sequential, n1) = trainer("abc ", 1).accumulate(&lines).unwrap();
		let (parallel, n2) = trainer("abc ", 8).accumulate(&lines).unwrap();
		assert_eq!(sequential, parallel);
		assert_eq!(n1, n2);
	}

	#[test]
	fn test_strict_reports_first_unknown_line() {
		let mut lines = vec!["ab".to_owned(); 50];
		lines[20] = "ab!".to_owned();
		lines[40] = "a?".to_owned();
		match trainer("ab", 4).accumulate(&lines) {
			Err(GibberishError::UnknownCharacter { character, line }) => {
				assert_eq!(character, '!');
				assert_eq!(line, Some(21));
			}
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn test_lenient_skips_unknown() {
		let config = TrainingConfig::default().with_alphabet("ab").with_strict(false).with_workers(2);
		let trainer = Trainer::new(config).unwrap();
		let (counts, digraphs) = trainer.accumulate(&["ab!", "?ba"]).unwrap();
		assert_eq!(digraphs, 2);
		assert_eq!(counts.count(0, 1), 11.0);
		assert_eq!(counts.count(1, 0), 11.0);
	}

	#[test]
	fn test_empty_corpus_keeps_prior() {
		let empty: [&str; 0] = [];
		let (counts, digraphs) = trainer("ab", 2).accumulate(&empty).unwrap();
		assert_eq!(digraphs, 0);
		assert_eq!(counts, TransitionCounts::new(2));
	}

	#[test]
	fn test_custom_prior() {
		let config = TrainingConfig::default().with_alphabet("ab").with_smoothing_prior(1.0);
		let (counts, _) = Trainer::new(config).unwrap().accumulate(&["aa"]).unwrap();
		assert_eq!(counts.count(0, 0), 2.0);
		assert_eq!(counts.count(1, 1), 1.0);
	}

	#[test]
	fn test_invalid_alphabet() {
		assert!(matches!(
			Trainer::new(TrainingConfig::default().with_alphabet("aa")),
			Err(GibberishError::DuplicateCharacter { character: 'a' })
		));
	}

	#[test]
	fn test_train_separable_sets() {
		let corpus = vec!["ab ab ab ab ba ba"; 20];
		let report = trainer("ab ", 2).train(&corpus, &["ab ba", "ab ab"], &["aaaa", "bbbb"]).unwrap();
		let calibration = report.calibration;
		assert_eq!(calibration.threshold, (calibration.minimum_good + calibration.maximum_bad) / 2.0);
		assert_eq!(report.model.threshold(), calibration.threshold);
		assert_eq!(report.corpus_lines, 20);
		assert_eq!(report.digraphs, 20 * 16);
		assert!(!report.model.is_gibberish("ab ab"));
		assert!(report.model.is_gibberish("bbbbbb"));
	}

	#[test]
	fn test_huge_worker_count_does_not_overflow() {
		let config = TrainingConfig::default().with_alphabet("ab").with_workers(usize::MAX);
		assert!(matches!(Trainer::new(config.clone()), Err(GibberishError::InvalidConfig(_))));

		// Bypass validation to exercise the chunk computation directly
		let index = AlphabetIndex::new(&config.alphabet).unwrap();
		let trainer = Trainer { config, index };
		let (counts, digraphs) = trainer.accumulate(&["ab", "ba", "ab"]).unwrap();
		assert_eq!(digraphs, 3);
		assert_eq!(counts.count(0, 1), 12.0);
		assert_eq!(counts.count(1, 0), 11.0);
	}

	#[test]
	fn test_mixed_case_alphabet() {
		let corpus = vec!["AB AB ab ab BA ba"; 20];
		let trainer = trainer("AB ", 2);
		assert_eq!(trainer.index().as_string(), "ab ");

		let (counts, digraphs) = trainer.accumulate(&corpus).unwrap();
		assert_eq!(digraphs, 20 * 16);
		assert!(counts.count(0, 1) > 10.0);

		let report = trainer.train(&corpus, &["ab ba", "AB AB"], &["aaaa", "BBBB"]).unwrap();
		assert!(!report.model.is_gibberish("AB ab"));
		assert!(report.model.is_gibberish("bbbbbb"));
	}

	#[test]
	fn test_train_inseparable_sets() {
		let corpus = vec!["ab ab ab ab"; 10];
		let result = trainer("ab ", 1).train(&corpus, &["aaaa"], &["ab ab"]);
		assert!(matches!(result, Err(GibberishError::Calibration { .. })));
	}
}
