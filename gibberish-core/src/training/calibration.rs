use tracing::warn;

use crate::error::{GibberishError, Result};
use crate::model::scorer::{average_transition_probability, is_degenerate};
use crate::model::{AlphabetIndex, TransitionMatrix};

/// Decision threshold derived from labeled examples.
///
/// `threshold` sits halfway between the worst plausible score and the best
/// gibberish score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
	pub minimum_good: f64,
	pub maximum_bad: f64,
	pub threshold: f64,
}

impl Calibration {
	/// Computes the threshold from the scores of known-good and known-bad
	/// lines.
	///
	/// # Errors
	/// - `EmptyLabelSet` if either set is empty.
	/// - `Calibration` if the worst good score does not exceed the best bad
	///   score: the model cannot tell the two sets apart.
	pub fn from_scores(good: &[f64], bad: &[f64]) -> Result<Self> {
		let minimum_good = good
			.iter()
			.copied()
			.reduce(f64::min)
			.ok_or(GibberishError::EmptyLabelSet { label: "good" })?;
		let maximum_bad = bad
			.iter()
			.copied()
			.reduce(f64::max)
			.ok_or(GibberishError::EmptyLabelSet { label: "bad" })?;

		if minimum_good <= maximum_bad {
			return Err(GibberishError::Calibration { minimum_good, maximum_bad });
		}

		Ok(Self { minimum_good, maximum_bad, threshold: (minimum_good + maximum_bad) / 2.0 })
	}
}

/// Scores every line of a labeled set.
///
/// Lines without any accepted digraph (blank lines, single characters,
/// foreign text) are skipped: their sentinel score says nothing about the
/// set and would make the threshold non-finite.
pub fn score_lines<S: AsRef<str>>(
	lines: &[S],
	matrix: &TransitionMatrix,
	index: &AlphabetIndex,
	label: &'static str,
) -> Vec<f64> {
	lines
		.iter()
		.enumerate()
		.filter_map(|(number, line)| {
			let score = average_transition_probability(line.as_ref(), matrix, index);
			if is_degenerate(score) {
				if !line.as_ref().trim().is_empty() {
					warn!(label, line = number + 1, "skipping example without accepted digraphs");
				}
				None
			} else {
				Some(score)
			}
		})
		.collect()
}
