use serde::{Deserialize, Serialize};

use super::alphabet::AlphabetIndex;
use super::scorer::average_transition_probability;
use super::transition_matrix::TransitionMatrix;
use crate::error::{GibberishError, Result};

/// A trained gibberish detector.
///
/// Bundles the alphabet index, the normalized transition matrix and the
/// decision threshold. Built once by the trainer or loaded from disk, and
/// never mutated afterwards, so it can be shared across threads and
/// queried concurrently without locking.
///
/// # Invariants
/// - `matrix.size() == positions.len()`
/// - `threshold` is finite
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "RawModel")]
pub struct GibberishModel {
	matrix: TransitionMatrix,
	positions: AlphabetIndex,
	threshold: f64,
}

/// Unchecked persisted form of [`GibberishModel`].
#[derive(Deserialize)]
struct RawModel {
	matrix: TransitionMatrix,
	positions: AlphabetIndex,
	threshold: f64,
}

impl TryFrom<RawModel> for GibberishModel {
	type Error = GibberishError;

	fn try_from(raw: RawModel) -> Result<Self> {
		Self::new(raw.positions, raw.matrix, raw.threshold)
	}
}

impl GibberishModel {
	/// Bundles a model.
	///
	/// # Errors
	/// - `SizeMismatch` if the matrix size differs from the alphabet size.
	/// - `InvalidModel` if `threshold` is not finite.
	pub fn new(positions: AlphabetIndex, matrix: TransitionMatrix, threshold: f64) -> Result<Self> {
		if matrix.size() != positions.len() {
			return Err(GibberishError::SizeMismatch { expected: positions.len(), actual: matrix.size() });
		}
		if !threshold.is_finite() {
			return Err(GibberishError::InvalidModel(format!("threshold {threshold} is not finite")));
		}
		Ok(Self { matrix, positions, threshold })
	}

	/// Average transition log-probability of `text` under this model.
	///
	/// See [`average_transition_probability`] for the degenerate case.
	pub fn score(&self, text: &str) -> f64 {
		average_transition_probability(text, &self.matrix, &self.positions)
	}

	/// Returns true if `text` is likely to be gibberish, i.e. its score is
	/// at or below the threshold.
	pub fn is_gibberish(&self, text: &str) -> bool {
		self.score(text) <= self.threshold
	}

	pub fn threshold(&self) -> f64 {
		self.threshold
	}

	pub fn index(&self) -> &AlphabetIndex {
		&self.positions
	}

	pub fn matrix(&self) -> &TransitionMatrix {
		&self.matrix
	}
}

/// Returns true if `text` is likely to be gibberish under `model`.
pub fn is_gibberish(text: &str, model: &GibberishModel) -> bool {
	model.is_gibberish(text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::digraph::Digraphs;
	use crate::model::transition_matrix::TransitionCounts;

	fn model(threshold: f64) -> GibberishModel {
		let index = AlphabetIndex::new("ab").unwrap();
		let mut counts = TransitionCounts::new(2);
		for pair in Digraphs::new("abababab") {
			counts.accumulate(pair, &index).unwrap();
		}
		GibberishModel::new(index, counts.normalize(), threshold).unwrap()
	}

	#[test]
	fn test_threshold_is_inclusive() {
		let probe = model(0.0);
		let score = probe.score("ab");
		let at = model(score);
		assert!(at.is_gibberish("ab"));
		let below = model(score - 1e-9);
		assert!(!is_gibberish("ab", &below));
	}

	#[test]
	fn test_degenerate_text_is_gibberish() {
		let m = model(-100.0);
		assert!(m.is_gibberish(""));
		assert!(m.is_gibberish("a"));
		assert!(!m.is_gibberish("ab"));
	}

	#[test]
	fn test_rejects_inconsistent_parts() {
		let index = AlphabetIndex::new("abc").unwrap();
		let matrix = TransitionCounts::new(2).normalize();
		assert!(matches!(
			GibberishModel::new(index.clone(), matrix, -1.0),
			Err(GibberishError::SizeMismatch { .. })
		));

		let matrix = TransitionCounts::new(3).normalize();
		assert!(GibberishModel::new(index, matrix, f64::NAN).is_err());
	}

	#[test]
	fn test_shared_across_threads() {
		let m = std::sync::Arc::new(model(-1.0));
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let m = m.clone();
				std::thread::spawn(move || m.score("abab"))
			})
			.collect();
		let expected = m.score("abab");
		for handle in handles {
			assert_eq!(handle.join().unwrap(), expected);
		}
	}
}
