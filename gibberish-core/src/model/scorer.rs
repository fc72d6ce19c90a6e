use super::alphabet::AlphabetIndex;
use super::digraph::Digraphs;
use super::transition_matrix::TransitionMatrix;

/// Score given to text that has no accepted digraph at all.
///
/// It sits below every real score, so such text always classifies as
/// gibberish.
pub const DEGENERATE_SCORE: f64 = f64::NEG_INFINITY;

/// Average log-probability of the accepted digraphs of `text`.
///
/// Returns [`DEGENERATE_SCORE`] when `text` yields no accepted digraph
/// (empty, a single character, or only characters outside the alphabet).
///
/// `matrix` and `index` must come from the same model: every accepted
/// character's position has to be a valid matrix index.
pub fn average_transition_probability(text: &str, matrix: &TransitionMatrix, index: &AlphabetIndex) -> f64 {
	let (total, count) = Digraphs::new(text)
		.accepted(index)
		.filter_map(|pair| Some((index.position(pair.first)?, index.position(pair.second)?)))
		.fold((0.0, 0usize), |(total, count), (from, to)| {
			(total + matrix.log_probability(from, to), count + 1)
		});

	if count == 0 {
		return DEGENERATE_SCORE;
	}
	total / count as f64
}

/// Returns true when `score` is the degenerate-input sentinel.
pub fn is_degenerate(score: f64) -> bool {
	score == DEGENERATE_SCORE
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::transition_matrix::TransitionCounts;

	fn trained(alphabet: &str, corpus: &str) -> (AlphabetIndex, TransitionMatrix) {
		let index = AlphabetIndex::new(alphabet).unwrap();
		let mut counts = TransitionCounts::new(index.len());
		for pair in Digraphs::new(corpus).accepted(&index) {
			counts.accumulate(pair, &index).unwrap();
		}
		(index, counts.normalize())
	}

	#[test]
	fn test_average_of_log_probabilities() {
		let (index, matrix) = trained("ab", "aaaaab");
		let expected = (matrix.log_probability(0, 0) + matrix.log_probability(0, 1)) / 2.0;
		let score = average_transition_probability("aab", &matrix, &index);
		assert!((score - expected).abs() < 1e-15);
	}

	#[test]
	fn test_degenerate_inputs() {
		let (index, matrix) = trained("ab", "abab");
		for text in ["", "a", "!!", "a!b", "ü"] {
			let score = average_transition_probability(text, &matrix, &index);
			assert!(is_degenerate(score), "{text:?} scored {score}");
		}
	}

	#[test]
	fn test_frequent_transitions_score_higher() {
		let (index, matrix) = trained("ab", "abababababab");
		let frequent = average_transition_probability("abab", &matrix, &index);
		let rare = average_transition_probability("aabb", &matrix, &index);
		assert!(frequent > rare);
		assert!(frequent.is_finite() && rare.is_finite());
	}

	#[test]
	fn test_ignores_foreign_characters() {
		let (index, matrix) = trained("ab", "abab");
		let clean = average_transition_probability("ab", &matrix, &index);
		let noisy = average_transition_probability("ab!!", &matrix, &index);
		assert_eq!(clean, noisy);
	}
}
