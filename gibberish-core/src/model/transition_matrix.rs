use serde::{Deserialize, Serialize};

use super::alphabet::AlphabetIndex;
use super::digraph::Digraph;
use crate::error::{GibberishError, Result};

/// Prior count given to every transition before any observation.
///
/// Without it, a single unseen transition would drive the probability of a
/// whole string to zero.
pub const SMOOTHING_PRIOR: f64 = 10.0;

/// Square table of transition counts, indexed by alphabet position.
///
/// Cell `(i, j)` counts how often the character at index `j` was observed
/// right after the character at index `i`.
///
/// ## Responsibilities:
/// - Accumulate digraph observations during training
/// - Merge with another table of the same size (parallel training)
/// - Turn into a [`TransitionMatrix`] of log-probabilities
///
/// ## Invariants
/// - The table is `size × size`, with `size > 0`
/// - Every cell is finite and non-negative
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionCounts {
	size: usize,
	/// Row-major cells.
	cells: Vec<f64>,
}

impl TransitionCounts {
	/// Creates a table where every cell holds [`SMOOTHING_PRIOR`].
	pub fn new(size: usize) -> Self {
		Self::with_prior(size, SMOOTHING_PRIOR)
	}

	/// Creates a table where every cell holds `prior`.
	pub fn with_prior(size: usize, prior: f64) -> Self {
		Self { size, cells: vec![prior; size * size] }
	}

	/// Creates a zero table, used for partial accumulation before merging.
	pub fn empty(size: usize) -> Self {
		Self::with_prior(size, 0.0)
	}

	pub fn size(&self) -> usize {
		self.size
	}

	/// Returns the count stored at `(from, to)`.
	///
	/// # Panics
	/// If either index is out of range.
	pub fn count(&self, from: usize, to: usize) -> f64 {
		self.cells[from * self.size + to]
	}

	/// Records one observation of `pair`.
	///
	/// # Errors
	/// `UnknownCharacter` if either character has no position in `index`.
	/// The table is left untouched in that case.
	pub fn accumulate(&mut self, pair: Digraph, index: &AlphabetIndex) -> Result<()> {
		let from = index.require(pair.first)?;
		let to = index.require(pair.second)?;
		self.check_index(index)?;
		self.cells[from * self.size + to] += 1.0;
		Ok(())
	}

	/// Adds every cell of `other` into this table.
	///
	/// # Errors
	/// `SizeMismatch` if the tables do not have the same size.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.size != other.size {
			return Err(GibberishError::SizeMismatch { expected: self.size, actual: other.size });
		}

		for (cell, value) in self.cells.iter_mut().zip(&other.cells) {
			*cell += value;
		}

		Ok(())
	}

	/// Total number of counts held by the table, prior included.
	pub fn total(&self) -> f64 {
		self.cells.iter().sum()
	}

	/// Converts counts into log-probabilities, row by row:
	/// `cell = ln(cell / row_sum)`.
	///
	/// Consumes the table, so normalization happens exactly once. Rows must
	/// have a strictly positive sum, which the smoothing prior guarantees.
	pub fn normalize(self) -> TransitionMatrix {
		let size = self.size;
		let rows: Vec<Vec<f64>> = self
			.cells
			.chunks(size.max(1))
			.map(|row| {
				let sum: f64 = row.iter().sum();
				row.iter().map(|count| (count / sum).ln()).collect::<Vec<f64>>()
			})
			.collect();

		TransitionMatrix { size, rows }
	}

	fn check_index(&self, index: &AlphabetIndex) -> Result<()> {
		if index.len() != self.size {
			return Err(GibberishError::SizeMismatch { expected: self.size, actual: index.len() });
		}
		Ok(())
	}
}

/// Normalized transition table.
///
/// Cell `(i, j)` holds the natural log of the probability of seeing the
/// character at index `j` right after the one at index `i`. Exponentiated
/// rows sum to 1.
///
/// Serialized as a two-dimensional array. Deserialization rejects tables
/// that are empty, not square, or contain non-finite values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct TransitionMatrix {
	size: usize,
	rows: Vec<Vec<f64>>,
}

impl TransitionMatrix {
	pub fn size(&self) -> usize {
		self.size
	}

	/// Log-probability of moving from index `from` to index `to`.
	///
	/// # Panics
	/// If either index is out of range.
	pub fn log_probability(&self, from: usize, to: usize) -> f64 {
		self.rows[from][to]
	}

	pub fn rows(&self) -> &[Vec<f64>] {
		&self.rows
	}
}

impl TryFrom<Vec<Vec<f64>>> for TransitionMatrix {
	type Error = GibberishError;

	fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
		let size = rows.len();
		if size == 0 {
			return Err(GibberishError::InvalidModel("transition matrix is empty".to_owned()));
		}
		for (i, row) in rows.iter().enumerate() {
			if row.len() != size {
				return Err(GibberishError::InvalidModel(format!(
					"row {i} has {} cells, expected {size}",
					row.len()
				)));
			}
			if let Some(value) = row.iter().find(|v| !v.is_finite()) {
				return Err(GibberishError::InvalidModel(format!("row {i} holds non-finite value {value}")));
			}
		}
		Ok(Self { size, rows })
	}
}

impl From<TransitionMatrix> for Vec<Vec<f64>> {
	fn from(matrix: TransitionMatrix) -> Self {
		matrix.rows
	}
}
