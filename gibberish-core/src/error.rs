use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, training, persisting or loading a model.
#[derive(Error, Debug)]
pub enum GibberishError {
	#[error("Alphabet contains the character {character:?} more than once")]
	DuplicateCharacter { character: char },

	#[error("Alphabet must contain at least one character")]
	EmptyAlphabet,

	/// A training sample contains a character outside the alphabet.
	/// `line` is 1-based and is `None` when the sample has no file position.
	#[error("Unable to find the position of the character {character:?}{}", line.map(|l| format!(" (line {l})")).unwrap_or_default())]
	UnknownCharacter { character: char, line: Option<usize> },

	#[error("Unable to discriminate plausible from gibberish text: minimum good score {minimum_good} <= maximum bad score {maximum_bad}")]
	Calibration { minimum_good: f64, maximum_bad: f64 },

	#[error("No usable {label} examples: every line is empty or has no accepted digraphs")]
	EmptyLabelSet { label: &'static str },

	#[error("Matrix size mismatch: expected {expected}, got {actual}")]
	SizeMismatch { expected: usize, actual: usize },

	#[error("Invalid model: {0}")]
	InvalidModel(String),

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("I/O error on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("JSON model error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Binary model error: {0}")]
	Binary(#[from] postcard::Error),
}

impl GibberishError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}

	/// Attaches a 1-based corpus line number to an `UnknownCharacter` error.
	pub(crate) fn at_line(self, line: usize) -> Self {
		match self {
			Self::UnknownCharacter { character, .. } => Self::UnknownCharacter { character, line: Some(line) },
			other => other,
		}
	}
}

pub type Result<T> = std::result::Result<T, GibberishError>;
