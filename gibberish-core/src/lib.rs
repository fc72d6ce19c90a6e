//! Gibberish detection with a character digraph model.
//!
//! This crate classifies short strings as plausible text or gibberish:
//! - A transition matrix of log-probabilities between accepted characters,
//!   learned from a reference corpus
//! - Scoring of a string as the average log-probability of its digraphs
//! - A threshold calibrated on known-good and known-bad examples
//! - JSON or binary persistence of the trained model
//!
//! Training produces an immutable `GibberishModel` that can be shared
//! freely between threads for classification.

/// Digraph model: alphabet, extraction, matrix, scoring and classification.
pub mod model;

/// Training pipeline and threshold calibration.
pub mod training;

/// Model save / load.
pub mod persistence;

/// Training parameters and default file names.
pub mod config;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (line reading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use config::{TrainingConfig, TrainingPaths};
pub use error::{GibberishError, Result};
pub use model::{is_gibberish, GibberishModel};
pub use training::{train_model, Trainer, TrainingReport};
