//! Model training.
//!
//! Turns a reference corpus and two labeled example sets into a
//! `GibberishModel`:
//! - Parallel digraph accumulation into a `TransitionCounts` table
//! - Normalization into log-probabilities
//! - Threshold calibration (`Calibration`)

/// Threshold calibration against known-good and known-bad lines.
pub mod calibration;

/// Corpus ingestion and model construction.
pub mod trainer;

pub use calibration::Calibration;
pub use trainer::{train_model, Trainer, TrainingReport};
