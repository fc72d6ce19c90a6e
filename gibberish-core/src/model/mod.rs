//! Digraph transition model.
//!
//! This module groups the statistical pieces of the detector:
//! - Character positions (`AlphabetIndex`)
//! - Adjacent character pairs (`Digraphs`)
//! - Transition counts and log-probabilities (`TransitionCounts`, `TransitionMatrix`)
//! - Scoring of a text against a matrix (`scorer`)
//! - The trained, immutable detector (`GibberishModel`)

/// Dense character → position mapping over the accepted alphabet.
pub mod alphabet;

/// Lazy extraction of adjacent character pairs.
pub mod digraph;

/// Counting table used during training and its normalized form.
///
/// Handles accumulation, shard merging and log-probability normalization.
pub mod transition_matrix;

/// Average log-probability of a text.
pub mod scorer;

/// Trained model bundle and the gibberish decision.
pub mod classifier;

pub use alphabet::AlphabetIndex;
pub use classifier::{is_gibberish, GibberishModel};
pub use digraph::{Digraph, Digraphs};
pub use scorer::{average_transition_probability, DEGENERATE_SCORE};
pub use transition_matrix::{TransitionCounts, TransitionMatrix, SMOOTHING_PRIOR};
