use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::digraph::fold_case;
use crate::error::{GibberishError, Result};

/// Dense index over the accepted characters.
///
/// Each character of the alphabet maps to its ordinal position, so the
/// mapping is a bijection onto `[0, N)`. Characters outside the alphabet
/// have no position.
///
/// # Invariants
/// - `chars[positions[c]] == c` for every accepted `c`
/// - `positions.len() == chars.len() > 0`
///
/// Serialized as a character → index map. Deserialization rebuilds the
/// ordered view and rejects maps that are not a bijection onto `[0, N)`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "BTreeMap<char, usize>", into = "BTreeMap<char, usize>")]
pub struct AlphabetIndex {
	/// Accepted characters, in index order.
	chars: Vec<char>,
	/// Reverse lookup from character to index.
	positions: HashMap<char, usize>,
}

impl AlphabetIndex {
	/// Builds the index from an ordered string of distinct characters.
	///
	/// Characters are lower-cased the same way as scored text, so `"AB"`
	/// accepts the digraphs of `"abab"` and `"ABAB"` alike.
	///
	/// # Errors
	/// - `EmptyAlphabet` if `alphabet` is empty.
	/// - `DuplicateCharacter` if a character appears twice once lower-cased
	///   (`"abca"`, `"Aa"`). Duplicates are rejected rather than silently
	///   overwriting the earlier position.
	pub fn new(alphabet: &str) -> Result<Self> {
		let mut chars = Vec::new();
		let mut positions = HashMap::new();

		for (position, character) in alphabet.chars().map(fold_case).enumerate() {
			if positions.insert(character, position).is_some() {
				return Err(GibberishError::DuplicateCharacter { character });
			}
			chars.push(character);
		}

		if chars.is_empty() {
			return Err(GibberishError::EmptyAlphabet);
		}

		Ok(Self { chars, positions })
	}

	/// Returns the position of `character`, or `None` if it is not accepted.
	pub fn position(&self, character: char) -> Option<usize> {
		self.positions.get(&character).copied()
	}

	/// Returns the position of `character`.
	///
	/// # Errors
	/// `UnknownCharacter` if the character is not part of the alphabet.
	pub fn require(&self, character: char) -> Result<usize> {
		self.position(character)
			.ok_or(GibberishError::UnknownCharacter { character, line: None })
	}

	pub fn contains(&self, character: char) -> bool {
		self.positions.contains_key(&character)
	}

	/// Number of accepted characters (N).
	pub fn len(&self) -> usize {
		self.chars.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chars.is_empty()
	}

	/// Returns the accepted characters in index order.
	pub fn chars(&self) -> &[char] {
		&self.chars
	}

	/// Returns the alphabet as a string, in index order.
	pub fn as_string(&self) -> String {
		self.chars.iter().collect()
	}
}

impl TryFrom<BTreeMap<char, usize>> for AlphabetIndex {
	type Error = GibberishError;

	fn try_from(map: BTreeMap<char, usize>) -> Result<Self> {
		if map.is_empty() {
			return Err(GibberishError::EmptyAlphabet);
		}

		let mut slots: Vec<Option<char>> = vec![None; map.len()];
		for (&character, &position) in &map {
			if fold_case(character) != character {
				return Err(GibberishError::InvalidModel(format!(
					"character {character:?} is not lower-case"
				)));
			}
			let slot = slots.get_mut(position).ok_or_else(|| {
				GibberishError::InvalidModel(format!(
					"position {position} of {character:?} is outside [0, {})",
					map.len()
				))
			})?;
			if let Some(previous) = slot.replace(character) {
				return Err(GibberishError::InvalidModel(format!(
					"characters {previous:?} and {character:?} share position {position}"
				)));
			}
		}

		// Every slot is filled: |map| characters landed on |map| distinct slots.
		let chars: Vec<char> = slots.into_iter().flatten().collect();
		let positions = map.into_iter().collect();
		Ok(Self { chars, positions })
	}
}

impl From<AlphabetIndex> for BTreeMap<char, usize> {
	fn from(index: AlphabetIndex) -> Self {
		index.positions.into_iter().collect()
	}
}
