use std::str::Chars;

use super::alphabet::AlphabetIndex;

/// An ordered pair of adjacent characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digraph {
	pub first: char,
	pub second: char,
}

/// Lazy sequence of every adjacent character pair of a string, scanned
/// left to right.
///
/// Characters are lower-cased before pairing. Strings with fewer than two
/// characters yield nothing. The iterator borrows the input and is `Clone`,
/// so the sequence can be replayed from any point.
#[derive(Clone, Debug)]
pub struct Digraphs<'a> {
	chars: Chars<'a>,
	previous: Option<char>,
}

impl<'a> Digraphs<'a> {
	pub fn new(text: &'a str) -> Self {
		let mut chars = text.chars();
		let previous = chars.next().map(fold_case);
		Self { chars, previous }
	}

	/// Restricts the sequence to pairs whose both members are accepted by
	/// `index`. Pairs touching any other character are dropped silently.
	pub fn accepted(self, index: &'a AlphabetIndex) -> AcceptedDigraphs<'a> {
		AcceptedDigraphs { inner: self, index }
	}
}

impl Iterator for Digraphs<'_> {
	type Item = Digraph;

	fn next(&mut self) -> Option<Digraph> {
		let first = self.previous?;
		let second = fold_case(self.chars.next()?);
		self.previous = Some(second);
		Some(Digraph { first, second })
	}
}

/// Digraphs restricted to an alphabet. See [`Digraphs::accepted`].
#[derive(Clone, Debug)]
pub struct AcceptedDigraphs<'a> {
	inner: Digraphs<'a>,
	index: &'a AlphabetIndex,
}

impl Iterator for AcceptedDigraphs<'_> {
	type Item = Digraph;

	fn next(&mut self) -> Option<Digraph> {
		let index = self.index;
		self.inner
			.by_ref()
			.find(|pair| index.contains(pair.first) && index.contains(pair.second))
	}
}

/// Lower-cases a character, keeping the first char of multi-char mappings.
pub(crate) fn fold_case(c: char) -> char {
	c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pairs(text: &str) -> Vec<(char, char)> {
		Digraphs::new(text).map(|d| (d.first, d.second)).collect()
	}

	#[test]
	fn test_scan_order() {
		assert_eq!(pairs("abc"), vec![('a', 'b'), ('b', 'c')]);
	}

	#[test]
	fn test_short_strings_are_empty() {
		assert!(pairs("").is_empty());
		assert!(pairs("a").is_empty());
	}

	#[test]
	fn test_lowercase() {
		assert_eq!(pairs("Hi"), vec![('h', 'i')]);
	}

	#[test]
	fn test_multibyte_characters() {
		assert_eq!(pairs("éa"), vec![('é', 'a')]);
	}

	#[test]
	fn test_accepted_drops_foreign_pairs() {
		let index = AlphabetIndex::new("ab ").unwrap();
		let accepted: Vec<_> = Digraphs::new("a1b ab")
			.accepted(&index)
			.map(|d| (d.first, d.second))
			.collect();
		// "a1" and "1b" are dropped, no new pair "ab" is synthesised across the '1'
		assert_eq!(accepted, vec![('b', ' '), (' ', 'a'), ('a', 'b')]);
	}

	#[test]
	fn test_restartable() {
		let digraphs = Digraphs::new("hello");
		let first: Vec<_> = digraphs.clone().collect();
		let second: Vec<_> = digraphs.collect();
		assert_eq!(first, second);
		assert_eq!(first.len(), 4);
	}
}
