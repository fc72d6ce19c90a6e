use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{GibberishError, Result};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let mut contents = String::new();
	File::open(path)
		.and_then(|mut file| file.read_to_string(&mut contents))
		.map_err(|e| GibberishError::io(path, e))?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Returns the directory holding `path`.
///
/// Example:
/// `data/model.json` → `data`, `model.json` → `.`
pub(crate) fn parent_dir(path: &Path) -> &Path {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	}
}

/// Returns true when `path` has the given extension (case-insensitive).
pub(crate) fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
	path.as_ref()
		.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
