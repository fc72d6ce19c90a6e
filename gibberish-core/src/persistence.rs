use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{GibberishError, Result};
use crate::io::{has_extension, parent_dir};
use crate::model::GibberishModel;

/// On-disk encoding of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFormat {
	/// Human-readable JSON object with `matrix`, `positions` and `threshold`.
	Json,
	/// Compact `postcard` encoding, selected by the `.bin` extension.
	Binary,
}

impl ModelFormat {
	/// Picks the format from the file extension: `.bin` is binary, anything
	/// else is JSON.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		if has_extension(path, "bin") { Self::Binary } else { Self::Json }
	}

	pub fn encode(self, model: &GibberishModel) -> Result<Vec<u8>> {
		Ok(match self {
			Self::Json => serde_json::to_vec(model)?,
			Self::Binary => postcard::to_stdvec(model)?,
		})
	}

	pub fn decode(self, bytes: &[u8]) -> Result<GibberishModel> {
		Ok(match self {
			Self::Json => serde_json::from_slice(bytes)?,
			Self::Binary => postcard::from_bytes(bytes)?,
		})
	}
}

/// Writes `model` to `path`, in the format given by its extension.
///
/// The model is written to a temporary file in the destination directory
/// which then replaces `path`, so readers never observe a partial model and
/// a failed save leaves any previous file untouched.
pub fn save<P: AsRef<Path>>(model: &GibberishModel, path: P) -> Result<()> {
	let path = path.as_ref();
	let format = ModelFormat::from_path(path);
	let bytes = format.encode(model)?;

	let parent = parent_dir(path);
	fs::create_dir_all(parent).map_err(|e| GibberishError::io(parent, e))?;

	let temp_file = NamedTempFile::new_in(parent).map_err(|e| GibberishError::io(parent, e))?;
	{
		let mut writer = BufWriter::new(temp_file.as_file());
		writer
			.write_all(&bytes)
			.and_then(|_| writer.flush())
			.map_err(|e| GibberishError::io(temp_file.path(), e))?;
	}
	temp_file.persist(path).map_err(|e| GibberishError::io(path, e.error))?;

	info!(path = %path.display(), ?format, bytes = bytes.len(), "model saved");
	Ok(())
}

/// Reads a model from `path`, in the format given by its extension.
///
/// # Errors
/// `Io` when the file cannot be read. Decoding errors (`Json`, `Binary`)
/// also cover stored parts that are inconsistent with each other.
pub fn load<P: AsRef<Path>>(path: P) -> Result<GibberishModel> {
	let path = path.as_ref();
	let format = ModelFormat::from_path(path);

	let model = match format {
		ModelFormat::Json => {
			let file = File::open(path).map_err(|e| GibberishError::io(path, e))?;
			serde_json::from_reader(BufReader::new(file))?
		}
		ModelFormat::Binary => {
			let bytes = fs::read(path).map_err(|e| GibberishError::io(path, e))?;
			format.decode(&bytes)?
		}
	};

	debug!(path = %path.display(), ?format, "model loaded");
	Ok(model)
}
