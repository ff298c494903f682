//! Temporary files holding large undo payloads.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::trace;

/// Creates spill files in a fixed directory, or the system temp dir.
#[derive(Debug, Clone, Default)]
pub struct SpillStore {
	dir: Option<PathBuf>,
}

impl SpillStore {
	pub fn new(dir: Option<PathBuf>) -> Self {
		Self { dir }
	}

	pub fn dir(&self) -> Option<&Path> {
		self.dir.as_deref()
	}

	/// Writes `data` to a new spill file.
	pub fn write(&self, data: &[f32]) -> io::Result<SpillFile> {
		let mut file = match &self.dir {
			Some(dir) => NamedTempFile::new_in(dir)?,
			None => NamedTempFile::new()?,
		};
		let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
		file.write_all(&bytes)?;
		file.flush()?;
		trace!(path = %file.path().display(), len = data.len(), "spilled table");
		Ok(SpillFile { file, len: data.len() })
	}
}

/// A table of `f32` values stored little-endian in a temporary file.
///
/// The file is deleted when the handle is dropped.
#[derive(Debug)]
pub struct SpillFile {
	file: NamedTempFile,
	len: usize,
}

impl SpillFile {
	/// Number of values stored.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn path(&self) -> &Path {
		self.file.path()
	}

	/// Reads the table back.
	///
	/// Fails with [`io::ErrorKind::InvalidData`] if the file no longer holds
	/// exactly the values written.
	pub fn read(&self) -> io::Result<Vec<f32>> {
		let bytes = std::fs::read(self.file.path())?;
		if bytes.len() != self.len * 4 {
			return Err(io::Error::new(
				io::ErrorKind::InvalidData,
				format!("spill file holds {} bytes, expected {}", bytes.len(), self.len * 4),
			));
		}
		Ok(bytes
			.chunks_exact(4)
			.map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
			.collect())
	}
}
