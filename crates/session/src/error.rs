//! Error types for session configuration and persistence.

use std::path::PathBuf;

use meloncillo_doors::DoorSet;
use thiserror::Error;

/// Errors that can occur when loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an unknown key.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A value is outside its admissible range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// Errors that can occur when saving or loading a session.
#[derive(Debug, Error)]
pub enum SessionError {
	/// Error reading or writing a session file.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Path of the session file.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The session file is not valid JSON.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The element tree does not describe a session.
	#[error("malformed session element: {0}")]
	Malformed(String),

	/// The session doors could not be acquired before the timeout.
	#[error("timed out acquiring doors {0:?}")]
	LockTimeout(DoorSet),
}

/// Result type for session persistence.
pub type Result<T> = std::result::Result<T, SessionError>;
