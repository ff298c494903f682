//! Session settings loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables of a session.
///
/// Every key is optional in the TOML form:
///
/// ```toml
/// lock-timeout-ms = 2000
/// paint-timeout-ms = 50
/// undo-limit = 100
/// spill-threshold = 4096
/// spill-dir = "/var/tmp/meloncillo"
/// default-rate = 44100.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionConfig {
	/// How long edits wait for their doors. Absent or zero waits forever.
	pub lock_timeout_ms: Option<u64>,
	/// How long painting reads wait before skipping a frame.
	pub paint_timeout_ms: u64,
	/// Number of edits kept in the undo history. Zero keeps every edit.
	pub undo_limit: usize,
	/// Table length from which sensitivity-table edits keep their payloads
	/// in spill files instead of memory.
	pub spill_threshold: usize,
	/// Directory for spill files; the system temp dir if absent.
	pub spill_dir: Option<PathBuf>,
	/// Initial timeline sample rate.
	pub default_rate: f64,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			lock_timeout_ms: None,
			paint_timeout_ms: 50,
			undo_limit: 100,
			spill_threshold: 4096,
			spill_dir: None,
			default_rate: 44100.0,
		}
	}
}

impl SessionConfig {
	/// Parses a configuration from TOML text.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::from_toml(&content)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if !(self.default_rate.is_finite() && self.default_rate > 0.0) {
			return Err(ConfigError::Invalid(format!(
				"default-rate must be positive, got {}",
				self.default_rate
			)));
		}
		Ok(())
	}

	/// Timeout for door acquisition by edits.
	pub fn lock_timeout(&self) -> Option<Duration> {
		self.lock_timeout_ms
			.filter(|ms| *ms > 0)
			.map(Duration::from_millis)
	}

	/// Timeout for shared reads that may be skipped.
	pub fn paint_timeout(&self) -> Option<Duration> {
		Some(Duration::from_millis(self.paint_timeout_ms))
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		assert_eq!(SessionConfig::from_toml("").unwrap(), SessionConfig::default());
	}

	#[test]
	fn kebab_case_keys() {
		let config = SessionConfig::from_toml(
			r#"
			lock-timeout-ms = 250
			undo-limit = 8
			spill-dir = "/tmp/spill"
			default-rate = 48000.0
			"#,
		)
		.unwrap();
		assert_eq!(config.lock_timeout(), Some(Duration::from_millis(250)));
		assert_eq!(config.undo_limit, 8);
		assert_eq!(config.spill_dir.as_deref(), Some(Path::new("/tmp/spill")));
		assert_eq!(config.default_rate, 48000.0);
		assert_eq!(config.paint_timeout(), Some(Duration::from_millis(50)));
	}

	#[test]
	fn zero_lock_timeout_waits_forever() {
		let config = SessionConfig::from_toml("lock-timeout-ms = 0").unwrap();
		assert_eq!(config.lock_timeout(), None);
	}

	#[test]
	fn rejects_bad_values() {
		assert!(matches!(
			SessionConfig::from_toml("default-rate = -1.0"),
			Err(ConfigError::Invalid(_))
		));
		assert!(matches!(
			SessionConfig::from_toml("undo-depth = 3"),
			Err(ConfigError::Toml(_))
		));
	}

	#[test]
	fn load_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("absent.toml");
		match SessionConfig::load(&missing) {
			Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
			other => panic!("unexpected result: {other:?}"),
		}

		let path = dir.path().join("session.toml");
		let mut file = std::fs::File::create(&path).unwrap();
		writeln!(file, "spill-threshold = 16").unwrap();
		assert_eq!(SessionConfig::load(&path).unwrap().spill_threshold, 16);
	}
}
