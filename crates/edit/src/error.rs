//! Error types for edits.

use std::io;

use meloncillo_doors::DoorSet;
use thiserror::Error;

/// Errors raised while performing, undoing or redoing edits.
#[derive(Debug, Error)]
pub enum EditError {
	/// The doors an edit needs could not be acquired before the timeout.
	/// Nothing was changed.
	#[error("timed out acquiring doors {0:?}")]
	LockTimeout(DoorSet),

	/// An I/O operation failed, typically reading or writing a spill file.
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// The edit cannot be undone in its current state, or undoing it failed.
	#[error("cannot undo {name}")]
	CannotUndo {
		/// Presentation name of the edit.
		name: String,
		/// Underlying I/O failure, if any.
		#[source]
		source: Option<io::Error>,
	},

	/// The edit cannot be redone in its current state, or redoing it failed.
	#[error("cannot redo {name}")]
	CannotRedo {
		/// Presentation name of the edit.
		name: String,
		/// Underlying I/O failure, if any.
		#[source]
		source: Option<io::Error>,
	},

	/// The compound edit no longer accepts sub-edits.
	#[error("compound edit is closed")]
	Closed,

	/// An object the edit refers to is no longer part of the target.
	#[error("edit target is missing: {0}")]
	MissingTarget(String),
}

impl EditError {
	pub(crate) fn cannot_undo(name: impl Into<String>) -> Self {
		EditError::CannotUndo {
			name: name.into(),
			source: None,
		}
	}

	pub(crate) fn cannot_redo(name: impl Into<String>) -> Self {
		EditError::CannotRedo {
			name: name.into(),
			source: None,
		}
	}

	/// Converts an I/O failure during undo into [`EditError::CannotUndo`].
	pub(crate) fn while_undoing(self, name: &str) -> Self {
		match self {
			EditError::Io(source) => EditError::CannotUndo {
				name: name.to_string(),
				source: Some(source),
			},
			other => other,
		}
	}

	/// Converts an I/O failure during redo into [`EditError::CannotRedo`].
	pub(crate) fn while_redoing(self, name: &str) -> Self {
		match self {
			EditError::Io(source) => EditError::CannotRedo {
				name: name.to_string(),
				source: Some(source),
			},
			other => other,
		}
	}
}

/// Result type for edit operations.
pub type Result<T> = std::result::Result<T, EditError>;
