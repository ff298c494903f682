//! Linear undo history.


use tracing::debug;

use crate::edit::{Edit, Tracked};
use crate::error::{EditError, Result};

/// Default number of edits kept by an [`UndoManager`].
pub const DEFAULT_LIMIT: usize = 100;

/// A bounded history of performed edits.
///
/// Edits before the cursor are done, edits after it are undone. Adding an
/// edit discards everything after the cursor. Undo and redo move by
/// significant edits: insignificant edits are replayed together with the
/// nearest significant edit.
#[derive(Debug)]
pub struct UndoManager<E> {
	edits: Vec<Tracked<E>>,
	cursor: usize,
	limit: usize,
}

impl<E: Edit> Default for UndoManager<E> {
	fn default() -> Self {
		Self::new(DEFAULT_LIMIT)
	}
}

impl<E: Edit> UndoManager<E> {
	/// Creates an empty history keeping at most `limit` edits. A limit of
	/// zero keeps every edit.
	pub fn new(limit: usize) -> Self {
		Self {
			edits: Vec::new(),
			cursor: 0,
			limit,
		}
	}

	/// Returns the number of edits in the history, done or undone.
	pub fn len(&self) -> usize {
		self.edits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Changes the limit, dropping the oldest edits if necessary.
	pub fn set_limit(&mut self, limit: usize) {
		self.limit = limit;
		self.trim();
	}

	/// Iterates over the edits, oldest first.
	pub fn edits(&self) -> impl Iterator<Item = &E> {
		self.edits.iter().map(Tracked::edit)
	}

	/// Records a performed edit.
	///
	/// Undone edits are discarded first. The previous edit may then absorb
	/// `edit`, or `edit` may replace it.
	pub fn add_edit(&mut self, edit: E) {
		for mut dropped in self.edits.drain(self.cursor..).rev() {
			dropped.die();
		}

		let mut edit = Tracked::new(edit);
		if let Some(last) = self.edits.last_mut() {
			if last.absorb(&mut edit) {
				debug!(edit = %last.presentation_name(), "edit merged into previous");
				return;
			}
			if edit.supersede(last) {
				self.edits.pop();
			}
		}
		self.edits.push(edit);
		self.cursor = self.edits.len();
		self.trim();
	}

	fn trim(&mut self) {
		if self.limit == 0 || self.edits.len() <= self.limit {
			return;
		}
		let excess = self.edits.len() - self.limit;
		for mut dropped in self.edits.drain(..excess) {
			dropped.die();
		}
		self.cursor = self.cursor.saturating_sub(excess);
	}

	fn undo_stop(&self) -> Option<usize> {
		(0..self.cursor).rev().find(|&i| self.edits[i].is_significant())
	}

	fn redo_stop(&self) -> Option<usize> {
		(self.cursor..self.edits.len()).find(|&i| self.edits[i].is_significant())
	}

	/// Returns `true` if a significant edit can be undone.
	pub fn can_undo(&self) -> bool {
		self.undo_stop()
			.is_some_and(|i| self.edits[i].can_undo())
	}

	/// Returns `true` if a significant edit can be redone.
	pub fn can_redo(&self) -> bool {
		self.redo_stop()
			.is_some_and(|i| self.edits[i].can_redo())
	}

	/// Name of the edit [`undo`](Self::undo) would revert.
	pub fn undo_presentation_name(&self) -> Option<String> {
		self.undo_stop()
			.map(|i| self.edits[i].presentation_name())
	}

	/// Name of the edit [`redo`](Self::redo) would re-apply.
	pub fn redo_presentation_name(&self) -> Option<String> {
		self.redo_stop()
			.map(|i| self.edits[i].presentation_name())
	}

	/// Undoes edits back to and including the last significant one.
	///
	/// Stops at the first failure; edits undone before it stay undone.
	pub fn undo(&mut self, target: &E::Target) -> Result<()> {
		let Some(stop) = self.undo_stop() else {
			return Err(EditError::cannot_undo("nothing to undo"));
		};
		while self.cursor > stop {
			self.edits[self.cursor - 1].undo(target)?;
			self.cursor -= 1;
		}
		Ok(())
	}

	/// Redoes edits forward through the next significant one.
	///
	/// Stops at the first failure; edits redone before it stay done.
	pub fn redo(&mut self, target: &E::Target) -> Result<()> {
		let Some(stop) = self.redo_stop() else {
			return Err(EditError::cannot_redo("nothing to redo"));
		};
		while self.cursor <= stop {
			self.edits[self.cursor].redo(target)?;
			self.cursor += 1;
		}
		Ok(())
	}

	/// Kills and removes every edit.
	pub fn discard_all_edits(&mut self) {
		for mut dropped in self.edits.drain(..).rev() {
			dropped.die();
		}
		self.cursor = 0;
	}
}
