//! Grouping of several edits into one undo step.


use tracing::warn;

use crate::edit::{Edit, Tracked};
use crate::error::{EditError, Result};

/// State of a [`CompoundEdit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundState {
	/// Accepting sub-edits.
	Open,
	/// Closed; can be undone and redone as a unit.
	Ended,
	/// Every sub-edit was reverted and discarded.
	Cancelled,
	/// Left the history for good.
	Dead,
}

/// An ordered group of performed edits undone and redone as a unit.
///
/// Sub-edits are added while the compound is open and are expected to have
/// been performed already. Undo walks the sub-edits last to first, redo
/// first to last. If a sub-edit fails during either replay, the sub-edits
/// replayed so far are rolled back and the error is returned, leaving the
/// compound in the state it had before the call.
#[derive(Debug)]
pub struct CompoundEdit<E> {
	name: String,
	edits: Vec<Tracked<E>>,
	state: CompoundState,
}

impl<E: Edit> CompoundEdit<E> {
	/// Creates an open compound. An empty name falls back to the name of the
	/// last sub-edit.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			edits: Vec::new(),
			state: CompoundState::Open,
		}
	}

	pub fn state(&self) -> CompoundState {
		self.state
	}

	pub fn is_open(&self) -> bool {
		self.state == CompoundState::Open
	}

	/// Returns the number of sub-edits.
	pub fn len(&self) -> usize {
		self.edits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	/// Iterates over the sub-edits in the order they were added.
	pub fn edits(&self) -> impl Iterator<Item = &E> {
		self.edits.iter().map(Tracked::edit)
	}

	/// Appends a performed edit.
	///
	/// The last sub-edit gets the chance to absorb `edit`; failing that,
	/// `edit` may replace the last sub-edit. Returns [`EditError::Closed`]
	/// once the compound has been ended, cancelled or killed.
	pub fn add_edit(&mut self, edit: E) -> Result<()> {
		if !self.is_open() {
			return Err(EditError::Closed);
		}
		let mut edit = Tracked::new(edit);
		if let Some(last) = self.edits.last_mut() {
			if last.absorb(&mut edit) {
				return Ok(());
			}
			if edit.supersede(last) {
				self.edits.pop();
			}
		}
		self.edits.push(edit);
		Ok(())
	}

	/// Stops accepting sub-edits.
	pub fn end(&mut self) {
		if self.is_open() {
			self.state = CompoundState::Ended;
		}
	}

	/// Reverts every done sub-edit last to first and discards the compound.
	///
	/// Keeps going past failures and returns the first one.
	pub fn cancel(&mut self, target: &E::Target) -> Result<()> {
		if matches!(self.state, CompoundState::Cancelled | CompoundState::Dead) {
			return Ok(());
		}
		let mut first_err = None;
		for edit in self.edits.iter_mut().rev() {
			if edit.can_undo()
				&& let Err(err) = edit.undo(target)
			{
				warn!(edit = %edit.presentation_name(), %err, "sub-edit failed to cancel");
				first_err.get_or_insert(err);
			}
		}
		for edit in self.edits.iter_mut().rev() {
			edit.die();
		}
		self.state = CompoundState::Cancelled;
		first_err.map_or(Ok(()), Err)
	}

	fn ensure_replayable(&self, undo: bool) -> Result<()> {
		if self.state == CompoundState::Ended {
			Ok(())
		} else if undo {
			Err(EditError::cannot_undo(self.presentation_name()))
		} else {
			Err(EditError::cannot_redo(self.presentation_name()))
		}
	}

	/// Redoes every undone sub-edit first to last. On failure the sub-edits
	/// redone by this call are undone again.
	fn replay_forward(&mut self, target: &E::Target) -> Result<()> {
		let mut replayed = Vec::new();
		for i in 0..self.edits.len() {
			if !self.edits[i].can_redo() {
				continue;
			}
			if let Err(err) = self.edits[i].redo(target) {
				for &j in replayed.iter().rev() {
					let edit: &mut Tracked<E> = &mut self.edits[j];
					if let Err(rollback) = edit.undo(target) {
						warn!(edit = %edit.presentation_name(), err = %rollback, "rollback failed");
					}
				}
				return Err(err);
			}
			replayed.push(i);
		}
		Ok(())
	}
}

impl<E: Edit> Edit for CompoundEdit<E> {
	type Target = E::Target;

	/// Sub-edits are performed as they are added; this re-applies any that
	/// are currently undone.
	fn perform(&mut self, target: &E::Target) -> Result<()> {
		self.replay_forward(target)
	}

	fn undo(&mut self, target: &E::Target) -> Result<()> {
		self.ensure_replayable(true)?;
		for i in (0..self.edits.len()).rev() {
			if let Err(err) = self.edits[i].undo(target) {
				for edit in &mut self.edits[i + 1..] {
					if let Err(rollback) = edit.redo(target) {
						warn!(edit = %edit.presentation_name(), err = %rollback, "rollback failed");
					}
				}
				return Err(err);
			}
		}
		Ok(())
	}

	fn redo(&mut self, target: &E::Target) -> Result<()> {
		self.ensure_replayable(false)?;
		self.replay_forward(target)
	}

	fn presentation_name(&self) -> String {
		if self.name.is_empty() {
			self.edits
				.last()
				.map(Tracked::presentation_name)
				.unwrap_or_default()
		} else {
			self.name.clone()
		}
	}

	/// Significant if any sub-edit is.
	fn is_significant(&self) -> bool {
		self.edits.iter().any(Tracked::is_significant)
	}

	fn die(&mut self) {
		for edit in self.edits.iter_mut().rev() {
			edit.die();
		}
		self.state = CompoundState::Dead;
	}
}
