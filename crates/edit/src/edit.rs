//! The edit trait and its lifecycle wrapper.

use meloncillo_props::SourceId;

use crate::error::{EditError, Result};

/// A reversible change to a target.
///
/// Implementations capture whatever old state they need when they are
/// constructed. `perform` applies the change for the first time; `undo` and
/// `redo` replay it afterwards. Implementations acquire the doors they need
/// themselves, so edits may be replayed from any thread that can reach the
/// target.
pub trait Edit {
	/// What the edit mutates.
	type Target: ?Sized;

	/// Applies the change for the first time.
	fn perform(&mut self, target: &Self::Target) -> Result<()>;

	/// Reverts the change.
	fn undo(&mut self, target: &Self::Target) -> Result<()>;

	/// Re-applies the change after an undo.
	fn redo(&mut self, target: &Self::Target) -> Result<()> {
		self.perform(target)
	}

	/// Human readable name shown in undo and redo menus.
	fn presentation_name(&self) -> String;

	/// Whether undoing this edit alone is a meaningful step for the user.
	///
	/// Insignificant edits are undone together with the closest significant
	/// edit before them.
	fn is_significant(&self) -> bool {
		true
	}

	/// Absorbs `newer` into this edit. Returns `true` if it did, in which case
	/// `newer` is discarded.
	fn add_edit(&mut self, _newer: &mut Self) -> bool {
		false
	}

	/// Takes the place of `older`. Returns `true` if it did, in which case
	/// `older` is discarded.
	fn replace_edit(&mut self, _older: &mut Self) -> bool {
		false
	}

	/// Releases resources held by the edit. Called once, when the edit
	/// leaves the history for good.
	fn die(&mut self) {}

	/// Performs the edit and returns it, ready to be added to a history.
	fn performed(mut self, target: &Self::Target) -> Result<Self>
	where
		Self: Sized,
	{
		self.perform(target)?;
		Ok(self)
	}
}

/// Source attribution of an edit's applications.
///
/// The first application is reported under the actor that created the edit,
/// or silently if that actor passed `None`. Every later application, undo
/// and redo included, is reported under the edit's own source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
	id: SourceId,
	first: Option<Option<SourceId>>,
}

impl Attribution {
	/// Creates an attribution whose first application goes to `first`.
	pub fn new(first: Option<SourceId>) -> Self {
		Self {
			id: SourceId::next(),
			first: Some(first),
		}
	}

	/// Returns the source to report for the next application.
	pub fn next(&mut self) -> Option<SourceId> {
		self.first.take().unwrap_or(Some(self.id))
	}

	/// Returns the edit's own source.
	pub fn id(&self) -> SourceId {
		self.id
	}
}

/// Lifecycle state of a [`Tracked`] edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditState {
	/// The change is applied.
	Done,
	/// The change is reverted.
	Undone,
	/// The edit left the history and can no longer be replayed.
	Dead,
}

/// An edit together with its lifecycle state.
///
/// Wraps an edit that has already been performed and guards every
/// transition.
#[derive(Debug)]
pub struct Tracked<E> {
	edit: E,
	state: EditState,
}

impl<E: Edit> Tracked<E> {
	/// Wraps an edit that has been performed.
	pub fn new(edit: E) -> Self {
		Self {
			edit,
			state: EditState::Done,
		}
	}

	/// Returns the wrapped edit.
	pub fn edit(&self) -> &E {
		&self.edit
	}

	/// Returns the wrapped edit mutably.
	pub fn edit_mut(&mut self) -> &mut E {
		&mut self.edit
	}

	/// Returns the lifecycle state.
	pub fn state(&self) -> EditState {
		self.state
	}

	pub fn can_undo(&self) -> bool {
		self.state == EditState::Done
	}

	pub fn can_redo(&self) -> bool {
		self.state == EditState::Undone
	}

	pub fn is_significant(&self) -> bool {
		self.edit.is_significant()
	}

	pub fn presentation_name(&self) -> String {
		self.edit.presentation_name()
	}

	/// Reverts the edit.
	///
	/// I/O failures surface as [`EditError::CannotUndo`]; the state only
	/// changes on success.
	pub fn undo(&mut self, target: &E::Target) -> Result<()> {
		if !self.can_undo() {
			return Err(EditError::cannot_undo(self.presentation_name()));
		}
		self.edit
			.undo(target)
			.map_err(|err| err.while_undoing(&self.edit.presentation_name()))?;
		self.state = EditState::Undone;
		Ok(())
	}

	/// Re-applies the edit.
	///
	/// I/O failures surface as [`EditError::CannotRedo`]; the state only
	/// changes on success.
	pub fn redo(&mut self, target: &E::Target) -> Result<()> {
		if !self.can_redo() {
			return Err(EditError::cannot_redo(self.presentation_name()));
		}
		self.edit
			.redo(target)
			.map_err(|err| err.while_redoing(&self.edit.presentation_name()))?;
		self.state = EditState::Done;
		Ok(())
	}

	/// Kills the edit. Further calls are no-ops.
	pub fn die(&mut self) {
		if self.state != EditState::Dead {
			self.edit.die();
			self.state = EditState::Dead;
		}
	}

	/// Merges `newer` into this edit; on success `newer` is killed.
	///
	/// Only edits that are both done can merge.
	pub fn absorb(&mut self, newer: &mut Tracked<E>) -> bool {
		if !self.can_undo() || !newer.can_undo() {
			return false;
		}
		let absorbed = self.edit.add_edit(&mut newer.edit);
		if absorbed {
			newer.die();
		}
		absorbed
	}

	/// Lets this edit replace `older`; on success `older` is killed.
	pub fn supersede(&mut self, older: &mut Tracked<E>) -> bool {
		if !self.can_undo() || !older.can_undo() {
			return false;
		}
		let replaced = self.edit.replace_edit(&mut older.edit);
		if replaced {
			older.die();
		}
		replaced
	}

	/// Returns the wrapped edit.
	pub fn into_inner(self) -> E {
		self.edit
	}
}
