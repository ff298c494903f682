//! Compound edits replayed under exclusive doors.


use std::sync::Arc;
use std::time::Duration;

use meloncillo_doors::{DoorGuard, DoorSet, LockManager};
use meloncillo_props::SourceId;
use tracing::trace;

use crate::compound::{CompoundEdit, CompoundState};
use crate::edit::Edit;
use crate::error::{EditError, Result};

/// Callbacks run by a [`SyncCompoundEdit`] while it still holds its doors.
///
/// `source` is the compound's own source, so listeners see one synthetic
/// originator for the whole group rather than one per sub-edit.
pub trait SyncHooks<T: ?Sized>: Send + Sync {
	/// The compound was ended after its sub-edits were performed.
	fn end_done(&self, _target: &T, _source: SourceId) {}

	/// Every sub-edit was undone.
	fn undo_done(&self, _target: &T, _source: SourceId) {}

	/// Every sub-edit was redone.
	fn redo_done(&self, _target: &T, _source: SourceId) {}

	/// The compound was cancelled.
	fn cancel_done(&self, _target: &T, _source: SourceId) {}
}

/// A [`CompoundEdit`] bound to a set of doors.
///
/// Undo, redo and cancel acquire the doors exclusively for the whole replay
/// and run the matching hook before releasing them. If the doors cannot be
/// acquired within the timeout, [`EditError::LockTimeout`] is returned and
/// nothing is replayed.
pub struct SyncCompoundEdit<E: Edit> {
	inner: CompoundEdit<E>,
	doors: Arc<LockManager>,
	door_set: DoorSet,
	timeout: Option<Duration>,
	hooks: Option<Arc<dyn SyncHooks<E::Target>>>,
	source: SourceId,
}

impl<E: Edit + std::fmt::Debug> std::fmt::Debug for SyncCompoundEdit<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SyncCompoundEdit")
			.field("inner", &self.inner)
			.field("door_set", &self.door_set)
			.field("timeout", &self.timeout)
			.field("hooks", &self.hooks.is_some())
			.field("source", &self.source)
			.finish()
	}
}

impl<E: Edit> SyncCompoundEdit<E> {
	/// Creates an open compound guarded by `door_set` of `doors`.
	pub fn new(
		name: impl Into<String>,
		doors: Arc<LockManager>,
		door_set: DoorSet,
		timeout: Option<Duration>,
	) -> Self {
		Self {
			inner: CompoundEdit::new(name),
			doors,
			door_set,
			timeout,
			hooks: None,
			source: SourceId::next(),
		}
	}

	/// Installs the hooks run at end, undo, redo and cancel.
	pub fn with_hooks(mut self, hooks: Arc<dyn SyncHooks<E::Target>>) -> Self {
		self.hooks = Some(hooks);
		self
	}

	/// Returns the compound's own source.
	pub fn source(&self) -> SourceId {
		self.source
	}

	pub fn door_set(&self) -> DoorSet {
		self.door_set
	}

	pub fn state(&self) -> CompoundState {
		self.inner.state()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn edits(&self) -> impl Iterator<Item = &E> {
		self.inner.edits()
	}

	/// Appends a performed edit. See [`CompoundEdit::add_edit`].
	pub fn add_edit(&mut self, edit: E) -> Result<()> {
		self.inner.add_edit(edit)
	}

	/// Closes the compound and runs [`SyncHooks::end_done`].
	pub fn end(&mut self, target: &E::Target) -> Result<()> {
		let doors = Arc::clone(&self.doors);
		let _guard = lock(&doors, self.door_set, self.timeout)?;
		self.inner.end();
		if let Some(hooks) = &self.hooks {
			hooks.end_done(target, self.source);
		}
		Ok(())
	}

	/// Reverts every sub-edit and runs [`SyncHooks::cancel_done`].
	///
	/// The hook runs even if a sub-edit failed to revert; the first such
	/// failure is returned.
	pub fn cancel(&mut self, target: &E::Target) -> Result<()> {
		let doors = Arc::clone(&self.doors);
		let _guard = lock(&doors, self.door_set, self.timeout)?;
		let result = self.inner.cancel(target);
		if let Some(hooks) = &self.hooks {
			hooks.cancel_done(target, self.source);
		}
		result
	}
}

fn lock(doors: &LockManager, door_set: DoorSet, timeout: Option<Duration>) -> Result<DoorGuard<'_>> {
	doors
		.exclusive(door_set, timeout)
		.ok_or(EditError::LockTimeout(door_set))
}

impl<E: Edit> Edit for SyncCompoundEdit<E> {
	type Target = E::Target;

	fn perform(&mut self, target: &E::Target) -> Result<()> {
		let doors = Arc::clone(&self.doors);
		let _guard = lock(&doors, self.door_set, self.timeout)?;
		self.inner.perform(target)
	}

	fn undo(&mut self, target: &E::Target) -> Result<()> {
		let doors = Arc::clone(&self.doors);
		let _guard = lock(&doors, self.door_set, self.timeout)?;
		trace!(source = %self.source, edits = self.inner.len(), "undoing synced compound");
		self.inner.undo(target)?;
		if let Some(hooks) = &self.hooks {
			hooks.undo_done(target, self.source);
		}
		Ok(())
	}

	fn redo(&mut self, target: &E::Target) -> Result<()> {
		let doors = Arc::clone(&self.doors);
		let _guard = lock(&doors, self.door_set, self.timeout)?;
		trace!(source = %self.source, edits = self.inner.len(), "redoing synced compound");
		self.inner.redo(target)?;
		if let Some(hooks) = &self.hooks {
			hooks.redo_done(target, self.source);
		}
		Ok(())
	}

	fn presentation_name(&self) -> String {
		self.inner.presentation_name()
	}

	fn is_significant(&self) -> bool {
		self.inner.is_significant()
	}

	fn die(&mut self) {
		self.inner.die();
	}
}
