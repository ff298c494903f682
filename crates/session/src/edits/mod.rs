//! Undoable session edits.
//!
//! Every edit captures the previous state when it is created and applies
//! itself under the doors guarding what it changes. Edits are collected in a
//! [`SessionHistory`], optionally grouped through [`CompoundEdit`] or
//! [`session_object_edit`].

mod hooks;
mod map;
mod objects;
mod receiver;
mod timeline;

#[cfg(test)]
mod tests;

use meloncillo_edit::{CompoundEdit, Edit, Result, SyncCompoundEdit, UndoManager};

use crate::session::Session;

pub use hooks::{ObjectModHooks, session_object_edit};
pub use map::{MapTarget, RenameObject, SetMapValue};
pub use objects::{AddObjects, RemoveObjects};
pub use receiver::{SetReceiverAnchor, SetReceiverSize, SetSensitivityTable};
pub use timeline::{SetTimelineLength, SetTimelinePosition, SetTimelineSelection};

/// Undo history of a session.
pub type SessionHistory = UndoManager<SessionEdit>;

/// Any edit that can be applied to a [`Session`].
#[derive(Debug)]
pub enum SessionEdit {
	TimelineLength(SetTimelineLength),
	/// Playhead moves; never significant on their own.
	TimelinePosition(SetTimelinePosition),
	TimelineSelection(SetTimelineSelection),
	ReceiverAnchor(SetReceiverAnchor),
	ReceiverSize(SetReceiverSize),
	SensitivityTable(SetSensitivityTable),
	MapValue(SetMapValue),
	ObjectName(RenameObject),
	AddObjects(AddObjects),
	RemoveObjects(RemoveObjects),
	Compound(CompoundEdit<SessionEdit>),
	Synced(SyncCompoundEdit<SessionEdit>),
}

macro_rules! impl_from {
	($($variant:ident($ty:ty)),* $(,)?) => {
		$(
			impl From<$ty> for SessionEdit {
				fn from(edit: $ty) -> Self {
					SessionEdit::$variant(edit)
				}
			}
		)*
	};
}

impl_from! {
	TimelineLength(SetTimelineLength),
	TimelinePosition(SetTimelinePosition),
	TimelineSelection(SetTimelineSelection),
	ReceiverAnchor(SetReceiverAnchor),
	ReceiverSize(SetReceiverSize),
	SensitivityTable(SetSensitivityTable),
	MapValue(SetMapValue),
	ObjectName(RenameObject),
	AddObjects(AddObjects),
	RemoveObjects(RemoveObjects),
	Compound(CompoundEdit<SessionEdit>),
	Synced(SyncCompoundEdit<SessionEdit>),
}

impl Edit for SessionEdit {
	type Target = Session;

	fn perform(&mut self, session: &Session) -> Result<()> {
		match self {
			SessionEdit::TimelineLength(e) => e.perform(session),
			SessionEdit::TimelinePosition(e) => e.perform(session),
			SessionEdit::TimelineSelection(e) => e.perform(session),
			SessionEdit::ReceiverAnchor(e) => e.perform(session),
			SessionEdit::ReceiverSize(e) => e.perform(session),
			SessionEdit::SensitivityTable(e) => e.perform(session),
			SessionEdit::MapValue(e) => e.perform(session),
			SessionEdit::ObjectName(e) => e.perform(session),
			SessionEdit::AddObjects(e) => e.perform(session),
			SessionEdit::RemoveObjects(e) => e.perform(session),
			SessionEdit::Compound(e) => e.perform(session),
			SessionEdit::Synced(e) => e.perform(session),
		}
	}

	fn undo(&mut self, session: &Session) -> Result<()> {
		match self {
			SessionEdit::TimelineLength(e) => e.undo(session),
			SessionEdit::TimelinePosition(e) => e.undo(session),
			SessionEdit::TimelineSelection(e) => e.undo(session),
			SessionEdit::ReceiverAnchor(e) => e.undo(session),
			SessionEdit::ReceiverSize(e) => e.undo(session),
			SessionEdit::SensitivityTable(e) => e.undo(session),
			SessionEdit::MapValue(e) => e.undo(session),
			SessionEdit::ObjectName(e) => e.undo(session),
			SessionEdit::AddObjects(e) => e.undo(session),
			SessionEdit::RemoveObjects(e) => e.undo(session),
			SessionEdit::Compound(e) => e.undo(session),
			SessionEdit::Synced(e) => e.undo(session),
		}
	}

	fn redo(&mut self, session: &Session) -> Result<()> {
		match self {
			SessionEdit::Compound(e) => e.redo(session),
			SessionEdit::Synced(e) => e.redo(session),
			_ => self.perform(session),
		}
	}

	fn presentation_name(&self) -> String {
		match self {
			SessionEdit::TimelineLength(_) => "Change Timeline Length".into(),
			SessionEdit::TimelinePosition(_) => "Move Playhead".into(),
			SessionEdit::TimelineSelection(_) => "Change Selection".into(),
			SessionEdit::ReceiverAnchor(_) => "Move Receiver".into(),
			SessionEdit::ReceiverSize(_) => "Resize Receiver".into(),
			SessionEdit::SensitivityTable(_) => "Change Sensitivity".into(),
			SessionEdit::MapValue(e) => format!("Change {}", e.key()),
			SessionEdit::ObjectName(_) => "Rename".into(),
			SessionEdit::AddObjects(e) => e.presentation_name(),
			SessionEdit::RemoveObjects(e) => e.presentation_name(),
			SessionEdit::Compound(e) => e.presentation_name(),
			SessionEdit::Synced(e) => e.presentation_name(),
		}
	}

	fn is_significant(&self) -> bool {
		match self {
			SessionEdit::TimelinePosition(_) => false,
			SessionEdit::TimelineSelection(e) => e.is_significant(),
			SessionEdit::ReceiverAnchor(e) => e.is_significant(),
			SessionEdit::Compound(e) => e.is_significant(),
			SessionEdit::Synced(e) => e.is_significant(),
			_ => true,
		}
	}

	fn add_edit(&mut self, newer: &mut Self) -> bool {
		match (self, newer) {
			(SessionEdit::TimelinePosition(a), SessionEdit::TimelinePosition(b)) => a.absorb(b),
			(SessionEdit::TimelineSelection(a), SessionEdit::TimelineSelection(b)) => a.absorb(b),
			(SessionEdit::ReceiverAnchor(a), SessionEdit::ReceiverAnchor(b)) => a.absorb(b),
			_ => false,
		}
	}

	fn die(&mut self) {
		match self {
			SessionEdit::Compound(e) => e.die(),
			SessionEdit::Synced(e) => e.die(),
			_ => {}
		}
	}
}
