//! Adding and removing session objects.

use std::sync::Arc;

use meloncillo_edit::{Attribution, Result};
use meloncillo_props::SourceId;

use crate::collection::RemovedEntry;
use crate::object::{ObjectId, ObjectKind, SessionObject};
use crate::session::Session;

fn plural(kind: ObjectKind) -> &'static str {
	match kind {
		ObjectKind::Receiver => "Receivers",
		ObjectKind::Transmitter => "Transmitters",
		ObjectKind::Group => "Groups",
	}
}

/// Appends objects to the collection of their kind.
///
/// Undo takes out only the objects the last application actually added;
/// objects that were already present stay.
#[derive(Debug, Clone)]
pub struct AddObjects {
	kind: ObjectKind,
	objects: Vec<Arc<SessionObject>>,
	added: Vec<ObjectId>,
	attribution: Attribution,
}

impl AddObjects {
	/// Objects not of `kind` are skipped when the edit is performed.
	pub fn new(kind: ObjectKind, source: Option<SourceId>, objects: Vec<Arc<SessionObject>>) -> Self {
		Self {
			kind,
			objects,
			added: Vec::new(),
			attribution: Attribution::new(source),
		}
	}

	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	pub fn objects(&self) -> &[Arc<SessionObject>] {
		&self.objects
	}

	/// IDs inserted by the last application.
	pub fn added(&self) -> &[ObjectId] {
		&self.added
	}

	pub(crate) fn presentation_name(&self) -> String {
		format!("Add {}", plural(self.kind))
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		let _guard = session.lock_exclusive(self.kind.door())?;
		self.added = session
			.collection(self.kind)
			.add_all(self.attribution.next(), &self.objects);
		Ok(())
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		let _guard = session.lock_exclusive(self.kind.door())?;
		session
			.collection(self.kind)
			.remove_all(self.attribution.next(), &self.added);
		self.added.clear();
		Ok(())
	}
}

/// Removes objects from a collection.
///
/// Undo puts every object back at the index it had.
#[derive(Debug, Clone)]
pub struct RemoveObjects {
	kind: ObjectKind,
	ids: Vec<ObjectId>,
	removed: Vec<RemovedEntry>,
	attribution: Attribution,
}

impl RemoveObjects {
	pub fn new(kind: ObjectKind, source: Option<SourceId>, ids: Vec<ObjectId>) -> Self {
		Self {
			kind,
			ids,
			removed: Vec::new(),
			attribution: Attribution::new(source),
		}
	}

	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	/// Objects taken out by the last application, with their indices.
	pub fn removed(&self) -> &[RemovedEntry] {
		&self.removed
	}

	pub(crate) fn presentation_name(&self) -> String {
		format!("Remove {}", plural(self.kind))
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		let _guard = session.lock_exclusive(self.kind.door())?;
		self.removed = session
			.collection(self.kind)
			.remove_all(self.attribution.next(), &self.ids);
		Ok(())
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		let _guard = session.lock_exclusive(self.kind.door())?;
		session
			.collection(self.kind)
			.restore(self.attribution.next(), &self.removed);
		Ok(())
	}
}
