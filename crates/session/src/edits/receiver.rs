//! Receiver geometry and sensitivity edits.

use std::path::Path;
use std::sync::Arc;

use meloncillo_doors::DoorSet;
use meloncillo_edit::{Attribution, EditError, Result};
use meloncillo_props::SourceId;
use tracing::debug;

use crate::object::{Point, SessionObject, Size, TableKind};
use crate::session::Session;
use crate::spill::SpillFile;

fn not_a_receiver(object: &SessionObject) -> EditError {
	EditError::MissingTarget(format!("{} ({}) is not a receiver", object.name(), object.id()))
}

/// Runs `set` on the receiver under the receivers door; `set` returns `false`
/// if the object is not a receiver.
fn apply(
	session: &Session,
	receiver: &SessionObject,
	attribution: &mut Attribution,
	set: impl FnOnce(&SessionObject, Option<SourceId>) -> bool,
) -> Result<()> {
	let _guard = session.lock_exclusive(DoorSet::RECEIVERS)?;
	if set(receiver, attribution.next()) {
		Ok(())
	} else {
		Err(not_a_receiver(receiver))
	}
}

/// Moves a receiver.
///
/// Anchor edits made while dragging are insignificant and absorb the next
/// anchor edit of the same receiver.
#[derive(Debug, Clone)]
pub struct SetReceiverAnchor {
	receiver: Arc<SessionObject>,
	old: Point,
	new: Point,
	significant: bool,
	attribution: Attribution,
}

impl SetReceiverAnchor {
	pub fn new(receiver: Arc<SessionObject>, source: Option<SourceId>, anchor: Point) -> Result<Self> {
		let old = receiver.anchor().ok_or_else(|| not_a_receiver(&receiver))?;
		Ok(Self {
			receiver,
			old,
			new: anchor,
			significant: true,
			attribution: Attribution::new(source),
		})
	}

	/// Creates an insignificant anchor edit for an ongoing drag.
	pub fn dragging(receiver: Arc<SessionObject>, source: Option<SourceId>, anchor: Point) -> Result<Self> {
		Ok(Self {
			significant: false,
			..Self::new(receiver, source, anchor)?
		})
	}

	pub fn receiver(&self) -> &Arc<SessionObject> {
		&self.receiver
	}

	pub fn values(&self) -> (Point, Point) {
		(self.old, self.new)
	}

	pub fn is_significant(&self) -> bool {
		self.significant
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		let anchor = self.new;
		apply(session, &self.receiver, &mut self.attribution, |r, src| r.set_anchor(src, anchor))
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		let anchor = self.old;
		apply(session, &self.receiver, &mut self.attribution, |r, src| r.set_anchor(src, anchor))
	}

	pub(crate) fn absorb(&mut self, newer: &SetReceiverAnchor) -> bool {
		if self.significant || self.receiver.id() != newer.receiver.id() {
			return false;
		}
		self.new = newer.new;
		self.significant = newer.significant;
		true
	}
}

/// Resizes a receiver.
#[derive(Debug, Clone)]
pub struct SetReceiverSize {
	receiver: Arc<SessionObject>,
	old: Size,
	new: Size,
	attribution: Attribution,
}

impl SetReceiverSize {
	pub fn new(receiver: Arc<SessionObject>, source: Option<SourceId>, size: Size) -> Result<Self> {
		let old = receiver.size().ok_or_else(|| not_a_receiver(&receiver))?;
		Ok(Self {
			receiver,
			old,
			new: size,
			attribution: Attribution::new(source),
		})
	}

	pub fn values(&self) -> (Size, Size) {
		(self.old, self.new)
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		let size = self.new;
		apply(session, &self.receiver, &mut self.attribution, |r, src| r.set_size(src, size))
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		let size = self.old;
		apply(session, &self.receiver, &mut self.attribution, |r, src| r.set_size(src, size))
	}
}

#[derive(Debug)]
enum TablePayload {
	Memory { old: Vec<f32>, new: Vec<f32> },
	Spilled { old: SpillFile, new: SpillFile },
}

/// Replaces a sensitivity table of a receiver.
///
/// Tables at least as long as the configured spill threshold are kept in
/// spill files rather than memory. Writing the spill files happens in
/// [`new`](Self::new); if it fails, the edit is not created and the
/// receiver is left as it was. Reading a spill file back happens before the
/// receiver is touched, so a failed read leaves the receiver unchanged.
#[derive(Debug)]
pub struct SetSensitivityTable {
	receiver: Arc<SessionObject>,
	kind: TableKind,
	payload: TablePayload,
	attribution: Attribution,
}

impl SetSensitivityTable {
	pub fn new(
		session: &Session,
		receiver: Arc<SessionObject>,
		source: Option<SourceId>,
		kind: TableKind,
		table: Vec<f32>,
	) -> Result<Self> {
		let old = receiver.table(kind).ok_or_else(|| not_a_receiver(&receiver))?;
		let threshold = session.config().spill_threshold;
		let payload = if old.len().max(table.len()) >= threshold {
			let spill = session.spill();
			let old = spill.write(&old)?;
			let new = spill.write(&table)?;
			debug!(receiver = %receiver.id(), table = kind.tag(), "sensitivity tables spilled");
			TablePayload::Spilled { old, new }
		} else {
			TablePayload::Memory { old, new: table }
		};
		Ok(Self {
			receiver,
			kind,
			payload,
			attribution: Attribution::new(source),
		})
	}

	pub fn kind(&self) -> TableKind {
		self.kind
	}

	/// Returns `true` if the tables live in spill files.
	pub fn is_spilled(&self) -> bool {
		matches!(self.payload, TablePayload::Spilled { .. })
	}

	/// Paths of the old and new spill files.
	pub fn spill_paths(&self) -> Option<(&Path, &Path)> {
		match &self.payload {
			TablePayload::Spilled { old, new } => Some((old.path(), new.path())),
			TablePayload::Memory { .. } => None,
		}
	}

	fn table(&self, forward: bool) -> Result<Vec<f32>> {
		match &self.payload {
			TablePayload::Memory { old, new } => Ok(if forward { new.clone() } else { old.clone() }),
			TablePayload::Spilled { old, new } => {
				let file = if forward { new } else { old };
				Ok(file.read()?)
			}
		}
	}

	fn apply(&mut self, session: &Session, forward: bool) -> Result<()> {
		let table = self.table(forward)?;
		let kind = self.kind;
		apply(session, &self.receiver, &mut self.attribution, |r, src| {
			r.set_table(src, kind, table)
		})
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		self.apply(session, true)
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		self.apply(session, false)
	}
}
