//! Synchronized compounds over session objects.

use std::sync::Arc;

use meloncillo_doors::DoorSet;
use meloncillo_edit::{SyncCompoundEdit, SyncHooks};
use meloncillo_props::{OwnerModKind, PropValue, SourceId};
use tracing::trace;

use super::SessionEdit;
use crate::object::SessionObject;
use crate::session::Session;

/// Notifies a fixed set of objects once a compound has been applied.
///
/// Each object receives one owner modification of `kind` under the
/// compound's source at end, undo and redo. A cancelled compound reports
/// `cancel_param` instead of `param`.
#[derive(Debug)]
pub struct ObjectModHooks {
	objects: Vec<Arc<SessionObject>>,
	kind: OwnerModKind,
	param: Option<PropValue>,
	cancel_param: Option<PropValue>,
}

impl ObjectModHooks {
	pub fn new(
		objects: Vec<Arc<SessionObject>>,
		kind: OwnerModKind,
		param: Option<PropValue>,
		cancel_param: Option<PropValue>,
	) -> Self {
		Self {
			objects,
			kind,
			param,
			cancel_param,
		}
	}

	fn notify(&self, source: SourceId, param: &Option<PropValue>) {
		trace!(objects = self.objects.len(), kind = ?self.kind, "object compound applied");
		for object in &self.objects {
			object
				.map()
				.dispatch_owner_modification(Some(source), self.kind, param.clone());
		}
	}
}

impl SyncHooks<Session> for ObjectModHooks {
	fn end_done(&self, _session: &Session, source: SourceId) {
		self.notify(source, &self.param);
	}

	fn undo_done(&self, _session: &Session, source: SourceId) {
		self.notify(source, &self.param);
	}

	fn redo_done(&self, _session: &Session, source: SourceId) {
		self.notify(source, &self.param);
	}

	fn cancel_done(&self, _session: &Session, source: SourceId) {
		self.notify(source, &self.cancel_param);
	}
}

/// Opens a synchronized compound over `objects`.
///
/// The compound is guarded by the doors of every object kind involved and
/// uses the session's lock timeout. Its hooks report `kind` to each object.
pub fn session_object_edit(
	session: &Session,
	name: impl Into<String>,
	objects: Vec<Arc<SessionObject>>,
	kind: OwnerModKind,
	param: Option<PropValue>,
	cancel_param: Option<PropValue>,
) -> SyncCompoundEdit<SessionEdit> {
	let doors = objects
		.iter()
		.fold(DoorSet::empty(), |doors, object| doors | object.kind().door());
	let hooks = ObjectModHooks::new(objects, kind, param, cancel_param);
	SyncCompoundEdit::new(
		name,
		Arc::clone(session.doors()),
		doors,
		session.config().lock_timeout(),
	)
	.with_hooks(Arc::new(hooks))
}
