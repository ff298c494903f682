//! The session document.

use std::sync::Arc;

use meloncillo_doors::{DoorGuard, DoorSet, LockManager};
use meloncillo_edit::EditError;
use meloncillo_props::PropertyMap;

use crate::collection::SessionCollection;
use crate::config::SessionConfig;
use crate::edits::SessionHistory;
use crate::object::{ObjectId, ObjectKind, SessionObject};
use crate::spill::SpillStore;
use crate::timeline::Timeline;

/// Timeline, object collections and session-wide properties, guarded by a
/// shared [`LockManager`].
///
/// The timeline is guarded by [`DoorSet::TIME`], each collection and its
/// objects by the door of its [`ObjectKind`]. The session map is internally
/// synchronised and needs no door.
#[derive(Debug)]
pub struct Session {
	doors: Arc<LockManager>,
	config: SessionConfig,
	timeline: Timeline,
	receivers: SessionCollection,
	transmitters: SessionCollection,
	groups: SessionCollection,
	map: PropertyMap,
	spill: SpillStore,
}

impl Default for Session {
	fn default() -> Self {
		Self::new(SessionConfig::default())
	}
}

impl Session {
	pub fn new(config: SessionConfig) -> Self {
		Self {
			doors: Arc::new(LockManager::new()),
			timeline: Timeline::new(config.default_rate),
			receivers: SessionCollection::new(ObjectKind::Receiver),
			transmitters: SessionCollection::new(ObjectKind::Transmitter),
			groups: SessionCollection::new(ObjectKind::Group),
			map: PropertyMap::new(),
			spill: SpillStore::new(config.spill_dir.clone()),
			config,
		}
	}

	/// The lock manager guarding this session.
	pub fn doors(&self) -> &Arc<LockManager> {
		&self.doors
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	pub fn timeline(&self) -> &Timeline {
		&self.timeline
	}

	pub fn receivers(&self) -> &SessionCollection {
		&self.receivers
	}

	pub fn transmitters(&self) -> &SessionCollection {
		&self.transmitters
	}

	pub fn groups(&self) -> &SessionCollection {
		&self.groups
	}

	/// The collection holding objects of `kind`.
	pub fn collection(&self, kind: ObjectKind) -> &SessionCollection {
		match kind {
			ObjectKind::Receiver => &self.receivers,
			ObjectKind::Transmitter => &self.transmitters,
			ObjectKind::Group => &self.groups,
		}
	}

	/// Session-wide properties.
	pub fn map(&self) -> &PropertyMap {
		&self.map
	}

	pub fn spill(&self) -> &SpillStore {
		&self.spill
	}

	/// Looks an object up in every collection.
	pub fn find_object(&self, id: ObjectId) -> Option<Arc<SessionObject>> {
		ObjectKind::ALL
			.into_iter()
			.find_map(|kind| self.collection(kind).get(id))
	}

	/// Creates an empty undo history sized from the configuration.
	pub fn new_history(&self) -> SessionHistory {
		SessionHistory::new(self.config.undo_limit)
	}

	/// Acquires `doors` exclusively, waiting at most the configured lock
	/// timeout.
	pub fn lock_exclusive(&self, doors: DoorSet) -> Result<DoorGuard<'_>, EditError> {
		self.doors
			.exclusive(doors, self.config.lock_timeout())
			.ok_or(EditError::LockTimeout(doors))
	}

	/// Runs `f` with `doors` held shared.
	///
	/// Waits at most the configured paint timeout and returns `None` without
	/// running `f` if the doors stay unavailable, so painting code can skip a
	/// frame instead of blocking.
	pub fn try_read<R>(&self, doors: DoorSet, f: impl FnOnce(&Session) -> R) -> Option<R> {
		let _guard = self.doors.shared(doors, self.config.paint_timeout())?;
		Some(f(self))
	}
}
