//! Ordered collections of session objects.


use std::sync::Arc;

use meloncillo_props::{Dispatcher, SourceId};
use parking_lot::RwLock;
use tracing::warn;

use crate::object::{ObjectId, ObjectKind, SessionObject};

/// What happened to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
	/// Objects were inserted.
	Added(Vec<ObjectId>),
	/// Objects were taken out.
	Removed(Vec<ObjectId>),
}

/// Event published by a [`SessionCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEvent {
	pub source: SourceId,
	pub change: CollectionChange,
}

/// A removed object together with the index it had.
pub type RemovedEntry = (usize, Arc<SessionObject>);

/// The receivers, transmitters or groups of a session, in display order.
///
/// Mutators do not acquire doors; callers hold the door of the collection's
/// kind exclusively. Events are dispatched after the internal lock is
/// released, only for a `Some` source and only if something changed.
#[derive(Debug)]
pub struct SessionCollection {
	kind: ObjectKind,
	objects: RwLock<Vec<Arc<SessionObject>>>,
	events: Dispatcher<CollectionEvent>,
}

impl SessionCollection {
	pub fn new(kind: ObjectKind) -> Self {
		Self {
			kind,
			objects: RwLock::new(Vec::new()),
			events: Dispatcher::new(),
		}
	}

	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	pub fn events(&self) -> &Dispatcher<CollectionEvent> {
		&self.events
	}

	pub fn len(&self) -> usize {
		self.objects.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.read().is_empty()
	}

	/// Returns the objects in order.
	pub fn objects(&self) -> Vec<Arc<SessionObject>> {
		self.objects.read().clone()
	}

	pub fn get(&self, id: ObjectId) -> Option<Arc<SessionObject>> {
		self.objects.read().iter().find(|o| o.id() == id).cloned()
	}

	pub fn index_of(&self, id: ObjectId) -> Option<usize> {
		self.objects.read().iter().position(|o| o.id() == id)
	}

	pub fn contains(&self, id: ObjectId) -> bool {
		self.index_of(id).is_some()
	}

	pub fn find_by_name(&self, name: &str) -> Option<Arc<SessionObject>> {
		self.objects.read().iter().find(|o| o.name() == name).cloned()
	}

	/// Returns the first name of the form `<prefix><n>`, `n >= 1`, not used by
	/// any object of the collection.
	pub fn unique_name(&self) -> String {
		let objects = self.objects.read();
		let prefix = self.kind.name_prefix();
		(1..)
			.map(|n| format!("{prefix}{n}"))
			.find(|name| objects.iter().all(|o| o.name() != *name))
			.unwrap_or_else(|| prefix.to_string())
	}

	/// Appends objects. Objects of another kind and objects already present
	/// are skipped with a warning. Returns the IDs that were added.
	pub fn add_all(&self, source: Option<SourceId>, objects: &[Arc<SessionObject>]) -> Vec<ObjectId> {
		let added: Vec<ObjectId> = {
			let mut list = self.objects.write();
			let mut added = Vec::new();
			for object in objects {
				if object.kind() != self.kind {
					warn!(id = %object.id(), kind = ?object.kind(), expected = ?self.kind, "object of wrong kind not added");
					continue;
				}
				if list.iter().any(|o| o.id() == object.id()) {
					warn!(id = %object.id(), "object already in collection");
					continue;
				}
				list.push(Arc::clone(object));
				added.push(object.id());
			}
			added
		};
		self.notify(source, CollectionChange::Added(added.clone()));
		added
	}

	/// Removes the objects with the given IDs.
	///
	/// Returns the removed objects with the indices they had, in ascending
	/// index order. Unknown IDs are ignored.
	pub fn remove_all(&self, source: Option<SourceId>, ids: &[ObjectId]) -> Vec<RemovedEntry> {
		let removed: Vec<RemovedEntry> = {
			let mut list = self.objects.write();
			let removed: Vec<RemovedEntry> = list
				.iter()
				.enumerate()
				.filter(|(_, o)| ids.contains(&o.id()))
				.map(|(i, o)| (i, Arc::clone(o)))
				.collect();
			list.retain(|o| !ids.contains(&o.id()));
			removed
		};
		let ids = removed.iter().map(|(_, o)| o.id()).collect();
		self.notify(source, CollectionChange::Removed(ids));
		removed
	}

	/// Reinserts entries returned by [`remove_all`](Self::remove_all) at
	/// their original indices.
	pub fn restore(&self, source: Option<SourceId>, entries: &[RemovedEntry]) {
		let added: Vec<ObjectId> = {
			let mut list = self.objects.write();
			let mut sorted: Vec<&RemovedEntry> = entries.iter().collect();
			sorted.sort_by_key(|(index, _)| *index);
			let mut added = Vec::new();
			for (index, object) in sorted {
				if list.iter().any(|o| o.id() == object.id()) {
					continue;
				}
				let at = (*index).min(list.len());
				list.insert(at, Arc::clone(object));
				added.push(object.id());
			}
			added
		};
		self.notify(source, CollectionChange::Added(added));
	}

	/// Removes every object.
	pub fn clear(&self, source: Option<SourceId>) -> Vec<RemovedEntry> {
		let ids: Vec<ObjectId> = self.objects.read().iter().map(|o| o.id()).collect();
		self.remove_all(source, &ids)
	}

	fn notify(&self, source: Option<SourceId>, change: CollectionChange) {
		let empty = match &change {
			CollectionChange::Added(ids) | CollectionChange::Removed(ids) => ids.is_empty(),
		};
		if let Some(source) = source
			&& !empty
		{
			self.events.dispatch(&CollectionEvent { source, change });
		}
	}
}
