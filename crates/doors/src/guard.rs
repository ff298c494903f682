//! Scoped door acquisition.

use std::marker::PhantomData;

use crate::door::DoorSet;
use crate::manager::LockManager;

/// Mode in which a set of doors is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
	/// Shared (read) access. Any number of threads may hold a door shared.
	Shared,
	/// Exclusive (write) access. Excludes every other thread.
	Exclusive,
}

/// Holds a set of doors until dropped.
///
/// Created by [`LockManager::shared`] and [`LockManager::exclusive`]. The
/// doors are released when the guard goes out of scope, including during
/// unwinding. Holdings are recorded per thread, so the guard cannot be sent
/// to another thread.
#[must_use = "doors are released as soon as the guard is dropped"]
pub struct DoorGuard<'a> {
	manager: &'a LockManager,
	doors: DoorSet,
	access: Access,
	_not_send: PhantomData<*const ()>,
}

impl<'a> DoorGuard<'a> {
	pub(crate) fn new(manager: &'a LockManager, doors: DoorSet, access: Access) -> Self {
		Self {
			manager,
			doors,
			access,
			_not_send: PhantomData,
		}
	}

	/// Returns the doors held by this guard.
	pub fn doors(&self) -> DoorSet {
		self.doors
	}

	/// Returns the mode the doors are held in.
	pub fn access(&self) -> Access {
		self.access
	}

	/// Returns `true` if this guard holds every door in `doors` in a mode
	/// that permits mutation.
	pub fn covers(&self, doors: DoorSet) -> bool {
		self.access == Access::Exclusive && self.doors.contains(doors)
	}
}

impl std::fmt::Debug for DoorGuard<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DoorGuard")
			.field("doors", &self.doors)
			.field("access", &self.access)
			.finish()
	}
}

impl Drop for DoorGuard<'_> {
	fn drop(&mut self) {
		match self.access {
			Access::Shared => self.manager.release_shared(self.doors),
			Access::Exclusive => self.manager.release_exclusive(self.doors),
		}
	}
}
