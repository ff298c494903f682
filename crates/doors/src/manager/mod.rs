//! The door table and its blocking acquisition protocol.


use std::collections::HashMap;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::door::{DoorSet, MAX_DOORS};
use crate::guard::{Access, DoorGuard};

/// Holdings of a single door.
#[derive(Debug, Default, Clone)]
struct DoorState {
	/// Exclusive owner and its re-entry count.
	exclusive: Option<(ThreadId, usize)>,
	/// Shared holders and their re-entry counts.
	shared: HashMap<ThreadId, usize>,
}

impl DoorState {
	fn admits_shared(&self, thread: ThreadId) -> bool {
		match self.exclusive {
			Some((owner, _)) => owner == thread,
			None => true,
		}
	}

	fn admits_exclusive(&self, thread: ThreadId) -> bool {
		let owner_ok = match self.exclusive {
			Some((owner, _)) => owner == thread,
			None => true,
		};
		owner_ok && self.shared.keys().all(|holder| *holder == thread)
	}

	fn is_free(&self) -> bool {
		self.exclusive.is_none() && self.shared.is_empty()
	}
}

#[derive(Debug)]
struct DoorTable {
	doors: Vec<DoorState>,
}

impl DoorTable {
	fn grantable(&self, doors: DoorSet, access: Access, thread: ThreadId) -> bool {
		doors.indices().all(|i| match access {
			Access::Shared => self.doors[i].admits_shared(thread),
			Access::Exclusive => self.doors[i].admits_exclusive(thread),
		})
	}

	fn grant(&mut self, doors: DoorSet, access: Access, thread: ThreadId) {
		for i in doors.indices() {
			let door = &mut self.doors[i];
			match access {
				Access::Shared => *door.shared.entry(thread).or_insert(0) += 1,
				Access::Exclusive => {
					let count = door.exclusive.map_or(0, |(_, count)| count);
					door.exclusive = Some((thread, count + 1));
				}
			}
		}
	}

	/// Releases `doors` for `thread`; returns the doors that were not held.
	fn release(&mut self, doors: DoorSet, access: Access, thread: ThreadId) -> DoorSet {
		let mut unheld = DoorSet::empty();
		for i in doors.indices() {
			let door = &mut self.doors[i];
			match access {
				Access::Shared => match door.shared.get_mut(&thread) {
					Some(count) if *count > 1 => *count -= 1,
					Some(_) => {
						door.shared.remove(&thread);
					}
					None => unheld |= DoorSet::door(i as u32),
				},
				Access::Exclusive => match door.exclusive {
					Some((owner, count)) if owner == thread && count > 1 => {
						door.exclusive = Some((owner, count - 1));
					}
					Some((owner, _)) if owner == thread => door.exclusive = None,
					_ => unheld |= DoorSet::door(i as u32),
				},
			}
		}
		unheld
	}
}

/// Holder counts of one door, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorSnapshot {
	/// Index of the door.
	pub index: usize,
	/// Number of threads holding the door shared.
	pub shared_holders: usize,
	/// Re-entry count of the exclusive owner, zero if not held exclusively.
	pub exclusive_depth: usize,
}

/// A table of reader/writer doors.
///
/// All door-state transitions happen under one internal mutex, so a request
/// for several doors is evaluated and granted as one indivisible step. Two
/// callers requesting overlapping sets in different orders therefore cannot
/// deadlock on partial acquisition.
///
/// Holdings are counted per thread. A thread may re-enter doors it holds
/// exclusively in either mode, and a thread that is the only shared holder
/// of a door may upgrade to exclusive. Two threads that both hold a door
/// shared and both request it exclusively without a timeout will wait on
/// each other forever; callers that upgrade should pass a timeout.
#[derive(Debug)]
pub struct LockManager {
	table: Mutex<DoorTable>,
	released: Condvar,
}

impl Default for LockManager {
	fn default() -> Self {
		Self::new()
	}
}

impl LockManager {
	/// Creates a lock manager with every door free.
	pub fn new() -> Self {
		Self {
			table: Mutex::new(DoorTable {
				doors: vec![DoorState::default(); MAX_DOORS as usize],
			}),
			released: Condvar::new(),
		}
	}

	/// Acquires `doors` in shared mode.
	///
	/// Blocks until no other thread holds any of the doors exclusively. A
	/// timeout of `None`, zero, or too large to form a deadline blocks without
	/// bound. Returns `false` if the timeout elapsed, in which case nothing was
	/// acquired.
	pub fn acquire_shared(&self, doors: DoorSet, timeout: Option<Duration>) -> bool {
		self.acquire(doors, Access::Shared, timeout)
	}

	/// Acquires `doors` in exclusive mode.
	///
	/// Blocks until no other thread holds any of the doors in any mode. A
	/// timeout of `None`, zero, or too large to form a deadline blocks without
	/// bound. Returns `false` if the timeout elapsed, in which case nothing was
	/// acquired.
	pub fn acquire_exclusive(&self, doors: DoorSet, timeout: Option<Duration>) -> bool {
		self.acquire(doors, Access::Exclusive, timeout)
	}

	/// Acquires `doors` shared if that is possible without waiting.
	pub fn attempt_shared(&self, doors: DoorSet) -> bool {
		self.attempt(doors, Access::Shared)
	}

	/// Acquires `doors` exclusively if that is possible without waiting.
	pub fn attempt_exclusive(&self, doors: DoorSet) -> bool {
		self.attempt(doors, Access::Exclusive)
	}

	/// Releases one shared holding of each door in `doors`.
	pub fn release_shared(&self, doors: DoorSet) {
		self.release(doors, Access::Shared);
	}

	/// Releases one exclusive holding of each door in `doors`.
	pub fn release_exclusive(&self, doors: DoorSet) {
		self.release(doors, Access::Exclusive);
	}

	/// Acquires `doors` shared and returns a guard releasing them on drop.
	///
	/// Returns `None` if the timeout elapsed.
	pub fn shared(&self, doors: DoorSet, timeout: Option<Duration>) -> Option<DoorGuard<'_>> {
		self.acquire_shared(doors, timeout)
			.then(|| DoorGuard::new(self, doors, Access::Shared))
	}

	/// Acquires `doors` exclusively and returns a guard releasing them on drop.
	///
	/// Returns `None` if the timeout elapsed.
	pub fn exclusive(&self, doors: DoorSet, timeout: Option<Duration>) -> Option<DoorGuard<'_>> {
		self.acquire_exclusive(doors, timeout)
			.then(|| DoorGuard::new(self, doors, Access::Exclusive))
	}

	/// Returns `true` if the calling thread holds every door in `doors` shared.
	pub fn holds_shared(&self, doors: DoorSet) -> bool {
		let thread = thread::current().id();
		let table = self.table.lock();
		doors
			.indices()
			.all(|i| table.doors[i].shared.contains_key(&thread))
	}

	/// Returns `true` if the calling thread holds every door in `doors` exclusively.
	pub fn holds_exclusive(&self, doors: DoorSet) -> bool {
		let thread = thread::current().id();
		let table = self.table.lock();
		doors
			.indices()
			.all(|i| matches!(table.doors[i].exclusive, Some((owner, _)) if owner == thread))
	}

	/// Returns holder counts of every door currently held by any thread.
	pub fn snapshot(&self) -> Vec<DoorSnapshot> {
		let table = self.table.lock();
		table
			.doors
			.iter()
			.enumerate()
			.filter(|(_, door)| !door.is_free())
			.map(|(index, door)| DoorSnapshot {
				index,
				shared_holders: door.shared.len(),
				exclusive_depth: door.exclusive.map_or(0, |(_, count)| count),
			})
			.collect()
	}

	fn attempt(&self, doors: DoorSet, access: Access) -> bool {
		let thread = thread::current().id();
		let mut table = self.table.lock();
		if table.grantable(doors, access, thread) {
			table.grant(doors, access, thread);
			trace!(?doors, ?access, "doors acquired");
			true
		} else {
			false
		}
	}

	fn acquire(&self, doors: DoorSet, access: Access, timeout: Option<Duration>) -> bool {
		let thread = thread::current().id();
		let deadline = timeout
			.filter(|t| !t.is_zero())
			.and_then(|t| Instant::now().checked_add(t));

		let mut table = self.table.lock();
		loop {
			if table.grantable(doors, access, thread) {
				table.grant(doors, access, thread);
				trace!(?doors, ?access, "doors acquired");
				return true;
			}

			match deadline {
				None => self.released.wait(&mut table),
				Some(deadline) => {
					if self.released.wait_until(&mut table, deadline).timed_out() {
						if table.grantable(doors, access, thread) {
							table.grant(doors, access, thread);
							trace!(?doors, ?access, "doors acquired at deadline");
							return true;
						}
						debug!(?doors, ?access, ?timeout, "door acquisition timed out");
						return false;
					}
				}
			}
		}
	}

	fn release(&self, doors: DoorSet, access: Access) {
		let thread = thread::current().id();
		let unheld = {
			let mut table = self.table.lock();
			table.release(doors, access, thread)
		};
		if !unheld.is_empty() {
			warn!(doors = ?unheld, ?access, "released doors that were not held");
		}
		let released = doors.difference(unheld);
		if released.is_empty() {
			return;
		}
		trace!(doors = ?released, ?access, "doors released");
		self.released.notify_all();
	}
}
