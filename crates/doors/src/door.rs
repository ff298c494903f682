//! Door identifiers.

/// Number of door slots a [`LockManager`](crate::LockManager) tracks.
pub const MAX_DOORS: u32 = u32::BITS;

bitflags::bitflags! {
	/// A set of doors, requested and granted as a unit.
	///
	/// The named constants cover the session's document state. Additional
	/// slots can be addressed by index through [`DoorSet::door`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct DoorSet: u32 {
		/// Timeline length, position, selection and visible span.
		const TIME = 1 << 0;
		/// The receiver collection and receiver geometry.
		const RECEIVERS = 1 << 1;
		/// The transmitter collection.
		const TRANSMITTERS = 1 << 2;
		/// The group collection and group membership.
		const GROUPS = 1 << 3;
		/// Transmitter trajectory data.
		const TRAJECTORIES = 1 << 4;
	}
}

impl DoorSet {
	/// Every door guarding session content.
	pub const SESSION: DoorSet = DoorSet::TIME
		.union(DoorSet::RECEIVERS)
		.union(DoorSet::TRANSMITTERS)
		.union(DoorSet::GROUPS)
		.union(DoorSet::TRAJECTORIES);

	/// Returns the set containing only the door at `index`.
	///
	/// Returns an empty set if `index` is out of range.
	pub const fn door(index: u32) -> DoorSet {
		if index < MAX_DOORS {
			DoorSet::from_bits_retain(1 << index)
		} else {
			DoorSet::empty()
		}
	}

	/// Iterates over the indices of the doors in this set, in ascending order.
	pub fn indices(self) -> impl Iterator<Item = usize> {
		let bits = self.bits();
		(0..MAX_DOORS as usize).filter(move |i| bits & (1 << i) != 0)
	}
}
