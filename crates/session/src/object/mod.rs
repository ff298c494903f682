//! Receivers, transmitters and groups.


use std::sync::atomic::{AtomicU64, Ordering};

use meloncillo_doors::DoorSet;
use meloncillo_props::{OwnerModKind, PropValue, PropertyMap, SourceId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Counter for generating unique object IDs.
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a session object, stable for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
	/// Generates a new unique object ID.
	pub fn next() -> Self {
		Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
	}

	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

impl std::fmt::Display for ObjectId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "obj#{}", self.0)
	}
}

/// The three kinds of session objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
	Receiver,
	Transmitter,
	Group,
}

impl ObjectKind {
	/// Every kind, in session order.
	pub const ALL: [ObjectKind; 3] = [ObjectKind::Receiver, ObjectKind::Transmitter, ObjectKind::Group];

	/// The door guarding the collection of this kind and its objects.
	pub const fn door(self) -> DoorSet {
		match self {
			ObjectKind::Receiver => DoorSet::RECEIVERS,
			ObjectKind::Transmitter => DoorSet::TRANSMITTERS,
			ObjectKind::Group => DoorSet::GROUPS,
		}
	}

	/// Element name of a single object of this kind.
	pub const fn tag(self) -> &'static str {
		match self {
			ObjectKind::Receiver => "receiver",
			ObjectKind::Transmitter => "transmitter",
			ObjectKind::Group => "group",
		}
	}

	/// Prefix of generated names.
	pub const fn name_prefix(self) -> &'static str {
		match self {
			ObjectKind::Receiver => "R",
			ObjectKind::Transmitter => "T",
			ObjectKind::Group => "G",
		}
	}
}

/// A location on the virtual surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Extent of a receiver's sensitive area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Which sensitivity table of a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
	/// Sensitivity over distance from the anchor.
	Distance,
	/// Sensitivity over angle around the anchor.
	Rotation,
}

impl TableKind {
	pub const ALL: [TableKind; 2] = [TableKind::Distance, TableKind::Rotation];

	pub const fn tag(self) -> &'static str {
		match self {
			TableKind::Distance => "distance",
			TableKind::Rotation => "rotation",
		}
	}

	pub fn from_tag(tag: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.tag() == tag)
	}
}

/// Geometry and sensitivity of a receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverState {
	pub anchor: Point,
	pub size: Size,
	pub distance_table: Vec<f32>,
	pub rotation_table: Vec<f32>,
}

impl Default for ReceiverState {
	fn default() -> Self {
		Self {
			anchor: Point::new(0.5, 0.5),
			size: Size::new(0.25, 0.25),
			distance_table: vec![1.0, 0.0],
			rotation_table: vec![1.0, 1.0],
		}
	}
}

impl ReceiverState {
	fn table_mut(&mut self, kind: TableKind) -> &mut Vec<f32> {
		match kind {
			TableKind::Distance => &mut self.distance_table,
			TableKind::Rotation => &mut self.rotation_table,
		}
	}

	pub fn table(&self, kind: TableKind) -> &[f32] {
		match kind {
			TableKind::Distance => &self.distance_table,
			TableKind::Rotation => &self.rotation_table,
		}
	}
}

#[derive(Debug)]
enum ObjectBody {
	Receiver(RwLock<ReceiverState>),
	Transmitter,
	Group(RwLock<Vec<String>>),
}

/// A receiver, transmitter or group of a session.
///
/// Mutators do not acquire doors; callers hold the door of the object's
/// kind exclusively. Structural changes are reported through the owner
/// modification channel of the object's [`PropertyMap`], and only when a
/// source is given and something actually changed.
#[derive(Debug)]
pub struct SessionObject {
	id: ObjectId,
	kind: ObjectKind,
	name: RwLock<String>,
	map: PropertyMap,
	body: ObjectBody,
}

impl SessionObject {
	/// Creates a receiver with default geometry and tables.
	pub fn receiver(name: impl Into<String>) -> Self {
		Self::with_state(name, ReceiverState::default())
	}

	/// Creates a receiver with the given geometry and tables.
	pub fn with_state(name: impl Into<String>, state: ReceiverState) -> Self {
		Self::build(ObjectKind::Receiver, name, ObjectBody::Receiver(RwLock::new(state)))
	}

	pub fn transmitter(name: impl Into<String>) -> Self {
		Self::build(ObjectKind::Transmitter, name, ObjectBody::Transmitter)
	}

	/// Creates a group referring to its members by name.
	pub fn group(name: impl Into<String>, members: Vec<String>) -> Self {
		Self::build(ObjectKind::Group, name, ObjectBody::Group(RwLock::new(members)))
	}

	fn build(kind: ObjectKind, name: impl Into<String>, body: ObjectBody) -> Self {
		Self {
			id: ObjectId::next(),
			kind,
			name: RwLock::new(name.into()),
			map: PropertyMap::new(),
			body,
		}
	}

	pub fn id(&self) -> ObjectId {
		self.id
	}

	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	pub fn name(&self) -> String {
		self.name.read().clone()
	}

	/// The object's property map.
	pub fn map(&self) -> &PropertyMap {
		&self.map
	}

	/// Renames the object and returns the previous name.
	pub fn set_name(&self, source: Option<SourceId>, name: &str) -> String {
		let old = std::mem::replace(&mut *self.name.write(), name.to_string());
		if old != name {
			self.map
				.dispatch_owner_modification(source, OwnerModKind::Renamed, Some(name.into()));
		}
		old
	}

	/// Returns a copy of the receiver state, `None` for other kinds.
	pub fn receiver_state(&self) -> Option<ReceiverState> {
		match &self.body {
			ObjectBody::Receiver(state) => Some(state.read().clone()),
			_ => None,
		}
	}

	pub fn anchor(&self) -> Option<Point> {
		self.read_receiver(|state| state.anchor)
	}

	pub fn size(&self) -> Option<Size> {
		self.read_receiver(|state| state.size)
	}

	pub fn table(&self, kind: TableKind) -> Option<Vec<f32>> {
		self.read_receiver(|state| state.table(kind).to_vec())
	}

	/// Moves a receiver. Returns `false` if the object is not a receiver.
	pub fn set_anchor(&self, source: Option<SourceId>, anchor: Point) -> bool {
		self.update_receiver(source, OwnerModKind::Moved, None, |state| {
			std::mem::replace(&mut state.anchor, anchor) != anchor
		})
	}

	/// Resizes a receiver. Returns `false` if the object is not a receiver.
	pub fn set_size(&self, source: Option<SourceId>, size: Size) -> bool {
		self.update_receiver(source, OwnerModKind::Resized, None, |state| {
			std::mem::replace(&mut state.size, size) != size
		})
	}

	/// Replaces a sensitivity table. Returns `false` if the object is not a
	/// receiver.
	pub fn set_table(&self, source: Option<SourceId>, kind: TableKind, table: Vec<f32>) -> bool {
		let param = Some(PropValue::from(kind.tag()));
		self.update_receiver(source, OwnerModKind::Sensitivity, param, |state| {
			let slot = state.table_mut(kind);
			let changed = *slot != table;
			*slot = table;
			changed
		})
	}

	/// Member names of a group, `None` for other kinds.
	pub fn members(&self) -> Option<Vec<String>> {
		match &self.body {
			ObjectBody::Group(members) => Some(members.read().clone()),
			_ => None,
		}
	}

	/// Replaces the members of a group. Returns `false` for other kinds.
	pub fn set_members(&self, source: Option<SourceId>, members: Vec<String>) -> bool {
		let ObjectBody::Group(slot) = &self.body else {
			return false;
		};
		let changed = {
			let mut slot = slot.write();
			let changed = *slot != members;
			*slot = members;
			changed
		};
		if changed {
			self.map
				.dispatch_owner_modification(source, OwnerModKind::Custom(GROUP_MEMBERS), None);
		}
		true
	}

	fn read_receiver<R>(&self, f: impl FnOnce(&ReceiverState) -> R) -> Option<R> {
		match &self.body {
			ObjectBody::Receiver(state) => Some(f(&state.read())),
			_ => None,
		}
	}

	fn update_receiver(
		&self,
		source: Option<SourceId>,
		kind: OwnerModKind,
		param: Option<PropValue>,
		f: impl FnOnce(&mut ReceiverState) -> bool,
	) -> bool {
		let ObjectBody::Receiver(state) = &self.body else {
			return false;
		};
		let changed = f(&mut state.write());
		if changed {
			self.map.dispatch_owner_modification(source, kind, param);
		}
		true
	}
}

/// Custom owner modification reported when group membership changes.
pub const GROUP_MEMBERS: u32 = 1;
