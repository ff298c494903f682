//! Property and naming edits.

use std::sync::Arc;

use meloncillo_doors::DoorSet;
use meloncillo_edit::{Attribution, Result};
use meloncillo_props::{PropValue, PropertyMap, SourceId};

use crate::object::SessionObject;
use crate::session::Session;

/// The owner of a property map.
#[derive(Debug, Clone)]
pub enum MapTarget {
	/// Session-wide properties.
	Session,
	Object(Arc<SessionObject>),
}

impl MapTarget {
	pub fn map<'a>(&'a self, session: &'a Session) -> &'a PropertyMap {
		match self {
			MapTarget::Session => session.map(),
			MapTarget::Object(object) => object.map(),
		}
	}

	/// The doors to hold while writing to the map.
	pub fn doors(&self) -> DoorSet {
		match self {
			MapTarget::Session => DoorSet::empty(),
			MapTarget::Object(object) => object.kind().door(),
		}
	}
}

/// Stores a single property value.
///
/// Undoing an edit that created the key removes it again.
#[derive(Debug, Clone)]
pub struct SetMapValue {
	target: MapTarget,
	key: String,
	old: Option<PropValue>,
	new: PropValue,
	attribution: Attribution,
}

impl SetMapValue {
	pub fn new(
		session: &Session,
		target: MapTarget,
		source: Option<SourceId>,
		key: impl Into<String>,
		value: impl Into<PropValue>,
	) -> Self {
		let key = key.into();
		let old = target.map(session).get_value(&key);
		Self {
			target,
			key,
			old,
			new: value.into(),
			attribution: Attribution::new(source),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn values(&self) -> (Option<&PropValue>, &PropValue) {
		(self.old.as_ref(), &self.new)
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		let doors = self.target.doors();
		let _guard = (!doors.is_empty())
			.then(|| session.lock_exclusive(doors))
			.transpose()?;
		self.target
			.map(session)
			.put_value(self.attribution.next(), &self.key, self.new.clone());
		Ok(())
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		let doors = self.target.doors();
		let _guard = (!doors.is_empty())
			.then(|| session.lock_exclusive(doors))
			.transpose()?;
		let map = self.target.map(session);
		let source = self.attribution.next();
		match &self.old {
			Some(old) => {
				map.put_value(source, &self.key, old.clone());
			}
			None => {
				map.remove_value(source, &self.key);
			}
		}
		Ok(())
	}
}

/// Renames a session object.
#[derive(Debug, Clone)]
pub struct RenameObject {
	object: Arc<SessionObject>,
	old: String,
	new: String,
	attribution: Attribution,
}

impl RenameObject {
	pub fn new(object: Arc<SessionObject>, source: Option<SourceId>, name: impl Into<String>) -> Self {
		Self {
			old: object.name(),
			new: name.into(),
			object,
			attribution: Attribution::new(source),
		}
	}

	pub fn object(&self) -> &Arc<SessionObject> {
		&self.object
	}

	pub fn names(&self) -> (&str, &str) {
		(&self.old, &self.new)
	}

	fn apply(&mut self, session: &Session, forward: bool) -> Result<()> {
		let _guard = session.lock_exclusive(self.object.kind().door())?;
		let name = if forward { &self.new } else { &self.old };
		self.object.set_name(self.attribution.next(), name);
		Ok(())
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		self.apply(session, true)
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		self.apply(session, false)
	}
}
