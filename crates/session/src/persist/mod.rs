//! Saving and loading sessions.
//!
//! A session is written as an [`Element`] tree and stored as pretty-printed
//! JSON:
//!
//! ```text
//! session
//! ├── timeline      rate, length, position, selection and visible bounds
//! ├── map           session properties
//! ├── receivers
//! │   └── receiver  name, anchor, size; map and one table per kind
//! ├── transmitters
//! │   └── transmitter  name; map
//! └── groups
//!     └── group     name; map and member names
//! ```


use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use meloncillo_doors::DoorSet;
use meloncillo_props::{Element, PropertyMap, SourceId};
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::object::{ObjectKind, Point, ReceiverState, SessionObject, Size, TableKind};
use crate::session::Session;
use crate::timeline::Span;

const SESSION: &str = "session";
const TIMELINE: &str = "timeline";
const MAP: &str = "map";
const TABLE: &str = "table";
const MEMBER: &str = "member";

fn list_name(kind: ObjectKind) -> &'static str {
	match kind {
		ObjectKind::Receiver => "receivers",
		ObjectKind::Transmitter => "transmitters",
		ObjectKind::Group => "groups",
	}
}

fn malformed(msg: impl Into<String>) -> SessionError {
	SessionError::Malformed(msg.into())
}

fn parse_attr<T: FromStr>(element: &Element, name: &str) -> Result<T> {
	let text = element
		.attr(name)
		.ok_or_else(|| malformed(format!("<{}> lacks attribute `{name}`", element.name)))?;
	text.parse()
		.map_err(|_| malformed(format!("<{}> has invalid `{name}`: {text:?}", element.name)))
}

fn map_element(map: &PropertyMap) -> Element {
	let mut element = Element::new(MAP);
	map.to_xml(&mut element);
	element
}

fn load_map(map: &PropertyMap, source: Option<SourceId>, parent: &Element) {
	map.clear_values(source);
	if let Some(element) = parent.child(MAP) {
		map.from_xml(source, element);
	}
}

fn format_table(table: &[f32]) -> String {
	table.iter().map(f32::to_string).collect::<Vec<_>>().join(" ")
}

fn parse_table(text: &str) -> Result<Vec<f32>> {
	text.split_whitespace()
		.map(|v| v.parse().map_err(|_| malformed(format!("invalid table value {v:?}"))))
		.collect()
}

fn object_element(object: &SessionObject) -> Element {
	let mut element = Element::new(object.kind().tag()).with_attr("name", object.name());
	if let Some(state) = object.receiver_state() {
		element.set_attr("x", state.anchor.x);
		element.set_attr("y", state.anchor.y);
		element.set_attr("width", state.size.width);
		element.set_attr("height", state.size.height);
		for kind in TableKind::ALL {
			element.push(
				Element::new(TABLE)
					.with_attr("kind", kind.tag())
					.with_attr("values", format_table(state.table(kind))),
			);
		}
	}
	for member in object.members().unwrap_or_default() {
		element.push(Element::new(MEMBER).with_attr("name", member));
	}
	element.push(map_element(object.map()));
	element
}

fn load_object(kind: ObjectKind, element: &Element) -> Result<SessionObject> {
	let name: String = parse_attr(element, "name")?;
	let object = match kind {
		ObjectKind::Receiver => {
			let mut state = ReceiverState {
				anchor: Point::new(parse_attr(element, "x")?, parse_attr(element, "y")?),
				size: Size::new(parse_attr(element, "width")?, parse_attr(element, "height")?),
				..ReceiverState::default()
			};
			for table in element.children_named(TABLE) {
				let tag: String = parse_attr(table, "kind")?;
				let kind = TableKind::from_tag(&tag)
					.ok_or_else(|| malformed(format!("unknown table kind {tag:?}")))?;
				let values: String = parse_attr(table, "values")?;
				match kind {
					TableKind::Distance => state.distance_table = parse_table(&values)?,
					TableKind::Rotation => state.rotation_table = parse_table(&values)?,
				}
			}
			SessionObject::with_state(name, state)
		}
		ObjectKind::Transmitter => SessionObject::transmitter(name),
		ObjectKind::Group => {
			let members = element
				.children_named(MEMBER)
				.map(|m| parse_attr(m, "name"))
				.collect::<Result<Vec<String>>>()?;
			SessionObject::group(name, members)
		}
	};
	load_map(object.map(), None, element);
	Ok(object)
}

impl Session {
	/// Writes the session into an element tree.
	///
	/// Callers hold [`DoorSet::SESSION`] at least shared.
	pub fn to_element(&self) -> Element {
		let state = self.timeline().state();
		let mut root = Element::new(SESSION);
		root.push(
			Element::new(TIMELINE)
				.with_attr("rate", state.rate)
				.with_attr("length", state.length)
				.with_attr("position", state.position)
				.with_attr("selection-start", state.selection.start)
				.with_attr("selection-stop", state.selection.stop)
				.with_attr("visible-start", state.visible.start)
				.with_attr("visible-stop", state.visible.stop),
		);
		root.push(map_element(self.map()));
		for kind in ObjectKind::ALL {
			let list = root.push(Element::new(list_name(kind)));
			for object in self.collection(kind).objects() {
				list.push(object_element(&object));
			}
		}
		root
	}

	/// Replaces the whole session content with `element`.
	///
	/// Runs with [`DoorSet::SESSION`] held exclusively. The element is parsed
	/// completely before anything is replaced, so a malformed element leaves
	/// the session as it was. Changes are reported under `source`.
	pub fn load_element(&self, source: Option<SourceId>, element: &Element) -> Result<()> {
		if element.name != SESSION {
			return Err(malformed(format!("expected <{SESSION}>, found <{}>", element.name)));
		}
		let timeline = element
			.child(TIMELINE)
			.ok_or_else(|| malformed("missing <timeline>"))?;
		let rate: f64 = parse_attr(timeline, "rate")?;
		if !rate.is_finite() || rate <= 0.0 {
			return Err(malformed(format!("invalid rate {rate}")));
		}
		let length: i64 = parse_attr(timeline, "length")?;
		let position: i64 = parse_attr(timeline, "position")?;
		let selection = Span::new(
			parse_attr(timeline, "selection-start")?,
			parse_attr(timeline, "selection-stop")?,
		);
		let visible = Span::new(
			parse_attr(timeline, "visible-start")?,
			parse_attr(timeline, "visible-stop")?,
		);

		let mut objects = Vec::new();
		for kind in ObjectKind::ALL {
			let loaded = match element.child(list_name(kind)) {
				Some(list) => list
					.children_named(kind.tag())
					.map(|e| load_object(kind, e).map(Arc::new))
					.collect::<Result<Vec<_>>>()?,
				None => Vec::new(),
			};
			objects.push((kind, loaded));
		}

		let _guard = self
			.doors()
			.exclusive(DoorSet::SESSION, self.config().lock_timeout())
			.ok_or(SessionError::LockTimeout(DoorSet::SESSION))?;

		let t = self.timeline();
		t.set_rate(source, rate);
		t.set_length(source, length);
		t.set_position(source, position);
		t.set_selection(source, selection);
		t.set_visible_span(source, visible);
		load_map(self.map(), source, element);
		for (kind, loaded) in objects {
			let collection = self.collection(kind);
			collection.clear(source);
			collection.add_all(source, &loaded);
			debug!(kind = kind.tag(), count = loaded.len(), "objects loaded");
		}
		Ok(())
	}
}

/// Saves `session` to `path` as pretty-printed JSON.
pub fn save(session: &Session, path: &Path) -> Result<()> {
	let element = {
		let _guard = session
			.doors()
			.shared(DoorSet::SESSION, session.config().lock_timeout())
			.ok_or(SessionError::LockTimeout(DoorSet::SESSION))?;
		session.to_element()
	};
	let json = serde_json::to_string_pretty(&element)?;
	fs::write(path, json).map_err(|error| SessionError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	info!(path = %path.display(), "session saved");
	Ok(())
}

/// Loads `path` into `session`, reporting the changes under `source`.
pub fn load(session: &Session, source: Option<SourceId>, path: &Path) -> Result<()> {
	let json = fs::read_to_string(path).map_err(|error| SessionError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	let element: Element = serde_json::from_str(&json)?;
	session.load_element(source, &element)?;
	info!(path = %path.display(), "session loaded");
	Ok(())
}
