//! Element-tree persistence of property maps.

use tracing::warn;

use super::PropertyMap;
use crate::context::Context;
use crate::element::Element;
use crate::source::SourceId;
use crate::value::{PropType, PropValue};

const ENTRY: &str = "entry";
const ATTR_KEY: &str = "key";
const ATTR_VALUE: &str = "value";
const ATTR_TYPE: &str = "type";

impl PropertyMap {
	/// Appends one `entry` child per stored value to `parent`.
	///
	/// Keys whose context carries `NO_STORAGE` are skipped. Each entry has
	/// `key`, `value` and `type` attributes.
	pub fn to_xml(&self, parent: &mut Element) {
		let inner = self.inner.read();
		for (key, value) in &inner.values {
			if inner.contexts.get(key).is_some_and(|ctx| !ctx.is_stored()) {
				continue;
			}
			parent.push(
				Element::new(ENTRY)
					.with_attr(ATTR_KEY, key)
					.with_attr(ATTR_VALUE, value.format())
					.with_attr(ATTR_TYPE, value.ty().tag()),
			);
		}
	}

	/// Loads the `entry` children of `parent` and returns how many were applied.
	///
	/// Malformed entries, unknown type tags, unparsable values, values whose
	/// type a registered context does not accept, and values outside a
	/// registered constraint are skipped with a warning. Keys without a
	/// context get one of the entry's type (string if the tag is missing).
	/// The loaded values are applied as one batch attributed to `source`.
	pub fn from_xml(&self, source: Option<SourceId>, parent: &Element) -> usize {
		let mut loaded: Vec<(String, PropValue)> = Vec::new();

		for entry in parent.children_named(ENTRY) {
			let (Some(key), Some(text)) = (entry.attr(ATTR_KEY), entry.attr(ATTR_VALUE)) else {
				warn!(attributes = ?entry.attributes, "skipping map entry without key or value");
				continue;
			};
			let ty = match entry.attr(ATTR_TYPE).map(PropType::from_tag) {
				None => PropType::String,
				Some(Ok(ty)) => ty,
				Some(Err(err)) => {
					warn!(key, %err, "skipping map entry");
					continue;
				}
			};
			let value = match ty.parse(text) {
				Ok(value) => value,
				Err(err) => {
					warn!(key, %err, "skipping map entry");
					continue;
				}
			};

			match self.get_context(key) {
				Some(ctx) => {
					let Some(value) = value.coerce(ctx.ty) else {
						warn!(
							key,
							found = %ty,
							expected = %ctx.ty,
							"skipping map entry of mismatching type"
						);
						continue;
					};
					if let Some(constraint) = &ctx.constraint
						&& !constraint.admits(&value)
					{
						warn!(key, value = %text, "skipping map entry outside its constraint");
						continue;
					}
					loaded.push((key.to_string(), value));
				}
				None => {
					self.put_context(None, key, Context::new(ty));
					loaded.push((key.to_string(), value));
				}
			}
		}

		let count = loaded.len();
		self.put_all_values(source, loaded);
		count
	}
}
