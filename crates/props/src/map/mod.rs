//! The observable property map.
//!
//! State lives behind an internal lock; events are computed under the lock
//! and dispatched after it is released, so listeners may read or write the
//! same map.

mod xml;

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::warn;

use crate::context::{Context, ContextFlags};
use crate::event::{Dispatcher, MapEvent, OwnerModKind, ValueChange};
use crate::source::SourceId;
use crate::value::PropValue;

#[derive(Debug, Clone, Default)]
struct MapInner {
	values: BTreeMap<String, PropValue>,
	contexts: BTreeMap<String, Context>,
}

impl MapInner {
	/// Converts `value` to the declared type of `key`, if any.
	///
	/// Returns `None` if the key has a context whose type does not accept
	/// the value.
	fn conform(&self, key: &str, value: PropValue) -> Option<PropValue> {
		match self.contexts.get(key) {
			Some(ctx) => value.coerce(ctx.ty),
			None => Some(value),
		}
	}

	fn is_visual(&self, key: &str) -> bool {
		self.contexts
			.get(key)
			.is_some_and(|ctx| ctx.flags.contains(ContextFlags::VISUAL))
	}

	/// Stores `value` and records the change if it differs from the current value.
	fn store(&mut self, key: &str, value: PropValue, changes: &mut Vec<ValueChange>) -> Option<PropValue> {
		let old = self.values.insert(key.to_string(), value.clone());
		if old.as_ref() != Some(&value) {
			changes.push(ValueChange {
				key: key.to_string(),
				old: old.clone(),
				new: Some(value),
			});
		}
		old
	}
}

/// Observable key/value store owned by one session object.
///
/// Keys may carry a [`Context`]. A key with a context only ever holds values
/// of the declared type; numeric values are converted between the numeric
/// types on the way in.
///
/// Every mutator takes an `Option<SourceId>`. With `Some(source)`, a
/// [`MapEvent::ValuesChanged`] is dispatched if anything actually changed,
/// followed by one [`MapEvent::OwnerModified`] of kind
/// [`OwnerModKind::Visual`] if a changed key is flagged `VISUAL`. With
/// `None` the update is silent.
#[derive(Debug, Default)]
pub struct PropertyMap {
	inner: RwLock<MapInner>,
	events: Dispatcher<MapEvent>,
}

impl Clone for PropertyMap {
	/// Copies values and contexts. The copy starts without listeners.
	fn clone(&self) -> Self {
		Self {
			inner: RwLock::new(self.inner.read().clone()),
			events: Dispatcher::new(),
		}
	}
}

impl PropertyMap {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the dispatcher listeners subscribe to.
	pub fn events(&self) -> &Dispatcher<MapEvent> {
		&self.events
	}

	/// Stores `value` under `key` and returns the previous value.
	///
	/// A value whose type the key's context does not accept is rejected
	/// with a warning; the map is left unchanged and the current value is
	/// returned.
	pub fn put_value(
		&self,
		source: Option<SourceId>,
		key: &str,
		value: impl Into<PropValue>,
	) -> Option<PropValue> {
		let value = value.into();
		let mut changes = Vec::new();
		let (old, visual) = {
			let mut inner = self.inner.write();
			let Some(value) = inner.conform(key, value.clone()) else {
				warn!(key, ty = %value.ty(), "value rejected by key context");
				return inner.values.get(key).cloned();
			};
			let old = inner.store(key, value, &mut changes);
			(old, inner.is_visual(key))
		};
		self.dispatch_changes(source, changes, visual);
		old
	}

	/// Stores several values at once, dispatching at most one batch event.
	pub fn put_all_values<K, V>(&self, source: Option<SourceId>, values: impl IntoIterator<Item = (K, V)>)
	where
		K: AsRef<str>,
		V: Into<PropValue>,
	{
		let mut changes = Vec::new();
		let visual = {
			let mut inner = self.inner.write();
			for (key, value) in values {
				let key = key.as_ref();
				let value = value.into();
				match inner.conform(key, value.clone()) {
					Some(value) => {
						inner.store(key, value, &mut changes);
					}
					None => warn!(key, ty = %value.ty(), "value rejected by key context"),
				}
			}
			changes.iter().any(|c| inner.is_visual(&c.key))
		};
		self.dispatch_changes(source, changes, visual);
	}

	/// Removes the value of `key` and returns it. The context stays registered.
	pub fn remove_value(&self, source: Option<SourceId>, key: &str) -> Option<PropValue> {
		let (old, visual) = {
			let mut inner = self.inner.write();
			(inner.values.remove(key), inner.is_visual(key))
		};
		if let Some(old) = &old {
			let change = ValueChange {
				key: key.to_string(),
				old: Some(old.clone()),
				new: None,
			};
			self.dispatch_changes(source, vec![change], visual);
		}
		old
	}

	/// Removes every value. Contexts stay registered.
	pub fn clear_values(&self, source: Option<SourceId>) {
		let (changes, visual) = {
			let mut inner = self.inner.write();
			let values = std::mem::take(&mut inner.values);
			let visual = values.keys().any(|k| inner.is_visual(k));
			let changes: Vec<_> = values
				.into_iter()
				.map(|(key, old)| ValueChange {
					key,
					old: Some(old),
					new: None,
				})
				.collect();
			(changes, visual)
		};
		self.dispatch_changes(source, changes, visual);
	}

	/// Registers or replaces the context of `key`.
	///
	/// If no value is present and the context has a default, the default is
	/// stored. If a value of a type the context does not accept is present,
	/// a warning is logged and the value is reset to the default (or removed
	/// if there is none). Numeric values are converted to the declared type
	/// and the conversion is reported like any other change.
	pub fn put_context(&self, source: Option<SourceId>, key: &str, context: Context) {
		let mut changes = Vec::new();
		let visual = context.flags.contains(ContextFlags::VISUAL);
		{
			let mut inner = self.inner.write();
			let current = inner.values.get(key).cloned();
			match current {
				None => {
					if let Some(default) = context.typed_default() {
						inner.store(key, default, &mut changes);
					}
				}
				Some(value) => match value.coerce(context.ty) {
					Some(conformed) => {
						inner.store(key, conformed, &mut changes);
					}
					None => {
						warn!(
							key,
							found = %value.ty(),
							expected = %context.ty,
							"value type does not match new context, resetting to default"
						);
						match context.typed_default() {
							Some(default) => {
								inner.store(key, default, &mut changes);
							}
							None => {
								inner.values.remove(key);
								changes.push(ValueChange {
									key: key.to_string(),
									old: Some(value),
									new: None,
								});
							}
						}
					}
				},
			}
			inner.contexts.insert(key.to_string(), context);
		}
		self.dispatch_changes(source, changes, visual);
	}

	/// Unregisters the context of `key`, keeping its value.
	pub fn remove_context(&self, key: &str) -> Option<Context> {
		self.inner.write().contexts.remove(key)
	}

	/// Returns the context of `key`.
	pub fn get_context(&self, key: &str) -> Option<Context> {
		self.inner.read().contexts.get(key).cloned()
	}

	/// Returns the value of `key`.
	pub fn get_value(&self, key: &str) -> Option<PropValue> {
		self.inner.read().values.get(key).cloned()
	}

	/// Returns `true` if a value is stored under `key`.
	pub fn contains_key(&self, key: &str) -> bool {
		self.inner.read().values.contains_key(key)
	}

	/// Returns a copy of every stored value.
	pub fn values(&self) -> BTreeMap<String, PropValue> {
		self.inner.read().values.clone()
	}

	/// Returns the number of stored values.
	pub fn len(&self) -> usize {
		self.inner.read().values.len()
	}

	/// Returns `true` if no value is stored.
	pub fn is_empty(&self) -> bool {
		self.inner.read().values.is_empty()
	}

	/// Returns the registered keys whose context flags intersect `inclusion`
	/// and are disjoint from `exclusion`, in key order.
	///
	/// Passing [`ContextFlags::all()`] and [`ContextFlags::empty()`] selects
	/// every key that has a value or a context, including keys without a
	/// context. Otherwise keys without a context are never selected.
	pub fn key_set(&self, inclusion: ContextFlags, exclusion: ContextFlags) -> Vec<String> {
		let inner = self.inner.read();
		if inclusion == ContextFlags::all() && exclusion.is_empty() {
			let mut keys: Vec<String> = inner
				.values
				.keys()
				.chain(inner.contexts.keys())
				.cloned()
				.collect();
			keys.sort();
			keys.dedup();
			return keys;
		}
		inner
			.contexts
			.iter()
			.filter(|(_, ctx)| ctx.flags.intersects(inclusion) && !ctx.flags.intersects(exclusion))
			.map(|(key, _)| key.clone())
			.collect()
	}

	/// Notifies listeners of a change to the owner that is not tied to a key.
	///
	/// Nothing is dispatched for a `None` source.
	pub fn dispatch_owner_modification(
		&self,
		source: Option<SourceId>,
		kind: OwnerModKind,
		param: Option<PropValue>,
	) {
		if let Some(source) = source {
			self.events
				.dispatch(&MapEvent::OwnerModified { source, kind, param });
		}
	}

	fn dispatch_changes(&self, source: Option<SourceId>, changes: Vec<ValueChange>, visual: bool) {
		let Some(source) = source else { return };
		if changes.is_empty() {
			return;
		}
		self.events.dispatch(&MapEvent::ValuesChanged { source, changes });
		if visual {
			self.dispatch_owner_modification(Some(source), OwnerModKind::Visual, None);
		}
	}
}
