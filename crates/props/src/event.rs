//! Change events and synchronous listener dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::source::SourceId;
use crate::value::PropValue;

/// Change of a single key.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
	/// The key that changed.
	pub key: String,
	/// Value before the change, `None` if the key was absent.
	pub old: Option<PropValue>,
	/// Value after the change, `None` if the key was removed.
	pub new: Option<PropValue>,
}

/// Kind of structural change to the owner of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerModKind {
	/// A key with the `VISUAL` flag changed.
	Visual,
	/// The owner was renamed.
	Renamed,
	/// The owner was moved.
	Moved,
	/// The owner was resized.
	Resized,
	/// A sensitivity table of the owner changed.
	Sensitivity,
	/// Application-defined modification.
	Custom(u32),
}

/// Event published by a [`PropertyMap`](crate::PropertyMap).
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
	/// One or more keys changed value.
	ValuesChanged {
		/// Originator of the change.
		source: SourceId,
		/// The keys that actually changed, in key order.
		changes: Vec<ValueChange>,
	},
	/// The owner of the map changed in a way not tied to a key.
	OwnerModified {
		/// Originator of the change.
		source: SourceId,
		/// What changed.
		kind: OwnerModKind,
		/// Optional detail, such as the new name.
		param: Option<PropValue>,
	},
}

impl MapEvent {
	/// Returns the originator of the event.
	pub fn source(&self) -> SourceId {
		match self {
			MapEvent::ValuesChanged { source, .. } | MapEvent::OwnerModified { source, .. } => *source,
		}
	}

	/// Returns the changed keys of a `ValuesChanged` event.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		let changes: &[ValueChange] = match self {
			MapEvent::ValuesChanged { changes, .. } => changes,
			MapEvent::OwnerModified { .. } => &[],
		};
		changes.iter().map(|c| c.key.as_str())
	}
}

/// Handle returned by [`Dispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Synchronous, ordered event delivery.
///
/// Events reach the listeners registered at the moment of dispatch, in
/// subscription order. Listeners run on the dispatching thread with no
/// internal lock held, so they may subscribe, unsubscribe or dispatch again.
pub struct Dispatcher<E> {
	listeners: Mutex<Vec<(SubscriptionId, Listener<E>)>>,
	next_id: AtomicU64,
}

impl<E> Default for Dispatcher<E> {
	fn default() -> Self {
		Self {
			listeners: Mutex::new(Vec::new()),
			next_id: AtomicU64::new(1),
		}
	}
}

impl<E> std::fmt::Debug for Dispatcher<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dispatcher")
			.field("listeners", &self.listeners.lock().len())
			.finish()
	}
}

impl<E> Dispatcher<E> {
	/// Creates a dispatcher without listeners.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a listener.
	pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.listeners.lock().push((id, Arc::new(listener)));
		id
	}

	/// Removes a listener. Returns `false` if it was not registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut listeners = self.listeners.lock();
		let before = listeners.len();
		listeners.retain(|(sub, _)| *sub != id);
		listeners.len() != before
	}

	/// Returns the number of registered listeners.
	pub fn len(&self) -> usize {
		self.listeners.lock().len()
	}

	/// Returns `true` if no listener is registered.
	pub fn is_empty(&self) -> bool {
		self.listeners.lock().is_empty()
	}

	/// Delivers `event` to every registered listener.
	pub fn dispatch(&self, event: &E) {
		let listeners: Vec<Listener<E>> = self
			.listeners
			.lock()
			.iter()
			.map(|(_, l)| Arc::clone(l))
			.collect();
		for listener in listeners {
			listener(event);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use parking_lot::Mutex;

	use super::*;

	#[test]
	fn delivers_in_subscription_order() {
		let dispatcher = Dispatcher::<u32>::new();
		let seen = Arc::new(Mutex::new(Vec::new()));
		for tag in ["a", "b"] {
			let seen = Arc::clone(&seen);
			dispatcher.subscribe(move |n| seen.lock().push(format!("{tag}{n}")));
		}
		dispatcher.dispatch(&1);
		dispatcher.dispatch(&2);
		assert_eq!(*seen.lock(), ["a1", "b1", "a2", "b2"]);
	}

	#[test]
	fn unsubscribed_listener_is_skipped() {
		let dispatcher = Dispatcher::<u32>::new();
		let hits = Arc::new(Mutex::new(0));
		let id = {
			let hits = Arc::clone(&hits);
			dispatcher.subscribe(move |_| *hits.lock() += 1)
		};
		dispatcher.dispatch(&0);
		assert!(dispatcher.unsubscribe(id));
		assert!(!dispatcher.unsubscribe(id));
		dispatcher.dispatch(&0);
		assert_eq!(*hits.lock(), 1);
		assert!(dispatcher.is_empty());
	}

	#[test]
	fn listener_may_reenter_dispatcher() {
		let dispatcher = Arc::new(Dispatcher::<u32>::new());
		let inner = Arc::clone(&dispatcher);
		dispatcher.subscribe(move |n| {
			if *n == 0 {
				inner.subscribe(|_| {});
			}
		});
		dispatcher.dispatch(&0);
		assert_eq!(dispatcher.len(), 2);
	}
}
