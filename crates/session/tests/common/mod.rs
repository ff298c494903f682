use std::sync::Arc;

use parking_lot::Mutex;

/// Installs a global fmt subscriber once; later calls are no-ops.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Collects every value passed to the returned sink.
pub fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&events);
	(events, move |ev| sink.lock().push(ev))
}
