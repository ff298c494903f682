use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique source IDs.
static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of whoever caused a change.
///
/// UI actors and edit objects each allocate one. Listeners compare it against
/// their own ID to recognise echoes of their own changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
	/// Generates a new unique source ID.
	pub fn next() -> Self {
		Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
	}

	/// Returns the raw numeric value.
	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

impl std::fmt::Display for SourceId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "src#{}", self.0)
	}
}
