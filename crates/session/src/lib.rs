//! The session document of a spatial sound editor and its undoable edits.
//!
//! A [`Session`] holds the [`Timeline`], three [`SessionCollection`]s of
//! receivers, transmitters and groups, and a session-wide property map. All
//! of it is guarded by the doors of a shared
//! [`LockManager`](meloncillo_doors::LockManager): writers hold the doors of
//! what they change exclusively, painting code reads through
//! [`Session::try_read`].
//!
//! Changes are made through [`SessionEdit`]s collected in a
//! [`SessionHistory`]:
//!
//! ```text
//! actor ──new──▶ SessionEdit ──performed──▶ SessionHistory
//!                    │                        │ undo / redo
//!                    ▼                        ▼
//!               doors (exclusive) ──▶ Timeline / objects / maps ──▶ events
//! ```
//!
//! Sessions are saved and loaded with [`persist`].

mod collection;
mod config;
mod edits;
mod error;
mod object;
pub mod persist;
mod session;
mod spill;
mod timeline;

pub use collection::{CollectionChange, CollectionEvent, RemovedEntry, SessionCollection};
pub use config::SessionConfig;
pub use edits::{
	AddObjects, MapTarget, ObjectModHooks, RemoveObjects, RenameObject, SessionEdit, SessionHistory, SetMapValue,
	SetReceiverAnchor, SetReceiverSize, SetSensitivityTable, SetTimelineLength, SetTimelinePosition,
	SetTimelineSelection, session_object_edit,
};
pub use error::{ConfigError, Result, SessionError};
pub use object::{
	GROUP_MEMBERS, ObjectId, ObjectKind, Point, ReceiverState, SessionObject, Size, TableKind,
};
pub use session::Session;
pub use spill::{SpillFile, SpillStore};
pub use timeline::{Span, Timeline, TimelineChange, TimelineEvent, TimelineState};
