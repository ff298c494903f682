//! Undoable edits over shared session state.
//!
//! An [`Edit`] is a reversible change captured at construction time. Edits
//! are performed once, handed to an [`UndoManager`] and from then on only
//! undone and redone. Several edits form one undo step through a
//! [`CompoundEdit`]; a [`SyncCompoundEdit`] additionally replays its
//! children while holding a set of doors exclusively and reports the replay
//! to [`SyncHooks`].
//!
//! # Lifecycle
//!
//! ```text
//!             undo              redo
//!   Done ───────────▶ Undone ─────────▶ Done
//!     │                  │
//!     └──── die ─────────┴──────▶ Dead
//! ```
//!
//! [`Tracked`] enforces these transitions. Undoing an edit that is not done,
//! redoing one that is not undone, or touching a dead edit fails with
//! [`EditError::CannotUndo`] or [`EditError::CannotRedo`].

mod compound;
mod edit;
mod error;
mod history;
mod sync;
#[cfg(test)]
mod testing;

pub use compound::{CompoundEdit, CompoundState};
pub use edit::{Attribution, Edit, EditState, Tracked};
pub use error::{EditError, Result};
pub use history::UndoManager;
pub use sync::{SyncCompoundEdit, SyncHooks};
