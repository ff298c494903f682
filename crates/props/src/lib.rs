//! Observable, typed key/value maps for session objects.
//!
//! Every receiver, transmitter and group owns a [`PropertyMap`]. Keys may be
//! described by a [`Context`] declaring their type, flags, default and
//! constraint. Mutations report the originating [`SourceId`] and are
//! published as [`MapEvent`]s through the map's [`Dispatcher`].
//!
//! Passing `None` as the source performs a silent update that dispatches
//! nothing.

mod context;
mod element;
mod error;
mod event;
mod map;
mod source;
mod value;

pub use context::{Constraint, Context, ContextFlags};
pub use element::Element;
pub use error::{PropError, Result};
pub use event::{Dispatcher, MapEvent, OwnerModKind, SubscriptionId, ValueChange};
pub use map::PropertyMap;
pub use source::SourceId;
pub use value::{PropType, PropValue};
