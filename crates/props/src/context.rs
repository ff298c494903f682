//! Per-key schema of a property map.

use serde::{Deserialize, Serialize};

use crate::value::{PropType, PropValue};

bitflags::bitflags! {
	/// Flags describing how a key is used.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
	pub struct ContextFlags: u32 {
		/// The value belongs to the saved document rather than transient state.
		const PERSIST = 1 << 0;
		/// Changing the value changes how the owner is painted.
		const VISUAL = 1 << 1;
		/// The key was registered at runtime (e.g. by a render plug-in).
		const DYNAMIC = 1 << 2;
		/// The value is never written to session files.
		const NO_STORAGE = 1 << 3;
		/// The value is shown in object lists.
		const LIST_DISPLAY = 1 << 4;
		/// The value is shown in the observer palette.
		const OBSERVER_DISPLAY = 1 << 5;
	}
}

/// Restriction on the admissible values of a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
	/// Numeric values within `min..=max`.
	Range {
		/// Smallest admissible value.
		min: f64,
		/// Largest admissible value.
		max: f64,
	},
	/// String values from a fixed list.
	Choice(Vec<String>),
}

impl Constraint {
	/// Returns `true` if `value` satisfies this constraint.
	pub fn admits(&self, value: &PropValue) -> bool {
		match self {
			Constraint::Range { min, max } => value
				.as_f64()
				.is_some_and(|v| v >= *min && v <= *max),
			Constraint::Choice(choices) => value
				.as_str()
				.is_some_and(|s| choices.iter().any(|c| c == s)),
		}
	}
}

/// Schema of one key: declared type, flags, default, constraint and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
	/// Declared value type.
	pub ty: PropType,
	/// Usage flags.
	pub flags: ContextFlags,
	/// Value seeded when the context is registered on an absent key.
	pub default: Option<PropValue>,
	/// Optional restriction on admissible values.
	pub constraint: Option<Constraint>,
	/// Human readable label.
	pub label: Option<String>,
}

impl Context {
	/// Creates a context of type `ty` with no flags, default or constraint.
	pub fn new(ty: PropType) -> Self {
		Self {
			ty,
			flags: ContextFlags::empty(),
			default: None,
			constraint: None,
			label: None,
		}
	}

	/// Sets the flags.
	pub fn with_flags(mut self, flags: ContextFlags) -> Self {
		self.flags = flags;
		self
	}

	/// Sets the default value.
	pub fn with_default(mut self, default: impl Into<PropValue>) -> Self {
		self.default = Some(default.into());
		self
	}

	/// Sets the constraint.
	pub fn with_constraint(mut self, constraint: Constraint) -> Self {
		self.constraint = Some(constraint);
		self
	}

	/// Sets the label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Returns the default converted to the declared type.
	pub fn typed_default(&self) -> Option<PropValue> {
		self.default.as_ref().and_then(|d| d.coerce(self.ty))
	}

	/// Returns `true` if values of this key are written to session files.
	pub fn is_stored(&self) -> bool {
		!self.flags.contains(ContextFlags::NO_STORAGE)
	}
}
