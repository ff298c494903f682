//! Error types for property values.

use thiserror::Error;

use crate::value::PropType;

/// Errors raised when converting property values from their stored form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropError {
	/// A type tag outside the closed set of property types.
	#[error("unknown property type tag: {0}")]
	UnknownType(String),

	/// A stored value could not be parsed as its declared type.
	#[error("cannot parse '{text}' as {ty}")]
	Parse {
		/// The declared type.
		ty: PropType,
		/// The stored text.
		text: String,
	},
}

/// Result type for property value conversions.
pub type Result<T> = std::result::Result<T, PropError>;
