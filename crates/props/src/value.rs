//! Property values and their type tags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PropError, Result};

/// The value of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
	/// 32-bit integer.
	Int(i32),
	/// 64-bit integer.
	Long(i64),
	/// Single precision float.
	Float(f32),
	/// Double precision float.
	Double(f64),
	/// Boolean flag.
	Bool(bool),
	/// Free text.
	String(String),
	/// File system path.
	File(PathBuf),
}

/// The type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropType {
	/// 32-bit integer.
	Int,
	/// 64-bit integer.
	Long,
	/// Single precision float.
	Float,
	/// Double precision float.
	Double,
	/// Boolean flag.
	Bool,
	/// Free text.
	String,
	/// File system path.
	File,
}

impl PropType {
	/// Every type, in tag order.
	pub const ALL: [PropType; 7] = [
		PropType::Int,
		PropType::Long,
		PropType::Float,
		PropType::Double,
		PropType::Bool,
		PropType::String,
		PropType::File,
	];

	/// Returns the tag used for this type in stored maps.
	pub const fn tag(self) -> &'static str {
		match self {
			PropType::Int => "int",
			PropType::Long => "long",
			PropType::Float => "float",
			PropType::Double => "double",
			PropType::Bool => "boolean",
			PropType::String => "string",
			PropType::File => "file",
		}
	}

	/// Resolves a stored type tag.
	pub fn from_tag(tag: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|ty| ty.tag() == tag)
			.ok_or_else(|| PropError::UnknownType(tag.to_string()))
	}

	/// Returns `true` for the four numeric types.
	pub const fn is_numeric(self) -> bool {
		matches!(
			self,
			PropType::Int | PropType::Long | PropType::Float | PropType::Double
		)
	}

	/// Returns `true` if values of type `other` may be stored under this type.
	///
	/// Numeric types are mutually coercible.
	pub fn accepts(self, other: PropType) -> bool {
		self == other || (self.is_numeric() && other.is_numeric())
	}

	/// Parses the stored text form of a value of this type.
	pub fn parse(self, text: &str) -> Result<PropValue> {
		let err = || PropError::Parse {
			ty: self,
			text: text.to_string(),
		};
		let trimmed = text.trim();
		Ok(match self {
			PropType::Int => PropValue::Int(trimmed.parse().map_err(|_| err())?),
			PropType::Long => PropValue::Long(trimmed.parse().map_err(|_| err())?),
			PropType::Float => PropValue::Float(trimmed.parse().map_err(|_| err())?),
			PropType::Double => PropValue::Double(trimmed.parse().map_err(|_| err())?),
			PropType::Bool => PropValue::Bool(trimmed.parse().map_err(|_| err())?),
			PropType::String => PropValue::String(text.to_string()),
			PropType::File => PropValue::File(PathBuf::from(text)),
		})
	}
}

impl std::fmt::Display for PropType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.tag())
	}
}

impl PropValue {
	/// Returns the type of this value.
	pub const fn ty(&self) -> PropType {
		match self {
			PropValue::Int(_) => PropType::Int,
			PropValue::Long(_) => PropType::Long,
			PropValue::Float(_) => PropType::Float,
			PropValue::Double(_) => PropType::Double,
			PropValue::Bool(_) => PropType::Bool,
			PropValue::String(_) => PropType::String,
			PropValue::File(_) => PropType::File,
		}
	}

	/// Returns the numeric value widened to `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match *self {
			PropValue::Int(v) => Some(f64::from(v)),
			PropValue::Long(v) => Some(v as f64),
			PropValue::Float(v) => Some(f64::from(v)),
			PropValue::Double(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the numeric value truncated to `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			PropValue::Int(v) => Some(i64::from(v)),
			PropValue::Long(v) => Some(v),
			PropValue::Float(v) => Some(v as i64),
			PropValue::Double(v) => Some(v as i64),
			_ => None,
		}
	}

	/// Returns the boolean value if this is a `Bool`.
	pub fn as_bool(&self) -> Option<bool> {
		match *self {
			PropValue::Bool(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the text if this is a `String`.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			PropValue::String(v) => Some(v),
			_ => None,
		}
	}

	/// Converts this value to type `ty`.
	///
	/// Succeeds for identical types and between numeric types; returns
	/// `None` otherwise.
	pub fn coerce(&self, ty: PropType) -> Option<PropValue> {
		if self.ty() == ty {
			return Some(self.clone());
		}
		if !ty.accepts(self.ty()) {
			return None;
		}
		Some(match ty {
			PropType::Int => PropValue::Int(self.as_i64()? as i32),
			PropType::Long => PropValue::Long(self.as_i64()?),
			PropType::Float => PropValue::Float(self.as_f64()? as f32),
			PropType::Double => PropValue::Double(self.as_f64()?),
			_ => return None,
		})
	}

	/// Returns the stored text form, the inverse of [`PropType::parse`].
	pub fn format(&self) -> String {
		match self {
			PropValue::Int(v) => v.to_string(),
			PropValue::Long(v) => v.to_string(),
			PropValue::Float(v) => v.to_string(),
			PropValue::Double(v) => v.to_string(),
			PropValue::Bool(v) => v.to_string(),
			PropValue::String(v) => v.clone(),
			PropValue::File(v) => v.to_string_lossy().into_owned(),
		}
	}
}

impl From<i32> for PropValue {
	fn from(v: i32) -> Self {
		PropValue::Int(v)
	}
}

impl From<i64> for PropValue {
	fn from(v: i64) -> Self {
		PropValue::Long(v)
	}
}

impl From<f32> for PropValue {
	fn from(v: f32) -> Self {
		PropValue::Float(v)
	}
}

impl From<f64> for PropValue {
	fn from(v: f64) -> Self {
		PropValue::Double(v)
	}
}

impl From<bool> for PropValue {
	fn from(v: bool) -> Self {
		PropValue::Bool(v)
	}
}

impl From<String> for PropValue {
	fn from(v: String) -> Self {
		PropValue::String(v)
	}
}

impl From<&str> for PropValue {
	fn from(v: &str) -> Self {
		PropValue::String(v.to_string())
	}
}

impl From<PathBuf> for PropValue {
	fn from(v: PathBuf) -> Self {
		PropValue::File(v)
	}
}
