//! Minimal document element tree used for session persistence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named node with string attributes and ordered children.
///
/// Mirrors the shape of an XML element. Property maps and the session write
/// themselves into element trees; turning the tree into bytes is up to the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
	/// Node name.
	pub name: String,
	/// Attributes, in name order.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, String>,
	/// Child nodes, in document order.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<Element>,
}

impl Element {
	/// Creates an element without attributes or children.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Adds an attribute, builder style.
	pub fn with_attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.set_attr(name, value);
		self
	}

	/// Sets an attribute, replacing any previous value.
	pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
		self.attributes.insert(name.into(), value.to_string());
	}

	/// Returns an attribute value.
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Appends a child and returns a mutable reference to it.
	pub fn push(&mut self, child: Element) -> &mut Element {
		self.children.push(child);
		let last = self.children.len() - 1;
		&mut self.children[last]
	}

	/// Returns the first child named `name`.
	pub fn child(&self, name: &str) -> Option<&Element> {
		self.children.iter().find(|c| c.name == name)
	}

	/// Iterates over the children named `name`.
	pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
		self.children.iter().filter(move |c| c.name == name)
	}
}
