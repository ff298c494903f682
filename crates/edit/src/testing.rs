//! Edit fixtures shared by the unit tests.

use std::io;

use parking_lot::Mutex;

use crate::edit::Edit;
use crate::error::{EditError, Result};

/// A counter that records every operation applied to it.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
	value: Mutex<i64>,
	log: Mutex<Vec<String>>,
	failures: Mutex<Vec<String>>,
}

impl Ledger {
	pub(crate) fn value(&self) -> i64 {
		*self.value.lock()
	}

	pub(crate) fn log(&self) -> Vec<String> {
		self.log.lock().clone()
	}

	pub(crate) fn clear_log(&self) {
		self.log.lock().clear();
	}

	/// Makes the operation logged as `op` fail with an I/O error.
	pub(crate) fn fail_on(&self, op: &str) {
		self.failures.lock().push(op.to_string());
	}

	pub(crate) fn clear_failures(&self) {
		self.failures.lock().clear();
	}

	fn apply(&self, op: String, delta: i64) -> Result<()> {
		if self.failures.lock().contains(&op) {
			return Err(EditError::Io(io::Error::other(format!("{op} failed"))));
		}
		*self.value.lock() += delta;
		self.log.lock().push(op);
		Ok(())
	}
}

/// Adds `delta` to a [`Ledger`].
#[derive(Debug, Clone)]
pub(crate) struct Step {
	pub(crate) label: String,
	pub(crate) delta: i64,
	significant: bool,
	mergeable: bool,
	replacing: bool,
	died: bool,
}

impl Step {
	pub(crate) fn new(label: &str, delta: i64) -> Self {
		Self {
			label: label.to_string(),
			delta,
			significant: true,
			mergeable: false,
			replacing: false,
			died: false,
		}
	}

	pub(crate) fn insignificant(mut self) -> Self {
		self.significant = false;
		self
	}

	/// Merges with a newer mergeable step of the same label.
	pub(crate) fn mergeable(mut self) -> Self {
		self.mergeable = true;
		self
	}

	/// Replaces any older step.
	pub(crate) fn replacing(mut self) -> Self {
		self.replacing = true;
		self
	}

	pub(crate) fn died(&self) -> bool {
		self.died
	}
}

impl Edit for Step {
	type Target = Ledger;

	fn perform(&mut self, ledger: &Ledger) -> Result<()> {
		ledger.apply(format!("do {}", self.label), self.delta)
	}

	fn undo(&mut self, ledger: &Ledger) -> Result<()> {
		ledger.apply(format!("undo {}", self.label), -self.delta)
	}

	fn redo(&mut self, ledger: &Ledger) -> Result<()> {
		ledger.apply(format!("redo {}", self.label), self.delta)
	}

	fn presentation_name(&self) -> String {
		self.label.clone()
	}

	fn is_significant(&self) -> bool {
		self.significant
	}

	fn add_edit(&mut self, newer: &mut Self) -> bool {
		if self.mergeable && newer.mergeable && self.label == newer.label {
			self.delta += newer.delta;
			true
		} else {
			false
		}
	}

	fn replace_edit(&mut self, older: &mut Self) -> bool {
		if self.replacing {
			self.delta += older.delta;
			true
		} else {
			false
		}
	}

	fn die(&mut self) {
		self.died = true;
	}
}
