//! Timeline edits.

use meloncillo_doors::DoorSet;
use meloncillo_edit::{Attribution, Result};
use meloncillo_props::SourceId;

use crate::session::Session;
use crate::timeline::{Span, Timeline};

fn apply<T>(
	session: &Session,
	attribution: &mut Attribution,
	value: T,
	set: impl FnOnce(&Timeline, Option<SourceId>, T),
) -> Result<()> {
	let _guard = session.lock_exclusive(DoorSet::TIME)?;
	set(session.timeline(), attribution.next(), value);
	Ok(())
}

/// Changes the timeline length.
#[derive(Debug, Clone)]
pub struct SetTimelineLength {
	old: i64,
	new: i64,
	attribution: Attribution,
}

impl SetTimelineLength {
	pub fn new(session: &Session, source: Option<SourceId>, length: i64) -> Self {
		Self {
			old: session.timeline().length(),
			new: length,
			attribution: Attribution::new(source),
		}
	}

	/// Old and new length.
	pub fn values(&self) -> (i64, i64) {
		(self.old, self.new)
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		apply(session, &mut self.attribution, self.new, |t, src, v| {
			t.set_length(src, v);
		})
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		apply(session, &mut self.attribution, self.old, |t, src, v| {
			t.set_length(src, v);
		})
	}
}

/// Moves the playhead.
///
/// Never significant: playhead moves are undone together with the edit
/// before them. Consecutive moves merge into one.
#[derive(Debug, Clone)]
pub struct SetTimelinePosition {
	old: i64,
	new: i64,
	attribution: Attribution,
}

impl SetTimelinePosition {
	pub fn new(session: &Session, source: Option<SourceId>, position: i64) -> Self {
		Self {
			old: session.timeline().position(),
			new: position,
			attribution: Attribution::new(source),
		}
	}

	pub fn values(&self) -> (i64, i64) {
		(self.old, self.new)
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		apply(session, &mut self.attribution, self.new, |t, src, v| {
			t.set_position(src, v);
		})
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		apply(session, &mut self.attribution, self.old, |t, src, v| {
			t.set_position(src, v);
		})
	}

	pub(crate) fn absorb(&mut self, newer: &SetTimelinePosition) -> bool {
		self.new = newer.new;
		true
	}
}

/// Changes the timeline selection.
///
/// Selections made while dragging are insignificant. An insignificant
/// selection edit absorbs the next selection edit, taking over its new span
/// and its significance, so a whole drag ends up as a single step.
#[derive(Debug, Clone)]
pub struct SetTimelineSelection {
	old: Span,
	new: Span,
	significant: bool,
	attribution: Attribution,
}

impl SetTimelineSelection {
	pub fn new(session: &Session, source: Option<SourceId>, span: Span) -> Self {
		Self {
			old: session.timeline().selection(),
			new: span,
			significant: true,
			attribution: Attribution::new(source),
		}
	}

	/// Creates an insignificant selection edit for an ongoing drag.
	pub fn dragging(session: &Session, source: Option<SourceId>, span: Span) -> Self {
		Self {
			significant: false,
			..Self::new(session, source, span)
		}
	}

	pub fn values(&self) -> (Span, Span) {
		(self.old, self.new)
	}

	pub fn is_significant(&self) -> bool {
		self.significant
	}

	pub(crate) fn perform(&mut self, session: &Session) -> Result<()> {
		apply(session, &mut self.attribution, self.new, |t, src, v| {
			t.set_selection(src, v);
		})
	}

	pub(crate) fn undo(&mut self, session: &Session) -> Result<()> {
		apply(session, &mut self.attribution, self.old, |t, src, v| {
			t.set_selection(src, v);
		})
	}

	pub(crate) fn absorb(&mut self, newer: &SetTimelineSelection) -> bool {
		if self.significant {
			return false;
		}
		self.new = newer.new;
		self.significant = newer.significant;
		true
	}
}
