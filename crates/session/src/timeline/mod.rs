//! The session timeline.

#[cfg(test)]
mod tests;

use meloncillo_props::{Dispatcher, SourceId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A half-open range of sample frames, `start..stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
	pub start: i64,
	pub stop: i64,
}

impl Span {
	/// Creates a span, swapping the bounds if `stop < start`.
	pub fn new(start: i64, stop: i64) -> Self {
		if stop < start {
			Self { start: stop, stop: start }
		} else {
			Self { start, stop }
		}
	}

	/// Number of frames covered.
	pub fn len(&self) -> i64 {
		self.stop - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.stop <= self.start
	}

	pub fn contains(&self, frame: i64) -> bool {
		frame >= self.start && frame < self.stop
	}

	/// Restricts the span to `0..length`.
	pub fn clamp(&self, length: i64) -> Self {
		let length = length.max(0);
		Self::new(self.start.clamp(0, length), self.stop.clamp(0, length))
	}
}

/// A copy of every timeline field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
	/// Sample rate in frames per second.
	pub rate: f64,
	/// Length in frames.
	pub length: i64,
	/// Playhead in frames.
	pub position: i64,
	pub selection: Span,
	/// Portion shown in timeline views.
	pub visible: Span,
}

/// The field of a timeline that changed, with its new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineChange {
	Rate(f64),
	Length(i64),
	Position(i64),
	Selection(Span),
	Visible(Span),
}

/// Event published by a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEvent {
	pub source: SourceId,
	pub change: TimelineChange,
}

/// Rate, length, playhead, selection and visible span of a session.
///
/// Setters do not acquire doors; callers hold [`DoorSet::TIME`] exclusively.
/// Each setter returns the previous value and dispatches a
/// [`TimelineEvent`] only for a `Some` source and a changed value. Setters
/// store what they are given; keeping position and spans within the length
/// is up to the caller.
///
/// [`DoorSet::TIME`]: meloncillo_doors::DoorSet::TIME
#[derive(Debug)]
pub struct Timeline {
	state: RwLock<TimelineState>,
	events: Dispatcher<TimelineEvent>,
}

impl Timeline {
	/// Creates an empty timeline at `rate` frames per second.
	pub fn new(rate: f64) -> Self {
		Self {
			state: RwLock::new(TimelineState {
				rate,
				length: 0,
				position: 0,
				selection: Span::default(),
				visible: Span::default(),
			}),
			events: Dispatcher::new(),
		}
	}

	pub fn events(&self) -> &Dispatcher<TimelineEvent> {
		&self.events
	}

	pub fn state(&self) -> TimelineState {
		*self.state.read()
	}

	pub fn rate(&self) -> f64 {
		self.state.read().rate
	}

	pub fn length(&self) -> i64 {
		self.state.read().length
	}

	pub fn position(&self) -> i64 {
		self.state.read().position
	}

	pub fn selection(&self) -> Span {
		self.state.read().selection
	}

	pub fn visible_span(&self) -> Span {
		self.state.read().visible
	}

	pub fn set_rate(&self, source: Option<SourceId>, rate: f64) -> f64 {
		self.update(source, rate, |s| &mut s.rate, TimelineChange::Rate)
	}

	pub fn set_length(&self, source: Option<SourceId>, length: i64) -> i64 {
		self.update(source, length, |s| &mut s.length, TimelineChange::Length)
	}

	pub fn set_position(&self, source: Option<SourceId>, position: i64) -> i64 {
		self.update(source, position, |s| &mut s.position, TimelineChange::Position)
	}

	pub fn set_selection(&self, source: Option<SourceId>, span: Span) -> Span {
		self.update(source, span, |s| &mut s.selection, TimelineChange::Selection)
	}

	pub fn set_visible_span(&self, source: Option<SourceId>, span: Span) -> Span {
		self.update(source, span, |s| &mut s.visible, TimelineChange::Visible)
	}

	/// Replaces every field silently.
	pub fn restore(&self, state: TimelineState) {
		*self.state.write() = state;
	}

	fn update<T: Copy + PartialEq>(
		&self,
		source: Option<SourceId>,
		value: T,
		field: impl FnOnce(&mut TimelineState) -> &mut T,
		change: fn(T) -> TimelineChange,
	) -> T {
		let old = std::mem::replace(field(&mut self.state.write()), value);
		if let Some(source) = source
			&& old != value
		{
			self.events.dispatch(&TimelineEvent {
				source,
				change: change(value),
			});
		}
		old
	}
}
