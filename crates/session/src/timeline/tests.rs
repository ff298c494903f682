use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn record(timeline: &Timeline) -> Arc<Mutex<Vec<TimelineEvent>>> {
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&events);
	timeline
		.events()
		.subscribe(move |ev| sink.lock().push(*ev));
	events
}

#[test]
fn setters_return_old_value_and_dispatch_changes() {
	let timeline = Timeline::new(44100.0);
	let events = record(&timeline);
	let src = SourceId::next();

	assert_eq!(timeline.set_length(Some(src), 1000), 0);
	assert_eq!(timeline.set_length(Some(src), 1000), 1000);
	assert_eq!(timeline.set_selection(Some(src), Span::new(0, 500)), Span::default());
	timeline.set_position(None, 250);

	assert_eq!(
		*events.lock(),
		[
			TimelineEvent {
				source: src,
				change: TimelineChange::Length(1000),
			},
			TimelineEvent {
				source: src,
				change: TimelineChange::Selection(Span::new(0, 500)),
			},
		]
	);
	assert_eq!(timeline.position(), 250);
}

#[test]
fn restore_is_silent() {
	let timeline = Timeline::new(48000.0);
	let events = record(&timeline);
	let mut state = timeline.state();
	state.length = 96000;
	state.visible = Span::new(0, 48000);
	timeline.restore(state);

	assert!(events.lock().is_empty());
	assert_eq!(timeline.state(), state);
}

#[rstest]
#[case(Span::new(10, 20), 15, Span::new(10, 15))]
#[case(Span::new(-5, 3), 100, Span::new(0, 3))]
#[case(Span::new(40, 10), 30, Span::new(10, 30))]
#[case(Span::new(5, 9), -1, Span::new(0, 0))]
fn span_clamps_to_length(#[case] span: Span, #[case] length: i64, #[case] clamped: Span) {
	assert_eq!(span.clamp(length), clamped);
}

#[test]
fn span_membership() {
	let span = Span::new(0, 500);
	assert!(span.contains(0));
	assert!(!span.contains(500));
	assert_eq!(span.len(), 500);
	assert!(Span::new(3, 3).is_empty());
}
