mod common;

use std::sync::Arc;

use meloncillo_edit::{CompoundEdit, Edit};
use meloncillo_props::{Context, ContextFlags, MapEvent, OwnerModKind, PropType, PropValue, SourceId, ValueChange};
use meloncillo_session::{
	MapTarget, Point, Session, SessionEdit, SessionObject, SetMapValue, SetReceiverAnchor, SetTimelineLength,
	SetTimelineSelection, Span, TimelineChange,
};
use pretty_assertions::assert_eq;

fn performed(session: &Session, edit: impl Into<SessionEdit>) -> SessionEdit {
	edit.into().performed(session).unwrap()
}

#[test]
fn compound_undoes_in_reverse_order() {
	common::init_tracing();
	let session = Session::default();
	session.timeline().set_length(None, 1000);
	session.timeline().set_selection(None, Span::new(0, 500));
	let (events, sink) = common::recorder();
	session.timeline().events().subscribe(move |ev| sink(ev.change));

	let actor = SourceId::next();
	let mut compound = CompoundEdit::new("Extend");
	compound
		.add_edit(performed(&session, SetTimelineLength::new(&session, Some(actor), 2000)))
		.unwrap();
	compound
		.add_edit(performed(
			&session,
			SetTimelineSelection::new(&session, Some(actor), Span::new(0, 600)),
		))
		.unwrap();
	compound.end();

	let mut history = session.new_history();
	history.add_edit(SessionEdit::from(compound));
	assert_eq!(history.undo_presentation_name().as_deref(), Some("Extend"));
	history.undo(&session).unwrap();

	assert_eq!(session.timeline().length(), 1000);
	assert_eq!(session.timeline().selection(), Span::new(0, 500));
	assert_eq!(
		*events.lock(),
		[
			TimelineChange::Length(2000),
			TimelineChange::Selection(Span::new(0, 600)),
			TimelineChange::Selection(Span::new(0, 500)),
			TimelineChange::Length(1000),
		]
	);

	history.redo(&session).unwrap();
	assert_eq!(session.timeline().length(), 2000);
	assert_eq!(session.timeline().selection(), Span::new(0, 600));
}

#[test]
fn visual_key_change_repaints_owner() {
	common::init_tracing();
	let session = Session::default();
	let r1 = Arc::new(SessionObject::receiver("R1"));
	session.receivers().add_all(None, &[Arc::clone(&r1)]);
	r1.map().put_context(
		None,
		"gain",
		Context::new(PropType::Float)
			.with_flags(ContextFlags::VISUAL)
			.with_default(0.5f32),
	);
	let (events, sink) = common::recorder();
	r1.map().events().subscribe(move |ev: &MapEvent| sink(ev.clone()));

	let actor = SourceId::next();
	let mut edit = performed(
		&session,
		SetMapValue::new(&session, MapTarget::Object(Arc::clone(&r1)), Some(actor), "gain", 0.8f32),
	);
	edit.undo(&session).unwrap();

	let events = events.lock();
	assert_eq!(events.len(), 4);
	assert_eq!(
		events[..2].to_vec(),
		[
			MapEvent::ValuesChanged {
				source: actor,
				changes: vec![ValueChange {
					key: "gain".into(),
					old: Some(PropValue::Float(0.5)),
					new: Some(PropValue::Float(0.8)),
				}],
			},
			MapEvent::OwnerModified {
				source: actor,
				kind: OwnerModKind::Visual,
				param: None,
			},
		]
	);
	assert_ne!(events[2].source(), actor);
	assert!(matches!(
		events[3],
		MapEvent::OwnerModified {
			kind: OwnerModKind::Visual,
			..
		}
	));
	assert_eq!(r1.map().get_value("gain"), Some(PropValue::Float(0.5)));
}

#[test]
fn dragging_a_receiver_is_one_undo_step() {
	common::init_tracing();
	let session = Session::default();
	let r1 = Arc::new(SessionObject::receiver("R1"));
	session.receivers().add_all(None, &[Arc::clone(&r1)]);
	let mut history = session.new_history();

	for step in 1..=10 {
		let x = 0.5 + f64::from(step) * 0.01;
		let edit = SetReceiverAnchor::dragging(Arc::clone(&r1), None, Point::new(x, 0.5)).unwrap();
		history.add_edit(performed(&session, edit));
	}
	let release = SetReceiverAnchor::new(Arc::clone(&r1), None, Point::new(0.7, 0.5)).unwrap();
	history.add_edit(performed(&session, release));

	assert_eq!(history.len(), 1);
	assert_eq!(history.undo_presentation_name().as_deref(), Some("Move Receiver"));
	history.undo(&session).unwrap();
	assert_eq!(r1.anchor(), Some(Point::new(0.5, 0.5)));
	assert!(!history.can_undo());
	history.redo(&session).unwrap();
	assert_eq!(r1.anchor(), Some(Point::new(0.7, 0.5)));
}
