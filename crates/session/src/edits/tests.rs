use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use meloncillo_doors::DoorSet;
use meloncillo_edit::{Edit, EditError};
use meloncillo_props::{MapEvent, OwnerModKind, PropValue, PropertyMap, SourceId};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::config::SessionConfig;
use crate::object::{ObjectKind, Point, SessionObject, Size, TableKind};
use crate::timeline::{Span, TimelineChange, TimelineEvent};

fn record_map(map: &PropertyMap) -> Arc<Mutex<Vec<MapEvent>>> {
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&events);
	map.events().subscribe(move |ev| sink.lock().push(ev.clone()));
	events
}

fn record_timeline(session: &Session) -> Arc<Mutex<Vec<TimelineEvent>>> {
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&events);
	session
		.timeline()
		.events()
		.subscribe(move |ev| sink.lock().push(*ev));
	events
}

fn receiver(session: &Session, name: &str) -> Arc<SessionObject> {
	let object = Arc::new(SessionObject::receiver(name));
	session.receivers().add_all(None, &[Arc::clone(&object)]);
	object
}

fn perform(session: &Session, edit: impl Into<SessionEdit>) -> SessionEdit {
	edit.into().performed(session).unwrap()
}

#[test]
fn timeline_edits_undo_and_redo() {
	let session = Session::default();
	let mut length = perform(&session, SetTimelineLength::new(&session, None, 1000));
	let mut selection = perform(
		&session,
		SetTimelineSelection::new(&session, None, Span::new(0, 500)),
	);
	assert_eq!(session.timeline().length(), 1000);
	assert_eq!(session.timeline().selection(), Span::new(0, 500));

	selection.undo(&session).unwrap();
	length.undo(&session).unwrap();
	assert_eq!(session.timeline().length(), 0);
	assert_eq!(session.timeline().selection(), Span::default());

	length.redo(&session).unwrap();
	selection.redo(&session).unwrap();
	assert_eq!(session.timeline().length(), 1000);
	assert_eq!(session.timeline().selection(), Span::new(0, 500));
}

#[test]
fn receiver_edits_undo_and_redo() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let original = r1.receiver_state().unwrap();

	let mut anchor = perform(
		&session,
		SetReceiverAnchor::new(Arc::clone(&r1), None, Point::new(0.1, 0.9)).unwrap(),
	);
	let mut size = perform(
		&session,
		SetReceiverSize::new(Arc::clone(&r1), None, Size::new(0.5, 0.5)).unwrap(),
	);
	let mut table = perform(
		&session,
		SetSensitivityTable::new(&session, Arc::clone(&r1), None, TableKind::Distance, vec![0.5, 0.25, 0.0])
			.unwrap(),
	);
	assert_eq!(r1.anchor(), Some(Point::new(0.1, 0.9)));
	assert_eq!(r1.size(), Some(Size::new(0.5, 0.5)));
	assert_eq!(r1.table(TableKind::Distance), Some(vec![0.5, 0.25, 0.0]));

	table.undo(&session).unwrap();
	size.undo(&session).unwrap();
	anchor.undo(&session).unwrap();
	assert_eq!(r1.receiver_state().unwrap(), original);
}

#[test]
fn receiver_edits_reject_other_kinds() {
	let session = Session::default();
	let t1 = Arc::new(SessionObject::transmitter("T1"));
	assert!(matches!(
		SetReceiverAnchor::new(Arc::clone(&t1), None, Point::new(0.0, 0.0)),
		Err(EditError::MissingTarget(_))
	));
	assert!(matches!(
		SetSensitivityTable::new(&session, t1, None, TableKind::Rotation, vec![1.0]),
		Err(EditError::MissingTarget(_))
	));
}

#[test]
fn map_value_undo_removes_created_key() {
	let session = Session::default();
	session.map().put_value(None, "gain", 1.0);

	let mut created = perform(
		&session,
		SetMapValue::new(&session, MapTarget::Session, None, "mute", true),
	);
	let mut changed = perform(
		&session,
		SetMapValue::new(&session, MapTarget::Session, None, "gain", 0.5),
	);
	assert_eq!(session.map().get_value("mute"), Some(PropValue::from(true)));

	changed.undo(&session).unwrap();
	created.undo(&session).unwrap();
	assert_eq!(session.map().get_value("gain"), Some(PropValue::from(1.0)));
	assert!(!session.map().contains_key("mute"));
}

#[test]
fn object_map_value_reports_to_object() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let events = record_map(r1.map());
	let actor = SourceId::next();

	perform(
		&session,
		SetMapValue::new(&session, MapTarget::Object(Arc::clone(&r1)), Some(actor), "solo", true),
	);
	let events = events.lock();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].source(), actor);
}

#[test]
fn rename_and_undo() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let mut rename = perform(&session, RenameObject::new(Arc::clone(&r1), None, "Left"));
	assert_eq!(r1.name(), "Left");
	assert_eq!(rename.presentation_name(), "Rename");
	rename.undo(&session).unwrap();
	assert_eq!(r1.name(), "R1");
}

#[test]
fn removed_objects_return_to_their_indices() {
	let session = Session::default();
	let objects: Vec<_> = (1..=4)
		.map(|i| Arc::new(SessionObject::transmitter(format!("T{i}"))))
		.collect();
	let mut add = perform(
		&session,
		AddObjects::new(ObjectKind::Transmitter, None, objects.clone()),
	);
	assert_eq!(add.presentation_name(), "Add Transmitters");
	assert_eq!(session.transmitters().len(), 4);

	let mut remove = perform(
		&session,
		RemoveObjects::new(
			ObjectKind::Transmitter,
			None,
			vec![objects[3].id(), objects[1].id()],
		),
	);
	let names = |s: &Session| -> Vec<String> { s.transmitters().objects().iter().map(|o| o.name()).collect() };
	assert_eq!(names(&session), ["T1", "T3"]);

	remove.undo(&session).unwrap();
	assert_eq!(names(&session), ["T1", "T2", "T3", "T4"]);

	remove.redo(&session).unwrap();
	remove.undo(&session).unwrap();
	add.undo(&session).unwrap();
	assert!(session.transmitters().is_empty());
}

#[test]
fn undoing_an_add_keeps_objects_already_present() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let r2 = Arc::new(SessionObject::receiver("R2"));

	let mut add = perform(
		&session,
		AddObjects::new(ObjectKind::Receiver, None, vec![Arc::clone(&r1), Arc::clone(&r2)]),
	);
	assert_eq!(session.receivers().len(), 2);

	add.undo(&session).unwrap();
	assert_eq!(session.receivers().len(), 1);
	assert!(session.receivers().contains(r1.id()));
	assert!(!session.receivers().contains(r2.id()));

	add.redo(&session).unwrap();
	add.undo(&session).unwrap();
	assert_eq!(
		session.receivers().objects().iter().map(|o| o.id()).collect::<Vec<_>>(),
		[r1.id()]
	);
}

#[test]
fn first_application_goes_to_actor() {
	let session = Session::default();
	let events = record_timeline(&session);
	let actor = SourceId::next();

	let mut edit = perform(&session, SetTimelineLength::new(&session, Some(actor), 48000));
	edit.undo(&session).unwrap();
	edit.redo(&session).unwrap();

	let events = events.lock();
	assert_eq!(events.len(), 3);
	assert_eq!(events[0].source, actor);
	assert_ne!(events[1].source, actor);
	assert_eq!(events[1].source, events[2].source);
	assert_eq!(events[1].change, TimelineChange::Length(0));
}

#[test]
fn selection_drag_collapses_to_one_step() {
	let session = Session::default();
	let mut history = session.new_history();
	for stop in [100, 200, 300] {
		history.add_edit(perform(
			&session,
			SetTimelineSelection::dragging(&session, None, Span::new(0, stop)),
		));
	}
	history.add_edit(perform(
		&session,
		SetTimelineSelection::new(&session, None, Span::new(0, 400)),
	));
	assert_eq!(history.len(), 1);
	assert!(history.edits().all(|e| e.is_significant()));

	history.undo(&session).unwrap();
	assert_eq!(session.timeline().selection(), Span::default());
	history.redo(&session).unwrap();
	assert_eq!(session.timeline().selection(), Span::new(0, 400));
}

#[test]
fn anchor_drag_merges_per_receiver() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let r2 = receiver(&session, "R2");
	let start = r1.anchor().unwrap();
	let mut history = session.new_history();

	for x in [0.1, 0.2] {
		history.add_edit(perform(
			&session,
			SetReceiverAnchor::dragging(Arc::clone(&r1), None, Point::new(x, 0.5)).unwrap(),
		));
	}
	history.add_edit(perform(
		&session,
		SetReceiverAnchor::new(Arc::clone(&r1), None, Point::new(0.3, 0.5)).unwrap(),
	));
	history.add_edit(perform(
		&session,
		SetReceiverAnchor::new(Arc::clone(&r2), None, Point::new(0.9, 0.9)).unwrap(),
	));
	assert_eq!(history.len(), 2);

	history.undo(&session).unwrap();
	history.undo(&session).unwrap();
	assert_eq!(r1.anchor(), Some(start));
	assert_eq!(r2.anchor(), Some(start));
	assert!(!history.can_undo());
}

#[test]
fn playhead_moves_undo_with_previous_edit() {
	let session = Session::default();
	let mut history = session.new_history();
	history.add_edit(perform(&session, SetTimelineLength::new(&session, None, 1000)));
	history.add_edit(perform(&session, SetTimelinePosition::new(&session, None, 10)));
	history.add_edit(perform(&session, SetTimelinePosition::new(&session, None, 20)));
	assert_eq!(history.len(), 2);
	assert_eq!(history.undo_presentation_name().as_deref(), Some("Change Timeline Length"));

	history.undo(&session).unwrap();
	assert_eq!(session.timeline().position(), 0);
	assert_eq!(session.timeline().length(), 0);
}

#[test]
fn large_tables_spill_to_disk() {
	let dir = tempfile::tempdir().unwrap();
	let session = Session::new(SessionConfig {
		spill_threshold: 2,
		spill_dir: Some(dir.path().to_path_buf()),
		..SessionConfig::default()
	});
	let r1 = receiver(&session, "R1");
	let table: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();

	let edit = SetSensitivityTable::new(&session, Arc::clone(&r1), None, TableKind::Rotation, table.clone())
		.unwrap();
	assert!(edit.is_spilled());
	let (old, new) = edit.spill_paths().unwrap();
	assert!(old.starts_with(dir.path()) && new.starts_with(dir.path()));

	let mut edit = perform(&session, edit);
	assert_eq!(r1.table(TableKind::Rotation), Some(table));
	edit.undo(&session).unwrap();
	assert_eq!(r1.table(TableKind::Rotation), Some(vec![1.0, 1.0]));
}

#[test]
fn spill_failure_leaves_receiver_untouched() {
	let dir = tempfile::tempdir().unwrap();
	let session = Session::new(SessionConfig {
		spill_threshold: 2,
		spill_dir: Some(dir.path().join("missing")),
		..SessionConfig::default()
	});
	let r1 = receiver(&session, "R1");
	let before = r1.table(TableKind::Distance);

	let result = SetSensitivityTable::new(&session, Arc::clone(&r1), None, TableKind::Distance, vec![0.0; 8]);
	assert!(matches!(result, Err(EditError::Io(_))));
	assert_eq!(r1.table(TableKind::Distance), before);
}

#[test]
fn lost_spill_file_fails_undo() {
	let dir = tempfile::tempdir().unwrap();
	let session = Session::new(SessionConfig {
		spill_threshold: 2,
		spill_dir: Some(dir.path().to_path_buf()),
		..SessionConfig::default()
	});
	let r1 = receiver(&session, "R1");
	let table = vec![0.5; 8];
	let edit = SetSensitivityTable::new(&session, Arc::clone(&r1), None, TableKind::Distance, table.clone())
		.unwrap();
	let old_path = edit.spill_paths().unwrap().0.to_path_buf();

	let mut history = session.new_history();
	history.add_edit(perform(&session, edit));
	std::fs::remove_file(&old_path).unwrap();

	assert!(matches!(history.undo(&session), Err(EditError::CannotUndo { .. })));
	assert_eq!(r1.table(TableKind::Distance), Some(table));
	assert!(history.can_undo());
}

#[test]
fn edits_time_out_on_held_doors() {
	let session = Arc::new(Session::new(SessionConfig {
		lock_timeout_ms: Some(20),
		..SessionConfig::default()
	}));
	let r1 = receiver(&session, "R1");
	let edit = SetReceiverAnchor::new(Arc::clone(&r1), None, Point::new(0.0, 0.0)).unwrap();

	let (held_tx, held_rx) = mpsc::channel();
	let (done_tx, done_rx) = mpsc::channel::<()>();
	let holder = {
		let session = Arc::clone(&session);
		thread::spawn(move || {
			let _guard = session.lock_exclusive(DoorSet::RECEIVERS).unwrap();
			held_tx.send(()).unwrap();
			done_rx.recv().unwrap();
		})
	};
	held_rx.recv().unwrap();

	let result = SessionEdit::from(edit).performed(&session);
	assert!(matches!(
		result,
		Err(EditError::LockTimeout(doors)) if doors == DoorSet::RECEIVERS
	));
	assert_eq!(r1.anchor(), Some(Point::new(0.5, 0.5)));

	done_tx.send(()).unwrap();
	holder.join().unwrap();
}

#[test]
fn object_compound_notifies_each_object() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let r2 = receiver(&session, "R2");
	let events1 = record_map(r1.map());
	let events2 = record_map(r2.map());

	let mut compound = session_object_edit(
		&session,
		"Move Receivers",
		vec![Arc::clone(&r1), Arc::clone(&r2)],
		OwnerModKind::Moved,
		None,
		None,
	);
	assert_eq!(compound.door_set(), DoorSet::RECEIVERS);
	for r in [&r1, &r2] {
		let edit = SetReceiverAnchor::new(Arc::clone(r), None, Point::new(0.0, 1.0)).unwrap();
		compound.add_edit(perform(&session, edit)).unwrap();
	}
	compound.end(&session).unwrap();
	let source = compound.source();

	let mut edit = SessionEdit::from(compound);
	assert_eq!(edit.presentation_name(), "Move Receivers");
	edit.undo(&session).unwrap();
	assert_eq!(r1.anchor(), Some(Point::new(0.5, 0.5)));
	assert_eq!(r2.anchor(), Some(Point::new(0.5, 0.5)));

	for events in [events1, events2] {
		let hooked: Vec<_> = events
			.lock()
			.iter()
			.filter(|ev| ev.source() == source)
			.cloned()
			.collect();
		let moved = MapEvent::OwnerModified {
			source,
			kind: OwnerModKind::Moved,
			param: None,
		};
		assert_eq!(hooked, [moved.clone(), moved]);
	}
}

#[test]
fn cancelled_object_compound_reports_cancel_param() {
	let session = Session::default();
	let r1 = receiver(&session, "R1");
	let events = record_map(r1.map());
	let mut compound = session_object_edit(
		&session,
		"Resize",
		vec![Arc::clone(&r1)],
		OwnerModKind::Resized,
		Some(PropValue::from("done")),
		Some(PropValue::from("cancelled")),
	);
	let edit = SetReceiverSize::new(Arc::clone(&r1), None, Size::new(0.9, 0.9)).unwrap();
	compound.add_edit(perform(&session, edit)).unwrap();
	compound.cancel(&session).unwrap();

	assert_eq!(r1.size(), Some(Size::new(0.25, 0.25)));
	let source = compound.source();
	let events = events.lock();
	assert_eq!(
		events.last(),
		Some(&MapEvent::OwnerModified {
			source,
			kind: OwnerModKind::Resized,
			param: Some(PropValue::from("cancelled")),
		})
	);
}
