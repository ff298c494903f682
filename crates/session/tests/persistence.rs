mod common;

use std::sync::Arc;

use meloncillo_props::SourceId;
use meloncillo_session::{
	CollectionChange, CollectionEvent, Point, Session, SessionConfig, SessionObject, Span, TableKind, persist,
};
use pretty_assertions::assert_eq;

#[test]
fn configured_session_survives_save_and_load() {
	common::init_tracing();
	let dir = tempfile::tempdir().unwrap();
	let config_path = dir.path().join("session.toml");
	std::fs::write(
		&config_path,
		"undo-limit = 10\nspill-threshold = 64\ndefault-rate = 48000.0\n",
	)
	.unwrap();
	let config = SessionConfig::load(&config_path).unwrap();
	assert_eq!(config.undo_limit, 10);

	let session = Session::new(config.clone());
	assert_eq!(session.new_history().limit(), 10);
	session.timeline().set_length(None, 480000);
	session.timeline().set_selection(None, Span::new(48000, 96000));
	let r1 = Arc::new(SessionObject::receiver("R1"));
	r1.set_anchor(None, Point::new(0.25, 0.75));
	r1.set_table(None, TableKind::Rotation, vec![1.0, 0.75, 0.5, 0.75]);
	r1.map().put_value(None, "gain", 0.5);
	session.receivers().add_all(None, &[r1]);
	session
		.transmitters()
		.add_all(None, &[Arc::new(SessionObject::transmitter("T1"))]);

	let path = dir.path().join("session.json");
	persist::save(&session, &path).unwrap();

	let restored = Session::new(config);
	let (events, sink) = common::recorder();
	restored
		.receivers()
		.events()
		.subscribe(move |ev: &CollectionEvent| sink(ev.change.clone()));
	let src = SourceId::next();
	persist::load(&restored, Some(src), &path).unwrap();

	assert_eq!(restored.timeline().state(), session.timeline().state());
	let r1 = restored.receivers().find_by_name("R1").unwrap();
	assert_eq!(r1.anchor(), Some(Point::new(0.25, 0.75)));
	assert_eq!(r1.table(TableKind::Rotation), Some(vec![1.0, 0.75, 0.5, 0.75]));
	assert_eq!(restored.transmitters().len(), 1);
	assert_eq!(*events.lock(), [CollectionChange::Added(vec![r1.id()])]);
	assert_eq!(restored.to_element(), session.to_element());
}
