//! Integration tests for binding sessions
//!
//! These tests drive a session the way a front end does: toggling bindings,
//! persisting, reloading, importing and exporting binding files on disk.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use volmix_core::domain::{
    BindingChange, BindingEntry, BindingStore, CodecError, ConfigCodec, Fader, NoTargets,
    Session, SessionError, TargetDirectory, TargetId,
};
use volmix_infra::discovery::parse_status;

fn id(raw: &str) -> TargetId {
    TargetId::from(raw)
}

fn fader(index: i64) -> Fader {
    Fader::new(index).unwrap()
}

fn triples(store: &BindingStore) -> BTreeSet<(u32, u8, String)> {
    store
        .entries()
        .map(|e| (e.layer, e.fader.index(), e.target.to_string()))
        .collect()
}

fn column_ids(session: &Session) -> Vec<&str> {
    session.columns().iter().map(TargetId::as_str).collect()
}

// ============================================================================
// END-TO-END
// ============================================================================

#[test]
fn test_bind_move_save_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("volmix.conf");
    let mut session = Session::load_default(&path).unwrap();

    session.toggle_binding(0, 1, &id("51")).unwrap();
    assert_eq!(session.query(0, 1), &[id("51")]);

    session.toggle_binding(0, 2, &id("51")).unwrap();
    assert!(session.query(0, 1).is_empty());
    assert_eq!(session.query(0, 2), &[id("51")]);

    let text = ConfigCodec::serialize(session.store(), session.directory());
    let parsed = ConfigCodec::parse(&text).unwrap();
    assert_eq!(parsed.store.query(0, fader(2)), &[id("51")]);

    let reloaded = Session::load_default(&path).unwrap();
    assert_eq!(reloaded.query(0, 2), &[id("51")]);
    assert!(reloaded.query(0, 1).is_empty());
    assert_eq!(column_ids(&reloaded), vec!["51"]);
}

#[test]
fn test_round_trip_triples() {
    let mut store = BindingStore::new();
    store.toggle_binding(0, fader(3), &id("51"));
    store.toggle_binding(0, fader(3), &id("52"));
    store.toggle_binding(2, fader(1), &id("51"));

    let parsed = ConfigCodec::parse(&ConfigCodec::serialize(&store, &NoTargets)).unwrap();

    let expected: BTreeSet<_> = [
        (0, 3, "51".to_string()),
        (0, 3, "52".to_string()),
        (2, 1, "51".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(triples(&parsed.store), expected);
}

#[test]
fn test_unresolved_targets_survive_resave() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("volmix.conf");
    fs::write(&path, "0 1 999 Old_Name\n0 2 51 Speakers\n").unwrap();

    let mut session = Session::load_default(&path).unwrap();
    session.set_directory(parse_status(
        "Audio\n ├─ Sinks:\n │  *   51. Speakers [vol: 0.40]\n",
    ));
    session.toggle_binding(1, 1, &id("51")).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "0 1 999 Unk\n0 2 51 Speakers\n1 1 51 Speakers\n"
    );
}

// ============================================================================
// EXCLUSIVITY AND TOGGLING
// ============================================================================

#[test]
fn test_double_toggle_from_unbound() {
    let mut store = BindingStore::new();
    assert_eq!(store.toggle_binding(0, fader(4), &id("51")), BindingChange::Bound);
    assert_eq!(store.toggle_binding(0, fader(4), &id("51")), BindingChange::Unbound);
    assert!(store.is_empty());
}

#[test]
fn test_double_toggle_from_other_fader() {
    let mut store = BindingStore::new();
    store.toggle_binding(0, fader(1), &id("51"));

    store.toggle_binding(0, fader(4), &id("51"));
    store.toggle_binding(0, fader(4), &id("51"));

    // Fader 4 is back to unbound, but the move off fader 1 sticks
    assert!(store.query(0, fader(4)).is_empty());
    assert!(store.query(0, fader(1)).is_empty());
}

#[test]
fn test_bad_fader_leaves_state_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("volmix.conf");
    let mut session = Session::new(&path);
    session.toggle_binding(0, 1, &id("51")).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    for bad in [0, 8, -1] {
        assert!(matches!(
            session.toggle_binding(0, bad, &id("51")),
            Err(SessionError::Binding(_))
        ));
    }

    assert_eq!(session.query(0, 1), &[id("51")]);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

proptest! {
    #[test]
    fn exclusivity_across_session_toggles(
        ops in prop::collection::vec((0u32..3, 1i64..=7, 0u8..5), 1..48)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new(temp_dir.path().join("volmix.conf"));

        for (layer, index, raw) in ops {
            session.toggle_binding(layer, index, &id(&raw.to_string())).unwrap();

            let mut seen = BTreeSet::new();
            for entry in session.store().entries() {
                prop_assert!(seen.insert((entry.layer, entry.target.clone())));
            }
        }

        let reloaded = Session::load_default(session.default_path()).unwrap();
        prop_assert_eq!(reloaded.store(), session.store());
    }
}

// ============================================================================
// PARSING POLICY
// ============================================================================

#[test]
fn test_short_line_is_skipped() {
    let parsed = ConfigCodec::parse("0 3 51 Speakers\n0 3\n").unwrap();
    assert_eq!(parsed.store.len(), 1);
}

#[test]
fn test_corrupt_number_fails_load() {
    let err = ConfigCodec::parse("x 3 51 name\n").unwrap_err();
    assert!(matches!(err, CodecError::InvalidNumber { line: 1, .. }));
}

#[test]
fn test_columns_first_seen_order() {
    let parsed = ConfigCodec::parse("0 1 51 a\n0 2 52 b\n1 3 51 a\n0 4 53 c\n").unwrap();
    let columns: Vec<&str> = parsed.columns.iter().map(TargetId::as_str).collect();
    assert_eq!(columns, vec!["51", "52", "53"]);
}

#[test]
fn test_replace_applies_last_write_wins() {
    let mut store = BindingStore::new();
    store.replace(vec![
        BindingEntry::new(0, fader(1), id("51")),
        BindingEntry::new(0, fader(6), id("51")),
    ]);
    assert_eq!(store.fader_of(0, &id("51")), Some(fader(6)));
    assert_eq!(store.len(), 1);
}

// ============================================================================
// IMPORT / EXPORT
// ============================================================================

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_import_replaces_bindings_but_merges_columns() {
    let temp_dir = TempDir::new().unwrap();
    let default = temp_dir.path().join("volmix.conf");
    let mut session = Session::new(&default);
    session.add_column(id("60")).unwrap();
    session.add_column(id("51")).unwrap();
    session.toggle_binding(0, 1, &id("60")).unwrap();

    let import = write(temp_dir.path(), "other.conf", "0 2 51 a\n1 1 52 b\n");
    let summary = session.import_from(&import).unwrap();

    assert_eq!(summary.bindings, 2);
    assert_eq!(summary.columns_added, 1);
    assert!(session.query(0, 1).is_empty());
    assert_eq!(session.query(0, 2), &[id("51")]);
    assert_eq!(column_ids(&session), vec!["60", "51", "52"]);

    // Import also rewrites the default file
    assert_eq!(fs::read_to_string(&default).unwrap(), "0 2 51 Unk\n1 1 52 Unk\n");
}

#[test]
fn test_failed_import_keeps_session() {
    let temp_dir = TempDir::new().unwrap();
    let default = temp_dir.path().join("volmix.conf");
    let mut session = Session::new(&default);
    session.toggle_binding(0, 1, &id("51")).unwrap();

    let corrupt = write(temp_dir.path(), "corrupt.conf", "0 2 52 ok\n0 x 53 bad\n");
    assert!(matches!(
        session.import_from(&corrupt),
        Err(SessionError::Parse { .. })
    ));
    assert!(matches!(
        session.import_from(temp_dir.path().join("missing.conf")),
        Err(SessionError::Io { .. })
    ));

    assert_eq!(session.query(0, 1), &[id("51")]);
    assert!(session.query(0, 2).is_empty());
    assert_eq!(fs::read_to_string(&default).unwrap(), "0 1 51 Unk\n");
}

#[test]
fn test_export_overwrites_destination() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(temp_dir.path().join("volmix.conf"));
    session.toggle_binding(3, 7, &id("51")).unwrap();

    let export = write(
        temp_dir.path(),
        "export.conf",
        "0 1 1 a\n0 1 2 b\n0 1 3 c\n0 1 4 d\n",
    );
    session.export_to(&export).unwrap();

    assert_eq!(fs::read_to_string(&export).unwrap(), "3 7 51 Unk\n");
}

#[test]
fn test_truncated_write_loads_complete_lines() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(temp_dir.path().join("volmix.conf"));
    session.toggle_binding(0, 1, &id("51")).unwrap();
    session.toggle_binding(0, 2, &id("52")).unwrap();

    // Simulate a crash in the middle of the second line
    let full = fs::read_to_string(session.default_path()).unwrap();
    let cut = full.find("0 2").unwrap() + "0 2".len();
    fs::write(session.default_path(), &full[..cut]).unwrap();

    let reloaded = Session::load_default(session.default_path()).unwrap();
    assert_eq!(reloaded.query(0, 1), &[id("51")]);
    assert!(reloaded.query(0, 2).is_empty());
}

#[test]
fn test_empty_discovery_still_binds() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(temp_dir.path().join("volmix.conf"));
    session.set_directory(TargetDirectory::new());

    session.toggle_binding(0, 5, &id("51")).unwrap();
    assert_eq!(session.column_label(&id("51")), "51");
    assert_eq!(session.query(0, 5), &[id("51")]);
}
