#![forbid(unsafe_code)]

//! End-to-end activation scenarios against the simulated host.
//!
//! Run:
//!   cargo test -p autoview-runtime --test scenarios

use std::cell::RefCell;
use std::rc::Rc;

use autoview_backend::HostWorkspace;
use autoview_core::{Mode, RuleKind, RuleOperation, SettingsEvent, Verdict};
use autoview_harness::SimHost;
use autoview_runtime::{
    AutoviewConfig, ControlLoop, FileStorage, RuleStore, StorageBackend, StorageConfig, Transition,
};

fn control_with(setup: impl FnOnce(&mut RuleStore)) -> ControlLoop {
    let mut rules = RuleStore::in_memory(Mode::Source);
    setup(&mut rules);
    ControlLoop::new(rules)
}

// ============================================================================
// Acceptance scenarios
// ============================================================================

#[test]
fn empty_rules_only_record_the_current_mode() {
    let mut host = SimHost::new();
    let pane = host.open_pane(Some("a.md"), "preview").unwrap();
    let mut cl = control_with(|_| {});

    assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
    assert_eq!(host.toggles(pane), 0);
    let state = cl.panes().state(pane).unwrap();
    assert_eq!(state.remembered(), Some(Mode::Preview));
    assert!(!state.is_locked());
}

#[test]
fn folder_rule_locks_then_restores() {
    let mut host = SimHost::new();
    let pane = host.open_pane(Some("Docs/readme.md"), "source").unwrap();
    let mut cl = control_with(|r| {
        r.add_folder("Docs").unwrap();
    });

    assert_eq!(cl.on_activate(&mut host), Transition::Locked);
    assert_eq!(host.mode(pane), Some("preview"));
    let state = cl.panes().state(pane).unwrap();
    assert!(state.is_locked());
    assert_eq!(state.remembered(), Some(Mode::Source));

    host.open_document("other.md");
    assert_eq!(
        cl.on_activate(&mut host),
        Transition::Released {
            restored: Some(Mode::Source)
        }
    );
    assert_eq!(host.mode(pane), Some("source"));
    assert!(!cl.panes().state(pane).unwrap().is_locked());
}

#[test]
fn exclusion_beats_folder_membership() {
    let mut host = SimHost::new();
    let pane = host.open_pane(Some("Private/x.md"), "source").unwrap();
    let mut cl = control_with(|r| {
        r.add_exclude_rule("^Private/").unwrap();
        r.add_folder("Private").unwrap();
    });

    assert_eq!(cl.rules().classify("Private/x.md"), Verdict::Unmanaged);
    assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
    assert_eq!(host.toggles(pane), 0);
}

#[test]
fn include_rule_edit_publishes_once_and_applies_next_activation() {
    let mut host = SimHost::new();
    let pane = host.open_pane(Some("note.secret.md"), "source").unwrap();
    let mut cl = control_with(|_| {});
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let _sub = cl
        .rules_mut()
        .subscribe(move |e| sink.borrow_mut().push(e.clone()));

    assert!(cl.rules_mut().add_include_rule("\\.secret\\.md$").unwrap());
    assert_eq!(
        *events.borrow(),
        vec![SettingsEvent::new(
            RuleKind::Rule,
            RuleOperation::Append,
            "\\.secret\\.md$"
        )]
    );

    assert_eq!(cl.on_activate(&mut host), Transition::Locked);
    assert_eq!(host.mode(pane), Some("preview"));
}

// ============================================================================
// Multi-pane behavior
// ============================================================================

#[test]
fn split_of_unmanaged_pane_inherits_remembered_mode() {
    let mut host = SimHost::new();
    host.open_pane(Some("a.md"), "preview").unwrap();
    let mut cl = control_with(|_| {});
    cl.on_activate(&mut host);

    let split = host.split_active().unwrap().unwrap();
    assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
    assert_eq!(cl.panes().state(split).unwrap().remembered(), Some(Mode::Preview));
    assert_eq!(cl.panes().last_active(), Some(split));
}

#[test]
fn panes_are_managed_independently() {
    let mut host = SimHost::new();
    let docs = host.open_pane(Some("Docs/a.md"), "source").unwrap();
    let mut cl = control_with(|r| {
        r.add_folder("Docs").unwrap();
    });
    cl.on_activate(&mut host);

    let notes = host.open_pane(Some("notes.md"), "source").unwrap();
    assert_eq!(cl.on_activate(&mut host), Transition::Tracked);
    assert_eq!(host.mode(notes), Some("source"));

    host.focus(docs);
    assert_eq!(cl.on_activate(&mut host), Transition::Held);
    assert_eq!(host.toggles(docs), 1);
    assert_eq!(host.toggles(notes), 0);
}

#[test]
fn closing_a_locked_pane_discards_its_state() {
    let mut host = SimHost::new();
    let docs = host.open_pane(Some("Docs/a.md"), "source").unwrap();
    let other = host.open_pane(Some("b.md"), "source").unwrap();
    let mut cl = control_with(|r| {
        r.add_folder("Docs").unwrap();
    });
    host.focus(docs);
    cl.on_activate(&mut host);

    host.close_pane(docs);
    assert!(cl.on_pane_closed(docs));
    host.focus(other);
    cl.on_activate(&mut host);
    assert!(cl.panes().state(docs).is_none());
    assert!(!host.pane_exists(docs));
}

#[test]
fn non_editor_view_is_ignored() {
    let mut host = SimHost::new();
    let pane = host.open_pane(Some("Docs/a.md"), "source").unwrap();
    host.set_view_kind(pane, "graph");
    let mut cl = control_with(|r| {
        r.add_folder("Docs").unwrap();
    });
    assert_eq!(cl.on_activate(&mut host), Transition::NoDocument);
    assert!(cl.panes().is_empty());
}

// ============================================================================
// Persistence across sessions
// ============================================================================

#[test]
fn rules_survive_a_restart_through_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");

    {
        let mut store = RuleStore::load(Box::new(FileStorage::new(&path)), Mode::Source);
        store.add_folder("Docs").unwrap();
        store.add_exclude_rule("^Docs/drafts/").unwrap();
        store.set_default_mode(Mode::Preview).unwrap();
    }

    let stored = FileStorage::new(&path).load().unwrap().unwrap();
    assert_eq!(stored.folders, vec!["Docs"]);
    assert_eq!(stored.default_mode, Some(Mode::Preview));

    let config = AutoviewConfig {
        storage: StorageConfig { path: Some(path) },
        ..AutoviewConfig::default()
    };
    let store = config.open_rule_store();
    assert_eq!(store.default_mode(), Mode::Preview);
    assert_eq!(store.classify("Docs/a.md"), Verdict::Managed);
    assert_eq!(store.classify("Docs/drafts/a.md"), Verdict::Unmanaged);
}

#[test]
fn corrupt_storage_starts_empty_and_recovers_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(&path, "not json").unwrap();

    let mut store = RuleStore::load(Box::new(FileStorage::new(&path)), Mode::Source);
    assert!(store.rules().is_empty());
    store.add_file("a.md").unwrap();

    let kept = FileStorage::new(&path).corrupt_path();
    assert_eq!(std::fs::read_to_string(kept).unwrap(), "not json");

    let reloaded = RuleStore::load(Box::new(FileStorage::new(&path)), Mode::Source);
    assert_eq!(reloaded.rules().files().collect::<Vec<_>>(), vec!["a.md"]);
}
