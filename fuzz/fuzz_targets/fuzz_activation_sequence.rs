#![no_main]

use arbitrary::Arbitrary;
use autoview_core::Mode;
use autoview_harness::SimHost;
use autoview_runtime::{ControlLoop, RuleStore};
use libfuzzer_sys::fuzz_target;

const PATHS: [&str; 6] = [
    "a.md",
    "Docs/readme.md",
    "Docs/x/y.md",
    "DocsArchive/z.md",
    "Private/Docs/p.md",
    "n.secret.md",
];
const MODES: [&str; 4] = ["source", "preview", "loading", "canvas"];

#[derive(Debug, Arbitrary)]
enum Op {
    NewPane { path: u8, mode: u8 },
    Open { path: u8 },
    Split,
    Focus { nth: u8 },
    Close { nth: u8 },
    UserMode { mode: u8 },
    OtherView { nth: u8 },
    ToggleActiveFile,
    AddFolder,
    RemoveFolder,
}

#[derive(Debug, Arbitrary)]
struct Input {
    exclude_private: bool,
    ops: Vec<Op>,
}

fn pick<'a>(table: &[&'a str], idx: u8) -> &'a str {
    table[usize::from(idx) % table.len()]
}

fuzz_target!(|input: Input| {
    let mut rules = RuleStore::in_memory(Mode::Source);
    rules.add_include_rule("\\.secret\\.md$").unwrap();
    if input.exclude_private {
        rules.add_exclude_rule("^Private/").unwrap();
    }
    let mut control = ControlLoop::new(rules);
    let mut host = SimHost::new();

    for op in input.ops.into_iter().take(256) {
        match op {
            Op::NewPane { path, mode } => {
                let _ = host.open_pane(Some(pick(&PATHS, path)), pick(&MODES, mode));
            }
            Op::Open { path } => {
                host.open_document(pick(&PATHS, path));
            }
            Op::Split => {
                let _ = host.split_active();
            }
            Op::Focus { nth } => {
                if let Some(pane) = host.nth_pane(usize::from(nth) % 8) {
                    host.focus(pane);
                }
            }
            Op::Close { nth } => {
                if let Some(pane) = host.nth_pane(usize::from(nth) % 8) {
                    host.close_pane(pane);
                    control.on_pane_closed(pane);
                }
            }
            Op::UserMode { mode } => {
                if let Some(pane) = host.active() {
                    host.set_mode(pane, pick(&MODES, mode));
                }
            }
            Op::OtherView { nth } => {
                if let Some(pane) = host.nth_pane(usize::from(nth) % 8) {
                    host.set_view_kind(pane, "graph");
                }
            }
            Op::ToggleActiveFile => {
                let _ = control.toggle_active_file(&mut host);
                continue;
            }
            Op::AddFolder => {
                let _ = control.rules_mut().add_folder("Docs");
                continue;
            }
            Op::RemoveFolder => {
                let _ = control.rules_mut().remove_folder("Docs");
                continue;
            }
        }

        let before: u32 = host.pane_ids().map(|p| host.toggles(p)).sum();
        control.on_activate(&mut host);
        let after: u32 = host.pane_ids().map(|p| host.toggles(p)).sum();
        assert!(after - before <= 1, "more than one toggle per activation");

        for pane in host.pane_ids() {
            if let Some(state) = control.panes().state(pane)
                && state.is_locked()
            {
                assert!(state.remembered().is_some(), "locked pane without remembered mode");
            }
        }
        assert!(control.panes().len() <= host.len());
    }
});
