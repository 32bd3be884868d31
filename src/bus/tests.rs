use pretty_assertions::assert_eq;

use super::record::{Record, replay};
use super::testing::{TestWm, config, screen};
use super::{Bus, Command, CommandError};
use crate::bus::sink::RecordingSink;
use crate::model::geometry::Rect;
use crate::model::server::TreeData;
use crate::model::tree::{ContainerId, ContainerKind, ContainerTag, Orientation, TreeError};
use crate::sys::window::WindowHandle;

fn floating_placement(wm: &TestWm, id: ContainerId) -> Option<Rect> {
    match wm.tree().kind(id) {
        Some(ContainerKind::FloatingWindow { placement, .. }) => Some(*placement),
        _ => None,
    }
}

#[test_log::test]
fn move_is_ignored_while_focus_is_unsynced() {
    let mut wm = TestWm::single_monitor();
    let a = wm.open(1);
    wm.invoke(Command::ForegroundChanged { handle: Some(WindowHandle::new(99)) }).unwrap();
    assert!(!wm.focus().is_synced());

    let before = wm.snapshot();
    let focus = wm.focus();
    let batches = wm.batches().len();

    assert_eq!(wm.move_focused_to("2"), Ok(()));
    assert_eq!(wm.snapshot(), before);
    assert_eq!(wm.focus(), focus);
    assert_eq!(wm.focus().focused(), Some(a));
    assert_eq!(wm.batches().len(), batches);
    assert!(wm.bus.state.redraw.is_empty());
    assert!(!wm.bus.state.workspaces().is_active(wm.workspace("2")));
}

#[test]
fn move_is_ignored_when_focus_is_not_a_window() {
    let mut wm = TestWm::single_monitor();
    assert_eq!(wm.focus().focused(), Some(wm.workspace("1")));
    let before = wm.snapshot();

    assert_eq!(wm.move_focused_to("2"), Ok(()));
    assert_eq!(wm.snapshot(), before);
}

#[test]
fn moving_to_an_unknown_workspace_fails_without_side_effects() {
    let mut wm = TestWm::single_monitor();
    wm.open(1);
    let before = wm.snapshot();
    let batches = wm.batches().len();

    assert_eq!(
        wm.move_focused_to("nope"),
        Err(CommandError::WorkspaceNotFound("nope".into()))
    );
    assert_eq!(wm.snapshot(), before);
    assert_eq!(wm.batches().len(), batches);
}

#[test]
fn moving_to_the_current_workspace_is_a_no_op() {
    let mut wm = TestWm::single_monitor();
    wm.open(1);
    let before = wm.snapshot();
    let batches = wm.batches().len();

    assert_eq!(wm.move_focused_to("1"), Ok(()));
    assert_eq!(wm.snapshot(), before);
    assert_eq!(wm.batches().len(), batches);
}

#[test]
fn floating_move_on_same_monitor_keeps_placement() {
    let mut wm = TestWm::single_monitor();
    let m1 = wm.bus.state.monitors().by_display_id("M1").unwrap();
    let placement = Rect::new(100, 50, 300, 200);
    let window = wm.open_floating(1, placement);

    let b = wm.workspace("2");
    wm.invoke(Command::AttachWorkspaceToMonitor { workspace: b, monitor: m1 }).unwrap();
    wm.bus.state.tree.set_rect(b, Rect::new(0, 0, 1200, 900));

    wm.move_focused_to("2").unwrap();
    assert_eq!(wm.tree().workspace_of(window), Some(b));
    assert_eq!(floating_placement(&wm, window), Some(placement));
    assert_eq!(wm.tree().rect(window), Some(placement));

    let batch = wm.sink.last().unwrap();
    let placed = batch.get(window).unwrap();
    assert_eq!(placed.rect, placement);
    assert!(!placed.visible);
    assert_eq!(placed.dpi_scale, None);
}

#[test_log::test]
fn floating_move_across_monitors_rescales_position() {
    let mut wm = TestWm::new(config(&["1", "2", "3"]));
    wm.add_monitor(screen("M1", Rect::new(0, 0, 1000, 800), 1.0));
    wm.add_monitor(screen("M2", Rect::new(0, 0, 2000, 1600), 2.0));
    let window = wm.open_floating(1, Rect::new(100, 50, 300, 200));

    wm.move_focused_to("2").unwrap();

    let expected = Rect::new(200, 100, 300, 200);
    assert_eq!(wm.tree().workspace_of(window), Some(wm.workspace("2")));
    assert_eq!(floating_placement(&wm, window), Some(expected));

    let batch = wm.sink.last().unwrap();
    let placed = batch.get(window).unwrap();
    assert_eq!(placed.rect, expected);
    assert!(placed.visible);
    assert_eq!(placed.dpi_scale, Some(2.0));

    let state = wm.tree().kind(window).and_then(ContainerKind::window).unwrap();
    assert!(!state.has_pending_dpi_adjustment);
}

#[test]
fn tiling_move_inserts_after_last_focused_resizable() {
    let mut wm = TestWm::single_monitor();
    wm.focus_workspace("2");
    let b = wm.workspace("2");
    let w1 = wm.open(1);
    let w2 = wm.open(2);
    let d = wm.open(3);
    let w4 = wm.open(4);
    assert_eq!(wm.tree().children(b), &[w1, w2, d, w4]);
    wm.foreground(3);
    assert_eq!(wm.focus().focused(), Some(d));

    wm.focus_workspace("1");
    let moved = wm.open(5);
    wm.move_focused_to("2").unwrap();

    assert_eq!(wm.tree().children(b), &[w1, w2, d, moved, w4]);
    assert_eq!(wm.tree().index_of(moved), Some(3));
    assert_eq!(wm.tree().index_of(w4), Some(4));
    assert!(matches!(wm.tree().kind(moved), Some(ContainerKind::TilingWindow(_))));

    let total: f64 = wm.tree().children(b).iter().map(|&c| wm.tree().size_share(c)).sum();
    assert!((total - 1.0).abs() < 1e-9);
    wm.tree().validate().unwrap();
}

#[test]
fn tiling_move_lands_next_to_focused_split() {
    let mut wm = TestWm::single_monitor();
    wm.focus_workspace("2");
    let two = wm.workspace("2");
    let windows: Vec<_> = (1..=4).map(|h| wm.open(h)).collect();

    let split = ContainerKind::Split { orientation: Orientation::Vertical };
    let p = wm.bus.state.tree.insert(split, Rect::default());
    wm.bus.state.tree.attach(p, two, None).unwrap();
    for &w in &windows {
        wm.invoke(Command::MoveContainerWithinTree {
            container: w,
            target_parent: p,
            index: None,
            relayout: true,
        })
        .unwrap();
    }
    wm.foreground(3);
    let d = windows[2];
    assert_eq!(wm.focus().focused(), Some(d));

    wm.focus_workspace("1");
    let moved = wm.open(5);
    wm.move_focused_to("2").unwrap();

    // The split is the most recently focused resizable container, so the
    // window goes beside it rather than beside the window inside it.
    assert_eq!(wm.tree().children(two), &[p, moved]);
    assert_eq!(wm.tree().children(p), windows.as_slice());
    wm.tree().validate().unwrap();
}

#[test]
fn inactive_workspace_is_activated_once() {
    let mut wm = TestWm::single_monitor();
    let m1 = wm.bus.state.monitors().by_display_id("M1").unwrap();
    let target = wm.workspace("3");
    let a = wm.open(1);
    let b = wm.open(2);

    wm.move_focused_to("3").unwrap();
    assert_eq!(wm.focus().focused(), Some(a));
    wm.foreground(1);
    wm.move_focused_to("3").unwrap();

    let attaches = wm.count_recorded(|c| {
        matches!(c, Command::AttachWorkspaceToMonitor { workspace, .. } if *workspace == target)
    });
    assert_eq!(attaches, 1);
    assert_eq!(wm.tree().parent(target), Some(m1));
    assert_eq!(wm.tree().children(target), &[b, a]);
    assert_eq!(wm.focus().focused(), Some(wm.workspace("1")));
}

#[test]
fn move_flushes_exactly_one_batch() {
    let mut wm = TestWm::single_monitor();
    let a = wm.open(1);
    let b = wm.open(2);
    let (one, two) = (wm.workspace("1"), wm.workspace("2"));
    wm.sink.clear();

    wm.move_focused_to("2").unwrap();

    let batches = wm.batches();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    let workspaces: Vec<_> =
        batch.of_tag(ContainerTag::Workspace).map(|p| p.container).collect();
    assert_eq!(workspaces, vec![one, two]);
    let containers: Vec<_> = batch.placements.iter().map(|p| p.container).collect();
    assert_eq!(containers, vec![one, a, two, b]);
    assert!(batch.get(a).unwrap().visible);
    assert!(!batch.get(b).unwrap().visible);
    assert_eq!(batch.get(a).unwrap().rect, Rect::new(0, 0, 1000, 800));
    assert!(wm.bus.state.redraw.is_empty());
}

#[test]
fn nested_commands_are_recorded_with_depth() {
    let mut wm = TestWm::single_monitor();
    wm.open(1);
    wm.open(2);
    wm.bus.record_mut().clear();

    wm.move_focused_to("3").unwrap();

    let trace: Vec<(usize, &str)> =
        wm.bus.record().entries().iter().map(|e| (e.depth, e.command.name())).collect();
    assert_eq!(
        trace,
        vec![
            (0, "MoveFocusedWindowToWorkspace"),
            (1, "AttachWorkspaceToMonitor"),
            (1, "MoveContainerWithinTree"),
            (1, "FocusWorkspace"),
            (2, "SetFocusedDescendant"),
            (2, "RedrawContainers"),
            (1, "RedrawContainers"),
        ]
    );
}

#[test]
fn structural_violations_are_rejected_before_mutation() {
    let mut wm = TestWm::single_monitor();
    let window = wm.open(1);
    let one = wm.workspace("1");
    let m1 = wm.bus.state.monitors().by_display_id("M1").unwrap();

    let tree = &mut wm.bus.state.tree;
    let split = |orientation| ContainerKind::Split { orientation };
    let outer = tree.insert(split(Orientation::Vertical), Rect::default());
    tree.attach(outer, one, None).unwrap();
    let inner = tree.insert(split(Orientation::Horizontal), Rect::default());
    tree.attach(inner, outer, None).unwrap();
    let before = wm.snapshot();

    let cyclic = wm.invoke(Command::MoveContainerWithinTree {
        container: outer,
        target_parent: inner,
        index: None,
        relayout: true,
    });
    assert_eq!(
        cyclic,
        Err(CommandError::Tree(TreeError::CyclicMove { container: outer, target: inner }))
    );

    let invalid = wm.invoke(Command::MoveContainerWithinTree {
        container: window,
        target_parent: m1,
        index: None,
        relayout: true,
    });
    assert_eq!(
        invalid,
        Err(CommandError::Tree(TreeError::InvalidParent {
            child: ContainerTag::TilingWindow,
            parent: ContainerTag::Monitor,
        }))
    );
    assert_eq!(wm.snapshot(), before);
}

#[test]
fn unmanaging_the_focused_window_repairs_focus_and_layout() {
    let mut wm = TestWm::single_monitor();
    let a = wm.open(1);
    let b = wm.open(2);
    assert_eq!(wm.tree().rect(a), Some(Rect::new(0, 0, 500, 800)));
    assert_eq!(wm.tree().rect(b), Some(Rect::new(500, 0, 500, 800)));

    wm.invoke(Command::UnmanageWindow { handle: WindowHandle::new(2) }).unwrap();
    assert!(!wm.tree().contains(b));
    assert_eq!(wm.focus().focused(), Some(a));
    assert_eq!(wm.tree().rect(a), Some(Rect::new(0, 0, 1000, 800)));
    assert_eq!(wm.sink.last().unwrap().get(a).unwrap().rect, Rect::new(0, 0, 1000, 800));

    let handle = WindowHandle::new(2);
    assert_eq!(
        wm.invoke(Command::UnmanageWindow { handle }),
        Err(CommandError::WindowNotFound(handle))
    );
    let handle = WindowHandle::new(1);
    assert_eq!(
        wm.invoke(Command::ManageWindow { handle, floating: None }),
        Err(CommandError::WindowAlreadyManaged(handle))
    );
}

#[test]
fn foreground_on_hidden_workspace_switches_display() {
    let mut wm = TestWm::single_monitor();
    let a = wm.open(1);
    wm.focus_workspace("2");
    let b = wm.open(2);
    let (one, two) = (wm.workspace("1"), wm.workspace("2"));
    assert!(wm.bus.state.workspaces().is_displayed(two));

    wm.foreground(1);

    assert_eq!(wm.focus().focused(), Some(a));
    assert!(wm.focus().is_synced());
    assert!(wm.bus.state.workspaces().is_displayed(one));
    let batch = wm.sink.last().unwrap();
    assert!(batch.get(a).unwrap().visible);
    assert!(!batch.get(b).unwrap().visible);
}

#[test]
fn unknown_foreground_only_syncs_non_window_focus() {
    let mut wm = TestWm::single_monitor();
    wm.invoke(Command::ForegroundChanged { handle: None }).unwrap();
    assert!(wm.focus().is_synced());

    wm.open(1);
    wm.invoke(Command::ForegroundChanged { handle: None }).unwrap();
    assert!(!wm.focus().is_synced());
}

#[test]
fn floating_toggle_round_trip_restores_tiling() {
    let mut wm = TestWm::single_monitor();
    let a = wm.open(1);
    let b = wm.open(2);

    wm.invoke(Command::SetWindowFloating { container: b, floating: true }).unwrap();
    assert_eq!(floating_placement(&wm, b), Some(Rect::new(500, 0, 500, 800)));
    assert_eq!(wm.tree().rect(a), Some(Rect::new(0, 0, 1000, 800)));

    wm.invoke(Command::SetWindowFloating { container: b, floating: false }).unwrap();
    assert!(matches!(wm.tree().kind(b), Some(ContainerKind::TilingWindow(_))));
    assert_eq!(wm.tree().rect(a), Some(Rect::new(0, 0, 500, 800)));
    assert_eq!(wm.tree().rect(b), Some(Rect::new(500, 0, 500, 800)));

    let one = wm.workspace("1");
    assert_eq!(
        wm.invoke(Command::SetWindowFloating { container: one, floating: true }),
        Err(CommandError::WrongKind { container: one, expected: ContainerTag::TilingWindow })
    );
}

#[test]
fn sinking_a_floating_window_places_it_after_the_focused_tile() {
    let mut wm = TestWm::single_monitor();
    let one = wm.workspace("1");
    let a = wm.open_floating(1, Rect::new(10, 10, 100, 100));
    let b = wm.open_floating(2, Rect::new(20, 20, 100, 100));
    let c = wm.open_floating(3, Rect::new(30, 30, 100, 100));
    let d = wm.open(4);
    let e = wm.open(5);
    wm.foreground(4);

    wm.invoke(Command::SetWindowFloating { container: a, floating: false }).unwrap();

    assert_eq!(wm.tree().children(one), &[b, c, d, a, e]);
    assert_eq!(wm.tree().index_of(a), wm.tree().index_of(d).map(|i| i + 1));
    let x = |id| wm.tree().rect(id).unwrap().x;
    assert!(x(d) < x(a) && x(a) < x(e));
    wm.tree().validate().unwrap();
}

#[test]
fn focusing_away_deactivates_empty_workspace() {
    let mut wm = TestWm::single_monitor();
    let (one, two) = (wm.workspace("1"), wm.workspace("2"));

    wm.focus_workspace("2");

    assert_eq!(wm.tree().parent(one), None);
    assert!(wm.bus.state.workspaces().is_displayed(two));
    assert_eq!(wm.focus().focused(), Some(two));
    assert_eq!(
        wm.invoke(Command::DetachWorkspaceFromMonitor { workspace: two }),
        Err(CommandError::WorkspaceHasFocus(two))
    );
}

#[test]
fn focusing_away_keeps_occupied_workspace() {
    let mut wm = TestWm::single_monitor();
    let a = wm.open(1);
    let one = wm.workspace("1");

    wm.focus_workspace("2");
    assert!(wm.bus.state.workspaces().is_active(one));
    assert!(!wm.bus.state.workspaces().is_displayed(one));

    wm.focus_workspace("1");
    assert_eq!(wm.focus().focused(), Some(a));
}

#[test]
fn monitors_are_unique_and_limited_by_workspaces() {
    let mut wm = TestWm::new(config(&["only"]));
    wm.add_monitor(screen("M1", Rect::new(0, 0, 800, 600), 1.0));

    assert_eq!(
        wm.invoke(Command::AddMonitor(screen("M1", Rect::new(0, 0, 800, 600), 1.0))),
        Err(CommandError::MonitorExists("M1".into()))
    );
    assert_eq!(
        wm.invoke(Command::AddMonitor(screen("M2", Rect::new(800, 0, 800, 600), 1.0))),
        Err(CommandError::NoInactiveWorkspace)
    );
    assert_eq!(wm.bus.state.monitors().all().len(), 1);
}

#[test]
fn saved_record_replays_to_the_same_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("record.ron");

    let sink = RecordingSink::new();
    let mut bus = Bus::new(config(&["1", "2", "3"]), Box::new(sink.clone()))
        .with_record(Record::to_file(path.clone()));
    let steps = [
        Command::AddMonitor(screen("M1", Rect::new(0, 0, 1000, 800), 1.0)),
        Command::ManageWindow { handle: WindowHandle::new(1), floating: None },
        Command::ForegroundChanged { handle: Some(WindowHandle::new(1)) },
        Command::ManageWindow { handle: WindowHandle::new(2), floating: None },
        Command::ForegroundChanged { handle: Some(WindowHandle::new(2)) },
        Command::MoveFocusedWindowToWorkspace { workspace: "3".into() },
    ];
    for step in steps {
        bus.invoke(step).unwrap();
    }
    bus.record().save().unwrap();

    let entries = Record::load(&path).unwrap();
    assert_eq!(entries.iter().filter(|e| e.depth == 0).count(), 6);

    let mut replayed = Bus::new(config(&["1", "2", "3"]), Box::new(RecordingSink::new()));
    replay(&mut replayed, &entries);

    assert_eq!(TreeData::build(replayed.state()), TreeData::build(bus.state()));
}
