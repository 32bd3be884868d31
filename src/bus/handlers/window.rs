use tracing::{debug, info, warn};

use super::insertion_point;
use crate::bus::{Bus, Command, CommandError, CommandResponse};
use crate::model::geometry::Rect;
use crate::model::tree::{ContainerId, ContainerKind, ContainerTag, WindowState};
use crate::sys::window::WindowHandle;

pub struct WindowCommandHandler;

impl WindowCommandHandler {
    pub fn handle_manage_window(
        bus: &mut Bus,
        handle: WindowHandle,
        floating: Option<Rect>,
    ) -> CommandResponse {
        if bus.state.containers().by_handle(handle).is_some() {
            return Err(CommandError::WindowAlreadyManaged(handle));
        }
        let Some(workspace) =
            bus.state.containers().focused().and_then(|id| bus.state.tree.workspace_of(id))
        else {
            return Err(CommandError::NoMonitor);
        };

        let window = WindowState::new(handle);
        let (id, target_parent, index) = match floating {
            Some(placement) => {
                let id = bus
                    .state
                    .tree
                    .insert(ContainerKind::FloatingWindow { window, placement }, placement);
                (id, workspace, None)
            }
            None => {
                let id =
                    bus.state.tree.insert(ContainerKind::TilingWindow(window), Rect::default());
                let (parent, index) = insertion_point(bus, workspace, None);
                (id, parent, index)
            }
        };

        let moved = bus.invoke(Command::MoveContainerWithinTree {
            container: id,
            target_parent,
            index,
            relayout: true,
        });
        if let Err(err) = moved {
            if let Err(cleanup) = bus.state.tree.remove(id) {
                warn!(%handle, ?id, %cleanup, "Failed to drop unplaced window");
            }
            return Err(err);
        }
        info!(%handle, ?id, floating = floating.is_some(), "Managing window");

        bus.invoke(Command::SetFocusedDescendant { container: id })?;
        bus.state.mark_dirty(workspace);
        bus.invoke(Command::RedrawContainers)
    }

    pub fn handle_unmanage_window(bus: &mut Bus, handle: WindowHandle) -> CommandResponse {
        let Some(window) = bus.state.containers().by_handle(handle) else {
            return Err(CommandError::WindowNotFound(handle));
        };
        let workspace = bus.state.tree.workspace_of(window);
        let parent = bus.state.tree.parent(window);
        let was_focused = bus.state.containers().is_focused(window);

        let tree = &mut bus.state.tree;
        tree.remove(window)?;
        if let Some(parent) = parent {
            bus.layout.release_share(tree, parent);
            bus.layout.tidy_split(tree, parent)?;
        }
        if let Some(workspace) = workspace {
            bus.layout.layout_workspace(tree, workspace);
            bus.state.mark_dirty(workspace);
        }
        info!(%handle, "Stopped managing window");

        if was_focused {
            match workspace {
                Some(workspace) => {
                    let next = bus.state.containers().focus_target_within(workspace);
                    bus.invoke(Command::SetFocusedDescendant { container: next })?;
                }
                None => bus.state.focus.clear(),
            }
        }
        bus.invoke(Command::RedrawContainers)
    }

    pub fn handle_foreground_changed(
        bus: &mut Bus,
        handle: Option<WindowHandle>,
    ) -> CommandResponse {
        let Some(window) = handle.and_then(|h| bus.state.containers().by_handle(h)) else {
            let synced = bus.state.containers().focused_window().is_none();
            bus.state.focus.set_synced(synced);
            debug!(?handle, synced, "Foreground is not a managed window");
            return Ok(());
        };
        let Some(workspace) = bus.state.tree.workspace_of(window) else {
            return Ok(());
        };
        if !bus.state.workspaces().is_active(workspace) {
            warn!(?handle, "Foreground window is on an inactive workspace");
            bus.state.focus.set_synced(false);
            return Ok(());
        }

        if !bus.state.containers().is_focused(window) {
            let monitor = bus.state.tree.parent(workspace);
            let displayed_before = monitor.and_then(|m| bus.state.workspaces().displayed_on(m));
            bus.invoke(Command::SetFocusedDescendant { container: window })?;
            if displayed_before != Some(workspace) {
                if let Some(hidden) = displayed_before {
                    bus.state.mark_dirty(hidden);
                }
                bus.state.mark_dirty(workspace);
            }
        }
        bus.state.focus.set_synced(true);
        bus.invoke(Command::RedrawContainers)
    }

    pub fn handle_set_window_floating(
        bus: &mut Bus,
        container: ContainerId,
        floating: bool,
    ) -> CommandResponse {
        let Some(kind) = bus.state.tree.kind(container) else {
            return Err(CommandError::UnknownContainer(container));
        };
        let Some(&window) = kind.window() else {
            return Err(CommandError::WrongKind { container, expected: ContainerTag::TilingWindow });
        };
        let is_floating = matches!(kind, ContainerKind::FloatingWindow { .. });
        if is_floating == floating {
            return Ok(());
        }
        let Some(workspace) = bus.state.tree.workspace_of(container) else {
            return Ok(());
        };

        if floating {
            let placement = bus.state.tree.rect(container).unwrap_or_default();
            if let Some(kind) = bus.state.tree.kind_mut(container) {
                *kind = ContainerKind::FloatingWindow { window, placement };
            }
            bus.invoke(Command::MoveContainerWithinTree {
                container,
                target_parent: workspace,
                index: None,
                relayout: true,
            })?;
        } else {
            if let Some(kind) = bus.state.tree.kind_mut(container) {
                *kind = ContainerKind::TilingWindow(window);
            }
            let (target_parent, index) = insertion_point(bus, workspace, Some(container));
            let old_parent = bus.state.tree.parent(container);
            bus.invoke(Command::MoveContainerWithinTree {
                container,
                target_parent,
                index,
                relayout: true,
            })?;
            // A reorder under the same workspace does not hand out a share.
            if old_parent == Some(target_parent) {
                bus.layout.claim_share(&mut bus.state.tree, container);
                bus.layout.layout_workspace(&mut bus.state.tree, workspace);
            }
        }
        debug!(?container, floating, "Toggled floating");

        bus.state.mark_dirty(workspace);
        bus.invoke(Command::RedrawContainers)
    }
}
