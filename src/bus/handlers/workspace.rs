use tracing::{debug, info, trace};

use super::{expect_tag, insertion_point};
use crate::bus::{Bus, Command, CommandError, CommandResponse};
use crate::model::tree::{ContainerId, ContainerKind, ContainerTag};

pub struct WorkspaceCommandHandler;

impl WorkspaceCommandHandler {
    pub fn handle_move_focused_window_to_workspace(
        bus: &mut Bus,
        workspace_name: &str,
    ) -> CommandResponse {
        let containers = bus.state.containers();
        let Some(window) = containers.focused_window() else {
            trace!("Focused container is not a window");
            return Ok(());
        };
        if !containers.is_focus_synced() {
            debug!(?window, "Focus is not synced with the OS, ignoring move");
            return Ok(());
        }
        let Some(current) = bus.state.tree.workspace_of(window) else {
            return Ok(());
        };
        let current_name = bus.state.workspaces().name(current).unwrap_or_default().to_owned();

        let target = match bus.state.workspaces().active_by_name(workspace_name) {
            Some(target) => target,
            None => Self::activate_on_focused_monitor(bus, workspace_name)?,
        };
        if target == current {
            trace!(workspace = workspace_name, "Window is already on the target workspace");
            return Ok(());
        }

        if bus.state.monitors().has_dpi_difference(current, target)
            && let Some(state) =
                bus.state.tree.kind_mut(window).and_then(ContainerKind::window_mut)
        {
            state.has_pending_dpi_adjustment = true;
        }

        if bus.state.containers().is_floating(window) {
            Self::move_floating_window(bus, window, current, target)?;
        } else {
            Self::move_tiling_window(bus, window, target)?;
        }
        info!(?window, from = %current_name, to = workspace_name, "Moved window to workspace");

        bus.invoke(Command::FocusWorkspace { workspace: current_name })?;

        bus.state.mark_dirty(current);
        bus.state.mark_dirty(target);
        bus.invoke(Command::RedrawContainers)
    }

    fn move_floating_window(
        bus: &mut Bus,
        window: ContainerId,
        current: ContainerId,
        target: ContainerId,
    ) -> CommandResponse {
        let tree = &mut bus.state.tree;
        if tree.monitor_of(current) != tree.monitor_of(target)
            && let (Some(from), Some(to)) = (tree.rect(current), tree.rect(target))
            && let Some(ContainerKind::FloatingWindow { placement, .. }) = tree.kind_mut(window)
        {
            *placement = placement.remap_origin(&from, &to);
            let placement = *placement;
            tree.set_rect(window, placement);
            trace!(?window, ?placement, "Remapped floating placement");
        }
        bus.invoke(Command::MoveContainerWithinTree {
            container: window,
            target_parent: target,
            index: None,
            relayout: false,
        })
    }

    fn move_tiling_window(
        bus: &mut Bus,
        window: ContainerId,
        target: ContainerId,
    ) -> CommandResponse {
        let (target_parent, index) = insertion_point(bus, target, Some(window));
        bus.invoke(Command::MoveContainerWithinTree {
            container: window,
            target_parent,
            index,
            relayout: true,
        })
    }

    /// Attaches the inactive workspace called `name` to the focused monitor.
    fn activate_on_focused_monitor(
        bus: &mut Bus,
        name: &str,
    ) -> Result<ContainerId, CommandError> {
        let Some(workspace) = bus.state.workspaces().inactive_by_name(name) else {
            return Err(CommandError::WorkspaceNotFound(name.to_owned()));
        };
        let Some(monitor) = bus.state.monitors().focused_monitor() else {
            return Err(CommandError::NoMonitor);
        };
        bus.invoke(Command::AttachWorkspaceToMonitor { workspace, monitor })?;
        Ok(workspace)
    }

    pub fn handle_focus_workspace(bus: &mut Bus, workspace_name: &str) -> CommandResponse {
        let target = match bus.state.workspaces().active_by_name(workspace_name) {
            Some(target) => target,
            None => Self::activate_on_focused_monitor(bus, workspace_name)?,
        };
        let previous =
            bus.state.containers().focused().and_then(|id| bus.state.tree.workspace_of(id));
        let displayed_before =
            bus.state.tree.parent(target).and_then(|m| bus.state.workspaces().displayed_on(m));

        let focus_target = bus.state.containers().focus_target_within(target);
        bus.invoke(Command::SetFocusedDescendant { container: focus_target })?;

        if displayed_before != Some(target) {
            debug!(workspace = workspace_name, "Switching displayed workspace");
            if let Some(hidden) = displayed_before {
                bus.state.mark_dirty(hidden);
            }
            bus.state.mark_dirty(target);
        }

        if let Some(previous) = previous
            && previous != target
            && bus.state.tree.children(previous).is_empty()
            && bus.state.workspaces().is_active(previous)
            && !bus.state.workspaces().is_displayed(previous)
        {
            bus.invoke(Command::DetachWorkspaceFromMonitor { workspace: previous })?;
        }

        bus.invoke(Command::RedrawContainers)
    }

    pub fn handle_attach_workspace_to_monitor(
        bus: &mut Bus,
        workspace: ContainerId,
        monitor: ContainerId,
    ) -> CommandResponse {
        expect_tag(&bus.state.tree, workspace, ContainerTag::Workspace)?;
        expect_tag(&bus.state.tree, monitor, ContainerTag::Monitor)?;
        if bus.state.tree.parent(workspace) == Some(monitor) {
            return Ok(());
        }

        bus.state.tree.move_within(workspace, monitor, None)?;
        if let Some(area) = bus.state.monitors().working_area(monitor) {
            bus.state.tree.set_rect(workspace, area);
        }
        bus.layout.layout_workspace(&mut bus.state.tree, workspace);
        info!(
            workspace = bus.state.workspaces().name(workspace),
            monitor = bus.state.monitors().screen(monitor).map(|s| s.display_id.as_str()),
            "Activated workspace"
        );
        Ok(())
    }

    pub fn handle_detach_workspace_from_monitor(
        bus: &mut Bus,
        workspace: ContainerId,
    ) -> CommandResponse {
        expect_tag(&bus.state.tree, workspace, ContainerTag::Workspace)?;
        if let Some(focused) = bus.state.containers().focused()
            && bus.state.tree.is_self_or_ancestor(workspace, focused)
        {
            return Err(CommandError::WorkspaceHasFocus(workspace));
        }
        let Some(monitor) = bus.state.tree.parent(workspace) else {
            return Ok(());
        };
        let was_displayed = bus.state.workspaces().is_displayed(workspace);

        bus.state.tree.detach(workspace)?;
        if was_displayed {
            bus.state.mark_dirty(workspace);
            if let Some(next) = bus.state.workspaces().displayed_on(monitor) {
                bus.state.mark_dirty(next);
            }
        }
        info!(workspace = bus.state.workspaces().name(workspace), "Deactivated workspace");
        Ok(())
    }
}
