use tracing::{info, warn};

use crate::bus::{Bus, Command, CommandError, CommandResponse};
use crate::model::tree::ContainerKind;
use crate::sys::screen::ScreenInfo;

pub struct MonitorCommandHandler;

impl MonitorCommandHandler {
    /// Registers a display and shows the first inactive workspace on it.
    pub fn handle_add_monitor(bus: &mut Bus, info: ScreenInfo) -> CommandResponse {
        if bus.state.monitors().by_display_id(&info.display_id).is_some() {
            return Err(CommandError::MonitorExists(info.display_id));
        }
        let Some(&workspace) = bus.state.workspaces().inactive().first() else {
            return Err(CommandError::NoInactiveWorkspace);
        };

        info!(
            display = %info.display_id,
            frame = ?info.frame,
            scale = info.scale_factor,
            "Adding monitor"
        );
        let frame = info.frame;
        let monitor = bus.state.tree.insert(ContainerKind::Monitor(info), frame);
        if let Err(err) = bus.invoke(Command::AttachWorkspaceToMonitor { workspace, monitor }) {
            if let Err(cleanup) = bus.state.tree.remove(monitor) {
                warn!(?monitor, %cleanup, "Failed to drop monitor after attach failed");
            }
            return Err(err);
        }

        if bus.state.containers().focused().is_none() {
            bus.invoke(Command::SetFocusedDescendant { container: workspace })?;
            // Nothing is in the foreground yet, so there is nothing to disagree with.
            bus.state.focus.set_synced(true);
        }
        bus.state.mark_dirty(workspace);
        bus.invoke(Command::RedrawContainers)
    }
}
