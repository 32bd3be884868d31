use tracing::{debug, trace};

use crate::bus::{Bus, CommandError, CommandResponse};
use crate::model::tree::{ContainerId, MoveOutcome};

pub struct ContainerCommandHandler;

impl ContainerCommandHandler {
    pub fn handle_move_container_within_tree(
        bus: &mut Bus,
        container: ContainerId,
        target_parent: ContainerId,
        index: Option<usize>,
        relayout: bool,
    ) -> CommandResponse {
        let tree = &mut bus.state.tree;
        let old_workspace = tree.workspace_of(container);

        let MoveOutcome::Moved { from } = tree.move_within(container, target_parent, index)? else {
            trace!(?container, "Move onto itself");
            return Ok(());
        };
        if !relayout {
            return Ok(());
        }

        let layout = &bus.layout;
        match from {
            Some(old) if old == target_parent => layout.release_share(tree, target_parent),
            from => {
                layout.claim_share(tree, container);
                if let Some(old) = from {
                    layout.release_share(tree, old);
                    layout.tidy_split(tree, old)?;
                }
            }
        }

        let new_workspace = tree.workspace_of(container);
        if let Some(workspace) = old_workspace {
            layout.layout_workspace(tree, workspace);
        }
        if let Some(workspace) = new_workspace
            && new_workspace != old_workspace
        {
            layout.layout_workspace(tree, workspace);
        }
        Ok(())
    }

    pub fn handle_set_focused_descendant(bus: &mut Bus, container: ContainerId) -> CommandResponse {
        if !bus.state.tree.contains(container) {
            return Err(CommandError::UnknownContainer(container));
        }
        bus.state.tree.bring_to_front(container);
        if bus.state.focus.set_focused(container) {
            debug!(focused = ?container, "Focus changed");
        }
        Ok(())
    }
}
