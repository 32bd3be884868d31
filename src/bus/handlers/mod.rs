mod container;
mod monitor;
mod redraw;
mod window;
mod workspace;

pub use container::ContainerCommandHandler;
pub use monitor::MonitorCommandHandler;
pub use redraw::RedrawCommandHandler;
pub use window::WindowCommandHandler;
pub use workspace::WorkspaceCommandHandler;

use crate::bus::{Bus, CommandError};
use crate::model::tree::{ContainerId, ContainerTag, ContainerTree};

/// Fails unless `id` exists and carries the `expected` tag.
fn expect_tag(
    tree: &ContainerTree,
    id: ContainerId,
    expected: ContainerTag,
) -> Result<(), CommandError> {
    match tree.kind(id) {
        None => Err(CommandError::UnknownContainer(id)),
        Some(kind) if kind.tag() == expected => Ok(()),
        Some(_) => Err(CommandError::WrongKind { container: id, expected }),
    }
}

/// Parent and index at which a tiling window enters `workspace`: right after
/// the insertion target, or appended to the workspace.
///
/// The index is the one `move_within` expects, i.e. counted after `except`
/// has been detached.
fn insertion_point(
    bus: &Bus,
    workspace: ContainerId,
    except: Option<ContainerId>,
) -> (ContainerId, Option<usize>) {
    let tree = &bus.state.tree;
    let Some(anchor) = bus.state.workspaces().insertion_target(workspace, except) else {
        return (workspace, None);
    };
    let parent = tree.parent(anchor).unwrap_or(workspace);
    let Some(mut index) = tree.index_of(anchor) else {
        return (parent, None);
    };
    if let Some(moving) = except
        && tree.parent(moving) == Some(parent)
        && tree.index_of(moving).is_some_and(|i| i < index)
    {
        index -= 1;
    }
    (parent, Some(index + 1))
}
