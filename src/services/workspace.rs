use crate::model::tree::{ContainerId, ContainerKind, ContainerTree};

/// Lookups over workspaces. A workspace is active while it is attached to a
/// monitor and inactive while it is a root of the tree.
pub struct WorkspaceService<'a> {
    tree: &'a ContainerTree,
}

impl<'a> WorkspaceService<'a> {
    pub(super) fn new(tree: &'a ContainerTree) -> Self { WorkspaceService { tree } }

    pub fn name(&self, workspace: ContainerId) -> Option<&'a str> {
        self.tree.kind(workspace)?.workspace_name()
    }

    pub fn is_active(&self, workspace: ContainerId) -> bool {
        self.tree
            .parent(workspace)
            .is_some_and(|p| self.tree.kind(p).is_some_and(ContainerKind::is_monitor))
    }

    /// Active workspaces in monitor order, then position on the monitor.
    pub fn active(&self) -> Vec<ContainerId> {
        self.tree
            .roots()
            .iter()
            .filter(|&&root| self.tree.kind(root).is_some_and(ContainerKind::is_monitor))
            .flat_map(|&monitor| self.tree.children(monitor).iter().copied())
            .collect()
    }

    pub fn inactive(&self) -> Vec<ContainerId> {
        self.tree
            .roots()
            .iter()
            .copied()
            .filter(|&root| self.tree.kind(root).is_some_and(ContainerKind::is_workspace))
            .collect()
    }

    pub fn active_by_name(&self, name: &str) -> Option<ContainerId> {
        self.active().into_iter().find(|&ws| self.name(ws) == Some(name))
    }

    pub fn inactive_by_name(&self, name: &str) -> Option<ContainerId> {
        self.inactive().into_iter().find(|&ws| self.name(ws) == Some(name))
    }

    pub fn by_name(&self, name: &str) -> Option<ContainerId> {
        self.active_by_name(name).or_else(|| self.inactive_by_name(name))
    }

    /// The workspace holding `id`, if any.
    pub fn workspace_of(&self, id: ContainerId) -> Option<ContainerId> {
        self.tree.workspace_of(id)
    }

    /// The workspace a monitor currently shows: the one focused most recently
    /// on it.
    pub fn displayed_on(&self, monitor: ContainerId) -> Option<ContainerId> {
        self.tree.get(monitor)?.focus_order().first().copied()
    }

    pub fn is_displayed(&self, workspace: ContainerId) -> bool {
        let monitor = self.tree.parent(workspace);
        monitor.and_then(|m| self.displayed_on(m)) == Some(workspace)
    }

    /// The container a new tiling window should be placed after: the most
    /// recently focused resizable descendant of `workspace`, skipping `except`.
    pub fn insertion_target(
        &self,
        workspace: ContainerId,
        except: Option<ContainerId>,
    ) -> Option<ContainerId> {
        self.tree.last_focused_descendant_where(workspace, |id, kind| {
            Some(id) != except && kind.is_resizable()
        })
    }

    pub fn window_count(&self, workspace: ContainerId) -> usize {
        self.tree
            .self_and_descendants(workspace)
            .into_iter()
            .filter(|&id| self.tree.kind(id).is_some_and(ContainerKind::is_window))
            .count()
    }
}
