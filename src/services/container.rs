use super::WmState;
use crate::model::tree::{ContainerId, ContainerKind, ContainerTree};
use crate::sys::window::WindowHandle;

pub struct ContainerService<'a> {
    state: &'a WmState,
}

impl<'a> ContainerService<'a> {
    pub(super) fn new(state: &'a WmState) -> Self { ContainerService { state } }

    fn tree(&self) -> &'a ContainerTree { &self.state.tree }

    pub fn focused(&self) -> Option<ContainerId> {
        self.state.focus.focused().filter(|&id| self.tree().contains(id))
    }

    pub fn is_focus_synced(&self) -> bool { self.state.focus.is_synced() }

    /// The focused container, if it is a window.
    pub fn focused_window(&self) -> Option<ContainerId> {
        self.focused().filter(|&id| self.tree().kind(id).is_some_and(ContainerKind::is_window))
    }

    pub fn is_focused(&self, id: ContainerId) -> bool { self.focused() == Some(id) }

    pub fn by_handle(&self, handle: WindowHandle) -> Option<ContainerId> {
        self.tree().window_by_handle(handle)
    }

    pub fn is_floating(&self, id: ContainerId) -> bool {
        matches!(self.tree().kind(id), Some(ContainerKind::FloatingWindow { .. }))
    }

    /// Where focus lands inside `id` when it is entered: its most recently
    /// focused leaf, or the container itself when it is empty.
    pub fn focus_target_within(&self, id: ContainerId) -> ContainerId {
        self.tree().last_focused_descendant(id).unwrap_or(id)
    }
}
