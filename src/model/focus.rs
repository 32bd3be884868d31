use crate::model::tree::ContainerId;

/// The engine's notion of focus, as opposed to what the OS reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    focused: Option<ContainerId>,
    synced: bool,
}

impl FocusState {
    pub fn focused(&self) -> Option<ContainerId> { self.focused }

    /// Whether the focused container matches the OS foreground window.
    pub fn is_synced(&self) -> bool { self.synced }

    /// Returns true if the focused container changed. Any change invalidates
    /// sync until the OS reports the new foreground.
    pub fn set_focused(&mut self, id: ContainerId) -> bool {
        if self.focused == Some(id) {
            return false;
        }
        self.focused = Some(id);
        self.synced = false;
        true
    }

    pub fn set_synced(&mut self, synced: bool) { self.synced = synced; }

    pub fn clear(&mut self) {
        self.focused = None;
        self.synced = false;
    }
}
