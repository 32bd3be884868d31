use super::WmState;
use crate::model::geometry::Rect;
use crate::model::tree::{ContainerId, ContainerKind, ContainerTree};
use crate::sys::screen::ScreenInfo;

pub struct MonitorService<'a> {
    state: &'a WmState,
}

impl<'a> MonitorService<'a> {
    pub(super) fn new(state: &'a WmState) -> Self { MonitorService { state } }

    fn tree(&self) -> &'a ContainerTree { &self.state.tree }

    pub fn all(&self) -> Vec<ContainerId> {
        self.tree()
            .roots()
            .iter()
            .copied()
            .filter(|&root| self.tree().kind(root).is_some_and(ContainerKind::is_monitor))
            .collect()
    }

    /// The monitor holding focus, falling back to the first monitor.
    pub fn focused_monitor(&self) -> Option<ContainerId> {
        self.state
            .containers()
            .focused()
            .and_then(|id| self.monitor_of(id))
            .or_else(|| self.all().first().copied())
    }

    pub fn monitor_of(&self, id: ContainerId) -> Option<ContainerId> { self.tree().monitor_of(id) }

    pub fn screen(&self, monitor: ContainerId) -> Option<&'a ScreenInfo> {
        self.tree().kind(monitor)?.screen()
    }

    /// Screen of the monitor holding `id`.
    pub fn screen_of(&self, id: ContainerId) -> Option<&'a ScreenInfo> {
        self.screen(self.monitor_of(id)?)
    }

    pub fn working_area(&self, monitor: ContainerId) -> Option<Rect> {
        self.screen(monitor).map(|s| s.working_area)
    }

    pub fn by_display_id(&self, display_id: &str) -> Option<ContainerId> {
        self.all()
            .into_iter()
            .find(|&m| self.screen(m).is_some_and(|s| s.display_id == display_id))
    }

    /// Whether the monitors holding `a` and `b` use different scale factors.
    /// False when either is not on a monitor.
    pub fn has_dpi_difference(&self, a: ContainerId, b: ContainerId) -> bool {
        match (self.screen_of(a), self.screen_of(b)) {
            (Some(a), Some(b)) => !a.same_scale_as(b),
            _ => false,
        }
    }
}
