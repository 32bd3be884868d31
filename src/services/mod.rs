//! Queries over engine state, grouped by the kind of container they concern.
//!
//! Handlers mutate [`WmState`] directly and use the services to look things up.

pub mod container;
pub mod monitor;
pub mod workspace;

pub use container::ContainerService;
pub use monitor::MonitorService;
pub use workspace::WorkspaceService;

use crate::common::config::Config;
use crate::model::focus::FocusState;
use crate::model::geometry::Rect;
use crate::model::redraw::PendingRedraws;
use crate::model::tree::{ContainerId, ContainerKind, ContainerTree};

/// Everything a command handler may read or change.
pub struct WmState {
    pub tree: ContainerTree,
    pub focus: FocusState,
    pub redraw: PendingRedraws,
    pub config: Config,
}

impl WmState {
    /// Creates one inactive workspace per configured name. Nothing is
    /// displayed until a monitor is added.
    pub fn new(config: Config) -> Self {
        let mut tree = ContainerTree::new();
        for workspace in &config.workspaces {
            tree.insert(ContainerKind::Workspace { name: workspace.name.clone() }, Rect::default());
        }
        WmState {
            tree,
            focus: FocusState::default(),
            redraw: PendingRedraws::default(),
            config,
        }
    }

    pub fn containers(&self) -> ContainerService<'_> { ContainerService::new(self) }

    pub fn workspaces(&self) -> WorkspaceService<'_> { WorkspaceService::new(&self.tree) }

    pub fn monitors(&self) -> MonitorService<'_> { MonitorService::new(self) }

    pub fn mark_dirty(&mut self, id: ContainerId) {
        if self.tree.contains(id) {
            self.redraw.mark_dirty(id);
        }
    }
}
