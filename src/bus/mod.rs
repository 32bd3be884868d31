//! Synchronous command dispatch.
//!
//! Every state change goes through [`Bus::invoke`]. Handlers may invoke further
//! commands on the same bus; those run to completion, redraws included, before
//! the calling handler resumes.

pub mod handlers;
pub mod record;
pub mod sink;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;
use tracing::{debug, error, instrument};

use self::handlers::{
    ContainerCommandHandler, MonitorCommandHandler, RedrawCommandHandler, WindowCommandHandler,
    WorkspaceCommandHandler,
};
use self::record::Record;
use self::sink::{RedrawBatch, RedrawSink};
use crate::common::config::Config;
use crate::layout_engine::LayoutEngine;
use crate::model::geometry::Rect;
use crate::model::tree::{ContainerId, ContainerTag, TreeError};
use crate::services::WmState;
use crate::sys::screen::ScreenInfo;
use crate::sys::window::WindowHandle;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Move the focused window to the workspace with this name, activating it
    /// on the focused monitor if needed.
    MoveFocusedWindowToWorkspace { workspace: String },
    FocusWorkspace { workspace: String },
    AttachWorkspaceToMonitor { workspace: ContainerId, monitor: ContainerId },
    DetachWorkspaceFromMonitor { workspace: ContainerId },
    MoveContainerWithinTree {
        container: ContainerId,
        target_parent: ContainerId,
        index: Option<usize>,
        relayout: bool,
    },
    SetFocusedDescendant { container: ContainerId },
    RedrawContainers,
    AddMonitor(ScreenInfo),
    /// Start managing a window. `floating` carries its placement when it
    /// should not be tiled.
    ManageWindow { handle: WindowHandle, floating: Option<Rect> },
    UnmanageWindow { handle: WindowHandle },
    /// The OS reported a new foreground window, or none.
    ForegroundChanged { handle: Option<WindowHandle> },
    SetWindowFloating { container: ContainerId, floating: bool },
}

impl Command {
    pub fn name(&self) -> &'static str { self.into() }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("no workspace named '{0}'")]
    WorkspaceNotFound(String),
    #[error("no managed window with handle {0}")]
    WindowNotFound(WindowHandle),
    #[error("window {0} is already managed")]
    WindowAlreadyManaged(WindowHandle),
    #[error("container {0:?} does not exist")]
    UnknownContainer(ContainerId),
    #[error("container {container:?} is not a {expected}")]
    WrongKind { container: ContainerId, expected: ContainerTag },
    #[error("no monitor is available")]
    NoMonitor,
    #[error("every configured workspace is already active")]
    NoInactiveWorkspace,
    #[error("monitor '{0}' is already managed")]
    MonitorExists(String),
    #[error("workspace {0:?} holds the focused container")]
    WorkspaceHasFocus(ContainerId),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

pub type CommandResponse = Result<(), CommandError>;

pub struct Bus {
    pub(crate) state: WmState,
    pub(crate) layout: LayoutEngine,
    sink: Box<dyn RedrawSink>,
    record: Record,
    depth: usize,
}

impl Bus {
    pub fn new(config: Config, sink: Box<dyn RedrawSink>) -> Self {
        let layout = LayoutEngine::new(config.gaps);
        Bus {
            state: WmState::new(config),
            layout,
            sink,
            record: Record::disabled(),
            depth: 0,
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    pub fn state(&self) -> &WmState { &self.state }

    pub fn record(&self) -> &Record { &self.record }

    pub fn record_mut(&mut self) -> &mut Record { &mut self.record }

    #[instrument(
        name = "bus::invoke",
        skip(self),
        fields(kind = command.name(), depth = self.depth)
    )]
    pub fn invoke(&mut self, command: Command) -> CommandResponse {
        self.record.on_command(self.depth, &command);
        self.depth += 1;
        let response = self.dispatch(command);
        self.depth -= 1;

        match &response {
            Ok(()) => {}
            Err(CommandError::Tree(err)) => error!(%err, "Rejected structural change"),
            Err(err) => debug!(%err, "Command failed"),
        }
        if self.depth == 0 {
            debug_assert_eq!(self.state.tree.validate(), Ok(()));
        }
        response
    }

    fn dispatch(&mut self, command: Command) -> CommandResponse {
        match command {
            Command::MoveFocusedWindowToWorkspace { workspace } => {
                WorkspaceCommandHandler::handle_move_focused_window_to_workspace(self, &workspace)
            }
            Command::FocusWorkspace { workspace } => {
                WorkspaceCommandHandler::handle_focus_workspace(self, &workspace)
            }
            Command::AttachWorkspaceToMonitor { workspace, monitor } => {
                WorkspaceCommandHandler::handle_attach_workspace_to_monitor(
                    self,
                    workspace,
                    monitor,
                )
            }
            Command::DetachWorkspaceFromMonitor { workspace } => {
                WorkspaceCommandHandler::handle_detach_workspace_from_monitor(self, workspace)
            }
            Command::MoveContainerWithinTree { container, target_parent, index, relayout } => {
                ContainerCommandHandler::handle_move_container_within_tree(
                    self,
                    container,
                    target_parent,
                    index,
                    relayout,
                )
            }
            Command::SetFocusedDescendant { container } => {
                ContainerCommandHandler::handle_set_focused_descendant(self, container)
            }
            Command::RedrawContainers => RedrawCommandHandler::handle_redraw_containers(self),
            Command::AddMonitor(info) => MonitorCommandHandler::handle_add_monitor(self, info),
            Command::ManageWindow { handle, floating } => {
                WindowCommandHandler::handle_manage_window(self, handle, floating)
            }
            Command::UnmanageWindow { handle } => {
                WindowCommandHandler::handle_unmanage_window(self, handle)
            }
            Command::ForegroundChanged { handle } => {
                WindowCommandHandler::handle_foreground_changed(self, handle)
            }
            Command::SetWindowFloating { container, floating } => {
                WindowCommandHandler::handle_set_window_floating(self, container, floating)
            }
        }
    }

    pub(crate) fn flush(&mut self, batch: RedrawBatch) { self.sink.apply(batch); }
}
