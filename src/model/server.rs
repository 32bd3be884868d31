//! Serializable views of engine state for queries and the CLI.

use serde::{Deserialize, Serialize};

use crate::model::geometry::Rect;
use crate::model::tree::{ContainerId, ContainerKind, Orientation};
use crate::services::WmState;
use crate::sys::window::WindowHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerData {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub rect: Rect,
    pub is_focused: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContainerData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceData {
    pub name: String,
    pub is_active: bool,
    pub is_displayed: bool,
    pub monitor: Option<String>,
    pub window_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorData {
    pub display_id: String,
    pub frame: Rect,
    pub working_area: Rect,
    pub scale_factor: f64,
    pub displayed_workspace: Option<String>,
    pub workspaces: Vec<String>,
}

/// The whole tree: monitors with their active workspaces, then the inactive
/// workspaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeData {
    pub monitors: Vec<ContainerData>,
    pub inactive_workspaces: Vec<ContainerData>,
    pub focus_synced: bool,
}

impl ContainerData {
    pub fn build(state: &WmState, id: ContainerId) -> Option<ContainerData> {
        let tree = &state.tree;
        let kind = tree.kind(id)?;
        let (name, orientation) = match kind {
            ContainerKind::Monitor(screen) => (Some(screen.display_id.clone()), None),
            ContainerKind::Workspace { name } => (Some(name.clone()), None),
            ContainerKind::Split { orientation } => (None, Some(*orientation)),
            ContainerKind::TilingWindow(_) | ContainerKind::FloatingWindow { .. } => (None, None),
        };
        Some(ContainerData {
            kind: kind.tag().to_string(),
            name,
            window: kind.window().map(|w| w.handle),
            orientation,
            rect: tree.rect(id)?,
            is_focused: state.containers().is_focused(id),
            children: tree
                .children(id)
                .iter()
                .filter_map(|&child| ContainerData::build(state, child))
                .collect(),
        })
    }

    pub fn to_ascii_tree(&self) -> ascii_tree::Tree {
        let mut label = self.kind.clone();
        if let Some(name) = &self.name {
            label.push_str(&format!(" '{name}'"));
        }
        if let Some(window) = self.window {
            label.push_str(&format!(" {window}"));
        }
        if let Some(orientation) = self.orientation {
            label.push_str(&format!(" {orientation:?}"));
        }
        let r = self.rect;
        label.push_str(&format!(" [{} {} {}x{}]", r.x, r.y, r.width, r.height));
        if self.is_focused {
            label.push_str(" *");
        }
        if self.children.is_empty() {
            ascii_tree::Tree::Leaf(vec![label])
        } else {
            ascii_tree::Tree::Node(label, self.children.iter().map(Self::to_ascii_tree).collect())
        }
    }
}

impl TreeData {
    pub fn build(state: &WmState) -> TreeData {
        let workspaces = state.workspaces();
        TreeData {
            monitors: state
                .monitors()
                .all()
                .into_iter()
                .filter_map(|m| ContainerData::build(state, m))
                .collect(),
            inactive_workspaces: workspaces
                .inactive()
                .into_iter()
                .filter_map(|ws| ContainerData::build(state, ws))
                .collect(),
            focus_synced: state.focus.is_synced(),
        }
    }

    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let roots = self.monitors.iter().chain(&self.inactive_workspaces);
        let children = roots.map(ContainerData::to_ascii_tree).collect();
        let tree = ascii_tree::Tree::Node("root".into(), children);
        ascii_tree::write_tree(&mut out, &tree)?;
        Ok(out)
    }
}

pub fn workspaces(state: &WmState) -> Vec<WorkspaceData> {
    let service = state.workspaces();
    service
        .active()
        .into_iter()
        .chain(service.inactive())
        .filter_map(|ws| {
            Some(WorkspaceData {
                name: service.name(ws)?.to_owned(),
                is_active: service.is_active(ws),
                is_displayed: service.is_displayed(ws),
                monitor: state.monitors().screen_of(ws).map(|s| s.display_id.clone()),
                window_count: service.window_count(ws),
            })
        })
        .collect()
}

pub fn monitors(state: &WmState) -> Vec<MonitorData> {
    let service = state.monitors();
    let workspaces = state.workspaces();
    service
        .all()
        .into_iter()
        .filter_map(|monitor| {
            let screen = service.screen(monitor)?;
            Some(MonitorData {
                display_id: screen.display_id.clone(),
                frame: screen.frame,
                working_area: screen.working_area,
                scale_factor: screen.scale_factor,
                displayed_workspace: workspaces
                    .displayed_on(monitor)
                    .and_then(|ws| workspaces.name(ws))
                    .map(str::to_owned),
                workspaces: state
                    .tree
                    .children(monitor)
                    .iter()
                    .filter_map(|&ws| workspaces.name(ws).map(str::to_owned))
                    .collect(),
            })
        })
        .collect()
}
