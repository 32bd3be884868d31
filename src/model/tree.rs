//! Arena-backed container tree.
//!
//! Every node lives in a [`SlotMap`] and is addressed by a [`ContainerId`].
//! Nodes store a handle to their parent and an ordered list of child handles,
//! so there are no owning references in both directions. A node's index among
//! its siblings is its position in the parent's child list and is therefore
//! always contiguous from zero.
//!
//! Each node also keeps a focus order over its children (most recently focused
//! first). It is a permutation of `children` at all times.

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use strum::EnumDiscriminants;
use thiserror::Error;
use tracing::trace;

use crate::model::geometry::Rect;
use crate::sys::screen::ScreenInfo;
use crate::sys::window::WindowHandle;

new_key_type! {
    pub struct ContainerId;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub handle: WindowHandle,
    /// Set when the window crossed onto a monitor with a different scale
    /// factor. Cleared by the redraw pass that rescales it.
    pub has_pending_dpi_adjustment: bool,
}

impl WindowState {
    pub fn new(handle: WindowHandle) -> Self {
        WindowState { handle, has_pending_dpi_adjustment: false }
    }
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ContainerTag), derive(Hash, strum::Display))]
pub enum ContainerKind {
    Monitor(ScreenInfo),
    Workspace { name: String },
    Split { orientation: Orientation },
    TilingWindow(WindowState),
    FloatingWindow { window: WindowState, placement: Rect },
}

impl ContainerKind {
    pub fn tag(&self) -> ContainerTag { ContainerTag::from(self) }

    /// Whether the node takes part in tiling layout.
    pub fn is_resizable(&self) -> bool {
        matches!(self, ContainerKind::Split { .. } | ContainerKind::TilingWindow(_))
    }

    pub fn is_window(&self) -> bool { self.window().is_some() }

    pub fn is_workspace(&self) -> bool { matches!(self, ContainerKind::Workspace { .. }) }

    pub fn is_monitor(&self) -> bool { matches!(self, ContainerKind::Monitor(_)) }

    pub fn window(&self) -> Option<&WindowState> {
        match self {
            ContainerKind::TilingWindow(window) => Some(window),
            ContainerKind::FloatingWindow { window, .. } => Some(window),
            _ => None,
        }
    }

    pub fn window_mut(&mut self) -> Option<&mut WindowState> {
        match self {
            ContainerKind::TilingWindow(window) => Some(window),
            ContainerKind::FloatingWindow { window, .. } => Some(window),
            _ => None,
        }
    }

    pub fn workspace_name(&self) -> Option<&str> {
        match self {
            ContainerKind::Workspace { name } => Some(name),
            _ => None,
        }
    }

    pub fn screen(&self) -> Option<&ScreenInfo> {
        match self {
            ContainerKind::Monitor(info) => Some(info),
            _ => None,
        }
    }

    fn accepts_child(&self, child: &ContainerKind) -> bool {
        match child {
            ContainerKind::Monitor(_) => false,
            ContainerKind::Workspace { .. } => self.is_monitor(),
            ContainerKind::FloatingWindow { .. } => self.is_workspace(),
            ContainerKind::Split { .. } | ContainerKind::TilingWindow(_) => {
                matches!(self, ContainerKind::Workspace { .. } | ContainerKind::Split { .. })
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("container {0:?} does not exist")]
    UnknownContainer(ContainerId),
    #[error("cannot move {container:?} into its own subtree under {target:?}")]
    CyclicMove {
        container: ContainerId,
        target: ContainerId,
    },
    #[error("a {child} cannot be placed under a {parent}")]
    InvalidParent { child: ContainerTag, parent: ContainerTag },
    #[error("container {0:?} already has a parent")]
    AlreadyAttached(ContainerId),
    #[error("tree invariant violated at {container:?}: {reason}")]
    Corrupt {
        container: ContainerId,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Container {
    kind: ContainerKind,
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    focus_order: Vec<ContainerId>,
    rect: Rect,
    size_share: f64,
}

impl Container {
    pub fn kind(&self) -> &ContainerKind { &self.kind }

    pub fn parent(&self) -> Option<ContainerId> { self.parent }

    pub fn children(&self) -> &[ContainerId] { &self.children }

    /// Children ordered from most to least recently focused.
    pub fn focus_order(&self) -> &[ContainerId] { &self.focus_order }

    pub fn rect(&self) -> Rect { self.rect }

    /// Fraction of the parent's tiling axis occupied by this node.
    pub fn size_share(&self) -> f64 { self.size_share }
}

/// Result of [`ContainerTree::move_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Unchanged,
    Moved { from: Option<ContainerId> },
}

#[derive(Debug, Default)]
pub struct ContainerTree {
    nodes: SlotMap<ContainerId, Container>,
    /// Parentless nodes in creation order: monitors and inactive workspaces,
    /// plus any node briefly detached during a move.
    roots: Vec<ContainerId>,
}

impl ContainerTree {
    pub fn new() -> Self { Self::default() }

    /// Adds a parentless node.
    pub fn insert(&mut self, kind: ContainerKind, rect: Rect) -> ContainerId {
        let id = self.nodes.insert(Container {
            kind,
            parent: None,
            children: Vec::new(),
            focus_order: Vec::new(),
            rect,
            size_share: 1.0,
        });
        self.roots.push(id);
        trace!(?id, "Inserted container");
        id
    }

    pub fn contains(&self, id: ContainerId) -> bool { self.nodes.contains_key(id) }

    pub fn get(&self, id: ContainerId) -> Option<&Container> { self.nodes.get(id) }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (ContainerId, &Container)> + '_ { self.nodes.iter() }

    pub fn roots(&self) -> &[ContainerId] { &self.roots }

    pub fn kind(&self, id: ContainerId) -> Option<&ContainerKind> {
        self.nodes.get(id).map(|c| &c.kind)
    }

    pub fn kind_mut(&mut self, id: ContainerId) -> Option<&mut ContainerKind> {
        self.nodes.get_mut(id).map(|c| &mut c.kind)
    }

    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> { self.nodes.get(id)?.parent }

    pub fn children(&self, id: ContainerId) -> &[ContainerId] {
        self.nodes.get(id).map(|c| c.children.as_slice()).unwrap_or_default()
    }

    pub fn index_of(&self, id: ContainerId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn rect(&self, id: ContainerId) -> Option<Rect> { self.nodes.get(id).map(|c| c.rect) }

    pub fn set_rect(&mut self, id: ContainerId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.rect = rect;
        }
    }

    pub fn size_share(&self, id: ContainerId) -> f64 {
        self.nodes.get(id).map(|c| c.size_share).unwrap_or(0.0)
    }

    pub fn set_size_share(&mut self, id: ContainerId, share: f64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.size_share = share;
        }
    }

    pub fn window_by_handle(&self, handle: WindowHandle) -> Option<ContainerId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.kind.window().is_some_and(|w| w.handle == handle))
            .map(|(id, _)| id)
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: ContainerId) -> impl Iterator<Item = ContainerId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    pub fn is_self_or_ancestor(&self, ancestor: ContainerId, id: ContainerId) -> bool {
        ancestor == id || self.ancestors(id).any(|node| node == ancestor)
    }

    /// The node and everything below it, in pre-order.
    pub fn self_and_descendants(&self, id: ContainerId) -> Vec<ContainerId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    pub fn nearest_where(
        &self,
        id: ContainerId,
        pred: impl Fn(&ContainerKind) -> bool,
    ) -> Option<ContainerId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| self.kind(node).is_some_and(&pred))
    }

    pub fn workspace_of(&self, id: ContainerId) -> Option<ContainerId> {
        self.nearest_where(id, ContainerKind::is_workspace)
    }

    pub fn monitor_of(&self, id: ContainerId) -> Option<ContainerId> {
        self.nearest_where(id, ContainerKind::is_monitor)
    }

    /// Follows the most recently focused child down to a leaf. `None` when the
    /// node has no children.
    pub fn last_focused_descendant(&self, id: ContainerId) -> Option<ContainerId> {
        let mut node = *self.nodes.get(id)?.focus_order.first()?;
        while let Some(&next) = self.nodes[node].focus_order.first() {
            node = next;
        }
        Some(node)
    }

    /// Depth-first search in focus order for the first strict descendant
    /// matching `pred`.
    pub fn last_focused_descendant_where(
        &self,
        id: ContainerId,
        pred: impl Fn(ContainerId, &ContainerKind) -> bool,
    ) -> Option<ContainerId> {
        let mut stack: Vec<ContainerId> =
            self.nodes.get(id)?.focus_order.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            let container = &self.nodes[node];
            if pred(node, &container.kind) {
                return Some(node);
            }
            stack.extend(container.focus_order.iter().rev());
        }
        None
    }

    /// Moves `id` and each of its ancestors to the front of their parent's
    /// focus order.
    pub fn bring_to_front(&mut self, id: ContainerId) {
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            let order = &mut self.nodes[parent].focus_order;
            if let Some(pos) = order.iter().position(|&n| n == node) {
                let moved = order.remove(pos);
                order.insert(0, moved);
            }
            node = parent;
        }
    }

    /// Attaches a parentless node under `parent`. The index is clamped to the
    /// number of children; `None` appends.
    pub fn attach(
        &mut self,
        id: ContainerId,
        parent: ContainerId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        self.check_placement(id, parent)?;
        if self.nodes[id].parent.is_some() {
            return Err(TreeError::AlreadyAttached(id));
        }
        self.link(id, parent, index, None);
        Ok(())
    }

    /// Detaches a node, making it a root. Returns its former parent.
    pub fn detach(&mut self, id: ContainerId) -> Result<Option<ContainerId>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::UnknownContainer(id));
        }
        Ok(self.unlink(id).map(|(parent, _)| parent))
    }

    /// Relocates `id` under `target` at `index` (interpreted after `id` has
    /// been detached, clamped) or at the end.
    ///
    /// The tree is left untouched when an error is returned.
    pub fn move_within(
        &mut self,
        id: ContainerId,
        target: ContainerId,
        index: Option<usize>,
    ) -> Result<MoveOutcome, TreeError> {
        if id == target {
            return Ok(MoveOutcome::Unchanged);
        }
        self.check_placement(id, target)?;
        if self.is_self_or_ancestor(id, target) {
            return Err(TreeError::CyclicMove { container: id, target });
        }

        let previous = self.unlink(id);
        let from = previous.map(|(parent, _)| parent);
        // A reorder among siblings keeps the node's focus rank.
        let focus_pos = previous.filter(|&(parent, _)| parent == target).map(|(_, pos)| pos);
        self.link(id, target, index, focus_pos);
        trace!(?id, ?from, ?target, ?index, "Moved container");
        Ok(MoveOutcome::Moved { from })
    }

    /// Replaces `id` in its parent with its only child, which inherits the
    /// position, focus rank and size share. `id` is removed.
    pub fn flatten(&mut self, id: ContainerId) -> Result<ContainerId, TreeError> {
        let node = self.nodes.get(id).ok_or(TreeError::UnknownContainer(id))?;
        let &[child] = node.children.as_slice() else {
            return Err(TreeError::Corrupt {
                container: id,
                reason: "only single-child containers can be flattened",
            });
        };
        let share = node.size_share;
        let Some(parent) = node.parent else {
            return Err(TreeError::Corrupt { container: id, reason: "cannot flatten a root" });
        };
        self.check_kinds(child, parent)?;

        self.unlink(child);
        self.remove_root(child);
        let parent_node = &mut self.nodes[parent];
        for slot in parent_node.children.iter_mut().chain(parent_node.focus_order.iter_mut()) {
            if *slot == id {
                *slot = child;
            }
        }
        let child_node = &mut self.nodes[child];
        child_node.parent = Some(parent);
        child_node.size_share = share;
        self.nodes.remove(id);
        trace!(?id, ?child, "Flattened container");
        Ok(child)
    }

    /// Removes a node and its whole subtree.
    pub fn remove(&mut self, id: ContainerId) -> Result<Vec<ContainerId>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::UnknownContainer(id));
        }
        self.unlink(id);
        self.remove_root(id);
        let removed = self.self_and_descendants(id);
        for &node in &removed {
            self.nodes.remove(node);
        }
        Ok(removed)
    }

    /// Checks every structural invariant of the arena.
    pub fn validate(&self) -> Result<(), TreeError> {
        for (id, node) in &self.nodes {
            match node.parent {
                None => {
                    if self.roots.iter().filter(|&&r| r == id).count() != 1 {
                        return Err(TreeError::Corrupt {
                            container: id,
                            reason: "root not listed once",
                        });
                    }
                }
                Some(parent) => {
                    let Some(parent_node) = self.nodes.get(parent) else {
                        return Err(TreeError::Corrupt { container: id, reason: "dangling parent" });
                    };
                    if parent_node.children.iter().filter(|&&c| c == id).count() != 1 {
                        return Err(TreeError::Corrupt {
                            container: id,
                            reason: "not listed exactly once by its parent",
                        });
                    }
                    if !parent_node.kind.accepts_child(&node.kind) {
                        return Err(TreeError::Corrupt {
                            container: id,
                            reason: "invalid parent kind",
                        });
                    }
                    if self.roots.contains(&id) {
                        return Err(TreeError::Corrupt {
                            container: id,
                            reason: "attached node listed as root",
                        });
                    }
                }
            }
            for &child in &node.children {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                    return Err(TreeError::Corrupt {
                        container: child,
                        reason: "child does not point back at parent",
                    });
                }
            }
            let mut by_position = node.children.clone();
            let mut by_focus = node.focus_order.clone();
            by_position.sort();
            by_focus.sort();
            if by_position != by_focus {
                return Err(TreeError::Corrupt {
                    container: id,
                    reason: "focus order is not a permutation of children",
                });
            }
        }
        for &root in &self.roots {
            if !self.contains(root) {
                return Err(TreeError::Corrupt { container: root, reason: "stale root entry" });
            }
        }
        Ok(())
    }

    fn check_placement(&self, id: ContainerId, parent: ContainerId) -> Result<(), TreeError> {
        if !self.contains(id) {
            return Err(TreeError::UnknownContainer(id));
        }
        if !self.contains(parent) {
            return Err(TreeError::UnknownContainer(parent));
        }
        self.check_kinds(id, parent)
    }

    fn check_kinds(&self, id: ContainerId, parent: ContainerId) -> Result<(), TreeError> {
        let child = &self.nodes[id].kind;
        let parent = &self.nodes[parent].kind;
        if parent.accepts_child(child) {
            Ok(())
        } else {
            Err(TreeError::InvalidParent { child: child.tag(), parent: parent.tag() })
        }
    }

    /// Removes `id` from its parent, returning the parent and the focus rank
    /// it held there. The node becomes a root.
    fn unlink(&mut self, id: ContainerId) -> Option<(ContainerId, usize)> {
        let parent = self.nodes[id].parent.take()?;
        let parent_node = &mut self.nodes[parent];
        parent_node.children.retain(|&c| c != id);
        let focus_pos = parent_node.focus_order.iter().position(|&c| c == id).unwrap_or(0);
        parent_node.focus_order.retain(|&c| c != id);
        self.roots.push(id);
        Some((parent, focus_pos))
    }

    fn link(
        &mut self,
        id: ContainerId,
        parent: ContainerId,
        index: Option<usize>,
        focus_pos: Option<usize>,
    ) {
        self.remove_root(id);
        let parent_node = &mut self.nodes[parent];
        let index = index.unwrap_or(parent_node.children.len()).min(parent_node.children.len());
        parent_node.children.insert(index, id);
        match focus_pos {
            Some(pos) => parent_node.focus_order.insert(pos.min(parent_node.focus_order.len()), id),
            None => parent_node.focus_order.push(id),
        }
        self.nodes[id].parent = Some(parent);
    }

    fn remove_root(&mut self, id: ContainerId) { self.roots.retain(|&r| r != id); }
}
