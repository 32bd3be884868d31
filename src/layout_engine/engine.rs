use tracing::{debug, trace};

use crate::common::config::GapSettings;
use crate::model::geometry::Rect;
use crate::model::tree::{ContainerId, ContainerKind, ContainerTree, Orientation, TreeError};

/// Computes tiling geometry and keeps split size shares consistent.
///
/// Workspaces lay their resizable children out horizontally; splits use their
/// own orientation. Floating windows are never touched here.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    gaps: GapSettings,
}

impl LayoutEngine {
    pub fn new(gaps: GapSettings) -> Self { LayoutEngine { gaps } }

    /// Recomputes the rect of every tiling descendant of `workspace` from the
    /// workspace's own rect.
    pub fn layout_workspace(&self, tree: &mut ContainerTree, workspace: ContainerId) {
        let Some(rect) = tree.rect(workspace) else {
            return;
        };
        let area = rect.inset(self.gaps.outer_gap);
        trace!(?workspace, ?area, "Laying out workspace");
        self.layout_children(tree, workspace, area, Orientation::Horizontal);
    }

    fn layout_children(
        &self,
        tree: &mut ContainerTree,
        parent: ContainerId,
        area: Rect,
        orientation: Orientation,
    ) {
        let tiled: Vec<ContainerId> = tree
            .children(parent)
            .iter()
            .copied()
            .filter(|&child| tree.kind(child).is_some_and(ContainerKind::is_resizable))
            .collect();
        if tiled.is_empty() {
            return;
        }

        let extent = match orientation {
            Orientation::Horizontal => area.width,
            Orientation::Vertical => area.height,
        };
        let gap = self.gaps.inner_gap;
        let available = (extent - gap * (tiled.len() as i32 - 1)).max(0);
        let total: f64 = tiled.iter().map(|&c| tree.size_share(c).max(0.0)).sum();

        let mut offset = 0;
        for (i, &child) in tiled.iter().enumerate() {
            let size = if i + 1 == tiled.len() {
                available - offset
            } else if total > 0.0 {
                (available as f64 * tree.size_share(child).max(0.0) / total).round() as i32
            } else {
                available / tiled.len() as i32
            };
            let size = size.clamp(0, (available - offset).max(0));
            let gap_before = gap * i as i32;
            let rect = match orientation {
                Orientation::Horizontal => {
                    Rect::new(area.x + offset + gap_before, area.y, size, area.height)
                }
                Orientation::Vertical => {
                    Rect::new(area.x, area.y + offset + gap_before, area.width, size)
                }
            };
            offset += size;
            tree.set_rect(child, rect);

            if let Some(&ContainerKind::Split { orientation }) = tree.kind(child) {
                self.layout_children(tree, child, rect, orientation);
            }
        }
    }

    /// Gives a freshly attached resizable container an equal share among its
    /// resizable siblings, shrinking the siblings proportionally.
    pub fn claim_share(&self, tree: &mut ContainerTree, id: ContainerId) {
        let Some(parent) = tree.parent(id) else {
            return;
        };
        if !tree.kind(id).is_some_and(ContainerKind::is_resizable) {
            return;
        }
        let siblings = resizable_children(tree, parent, Some(id));
        let count = siblings.len() + 1;
        let claimed = 1.0 / count as f64;
        let sibling_total: f64 = siblings.iter().map(|&s| tree.size_share(s)).sum();
        for &sibling in &siblings {
            let share = if sibling_total > 0.0 {
                tree.size_share(sibling) / sibling_total * (1.0 - claimed)
            } else {
                (1.0 - claimed) / siblings.len() as f64
            };
            tree.set_size_share(sibling, share);
        }
        tree.set_size_share(id, claimed);
    }

    /// Renormalizes the resizable children of `parent` so their shares sum to
    /// one, handing out whatever a departed child left behind proportionally.
    pub fn release_share(&self, tree: &mut ContainerTree, parent: ContainerId) {
        let children = resizable_children(tree, parent, None);
        let total: f64 = children.iter().map(|&c| tree.size_share(c)).sum();
        for &child in &children {
            let share = if total > 0.0 {
                tree.size_share(child) / total
            } else {
                1.0 / children.len() as f64
            };
            tree.set_size_share(child, share);
        }
    }

    /// Removes a split left empty and flattens one left with a single child,
    /// walking upwards while that keeps producing degenerate splits.
    pub fn tidy_split(
        &self,
        tree: &mut ContainerTree,
        mut node: ContainerId,
    ) -> Result<(), TreeError> {
        loop {
            if !matches!(tree.kind(node), Some(ContainerKind::Split { .. })) {
                return Ok(());
            }
            let Some(parent) = tree.parent(node) else {
                return Ok(());
            };
            match tree.children(node).len() {
                0 => {
                    debug!(split = ?node, "Removing empty split");
                    tree.remove(node)?;
                    self.release_share(tree, parent);
                    node = parent;
                }
                1 => {
                    debug!(split = ?node, "Flattening single-child split");
                    tree.flatten(node)?;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }
}

fn resizable_children(
    tree: &ContainerTree,
    parent: ContainerId,
    except: Option<ContainerId>,
) -> Vec<ContainerId> {
    tree.children(parent)
        .iter()
        .copied()
        .filter(|&c| Some(c) != except && tree.kind(c).is_some_and(ContainerKind::is_resizable))
        .collect()
}
