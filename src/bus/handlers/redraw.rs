use tracing::{info, trace};

use crate::bus::sink::{Placement, RedrawBatch};
use crate::bus::{Bus, CommandResponse};
use crate::common::collections::HashSet;
use crate::model::tree::{ContainerId, ContainerKind};
use crate::services::WmState;

pub struct RedrawCommandHandler;

impl RedrawCommandHandler {
    /// Flushes every pending container to the sink in a single batch.
    pub fn handle_redraw_containers(bus: &mut Bus) -> CommandResponse {
        if bus.state.redraw.is_empty() {
            trace!("Nothing to redraw");
            return Ok(());
        }
        let dirty: Vec<ContainerId> =
            bus.state.redraw.take().into_iter().filter(|&id| bus.state.tree.contains(id)).collect();

        let mut workspaces = Vec::new();
        for &id in &dirty {
            let tree = &bus.state.tree;
            let found: Vec<ContainerId> = match tree.kind(id) {
                Some(ContainerKind::Monitor(_)) => tree.children(id).to_vec(),
                _ => tree.workspace_of(id).into_iter().collect(),
            };
            for ws in found {
                if !workspaces.contains(&ws) {
                    workspaces.push(ws);
                }
            }
        }
        for &ws in &workspaces {
            bus.layout.layout_workspace(&mut bus.state.tree, ws);
        }

        let mut seen = HashSet::default();
        let mut placements = Vec::new();
        for &id in &dirty {
            for node in bus.state.tree.self_and_descendants(id) {
                if seen.insert(node)
                    && let Some(placement) = placement_for(&bus.state, node)
                {
                    placements.push(placement);
                }
            }
        }

        for placement in placements.iter().filter(|p| p.dpi_scale.is_some()) {
            if let Some(window) =
                bus.state.tree.kind_mut(placement.container).and_then(ContainerKind::window_mut)
            {
                window.has_pending_dpi_adjustment = false;
            }
        }

        info!(containers = dirty.len(), placements = placements.len(), "Redrawing");
        bus.flush(RedrawBatch { placements });
        Ok(())
    }
}

fn placement_for(state: &WmState, id: ContainerId) -> Option<Placement> {
    let tree = &state.tree;
    let kind = tree.kind(id)?;
    let window = kind.window();
    let visible = match kind {
        ContainerKind::Monitor(_) => true,
        _ => tree.workspace_of(id).is_some_and(|ws| state.workspaces().is_displayed(ws)),
    };
    let dpi_scale = window
        .filter(|w| w.has_pending_dpi_adjustment)
        .and_then(|_| state.monitors().screen_of(id))
        .map(|screen| screen.scale_factor);
    Some(Placement {
        container: id,
        tag: kind.tag(),
        window: window.map(|w| w.handle),
        rect: tree.rect(id)?,
        visible,
        dpi_scale,
    })
}
