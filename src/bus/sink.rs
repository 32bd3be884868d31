//! The boundary where computed geometry leaves the engine.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::model::geometry::Rect;
use crate::model::tree::{ContainerId, ContainerTag};
use crate::sys::window::WindowHandle;

/// Final geometry for one container after a redraw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub container: ContainerId,
    pub tag: ContainerTag,
    pub window: Option<WindowHandle>,
    pub rect: Rect,
    /// False for containers on a workspace that is not currently displayed.
    pub visible: bool,
    /// Scale factor of the destination monitor when the window needs a DPI
    /// rescale.
    pub dpi_scale: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedrawBatch {
    pub placements: Vec<Placement>,
}

impl RedrawBatch {
    pub fn get(&self, container: ContainerId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.container == container)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Placement> + '_ {
        self.placements.iter().filter(|p| p.window.is_some())
    }

    pub fn of_tag(&self, tag: ContainerTag) -> impl Iterator<Item = &Placement> + '_ {
        self.placements.iter().filter(move |p| p.tag == tag)
    }
}

/// Applies batches to real windows. The engine does not learn whether that
/// succeeded.
pub trait RedrawSink {
    fn apply(&mut self, batch: RedrawBatch);
}

/// Writes every placement to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl RedrawSink for LogSink {
    fn apply(&mut self, batch: RedrawBatch) {
        debug!(count = batch.placements.len(), "Applying redraw batch");
        for placement in batch.windows() {
            trace!(
                window = ?placement.window,
                rect = ?placement.rect,
                visible = placement.visible,
                dpi_scale = ?placement.dpi_scale,
                "Place window"
            );
        }
    }
}

/// Keeps every batch it receives. Clones share the same storage, so a handle
/// can be kept after the sink is given to the bus.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    batches: Rc<RefCell<Vec<RedrawBatch>>>,
}

impl RecordingSink {
    pub fn new() -> Self { Self::default() }

    pub fn batches(&self) -> Vec<RedrawBatch> { self.batches.borrow().clone() }

    pub fn last(&self) -> Option<RedrawBatch> { self.batches.borrow().last().cloned() }

    pub fn clear(&self) { self.batches.borrow_mut().clear(); }
}

impl RedrawSink for RecordingSink {
    fn apply(&mut self, batch: RedrawBatch) { self.batches.borrow_mut().push(batch); }
}
