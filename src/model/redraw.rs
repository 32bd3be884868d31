use crate::common::collections::HashSet;
use crate::model::tree::ContainerId;

/// Containers whose geometry must be pushed out by the next redraw pass.
///
/// Insertion order is kept so batches are deterministic; adding a container
/// twice has no further effect.
#[derive(Debug, Default, Clone)]
pub struct PendingRedraws {
    order: Vec<ContainerId>,
    members: HashSet<ContainerId>,
}

impl PendingRedraws {
    pub fn mark_dirty(&mut self, id: ContainerId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: ContainerId) -> bool { self.members.contains(&id) }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn iter(&self) -> impl Iterator<Item = ContainerId> + '_ { self.order.iter().copied() }

    /// Empties the set, returning its members in insertion order.
    pub fn take(&mut self) -> Vec<ContainerId> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }
}
