pub mod focus;
pub mod geometry;
pub mod redraw;
pub mod server;
pub mod tree;

pub use focus::FocusState;
pub use geometry::Rect;
pub use redraw::PendingRedraws;
pub use tree::{ContainerId, ContainerKind, ContainerTag, ContainerTree, Orientation, TreeError};
