use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque platform identifier of a live application window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub const fn new(raw: u64) -> Self { WindowHandle(raw) }

    pub fn as_u64(self) -> u64 { self.0 }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}
