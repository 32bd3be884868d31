//! Facts supplied by the platform layer. Nothing in here talks to the OS; the
//! engine only consumes these values.

pub mod screen;
pub mod window;
