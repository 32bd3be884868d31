mod engine;

pub use engine::LayoutEngine;
