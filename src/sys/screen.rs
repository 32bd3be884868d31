use serde::{Deserialize, Serialize};

use crate::model::geometry::Rect;

/// Geometry and density of one physical display as reported by the platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScreenInfo {
    pub display_id: String,
    pub frame: Rect,
    /// The frame minus reserved areas such as docks and bars.
    pub working_area: Rect,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

fn default_scale_factor() -> f64 { 1.0 }

impl ScreenInfo {
    pub fn new(display_id: impl Into<String>, frame: Rect, scale_factor: f64) -> Self {
        ScreenInfo {
            display_id: display_id.into(),
            frame,
            working_area: frame,
            scale_factor,
        }
    }

    pub fn with_working_area(mut self, working_area: Rect) -> Self {
        self.working_area = working_area;
        self
    }

    pub fn same_scale_as(&self, other: &ScreenInfo) -> bool {
        (self.scale_factor - other.scale_factor).abs() <= f64::EPSILON
    }
}
