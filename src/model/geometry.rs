use serde::{Deserialize, Serialize};

/// Integer rectangle in device coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> i32 { self.x + self.width }

    pub fn bottom(&self) -> i32 { self.y + self.height }

    /// Same size, new origin.
    pub fn translate_to(&self, x: i32, y: i32) -> Rect { Rect { x, y, ..*self } }

    /// Shrinks every edge by `amount`, never below zero size.
    pub fn inset(&self, amount: i32) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2 * amount).max(0),
            height: (self.height - 2 * amount).max(0),
        }
    }

    /// Re-expresses this rect's origin, taken relative to `from`, inside `to`.
    ///
    /// Each axis offset is scaled by `to_extent / from_extent` with truncating
    /// integer division. The size is left alone. An axis whose source extent is
    /// zero keeps its unscaled offset.
    pub fn remap_origin(&self, from: &Rect, to: &Rect) -> Rect {
        let x = to.x + scale_offset(self.x - from.x, to.width, from.width);
        let y = to.y + scale_offset(self.y - from.y, to.height, from.height);
        self.translate_to(x, y)
    }
}

fn scale_offset(offset: i32, target_extent: i32, source_extent: i32) -> i32 {
    if source_extent == 0 {
        return offset;
    }
    let scaled = i64::from(offset) * i64::from(target_extent) / i64::from(source_extent);
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
