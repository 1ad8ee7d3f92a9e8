use serde::{Deserialize, Serialize};

/// One indexed unit rectangle in image-space pixels.
///
/// The index is assigned in strict generation order and is the key every
/// other component (masks, exclusions, verdicts, the persisted document)
/// uses to refer to this unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRect {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

/// Counts and spacings expanding a base unit into a full array.
///
/// A zero anywhere in the counts yields an empty grid. Block spacing is
/// applied per block column/row even when there is only one block; that is
/// the layout the persisted documents were authored against and must not be
/// "fixed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridParameters {
    pub units_x: u32,
    pub units_y: u32,
    pub blocks_x: u32,
    pub blocks_y: u32,
    pub unit_space_x: u32,
    pub unit_space_y: u32,
    pub block_space_x: u32,
    pub block_space_y: u32,
}

impl GridParameters {
    /// Number of unit rectangles this parameter set generates.
    pub fn unit_count(&self) -> usize {
        (self.units_x * self.units_y * self.blocks_x * self.blocks_y) as usize
    }
}

/// A user-authored region excluded from segmentation and detection,
/// in unit-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Exclusion {
    Rect { x: i32, y: i32, w: u32, h: u32 },
    Circle { cx: i32, cy: i32, r: u32 },
}

impl Exclusion {
    /// Translate the shape by `(dx, dy)` pixels.
    pub fn translated(self, dx: i32, dy: i32) -> Exclusion {
        match self {
            Exclusion::Rect { x, y, w, h } => Exclusion::Rect {
                x: x + dx,
                y: y + dy,
                w,
                h,
            },
            Exclusion::Circle { cx, cy, r } => Exclusion::Circle {
                cx: cx + dx,
                cy: cy + dy,
                r,
            },
        }
    }

    /// Clamp the shape so its geometry lies entirely within
    /// `[0, unit_w) x [0, unit_h)`.
    ///
    /// Returns `None` when nothing of the shape survives.
    pub fn clamped(self, unit_w: u32, unit_h: u32) -> Option<Exclusion> {
        if unit_w == 0 || unit_h == 0 {
            return None;
        }
        match self {
            Exclusion::Rect { x, y, w, h } => {
                let x0 = x.max(0);
                let y0 = y.max(0);
                let x1 = (x + w as i32).min(unit_w as i32);
                let y1 = (y + h as i32).min(unit_h as i32);
                if x1 <= x0 || y1 <= y0 {
                    return None;
                }
                Some(Exclusion::Rect {
                    x: x0,
                    y: y0,
                    w: (x1 - x0) as u32,
                    h: (y1 - y0) as u32,
                })
            }
            Exclusion::Circle { cx, cy, r } => {
                let cx = cx.clamp(0, unit_w as i32 - 1);
                let cy = cy.clamp(0, unit_h as i32 - 1);
                let max_r = cx
                    .min(cy)
                    .min(unit_w as i32 - 1 - cx)
                    .min(unit_h as i32 - 1 - cy);
                Some(Exclusion::Circle {
                    cx,
                    cy,
                    r: r.min(max_r.max(0) as u32),
                })
            }
        }
    }
}
