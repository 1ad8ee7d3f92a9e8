use crate::types::{GridParameters, UnitRect};

/// Expand a base unit rectangle into the full indexed array.
///
/// Iteration order is block-row, unit-row, block-col, unit-col; indices are
/// assigned in that exact order starting at 0. This order is load-bearing:
/// it fixes the index-to-position mapping used by masks, exclusions and the
/// persisted document.
pub fn generate(base: UnitRect, params: &GridParameters) -> Vec<UnitRect> {
    let GridParameters {
        units_x,
        units_y,
        blocks_x,
        blocks_y,
        unit_space_x,
        unit_space_y,
        block_space_x,
        block_space_y,
    } = *params;

    let mut grid = Vec::with_capacity(params.unit_count());
    if params.unit_count() == 0 {
        return grid;
    }

    let (uw, uh) = (base.w as i64, base.h as i64);
    let (usx, usy) = (unit_space_x as i64, unit_space_y as i64);
    let (bsx, bsy) = (block_space_x as i64, block_space_y as i64);
    // per-block stride, including trailing block spacing even for a single
    // block (preserved layout quirk, see GridParameters)
    let block_stride_x = units_x as i64 * uw + (units_x as i64 - 1) * usx + bsx;
    let block_stride_y = units_y as i64 * uh + (units_y as i64 - 1) * usy + bsy;

    let mut index = 0usize;
    for byi in 0..blocks_y as i64 {
        for uyi in 0..units_y as i64 {
            for bxi in 0..blocks_x as i64 {
                for uxi in 0..units_x as i64 {
                    let x = base.x as i64 + bxi * block_stride_x + uxi * (uw + usx);
                    let y = base.y as i64 + byi * block_stride_y + uyi * (uh + usy);
                    grid.push(UnitRect {
                        index,
                        x: x as i32,
                        y: y as i32,
                        w: base.w,
                        h: base.h,
                    });
                    index += 1;
                }
            }
        }
    }
    grid
}
