use crate::fixed_point::{FRACBITS, Fixed};

/// Used in path tracing for intercepts and as the partition line of a BSP
/// node. Is divline + trace types.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Trace {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

impl Trace {
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, dx: Fixed, dy: Fixed) -> Self {
        Self { x, y, dx, dy }
    }

    /// Trace from one point to another
    #[inline]
    pub fn between(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Self {
        Self {
            x: x1,
            y: y1,
            dx: x2 - x1,
            dy: y2 - y1,
        }
    }
}

/// Determine which side of the trace the point is on. `0` is the front,
/// `1` is the back. A point exactly on the infinite line is on the front.
///
/// Vertical and horizontal lines, and points where the sign of the cross
/// product terms differ, are answered without a multiply.
#[inline]
pub fn point_on_side(x: Fixed, y: Fixed, line: &Trace) -> usize {
    let dx = line.dx.0;
    let dy = line.dy.0;
    let x = x.0.wrapping_sub(line.x.0);

    if dx == 0 {
        if x == 0 || (x > 0) == (dy > 0) {
            return 0;
        }
        return 1;
    }

    let y = y.0.wrapping_sub(line.y.0);
    if dy == 0 {
        if y == 0 || (y > 0) != (dx > 0) {
            return 0;
        }
        return 1;
    }

    if (dy ^ dx ^ x ^ y) < 0 {
        if x == 0 && y == 0 {
            return 0;
        }
        if (dy ^ x) >= 0 {
            return 0;
        }
        return 1;
    }

    let left = (dy >> FRACBITS).wrapping_mul(x >> FRACBITS);
    let right = (dx >> FRACBITS).wrapping_mul(y >> FRACBITS);
    if right <= left {
        return 0;
    }
    1
}

/// Returns the fractional intercept point along the first trace, or `None`
/// if the two are parallel.
///
/// The lines can be pictured as `first` being an infinite plane, and `second`
/// being the line to check if intersected by the plane. Only the integer
/// parts of the deltas are used.
#[inline]
pub fn intercept_vector(first: &Trace, second: &Trace) -> Option<Fixed> {
    let dx2 = (second.dx.0 >> FRACBITS) as i64;
    let dy2 = (second.dy.0 >> FRACBITS) as i64;

    let den = dy2 * (first.dx.0 >> FRACBITS) as i64 - dx2 * (first.dy.0 >> FRACBITS) as i64;
    if den == 0 {
        return None;
    }
    let num = (second.x.0.wrapping_sub(first.x.0) >> FRACBITS) as i64 * dy2
        + (first.y.0.wrapping_sub(second.y.0) >> FRACBITS) as i64 * dx2;
    Some(Fixed(((num << FRACBITS) / den) as i32))
}
