//! Many helper functions related to traversing the map, crossing or finding
//! lines.

use std::cmp::Ordering;

use math::{FRACBITS, Fixed};

use crate::level::map_data::MapData;
use crate::level::map_defs::{BBox, LineDef, SlopeType, Vertex};
use crate::thing::ThingId;

/// The vertical opening through a two sided line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PortalZ {
    /// The lowest ceiling of the portal line
    pub top_z: Fixed,
    /// The highest floor of the portal line
    pub bottom_z: Fixed,
    /// Range between `bottom_z` and `top_z`
    pub range: Fixed,
    /// The lowest floor of the portal line
    pub lowest_z: Fixed,
}

impl PortalZ {
    /// A one sided line has no opening, which is all zeros
    #[inline]
    pub fn new(line: &LineDef, map: &MapData) -> Self {
        let Some(back) = line.backsector else {
            return Self::default();
        };

        let front = &map.sectors()[line.frontsector];
        let back = &map.sectors()[back];

        let top_z = front.ceilingheight.min(back.ceilingheight);
        let (bottom_z, lowest_z) = if front.floorheight > back.floorheight {
            (front.floorheight, back.floorheight)
        } else {
            (back.floorheight, front.floorheight)
        };

        PortalZ {
            top_z,
            bottom_z,
            range: top_z - bottom_z,
            lowest_z,
        }
    }
}

/// Which side of the line the whole box is on, `None` if the line runs
/// through it
///
/// Doom function name `P_BoxOnLineSide`
#[inline]
pub fn box_on_line_side(tmbox: &BBox, ld: &LineDef) -> Option<usize> {
    let (p1, p2) = match ld.slopetype {
        SlopeType::Horizontal => {
            let mut p1 = (tmbox.top > ld.v1.y) as usize;
            let mut p2 = (tmbox.bottom > ld.v1.y) as usize;
            if ld.dx.is_negative() {
                p1 ^= 1;
                p2 ^= 1;
            }
            (p1, p2)
        }
        SlopeType::Vertical => {
            let mut p1 = (tmbox.right < ld.v1.x) as usize;
            let mut p2 = (tmbox.left < ld.v1.x) as usize;
            if ld.dy.is_negative() {
                p1 ^= 1;
                p2 ^= 1;
            }
            (p1, p2)
        }
        SlopeType::Positive => (
            ld.point_on_side(tmbox.left, tmbox.top),
            ld.point_on_side(tmbox.right, tmbox.bottom),
        ),
        SlopeType::Negative => (
            ld.point_on_side(tmbox.right, tmbox.top),
            ld.point_on_side(tmbox.left, tmbox.bottom),
        ),
    };

    if p1 == p2 { Some(p1) } else { None }
}

/// True if the line passes through the inside of the box. Boxes that only
/// touch the line's bounding box edge are not crossed. The side tests use
/// whole map units.
///
/// Doom function name `PM_BoxCrossLine`
pub fn bbox_crosses_line(tmbox: &BBox, ld: &LineDef) -> bool {
    if !tmbox.overlaps(&ld.bbox) {
        return false;
    }

    let (x1, x2) = if ld.slopetype == SlopeType::Positive {
        (tmbox.left, tmbox.right)
    } else {
        (tmbox.right, tmbox.left)
    };

    let ldx = ld.dx.to_int() as i64;
    let ldy = ld.dy.to_int() as i64;

    let dx1 = (x1 - ld.v1.x).to_int() as i64;
    let dy1 = (tmbox.top - ld.v1.y).to_int() as i64;
    let dx2 = (x2 - ld.v1.x).to_int() as i64;
    let dy2 = (tmbox.bottom - ld.v1.y).to_int() as i64;

    let side1 = ldy * dx1 < dy1 * ldx;
    let side2 = ldy * dx2 < dy2 * ldx;
    side1 != side2
}

/// Where a trace from `p3` to `p4` crosses the segment `p1, p2`, as a
/// fraction of the trace. `None` if the segment end points are both on the
/// same side of the trace or the two are parallel. Works in whole map units
/// so the fraction is coarse.
pub fn sight_cross_line(p1: Vertex, p2: Vertex, p3: Vertex, p4: Vertex) -> Option<Fixed> {
    let (p1x, p1y) = (p1.x.to_int() as i64, p1.y.to_int() as i64);
    let (p2x, p2y) = (p2.x.to_int() as i64, p2.y.to_int() as i64);
    let (p3x, p3y) = (p3.x.to_int() as i64, p3.y.to_int() as i64);
    let (p4x, p4y) = (p4.x.to_int() as i64, p4.y.to_int() as i64);

    let ndx = p4x - p3x;
    let ndy = p4y - p3y;

    let mut dx = p2x - p3x;
    let mut dy = p2y - p3y;
    let s1 = ndy * dx < dy * ndx;

    dx = p1x - p3x;
    dy = p1y - p3y;
    let s2 = ndy * dx < dy * ndx;

    if s1 == s2 {
        return None;
    }

    // normal to the segment
    let ndx = p1y - p2y;
    let ndy = p2x - p1x;

    let s1 = ndx * dx + ndy * dy;
    dx = p4x - p1x;
    dy = p4y - p1y;
    let s2 = ndx * dx + ndy * dy;

    let den = s1 + s2;
    if den == 0 {
        return None;
    }
    let frac = (s1 << FRACBITS) / den;
    Some(Fixed(frac.clamp(i32::MIN as i64, i32::MAX as i64) as i32))
}

/// Side of the line through `(x2, y2)` and `(x3, y3)` that `(x1, y1)` is on.
/// `true` is the back. Only used by special line detection after a slide.
#[inline]
pub fn point_on_side2(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed, x3: Fixed, y3: Fixed) -> bool {
    let a = (x1 - x2).fixed_mul(y3 - y2);
    let b = (y1 - y2).fixed_mul(x2 - x3);
    (a + b).is_negative()
}

/// Does the move from `(x1, y1)` to `(x2, y2)` cross the segment
#[inline]
pub fn move_crosses_line(ld: &LineDef, x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> bool {
    let (v1, v2) = (ld.v1, ld.v2);
    if point_on_side2(x1, y1, v1.x, v1.y, v2.x, v2.y)
        == point_on_side2(x2, y2, v1.x, v1.y, v2.x, v2.y)
    {
        return false;
    }
    point_on_side2(v1.x, v1.y, x1, y1, x2, y2) != point_on_side2(v2.x, v2.y, x1, y1, x2, y2)
}

/// What an intercept hit along a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptKind {
    Line(usize),
    Thing(ThingId),
}

/// A line or thing crossed by a trace at `frac` along it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intercept {
    pub frac: Fixed,
    pub kind: InterceptKind,
}

impl PartialOrd for Intercept {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Intercept {
    /// By distance only
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.frac.cmp(&other.frac)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{
        Intercept, InterceptKind, bbox_crosses_line, box_on_line_side, move_crosses_line,
        sight_cross_line,
    };
    use crate::level::map_defs::{BBox, LineDef, SlopeType, Vertex};
    use math::{FRACUNIT, Fixed, point_to_angle};

    fn line(x1: i32, y1: i32, x2: i32, y2: i32) -> LineDef {
        let v1 = Vertex::from_units(x1, y1);
        let v2 = Vertex::from_units(x2, y2);
        let dx = v2.x - v1.x;
        let dy = v2.y - v1.y;
        let slopetype = if dx == Fixed::ZERO {
            SlopeType::Vertical
        } else if dy == Fixed::ZERO {
            SlopeType::Horizontal
        } else if (dx.0 ^ dy.0) >= 0 {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        };
        LineDef {
            v1,
            v2,
            dx,
            dy,
            flags: 0,
            special: 0,
            tag: 0,
            front_sidedef: 0,
            back_sidedef: None,
            bbox: BBox::new(v1, v2),
            slopetype,
            frontsector: 0,
            backsector: None,
            fineangle: point_to_angle(Fixed::ZERO, Fixed::ZERO, dx, dy).fine(),
            validcount: Cell::new(0),
        }
    }

    fn f(v: i32) -> Fixed {
        Fixed::from_int(v)
    }

    #[test]
    fn box_line_sides() {
        let ld = line(0, -64, 0, 64);
        let east = BBox::around(f(32), f(0), f(16));
        let west = BBox::around(f(-32), f(0), f(16));
        let across = BBox::around(f(4), f(0), f(16));
        assert_eq!(box_on_line_side(&east, &ld), Some(0));
        assert_eq!(box_on_line_side(&west, &ld), Some(1));
        assert_eq!(box_on_line_side(&across, &ld), None);

        let diag = line(0, 0, 64, 64);
        assert_eq!(box_on_line_side(&BBox::around(f(48), f(8), f(4)), &diag), Some(0));
        assert_eq!(box_on_line_side(&BBox::around(f(32), f(32), f(4)), &diag), None);
    }

    #[test]
    fn box_crossing() {
        let ld = line(0, -64, 0, 64);
        assert!(bbox_crosses_line(&BBox::around(f(4), f(0), f(16)), &ld));
        assert!(!bbox_crosses_line(&BBox::around(f(32), f(0), f(16)), &ld));
        // beyond the end of the segment
        assert!(!bbox_crosses_line(&BBox::around(f(4), f(100), f(16)), &ld));

        let diag = line(0, 0, 64, 64);
        assert!(bbox_crosses_line(&BBox::around(f(32), f(32), f(8)), &diag));
        assert!(!bbox_crosses_line(&BBox::around(f(48), f(8), f(4)), &diag));
    }

    #[test]
    fn sight_crossing_fraction() {
        let mid = sight_cross_line(
            Vertex::from_units(64, -64),
            Vertex::from_units(64, 64),
            Vertex::from_units(0, 0),
            Vertex::from_units(256, 0),
        )
        .unwrap();
        assert_eq!(mid, Fixed(FRACUNIT / 4));

        // segment entirely to one side of the trace
        assert!(
            sight_cross_line(
                Vertex::from_units(64, 8),
                Vertex::from_units(64, 64),
                Vertex::from_units(0, 0),
                Vertex::from_units(256, 0),
            )
            .is_none()
        );
    }

    #[test]
    fn move_crossing() {
        let ld = line(0, -64, 0, 64);
        assert!(move_crosses_line(&ld, f(-8), f(0), f(8), f(0)));
        assert!(!move_crosses_line(&ld, f(8), f(0), f(24), f(0)));
        // passes the end of the line
        assert!(!move_crosses_line(&ld, f(-8), f(80), f(8), f(80)));
    }

    #[test]
    fn intercepts_sort_by_frac() {
        let mut list = vec![
            Intercept {
                frac: Fixed(FRACUNIT / 2),
                kind: InterceptKind::Line(1),
            },
            Intercept {
                frac: Fixed(FRACUNIT / 8),
                kind: InterceptKind::Line(2),
            },
        ];
        list.sort();
        assert_eq!(list[0].kind, InterceptKind::Line(2));
    }
}
