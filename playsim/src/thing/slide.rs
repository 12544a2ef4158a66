//! Continuous sliding for players.
//!
//! The mover is a circle of at least `clip_radius`. Walls it can't pass and
//! solid things near the move are gathered once, then the destination is
//! pushed out of whichever obstacle needs the smallest correction until
//! nothing overlaps or the iteration cap is hit.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec2;
use log::trace;
use math::{Fixed, circle_circle_intersect, circle_point_intersect, project_vec2d};

use crate::level::Level;
use crate::level::flags::LineDefFlags;
use crate::level::map_defs::BBox;
use crate::thing::{MapObjFlag, ThingId};
use crate::utilities::{PortalZ, move_crosses_line};

/// Where a slide ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideResult {
    pub x: Fixed,
    pub y: Fixed,
    /// First special line the move from the old position crosses
    pub special_line: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Wall {
    a: Vec2,
    b: Vec2,
}

#[derive(Debug, Clone, Copy)]
struct Blocker {
    pos: Vec2,
    radius: f32,
}

impl Level {
    /// Resolve the thing's momentum against nearby walls and solid things.
    /// The thing's momentum is replaced with the resolved momentum, which is
    /// never longer than what was asked for. Nothing is moved.
    pub fn slide_move(&mut self, id: ThingId) -> SlideResult {
        #[cfg(feature = "hprof")]
        profile!("slide_move");
        let thing = &self.things[id];
        let (x, y) = (thing.x, thing.y);
        let (momx, momy) = (thing.momx, thing.momy);

        let origin = Vec2::new(x.to_f32(), y.to_f32());
        let mom = Vec2::new(momx.to_f32(), momy.to_f32());
        let radius = thing.radius.max(self.config.clip_radius());

        let mut bbox = BBox::around(x, y, radius);
        let end = BBox::around(x + momx, y + momy, radius);
        bbox.add_point(end.left, end.bottom);
        bbox.add_point(end.right, end.top);

        let (walls, blockers) = self.slide_obstacles(id, &bbox);
        let radius = radius.to_f32();

        let mut dest = origin + mom;
        let mut passes = 0;
        for _ in 0..self.config.slide_iterations {
            let mut best: Option<Vec2> = None;
            let mut keep = |c: Vec2| {
                if best.is_none_or(|b| c.length_squared() < b.length_squared()) {
                    best = Some(c);
                }
            };
            for wall in &walls {
                if let Some(c) = wall_correction(origin, dest, radius, wall) {
                    keep(c);
                }
            }
            for blocker in &blockers {
                if let Some(depth) = circle_circle_intersect(dest, radius, blocker.pos, blocker.radius)
                {
                    let mut away = (dest - blocker.pos).normalize_or_zero();
                    if away == Vec2::ZERO {
                        away = -mom.normalize_or_zero();
                    }
                    keep(away * depth);
                }
            }
            let Some(correction) = best else {
                break;
            };
            dest += correction;
            passes += 1;
        }

        let mut slid = dest - origin;
        let max = mom.length();
        if slid.length() > max {
            slid = slid.normalize_or_zero() * max;
        }
        let (new_momx, new_momy) = clamp_momentum(slid, momx, momy);
        trace!(
            "{:?} slid ({}, {}) -> ({}, {}) in {} passes",
            id, momx, momy, new_momx, new_momy, passes
        );

        let thing = &mut self.things[id];
        thing.momx = new_momx;
        thing.momy = new_momy;
        let (new_x, new_y) = (x + new_momx, y + new_momy);

        SlideResult {
            x: new_x,
            y: new_y,
            special_line: self.crossed_special_line(x, y, new_x, new_y),
        }
    }

    /// Walls blocking at the thing's height and things solid enough to
    /// slide against, near `bbox`
    fn slide_obstacles(&self, id: ThingId, bbox: &BBox) -> (Vec<Wall>, Vec<Blocker>) {
        let thing = &self.things[id];
        let step = self.config.step_height();
        let volatile = MapObjFlag::Countkill as u32
            | MapObjFlag::Missile as u32
            | MapObjFlag::Skullfly as u32;

        let mut walls = Vec::new();
        let mut blockers = Vec::new();
        let valid = self.next_valid_count();
        let lines = self.map_data.linedefs();
        let segments = self.map_data.segments();

        self.map_data.subsectors_in_box(bbox, |s| {
            let subsector = &self.map_data.subsectors()[s];
            for seg in &segments[subsector.start_seg..subsector.start_seg + subsector.seg_count] {
                let line = &lines[seg.linedef];
                if !line.mark_valid(valid) || !line.bbox.touches(bbox) {
                    continue;
                }
                let blocks = line.backsector.is_none()
                    || line.has_flag(LineDefFlags::Blocking)
                    || {
                        let portal = PortalZ::new(line, &self.map_data);
                        portal.bottom_z - thing.z > step || portal.range < thing.height
                    };
                if blocks {
                    walls.push(Wall {
                        a: Vec2::new(line.v1.x.to_f32(), line.v1.y.to_f32()),
                        b: Vec2::new(line.v2.x.to_f32(), line.v2.y.to_f32()),
                    });
                }
            }

            let sector = &self.map_data.sectors()[subsector.sector];
            if sector.validcount.get() == valid {
                return true;
            }
            sector.validcount.set(valid);
            for tid in self.sector_things(subsector.sector) {
                let other = &self.things[tid];
                if tid == id || !other.has_flag(MapObjFlag::Solid) || other.flags & volatile != 0 {
                    continue;
                }
                if !other.bbox().touches(bbox) {
                    continue;
                }
                blockers.push(Blocker {
                    pos: Vec2::new(other.x.to_f32(), other.y.to_f32()),
                    radius: other.radius.to_f32(),
                });
            }
            true
        });
        (walls, blockers)
    }

    /// First line with a special that the straight move crosses
    fn crossed_special_line(&self, x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Option<usize> {
        let mut bbox = BBox::empty();
        bbox.add_point(x1, y1);
        bbox.add_point(x2, y2);
        let range = self.map_data.blockmap().range(&bbox, Fixed::ZERO);

        let mut found = None;
        let valid = self.next_valid_count();
        self.blockmap_lines_iter(range, valid, |l, line| {
            if line.special == 0 || !line.bbox.touches(&bbox) {
                return true;
            }
            if move_crosses_line(line, x1, y1, x2, y2) {
                found = Some(l);
                return false;
            }
            true
        });
        found
    }
}

/// Smallest push that separates a circle at `dest` from the wall. A centre
/// that passed through the wall on the way is sent back to the side it
/// started on.
fn wall_correction(origin: Vec2, dest: Vec2, radius: f32, wall: &Wall) -> Option<Vec2> {
    let seg = wall.b - wall.a;
    let normal = seg.perp().normalize_or_zero();
    if normal == Vec2::ZERO {
        return None;
    }
    let from = (origin - wall.a).dot(normal);
    let to = (dest - wall.a).dot(normal);
    let back = if from >= 0.0 { normal } else { -normal };

    if (from >= 0.0) != (to >= 0.0) && segments_cross(origin, dest, wall.a, wall.b) {
        return Some(back * (radius + to.abs()));
    }

    let along = project_vec2d(dest - wall.a, seg);
    let closest = if along.dot(seg) < 0.0 {
        wall.a
    } else if along.length_squared() > seg.length_squared() {
        wall.b
    } else {
        wall.a + along
    };
    let depth = circle_point_intersect(dest, radius, closest)?;
    let mut away = (dest - closest).normalize_or_zero();
    if away == Vec2::ZERO {
        away = back;
    }
    Some(away * depth)
}

fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d = p2 - p1;
    let e = q2 - q1;
    let side = |o: Vec2, dir: Vec2, p: Vec2| dir.perp_dot(p - o);
    let s1 = side(p1, d, q1);
    let s2 = side(p1, d, q2);
    let s3 = side(q1, e, p1);
    let s4 = side(q1, e, p2);
    (s1 > 0.0) != (s2 > 0.0) && (s3 > 0.0) != (s4 > 0.0)
}

/// Back to fixed point, rounding toward zero until the momentum is no
/// longer than `(momx, momy)`
fn clamp_momentum(slid: Vec2, momx: Fixed, momy: Fixed) -> (Fixed, Fixed) {
    let limit = (momx.0 as i64).pow(2) + (momy.0 as i64).pow(2);
    let mut mx = Fixed::from_f32(slid.x).0 as i64;
    let mut my = Fixed::from_f32(slid.y).0 as i64;
    while mx * mx + my * my > limit {
        mx -= mx.signum();
        my -= my.signum();
    }
    (Fixed(mx as i32), Fixed(my as i32))
}
