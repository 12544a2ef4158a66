//! Hitscan attacks.
//!
//! A shot is traced through the BSP from the middle of the shooter. All line
//! and thing crossings in a subsector are gathered and handled nearest
//! first until a shootable thing inside the slope window is found, or a
//! wall stops the shot. With no thing hit, the first wall that blocks the
//! middle of the window is the impact.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::trace;
use math::{Angle, FRACUNIT, Fixed, Trace};

use crate::doom_def::{AIM_BOTTOM_SLOPE, AIM_TOP_SLOPE};
use crate::level::Level;
use crate::level::flags::LineDefFlags;
use crate::level::map_defs::Vertex;
use crate::thing::interact::Interactions;
use crate::thing::{MapObjFlag, ThingId};
use crate::utilities::{Intercept, InterceptKind, sight_cross_line};

/// Where a shot ended
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShotImpact {
    /// The thing struck, if any
    pub thing: Option<ThingId>,
    /// The first line that blocked the middle of the shot window
    pub line: Option<usize>,
    /// Slope to the middle of the visible part of `thing`
    pub slope: Fixed,
    /// Spot for a puff or blood, pulled back from the surface
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    /// Distance along the shot of the impact, `0..=FRACUNIT`
    pub frac: Fixed,
}

struct ShotTrace {
    shooter: ThingId,
    range: Fixed,
    trace: Trace,
    start: Vertex,
    end: Vertex,
    shoot_z: Fixed,
    top_slope: Fixed,
    bottom_slope: Fixed,
    mid_slope: Fixed,
    /// Trace direction has dx and dy of the same sign
    positive: bool,
    impact: ShotImpact,
    intercepts: Vec<Intercept>,
}

impl Level {
    /// Find the thing a shot along `angle` would hit within the view slopes.
    /// Returns the slope to it, zero for no target.
    ///
    /// Doom function name `P_AimLineAttack`
    pub fn aim_line_attack(
        &self,
        shooter: ThingId,
        angle: Angle,
        range: Fixed,
    ) -> (Fixed, Option<ThingId>) {
        let impact = self.shoot_trace(shooter, angle, range, AIM_TOP_SLOPE, AIM_BOTTOM_SLOPE);
        match impact.thing {
            Some(target) => (impact.slope, Some(target)),
            None => (Fixed::ZERO, None),
        }
    }

    /// Fire a shot. `None` for `slope` searches the whole view window,
    /// otherwise the shot is kept to the given slope. A thing that is hit
    /// takes `damage` and bleeds or puffs. A wall is puffed unless the shot
    /// went in to the sky.
    ///
    /// Doom function name `P_LineAttack`
    pub fn line_attack(
        &mut self,
        shooter: ThingId,
        angle: Angle,
        range: Fixed,
        slope: Option<Fixed>,
        damage: i32,
        hooks: &mut impl Interactions,
    ) -> ShotImpact {
        #[cfg(feature = "hprof")]
        profile!("line_attack");
        let (top, bottom) = match slope {
            Some(slope) => (slope + Fixed(1), slope - Fixed(1)),
            None => (AIM_TOP_SLOPE, AIM_BOTTOM_SLOPE),
        };
        let impact = self.shoot_trace(shooter, angle, range, top, bottom);
        let (x, y, z) = (impact.x, impact.y, impact.z);

        if let Some(target) = impact.thing {
            if self.things[target].has_flag(MapObjFlag::Noblood) {
                hooks.spawn_puff(self, x, y, z);
            } else {
                hooks.spawn_blood(self, x, y, z, damage);
            }
            hooks.damage(self, target, Some(shooter), Some(shooter), damage);
            return impact;
        }

        let Some(l) = impact.line else {
            return impact;
        };
        if self.map_data.linedefs()[l].special != 0 {
            hooks.shoot_special_line(self, l, shooter);
        }

        let line = &self.map_data.linedefs()[l];
        let front = &self.map_data.sectors()[line.frontsector];
        if self.map_data.is_sky(front.ceilingpic) {
            if z > front.ceilingheight {
                // don't shoot the sky
                return impact;
            }
            let back_sky = line
                .backsector
                .is_some_and(|b| self.map_data.is_sky(self.map_data.sectors()[b].ceilingpic));
            if back_sky {
                // sky hack wall
                return impact;
            }
        }
        hooks.spawn_puff(self, x, y, z);
        impact
    }

    fn shoot_trace(
        &self,
        shooter: ThingId,
        angle: Angle,
        range: Fixed,
        top_slope: Fixed,
        bottom_slope: Fixed,
    ) -> ShotImpact {
        let mut shot = self.start_shot(shooter, angle, range, top_slope, bottom_slope);
        let trace = shot.trace;
        let valid = self.next_valid_count();
        self.map_data
            .trace_subsectors(&trace, |s| self.shoot_cross_subsector(s, valid, &mut shot));

        let mut impact = shot.impact;
        if impact.thing.is_some() || impact.line.is_none() {
            return impact;
        }

        // position a bit closer
        let frac = impact.frac - Fixed::from_int(4).fixed_div(range);
        impact.x = shot.trace.x + shot.trace.dx.fixed_mul(frac);
        impact.y = shot.trace.y + shot.trace.dy.fixed_mul(frac);
        impact.z = shot.shoot_z + shot.mid_slope.fixed_mul(frac.fixed_mul(range));
        trace!("Shot from {:?} hit line {:?} at {}", shooter, impact.line, impact.frac);
        impact
    }

    fn start_shot(
        &self,
        shooter: ThingId,
        angle: Angle,
        range: Fixed,
        top_slope: Fixed,
        bottom_slope: Fixed,
    ) -> ShotTrace {
        let t1 = &self.things[shooter];
        let units = range.to_int();
        let (x2, y2) = (t1.x + angle.cos() * units, t1.y + angle.sin() * units);
        let trace = Trace::between(t1.x, t1.y, x2, y2);

        ShotTrace {
            shooter,
            range,
            trace,
            start: Vertex::new(t1.x, t1.y),
            end: Vertex::new(x2, y2),
            shoot_z: t1.z + (t1.height >> 1) + Fixed::from_int(8),
            top_slope,
            bottom_slope,
            mid_slope: Fixed((top_slope.0 >> 1) + (bottom_slope.0 >> 1)),
            positive: (trace.dx.0 ^ trace.dy.0) > 0,
            impact: ShotImpact::default(),
            intercepts: Vec::with_capacity(16),
        }
    }

    /// Gather and resolve the crossings of one subsector. False once the
    /// shot has stopped.
    fn shoot_cross_subsector(&self, s: usize, valid: u32, shot: &mut ShotTrace) -> bool {
        let subsector = &self.map_data.subsectors()[s];
        shot.intercepts.clear();

        for id in self.sector_things(subsector.sector) {
            let thing = &self.things[id];
            if thing.subsector != s {
                continue;
            }
            // corner to corner cross section facing the shot
            let r = thing.radius;
            let (tv1, tv2) = if shot.positive {
                (
                    Vertex::new(thing.x - r, thing.y + r),
                    Vertex::new(thing.x + r, thing.y - r),
                )
            } else {
                (
                    Vertex::new(thing.x - r, thing.y - r),
                    Vertex::new(thing.x + r, thing.y + r),
                )
            };
            if let Some(frac) = sight_cross_line(tv1, tv2, shot.start, shot.end) {
                push_intercept(&mut shot.intercepts, frac, InterceptKind::Thing(id));
            }
        }

        for seg in subsector.start_seg..subsector.start_seg + subsector.seg_count {
            let l = self.map_data.segments()[seg].linedef;
            let line = &self.map_data.linedefs()[l];
            if !line.mark_valid(valid) {
                continue;
            }
            if let Some(frac) = sight_cross_line(line.v1, line.v2, shot.start, shot.end) {
                push_intercept(&mut shot.intercepts, frac, InterceptKind::Line(l));
            }
        }

        self.resolve_intercepts(shot)
    }

    /// Handle the gathered crossings nearest first. The sort is stable so
    /// things come before lines at the same distance.
    fn resolve_intercepts(&self, shot: &mut ShotTrace) -> bool {
        shot.intercepts.sort();
        let intercepts = std::mem::take(&mut shot.intercepts);
        let mut go_on = true;
        for intercept in &intercepts {
            go_on = match intercept.kind {
                InterceptKind::Line(l) => self.shoot_line(l, intercept.frac, shot),
                InterceptKind::Thing(id) => self.shoot_thing(id, intercept.frac, shot),
            };
            if !go_on {
                break;
            }
        }
        shot.intercepts = intercepts;
        go_on
    }

    fn shoot_line(&self, l: usize, frac: Fixed, shot: &mut ShotTrace) -> bool {
        let line = &self.map_data.linedefs()[l];
        let back = match line.backsector {
            Some(back) if line.has_flag(LineDefFlags::TwoSided) => back,
            _ => {
                record_line(shot, l, frac);
                return false;
            }
        };

        let front = &self.map_data.sectors()[line.frontsector];
        let back = &self.map_data.sectors()[back];
        let open_top = front.ceilingheight.min(back.ceilingheight);
        let open_bottom = front.floorheight.max(back.floorheight);
        if open_bottom >= open_top {
            // closed door
            record_line(shot, l, frac);
            return false;
        }

        let dist = shot.range.fixed_mul(frac);
        if front.floorheight != back.floorheight {
            let slope = (open_bottom - shot.shoot_z).fixed_div(dist);
            if slope >= shot.mid_slope {
                record_line(shot, l, frac);
            }
            if slope > shot.bottom_slope {
                shot.bottom_slope = slope;
            }
        }
        if front.ceilingheight != back.ceilingheight {
            let slope = (open_top - shot.shoot_z).fixed_div(dist);
            if slope <= shot.mid_slope {
                record_line(shot, l, frac);
            }
            if slope < shot.top_slope {
                shot.top_slope = slope;
            }
        }

        shot.top_slope > shot.bottom_slope
    }

    fn shoot_thing(&self, id: ThingId, frac: Fixed, shot: &mut ShotTrace) -> bool {
        if id == shot.shooter {
            // can't shoot self
            return true;
        }
        let thing = &self.things[id];
        if !thing.has_flag(MapObjFlag::Shootable) {
            // corpse or something
            return true;
        }

        let dist = shot.range.fixed_mul(frac);
        let mut top = (thing.z + thing.height - shot.shoot_z).fixed_div(dist);
        if top < shot.bottom_slope {
            // shot over the thing
            return true;
        }
        let mut bottom = (thing.z - shot.shoot_z).fixed_div(dist);
        if bottom > shot.top_slope {
            // shot under the thing
            return true;
        }

        top = top.min(shot.top_slope);
        bottom = bottom.max(shot.bottom_slope);

        // shoot midway in the visible part of the thing
        let slope = Fixed((top.0 + bottom.0) / 2);
        let back = frac - Fixed::from_int(10).fixed_div(shot.range);
        shot.impact = ShotImpact {
            thing: Some(id),
            line: shot.impact.line,
            slope,
            x: shot.trace.x + shot.trace.dx.fixed_mul(back),
            y: shot.trace.y + shot.trace.dy.fixed_mul(back),
            z: shot.shoot_z + slope.fixed_mul(back.fixed_mul(shot.range)),
            frac,
        };
        false
    }
}

/// Keep crossings in `(0, 1]` of the shot
#[inline]
fn push_intercept(list: &mut Vec<Intercept>, frac: Fixed, kind: InterceptKind) {
    if frac.0 <= 0 || frac.0 > FRACUNIT {
        return;
    }
    list.push(Intercept { frac, kind });
}

/// Only the first blocking line is the impact
#[inline]
fn record_line(shot: &mut ShotTrace, l: usize, frac: Fixed) {
    if shot.impact.line.is_none() {
        shot.impact.line = Some(l);
        shot.impact.frac = frac;
    }
}

#[cfg(test)]
mod tests {
    use math::{Angle, FRACUNIT, Fixed};

    use crate::doom_def::{AIM_BOTTOM_SLOPE, AIM_TOP_SLOPE};
    use crate::level::tests::fixtures::{f, monster, walled_rooms};
    use crate::utilities::{Intercept, InterceptKind};

    #[test]
    fn nearest_wall_stops_before_farther_thing() {
        let mut level = walled_rooms();
        let shooter = level.spawn_thing(monster(128, 128));
        let target = level.spawn_thing(monster(512 - 64, 128));

        let mut shot = level.start_shot(
            shooter,
            Angle::new(0),
            Fixed::from_int(640),
            AIM_TOP_SLOPE,
            AIM_BOTTOM_SLOPE,
        );
        // farther first, the wall between the rooms is line 2
        shot.intercepts.push(Intercept {
            frac: Fixed(FRACUNIT * 3 / 5),
            kind: InterceptKind::Thing(target),
        });
        shot.intercepts.push(Intercept {
            frac: Fixed(FRACUNIT / 5),
            kind: InterceptKind::Line(2),
        });

        assert!(!level.resolve_intercepts(&mut shot));
        assert_eq!(shot.impact.line, Some(2));
        assert_eq!(shot.impact.frac, Fixed(FRACUNIT / 5));
        assert_eq!(shot.impact.thing, None);
    }

    #[test]
    fn thing_in_window_is_hit() {
        let mut level = walled_rooms();
        let shooter = level.spawn_thing(monster(64, 128));
        let target = level.spawn_thing(monster(192, 128));

        let mut shot = level.start_shot(
            shooter,
            Angle::new(0),
            Fixed::from_int(256),
            AIM_TOP_SLOPE,
            AIM_BOTTOM_SLOPE,
        );
        shot.intercepts.push(Intercept {
            frac: Fixed(FRACUNIT / 2),
            kind: InterceptKind::Thing(target),
        });
        assert!(!level.resolve_intercepts(&mut shot));
        assert_eq!(shot.impact.thing, Some(target));
        // slope to the middle of the target as seen from 36 units up
        assert!(shot.impact.slope < Fixed::ZERO);
        assert!(shot.impact.x > f(128) && shot.impact.x < f(192));
    }
}
