//! Movement, collision handling.
//!
//! Position checks are pure reads of the level: a `PositionCheck` collects
//! the bounds and side channel results, and `try_move` acts on them.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::{debug, trace};
use math::Fixed;

use crate::doom_def::{FLOATSPEED, FRICTION, GRAVITY, STOPSPEED};
use crate::level::Level;
use crate::level::flags::LineDefFlags;
use crate::level::map_defs::{BBox, LineDef};
use crate::thing::interact::Interactions;
use crate::thing::{MapObjFlag, MapObject, ThingId};
use crate::utilities::{PortalZ, bbox_crosses_line};

/// The result of checking a thing at a position
#[derive(Debug, Clone, Default)]
pub struct PositionCheck {
    /// Highest floor contacted
    pub floorz: Fixed,
    /// Lowest ceiling contacted
    pub ceilingz: Fixed,
    /// Lowest floor contacted, monsters won't move to a dropoff
    pub dropoffz: Fixed,
    /// Subsector of the checked position
    pub subsector: usize,
    /// The move would be ok if the thing were within `floorz..ceilingz`
    pub float_ok: bool,
    /// A closed door or lift that blocked, might be opened
    pub block_line: Option<usize>,
    /// The line that set `ceilingz`
    pub ceiling_line: Option<usize>,
    /// A skull or missile target, or a special to pick up
    pub move_thing: Option<ThingId>,
    /// Contacted lines that carry a special
    pub spec_hits: Vec<usize>,
}

/// The mover and where it is being tested
struct CheckQuery<'a> {
    id: ThingId,
    mover: &'a MapObject,
    /// Kind of the mover's target, for missiles
    target_kind: Option<u32>,
    x: Fixed,
    y: Fixed,
    bbox: BBox,
}

impl Level {
    /// Find the floor, ceiling and dropoff a thing would have at `x, y` and
    /// whether any wall or thing blocks it there. Nothing is modified.
    ///
    /// Doom function name `P_CheckPosition`
    pub fn check_position(&self, id: ThingId, x: Fixed, y: Fixed, ctrl: &mut PositionCheck) -> bool {
        #[cfg(feature = "hprof")]
        profile!("check_position");
        let mover = &self.things[id];

        ctrl.subsector = self.map_data.point_in_subsector(x, y);
        let sector = &self.map_data.sectors()[self.map_data.subsectors()[ctrl.subsector].sector];
        // The base floor / ceiling is from the subsector that contains the
        // point. Any contacted lines the step closer together will adjust them.
        ctrl.floorz = sector.floorheight;
        ctrl.dropoffz = sector.floorheight;
        ctrl.ceilingz = sector.ceilingheight;
        ctrl.float_ok = false;
        ctrl.block_line = None;
        ctrl.ceiling_line = None;
        ctrl.move_thing = None;
        ctrl.spec_hits.clear();

        let valid = self.next_valid_count();

        if mover.has_flag(MapObjFlag::Noclip) {
            return true;
        }

        let query = CheckQuery {
            id,
            mover,
            target_kind: mover
                .target
                .and_then(|t| self.things.get(t))
                .map(|t| t.kind),
            x,
            y,
            bbox: BBox::around(x, y, mover.radius),
        };

        // Things are grouped in to blocks by their origin and can overhang
        // adjacent blocks by up to the largest radius
        let blockmap = self.map_data.blockmap();
        let range = blockmap.range(&query.bbox, self.config.max_radius());
        if !self.blockmap_things_iter(range, |tid, thing| {
            self.pit_check_thing(&query, tid, thing, ctrl)
        }) {
            return false;
        }

        let range = blockmap.range(&query.bbox, Fixed::ZERO);
        self.blockmap_lines_iter(range, valid, |l, line| {
            if !bbox_crosses_line(&query.bbox, line) {
                return true;
            }
            self.pit_check_line(&query, l, line, ctrl)
        })
    }

    /// PIT_CheckLine. Adjusts the bounds as lines are contacted, returns
    /// false if the line blocks.
    fn pit_check_line(
        &self,
        query: &CheckQuery,
        l: usize,
        line: &LineDef,
        ctrl: &mut PositionCheck,
    ) -> bool {
        let Some(back) = line.backsector else {
            // one sided line
            return false;
        };

        if !query.mover.has_flag(MapObjFlag::Missile) {
            if line.has_flag(LineDefFlags::Blocking) {
                // explicitly blocking everything
                return false;
            }
            if !query.mover.player && line.has_flag(LineDefFlags::BlockMonsters) {
                // block monsters only
                return false;
            }
        }

        let front = &self.map_data.sectors()[line.frontsector];
        let back = &self.map_data.sectors()[back];
        if front.ceilingheight == front.floorheight || back.ceilingheight == back.floorheight {
            // probably a closed door
            ctrl.block_line = Some(l);
            return false;
        }

        let portal = PortalZ::new(line, &self.map_data);
        if portal.top_z < ctrl.ceilingz {
            ctrl.ceilingz = portal.top_z;
            ctrl.ceiling_line = Some(l);
        }
        if portal.bottom_z > ctrl.floorz {
            ctrl.floorz = portal.bottom_z;
        }
        if portal.lowest_z < ctrl.dropoffz {
            ctrl.dropoffz = portal.lowest_z;
        }

        if line.special != 0 {
            ctrl.spec_hits.push(l);
        }
        true
    }

    /// PIT_CheckThing. Returns false if the thing blocks or was struck.
    fn pit_check_thing(
        &self,
        query: &CheckQuery,
        tid: ThingId,
        thing: &MapObject,
        ctrl: &mut PositionCheck,
    ) -> bool {
        let solid_mask =
            MapObjFlag::Solid as u32 | MapObjFlag::Special as u32 | MapObjFlag::Shootable as u32;
        if thing.flags & solid_mask == 0 {
            return true;
        }

        let mover = query.mover;
        let blockdist = thing.radius + mover.radius;
        if (thing.x - query.x).abs() >= blockdist || (thing.y - query.y).abs() >= blockdist {
            // didn't hit it
            return true;
        }

        if tid == query.id {
            // don't clip against self
            return true;
        }

        let solid = thing.has_flag(MapObjFlag::Solid);

        // check for skulls slamming into things
        if mover.has_flag(MapObjFlag::Skullfly) {
            ctrl.move_thing = Some(tid);
            return false;
        }

        // missiles can hit other things
        if mover.has_flag(MapObjFlag::Missile) {
            if mover.z > thing.z + thing.height {
                // overhead
                return true;
            }
            if mover.z + mover.height < thing.z {
                // underneath
                return true;
            }
            if query.target_kind == Some(thing.kind) {
                // don't hit same species as originator
                if Some(tid) == mover.target {
                    return true;
                }
                if !thing.player {
                    // explode, but do no damage. Let players missile other
                    // players
                    return false;
                }
            }
            if !thing.has_flag(MapObjFlag::Shootable) {
                // didn't do any damage
                return !solid;
            }
            // damage / explode
            ctrl.move_thing = Some(tid);
            return false;
        }

        // check for special pickup
        if thing.has_flag(MapObjFlag::Special) && mover.has_flag(MapObjFlag::Pickup) {
            ctrl.move_thing = Some(tid);
        }
        !solid
    }

    /// Attempt to move to a new position, crossing special lines unless
    /// `Teleport` or `Noclip` is set. A blocked move leaves the thing where
    /// it was. A struck thing is acted on whether or not the move succeeded.
    ///
    /// Doom function name `P_TryMove`
    pub fn try_move(&mut self, id: ThingId, x: Fixed, y: Fixed, hooks: &mut impl Interactions) -> bool {
        let mut ctrl = PositionCheck::default();
        self.try_move_with(id, x, y, &mut ctrl, true, hooks)
    }

    /// `try_move` that keeps the position check for the caller
    pub fn try_move_with(
        &mut self,
        id: ThingId,
        x: Fixed,
        y: Fixed,
        ctrl: &mut PositionCheck,
        cross_specials: bool,
        hooks: &mut impl Interactions,
    ) -> bool {
        let mut ok = self.check_position(id, x, y, ctrl);
        let thing = &self.things[id];
        let (old_x, old_y) = (thing.x, thing.y);

        if ok && !thing.has_flag(MapObjFlag::Noclip) {
            ok = self.move_fits(thing, ctrl);
        }

        if ok {
            self.unset_thing_position(id);
            let thing = &mut self.things[id];
            thing.floorz = ctrl.floorz;
            thing.ceilingz = ctrl.ceilingz;
            thing.x = x;
            thing.y = y;
            self.set_thing_position(id);

            let flags = self.things[id].flags;
            if cross_specials
                && flags & (MapObjFlag::Teleport as u32 | MapObjFlag::Noclip as u32) == 0
            {
                self.cross_spec_hits(id, &ctrl.spec_hits, old_x, old_y, hooks);
            }
        } else {
            trace!("{:?} blocked moving to ({}, {})", id, x, y);
        }

        if let Some(hit) = ctrl.move_thing {
            self.hit_move_thing(id, hit, hooks);
        }
        ok
    }

    /// Height rules for a move that found no blocking line or thing
    fn move_fits(&self, thing: &MapObject, ctrl: &mut PositionCheck) -> bool {
        let step = self.config.step_height();
        if ctrl.ceilingz - ctrl.floorz < thing.height {
            // doesn't fit
            return false;
        }
        ctrl.float_ok = true;
        let teleport = thing.has_flag(MapObjFlag::Teleport);
        if !teleport && ctrl.ceilingz - thing.z < thing.height {
            // mobj must lower itself to fit
            return false;
        }
        if !teleport && ctrl.floorz - thing.z > step {
            // too big a step up
            return false;
        }
        let floats = thing.flags & (MapObjFlag::Dropoff as u32 | MapObjFlag::Float as u32) != 0;
        if !floats && ctrl.floorz - ctrl.dropoffz > step {
            // don't stand over a dropoff
            return false;
        }
        true
    }

    /// Report every contacted special line the thing ended up on the other
    /// side of
    fn cross_spec_hits(
        &mut self,
        id: ThingId,
        spec_hits: &[usize],
        old_x: Fixed,
        old_y: Fixed,
        hooks: &mut impl Interactions,
    ) {
        for &l in spec_hits.iter().rev() {
            let Some(thing) = self.things.get(id) else {
                return;
            };
            let line = &self.map_data.linedefs()[l];
            let side = line.point_on_side(thing.x, thing.y);
            let old_side = line.point_on_side(old_x, old_y);
            if side != old_side {
                hooks.cross_special_line(self, l, side, id);
            }
        }
    }

    /// Missile and skull damage, or a pickup
    fn hit_move_thing(&mut self, id: ThingId, hit: ThingId, hooks: &mut impl Interactions) {
        let Some(thing) = self.things.get(id) else {
            return;
        };
        if !self.things.contains(hit) {
            return;
        }
        let (flags, damage, target) = (thing.flags, thing.damage, thing.target);

        if flags & MapObjFlag::Missile as u32 != 0 {
            // missile bash in to a monster
            let damage = ((self.rnd.p_random() & 7) + 1) * damage;
            hooks.damage(self, hit, Some(id), target, damage);
        } else if flags & MapObjFlag::Skullfly as u32 != 0 {
            let damage = ((self.rnd.p_random() & 7) + 1) * damage;
            hooks.damage(self, hit, Some(id), Some(id), damage);
            self.skull_slam(id, hooks);
        } else {
            hooks.touch_special(self, hit, id);
        }
    }

    /// Stop a flying skull
    fn skull_slam(&mut self, id: ThingId, hooks: &mut impl Interactions) {
        let Some(thing) = self.things.get_mut(id) else {
            return;
        };
        thing.clear_flag(MapObjFlag::Skullfly);
        thing.momx = Fixed::ZERO;
        thing.momy = Fixed::ZERO;
        thing.momz = Fixed::ZERO;
        hooks.skull_slammed(self, id);
    }

    /// Apply horizontal momentum. Players slide, everything else moves in
    /// chunks no larger than `max_move` and stops on the first blocked
    /// chunk.
    ///
    /// Doom function name `P_XYMovement`
    pub fn xy_movement(&mut self, id: ThingId, hooks: &mut impl Interactions) {
        #[cfg(feature = "hprof")]
        profile!("xy_movement");
        let thing = &self.things[id];
        if thing.momx == Fixed::ZERO && thing.momy == Fixed::ZERO {
            return;
        }
        if thing.player {
            self.player_move(id, hooks);
            return;
        }

        let (momx, momy) = (thing.momx, thing.momy);
        // a mutated config may have lost the positive cap
        let max = self.config.max_move().max(Fixed::ONE);
        let mut steps = 1;
        while (momx / steps).abs() > max || (momy / steps).abs() > max {
            steps *= 2;
        }
        let (step_x, step_y) = (momx / steps, momy / steps);

        let mut ctrl = PositionCheck::default();
        for i in 0..steps {
            let thing = &self.things[id];
            // the last chunk takes the rounding remainder
            let (dx, dy) = if i == steps - 1 {
                (momx - step_x * (steps - 1), momy - step_y * (steps - 1))
            } else {
                (step_x, step_y)
            };
            let (x, y) = (thing.x + dx, thing.y + dy);
            if !self.try_move_with(id, x, y, &mut ctrl, true, hooks) {
                self.blocked_move(id, &ctrl, hooks);
                return;
            }
            if !self.things.contains(id) {
                return;
            }
        }

        let thing = &self.things[id];
        if thing.flags & (MapObjFlag::Missile as u32 | MapObjFlag::Skullfly as u32) != 0 {
            // no friction for missiles ever
            return;
        }
        if !self.on_ground(thing) {
            return;
        }

        apply_friction(&mut self.things[id]);
    }

    /// No friction when airborne, or for a corpse hanging off a step
    fn on_ground(&self, thing: &MapObject) -> bool {
        if thing.z > thing.floorz {
            return false;
        }
        if thing.has_flag(MapObjFlag::Corpse) {
            let sector = self.map_data.subsectors()[thing.subsector].sector;
            if thing.floorz != self.map_data.sectors()[sector].floorheight {
                return false;
            }
        }
        true
    }

    fn blocked_move(&mut self, id: ThingId, ctrl: &PositionCheck, hooks: &mut impl Interactions) {
        let Some(thing) = self.things.get(id) else {
            return;
        };

        if thing.has_flag(MapObjFlag::Skullfly) {
            self.skull_slam(id, hooks);
            return;
        }

        if thing.has_flag(MapObjFlag::Missile) {
            // missiles vanish in to a sky ceiling
            let sky = ctrl
                .ceiling_line
                .and_then(|l| self.map_data.linedefs()[l].backsector)
                .is_some_and(|s| self.map_data.is_sky(self.map_data.sectors()[s].ceilingpic));
            if sky {
                debug!("Missile {:?} left through the sky", id);
                self.remove_thing(id);
                return;
            }
            hooks.explode_missile(self, id, ctrl.move_thing);
            return;
        }

        let thing = &mut self.things[id];
        thing.momx = Fixed::ZERO;
        thing.momy = Fixed::ZERO;
    }

    /// Slide along walls and things, falling back to stepping one axis at a
    /// time if the slide result is blocked. A special line crossed by the
    /// slide is reported after the move.
    pub fn player_move(&mut self, id: ThingId, hooks: &mut impl Interactions) {
        let thing = &self.things[id];
        let (x, y) = (thing.x, thing.y);
        // the slide rewrites momentum, stepping goes by what was asked for
        let (momx, momy) = (thing.momx, thing.momy);

        let (try_x, try_y, special) = if thing.has_flag(MapObjFlag::Noclip) {
            (x + thing.momx, y + thing.momy, None)
        } else {
            let slide = self.slide_move(id);
            (slide.x, slide.y, slide.special_line)
        };

        let mut ctrl = PositionCheck::default();
        let moved = (try_x != x || try_y != y)
            && self.try_move_with(id, try_x, try_y, &mut ctrl, false, hooks);

        if !moved {
            self.stair_step(id, momx, momy, hooks);
        }

        if let Some(line) = special {
            if let Some(thing) = self.things.get(id) {
                let side = self.map_data.linedefs()[line].point_on_side(thing.x, thing.y);
                hooks.cross_special_line(self, line, side, id);
            }
        }

        self.player_friction(id);
    }

    /// Try the Y momentum alone then the X momentum alone, each capped at
    /// `max_move`. The axis that moved keeps its momentum, the other stops.
    fn stair_step(&mut self, id: ThingId, momx: Fixed, momy: Fixed, hooks: &mut impl Interactions) {
        let max = self.config.max_move().max(Fixed::ONE);
        let (momx, momy) = (momx.clamp(-max, max), momy.clamp(-max, max));
        let Some(thing) = self.things.get(id) else {
            return;
        };
        let (x, y) = (thing.x, thing.y);

        let mut ctrl = PositionCheck::default();
        if self.try_move_with(id, x, y + momy, &mut ctrl, false, hooks) {
            if let Some(t) = self.things.get_mut(id) {
                t.momx = Fixed::ZERO;
                t.momy = momy;
            }
        } else if self.try_move_with(id, x + momx, y, &mut ctrl, false, hooks) {
            if let Some(t) = self.things.get_mut(id) {
                t.momx = momx;
                t.momy = Fixed::ZERO;
            }
        } else if let Some(t) = self.things.get_mut(id) {
            t.momx = Fixed::ZERO;
            t.momy = Fixed::ZERO;
        }
    }

    fn player_friction(&mut self, id: ThingId) {
        let Some(thing) = self.things.get(id) else {
            return;
        };
        if !self.on_ground(thing) {
            return;
        }
        apply_friction(&mut self.things[id]);
    }

    /// Apply vertical momentum, gravity and floating, clipping to the cached
    /// floor and ceiling. Missiles explode on contact.
    ///
    /// Doom function name `P_ZMovement`
    pub fn z_movement(&mut self, id: ThingId, hooks: &mut impl Interactions) {
        let target = {
            let thing = &self.things[id];
            let floats = thing.has_flag(MapObjFlag::Float)
                && thing.flags & (MapObjFlag::Skullfly as u32 | MapObjFlag::Infloat as u32) == 0;
            thing
                .target
                .filter(|_| floats)
                .and_then(|t| self.things.get(t))
                .map(|t| (t.x, t.y, t.z))
        };

        let thing = &mut self.things[id];
        thing.z += thing.momz;

        // float down towards target if too close
        if let Some((tx, ty, tz)) = target {
            let dist = math::approx_distance(tx - thing.x, ty - thing.y);
            let delta = (tz + (thing.height >> 1) - thing.z) * 3;
            if delta < Fixed::ZERO && dist < -delta {
                thing.z -= FLOATSPEED;
            } else if delta > Fixed::ZERO && dist < delta {
                thing.z += FLOATSPEED;
            }
        }

        let missile = thing.has_flag(MapObjFlag::Missile);
        let skull = thing.has_flag(MapObjFlag::Skullfly);
        if thing.z <= thing.floorz {
            // hit the floor
            if skull {
                // the skull slammed in to something
                thing.momz = -thing.momz;
            }
            if thing.momz < Fixed::ZERO {
                thing.momz = Fixed::ZERO;
            }
            thing.z = thing.floorz;
            if missile {
                hooks.explode_missile(self, id, None);
                return;
            }
        } else if !thing.has_flag(MapObjFlag::Nogravity) {
            if thing.momz == Fixed::ZERO {
                thing.momz = -GRAVITY * 2;
            } else {
                thing.momz -= GRAVITY;
            }
        }

        if thing.z + thing.height > thing.ceilingz {
            // hit the ceiling
            if thing.momz > Fixed::ZERO {
                thing.momz = Fixed::ZERO;
            }
            if skull {
                thing.momz = -thing.momz;
            }
            thing.z = thing.ceilingz - thing.height;
            if missile {
                hooks.explode_missile(self, id, None);
            }
        }
    }
}

/// Slow a thing on the ground, stopping it outright below `STOPSPEED`
fn apply_friction(thing: &mut MapObject) {
    if thing.momx.abs() < STOPSPEED && thing.momy.abs() < STOPSPEED {
        thing.momx = Fixed::ZERO;
        thing.momy = Fixed::ZERO;
    } else {
        thing.momx = Fixed((thing.momx.0 >> 8) * (FRICTION.0 >> 8));
        thing.momy = Fixed((thing.momy.0 >> 8) * (FRICTION.0 >> 8));
    }
}

#[cfg(test)]
mod tests {
    use super::PositionCheck;
    use crate::level::map_data::{LineDesc, MapBuilder, SectorDesc, SegDesc};
    use crate::level::map_defs::SideDef;
    use crate::thing::interact::NoInteractions;
    use crate::thing::{MapObjFlag, MapObject};
    use crate::{Level, SimConfig};
    use math::Fixed;

    fn f(v: i32) -> Fixed {
        Fixed::from_int(v)
    }

    /// A closed 512 unit square room, one subsector
    fn room() -> Level {
        let mut b = MapBuilder::new("room");
        let s = b.sector(SectorDesc::new(0, 128));
        let side = b.sidedef(SideDef {
            sector: s,
            ..Default::default()
        });
        let v = [
            b.vertex(f(0), f(0)),
            b.vertex(f(0), f(512)),
            b.vertex(f(512), f(512)),
            b.vertex(f(512), f(0)),
        ];
        for i in 0..4 {
            let l = b.linedef(LineDesc {
                v1: v[i],
                v2: v[(i + 1) % 4],
                front: side,
                ..Default::default()
            });
            b.segment(SegDesc {
                v1: v[i],
                v2: v[(i + 1) % 4],
                linedef: l,
                ..Default::default()
            });
        }
        b.subsector(0, 4);
        Level::new(b.build().unwrap(), SimConfig::default())
    }

    fn actor(x: i32, y: i32) -> MapObject {
        MapObject::new(
            f(x),
            f(y),
            crate::doom_def::ONFLOORZ,
            f(16),
            f(56),
            MapObjFlag::Solid as u32 | MapObjFlag::Shootable as u32,
        )
    }

    #[test]
    fn walls_block_position() {
        let mut level = room();
        let id = level.spawn_thing(actor(100, 100));
        let mut ctrl = PositionCheck::default();
        assert!(level.check_position(id, f(256), f(256), &mut ctrl));
        assert_eq!(ctrl.floorz, f(0));
        assert_eq!(ctrl.ceilingz, f(128));
        assert!(!level.check_position(id, f(8), f(256), &mut ctrl));
    }

    #[test]
    fn things_block_each_other() {
        let mut level = room();
        let a = level.spawn_thing(actor(100, 100));
        let b = level.spawn_thing(actor(200, 100));
        let mut ctrl = PositionCheck::default();
        assert!(!level.check_position(a, f(170), f(100), &mut ctrl));
        assert!(level.check_position(a, f(168), f(100), &mut ctrl));
        // corpses are not solid
        level.thing_mut(b).clear_flag(MapObjFlag::Solid);
        level.thing_mut(b).clear_flag(MapObjFlag::Shootable);
        assert!(level.check_position(a, f(190), f(100), &mut ctrl));
    }

    #[test]
    fn chunked_move_stops_at_wall() {
        let mut level = room();
        let id = level.spawn_thing(actor(100, 256));
        level.thing_mut(id).momx = f(-40);
        level.xy_movement(id, &mut NoInteractions);
        let t = level.thing(id);
        // four chunks of 10, all clear of the wall
        assert_eq!(t.x, f(60));
        level.thing_mut(id).momx = f(-60);
        level.xy_movement(id, &mut NoInteractions);
        let t = level.thing(id);
        assert!(t.x >= f(16));
        assert_eq!(t.momx, Fixed::ZERO);
    }

    #[test]
    fn friction_and_stop_speed() {
        let mut level = room();
        let id = level.spawn_thing(actor(256, 256));
        level.thing_mut(id).momx = f(8);
        level.xy_movement(id, &mut NoInteractions);
        let t = level.thing(id);
        assert_eq!(t.x, f(264));
        assert!(t.momx < f(8) && t.momx > Fixed::ZERO);

        level.thing_mut(id).momx = Fixed(0x800);
        level.xy_movement(id, &mut NoInteractions);
        assert_eq!(level.thing(id).momx, Fixed::ZERO);
    }

    #[test]
    fn gravity_and_floor() {
        let mut level = room();
        let id = level.spawn_thing(actor(256, 256));
        level.thing_mut(id).z = f(10);
        level.z_movement(id, &mut NoInteractions);
        assert_eq!(level.thing(id).momz, f(-2));
        level.z_movement(id, &mut NoInteractions);
        assert_eq!(level.thing(id).z, f(8));
        assert_eq!(level.thing(id).momz, f(-3));
        for _ in 0..4 {
            level.z_movement(id, &mut NoInteractions);
        }
        assert_eq!(level.thing(id).z, Fixed::ZERO);
        assert_eq!(level.thing(id).momz, Fixed::ZERO);
    }

    #[test]
    fn ceiling_clips() {
        let mut level = room();
        let id = level.spawn_thing(actor(256, 256));
        let t = level.thing_mut(id);
        t.set_flag(MapObjFlag::Nogravity);
        t.momz = f(100);
        level.z_movement(id, &mut NoInteractions);
        let t = level.thing(id);
        assert_eq!(t.z, f(128 - 56));
        assert_eq!(t.momz, Fixed::ZERO);
    }
}
