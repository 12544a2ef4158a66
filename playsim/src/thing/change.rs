//! Sector height changes.
//!
//! After a floor or ceiling moves every thing near the sector has its
//! bounds refreshed. Things that no longer fit are gibbed, removed or
//! squashed. The animators (doors, lifts, crushers) decide what to do with
//! the answer.

use log::{debug, error, trace};
use math::{FRACBITS, Fixed};

use crate::level::Level;
use crate::thing::interact::Interactions;
use crate::thing::movement::PositionCheck;
use crate::thing::{MapObjFlag, ThingId};

/// Outcome of one step of a moving floor or ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneResult {
    Ok,
    Crushed,
    PastDest,
}

/// Which plane of a sector is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Floor,
    Ceiling,
}

impl Level {
    /// Refresh a thing's floor and ceiling from its current spot. Things on
    /// the floor ride it, anything else is only pushed down by the ceiling.
    /// Returns false if it no longer fits.
    ///
    /// Doom function name `P_ThingHeightClip`
    pub fn thing_height_clip(&mut self, id: ThingId) -> bool {
        let (x, y) = {
            let t = &self.things[id];
            (t.x, t.y)
        };
        let mut ctrl = PositionCheck::default();
        self.check_position(id, x, y, &mut ctrl);

        let thing = &mut self.things[id];
        let on_floor = thing.z == thing.floorz;
        thing.floorz = ctrl.floorz;
        thing.ceilingz = ctrl.ceilingz;

        if on_floor {
            // walking monsters rise and fall with the floor
            thing.z = thing.floorz;
        } else if thing.z + thing.height > thing.ceilingz {
            // don't adjust a floating monster unless forced to
            thing.z = thing.ceilingz - thing.height;
        }

        thing.ceilingz - thing.floorz >= thing.height
    }

    /// Re-fit every thing in the sector's block box after its heights
    /// changed. Returns true if something shootable doesn't fit. With
    /// `crush` set those things are hurt every few tics.
    ///
    /// Doom function name `P_ChangeSector`
    pub fn change_sector(&mut self, sector: usize, crush: bool, hooks: &mut impl Interactions) -> bool {
        let range = self.map_data.sectors()[sector].blockbox;
        let crush_tic = (self.level_time & self.config.crush_tick_mask) == 0;
        let crush_damage = self.config.crush_damage;

        let mut no_fit = false;
        self.blockmap_things_iter_mut(range, |level, id| {
            if level.thing_height_clip(id) {
                return true;
            }

            let thing = &mut level.things[id];
            if thing.health <= 0 {
                // crunch bodies to giblets
                thing.clear_flag(MapObjFlag::Solid);
                thing.height = Fixed::ZERO;
                thing.radius = Fixed::ZERO;
                hooks.gib(level, id);
                return true;
            }

            if thing.has_flag(MapObjFlag::Dropped) {
                level.remove_thing(id);
                return true;
            }

            if !thing.has_flag(MapObjFlag::Shootable) {
                // assume it is bloody gibs or something
                return true;
            }

            no_fit = true;
            if crush && crush_tic {
                let (x, y, z) = (thing.x, thing.y, thing.z + (thing.height >> 1));
                trace!("Crushing {:?}", id);
                hooks.damage(level, id, None, None, crush_damage);

                // spray blood in a random direction
                if let Some(blood) = hooks.spawn_blood(level, x, y, z, crush_damage) {
                    let momx = Fixed(level.rnd.p_subrandom() << (FRACBITS - 4));
                    let momy = Fixed(level.rnd.p_subrandom() << (FRACBITS - 4));
                    if let Some(blood) = level.things.get_mut(blood) {
                        blood.momx = momx;
                        blood.momy = momy;
                    }
                }
            }
            true
        });
        no_fit
    }

    /// Step a floor or ceiling by `speed` toward `dest`, `direction` `1` up
    /// and `-1` down. A step that would pass `dest` lands on it. Blocked
    /// steps are put back, except crushing ones and a rising ceiling.
    ///
    /// Doom function name `T_MovePlane`
    #[allow(clippy::too_many_arguments)]
    pub fn move_plane(
        &mut self,
        sector: usize,
        plane: Plane,
        speed: Fixed,
        dest: Fixed,
        crush: bool,
        direction: i32,
        hooks: &mut impl Interactions,
    ) -> PlaneResult {
        let last_pos = self.plane_height(sector, plane);
        debug!(
            "move_plane: {:?} {}: {} to {} at speed {}",
            plane, direction, last_pos, dest, speed
        );

        let (next, past) = match direction {
            -1 => (last_pos - speed, last_pos - speed < dest),
            1 => (last_pos + speed, last_pos + speed > dest),
            0 => return PlaneResult::Ok,
            _ => {
                error!("Invalid plane direction: {}", direction);
                return PlaneResult::Ok;
            }
        };

        if past {
            self.set_plane_height(sector, plane, dest);
            if self.change_sector(sector, crush, hooks) {
                self.set_plane_height(sector, plane, last_pos);
                self.change_sector(sector, crush, hooks);
            }
            return PlaneResult::PastDest;
        }

        self.set_plane_height(sector, plane, next);
        if !self.change_sector(sector, crush, hooks) {
            return PlaneResult::Ok;
        }
        match (plane, direction) {
            // a rising ceiling never traps anything
            (Plane::Ceiling, 1) => PlaneResult::Ok,
            // a lowering floor is always put back
            (Plane::Floor, -1) => {
                self.set_plane_height(sector, plane, last_pos);
                self.change_sector(sector, crush, hooks);
                PlaneResult::Crushed
            }
            _ => {
                if !crush {
                    self.set_plane_height(sector, plane, last_pos);
                    self.change_sector(sector, crush, hooks);
                }
                PlaneResult::Crushed
            }
        }
    }

    fn plane_height(&self, sector: usize, plane: Plane) -> Fixed {
        let sector = &self.map_data.sectors()[sector];
        match plane {
            Plane::Floor => sector.floorheight,
            Plane::Ceiling => sector.ceilingheight,
        }
    }

    fn set_plane_height(&mut self, sector: usize, plane: Plane, height: Fixed) {
        let sector = &mut self.map_data.sectors_mut()[sector];
        match plane {
            Plane::Floor => sector.floorheight = height,
            Plane::Ceiling => sector.ceilingheight = height,
        }
    }
}
