//! Environment and object interactions.
//!
//! The engine decides *who* touched, hit or crossed *what*. What that means
//! for the game (damage, pickups, door specials, sounds, spawned effects) is
//! up to the `Interactions` impl handed to each operation. Every hook gets the
//! level mutably so it may change things, including removing them.

use log::debug;
use math::{Fixed, Trace, intercept_vector};

use crate::level::Level;
use crate::level::map_defs::BBox;
use crate::thing::{MapObjFlag, ThingId};

pub trait Interactions {
    /// Doom function name `P_DamageMobj`
    ///
    /// - `inflictor` is the thing that dealt the damage (creature or missile),
    ///   `None` for crushers and the like.
    /// - `source` is the thing the target should blame, `None` for the
    ///   environment.
    fn damage(
        &mut self,
        _level: &mut Level,
        _target: ThingId,
        _inflictor: Option<ThingId>,
        _source: Option<ThingId>,
        _damage: i32,
    ) {
    }

    /// A picker moved on to a special thing.
    ///
    /// Doom function name `P_TouchSpecialThing`
    fn touch_special(&mut self, _level: &mut Level, _special: ThingId, _toucher: ThingId) {}

    /// A shot hit a wall or a thing that does not bleed
    fn spawn_puff(&mut self, _level: &mut Level, _x: Fixed, _y: Fixed, _z: Fixed) {}

    /// A shot or crusher hurt something that bleeds. Returning the new thing
    /// lets the caller give it momentum.
    fn spawn_blood(
        &mut self,
        _level: &mut Level,
        _x: Fixed,
        _y: Fixed,
        _z: Fixed,
        _damage: i32,
    ) -> Option<ThingId> {
        None
    }

    /// `thing` crossed a line carrying a special, ending up on `side`.
    ///
    /// Doom function name `P_CrossSpecialLine`
    fn cross_special_line(&mut self, _level: &mut Level, _line: usize, _side: usize, _thing: ThingId) {
    }

    /// Doom function name `P_ShootSpecialLine`
    fn shoot_special_line(&mut self, _level: &mut Level, _line: usize, _thing: ThingId) {}

    /// Doom function name `P_UseSpecialLine`
    fn use_special_line(&mut self, _level: &mut Level, _line: usize, _side: usize, _thing: ThingId) {
    }

    /// A use hit a plain wall
    fn no_way(&mut self, _level: &mut Level, _thing: ThingId) {}

    /// A dead thing was turned in to gibs by a closing sector. It is already
    /// flat and no longer solid.
    fn gib(&mut self, _level: &mut Level, _thing: ThingId) {}

    /// A missile struck a wall, floor, ceiling or `hit`. The default removes
    /// it.
    ///
    /// Doom function name `P_ExplodeMissile`
    fn explode_missile(&mut self, level: &mut Level, missile: ThingId, _hit: Option<ThingId>) {
        level.remove_thing(missile);
    }

    /// A flying skull hit something and stopped. Flag and momentum are
    /// already cleared.
    fn skull_slammed(&mut self, _level: &mut Level, _skull: ThingId) {}
}

/// Interactions that do nothing, for pure movement and queries
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInteractions;

impl Interactions for NoInteractions {}

impl Level {
    /// Hurt every shootable thing within `damage` units of `spot` that it
    /// can see, less the distance to its edge.
    ///
    /// Doom function name `P_RadiusAttack`
    pub fn radius_attack(
        &mut self,
        spot: ThingId,
        source: Option<ThingId>,
        damage: i32,
        hooks: &mut impl Interactions,
    ) {
        let (x, y) = {
            let s = &self.things[spot];
            (s.x, s.y)
        };
        let dist = Fixed::from_int(damage);
        let range = self
            .map_data
            .blockmap()
            .range(&BBox::around(x, y, dist), self.config.max_radius());

        let mut victims = Vec::new();
        self.blockmap_things_iter(range, |id, thing| {
            if !thing.has_flag(MapObjFlag::Shootable) {
                return true;
            }
            let dx = (thing.x - x).abs();
            let dy = (thing.y - y).abs();
            let dist = ((dx.max(dy) - thing.radius).to_int()).max(0);
            if dist < damage {
                victims.push((id, dist));
            }
            true
        });

        for (id, dist) in victims {
            if !self.things.contains(id) || !self.things.contains(spot) {
                continue;
            }
            if self.check_sight(id, spot) {
                hooks.damage(self, id, Some(spot), source, damage - dist);
            }
        }
    }

    /// Look `use_range` ahead of a thing for the nearest line. A special line
    /// is activated, a plain wall reports "no way", lines that can be seen
    /// through are passed over.
    ///
    /// Doom function name `P_UseLines`
    pub fn use_lines(&mut self, user: ThingId, hooks: &mut impl Interactions) {
        let (x1, y1, angle) = {
            let t = &self.things[user];
            (t.x, t.y, t.angle)
        };
        let range = self.config.use_range;
        let x2 = x1 + angle.cos() * range;
        let y2 = y1 + angle.sin() * range;
        let use_line = Trace::between(x1, y1, x2, y2);

        let mut bbox = BBox::empty();
        bbox.add_point(x1, y1);
        bbox.add_point(x2, y2);
        let cells = self.map_data.blockmap().range(&bbox, Fixed::ZERO);

        let mut close_line = None;
        let mut close_dist = Fixed::ONE;
        let valid = self.next_valid_count();
        self.blockmap_lines_iter(cells, valid, |l, line| {
            if !bbox.overlaps(&line.bbox) {
                return true;
            }
            let Some(frac) = intercept_vector(&use_line, &line.trace()) else {
                return true;
            };
            if frac < Fixed::ZERO || frac > close_dist {
                return true;
            }
            if line.special <= 0 && self.map_data.line_opening(l) > Fixed::ZERO {
                // not a special line, but keep checking
                return true;
            }
            close_line = Some(l);
            close_dist = frac;
            true
        });

        let Some(l) = close_line else {
            return;
        };
        let line = &self.map_data.linedefs()[l];
        if line.special <= 0 {
            debug!("Use blocked by line {} at {}", l, close_dist);
            hooks.no_way(self, user);
        } else {
            let side = line.point_on_side(x1, y1);
            hooks.use_special_line(self, l, side, user);
        }
    }
}
