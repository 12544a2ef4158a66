//! The movable map entities. Monsters, players, missiles, items and corpses
//! are all `MapObject`s living in the level's `Things` arena and addressed by
//! `ThingId`.
//!
//! Every thing is linked in to the thing list of the sector it stands in and
//! the blockmap block holding its origin, unless flagged out of either. The
//! two lists are doubly linked through ids stored on the thing, and the thing
//! remembers which sector and block it was linked to so that unlinking never
//! depends on its current position.

pub mod change;
pub mod interact;
pub mod movement;
pub mod shooting;
pub mod sight;
pub mod slide;

use std::fmt::Debug;
use std::ops::{Index, IndexMut};

use log::{trace, warn};
use math::{Angle, Fixed};

use crate::doom_def::{ONCEILINGZ, ONFLOORZ};
use crate::level::Level;
use crate::level::map_defs::BBox;

/// Handle of a thing in `Level::things`. A handle kept past the thing's
/// removal never resolves to whatever later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThingId {
    index: usize,
    generation: u32,
}

impl ThingId {
    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapObjFlag {
    /// Call the touch hook when a picker moves over it.
    Special = 1,
    /// Blocks.
    Solid = 2,
    /// Can be hit.
    Shootable = 4,
    /// Don't use the sector links (invisible but touchable).
    Nosector = 8,
    /// Don't use the block links (inert but displayable)
    Noblockmap = 16,
    /// Not to be activated by sound, deaf monster.
    Ambush = 32,
    /// Will try to attack right back.
    Justhit = 64,
    /// Will take at least one step before attacking.
    Justattacked = 128,
    /// On level spawning (initial position), hang from ceiling instead of stand
    /// on floor.
    Spawnceiling = 256,
    /// Don't apply gravity (every tic), that is, object will float, keeping
    /// current height or changing it actively.
    Nogravity = 512,
    /// This allows jumps from high places.
    Dropoff = 0x400,
    /// For players, will pick up items.
    Pickup = 0x800,
    /// Ignore all walls and things.
    Noclip = 0x1000,
    /// Player: keep info about sliding along walls.
    Slide = 0x2000,
    /// Allow moves to any height, no gravity. For active floaters, e.g.
    /// cacodemons, pain elementals.
    Float = 0x4000,
    /// Don't cross lines or look at heights on teleport.
    Teleport = 0x8000,
    /// Don't hit same species, explode on block. Player missiles as well as
    /// fireballs of various kinds.
    Missile = 0x10000,
    /// Dropped by a demon, not level spawned. E.g. ammo clips dropped by dying
    /// former humans.
    Dropped = 0x20000,
    /// Use fuzzy draw (shadow demons or spectres), temporary player
    /// invisibility powerup.
    Shadow = 0x40000,
    /// Flag: don't bleed when shot (use puff), barrels and shootable furniture
    /// shall not bleed.
    Noblood = 0x80000,
    /// Don't stop moving halfway off a step, that is, have dead bodies slide
    /// down all the way.
    Corpse = 0x100000,
    /// Floating to a height for a move, don't auto float to target's height.
    Infloat = 0x200000,
    /// On kill, count this enemy object towards intermission kill total.
    Countkill = 0x400000,
    /// On picking up, count this item object towards intermission item total.
    Countitem = 0x800000,
    /// Special handling: skull in flight. Neither a cacodemon nor a missile.
    Skullfly = 0x1000000,
    /// Don't spawn this object in death match mode (e.g. key cards).
    Notdmatch = 0x2000000,
    /// The last sight check against the target succeeded.
    SeeTarget = 0x4000000,
}

#[derive(Clone)]
pub struct MapObject {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    /// orientation
    pub angle: Angle,
    /// For movement checking.
    pub radius: Fixed,
    pub height: Fixed,
    /// Momentum, used to update position.
    pub momx: Fixed,
    pub momy: Fixed,
    pub momz: Fixed,
    /// The closest interval over all contacted Sectors.
    pub floorz: Fixed,
    pub ceilingz: Fixed,
    pub flags: u32,
    pub health: i32,
    /// Species. Missiles never hurt things of their shooter's kind unless
    /// that kind is a player.
    pub kind: u32,
    /// Impact damage of a missile or flying skull
    pub damage: i32,
    /// Controlled by a player. Players are not blocked by monster lines and
    /// may hurt each other with missiles.
    pub player: bool,
    /// Thing being chased/attacked, also the originator for missiles.
    pub target: Option<ThingId>,
    /// The subsector this object is currently in. Set by
    /// `set_thing_position()` on spawn and every move.
    pub subsector: usize,
    /// Link to the next thing in this sector
    pub(crate) s_next: Option<ThingId>,
    pub(crate) s_prev: Option<ThingId>,
    /// Link to the next thing in this block
    pub(crate) b_next: Option<ThingId>,
    pub(crate) b_prev: Option<ThingId>,
    /// Sector and flat block index the thing is currently linked in to
    pub(crate) sector_link: Option<usize>,
    pub(crate) block_link: Option<usize>,
}

impl Debug for MapObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapObject")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("z", &self.z)
            .field("radius", &self.radius)
            .field("height", &self.height)
            .field("momx", &self.momx)
            .field("momy", &self.momy)
            .field("momz", &self.momz)
            .field("floorz", &self.floorz)
            .field("ceilingz", &self.ceilingz)
            .field("flags", &format_args!("{:#x}", self.flags))
            .field("health", &self.health)
            .field("kind", &self.kind)
            .field("subsector", &self.subsector)
            .finish_non_exhaustive()
    }
}

impl MapObject {
    /// A thing at a position. `z` may be `ONFLOORZ` or `ONCEILINGZ` to be
    /// placed against the sector when spawned.
    pub fn new(x: Fixed, y: Fixed, z: Fixed, radius: Fixed, height: Fixed, flags: u32) -> Self {
        Self {
            x,
            y,
            z,
            angle: Angle::default(),
            radius,
            height,
            momx: Fixed::ZERO,
            momy: Fixed::ZERO,
            momz: Fixed::ZERO,
            floorz: Fixed::ZERO,
            ceilingz: Fixed::ZERO,
            flags,
            health: 100,
            kind: 0,
            damage: 0,
            player: false,
            target: None,
            subsector: 0,
            s_next: None,
            s_prev: None,
            b_next: None,
            b_prev: None,
            sector_link: None,
            block_link: None,
        }
    }

    #[inline]
    pub fn has_flag(&self, flag: MapObjFlag) -> bool {
        self.flags & flag as u32 != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: MapObjFlag) {
        self.flags |= flag as u32;
    }

    #[inline]
    pub fn clear_flag(&mut self, flag: MapObjFlag) {
        self.flags &= !(flag as u32);
    }

    /// Footprint at the current position
    #[inline]
    pub fn bbox(&self) -> BBox {
        BBox::around(self.x, self.y, self.radius)
    }

    /// Sector the thing is linked in to, if it uses sector links
    #[inline]
    pub fn sector_link(&self) -> Option<usize> {
        self.sector_link
    }

    /// Flat blockmap index the thing is linked in to, `None` when it does not
    /// use block links or is off the grid
    #[inline]
    pub fn block_link(&self) -> Option<usize> {
        self.block_link
    }
}

/// Slot storage for every thing in a level. Ids stay stable for the life of a
/// thing, freed slots are reused by later spawns under a new generation.
#[derive(Debug, Default)]
pub struct Things {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    thing: Option<MapObject>,
}

impl Things {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, thing: MapObject) -> ThingId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.thing = Some(thing);
            return ThingId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            thing: Some(thing),
        });
        ThingId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, id: ThingId) -> Option<MapObject> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let thing = slot.thing.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(thing)
    }

    #[inline]
    pub fn get(&self, id: ThingId) -> Option<&MapObject> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.thing.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, id: ThingId) -> Option<&mut MapObject> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.thing.as_mut())
    }

    #[inline]
    pub fn contains(&self, id: ThingId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live things in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ThingId, &MapObject)> {
        self.slots.iter().enumerate().filter_map(|(index, s)| {
            let id = ThingId {
                index,
                generation: s.generation,
            };
            s.thing.as_ref().map(|t| (id, t))
        })
    }

    pub fn ids(&self) -> Vec<ThingId> {
        self.iter().map(|(id, _)| id).collect()
    }
}

impl Index<ThingId> for Things {
    type Output = MapObject;

    fn index(&self, id: ThingId) -> &MapObject {
        match self.get(id) {
            Some(t) => t,
            None => panic!("thing {:?} is not live", id),
        }
    }
}

impl IndexMut<ThingId> for Things {
    fn index_mut(&mut self, id: ThingId) -> &mut MapObject {
        match self.get_mut(id) {
            Some(t) => t,
            None => panic!("thing {:?} is not live", id),
        }
    }
}

impl Level {
    /// Add a thing to the level and link it in. The floor and ceiling are
    /// taken from the sector under it, `ONFLOORZ` and `ONCEILINGZ` place it
    /// against them.
    ///
    /// Doom function name `P_SpawnMobj`
    pub fn spawn_thing(&mut self, thing: MapObject) -> ThingId {
        let id = self.things.insert(thing);
        self.set_thing_position(id);

        let sector = self.map_data.subsectors()[self.things[id].subsector].sector;
        let sector = &self.map_data.sectors()[sector];
        let (floor, ceiling) = (sector.floorheight, sector.ceilingheight);

        let thing = &mut self.things[id];
        thing.floorz = floor;
        thing.ceilingz = ceiling;
        if thing.z == ONFLOORZ {
            thing.z = floor;
        } else if thing.z == ONCEILINGZ {
            thing.z = ceiling - thing.height;
        }
        if thing.block_link.is_none() && !thing.has_flag(MapObjFlag::Noblockmap) {
            warn!(
                "Thing {:?} spawned outside the blockmap at ({}, {})",
                id, thing.x, thing.y
            );
        }
        trace!("Spawned {:?}", id);
        id
    }

    /// Unlink and drop a thing. Returns `None` if it was not live.
    ///
    /// Doom function name `P_RemoveMobj`
    pub fn remove_thing(&mut self, id: ThingId) -> Option<MapObject> {
        if !self.things.contains(id) {
            return None;
        }
        self.unset_thing_position(id);
        trace!("Removed {:?}", id);
        self.things.remove(id)
    }

    /// Unlink a thing from its sector list and blockmap block. A thing not in
    /// a list is left alone.
    ///
    /// Doom function name `P_UnsetThingPosition`
    pub fn unset_thing_position(&mut self, id: ThingId) {
        let thing = &mut self.things[id];
        let (s_next, s_prev) = (thing.s_next.take(), thing.s_prev.take());
        let (b_next, b_prev) = (thing.b_next.take(), thing.b_prev.take());
        let sector_link = thing.sector_link.take();
        let block_link = thing.block_link.take();

        if let Some(sector) = sector_link {
            if let Some(next) = s_next {
                self.things[next].s_prev = s_prev;
            }
            match s_prev {
                Some(prev) => self.things[prev].s_next = s_next,
                None => self.map_data.sectors_mut()[sector].thinglist = s_next,
            }
        }

        if let Some(block) = block_link {
            if let Some(next) = b_next {
                self.things[next].b_prev = b_prev;
            }
            match b_prev {
                Some(prev) => self.things[prev].b_next = b_next,
                None => self.map_data.blockmap_mut().things[block] = b_next,
            }
        }
    }

    /// Locate the subsector of a thing's position and link it at the head of
    /// that sector's list and its block's list. A thing off the blockmap gets
    /// no block link.
    ///
    /// Doom function name `P_SetThingPosition`
    pub fn set_thing_position(&mut self, id: ThingId) {
        let (x, y, flags) = {
            let t = &self.things[id];
            (t.x, t.y, t.flags)
        };
        let subsector = self.map_data.point_in_subsector(x, y);
        self.things[id].subsector = subsector;

        if flags & MapObjFlag::Nosector as u32 == 0 {
            let sector = self.map_data.subsectors()[subsector].sector;
            let head = self.map_data.sectors()[sector].thinglist;
            if let Some(head) = head {
                self.things[head].s_prev = Some(id);
            }
            let thing = &mut self.things[id];
            thing.s_next = head;
            thing.s_prev = None;
            thing.sector_link = Some(sector);
            self.map_data.sectors_mut()[sector].thinglist = Some(id);
        }

        if flags & MapObjFlag::Noblockmap as u32 == 0 {
            if let Some(block) = self.map_data.blockmap().cell_index(x, y) {
                let head = self.map_data.blockmap().things[block];
                if let Some(head) = head {
                    self.things[head].b_prev = Some(id);
                }
                let thing = &mut self.things[id];
                thing.b_next = head;
                thing.b_prev = None;
                thing.block_link = Some(block);
                self.map_data.blockmap_mut().things[block] = Some(id);
            }
        }
    }

    /// Move a thing to a new spot without any checks, keeping the links
    /// consistent
    pub fn teleport_thing(&mut self, id: ThingId, x: Fixed, y: Fixed) {
        self.unset_thing_position(id);
        let thing = &mut self.things[id];
        thing.x = x;
        thing.y = y;
        self.set_thing_position(id);
    }
}
