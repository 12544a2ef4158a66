//! The data that makes up an entire level, along with the iterators every
//! query is built on.
//!
//! `Level` owns the map geometry and every thing in it. Traversal queries
//! only need `&Level`, the per query visit stamps on lines and sectors are
//! `Cell`s.

pub mod blockmap;
pub mod flags;
pub mod map_data;
pub mod map_defs;
pub mod node;

#[cfg(test)]
pub(crate) mod tests;

use std::cell::Cell;

use log::{info, warn};
use math::{Fixed, RandomTable};

use crate::config::SimConfig;
use crate::level::blockmap::BlockRange;
use crate::level::map_data::MapData;
use crate::level::map_defs::LineDef;
use crate::thing::{MapObject, ThingId, Things};

/// The level is considered a `World` of sorts. One that exists only while
/// things are simulated in it.
pub struct Level {
    pub map_data: MapData,
    pub things: Things,
    pub config: SimConfig,
    /// Tics since the level started
    pub level_time: u32,
    /// The play random table, owned so every level replays the same way
    pub rnd: RandomTable,
    /// Marker count for lines and sectors checked by the current query
    valid_count: Cell<u32>,
}

impl Level {
    /// Take ownership of built map data. Sector block boxes are recomputed
    /// with the configured thing radius. A config that fails
    /// `SimConfig::validate` is replaced by the defaults.
    pub fn new(mut map_data: MapData, mut config: SimConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("{}, using defaults", e);
            config = SimConfig::default();
        }
        map_data.set_block_boxes(config.max_radius());
        info!(
            "Level ready: {} sectors, {} lines, reject {}",
            map_data.sectors().len(),
            map_data.linedefs().len(),
            if config.use_reject { "on" } else { "off" }
        );
        Self {
            map_data,
            things: Things::new(),
            config,
            level_time: 0,
            rnd: RandomTable::new(),
            valid_count: Cell::new(0),
        }
    }

    /// Start a new query. Any line or sector stamped with the returned count
    /// has been visited by this query.
    #[inline]
    pub fn next_valid_count(&self) -> u32 {
        let count = self.valid_count.get().wrapping_add(1);
        self.valid_count.set(count);
        count
    }

    #[inline]
    pub fn valid_count(&self) -> u32 {
        self.valid_count.get()
    }

    /// One tic passed
    #[inline]
    pub fn advance_time(&mut self) {
        self.level_time = self.level_time.wrapping_add(1);
    }

    #[inline]
    pub fn thing(&self, id: ThingId) -> &MapObject {
        &self.things[id]
    }

    #[inline]
    pub fn thing_mut(&mut self, id: ThingId) -> &mut MapObject {
        &mut self.things[id]
    }

    /// Sector a thing stands in
    #[inline]
    pub fn thing_sector(&self, id: ThingId) -> usize {
        self.map_data.subsectors()[self.things[id].subsector].sector
    }

    /// Floor and ceiling of the sector containing a point
    pub fn sector_heights_at(&self, x: Fixed, y: Fixed) -> (Fixed, Fixed) {
        let sector = &self.map_data.sectors()[self.map_data.point_in_sector(x, y)];
        (sector.floorheight, sector.ceilingheight)
    }

    /// Visit every line registered in the range once, stamping each with
    /// `valid`. Lines already stamped are skipped. Returns false as soon as
    /// `func` does.
    ///
    /// Doom function name `P_BlockLinesIterator`
    pub fn blockmap_lines_iter(
        &self,
        range: BlockRange,
        valid: u32,
        mut func: impl FnMut(usize, &LineDef) -> bool,
    ) -> bool {
        let blockmap = self.map_data.blockmap();
        let lines = self.map_data.linedefs();
        for (bx, by) in range.cells() {
            for &l in blockmap.lines_in(bx, by) {
                let line = &lines[l];
                if !line.mark_valid(valid) {
                    continue;
                }
                if !func(l, line) {
                    return false;
                }
            }
        }
        true
    }

    /// Visit every thing linked in the range. A thing is only ever in one
    /// block so no stamp is needed.
    ///
    /// Doom function name `P_BlockThingsIterator`
    pub fn blockmap_things_iter(
        &self,
        range: BlockRange,
        mut func: impl FnMut(ThingId, &MapObject) -> bool,
    ) -> bool {
        let blockmap = self.map_data.blockmap();
        for (bx, by) in range.cells() {
            let mut next = blockmap.things_head(bx, by);
            while let Some(id) = next {
                let thing = &self.things[id];
                next = thing.b_next;
                if !func(id, thing) {
                    return false;
                }
            }
        }
        true
    }

    /// As `blockmap_things_iter` but `func` may mutate the level, including
    /// moving or removing the visited thing. The successor read before the
    /// call is used while it is still linked in the block, otherwise the
    /// visited thing's new successor is. Things linked in to the block by
    /// `func` are not visited.
    pub fn blockmap_things_iter_mut(
        &mut self,
        range: BlockRange,
        mut func: impl FnMut(&mut Level, ThingId) -> bool,
    ) -> bool {
        for (bx, by) in range.cells() {
            let block = self.map_data.blockmap().block_index(bx, by);
            let mut next = self.map_data.blockmap().things_head(bx, by);
            while let Some(id) = next {
                let before = self.things[id].b_next;
                if !func(self, id) {
                    return false;
                }
                let in_block = |level: &Level, t: ThingId| {
                    level.things.get(t).is_some_and(|t| t.block_link == Some(block))
                };
                next = match before {
                    Some(n) if in_block(self, n) => Some(n),
                    _ if in_block(self, id) => self.things[id].b_next,
                    _ => None,
                };
            }
        }
        true
    }

    /// Things linked in to a sector, head first
    pub fn sector_things(&self, sector: usize) -> impl Iterator<Item = ThingId> + '_ {
        std::iter::successors(self.map_data.sectors()[sector].thinglist(), move |id| {
            self.things[*id].s_next
        })
    }

    /// Things linked in to a block, head first
    pub fn block_things(&self, bx: usize, by: usize) -> impl Iterator<Item = ThingId> + '_ {
        std::iter::successors(self.map_data.blockmap().things_head(bx, by), move |id| {
            self.things[*id].b_next
        })
    }
}
