//! Line of sight between two things, walked through the BSP from the
//! looker's eyes. Each two sided line crossed narrows the window of slopes
//! to the target, a closed line or an empty window blocks.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::trace;
use math::{FRACUNIT, Fixed, Trace};

use crate::level::Level;
use crate::level::map_defs::Vertex;
use crate::thing::ThingId;
use crate::utilities::sight_cross_line;

/// Crossings closer than this to the eye are ignored
const SIGHT_MIN_FRAC: i32 = 4;

struct SightQuery {
    eye_z: Fixed,
    top_slope: Fixed,
    bottom_slope: Fixed,
    start: Vertex,
    end: Vertex,
}

/// Keep the trace ends off vertex coordinates
#[inline]
fn snap(v: Fixed) -> Fixed {
    Fixed((v.0 & !0x1ffff) | 0x10000)
}

impl Level {
    /// True if a straight line between the eyes of `looker` and any part of
    /// `target` is unobstructed. The reject matrix is only consulted when
    /// `use_reject` is configured.
    ///
    /// Doom function name `P_CheckSight`
    pub fn check_sight(&self, looker: ThingId, target: ThingId) -> bool {
        #[cfg(feature = "hprof")]
        profile!("check_sight");
        let t1 = &self.things[looker];
        let t2 = &self.things[target];

        if self.config.use_reject {
            let s1 = self.map_data.subsectors()[t1.subsector].sector;
            let s2 = self.map_data.subsectors()[t2.subsector].sector;
            if self.map_data.reject_blocks(s1, s2) {
                trace!("Sight {:?} -> {:?} rejected", looker, target);
                return false;
            }
        }

        let start = Vertex::new(snap(t1.x), snap(t1.y));
        let end = Vertex::new(snap(t2.x), snap(t2.y));
        let eye_z = t1.z + t1.height - (t1.height >> 2);
        let mut query = SightQuery {
            eye_z,
            top_slope: t2.z + t2.height - eye_z,
            bottom_slope: t2.z - eye_z,
            start,
            end,
        };

        let valid = self.next_valid_count();
        let trace = Trace::between(start.x, start.y, end.x, end.y);
        self.map_data
            .trace_subsectors(&trace, |s| self.sight_cross_subsector(s, valid, &mut query))
    }

    /// False if the trace is stopped inside the subsector
    fn sight_cross_subsector(&self, subsector: usize, valid: u32, query: &mut SightQuery) -> bool {
        let subsector = &self.map_data.subsectors()[subsector];
        let sectors = self.map_data.sectors();

        for seg in subsector.start_seg..subsector.start_seg + subsector.seg_count {
            let line = self.map_data.seg_line(seg);
            if !line.mark_valid(valid) {
                // already checked other side
                continue;
            }

            let Some(frac) = sight_cross_line(line.v1, line.v2, query.start, query.end) else {
                continue;
            };
            if frac.0 < SIGHT_MIN_FRAC || frac.0 > FRACUNIT {
                continue;
            }

            let Some(back) = line.backsector else {
                return false;
            };
            let front = &sectors[line.frontsector];
            let back = &sectors[back];

            if front.floorheight == back.floorheight && front.ceilingheight == back.ceilingheight {
                // no wall to block sight with
                continue;
            }

            let open_top = front.ceilingheight.min(back.ceilingheight);
            let open_bottom = front.floorheight.max(back.floorheight);
            if open_bottom >= open_top {
                // closed door
                return false;
            }

            let frac = (frac.0 >> 2) as i64;
            let eye_z = query.eye_z;
            let slope_to = |z: Fixed| {
                let slope = ((((z - eye_z).0 as i64) << 6) / frac) << 8;
                Fixed(slope.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            };

            if front.floorheight != back.floorheight {
                let slope = slope_to(open_bottom);
                if slope > query.bottom_slope {
                    query.bottom_slope = slope;
                }
            }
            if front.ceilingheight != back.ceilingheight {
                let slope = slope_to(open_top);
                if slope < query.top_slope {
                    query.top_slope = slope;
                }
            }

            if query.top_slope <= query.bottom_slope {
                return false;
            }
        }
        true
    }
}
