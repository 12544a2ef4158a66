use std::cell::Cell;

use math::{Angle, Fixed, Trace, point_on_side};

use crate::level::blockmap::BlockRange;
use crate::level::flags::LineDefFlags;
use crate::thing::ThingId;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vertex {
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// From whole map units
    #[inline]
    pub const fn from_units(x: i32, y: i32) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeType {
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

/// Axis aligned box in map space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: Fixed,
    pub right: Fixed,
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BBox {
    pub fn new(v1: Vertex, v2: Vertex) -> Self {
        let mut bbox = Self::empty();
        bbox.add_point(v1.x, v1.y);
        bbox.add_point(v2.x, v2.y);
        bbox
    }

    /// A box that any point will grow
    pub const fn empty() -> Self {
        Self {
            top: Fixed::MIN,
            bottom: Fixed::MAX,
            left: Fixed::MAX,
            right: Fixed::MIN,
        }
    }

    /// The square a thing of `radius` occupies at `x, y`
    #[inline]
    pub fn around(x: Fixed, y: Fixed, radius: Fixed) -> Self {
        Self {
            top: y + radius,
            bottom: y - radius,
            left: x - radius,
            right: x + radius,
        }
    }

    pub fn add_point(&mut self, x: Fixed, y: Fixed) {
        if x < self.left {
            self.left = x;
        }
        if x > self.right {
            self.right = x;
        }
        if y < self.bottom {
            self.bottom = y;
        }
        if y > self.top {
            self.top = y;
        }
    }

    /// Boxes share area. Touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &BBox) -> bool {
        !(self.right <= other.left
            || self.left >= other.right
            || self.top <= other.bottom
            || self.bottom >= other.top)
    }

    /// Boxes share area or an edge
    #[inline]
    pub fn touches(&self, other: &BBox) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.top < other.bottom
            || self.bottom > other.top)
    }

    #[inline]
    pub fn contains(&self, x: Fixed, y: Fixed) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }
}

/// The SECTORS record, at runtime.
/// Stores things/mobjs.
#[derive(Debug, Default)]
pub struct Sector {
    /// An incremented "ID" of sorts.
    pub num: usize,
    pub floorheight: Fixed,
    pub ceilingheight: Fixed,
    /// Is a tag or index to patch
    pub floorpic: usize,
    /// Is a tag or index to patch
    pub ceilingpic: usize,
    pub lightlevel: i32,
    pub special: i16,
    pub tag: i16,
    /// origin for any sounds played by the sector
    pub sound_origin: Vertex,
    /// Blockmap cells covering the sector, expanded by the largest thing
    /// radius and clamped to the grid
    pub blockbox: BlockRange,
    // if == validcount, already checked
    pub validcount: Cell<u32>,
    /// Id of the animator (door, floor, ceiling, platform) that currently
    /// owns this sector. Only one may own it at a time.
    pub specialdata: Option<u32>,
    /// All lines with this sector on one of their sides
    pub lines: Vec<usize>,
    // list of mobjs in sector
    pub(crate) thinglist: Option<ThingId>,
}

impl Sector {
    /// Head of the resident thing list
    #[inline]
    pub fn thinglist(&self) -> Option<ThingId> {
        self.thinglist
    }
}

#[derive(Debug, Default, Clone)]
pub struct SideDef {
    /// add this to the calculated texture column, scrolled by some specials
    pub textureoffset: f32,
    /// add this to the calculated texture top
    pub rowoffset: Fixed,
    /// Texture indices. `None` means no texture.
    pub toptexture: Option<usize>,
    pub bottomtexture: Option<usize>,
    pub midtexture: Option<usize>,
    pub sector: usize,
}

#[derive(Debug)]
pub struct LineDef {
    pub v1: Vertex,
    pub v2: Vertex,
    /// Precomputed v2 - v1
    pub dx: Fixed,
    pub dy: Fixed,
    /// Animation related.
    pub flags: u32,
    pub special: i16,
    pub tag: i16,
    /// Visual appearance: SideDefs.
    pub front_sidedef: usize,
    /// If `back_sidedef` is `None` then the line is one-sided
    pub back_sidedef: Option<usize>,
    /// Neat. Another bounding box, for the extent of the LineDef.
    pub bbox: BBox,
    /// To aid move clipping.
    pub slopetype: SlopeType,
    /// Front and back sector.
    pub frontsector: usize,
    pub backsector: Option<usize>,
    /// Fine angle of the line direction
    pub fineangle: usize,
    /// if == validcount, already checked
    pub validcount: Cell<u32>,
}

impl LineDef {
    /// The line as a divline, from v1 along the line delta
    #[inline]
    pub fn trace(&self) -> Trace {
        Trace::new(self.v1.x, self.v1.y, self.dx, self.dy)
    }

    /// `0` front, `1` back
    #[inline]
    pub fn point_on_side(&self, x: Fixed, y: Fixed) -> usize {
        point_on_side(x, y, &self.trace())
    }

    #[inline]
    pub fn has_flag(&self, flag: LineDefFlags) -> bool {
        self.flags & flag as u32 != 0
    }

    /// Stamp the line for the current query. Returns false if the line was
    /// already stamped with `count`.
    #[inline]
    pub fn mark_valid(&self, count: u32) -> bool {
        if self.validcount.get() == count {
            return false;
        }
        self.validcount.set(count);
        true
    }
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub v1: Vertex,
    pub v2: Vertex,
    pub offset: Fixed,
    pub angle: Angle,
    pub linedef: usize,
    pub sidedef: usize,
    /// Side of the linedef this seg runs along, `0` front
    pub side: usize,
    /// Sector where the seg is the front
    pub frontsector: usize,
    pub backsector: Option<usize>,
}

/// A leaf of the BSP, a convex region belonging to one sector
#[derive(Debug, Clone)]
pub struct SubSector {
    pub sector: usize,
    /// How many `Segment`s line this `SubSector`
    pub seg_count: usize,
    /// The `Segment` to start with
    pub start_seg: usize,
}

/// What a node child points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChild {
    Node(usize),
    Subsector(usize),
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Partition line
    pub line: Trace,
    /// Bounding box for each child, front first
    pub bboxes: [BBox; 2],
    /// Front and back children
    pub children: [NodeChild; 2],
}
