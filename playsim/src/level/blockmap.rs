//! The `BLOCKMAP` is a uniform grid the engine uses to simplify collision
//! detection between moving things and walls.
//!
//! Each block is 128 map units square. A block holds the lines whose bounding
//! box touches it, fixed at load, and the head of a doubly linked list of the
//! things whose origin is inside it, maintained by thing linkage.

use math::{FRACBITS, Fixed};

use crate::level::map_defs::BBox;
use crate::thing::ThingId;

/// Shift from map fixed point to a block coordinate
pub const MAPBLOCKSHIFT: u32 = FRACBITS + 7;
/// Block size in map units
pub const MAPBLOCKUNITS: i32 = 128;

/// A clamped, half open rectangle of block cells. Ranges built from map
/// coordinates that fall off the grid are simply empty.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl BlockRange {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Cells in x then y order, `x` outer
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let (y0, y1) = (self.y0, self.y1);
        (self.x0..self.x1).flat_map(move |x| (y0..y1).map(move |y| (x, y)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockMap {
    /// Leftmost X coord
    pub x_origin: Fixed,
    /// Bottommost Y coord
    pub y_origin: Fixed,
    /// Width in blocks
    pub width: usize,
    /// Height in blocks
    pub height: usize,
    /// Line indexes per block, row major
    lines: Vec<Vec<usize>>,
    /// Head of each block's thing list
    pub(crate) things: Vec<Option<ThingId>>,
}

impl BlockMap {
    pub fn new(
        x_origin: Fixed,
        y_origin: Fixed,
        width: usize,
        height: usize,
        lines: Vec<Vec<usize>>,
    ) -> Self {
        debug_assert_eq!(lines.len(), width * height);
        Self {
            x_origin,
            y_origin,
            width,
            height,
            lines,
            things: vec![None; width * height],
        }
    }

    /// Block column of a map x coordinate. May be out of the grid.
    #[inline]
    pub fn block_x(&self, x: Fixed) -> i32 {
        (x - self.x_origin).0 >> MAPBLOCKSHIFT
    }

    /// Block row of a map y coordinate. May be out of the grid.
    #[inline]
    pub fn block_y(&self, y: Fixed) -> i32 {
        (y - self.y_origin).0 >> MAPBLOCKSHIFT
    }

    /// The flat index of the block containing a point, `None` if it is off
    /// the grid
    #[inline]
    pub fn cell_index(&self, x: Fixed, y: Fixed) -> Option<usize> {
        let bx = self.block_x(x);
        let by = self.block_y(y);
        if bx < 0 || by < 0 || bx as usize >= self.width || by as usize >= self.height {
            return None;
        }
        Some(by as usize * self.width + bx as usize)
    }

    /// Cells covered by `bbox` grown by `pad` on each side, clamped to the grid
    pub fn range(&self, bbox: &BBox, pad: Fixed) -> BlockRange {
        let xl = self.block_x(bbox.left - pad);
        let xh = self.block_x(bbox.right + pad);
        let yl = self.block_y(bbox.bottom - pad);
        let yh = self.block_y(bbox.top + pad);
        self.clamp(xl, yl, xh, yh)
    }

    /// Clamp an inclusive block rectangle to the grid
    pub fn clamp(&self, xl: i32, yl: i32, xh: i32, yh: i32) -> BlockRange {
        let clamp_hi = |hi: i32, len: usize| -> usize {
            if hi < 0 {
                0
            } else {
                (hi as usize + 1).min(len)
            }
        };
        BlockRange {
            x0: xl.max(0) as usize,
            y0: yl.max(0) as usize,
            x1: clamp_hi(xh, self.width),
            y1: clamp_hi(yh, self.height),
        }
    }

    /// Register a line in every block its bounding box touches
    pub(crate) fn add_line(&mut self, line: usize, bbox: &BBox) {
        for (bx, by) in self.range(bbox, Fixed::ZERO).cells() {
            self.lines[by * self.width + bx].push(line);
        }
    }

    /// Lines registered in a block. Off grid blocks are empty.
    #[inline]
    pub fn lines_in(&self, bx: usize, by: usize) -> &[usize] {
        if bx >= self.width || by >= self.height {
            return &[];
        }
        &self.lines[by * self.width + bx]
    }

    /// Flat index of an on grid block, as stored in `MapObject::block_link`
    #[inline]
    pub fn block_index(&self, bx: usize, by: usize) -> usize {
        by * self.width + bx
    }

    /// First thing in a block's list
    #[inline]
    pub fn things_head(&self, bx: usize, by: usize) -> Option<ThingId> {
        if bx >= self.width || by >= self.height {
            return None;
        }
        self.things[by * self.width + bx]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockMap, BlockRange};
    use crate::level::map_defs::BBox;
    use math::Fixed;

    fn grid() -> BlockMap {
        // 4x3 blocks from (-64, 0)
        BlockMap::new(
            Fixed::from_int(-64),
            Fixed::ZERO,
            4,
            3,
            vec![Vec::new(); 12],
        )
    }

    #[test]
    fn cell_lookup() {
        let bm = grid();
        assert_eq!(bm.cell_index(Fixed::from_int(-64), Fixed::ZERO), Some(0));
        assert_eq!(bm.cell_index(Fixed::from_int(70), Fixed::from_int(130)), Some(5));
        assert_eq!(bm.cell_index(Fixed::from_int(-65), Fixed::ZERO), None);
        assert_eq!(bm.cell_index(Fixed::from_int(448), Fixed::ZERO), None);
        assert_eq!(bm.cell_index(Fixed::ZERO, Fixed::from_int(384)), None);
    }

    #[test]
    fn ranges_clamp() {
        let bm = grid();
        let all = BBox::around(Fixed::from_int(100), Fixed::from_int(100), Fixed::from_int(4000));
        assert_eq!(
            bm.range(&all, Fixed::ZERO),
            BlockRange {
                x0: 0,
                y0: 0,
                x1: 4,
                y1: 3
            }
        );

        let off = BBox::around(Fixed::from_int(-4000), Fixed::from_int(100), Fixed::from_int(16));
        assert!(bm.range(&off, Fixed::ZERO).is_empty());
        assert_eq!(bm.range(&off, Fixed::ZERO).cells().count(), 0);

        let one = BBox::around(Fixed::from_int(0), Fixed::from_int(32), Fixed::from_int(8));
        let r = bm.range(&one, Fixed::ZERO);
        assert_eq!(r.cells().collect::<Vec<_>>(), vec![(0, 0)]);
        // padding spills into the neighbour
        let r = bm.range(&one, Fixed::from_int(64));
        assert_eq!(r.cells().collect::<Vec<_>>(), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn off_grid_blocks_are_empty() {
        let bm = grid();
        assert!(bm.lines_in(4, 0).is_empty());
        assert!(bm.things_head(0, 3).is_none());
    }
}
