//! The static geometry of a level and the builder that derives it.
//!
//! A loader hands raw records to `MapBuilder`, which validates every index and
//! precomputes what the play simulation needs: line deltas, boxes and slope
//! classes, seg angles and sectors, per sector line lists, sound origins and
//! block boxes, and the blockmap line lists.

use std::cell::Cell;

use log::{debug, info};
use math::{Angle, Fixed, point_to_angle};

use crate::MapError;
use crate::doom_def::MAXRADIUS;
use crate::level::blockmap::{BlockMap, MAPBLOCKSHIFT};
use crate::level::flags::LineDefFlags;
use crate::level::map_defs::{
    BBox, LineDef, Node, NodeChild, Sector, Segment, SideDef, SlopeType, SubSector, Vertex,
};

/// Distance the generated blockmap origin sits below and left of the
/// smallest vertex
const BLOCKMAP_MARGIN: i32 = 8;

/// Input record for a sector
#[derive(Debug, Clone, Default)]
pub struct SectorDesc {
    pub floorheight: Fixed,
    pub ceilingheight: Fixed,
    pub floorpic: usize,
    pub ceilingpic: usize,
    pub lightlevel: i32,
    pub special: i16,
    pub tag: i16,
}

impl SectorDesc {
    /// Floor and ceiling in whole map units
    pub fn new(floor: i32, ceiling: i32) -> Self {
        Self {
            floorheight: Fixed::from_int(floor),
            ceilingheight: Fixed::from_int(ceiling),
            lightlevel: 160,
            ..Default::default()
        }
    }

    pub fn with_pics(mut self, floorpic: usize, ceilingpic: usize) -> Self {
        self.floorpic = floorpic;
        self.ceilingpic = ceilingpic;
        self
    }

    pub fn with_special(mut self, special: i16, tag: i16) -> Self {
        self.special = special;
        self.tag = tag;
        self
    }
}

/// Input record for a linedef. Vertex and sidedef fields are indexes.
#[derive(Debug, Clone, Default)]
pub struct LineDesc {
    pub v1: usize,
    pub v2: usize,
    pub flags: u32,
    pub special: i16,
    pub tag: i16,
    pub front: usize,
    pub back: Option<usize>,
}

/// Input record for a seg
#[derive(Debug, Clone, Default)]
pub struct SegDesc {
    pub v1: usize,
    pub v2: usize,
    pub linedef: usize,
    /// `0` runs along the front of the linedef, `1` the back
    pub side: usize,
    pub offset: Fixed,
}

/// Collects raw level records and checks and derives them in to `MapData`
#[derive(Debug, Default)]
pub struct MapBuilder {
    name: String,
    vertexes: Vec<Vertex>,
    sectors: Vec<SectorDesc>,
    sidedefs: Vec<SideDef>,
    linedefs: Vec<LineDesc>,
    segments: Vec<SegDesc>,
    subsectors: Vec<(usize, usize)>,
    nodes: Vec<Node>,
    reject: Option<Vec<u8>>,
    sky_flat: Option<usize>,
    max_radius: Fixed,
}

impl MapBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            max_radius: Fixed::from_int(MAXRADIUS),
            ..Default::default()
        }
    }

    /// Add a vertex and return its index
    pub fn vertex(&mut self, x: Fixed, y: Fixed) -> usize {
        self.vertexes.push(Vertex::new(x, y));
        self.vertexes.len() - 1
    }

    pub fn sector(&mut self, sector: SectorDesc) -> usize {
        self.sectors.push(sector);
        self.sectors.len() - 1
    }

    pub fn sidedef(&mut self, side: SideDef) -> usize {
        self.sidedefs.push(side);
        self.sidedefs.len() - 1
    }

    pub fn linedef(&mut self, line: LineDesc) -> usize {
        self.linedefs.push(line);
        self.linedefs.len() - 1
    }

    pub fn segment(&mut self, seg: SegDesc) -> usize {
        self.segments.push(seg);
        self.segments.len() - 1
    }

    /// A subsector is a contiguous run of segs
    pub fn subsector(&mut self, start_seg: usize, seg_count: usize) -> usize {
        self.subsectors.push((start_seg, seg_count));
        self.subsectors.len() - 1
    }

    /// Nodes are stored in the order given. The root is the last node.
    pub fn node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Sector to sector visibility bits, `sectors * sectors` bits rounded up
    /// to whole bytes. A set bit means the pair can never see each other.
    pub fn reject(&mut self, reject: Vec<u8>) -> &mut Self {
        self.reject = Some(reject);
        self
    }

    /// The flat number used as the sky ceiling
    pub fn sky_flat(&mut self, pic: usize) -> &mut Self {
        self.sky_flat = Some(pic);
        self
    }

    /// Largest thing radius the sector block boxes must allow for
    pub fn max_radius(&mut self, radius: Fixed) -> &mut Self {
        self.max_radius = radius;
        self
    }

    pub fn build(self) -> Result<MapData, MapError> {
        if self.vertexes.is_empty() || self.linedefs.is_empty() || self.sectors.is_empty() {
            return Err(MapError::EmptyMap);
        }
        if self.subsectors.is_empty() {
            return Err(MapError::NoSubsectors);
        }

        let check = |kind: &'static str, index: usize, len: usize| -> Result<(), MapError> {
            if index >= len {
                return Err(MapError::IndexOutOfRange { kind, index, len });
            }
            Ok(())
        };

        let sectors: Vec<Sector> = self
            .sectors
            .iter()
            .enumerate()
            .map(|(num, s)| Sector {
                num,
                floorheight: s.floorheight,
                ceilingheight: s.ceilingheight,
                floorpic: s.floorpic,
                ceilingpic: s.ceilingpic,
                lightlevel: s.lightlevel,
                special: s.special,
                tag: s.tag,
                ..Default::default()
            })
            .collect();

        for side in &self.sidedefs {
            check("sector", side.sector, sectors.len())?;
        }

        let mut linedefs = Vec::with_capacity(self.linedefs.len());
        for line in &self.linedefs {
            check("vertex", line.v1, self.vertexes.len())?;
            check("vertex", line.v2, self.vertexes.len())?;
            check("sidedef", line.front, self.sidedefs.len())?;
            if let Some(back) = line.back {
                check("sidedef", back, self.sidedefs.len())?;
            }
            linedefs.push(derive_line(
                line,
                self.vertexes[line.v1],
                self.vertexes[line.v2],
                &self.sidedefs,
            ));
        }

        let mut segments = Vec::with_capacity(self.segments.len());
        for (i, seg) in self.segments.iter().enumerate() {
            check("vertex", seg.v1, self.vertexes.len())?;
            check("vertex", seg.v2, self.vertexes.len())?;
            check("linedef", seg.linedef, linedefs.len())?;
            let line: &LineDef = &linedefs[seg.linedef];
            let (sidedef, backsector) = match seg.side {
                0 => (line.front_sidedef, line.backsector),
                1 => match line.back_sidedef {
                    Some(back) => (back, Some(line.frontsector)),
                    None => return Err(MapError::NoBackSide(i)),
                },
                _ => return Err(MapError::NoBackSide(i)),
            };
            let v1 = self.vertexes[seg.v1];
            let v2 = self.vertexes[seg.v2];
            segments.push(Segment {
                v1,
                v2,
                offset: seg.offset,
                angle: point_to_angle(v1.x, v1.y, v2.x, v2.y),
                linedef: seg.linedef,
                sidedef,
                side: seg.side,
                frontsector: self.sidedefs[sidedef].sector,
                backsector,
            });
        }

        let mut subsectors = Vec::with_capacity(self.subsectors.len());
        for (i, &(start_seg, seg_count)) in self.subsectors.iter().enumerate() {
            if seg_count == 0 {
                return Err(MapError::EmptySubsector(i));
            }
            check("seg", start_seg + seg_count - 1, segments.len())?;
            subsectors.push(SubSector {
                sector: segments[start_seg].frontsector,
                seg_count,
                start_seg,
            });
        }

        for node in &self.nodes {
            for child in node.children {
                match child {
                    NodeChild::Node(n) => check("node", n, self.nodes.len())?,
                    NodeChild::Subsector(s) => check("subsector", s, subsectors.len())?,
                }
            }
        }

        if let Some(reject) = self.reject.as_ref() {
            let expected = (sectors.len() * sectors.len()).div_ceil(8);
            if reject.len() != expected {
                return Err(MapError::RejectSize {
                    expected,
                    got: reject.len(),
                });
            }
        }

        let mut map = MapData {
            vertexes: self.vertexes,
            linedefs,
            sectors,
            sidedefs: self.sidedefs,
            subsectors,
            segments,
            nodes: self.nodes,
            blockmap: BlockMap::default(),
            reject: self.reject,
            sky_flat: self.sky_flat,
            extents: BBox::empty(),
        };
        map.set_extents();
        map.generate_blockmap();
        map.set_sector_lines();
        map.set_block_boxes(self.max_radius);

        info!(
            "{}: Loaded {} linedefs, {} sectors, {} subsectors, {} nodes, {}x{} blocks",
            self.name,
            map.linedefs.len(),
            map.sectors.len(),
            map.subsectors.len(),
            map.nodes.len(),
            map.blockmap.width,
            map.blockmap.height
        );
        Ok(map)
    }
}

fn derive_line(desc: &LineDesc, v1: Vertex, v2: Vertex, sides: &[SideDef]) -> LineDef {
    let dx = v2.x - v1.x;
    let dy = v2.y - v1.y;

    let slopetype = if dx == Fixed::ZERO {
        SlopeType::Vertical
    } else if dy == Fixed::ZERO {
        SlopeType::Horizontal
    } else if (dx.0 ^ dy.0) >= 0 {
        SlopeType::Positive
    } else {
        SlopeType::Negative
    };

    LineDef {
        v1,
        v2,
        dx,
        dy,
        flags: desc.flags,
        special: desc.special,
        tag: desc.tag,
        front_sidedef: desc.front,
        back_sidedef: desc.back,
        bbox: BBox::new(v1, v2),
        slopetype,
        frontsector: sides[desc.front].sector,
        backsector: desc.back.map(|b| sides[b].sector),
        fineangle: point_to_angle(Fixed::ZERO, Fixed::ZERO, dx, dy).fine(),
        validcount: Cell::new(0),
    }
}

/// Immutable per level arrays, apart from sector heights and the dynamic
/// thing lists which the play simulation owns.
#[derive(Debug, Default)]
pub struct MapData {
    vertexes: Vec<Vertex>,
    linedefs: Vec<LineDef>,
    sectors: Vec<Sector>,
    sidedefs: Vec<SideDef>,
    subsectors: Vec<SubSector>,
    segments: Vec<Segment>,
    nodes: Vec<Node>,
    blockmap: BlockMap,
    reject: Option<Vec<u8>>,
    sky_flat: Option<usize>,
    /// Bounding box of every vertex
    extents: BBox,
}

impl MapData {
    #[inline]
    pub fn vertexes(&self) -> &[Vertex] {
        &self.vertexes
    }

    #[inline]
    pub fn linedefs(&self) -> &[LineDef] {
        &self.linedefs
    }

    #[inline]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Heights and specials may change during play, the layout may not
    #[inline]
    pub fn sectors_mut(&mut self) -> &mut [Sector] {
        &mut self.sectors
    }

    #[inline]
    pub fn sidedefs(&self) -> &[SideDef] {
        &self.sidedefs
    }

    #[inline]
    pub fn subsectors(&self) -> &[SubSector] {
        &self.subsectors
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn blockmap(&self) -> &BlockMap {
        &self.blockmap
    }

    #[inline]
    pub(crate) fn blockmap_mut(&mut self) -> &mut BlockMap {
        &mut self.blockmap
    }

    #[inline]
    pub fn extents(&self) -> &BBox {
        &self.extents
    }

    /// The root of the BSP. A map without nodes is a single subsector.
    #[inline]
    pub fn start_node(&self) -> NodeChild {
        if self.nodes.is_empty() {
            NodeChild::Subsector(0)
        } else {
            NodeChild::Node(self.nodes.len() - 1)
        }
    }

    #[inline]
    pub fn has_reject(&self) -> bool {
        self.reject.is_some()
    }

    /// True if the reject matrix says `from` can never see `to`. Without a
    /// matrix nothing is rejected.
    pub fn reject_blocks(&self, from: usize, to: usize) -> bool {
        let Some(reject) = self.reject.as_ref() else {
            return false;
        };
        let pnum = from * self.sectors.len() + to;
        reject
            .get(pnum >> 3)
            .is_some_and(|byte| byte & (1 << (pnum & 7)) != 0)
    }

    /// Is the flat number the sky
    #[inline]
    pub fn is_sky(&self, pic: usize) -> bool {
        self.sky_flat == Some(pic)
    }

    /// The sidedef on `side` of a line, `0` front
    #[inline]
    pub fn line_side(&self, line: usize, side: usize) -> Option<&SideDef> {
        let line = &self.linedefs[line];
        if side == 0 {
            Some(&self.sidedefs[line.front_sidedef])
        } else {
            line.back_sidedef.map(|s| &self.sidedefs[s])
        }
    }

    /// Height of the open span through a line, zero for a one sided line or
    /// a closed door
    pub fn line_opening(&self, line: usize) -> Fixed {
        let line = &self.linedefs[line];
        let Some(back) = line.backsector else {
            return Fixed::ZERO;
        };
        let front = &self.sectors[line.frontsector];
        let back = &self.sectors[back];
        let top = front.ceilingheight.min(back.ceilingheight);
        let bottom = front.floorheight.max(back.floorheight);
        top - bottom
    }

    fn set_extents(&mut self) {
        let mut extents = BBox::empty();
        for v in &self.vertexes {
            extents.add_point(v.x, v.y);
        }
        self.extents = extents;
    }

    /// Lay a grid over the extents and register every line in each block its
    /// bounding box touches
    fn generate_blockmap(&mut self) {
        let margin = Fixed::from_int(BLOCKMAP_MARGIN);
        let x_origin = self.extents.left - margin;
        let y_origin = self.extents.bottom - margin;
        let width = ((self.extents.right - x_origin).0 >> MAPBLOCKSHIFT) as usize + 1;
        let height = ((self.extents.top - y_origin).0 >> MAPBLOCKSHIFT) as usize + 1;

        let mut blockmap =
            BlockMap::new(x_origin, y_origin, width, height, vec![Vec::new(); width * height]);
        for (i, line) in self.linedefs.iter().enumerate() {
            blockmap.add_line(i, &line.bbox);
        }
        debug!("Generated blockmap, {} blocks", blockmap.len());
        self.blockmap = blockmap;
    }

    fn set_sector_lines(&mut self) {
        for (i, line) in self.linedefs.iter().enumerate() {
            self.sectors[line.frontsector].lines.push(i);
            if let Some(back) = line.backsector {
                if back != line.frontsector {
                    self.sectors[back].lines.push(i);
                }
            }
        }
    }

    /// Sound origins and the sector block boxes used by sector height
    /// changes. The box grows by `max_radius` as things are linked in to the
    /// block holding their origin and may overhang it.
    pub(crate) fn set_block_boxes(&mut self, max_radius: Fixed) {
        for sector in self.sectors.iter_mut() {
            let mut bbox = BBox::empty();
            for &l in &sector.lines {
                let line = &self.linedefs[l];
                bbox.add_point(line.v1.x, line.v1.y);
                bbox.add_point(line.v2.x, line.v2.y);
            }
            if sector.lines.is_empty() {
                sector.blockbox = Default::default();
                continue;
            }
            sector.sound_origin = Vertex::new(
                Fixed((bbox.left.0 >> 1) + (bbox.right.0 >> 1)),
                Fixed((bbox.bottom.0 >> 1) + (bbox.top.0 >> 1)),
            );
            sector.blockbox = self.blockmap.range(&bbox, max_radius);
        }
    }

    /// Line of a seg
    #[inline]
    pub fn seg_line(&self, seg: usize) -> &LineDef {
        &self.linedefs[self.segments[seg].linedef]
    }

    /// Facing angle of a seg
    #[inline]
    pub fn seg_angle(&self, seg: usize) -> Angle {
        self.segments[seg].angle
    }

    /// Two sided lines that do not carry the flag are treated as solid by
    /// shots but not by movement
    #[inline]
    pub fn line_is_two_sided(&self, line: usize) -> bool {
        self.linedefs[line].has_flag(LineDefFlags::TwoSided)
    }
}
