//! Spatial queries and movement collision for a Doom style level.
//!
//! The static geometry is built once through [`MapBuilder`]. A [`Level`] owns
//! it along with every movable [`MapObject`], and provides point location,
//! thing linkage, position checks, movement and sliding, sight, hitscan and
//! sector height changes. Everything that decides *what happens* when a thing
//! is hit or a line is crossed is delegated to an [`Interactions`] impl.
#![allow(clippy::new_without_default)]

use std::error::Error;
use std::fmt;

pub mod config;
pub mod doom_def;
pub mod level;
pub mod thing;
pub mod utilities;

pub use config::{ConfigError, SimConfig};
pub use level::Level;
pub use level::blockmap::{BlockMap, BlockRange};
pub use level::flags::LineDefFlags;
pub use level::map_data::{LineDesc, MapBuilder, MapData, SectorDesc, SegDesc};
pub use level::map_defs::{
    BBox, LineDef, Node, NodeChild, Sector, Segment, SideDef, SlopeType, SubSector, Vertex,
};
pub use log;
pub use thing::change::{Plane, PlaneResult};
pub use thing::interact::{Interactions, NoInteractions};
pub use thing::movement::PositionCheck;
pub use thing::shooting::ShotImpact;
pub use thing::slide::SlideResult;
pub use thing::{MapObjFlag, MapObject, ThingId};
pub use utilities::PortalZ;

/// Reasons a set of level records can not be turned in to a `MapData`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// No vertexes, lines or sectors
    EmptyMap,
    /// A map needs at least one subsector even if it has no nodes
    NoSubsectors,
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    /// The seg runs along the back of a one sided line
    NoBackSide(usize),
    EmptySubsector(usize),
    RejectSize {
        expected: usize,
        got: usize,
    },
}

impl Error for MapError {}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::EmptyMap => write!(f, "map has no vertexes, lines or sectors"),
            MapError::NoSubsectors => write!(f, "map has no subsectors"),
            MapError::IndexOutOfRange { kind, index, len } => {
                write!(f, "{} index {} out of range, only {} exist", kind, index, len)
            }
            MapError::NoBackSide(seg) => {
                write!(f, "seg {} is on the missing side of a one sided line", seg)
            }
            MapError::EmptySubsector(s) => write!(f, "subsector {} has no segs", s),
            MapError::RejectSize { expected, got } => {
                write!(f, "reject matrix is {} bytes, expected {}", got, expected)
            }
        }
    }
}
