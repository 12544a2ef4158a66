//! Constants shared by the play simulation. Distances are in whole map units
//! unless the type is `Fixed`.

use math::{FRACUNIT, Fixed};

pub const TICRATE: i32 = 35;

pub const MELEERANGE: i32 = 64;
pub const MISSILERANGE: i32 = 32 * 64;
/// Reach of the use action
pub const USERANGE: i32 = 70;
pub const FLOATSPEED: Fixed = Fixed(4 * FRACUNIT);
pub const GRAVITY: Fixed = Fixed(FRACUNIT);
/// Largest radius of any thing, things can overhang their block by this much
pub const MAXRADIUS: i32 = 32;
/// Step up and dropoff limit
pub const STEPHEIGHT: i32 = 24;
/// Per step momentum cap
pub const MAXMOVE: i32 = 16;
/// Radius the player slides with when it is the larger
pub const CLIPRADIUS: i32 = 23;
/// Resolve passes for a slide
pub const SLIDE_ITERATIONS: u32 = 8;

pub const STOPSPEED: Fixed = Fixed(0x1000);
pub const FRICTION: Fixed = Fixed(0xD240);

/// Spawn on the floor of the sector
pub const ONFLOORZ: Fixed = Fixed::MIN;
/// Spawn against the ceiling of the sector
pub const ONCEILINGZ: Fixed = Fixed::MAX;

/// Aim window of a default attack, about the vertical field of view
pub const AIM_TOP_SLOPE: Fixed = Fixed(100 * FRACUNIT / 160);
pub const AIM_BOTTOM_SLOPE: Fixed = Fixed(-100 * FRACUNIT / 160);
