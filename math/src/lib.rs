//! Fixed point maths, binary angles, lookup tables and the odd bit of f32
//! geometry shared by the play simulation.

mod angle;
mod fixed_point;
mod intercept;
mod trig;

use std::f32::consts::PI;

pub use angle::*;
pub use fixed_point::*;
use glam::Vec2;
pub use intercept::*;
pub use trig::*;

const FRACUNIT_F32: f32 = FRACUNIT as f32;

/// Convert a Doom `fixed_t` fixed-point float to `f32`
pub const fn fixed_to_float(value: i32) -> f32 {
    value as f32 / FRACUNIT_F32
}

/// Convert an `f32` to a Doom `fixed_t`, truncating
pub fn float_to_fixed(value: f32) -> i32 {
    (value * FRACUNIT_F32) as i32
}

const DEG_TO_RAD: f32 = PI / 180.0;

/// Convert a BAM (Binary Angle Measure) to radians
#[inline]
pub const fn bam_to_radian(value: u32) -> f32 {
    (value as f32 * 8.381_903e-8) * DEG_TO_RAD
}

pub const RNDTABLE: [i32; 256] = [
    0, 8, 109, 220, 222, 241, 149, 107, 75, 248, 254, 140, 16, 66, 74, 21, 211, 47, 80, 242, 154,
    27, 205, 128, 161, 89, 77, 36, 95, 110, 85, 48, 212, 140, 211, 249, 22, 79, 200, 50, 28, 188,
    52, 140, 202, 120, 68, 145, 62, 70, 184, 190, 91, 197, 152, 224, 149, 104, 25, 178, 252, 182,
    202, 182, 141, 197, 4, 81, 181, 242, 145, 42, 39, 227, 156, 198, 225, 193, 219, 93, 122, 175,
    249, 0, 175, 143, 70, 239, 46, 246, 163, 53, 163, 109, 168, 135, 2, 235, 25, 92, 20, 145, 138,
    77, 69, 166, 78, 176, 173, 212, 166, 113, 94, 161, 41, 50, 239, 49, 111, 164, 70, 60, 2, 37,
    171, 75, 136, 156, 11, 56, 42, 146, 138, 229, 73, 146, 77, 61, 98, 196, 135, 106, 63, 197, 195,
    86, 96, 203, 113, 101, 170, 247, 181, 113, 80, 250, 108, 7, 255, 237, 129, 226, 79, 107, 112,
    166, 103, 241, 24, 223, 239, 120, 198, 58, 60, 82, 128, 3, 184, 66, 143, 224, 145, 224, 81,
    206, 163, 45, 63, 90, 168, 114, 59, 33, 159, 95, 28, 139, 123, 98, 125, 196, 15, 70, 194, 253,
    54, 14, 109, 226, 71, 17, 161, 93, 186, 87, 244, 138, 20, 52, 123, 251, 26, 36, 17, 46, 52,
    231, 232, 76, 31, 221, 84, 37, 216, 165, 212, 106, 197, 242, 98, 43, 39, 175, 254, 145, 190,
    84, 118, 222, 187, 136, 120, 163, 236, 249,
];

/// The play random table cursor. Each level owns one so a replay of the same
/// inputs walks the same sequence.
#[derive(Debug, Default, Clone)]
pub struct RandomTable {
    index: usize,
}

impl RandomTable {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    #[inline]
    pub fn p_random(&mut self) -> i32 {
        self.index = (self.index + 1) & 0xFF;
        RNDTABLE[self.index]
    }

    /// Difference of two rolls, `-255..=255`
    #[inline]
    pub fn p_subrandom(&mut self) -> i32 {
        let r = self.p_random();
        r - self.p_random()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.index = 0;
    }
}

/// Do a 2d XY projection of `this` on to `onto`
#[inline]
pub fn project_vec2d(this: Vec2, onto: Vec2) -> Vec2 {
    let d = onto.dot(onto);
    if d > 0.0 {
        let dp = this.dot(onto);
        return onto * (dp / d);
    }
    onto
}

/// Penetration depth of a point inside a circle
#[inline]
pub fn circle_point_intersect(origin: Vec2, radius: f32, point: Vec2) -> Option<f32> {
    let len = (point - origin).length();
    if len < radius {
        return Some(radius - len);
    }
    None
}

/// Penetration depth of two overlapping circles
#[inline]
pub fn circle_circle_intersect(
    origin: Vec2,
    origin_radius: f32,
    point: Vec2,
    point_radius: f32,
) -> Option<f32> {
    let len = (point - origin).length();
    if len < origin_radius + point_radius {
        return Some(origin_radius + point_radius - len);
    }
    None
}
