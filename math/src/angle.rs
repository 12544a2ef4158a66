use glam::Vec2;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::bam_to_radian;
use crate::fixed_point::Fixed;
use crate::trig::{ANGLETOFINESHIFT, finecosine, finesine, slope_div, tan_to_angle};

/// Binary angle measure, the full `u32` range is one turn. Wraps naturally.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(pub u32);

impl Angle {
    pub const ANG45: Angle = Angle(0x2000_0000);
    pub const ANG90: Angle = Angle(0x4000_0000);
    pub const ANG180: Angle = Angle(0x8000_0000);
    pub const ANG270: Angle = Angle(0xC000_0000);

    #[inline]
    pub const fn new(bam: u32) -> Self {
        Angle(bam)
    }

    pub fn from_degrees(degrees: f32) -> Self {
        let turns = degrees.rem_euclid(360.0) as f64 / 360.0;
        Angle((turns * (u32::MAX as f64 + 1.0)) as u64 as u32)
    }

    #[inline]
    pub const fn bam(&self) -> u32 {
        self.0
    }

    /// Index in to the fine tables
    #[inline]
    pub const fn fine(&self) -> usize {
        (self.0 >> ANGLETOFINESHIFT) as usize
    }

    #[inline]
    pub fn sin(&self) -> Fixed {
        finesine(self.fine())
    }

    #[inline]
    pub fn cos(&self) -> Fixed {
        finecosine(self.fine())
    }

    #[inline]
    pub fn rad(&self) -> f32 {
        bam_to_radian(self.0)
    }

    #[inline(always)]
    pub fn unit(&self) -> Vec2 {
        let (y, x) = self.rad().sin_cos();
        Vec2::new(x, y)
    }
}

impl Add for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: Angle) -> Angle {
        Angle(self.0.wrapping_add(other.0))
    }
}

impl AddAssign for Angle {
    #[inline]
    fn add_assign(&mut self, other: Angle) {
        self.0 = self.0.wrapping_add(other.0);
    }
}

impl Sub for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, other: Angle) -> Angle {
        Angle(self.0.wrapping_sub(other.0))
    }
}

impl SubAssign for Angle {
    #[inline]
    fn sub_assign(&mut self, other: Angle) {
        self.0 = self.0.wrapping_sub(other.0);
    }
}

impl Neg for Angle {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Angle(self.0.wrapping_neg())
    }
}

/// Angle for a slope of `num / den` where `num <= den`
#[inline]
pub fn slope_angle(num: Fixed, den: Fixed) -> Angle {
    Angle(tan_to_angle(slope_div(num.0 as u32, den.0 as u32)))
}

/// `R_PointToAngle2`. The delta is folded in to the first octant, then the
/// slope is looked up in the tan-to-angle table.
pub fn point_to_angle(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Angle {
    let mut x = x2 - x1;
    let mut y = y2 - y1;

    if x == Fixed::ZERO && y == Fixed::ZERO {
        return Angle(0);
    }

    if x >= Fixed::ZERO {
        if y >= Fixed::ZERO {
            if x > y {
                // octant 0
                return slope_angle(y, x);
            }
            // octant 1
            return Angle(Angle::ANG90.0 - 1) - slope_angle(x, y);
        }
        y = -y;
        if x > y {
            // octant 6
            return -slope_angle(y, x);
        }
        // octant 7
        return Angle::ANG270 + slope_angle(x, y);
    }

    x = -x;
    if y >= Fixed::ZERO {
        if x > y {
            // octant 3
            return Angle(Angle::ANG180.0 - 1) - slope_angle(y, x);
        }
        // octant 2
        return Angle::ANG90 + slope_angle(x, y);
    }
    y = -y;
    if x > y {
        // octant 4
        return Angle::ANG180 + slope_angle(y, x);
    }
    // octant 5
    Angle(Angle::ANG270.0 - 1) - slope_angle(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Angle, b: Angle) -> bool {
        let d = a.0.wrapping_sub(b.0) as i32;
        d.unsigned_abs() < 0x0020_0000
    }

    #[test]
    fn cardinal_points() {
        let z = Fixed::ZERO;
        let one = Fixed::from_int(64);
        assert_eq!(point_to_angle(z, z, one, z), Angle(0));
        assert!(close(point_to_angle(z, z, z, one), Angle::ANG90));
        assert!(close(point_to_angle(z, z, -one, z), Angle::ANG180));
        assert!(close(point_to_angle(z, z, z, -one), Angle::ANG270));
        assert!(close(point_to_angle(z, z, one, one), Angle::ANG45));
        assert!(close(
            point_to_angle(z, z, -one, -one),
            Angle::ANG180 + Angle::ANG45
        ));
        assert_eq!(point_to_angle(one, one, one, one), Angle(0));
    }

    #[test]
    fn wraps() {
        let a = Angle::ANG270 + Angle::ANG180;
        assert_eq!(a, Angle::ANG90);
        assert_eq!(-Angle::ANG90, Angle::ANG270);
        assert!(close(Angle::from_degrees(-90.0), Angle::ANG270));
        assert_eq!(Angle::ANG90.fine(), 2048);
    }

    #[test]
    fn table_trig() {
        assert!(Angle::ANG90.sin() > Fixed(65000));
        assert!(Angle::ANG180.cos() < Fixed(-65000));
        assert!(Angle(0).sin().abs() < Fixed(30));
    }
}
