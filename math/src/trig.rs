//! Fine trig and slope tables. Generated once on first use; the values match
//! the shipped Doom tables to within a unit in the last place.

use std::f64::consts::TAU;
use std::sync::LazyLock;

use crate::fixed_point::{FRACBITS, FRACUNIT, Fixed};

/// Size of the fine angle tables
pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
/// Shift to get from a BAM to a fine angle index
pub const ANGLETOFINESHIFT: u32 = 19;

/// Entries in the tan-to-angle table, minus the trailing 45 degree entry
pub const SLOPERANGE: usize = 2048;
pub const SLOPEBITS: u32 = 11;
pub const DBITS: u32 = FRACBITS - SLOPEBITS;

/// Sine with a quarter turn of overlap so cosine can index into it
static FINE_SINE: LazyLock<Vec<Fixed>> = LazyLock::new(|| {
    (0..FINEANGLES * 5 / 4)
        .map(|i| {
            let a = (i as f64 + 0.5) * TAU / FINEANGLES as f64;
            Fixed((a.sin() * FRACUNIT as f64) as i32)
        })
        .collect()
});

static TAN_TO_ANGLE: LazyLock<Vec<u32>> = LazyLock::new(|| {
    (0..=SLOPERANGE)
        .map(|i| {
            let t = (i as f64 / SLOPERANGE as f64).atan();
            (t * (u32::MAX as f64 + 1.0) / TAU) as u32
        })
        .collect()
});

#[inline]
pub fn finesine(fine: usize) -> Fixed {
    FINE_SINE[fine & FINEMASK]
}

#[inline]
pub fn finecosine(fine: usize) -> Fixed {
    FINE_SINE[(fine & FINEMASK) + FINEANGLES / 4]
}

/// BAM for `atan(index / SLOPERANGE)`; index is clamped
#[inline]
pub fn tan_to_angle(index: usize) -> u32 {
    TAN_TO_ANGLE[index.min(SLOPERANGE)]
}

/// Index into the tan-to-angle table for `num / den`, where `num <= den`
#[inline]
pub fn slope_div(num: u32, den: u32) -> usize {
    if den < 512 {
        return SLOPERANGE;
    }
    let ans = ((num as u64) << 3) / ((den >> 8) as u64);
    (ans as usize).min(SLOPERANGE)
}
