//! Physical lengths
//!
//! OOXML measures in several units depending on the attribute: twentieths
//! of a point (twips) for page and paragraph geometry, half-points for font
//! sizes and English Metric Units (EMUs) for drawings. A [`Length`] stores
//! EMUs, which every one of those units divides exactly.

use std::fmt;

/// EMUs per inch (914400)
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per centimeter
pub const EMU_PER_CM: i64 = 360_000;

/// EMUs per point
pub const EMU_PER_PT: i64 = 12_700;

/// EMUs per twentieth of a point
pub const EMU_PER_TWIP: i64 = 635;

/// EMUs per pixel at 96 DPI (9525)
pub const EMU_PER_PIXEL: i64 = 9_525;

/// A length, stored in EMUs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Length(i64);

impl Length {
    /// Zero length
    pub const ZERO: Length = Length(0);

    /// From English Metric Units
    pub const fn emu(emu: i64) -> Self {
        Self(emu)
    }

    /// From twentieths of a point
    pub const fn twip(twip: i64) -> Self {
        Self(twip * EMU_PER_TWIP)
    }

    /// From points
    pub fn pt(pt: f64) -> Self {
        Self((pt * EMU_PER_PT as f64).round() as i64)
    }

    /// From half-points (font sizes)
    pub const fn half_points(hpt: i64) -> Self {
        Self(hpt * EMU_PER_PT / 2)
    }

    /// From centimeters
    pub fn cm(cm: f64) -> Self {
        Self((cm * EMU_PER_CM as f64).round() as i64)
    }

    /// From inches
    pub fn inch(inch: f64) -> Self {
        Self((inch * EMU_PER_INCH as f64).round() as i64)
    }

    /// From pixels at 96 DPI
    pub const fn px(px: i64) -> Self {
        Self(px * EMU_PER_PIXEL)
    }

    /// Value in EMUs
    pub const fn as_emu(self) -> i64 {
        self.0
    }

    /// Value in twips, rounded
    pub fn as_twip(self) -> i64 {
        (self.0 as f64 / EMU_PER_TWIP as f64).round() as i64
    }

    /// Value in points
    pub fn as_pt(self) -> f64 {
        self.0 as f64 / EMU_PER_PT as f64
    }

    /// Value in half-points, rounded
    pub fn as_half_points(self) -> i64 {
        (self.0 as f64 * 2.0 / EMU_PER_PT as f64).round() as i64
    }

    /// Value in centimeters
    pub fn as_cm(self) -> f64 {
        self.0 as f64 / EMU_PER_CM as f64
    }

    /// Value in inches
    pub fn as_inch(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    /// Value in pixels at 96 DPI, rounded
    pub fn as_px(self) -> i64 {
        (self.0 as f64 / EMU_PER_PIXEL as f64).round() as i64
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Length {
    fn sum<I: Iterator<Item = Length>>(iter: I) -> Length {
        iter.fold(Length::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pt", self.as_pt())
    }
}
