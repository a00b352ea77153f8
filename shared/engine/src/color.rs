use crate::error::ParseColorError;
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

pub const MAX_PACKED: u32 = 0xff_ffff;

/// A pigment key. On the wire this is a packed 24-bit RGB integer; ordering is by
/// packed value, which is also the nearest-color tie-break order.
#[derive(Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub struct Color(u32);

impl Color {
    pub fn from_packed(packed: u32) -> Option<Color> {
        if packed > MAX_PACKED {
            None
        } else {
            Some(Color(packed))
        }
    }

    pub fn packed(self) -> u32 {
        self.0
    }

    pub fn rgb(self) -> Rgb {
        Rgb::unpack(self.0)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color(rgb.pack())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Color::from_packed)
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const WHITE: Rgb = Rgb::new(255, 255, 255);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    pub fn pack(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn unpack(packed: u32) -> Rgb {
        let extract = |k: u32| ((packed >> (k * 8)) & 0xff) as u8;
        Rgb::new(extract(2), extract(1), extract(0))
    }

    pub fn is_white(self) -> bool {
        self == WHITE
    }

    pub fn distance(self, other: Rgb) -> f64 {
        let sq = |a: u8, b: u8| {
            let d = a as f64 - b as f64;
            d * d
        };
        (sq(self.r, other.r) + sq(self.g, other.g) + sq(self.b, other.b)).sqrt()
    }
}

/// A batch of pigment: a color plus how many units of it there are.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct WeightedColor {
    pub rgb: Rgb,
    pub amount: u64,
}

impl WeightedColor {
    pub fn new(rgb: Rgb, amount: u64) -> WeightedColor {
        WeightedColor { rgb, amount }
    }

    /// Duplicates the batch `factor` times. Only the amount changes.
    pub fn scaled(self, factor: u64) -> WeightedColor {
        WeightedColor {
            rgb: self.rgb,
            amount: self.amount.saturating_mul(factor),
        }
    }

    /// Removes `units` from the batch, or returns `None` if there are not enough.
    pub fn take(&mut self, units: u64) -> Option<u64> {
        let remaining = self.amount.checked_sub(units)?;
        self.amount = remaining;
        Some(remaining)
    }
}

impl Mul<u64> for WeightedColor {
    type Output = WeightedColor;

    fn mul(self, factor: u64) -> WeightedColor {
        self.scaled(factor)
    }
}

impl Add for WeightedColor {
    type Output = WeightedColor;

    /// Mixes two batches: channels are the amount-weighted average, truncated.
    /// The combined amount saturates at `u64::MAX`.
    fn add(self, other: WeightedColor) -> WeightedColor {
        let total = self.amount as u128 + other.amount as u128;
        if total == 0 {
            return WeightedColor::new(self.rgb, 0);
        }
        let mix = |a: u8, b: u8| {
            ((a as u128 * self.amount as u128 + b as u128 * other.amount as u128) / total) as u8
        };
        WeightedColor {
            rgb: Rgb::new(
                mix(self.rgb.r, other.rgb.r),
                mix(self.rgb.g, other.rgb.g),
                mix(self.rgb.b, other.rgb.b),
            ),
            amount: self.amount.saturating_add(other.amount),
        }
    }
}
