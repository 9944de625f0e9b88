//! Hex coordinate system for battle grids (cube coordinates)
//!
//! Positions are stored as axial (q, r) with the third cube axis derived, so
//! q + r + s = 0 holds by construction. Real-valued intermediates from
//! interpolation, pixel conversion and direction vectors live in
//! [`FractionalHex`] and only become positions through [`FractionalHex::round`].

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::HexKeyError;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Cube hex coordinate on the battle grid
///
/// Ordered by (q, r); that order is the tie-break wherever the engine has to
/// pick between equally good hexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexPosition {
    pub q: i32,
    pub r: i32,
}

impl HexPosition {
    pub const ORIGIN: HexPosition = HexPosition { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Manhattan distance in cube space
    ///
    /// Computed in i64 so positions at the far ends of the i32 range cannot
    /// overflow; saturates at `u32::MAX`.
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = self.q as i64 - other.q as i64;
        let dr = self.r as i64 - other.r as i64;
        let steps = (dq.abs() + dr.abs() + (dq + dr).abs()) / 2;
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// Distance from the origin, i.e. the largest absolute cube coordinate
    pub fn magnitude(&self) -> i32 {
        let (q, r) = (self.q as i64, self.r as i64);
        let largest = q.abs().max(r.abs()).max((q + r).abs());
        i32::try_from(largest).unwrap_or(i32::MAX)
    }

    pub fn neighbor(&self, direction: HexDirection) -> Self {
        *self + direction.offset()
    }

    /// All 6 neighbors, in `HexDirection::all()` order
    pub fn neighbors(&self) -> [HexPosition; 6] {
        HexDirection::all().map(|dir| self.neighbor(dir))
    }

    pub fn scale(&self, factor: i32) -> Self {
        Self::new(self.q * factor, self.r * factor)
    }

    /// Get all hexes within range (inclusive), q-major order
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexPosition> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexPosition::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Hexes at exactly `radius` steps, walking the six sides from the
    /// south-west corner
    pub fn ring(&self, radius: u32) -> Vec<HexPosition> {
        if radius == 0 {
            return vec![*self];
        }

        let mut results = Vec::new();
        let mut hex = *self + HexDirection::SouthWest.offset().scale(radius as i32);
        for direction in HexDirection::all() {
            for _ in 0..radius {
                results.push(hex);
                hex = hex.neighbor(direction);
            }
        }
        results
    }

    /// Linear interpolation in cube space
    pub fn lerp(&self, other: &Self, t: f64) -> FractionalHex {
        FractionalHex::from(*self).lerp(&FractionalHex::from(*other), t)
    }

    /// Hexes on the straight line from self to other, both ends included
    pub fn line_to(&self, other: &Self) -> Vec<HexPosition> {
        let n = self.distance(other);
        let mut results: Vec<HexPosition> = Vec::with_capacity(n as usize + 1);

        for i in 0..=n {
            let t = if n == 0 { 0.0 } else { i as f64 / n as f64 };
            let hex = self.lerp(other, t).round();
            if results.last() != Some(&hex) {
                results.push(hex);
            }
        }
        results
    }

    /// Unit-length cube vector toward `other`; zero when they coincide
    pub fn direction_to(&self, other: &Self) -> FractionalHex {
        let dq = (other.q - self.q) as f64;
        let dr = (other.r - self.r) as f64;
        let ds = (other.s() - self.s()) as f64;

        let magnitude = (dq * dq + dr * dr + ds * ds).sqrt();
        if magnitude == 0.0 {
            return FractionalHex::default();
        }

        FractionalHex {
            q: dq / magnitude,
            r: dr / magnitude,
            s: ds / magnitude,
        }
    }

    /// Step `distance` toward the grid center and snap to a hex
    ///
    /// Used to push a combatant back out of the hazard ring.
    pub fn nearest_center_hex(&self, distance: u32) -> HexPosition {
        let step = self.direction_to(&Self::ORIGIN).scale(distance as f64);
        (FractionalHex::from(*self) + step).round()
    }

    /// Flat-top hex center in screen space
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let q = self.q as f64;
        let r = self.r as f64;
        let x = hex_size * (1.5 * q);
        let y = hex_size * (SQRT_3 / 2.0 * q + SQRT_3 * r);
        (x, y)
    }

    /// Hex containing a screen-space point (flat-top layout)
    pub fn from_pixel(x: f64, y: f64, hex_size: f64) -> HexPosition {
        let q = (2.0 / 3.0 * x) / hex_size;
        let r = (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / hex_size;
        FractionalHex::new(q, r).round()
    }

    /// Lossless `"q,r"` key for string-keyed storage
    pub fn to_key(&self) -> String {
        self.to_string()
    }

    pub fn from_key(key: &str) -> Result<Self, HexKeyError> {
        key.parse()
    }
}

impl Add for HexPosition {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexPosition {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl fmt::Display for HexPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for HexPosition {
    type Err = HexKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (q, r) = key
            .split_once(',')
            .ok_or_else(|| HexKeyError::Malformed(key.to_string()))?;

        let parse_axis = |value: &str, axis: char| {
            value
                .trim()
                .parse::<i32>()
                .map_err(|_| HexKeyError::NotAnInteger {
                    axis,
                    key: key.to_string(),
                })
        };

        Ok(Self::new(parse_axis(q, 'q')?, parse_axis(r, 'r')?))
    }
}

// Positions serialize as their key so position-keyed maps become plain
// string-keyed objects.
impl Serialize for HexPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Real-valued cube coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FractionalHex {
    pub q: f64,
    pub r: f64,
    pub s: f64,
}

impl FractionalHex {
    /// Axial input, s derived
    pub fn new(q: f64, r: f64) -> Self {
        Self { q, r, s: -q - r }
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            q: self.q * (1.0 - t) + other.q * t,
            r: self.r * (1.0 - t) + other.r * t,
            s: self.s * (1.0 - t) + other.s * t,
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            q: self.q * factor,
            r: self.r * factor,
            s: self.s * factor,
        }
    }

    /// Snap to the nearest valid hex
    ///
    /// The axis with the largest rounding error is re-derived from the other
    /// two. Halves round up on every axis so all runtimes agree on ties.
    pub fn round(&self) -> HexPosition {
        let mut rq = round_half_up(self.q);
        let mut rr = round_half_up(self.r);
        let rs = round_half_up(self.s);

        let q_diff = (rq - self.q).abs();
        let r_diff = (rr - self.r).abs();
        let s_diff = (rs - self.s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        HexPosition::new(rq as i32, rr as i32)
    }
}

impl From<HexPosition> for FractionalHex {
    fn from(hex: HexPosition) -> Self {
        Self {
            q: hex.q as f64,
            r: hex.r as f64,
            s: hex.s() as f64,
        }
    }
}

impl Add for FractionalHex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            q: self.q + rhs.q,
            r: self.r + rhs.r,
            s: self.s + rhs.s,
        }
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Direction enum for hex facing and neighbor order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// Get the hex offset for this direction
    pub fn offset(&self) -> HexPosition {
        match self {
            HexDirection::East => HexPosition::new(1, 0),
            HexDirection::NorthEast => HexPosition::new(1, -1),
            HexDirection::NorthWest => HexPosition::new(0, -1),
            HexDirection::West => HexPosition::new(-1, 0),
            HexDirection::SouthWest => HexPosition::new(-1, 1),
            HexDirection::SouthEast => HexPosition::new(0, 1),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }

    /// All directions
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }
}
