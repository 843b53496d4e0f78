//! Great-circle math on WGS84 degrees: haversine distance, initial bearing,
//! and the coarse classification of a bearing into a turn or a compass point.
//!
//! Nothing here validates its input. A latitude outside `[-90, 90]` is fed to
//! the trigonometry as-is and produces whatever the formulas produce.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::route::Direction;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub type Degrees = f64;
pub type Meters = f64;

/// A position on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: Degrees,
    pub longitude: Degrees,
}

impl Coordinate {
    pub fn new(latitude: Degrees, longitude: Degrees) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Shorthand for [`distance_meters`] from `self` to `other`.
    pub fn distance_to(&self, other: &Self) -> Meters {
        distance_meters(self, other)
    }

    /// Shorthand for [`initial_bearing_degrees`] from `self` to `other`.
    pub fn bearing_to(&self, other: &Self) -> Degrees {
        initial_bearing_degrees(self, other)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between `a` and `b` using the haversine formula.
/// Symmetric, and exactly zero when `a == b`.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> Meters {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Forward azimuth from `a` towards `b`, in `[0, 360)` with 0 = north.
pub fn initial_bearing_degrees(a: &Coordinate, b: &Coordinate) -> Degrees {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    let raw = y.atan2(x).to_degrees();
    (raw + 360.0) % 360.0
}

/// Maps a bearing onto the turn the route should announce.
///
/// Lower quadrant edges are inclusive:
///
/// | bearing             | direction  |
/// |---------------------|------------|
/// | `[315, 360) ∪ [0, 45)` | `Straight` |
/// | `[45, 135)`         | `Right`    |
/// | `[135, 225)`        | `Straight` |
/// | `[225, 315)`        | `Left`     |
///
/// The rear quadrant maps to `Straight`, same as the forward one. There is
/// no U-turn direction.
pub fn classify_bearing(bearing: Degrees) -> Direction {
    if bearing >= 315.0 || bearing < 45.0 {
        Direction::Straight
    } else if bearing < 135.0 {
        Direction::Right
    } else if bearing < 225.0 {
        Direction::Straight
    } else {
        Direction::Left
    }
}

/// The four compass points, used when describing where a place lies rather
/// than which way to turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassPoint {
    North,
    East,
    South,
    West,
}

impl CompassPoint {
    /// Same quadrant edges as [`classify_bearing`], but the rear quadrant
    /// is south.
    pub fn from_bearing(bearing: Degrees) -> Self {
        if bearing >= 315.0 || bearing < 45.0 {
            CompassPoint::North
        } else if bearing < 135.0 {
            CompassPoint::East
        } else if bearing < 225.0 {
            CompassPoint::South
        } else {
            CompassPoint::West
        }
    }
}

impl Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompassPoint::North => "north",
            CompassPoint::East => "east",
            CompassPoint::South => "south",
            CompassPoint::West => "west",
        };
        write!(f, "{}", name)
    }
}

/// Human readable distance: whole meters below a kilometer, tenths of a
/// kilometer above.
pub fn format_distance(meters: Meters) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
