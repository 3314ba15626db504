//! Planar geometry for the delivery area.
//!
//! All coordinates are meter offsets from the Nest, which sits at the origin.

use serde::{Deserialize, Serialize};

/// A point in the delivery area, in meters north and east of the Nest.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub north_m: f64,
    pub east_m: f64,
}

impl Location {
    /// The Nest. Every flight launches from and returns to here.
    pub const NEST: Location = Location {
        north_m: 0.0,
        east_m: 0.0,
    };

    pub fn new(north_m: f64, east_m: f64) -> Self {
        Self { north_m, east_m }
    }

    /// Straight-line distance to another location in meters.
    pub fn distance_to(&self, other: &Location) -> f64 {
        distance(self, other)
    }

    /// Straight-line distance from the Nest in meters.
    pub fn distance_from_nest(&self) -> f64 {
        distance(&Location::NEST, self)
    }
}

/// Euclidean distance between two locations in meters.
pub fn distance(a: &Location, b: &Location) -> f64 {
    let dn = a.north_m - b.north_m;
    let de = a.east_m - b.east_m;
    dn.hypot(de)
}
