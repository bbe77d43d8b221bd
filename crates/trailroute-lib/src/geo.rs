//! Great-circle math over WGS84 coordinates.
//!
//! Everything here is a pure function of its inputs. Distances are metres on a
//! spherical earth of radius [`EARTH_RADIUS_M`], which is also the model the graph
//! build pipeline uses for edge lengths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of latitude (and of longitude at the equator) in metres.
pub const METRES_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// A latitude/longitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate in metres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_distance(*self, *other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Error returned when parsing a `lat,lon` pair fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCoordinateError(String);

impl fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid coordinate '{}'; expected LAT,LON", self.0)
    }
}

impl std::error::Error for ParseCoordinateError {}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ParseCoordinateError(value.to_string());
        let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid());
        }
        Ok(Coordinate::new(latitude, longitude))
    }
}

/// Axis-aligned latitude/longitude rectangle used for spatial pre-filtering.
///
/// Boxes never wrap the antimeridian; `west <= east` always holds for boxes built
/// by [`BoundingBox::around`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north: north.max(south),
            south: south.min(north),
            east,
            west,
        }
    }

    /// Smallest box guaranteed to contain every point within `radius_m` metres of
    /// `center`.
    pub fn around(center: Coordinate, radius_m: f64) -> Self {
        Self {
            north: center.latitude,
            south: center.latitude,
            east: center.longitude,
            west: center.longitude,
        }
        .expanded(radius_m)
    }

    /// Grow the box by `metres` on every side.
    ///
    /// The longitude margin is computed at the poleward edge of the grown box, so
    /// it never rejects a point within `metres` of the original box.
    pub fn expanded(&self, metres: f64) -> Self {
        let metres = metres.max(0.0);
        let lat_delta = metres / METRES_PER_DEGREE;
        let poleward = (self.north.abs().max(self.south.abs()) + lat_delta).min(89.999);
        let lon_delta = (metres / (METRES_PER_DEGREE * poleward.to_radians().cos())).min(180.0);

        Self {
            north: (self.north + lat_delta).min(90.0),
            south: (self.south - lat_delta).max(-90.0),
            east: (self.east + lon_delta).min(180.0),
            west: (self.west - lon_delta).max(-180.0),
        }
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.south..=self.north).contains(&coordinate.latitude)
            && (self.west..=self.east).contains(&coordinate.longitude)
    }

    /// Whether the straight segment `a..b` touches the box, in degree space.
    pub fn intersects_segment(&self, a: Coordinate, b: Coordinate) -> bool {
        // Liang-Barsky clipping of the segment parameter range [0, 1].
        let (dx, dy) = (b.longitude - a.longitude, b.latitude - a.latitude);
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (p, q) in [
            (-dx, a.longitude - self.west),
            (dx, self.east - a.longitude),
            (-dy, a.latitude - self.south),
            (dy, self.north - a.latitude),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return false;
            }
        }
        true
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

/// Great-circle distance between two coordinates in metres.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Closest point on a segment to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Projected point on the segment.
    pub point: Coordinate,
    /// Position along the segment, `0.0` at `start` and `1.0` at `end`.
    pub fraction: f64,
    /// Great-circle distance from the query point to `point` in metres.
    pub distance_m: f64,
}

/// Project `point` onto the segment `start..end`.
///
/// The projection runs in a local equirectangular plane centred on `point`, which
/// is accurate for the sub-kilometre segments trail geometry is made of. The
/// reported distance is the exact haversine distance to the projected point.
pub fn project_onto_segment(
    point: Coordinate,
    start: Coordinate,
    end: Coordinate,
) -> SegmentProjection {
    let scale_x = point.latitude.to_radians().cos();
    let to_plane = |c: Coordinate| {
        (
            (c.longitude - point.longitude) * scale_x,
            c.latitude - point.latitude,
        )
    };

    let (ax, ay) = to_plane(start);
    let (bx, by) = to_plane(end);
    let (dx, dy) = (bx - ax, by - ay);
    let length_sq = dx * dx + dy * dy;

    let fraction = if length_sq <= f64::EPSILON * f64::EPSILON {
        0.0
    } else {
        ((-ax * dx - ay * dy) / length_sq).clamp(0.0, 1.0)
    };

    let projected = Coordinate::new(
        start.latitude + (end.latitude - start.latitude) * fraction,
        start.longitude + (end.longitude - start.longitude) * fraction,
    );

    SegmentProjection {
        point: projected,
        fraction,
        distance_m: haversine_distance(point, projected),
    }
}

/// Total great-circle length of a polyline in metres.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}
