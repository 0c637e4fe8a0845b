//! Spherical-earth geodesy.
//!
//! All angles are radians internally; degrees only appear at the boundary
//! (`Coordinate::from_degrees`, `lat_deg`, `lon_deg`). Every operation returns
//! a new `Coordinate`.

use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// A position on the sphere with elevation and an optional timestamp.
///
/// # Example
/// ```
/// use track_analytics::Coordinate;
/// let summit = Coordinate::from_degrees(45.8326, 6.8652, 4808.0);
/// assert!((summit.lat_deg() - 45.8326).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in radians, within [-π/2, π/2]
    pub lat: f64,
    /// Longitude in radians
    pub lon: f64,
    /// Elevation in meters
    pub ele: f64,
    /// Timestamp, absent for derived points and turnpoints
    pub time: Option<DateTime<Utc>>,
}

impl Coordinate {
    /// Create a coordinate from radians.
    pub fn new(lat: f64, lon: f64, ele: f64) -> Self {
        Self {
            lat,
            lon,
            ele,
            time: None,
        }
    }

    /// Create a coordinate from degrees.
    pub fn from_degrees(lat_deg: f64, lon_deg: f64, ele: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), ele)
    }

    /// Same position, stamped with `time`.
    pub fn with_time(self, time: DateTime<Utc>) -> Self {
        Self {
            time: Some(time),
            ..self
        }
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat.to_degrees()
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon.to_degrees()
    }

    /// Cosine of the central angle to `other`.
    fn central_cos(&self, other: &Coordinate) -> f64 {
        self.lat.sin() * other.lat.sin()
            + self.lat.cos() * other.lat.cos() * (other.lon - self.lon).cos()
    }

    /// Central angle to `other` in radians. A cosine at or past 1.0 is a
    /// rounding artifact of coincident points and maps to zero.
    fn central_angle(&self, other: &Coordinate) -> f64 {
        let d = self.central_cos(other);
        if d < 1.0 {
            d.max(-1.0).acos()
        } else {
            0.0
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        EARTH_RADIUS * self.central_angle(other)
    }

    /// Forward azimuth towards `other`, in (-π, π].
    pub fn initial_bearing_to(&self, other: &Coordinate) -> f64 {
        let dlon = other.lon - self.lon;
        let y = dlon.sin() * other.lat.cos();
        let x = self.lat.cos() * other.lat.sin() - self.lat.sin() * other.lat.cos() * dlon.cos();
        y.atan2(x)
    }

    /// Great-circle midpoint; elevation is the mean of both ends.
    pub fn halfway_to(&self, other: &Coordinate) -> Coordinate {
        let dlon = other.lon - self.lon;
        let bx = other.lat.cos() * dlon.cos();
        let by = other.lat.cos() * dlon.sin();
        let cos_lat_plus_bx = self.lat.cos() + bx;
        let lat = (self.lat.sin() + other.lat.sin())
            .atan2((cos_lat_plus_bx * cos_lat_plus_bx + by * by).sqrt());
        let lon = self.lon + by.atan2(cos_lat_plus_bx);
        Coordinate::new(lat, lon, (self.ele + other.ele) / 2.0)
    }

    /// Point at `fraction` of the way along the arc to `other`.
    ///
    /// Fraction 0 and 1 return the endpoints themselves, timestamps
    /// included. Elevation is interpolated linearly.
    pub fn interpolate(&self, other: &Coordinate, fraction: f64) -> Coordinate {
        if fraction <= 0.0 {
            return *self;
        }
        if fraction >= 1.0 {
            return *other;
        }
        let d = fraction * self.central_angle(other);
        let theta = self.initial_bearing_to(other);
        let (lat, lon) = self.project(theta, d);
        let ele = (1.0 - fraction) * self.ele + fraction * other.ele;
        Coordinate::new(lat, lon, ele)
    }

    /// Point `distance` meters away along initial bearing `bearing`.
    /// Elevation is unchanged.
    pub fn destination(&self, bearing: f64, distance: f64) -> Coordinate {
        let (lat, lon) = self.project(bearing, distance / EARTH_RADIUS);
        Coordinate::new(lat, lon, self.ele)
    }

    /// Direct geodesic problem on the unit sphere: angular distance `d`
    /// along bearing `theta`.
    fn project(&self, theta: f64, d: f64) -> (f64, f64) {
        let sin_lat =
            self.lat.sin() * d.cos() + self.lat.cos() * d.sin() * theta.cos();
        let lat = sin_lat.clamp(-1.0, 1.0).asin();
        let lon = self.lon
            + (theta.sin() * d.sin() * self.lat.cos()).atan2(d.cos() - self.lat.sin() * lat.sin());
        (lat, lon)
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord {
            x: c.lon_deg(),
            y: c.lat_deg(),
        }
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.lon_deg(), c.lat_deg())
    }
}

/// Free-function form of [`Coordinate::distance_to`].
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    a.distance_to(b)
}

/// Free-function form of [`Coordinate::initial_bearing_to`].
pub fn initial_bearing(a: &Coordinate, b: &Coordinate) -> f64 {
    a.initial_bearing_to(b)
}

/// Free-function form of [`Coordinate::halfway_to`].
pub fn halfway(a: &Coordinate, b: &Coordinate) -> Coordinate {
    a.halfway_to(b)
}

/// Free-function form of [`Coordinate::interpolate`].
pub fn interpolate(a: &Coordinate, b: &Coordinate, fraction: f64) -> Coordinate {
    a.interpolate(b, fraction)
}

/// Free-function form of [`Coordinate::destination`].
pub fn destination(a: &Coordinate, bearing: f64, distance: f64) -> Coordinate {
    a.destination(bearing, distance)
}

/// Name of the 16-point compass direction closest to `bearing` (radians).
pub fn compass_point(bearing: f64) -> &'static str {
    let rad = bearing.rem_euclid(2.0 * PI);
    COMPASS_POINTS[((8.0 * rad / PI + 0.5) as usize) % 16]
}
