//! # Geographic Utilities
//!
//! Small geometric helpers shared by the cleaning, selection and simplification stages.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`bearing`] | Planar heading of a segment, `atan2(Δlat, Δlon)` |
//! | [`turn_angle`] | Absolute heading change at a point, in `[0, π]` |
//! | [`perpendicular_distance`] | Planar distance from a point to a chord in (lon, lat) space |
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`polyline_length`] | Total great-circle length of a point sequence |
//! | [`compute_bounds`] | Bounding box of a point sequence |
//! | [`meters_to_feet`] / [`feet_to_meters`] | Altitude unit conversion with rounding |
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 decimal degrees. Bearings and perpendicular distances
//! are computed in plain (lon, lat) space: they are only ever compared against each
//! other or against a tolerance in the same space, never against real-world units.

use std::f64::consts::PI;

use geo::{Distance, Haversine, Point};

use crate::Bounds;

/// Feet per meter, as used for track altitudes.
pub const FEET_PER_METER: f64 = 3.28084;

/// Meters per foot, as used for plan elevations.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Anything with a WGS84 position.
pub trait Position {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;
}

// =============================================================================
// Planar Geometry
// =============================================================================

/// Heading of the segment `from -> to` as `atan2(Δlat, Δlon)`, in radians.
#[inline]
pub fn bearing<P: Position>(from: &P, to: &P) -> f64 {
    (to.lat() - from.lat()).atan2(to.lon() - from.lon())
}

/// Absolute heading change at `at` between the legs `prev -> at` and `at -> next`.
///
/// The result is normalized into `[0, π]`, so a full reversal scores `π` and a
/// straight continuation scores `0`.
///
/// # Example
///
/// ```rust
/// use trackplan::TrackPoint;
/// use trackplan::geo_utils::turn_angle;
///
/// let a = TrackPoint::new(0, 0.0, 0.0, 0);
/// let b = TrackPoint::new(1, 0.0, 1.0, 0);
/// let c = TrackPoint::new(2, 1.0, 1.0, 0);
///
/// let angle = turn_angle(&a, &b, &c);
/// assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
/// ```
pub fn turn_angle<P: Position>(prev: &P, at: &P, next: &P) -> f64 {
    let diff = (bearing(at, next) - bearing(prev, at)).abs();
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}

/// Distance from `p` to the line through `a` and `b`, in (lon, lat) degrees.
///
/// Uses `|cross(b - a, p - a)| / |b - a|`. When the chord has zero length the
/// plain Euclidean distance from `p` to `a` is returned instead.
pub fn perpendicular_distance<P: Position>(p: &P, a: &P, b: &P) -> f64 {
    let dx = b.lon() - a.lon();
    let dy = b.lat() - a.lat();
    let chord = (dx * dx + dy * dy).sqrt();

    if chord == 0.0 {
        let px = p.lon() - a.lon();
        let py = p.lat() - a.lat();
        return (px * px + py * py).sqrt();
    }

    let cross = dx * (p.lat() - a.lat()) - dy * (p.lon() - a.lon());
    cross.abs() / chord
}

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two points in meters.
#[inline]
pub fn haversine_distance<P: Position>(p1: &P, p2: &P) -> f64 {
    let point1 = Point::new(p1.lon(), p1.lat());
    let point2 = Point::new(p2.lon(), p2.lat());
    Haversine::distance(point1, point2)
}

/// Total length of a point sequence in meters. Empty or single-point input returns 0.0.
pub fn polyline_length<P: Position>(points: &[P]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounds
// =============================================================================

/// Bounding box of a point sequence, or `None` for empty input.
pub fn compute_bounds<P: Position>(points: &[P]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lon = f64::MAX;
    let mut max_lon = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.lat());
        max_lat = max_lat.max(p.lat());
        min_lon = min_lon.min(p.lon());
        max_lon = max_lon.max(p.lon());
    }

    Some(Bounds {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    })
}

// =============================================================================
// Units
// =============================================================================

/// Convert an altitude in meters to whole feet.
#[inline]
pub fn meters_to_feet(meters: f64) -> i32 {
    (meters * FEET_PER_METER).round() as i32
}

/// Convert an altitude in feet to whole meters.
#[inline]
pub fn feet_to_meters(feet: i32) -> i32 {
    (f64::from(feet) * METERS_PER_FOOT).round() as i32
}

/// Whether a latitude/longitude pair is finite and inside WGS84 ranges.
#[inline]
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackPoint;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn pt(lat: f64, lon: f64) -> TrackPoint {
        TrackPoint::new(0, lat, lon, 0)
    }

    #[test]
    fn test_turn_angle_straight() {
        let angle = turn_angle(&pt(0.0, 0.0), &pt(0.0, 1.0), &pt(0.0, 2.0));
        assert!(approx_eq(angle, 0.0, 1e-12));
    }

    #[test]
    fn test_turn_angle_right_angle() {
        let angle = turn_angle(&pt(0.0, 0.0), &pt(0.0, 1.0), &pt(-1.0, 1.0));
        assert!(approx_eq(angle, PI / 2.0, 1e-12));
    }

    #[test]
    fn test_turn_angle_wraps_into_range() {
        // Heading from ~+170° to ~-170° is a 20° turn, not 340°.
        let a = pt(0.0, 0.0);
        let b = pt(0.176, -1.0);
        let c = pt(0.0, -2.0);
        let angle = turn_angle(&a, &b, &c);
        assert!(angle <= PI);
        assert!(approx_eq(angle, 2.0 * 0.176f64.atan2(1.0), 1e-9));
    }

    #[test]
    fn test_turn_angle_reversal() {
        let angle = turn_angle(&pt(0.0, 0.0), &pt(0.0, 1.0), &pt(0.0, 0.0));
        assert!(approx_eq(angle, PI, 1e-12));
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance(&pt(1.0, 1.0), &pt(0.0, 0.0), &pt(0.0, 2.0));
        assert!(approx_eq(d, 1.0, 1e-12));
    }

    #[test]
    fn test_perpendicular_distance_degenerate_chord() {
        let d = perpendicular_distance(&pt(3.0, 4.0), &pt(0.0, 0.0), &pt(0.0, 0.0));
        assert!(approx_eq(d, 5.0, 1e-12));
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // Amsterdam Schiphol to London Heathrow is roughly 370 km
        let eham = pt(52.3086, 4.7639);
        let egll = pt(51.4700, -0.4543);
        let dist = haversine_distance(&eham, &egll);
        assert!(approx_eq(dist, 370_000.0, 10_000.0));
    }

    #[test]
    fn test_polyline_length_short_input() {
        let empty: Vec<TrackPoint> = vec![];
        assert_eq!(polyline_length(&empty), 0.0);
        assert_eq!(polyline_length(&[pt(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![pt(51.50, -0.13), pt(51.51, -0.12), pt(51.505, -0.125)];
        let bounds = compute_bounds(&track).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lon, -0.13);
        assert_eq!(bounds.max_lon, -0.12);
        assert!(compute_bounds::<TrackPoint>(&[]).is_none());
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(meters_to_feet(0.0), 0);
        assert_eq!(meters_to_feet(1000.0), 3281);
        assert_eq!(meters_to_feet(-10.0), -33);
        assert_eq!(feet_to_meters(1000), 305);
        assert_eq!(feet_to_meters(0), 0);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(is_valid_coordinate(52.3, 4.76));
        assert!(!is_valid_coordinate(91.0, 0.0));
        assert!(!is_valid_coordinate(0.0, 181.0));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }
}
