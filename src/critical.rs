//! Critical-point selection.
//!
//! Interior points are scored by how sharply the track turns there and how much
//! the altitude changes across them:
//!
//! ```text
//! score = turn_angle / π + |alt[i+1] - alt[i-1]| / 10000
//! ```
//!
//! The first and last points are always kept; the best `k - 2` interior points
//! fill the rest. Ties keep their original order, so selection is deterministic.

use std::f64::consts::PI;

use crate::geo_utils::turn_angle;
use crate::TrackPoint;

/// Altitude change (feet) that scores the same as a full reversal.
pub const ALTITUDE_SCALE_FEET: f64 = 10_000.0;

/// Importance of the interior point at `i`. Panics if `i` is not interior.
pub fn importance(points: &[TrackPoint], i: usize) -> f64 {
    let (prev, at, next) = (&points[i - 1], &points[i], &points[i + 1]);
    let altitude_delta = f64::from((next.altitude_feet - prev.altitude_feet).abs());
    turn_angle(prev, at, next) / PI + altitude_delta / ALTITUDE_SCALE_FEET
}

/// Select at most `k` points: both endpoints plus the top-scoring interior points,
/// returned in original order.
pub fn select_critical_points(points: &[TrackPoint], k: usize) -> Vec<TrackPoint> {
    let n = points.len();
    if n <= 2 || n <= k {
        return points.to_vec();
    }
    if k <= 2 {
        return vec![points[0], points[n - 1]];
    }

    let mut scored: Vec<(usize, f64)> = (1..n - 1).map(|i| (i, importance(points, i))).collect();
    // Stable sort: equal scores keep sequence order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut keep: Vec<usize> = scored.iter().take(k - 2).map(|&(i, _)| i).collect();
    keep.push(0);
    keep.push(n - 1);
    keep.sort_unstable();

    keep.into_iter().map(|i| points[i]).collect()
}
