//! # Adaptive Simplification
//!
//! Shrinks a point sequence to a target size while keeping its shape.
//!
//! ## Algorithm
//! 1. Run a Douglas-Peucker pass at the current tolerance. The pass works from an
//!    explicit stack of spans instead of recursing, and gives up once a span sits
//!    deeper than `max_split_depth`.
//! 2. While the result is still over target, double the tolerance (capped at
//!    `max_tolerance`) and try again, for at most `max_iterations` passes.
//! 3. If the target is still not met, sample the best result evenly down to it.
//!
//! Distances are planar in (lon, lat) space; see [`perpendicular_distance`].

use log::debug;

use crate::geo_utils::perpendicular_distance;
use crate::{ConversionConfig, TrackPoint};

/// One Douglas-Peucker pass at a fixed tolerance.
///
/// Returns `None` when a span would be split deeper than `max_depth`; callers
/// then fall back to [`evenly_sample`].
pub fn douglas_peucker(
    points: &[TrackPoint],
    tolerance: f64,
    max_depth: usize,
) -> Option<Vec<TrackPoint>> {
    let n = points.len();
    if n < 3 {
        return Some(points.to_vec());
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // (start, end, depth) spans still to examine
    let mut stack = vec![(0usize, n - 1, 0usize)];

    while let Some((start, end, depth)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        if depth > max_depth {
            return None;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in (start + 1)..end {
            let d = perpendicular_distance(&points[i], &points[start], &points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((max_idx, end, depth + 1));
            stack.push((start, max_idx, depth + 1));
        }
    }

    Some(
        points
            .iter()
            .zip(&keep)
            .filter(|&(_, k)| *k)
            .map(|(&p, _)| p)
            .collect(),
    )
}

/// Reduce `points` to at most `target` points, escalating the tolerance as needed.
///
/// Input already within target is returned unchanged.
pub fn adaptive_simplify(
    points: &[TrackPoint],
    target: usize,
    config: &ConversionConfig,
) -> Vec<TrackPoint> {
    if points.len() <= target {
        return points.to_vec();
    }

    let mut tolerance = config.initial_tolerance;
    let mut best: Option<Vec<TrackPoint>> = None;

    for iteration in 0..config.max_iterations {
        match douglas_peucker(points, tolerance, config.max_split_depth) {
            Some(result) if result.len() <= target => {
                debug!(
                    "[Simplify] {} -> {} points at tolerance {:e} (pass {})",
                    points.len(),
                    result.len(),
                    tolerance,
                    iteration + 1
                );
                return result;
            }
            Some(result) => best = Some(result),
            None => {
                debug!(
                    "[Simplify] split depth exceeded {} at tolerance {:e}",
                    config.max_split_depth, tolerance
                );
                best = None;
                break;
            }
        }

        if tolerance >= config.max_tolerance {
            break;
        }
        tolerance = (tolerance * 2.0).min(config.max_tolerance);
    }

    let base = best.unwrap_or_else(|| points.to_vec());
    debug!(
        "[Simplify] tolerance escalation left {} points, sampling down to {}",
        base.len(),
        target
    );
    evenly_sample(&base, target)
}

/// Pick exactly `k` points (or all of them, if there are fewer) at evenly spaced
/// indices. The first and last points are always included.
///
/// # Example
///
/// ```rust
/// use trackplan::TrackPoint;
/// use trackplan::simplify::evenly_sample;
///
/// let points: Vec<TrackPoint> = (0..10).map(|i| TrackPoint::new(i, 0.0, i as f64, 0)).collect();
/// let sampled = evenly_sample(&points, 4);
/// let indices: Vec<usize> = sampled.iter().map(|p| p.sequence_index).collect();
/// assert_eq!(indices, vec![0, 2, 5, 9]);
/// ```
pub fn evenly_sample(points: &[TrackPoint], k: usize) -> Vec<TrackPoint> {
    let n = points.len();
    if k >= n {
        return points.to_vec();
    }
    match k {
        0 => return Vec::new(),
        1 => return vec![points[0]],
        _ => {}
    }

    let mut sampled = Vec::with_capacity(k);
    sampled.push(points[0]);
    for i in 1..k - 1 {
        let idx = (i * n / k).clamp(1, n - 2);
        sampled.push(points[idx]);
    }
    sampled.push(points[n - 1]);
    sampled
}
