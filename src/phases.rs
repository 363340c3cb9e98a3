//! # Phase-Weighted Reduction
//!
//! Fits a cleaned route under the waypoint cap while keeping its shape and the
//! operationally interesting points near the airports.
//!
//! ## Algorithm
//! 1. Split the route by position: the first and last `phase_fraction` of the
//!    points are departure and arrival, everything between is en-route.
//! 2. Give each phase a budget: `max(cap * phase_fraction, min_phase_budget)` for
//!    departure and arrival, the remainder for en-route.
//! 3. Departure and arrival over budget: keep `critical_share` of the budget as
//!    critical points (turns, climbs, descents) and fill the rest with an adaptive
//!    simplification of the remaining points.
//! 4. En-route over budget: adaptive simplification alone.
//! 5. Concatenate, drop repeated point ids, and force the route endpoints back in.
//!
//! If the phase-weighted result breaks its contract, a coarse tier keeps the
//! first and last few percent verbatim and samples the middle. If that fails as
//! well, the whole route is sampled evenly down to the cap.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::critical::select_critical_points;
use crate::error::{Result, TrackError};
use crate::simplify::{adaptive_simplify, evenly_sample};
use crate::{ConversionConfig, ReductionStrategy, TrackPoint};

/// Point budget per flight phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBudgets {
    pub departure: usize,
    pub enroute: usize,
    pub arrival: usize,
}

impl PhaseBudgets {
    /// Budgets for the configured cap.
    ///
    /// # Example
    /// ```
    /// use trackplan::ConversionConfig;
    /// use trackplan::phases::PhaseBudgets;
    ///
    /// let budgets = PhaseBudgets::from_config(&ConversionConfig::default());
    /// assert_eq!((budgets.departure, budgets.enroute, budgets.arrival), (50, 150, 50));
    /// ```
    pub fn from_config(config: &ConversionConfig) -> Self {
        let cap = config.max_waypoints;
        let terminal = ((cap as f64 * config.phase_fraction).floor() as usize)
            .max(config.min_phase_budget);
        Self {
            departure: terminal,
            arrival: terminal,
            enroute: cap.saturating_sub(2 * terminal),
        }
    }
}

/// Output of a reduction tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub points: Vec<TrackPoint>,
    pub strategy: ReductionStrategy,
    pub explanation: String,
}

/// Reduce a cleaned route to at most `config.max_waypoints` points.
///
/// Routes already within the cap pass through untouched. Otherwise the
/// phase-weighted tier runs, falling back to the coarse tier and then to the
/// emergency tier. An error means every tier failed.
pub fn reduce_route(points: &[TrackPoint], config: &ConversionConfig) -> Result<Reduction> {
    let cap = config.max_waypoints;
    if points.len() <= cap {
        return Ok(Reduction {
            points: points.to_vec(),
            strategy: ReductionStrategy::PassThrough,
            explanation: format!(
                "no simplification needed: {} waypoints within the {}-waypoint limit",
                points.len(),
                cap
            ),
        });
    }

    let reduction = phase_weighted(points, config)
        .or_else(|err| {
            warn!("[Phases] Phase-weighted reduction failed ({}), using fallback", err);
            coarse_fallback(points, config)
        })
        .or_else(|err| {
            warn!("[Phases] Fallback reduction failed ({}), using emergency sampling", err);
            emergency_sample(points, config)
        })?;

    info!(
        "[Phases] {:?}: {} -> {} points",
        reduction.strategy,
        points.len(),
        reduction.points.len()
    );
    Ok(reduction)
}

/// Phase-weighted tier. See the module docs for the algorithm.
pub fn phase_weighted(points: &[TrackPoint], config: &ConversionConfig) -> Result<Reduction> {
    let n = points.len();
    let budgets = PhaseBudgets::from_config(config);
    let edge = ((n as f64 * config.phase_fraction).floor() as usize).min(n / 2);

    let departure = reduce_terminal_phase(&points[..edge], budgets.departure, config);
    let enroute_segment = &points[edge..n - edge];
    let enroute = if enroute_segment.len() <= budgets.enroute {
        enroute_segment.to_vec()
    } else {
        adaptive_simplify(enroute_segment, budgets.enroute, config)
    };
    let arrival = reduce_terminal_phase(&points[n - edge..], budgets.arrival, config);

    debug!(
        "[Phases] split {} / {} / {} -> {} / {} / {} (budgets {:?})",
        edge,
        enroute_segment.len(),
        edge,
        departure.len(),
        enroute.len(),
        arrival.len(),
        budgets
    );

    let (sizes, combined) = (
        (departure.len(), enroute.len(), arrival.len()),
        [departure, enroute, arrival].concat(),
    );
    let merged = merge_with_endpoints(points, combined);
    check_reduction(&merged, config.max_waypoints)?;

    let explanation = format!(
        "phase-weighted simplification: {} -> {} waypoints (departure {}, en-route {}, arrival {})",
        n,
        merged.len(),
        sizes.0,
        sizes.1,
        sizes.2
    );
    Ok(Reduction {
        points: merged,
        strategy: ReductionStrategy::PhaseWeighted,
        explanation,
    })
}

/// Coarse tier: first/last `fallback_edge_fraction` of the route verbatim, the
/// middle sampled evenly into the remaining budget.
pub fn coarse_fallback(points: &[TrackPoint], config: &ConversionConfig) -> Result<Reduction> {
    let n = points.len();
    let cap = config.max_waypoints;
    let edge = ((n as f64 * config.fallback_edge_fraction).floor() as usize).min(n / 2);

    let middle_budget = cap.checked_sub(2 * edge).ok_or_else(|| {
        TrackError::Simplification(format!(
            "fallback edges of {} points exceed the {}-waypoint limit",
            edge, cap
        ))
    })?;
    let middle = evenly_sample(&points[edge..n - edge], middle_budget);
    let sampled = middle.len();

    let combined = [&points[..edge], &middle[..], &points[n - edge..]].concat();
    let merged = merge_with_endpoints(points, combined);
    check_reduction(&merged, cap)?;

    let explanation = format!(
        "fallback simplification: {} -> {} waypoints (kept {} points at each end, sampled {} en-route)",
        n,
        merged.len(),
        edge,
        sampled
    );
    Ok(Reduction {
        points: merged,
        strategy: ReductionStrategy::Fallback,
        explanation,
    })
}

/// Emergency tier: the whole route sampled evenly to the cap.
pub fn emergency_sample(points: &[TrackPoint], config: &ConversionConfig) -> Result<Reduction> {
    let sampled = evenly_sample(points, config.max_waypoints);
    check_reduction(&sampled, config.max_waypoints)?;

    let explanation = format!(
        "emergency fallback: evenly sampled {} -> {} waypoints",
        points.len(),
        sampled.len()
    );
    Ok(Reduction {
        points: sampled,
        strategy: ReductionStrategy::Emergency,
        explanation,
    })
}

/// Departure or arrival: critical points first, adaptive simplification for the rest.
fn reduce_terminal_phase(
    segment: &[TrackPoint],
    budget: usize,
    config: &ConversionConfig,
) -> Vec<TrackPoint> {
    if segment.len() <= budget {
        return segment.to_vec();
    }

    let critical_count = (budget as f64 * config.critical_share).floor() as usize;
    let critical = select_critical_points(segment, critical_count);
    let critical_ids: HashSet<_> = critical.iter().map(|p| p.id).collect();

    let rest: Vec<TrackPoint> = segment
        .iter()
        .filter(|p| !critical_ids.contains(&p.id))
        .copied()
        .collect();
    let simplified = adaptive_simplify(&rest, budget.saturating_sub(critical.len()), config);

    let mut merged = [critical, simplified].concat();
    merged.sort_by_key(|p| p.sequence_index);
    merged
}

/// Drop repeated ids (first occurrence wins) and force the route endpoints in.
fn merge_with_endpoints(route: &[TrackPoint], combined: Vec<TrackPoint>) -> Vec<TrackPoint> {
    let mut seen = HashSet::with_capacity(combined.len());
    let mut merged: Vec<TrackPoint> = combined
        .into_iter()
        .filter(|p| seen.insert(p.id))
        .collect();

    if let (Some(first), Some(last)) = (route.first(), route.last()) {
        if !seen.contains(&first.id) {
            merged.insert(0, *first);
        }
        if !seen.contains(&last.id) && first.id != last.id {
            merged.push(*last);
        }
    }
    merged
}

fn check_reduction(points: &[TrackPoint], cap: usize) -> Result<()> {
    if points.is_empty() {
        return Err(TrackError::Simplification("reduction produced no points".to_string()));
    }
    if points.len() > cap {
        return Err(TrackError::Simplification(format!(
            "{} points exceed the {}-waypoint limit",
            points.len(),
            cap
        )));
    }
    if points
        .windows(2)
        .any(|w| w[0].sequence_index >= w[1].sequence_index)
    {
        return Err(TrackError::Simplification(
            "reduction broke chronological order".to_string(),
        ));
    }
    Ok(())
}
