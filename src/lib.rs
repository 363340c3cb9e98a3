//! # Trackplan
//!
//! Converts recorded aircraft ground tracks into flight plans a simulator can load.
//!
//! Flight-tracking exports (FlightAware and Flightradar24 KML) routinely carry
//! thousands of points, while the simulator accepts at most 250 waypoints per
//! plan. This library provides:
//! - Source detection and coordinate extraction with a fallback strategy chain
//! - Route cleaning (duplicate removal and loop breaking)
//! - Phase-weighted simplification that keeps turns and altitude changes
//! - Garmin flight plan (`.fpl`) serialization
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch conversion with rayon
//! - **`serde`** - Serialize outcomes and configuration
//! - **`cli`** - Build the `trackplan` command-line converter
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use trackplan::{convert_track, ConversionConfig};
//!
//! let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document><Placemark>
//!     <LineString><coordinates>
//!         4.7641,52.3080,0 4.9000,52.4000,3000 5.1000,52.5000,9000
//!     </coordinates></LineString>
//! </Placemark></Document></kml>"#;
//!
//! let outcome = convert_track(kml, Some("EHAM"), None, &ConversionConfig::default());
//! assert_eq!(outcome.final_count, 3);
//! assert_eq!(outcome.waypoints[0].name, "EHAM");
//!
//! let plan = outcome.to_plan().unwrap();
//! assert!(plan.contains("<identifier>EHAM</identifier>"));
//! ```

use log::{info, warn};

pub mod error;
pub use error::{Result, TrackError};

// XML document model and element lookups
pub mod document;
pub use document::{TrackDocument, XmlDocument};

// Source detection and coordinate extraction
pub mod extract;
pub use extract::{detect_source, extract_points};

pub mod clean;
pub use clean::clean_route;

pub mod critical;
pub mod simplify;

// Phase-weighted reduction with fallback tiers
pub mod phases;
pub use phases::{reduce_route, Reduction};

pub mod naming;
pub use naming::assign_names;

// Flight plan output
pub mod fpl;
pub use fpl::{plan_file_name, serialize_plan};

pub mod geo_utils;
use geo_utils::{compute_bounds, polyline_length, Position};

#[cfg(feature = "ffi")]
mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("TrackplanRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// Stable identity of an extracted point.
///
/// Assigned once at extraction from the index of the source element and a
/// document-wide counter. Later stages select points by this id, never by
/// array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointId {
    pub element: u32,
    pub ordinal: u64,
}

/// One raw sample from a track file, altitude in feet.
///
/// # Example
/// ```
/// use trackplan::TrackPoint;
/// let point = TrackPoint::new(0, 52.308056, 4.764167, 0); // Schiphol
/// assert_eq!(point.id.ordinal, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub id: PointId,
    /// Position in the source file, across every element read.
    pub sequence_index: usize,
    pub lat: f64,
    pub lon: f64,
    pub altitude_feet: i32,
}

impl TrackPoint {
    /// Create a point whose id is derived from its sequence index.
    pub fn new(sequence_index: usize, lat: f64, lon: f64, altitude_feet: i32) -> Self {
        Self {
            id: PointId {
                element: 0,
                ordinal: sequence_index as u64,
            },
            sequence_index,
            lat,
            lon,
            altitude_feet,
        }
    }
}

/// A named point in the output flight plan.
///
/// The editor owns waypoints after conversion and may rename, move or select
/// them; `id` stays fixed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub id: PointId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude_feet: i32,
    pub selected: bool,
}

impl From<TrackPoint> for Waypoint {
    fn from(point: TrackPoint) -> Self {
        Self {
            id: point.id,
            name: String::new(),
            lat: point.lat,
            lon: point.lon,
            altitude_feet: point.altitude_feet,
            selected: false,
        }
    }
}

impl Position for TrackPoint {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl Position for Waypoint {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Flight-tracking service a track file was exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetectedSource {
    /// `gx:Track` exports, or any document titled with the FlightAware brand.
    FlightAware,
    /// `LineString` exports.
    Flightradar24,
    Unknown,
}

impl DetectedSource {
    pub fn label(&self) -> &'static str {
        match self {
            DetectedSource::FlightAware => "FlightAware",
            DetectedSource::Flightradar24 => "Flightradar24",
            DetectedSource::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DetectedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which reduction tier produced the final waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReductionStrategy {
    /// The route already fit under the cap.
    PassThrough,
    PhaseWeighted,
    /// Coarse tier: route ends verbatim, middle sampled.
    Fallback,
    /// Whole route sampled evenly.
    Emergency,
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Get the center point as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// Configuration for track conversion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConversionConfig {
    /// Hard cap on waypoints per plan.
    /// Default: 250 (simulator limit)
    pub max_waypoints: usize,

    /// Share of the route (by position) and of the cap given to departure and to arrival each.
    /// Default: 0.2
    pub phase_fraction: f64,

    /// Minimum budget for the departure and arrival phases.
    /// Default: 10
    pub min_phase_budget: usize,

    /// Share of a terminal phase budget reserved for critical points.
    /// Default: 0.3
    pub critical_share: f64,

    /// First Douglas-Peucker tolerance, in degrees.
    /// Default: 1e-5
    pub initial_tolerance: f64,

    /// Tolerance ceiling for the escalation loop, in degrees.
    /// Default: 1.0
    pub max_tolerance: f64,

    /// Maximum tolerance escalation passes.
    /// Default: 20
    pub max_iterations: usize,

    /// Split depth beyond which simplification gives up and samples instead.
    /// Default: 512
    pub max_split_depth: usize,

    /// Share of the route kept verbatim at each end by the coarse fallback.
    /// Default: 0.05
    pub fallback_edge_fraction: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_waypoints: 250,
            phase_fraction: 0.2,
            min_phase_budget: 10,
            critical_share: 0.3,
            initial_tolerance: 1e-5,
            max_tolerance: 1.0,
            max_iterations: 20,
            max_split_depth: 512,
            fallback_edge_fraction: 0.05,
        }
    }
}

/// Result of converting one track file.
///
/// `explanation` describes which reduction was applied and the phase sizes it
/// achieved; it is stable enough to assert on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplificationOutcome {
    pub waypoints: Vec<Waypoint>,
    /// Points in the cleaned route, before reduction.
    pub original_count: usize,
    pub final_count: usize,
    pub explanation: String,
    pub detected_source: DetectedSource,
    /// Points extracted from the file, before cleaning.
    pub extracted_count: usize,
    pub strategy: ReductionStrategy,
    pub bounds: Option<Bounds>,
    /// Center of `bounds` as (lat, lon).
    pub center: Option<(f64, f64)>,
    /// Great-circle length of the waypoint polyline.
    pub route_distance_meters: f64,
}

impl SimplificationOutcome {
    /// Outcome with no waypoints, carrying the reason in `explanation`.
    pub fn empty(detected_source: DetectedSource, explanation: impl Into<String>) -> Self {
        Self {
            waypoints: Vec::new(),
            original_count: 0,
            final_count: 0,
            explanation: explanation.into(),
            detected_source,
            extracted_count: 0,
            strategy: ReductionStrategy::PassThrough,
            bounds: None,
            center: None,
            route_distance_meters: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Serialize the current waypoints as a flight plan.
    pub fn to_plan(&self) -> Result<String> {
        serialize_plan(&self.waypoints)
    }
}

/// One file queued for batch conversion.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackInput {
    /// Source filename, only used for naming the output.
    pub filename: String,
    pub text: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl TrackInput {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
            origin: None,
            destination: None,
        }
    }

    pub fn with_airports(mut self, origin: Option<&str>, destination: Option<&str>) -> Self {
        self.origin = origin.map(str::to_string);
        self.destination = destination.map(str::to_string);
        self
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Convert the text of a track file into named, size-bounded waypoints.
///
/// Never fails: malformed XML or a file without coordinates produces an empty
/// outcome whose `explanation` says why. Identical inputs always produce
/// identical outcomes.
///
/// # Example
/// ```
/// use trackplan::{convert_track, ConversionConfig};
///
/// let outcome = convert_track("<kml><unclosed>", None, None, &ConversionConfig::default());
/// assert!(outcome.is_empty());
/// assert!(outcome.explanation.starts_with("failed to parse track file"));
/// ```
pub fn convert_track(
    text: &str,
    origin: Option<&str>,
    destination: Option<&str>,
    config: &ConversionConfig,
) -> SimplificationOutcome {
    let doc = match XmlDocument::parse(text) {
        Ok(doc) => doc,
        Err(err) => {
            warn!("[Pipeline] {}", err);
            return SimplificationOutcome::empty(DetectedSource::Unknown, err.to_string());
        }
    };

    let source = detect_source(&doc);
    info!("[Pipeline] Detected {} track ({} elements)", source, doc.len());

    convert_document(&doc, source, origin, destination, config).unwrap_or_else(|err| {
        warn!("[Pipeline] {}", err);
        SimplificationOutcome::empty(source, err.to_string())
    })
}

fn convert_document(
    doc: &dyn TrackDocument,
    source: DetectedSource,
    origin: Option<&str>,
    destination: Option<&str>,
    config: &ConversionConfig,
) -> Result<SimplificationOutcome> {
    let extracted = extract_points(doc);
    if extracted.is_empty() {
        return Err(TrackError::NoWaypoints);
    }

    let cleaned = clean_route(&extracted);
    let reduction = reduce_route(&cleaned, config)?;

    let mut waypoints: Vec<Waypoint> = reduction.points.into_iter().map(Waypoint::from).collect();
    assign_names(&mut waypoints, origin, destination);

    let mut explanation = reduction.explanation;
    let removed = extracted.len() - cleaned.len();
    if removed > 0 {
        explanation.push_str(&format!(
            "; removed {} duplicate or looping points from {} extracted",
            removed,
            extracted.len()
        ));
    }

    let bounds = compute_bounds(&waypoints);
    let route_distance_meters = polyline_length(&waypoints);
    info!(
        "[Pipeline] {} extracted, {} cleaned, {} waypoints ({:.0} km)",
        extracted.len(),
        cleaned.len(),
        waypoints.len(),
        route_distance_meters / 1000.0
    );

    Ok(SimplificationOutcome {
        final_count: waypoints.len(),
        waypoints,
        original_count: cleaned.len(),
        explanation,
        detected_source: source,
        extracted_count: extracted.len(),
        strategy: reduction.strategy,
        bounds,
        center: bounds.map(|b| b.center()),
        route_distance_meters,
    })
}

/// Convert several files one after another.
pub fn convert_batch(
    inputs: &[TrackInput],
    config: &ConversionConfig,
) -> Vec<SimplificationOutcome> {
    inputs.iter().map(|input| convert_input(input, config)).collect()
}

/// Convert several files using parallel processing.
///
/// Conversions share no state, so results are identical to [`convert_batch`]
/// and returned in input order.
#[cfg(feature = "parallel")]
pub fn convert_batch_parallel(
    inputs: &[TrackInput],
    config: &ConversionConfig,
) -> Vec<SimplificationOutcome> {
    use rayon::prelude::*;

    inputs
        .par_iter()
        .map(|input| convert_input(input, config))
        .collect()
}

fn convert_input(input: &TrackInput, config: &ConversionConfig) -> SimplificationOutcome {
    info!("[Pipeline] Converting {}", input.filename);
    convert_track(
        &input.text,
        input.origin.as_deref(),
        input.destination.as_deref(),
        config,
    )
}

// ============================================================================
// Tests
// ============================================================================
