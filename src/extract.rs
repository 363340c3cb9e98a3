//! # Coordinate Extraction
//!
//! Classifies a track export and pulls its coordinates out as [`TrackPoint`]s.
//!
//! ## Strategy chain
//!
//! Extraction is an ordered list of strategies sharing one signature, tried in
//! turn until one yields at least one point:
//!
//! 1. **extended tracks** - `gx:Track` / `gx:coord` children, `"lon lat alt"`
//! 2. **line geometries** - `LineString` coordinate lists, `"lon,lat,alt ..."`
//! 3. **placemarks** - inline coordinate lists and nested tracks of any namespace
//! 4. **any coordinates** - every `coordinates` element in the document
//!
//! Source classification ([`detect_source`]) is advisory only: the chain always
//! runs in the same order, so a misclassified file still extracts.
//!
//! Altitudes are read in meters and stored in feet. Entries whose latitude or
//! longitude fail to parse are skipped without aborting the strategy.

use log::debug;

use crate::document::TrackDocument;
use crate::geo_utils::{is_valid_coordinate, meters_to_feet};
use crate::{DetectedSource, PointId, TrackPoint};

/// Brand token that marks a FlightAware export in the document title.
pub const FLIGHTAWARE_BRAND: &str = "flightaware";

/// One extraction strategy: a name for logging and the function that runs it.
#[derive(Clone, Copy)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub run: fn(&dyn TrackDocument, &mut PointCollector),
}

/// The extraction chain, in the order it is attempted.
pub const STRATEGIES: [ExtractionStrategy; 4] = [
    ExtractionStrategy {
        name: "extended-track",
        run: extract_extended_tracks,
    },
    ExtractionStrategy {
        name: "line-geometry",
        run: extract_line_geometries,
    },
    ExtractionStrategy {
        name: "placemark",
        run: extract_placemarks,
    },
    ExtractionStrategy {
        name: "any-coordinates",
        run: extract_any_coordinates,
    },
];

/// Classify the source of a track document.
///
/// FlightAware when the document has an extension track with coordinate children
/// or its title carries the FlightAware brand; Flightradar24 when it has a line
/// geometry; otherwise unknown.
pub fn detect_source(doc: &dyn TrackDocument) -> DetectedSource {
    let has_extended_track = doc
        .find_extended_tracks()
        .iter()
        .any(|coords| !coords.is_empty());
    let branded = doc
        .titles()
        .iter()
        .any(|title| title.to_lowercase().contains(FLIGHTAWARE_BRAND));

    if has_extended_track || branded {
        DetectedSource::FlightAware
    } else if !doc.find_line_geometries().is_empty() {
        DetectedSource::Flightradar24
    } else {
        DetectedSource::Unknown
    }
}

/// Run the strategy chain and return the points of the first strategy that finds any.
pub fn extract_points(doc: &dyn TrackDocument) -> Vec<TrackPoint> {
    run_chain(doc, &STRATEGIES)
}

fn run_chain(doc: &dyn TrackDocument, strategies: &[ExtractionStrategy]) -> Vec<TrackPoint> {
    let mut collector = PointCollector::default();

    for strategy in strategies {
        (strategy.run)(doc, &mut collector);
        if !collector.points().is_empty() {
            debug!(
                "[Extract] Strategy '{}' produced {} points ({} entries skipped)",
                strategy.name,
                collector.points().len(),
                collector.skipped()
            );
            return collector.points;
        }
        debug!("[Extract] Strategy '{}' found nothing", strategy.name);
    }

    Vec::new()
}

/// Accumulates points across strategies, owning the shared ordinal counter.
#[derive(Debug, Default)]
pub struct PointCollector {
    next_ordinal: u64,
    points: Vec<TrackPoint>,
    skipped: usize,
}

impl PointCollector {
    /// Points collected so far.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Number of malformed entries skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Record one parsed `(lat, lon, altitude_m)` entry from coordinate element
    /// `element`, or count it as skipped when parsing failed.
    pub fn push(&mut self, element: u32, parsed: Option<(f64, f64, f64)>) {
        let Some((lat, lon, altitude_meters)) = parsed else {
            self.skipped += 1;
            return;
        };

        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.points.push(TrackPoint {
            id: PointId { element, ordinal },
            sequence_index: ordinal as usize,
            lat,
            lon,
            altitude_feet: meters_to_feet(altitude_meters),
        });
    }

    fn push_comma_list(&mut self, element: u32, list: &str) {
        for entry in list.split_whitespace() {
            self.push(element, parse_comma_triple(entry));
        }
    }
}

// =============================================================================
// Strategies
// =============================================================================

fn extract_extended_tracks(doc: &dyn TrackDocument, out: &mut PointCollector) {
    for (element, coords) in doc.find_extended_tracks().into_iter().enumerate() {
        for coord in coords {
            out.push(element as u32, parse_space_triple(coord));
        }
    }
}

fn extract_line_geometries(doc: &dyn TrackDocument, out: &mut PointCollector) {
    for (element, list) in doc.find_line_geometries().into_iter().enumerate() {
        out.push_comma_list(element as u32, list);
    }
}

fn extract_placemarks(doc: &dyn TrackDocument, out: &mut PointCollector) {
    for (element, placemark) in doc.find_generic_placemarks().into_iter().enumerate() {
        for list in placemark.coordinate_lists {
            out.push_comma_list(element as u32, list);
        }
        for coord in placemark.tracks.into_iter().flatten() {
            out.push(element as u32, parse_comma_triple(&normalize_triple(coord)));
        }
    }
}

fn extract_any_coordinates(doc: &dyn TrackDocument, out: &mut PointCollector) {
    for (element, list) in doc.find_any_coordinate_lists().into_iter().enumerate() {
        out.push_comma_list(element as u32, list);
    }
}

// =============================================================================
// Coordinate Parsing
// =============================================================================

/// Parse `"lon lat [altitude_m]"`. Returns `(lat, lon, altitude_m)`.
pub fn parse_space_triple(text: &str) -> Option<(f64, f64, f64)> {
    parse_parts(text.split_whitespace())
}

/// Parse `"lon,lat[,altitude_m]"`. Returns `(lat, lon, altitude_m)`.
pub fn parse_comma_triple(text: &str) -> Option<(f64, f64, f64)> {
    parse_parts(text.trim().split(','))
}

/// Rewrite a coordinate written with spaces and/or commas into comma-triple form.
pub fn normalize_triple(text: &str) -> String {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_parts<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<(f64, f64, f64)> {
    let lon: f64 = parts.next()?.trim().parse().ok()?;
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    if !is_valid_coordinate(lat, lon) {
        return None;
    }
    let altitude = parts
        .next()
        .and_then(|alt| alt.trim().parse::<f64>().ok())
        .filter(|alt| alt.is_finite())
        .unwrap_or(0.0);
    Some((lat, lon, altitude))
}
