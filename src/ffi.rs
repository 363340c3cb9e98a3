//! FFI exports for the mobile editor.
//!
//! Counts cross the boundary as `u32` and the route center as a record, since
//! neither `usize` nor tuples are supported by the bindings.

use log::info;

use super::*;

/// Route center for the map view.
#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct FfiCenter {
    pub lat: f64,
    pub lon: f64,
}

/// [`SimplificationOutcome`] as seen from Kotlin/Swift.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSimplificationOutcome {
    pub waypoints: Vec<Waypoint>,
    pub original_count: u32,
    pub final_count: u32,
    pub explanation: String,
    pub detected_source: DetectedSource,
    pub extracted_count: u32,
    pub strategy: ReductionStrategy,
    pub bounds: Option<Bounds>,
    pub center: Option<FfiCenter>,
    pub route_distance_meters: f64,
}

impl From<SimplificationOutcome> for FfiSimplificationOutcome {
    fn from(outcome: SimplificationOutcome) -> Self {
        Self {
            original_count: outcome.original_count as u32,
            final_count: outcome.final_count as u32,
            extracted_count: outcome.extracted_count as u32,
            center: outcome.center.map(|(lat, lon)| FfiCenter { lat, lon }),
            waypoints: outcome.waypoints,
            explanation: outcome.explanation,
            detected_source: outcome.detected_source,
            strategy: outcome.strategy,
            bounds: outcome.bounds,
            route_distance_meters: outcome.route_distance_meters,
        }
    }
}

/// File queued for [`ffi_convert_batch`].
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrackInput {
    pub filename: String,
    pub text: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl From<FfiTrackInput> for TrackInput {
    fn from(input: FfiTrackInput) -> Self {
        Self {
            filename: input.filename,
            text: input.text,
            origin: input.origin,
            destination: input.destination,
        }
    }
}

fn config_with_cap(max_waypoints: u32) -> ConversionConfig {
    ConversionConfig {
        max_waypoints: max_waypoints as usize,
        ..ConversionConfig::default()
    }
}

/// Convert the text of a track file with the given waypoint cap.
#[uniffi::export]
pub fn ffi_convert_track(
    text: String,
    origin: Option<String>,
    destination: Option<String>,
    max_waypoints: u32,
) -> FfiSimplificationOutcome {
    init_logging();
    info!("[TrackplanRust] ffi_convert_track called ({} bytes)", text.len());

    let start = std::time::Instant::now();
    let outcome = convert_track(
        &text,
        origin.as_deref(),
        destination.as_deref(),
        &config_with_cap(max_waypoints),
    );
    info!(
        "[TrackplanRust] {} -> {} waypoints in {:?}",
        outcome.extracted_count,
        outcome.final_count,
        start.elapsed()
    );

    outcome.into()
}

/// Convert several files in parallel.
#[uniffi::export]
pub fn ffi_convert_batch(
    inputs: Vec<FfiTrackInput>,
    max_waypoints: u32,
) -> Vec<FfiSimplificationOutcome> {
    init_logging();
    info!("[TrackplanRust] ffi_convert_batch called with {} files", inputs.len());

    let inputs: Vec<TrackInput> = inputs.into_iter().map(TrackInput::from).collect();
    convert_batch_parallel(&inputs, &config_with_cap(max_waypoints))
        .into_iter()
        .map(FfiSimplificationOutcome::from)
        .collect()
}

/// Reassign sequential names after the editor inserted or removed waypoints.
#[uniffi::export]
pub fn ffi_rename_waypoints(
    mut waypoints: Vec<Waypoint>,
    origin: Option<String>,
    destination: Option<String>,
) -> Vec<Waypoint> {
    assign_names(&mut waypoints, origin.as_deref(), destination.as_deref());
    waypoints
}

/// Render the editor's current waypoints as a flight plan.
#[uniffi::export]
pub fn ffi_serialize_plan(waypoints: Vec<Waypoint>) -> std::result::Result<String, TrackError> {
    init_logging();
    info!("[TrackplanRust] Serializing {} waypoints", waypoints.len());
    serialize_plan(&waypoints)
}

/// Output file name for a plan converted from `source_filename`.
#[uniffi::export]
pub fn ffi_plan_file_name(source_filename: String) -> String {
    plan_file_name(&source_filename)
}
