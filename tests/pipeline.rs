//! Integration tests for the conversion pipeline
//!
//! Track files are built inline as Flightradar24-style KML.

use trackplan::{
    clean_route, convert_track, extract_points, ConversionConfig, PointId, ReductionStrategy,
    SimplificationOutcome, TrackPoint, XmlDocument,
};

/// KML with a single LineString of (lat, lon, altitude_m) samples.
fn line_string_kml(coords: &[(f64, f64, f64)]) -> String {
    let body: Vec<String> = coords
        .iter()
        .map(|(lat, lon, alt)| format!("{:.6},{:.6},{:.1}", lon, lat, alt))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>test track</name>
    <Placemark>
      <LineString>
        <coordinates>{}</coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#,
        body.join(" ")
    )
}

fn convert(kml: &str) -> SimplificationOutcome {
    convert_track(kml, None, None, &ConversionConfig::default())
}

fn cleaned(kml: &str) -> Vec<TrackPoint> {
    let doc = XmlDocument::parse(kml).unwrap();
    clean_route(&extract_points(&doc))
}

/// Deterministic pseudo-random walk with turns, climbs and descents.
fn wandering_track(n: usize, seed: u64) -> Vec<(f64, f64, f64)> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f64) / ((1u64 << 31) as f64)
    };

    let (mut lat, mut lon, mut alt) = (45.0, 5.0, 0.0);
    let mut heading: f64 = 0.3;
    (0..n)
        .map(|_| {
            heading += (next() - 0.5) * 0.6;
            lat += heading.sin() * 0.01;
            lon += heading.cos() * 0.01;
            alt = (alt + (next() - 0.45) * 200.0).clamp(0.0, 12_000.0);
            (lat, lon, alt)
        })
        .collect()
}

fn straight_track(n: usize) -> Vec<(f64, f64, f64)> {
    (0..n).map(|i| (40.0, -100.0 + i as f64 * 0.01, 3000.0)).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_short_straight_track_passes_through() {
    let outcome = convert(&line_string_kml(&straight_track(10)));

    assert_eq!(outcome.original_count, 10);
    assert_eq!(outcome.final_count, 10);
    assert_eq!(outcome.strategy, ReductionStrategy::PassThrough);
    assert!(outcome.explanation.contains("no simplification needed"));

    let names: Vec<&str> = outcome.waypoints.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(
        names,
        ["001", "002", "003", "004", "005", "006", "007", "008", "009", "010"]
    );
}

#[test]
fn test_sharp_turn_survives_reduction() {
    // East along lat 40 until index 500, then due north.
    let coords: Vec<(f64, f64, f64)> = (0..1000)
        .map(|i| {
            if i <= 500 {
                (40.0, -100.0 + i as f64 * 0.01, 10_000.0)
            } else {
                (40.0 + (i - 500) as f64 * 0.01, -95.0, 10_000.0)
            }
        })
        .collect();
    let outcome = convert(&line_string_kml(&coords));

    assert_eq!(outcome.original_count, 1000);
    assert!(outcome.final_count <= 250);
    assert!(outcome
        .waypoints
        .iter()
        .any(|w| (w.lat - 40.0).abs() < 1e-9 && (w.lon + 95.0).abs() < 1e-9));
}

#[test]
fn test_adjacent_duplicate_removed() {
    let coords = [
        (52.0, 4.0, 0.0),
        (52.1, 4.1, 100.0),
        (52.1, 4.1, 100.0),
        (52.2, 4.2, 200.0),
        (52.3, 4.3, 300.0),
    ];
    let outcome = convert(&line_string_kml(&coords));

    assert_eq!(outcome.extracted_count, 5);
    assert_eq!(outcome.original_count, 4);
    assert_eq!(outcome.final_count, 4);
}

#[test]
fn test_back_and_forth_loop_collapses() {
    // A -> B -> A -> C
    let coords = [(0.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 0.0), (1.0, 1.0, 0.0)];
    let outcome = convert(&line_string_kml(&coords));

    let positions: Vec<(f64, f64)> = outcome.waypoints.iter().map(|w| (w.lat, w.lon)).collect();
    assert_eq!(positions, vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
}

#[test]
fn test_airport_codes_replace_end_names() {
    let kml = line_string_kml(&straight_track(5));
    let outcome = convert_track(&kml, Some("EHAM"), Some("KSFO"), &ConversionConfig::default());

    let names: Vec<&str> = outcome.waypoints.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["EHAM", "002", "003", "004", "KSFO"]);
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_cap_invariant() {
    for (n, seed) in [(300, 1), (800, 2), (2500, 3), (6000, 4)] {
        let outcome = convert(&line_string_kml(&wandering_track(n, seed)));
        assert!(outcome.original_count > 250, "n={} cleaned to {}", n, outcome.original_count);
        assert!(outcome.final_count <= 250, "n={} gave {}", n, outcome.final_count);
        assert_eq!(outcome.final_count, outcome.waypoints.len());
    }
}

#[test]
fn test_custom_cap() {
    let config = ConversionConfig {
        max_waypoints: 60,
        ..ConversionConfig::default()
    };
    let outcome = convert_track(&line_string_kml(&wandering_track(1500, 9)), None, None, &config);
    assert!(outcome.final_count <= 60);
    assert_eq!(outcome.waypoints.last().unwrap().name, format!("{:03}", outcome.final_count));
}

#[test]
fn test_pass_through_keeps_points() {
    let kml = line_string_kml(&wandering_track(250, 5));
    let expected = cleaned(&kml);
    let outcome = convert(&kml);

    assert_eq!(outcome.final_count, outcome.original_count);
    assert_eq!(outcome.final_count, expected.len());
    for (wp, point) in outcome.waypoints.iter().zip(&expected) {
        assert_eq!((wp.lat, wp.lon, wp.altitude_feet), (point.lat, point.lon, point.altitude_feet));
        assert_eq!(wp.id, point.id);
    }
}

#[test]
fn test_endpoints_preserved() {
    for (n, seed) in [(40, 11), (600, 12), (3000, 13)] {
        let kml = line_string_kml(&wandering_track(n, seed));
        let route = cleaned(&kml);
        let outcome = convert(&kml);

        let first = outcome.waypoints.first().unwrap();
        let last = outcome.waypoints.last().unwrap();
        assert_eq!((first.lat, first.lon), (route[0].lat, route[0].lon));
        let end = route[route.len() - 1];
        assert_eq!((last.lat, last.lon), (end.lat, end.lon));
    }
}

#[test]
fn test_order_and_adjacent_uniqueness() {
    let kml = line_string_kml(&wandering_track(4000, 21));
    let route = cleaned(&kml);
    let outcome = convert(&kml);

    let position = |id: PointId| route.iter().position(|p| p.id == id).unwrap();
    let indices: Vec<usize> = outcome.waypoints.iter().map(|w| position(w.id)).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));

    for pair in outcome.waypoints.windows(2) {
        let a = format!("{:.6},{:.6}", pair[0].lat, pair[0].lon);
        let b = format!("{:.6},{:.6}", pair[1].lat, pair[1].lon);
        assert_ne!(a, b);
    }
}

#[test]
fn test_deterministic_output() {
    let kml = line_string_kml(&wandering_track(3000, 42));
    let first = convert_track(&kml, Some("LFPG"), Some("LEMD"), &ConversionConfig::default());
    let second = convert_track(&kml, Some("LFPG"), Some("LEMD"), &ConversionConfig::default());

    assert_eq!(first.waypoints, second.waypoints);
    assert_eq!(first.explanation, second.explanation);
    assert_eq!(first.to_plan().unwrap(), second.to_plan().unwrap());
}

#[test]
fn test_phase_explanation_reports_sizes() {
    let outcome = convert(&line_string_kml(&wandering_track(5000, 7)));

    assert_eq!(outcome.strategy, ReductionStrategy::PhaseWeighted);
    assert!(outcome.explanation.starts_with("phase-weighted simplification"));
    assert!(outcome.explanation.contains(&format!("-> {} waypoints", outcome.final_count)));
    assert!(outcome.explanation.contains("departure"));
    assert!(outcome.explanation.contains("en-route"));
    assert!(outcome.explanation.contains("arrival"));
}

#[test]
fn test_altitude_in_feet() {
    let coords = [(52.0, 4.0, 0.0), (52.1, 4.1, 304.8), (52.2, 4.2, 3048.0)];
    let outcome = convert(&line_string_kml(&coords));

    let altitudes: Vec<i32> = outcome.waypoints.iter().map(|w| w.altitude_feet).collect();
    assert_eq!(altitudes, vec![0, 1000, 10000]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_malformed_xml_gives_empty_outcome() {
    let outcome = convert("<kml><Document><Placemark></Document></kml>");

    assert!(outcome.is_empty());
    assert_eq!(outcome.final_count, 0);
    assert!(outcome.explanation.starts_with("failed to parse track file"));
}

#[test]
fn test_truncated_file_gives_empty_outcome() {
    let kml = line_string_kml(&straight_track(20));
    let outcome = convert(&kml[..kml.len() / 2]);
    assert!(outcome.is_empty());
    assert!(outcome.explanation.starts_with("failed to parse track file"));
}

#[test]
fn test_no_coordinates_gives_empty_outcome() {
    let outcome = convert("<kml><Document><name>nothing here</name></Document></kml>");

    assert!(outcome.is_empty());
    assert_eq!(outcome.explanation, "no valid waypoints found");
    assert_eq!(outcome.to_plan().unwrap(), "");
}

#[test]
fn test_empty_input_gives_empty_outcome() {
    let outcome = convert("");
    assert!(outcome.is_empty());
    assert!(outcome.explanation.starts_with("failed to parse track file"));
}
