//! Convert a synthetic FlightAware export into a flight plan.
//!
//! Run with: cargo run --example convert_track

use trackplan::{convert_track, ConversionConfig};

/// Build a FlightAware-style KML with `n` samples along a climbing, turning route.
fn synthetic_flightaware_kml(n: usize) -> String {
    let mut coords = String::new();
    for i in 0..n {
        let t = i as f64 / n as f64;
        // Amsterdam towards the south-east with a gentle S-turn
        let lat = 52.3080 - t * 3.0 + (t * 12.0).sin() * 0.05;
        let lon = 4.7641 + t * 4.0;
        let altitude_m = (t * 40_000.0).min(11_000.0) - (t - 0.9).max(0.0) * 110_000.0;
        coords.push_str(&format!(
            "      <gx:coord>{:.5} {:.5} {:.0}</gx:coord>\n",
            lon,
            lat,
            altitude_m.max(0.0)
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2" xmlns:gx="http://www.google.com/kml/ext/2.2">
  <Document>
    <name>FlightAware ✈ KLM1857 (AMS-MUC)</name>
    <Placemark>
      <gx:Track>
{}      </gx:Track>
    </Placemark>
  </Document>
</kml>"#,
        coords
    )
}

fn main() {
    println!("Track Conversion Example\n");

    let kml = synthetic_flightaware_kml(1200);
    let config = ConversionConfig::default();

    let outcome = convert_track(&kml, Some("EHAM"), Some("EDDM"), &config);

    println!("Source:      {}", outcome.detected_source);
    println!("Extracted:   {} points", outcome.extracted_count);
    println!("Cleaned:     {} points", outcome.original_count);
    println!("Waypoints:   {} (cap {})", outcome.final_count, config.max_waypoints);
    println!("Distance:    {:.0} km", outcome.route_distance_meters / 1000.0);
    println!("Explanation: {}\n", outcome.explanation);

    println!("First and last waypoints:");
    for wp in outcome.waypoints.iter().take(3).chain(outcome.waypoints.iter().rev().take(3).rev()) {
        println!("  {:>5}  {:.6}, {:.6}  {} ft", wp.name, wp.lat, wp.lon, wp.altitude_feet);
    }

    match outcome.to_plan() {
        Ok(plan) => println!("\nPlan: {} bytes of XML, {} lines", plan.len(), plan.lines().count()),
        Err(e) => eprintln!("\nFailed to write plan: {}", e),
    }
}
