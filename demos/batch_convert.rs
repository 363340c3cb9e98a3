//! Example of converting many track files in parallel.
//!
//! Run with: cargo run --example batch_convert --features parallel

use std::time::Instant;
use trackplan::{convert_batch, convert_batch_parallel, ConversionConfig, TrackInput};

/// Flightradar24-style KML: one LineString of `n` "lon,lat,alt" triples.
fn synthetic_flightradar_kml(n: usize, origin: (f64, f64), destination: (f64, f64)) -> String {
    let coords: Vec<String> = (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let lat = origin.0 + (destination.0 - origin.0) * t + (t * 20.0).sin() * 0.02;
            let lon = origin.1 + (destination.1 - origin.1) * t;
            let altitude_m = 10_000.0 * (t * std::f64::consts::PI).sin();
            format!("{:.5},{:.5},{:.0}", lon, lat, altitude_m)
        })
        .collect();

    format!(
        "<kml><Document><Placemark><LineString><coordinates>{}</coordinates></LineString></Placemark></Document></kml>",
        coords.join(" ")
    )
}

fn main() {
    println!("Batch Track Conversion Example\n");

    let routes = [
        ("EHAM", (52.3080, 4.7641), "EGLL", (51.4700, -0.4543)),
        ("KJFK", (40.6413, -73.7781), "KLAX", (33.9416, -118.4085)),
        ("LFPG", (49.0097, 2.5479), "LEMD", (40.4983, -3.5676)),
        ("RJTT", (35.5494, 139.7798), "RKSI", (37.4602, 126.4407)),
    ];

    // Each route repeated with different sample densities
    let mut inputs = Vec::new();
    for (origin, from, destination, to) in routes {
        for n in [100, 1_000, 5_000] {
            let filename = format!("{}-{}-{}.kml", origin, destination, n);
            inputs.push(
                TrackInput::new(filename, synthetic_flightradar_kml(n, from, to))
                    .with_airports(Some(origin), Some(destination)),
            );
        }
    }

    let config = ConversionConfig::default();

    let start = Instant::now();
    let sequential = convert_batch(&inputs, &config);
    let sequential_time = start.elapsed();

    let start = Instant::now();
    let parallel = convert_batch_parallel(&inputs, &config);
    let parallel_time = start.elapsed();

    println!("Converted {} files", inputs.len());
    println!("  sequential: {:?}", sequential_time);
    println!("  parallel:   {:?}", parallel_time);
    println!("  identical:  {}\n", sequential == parallel);

    for (input, outcome) in inputs.iter().zip(&parallel) {
        println!(
            "  {:<22} {:>5} -> {:>3} waypoints  {:?}",
            input.filename, outcome.original_count, outcome.final_count, outcome.strategy
        );
    }
}
