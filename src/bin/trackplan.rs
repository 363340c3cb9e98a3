//! trackplan CLI - convert flight tracks into simulator flight plans
//!
//! Usage:
//!   trackplan convert <file> [--origin <ICAO>] [--destination <ICAO>] [--output <path>] [--max-waypoints <n>]
//!   trackplan inspect <file>
//!
//! `convert` writes a Garmin `.fpl` plan next to the input unless `--output`
//! is given. `inspect` reports what the pipeline sees without writing anything.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trackplan::{
    convert_track, detect_source, extract_points, plan_file_name, ConversionConfig,
    SimplificationOutcome, TrackError, XmlDocument,
};

#[derive(Parser)]
#[command(name = "trackplan")]
#[command(about = "Convert recorded flight tracks into simulator flight plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print every waypoint
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a KML track into a flight plan
    Convert {
        /// Track file exported from FlightAware or Flightradar24
        file: PathBuf,

        /// Departure airport code for the first waypoint
        #[arg(long)]
        origin: Option<String>,

        /// Arrival airport code for the last waypoint
        #[arg(long)]
        destination: Option<String>,

        /// Output path (defaults to the input name with an .fpl extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Waypoint cap of the target simulator
        #[arg(long, default_value = "250")]
        max_waypoints: usize,
    },

    /// Show detected source and point counts without writing a plan
    Inspect {
        /// Track file to inspect
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            file,
            origin,
            destination,
            output,
            max_waypoints,
        } => run_convert(
            &file,
            origin.as_deref(),
            destination.as_deref(),
            output,
            max_waypoints,
            cli.verbose,
        ),
        Commands::Inspect { file } => run_inspect(&file, cli.verbose),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_convert(
    file: &Path,
    origin: Option<&str>,
    destination: Option<&str>,
    output: Option<PathBuf>,
    max_waypoints: usize,
    verbose: bool,
) -> Result<(), TrackError> {
    let text = fs::read_to_string(file)?;
    let config = ConversionConfig {
        max_waypoints,
        ..ConversionConfig::default()
    };

    let outcome = convert_track(&text, origin, destination, &config);
    print_summary(file, &outcome, verbose);
    if outcome.is_empty() {
        return Err(TrackError::NoWaypoints);
    }

    let output = output.unwrap_or_else(|| default_output_path(file));
    fs::write(&output, outcome.to_plan()?)?;
    println!("\nWritten: {}", output.display());
    Ok(())
}

fn run_inspect(file: &Path, verbose: bool) -> Result<(), TrackError> {
    let text = fs::read_to_string(file)?;
    let doc = XmlDocument::parse(&text)?;
    let points = extract_points(&doc);

    println!("\n{}", "=".repeat(60));
    println!("Inspecting: {}", file.display());
    println!("{}", "=".repeat(60));
    println!("  Elements:       {}", doc.len());
    println!("  Source:         {}", detect_source(&doc));
    println!("  Points:         {}", points.len());

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        println!(
            "  First:          {:.6}, {:.6} ({} ft)",
            first.lat, first.lon, first.altitude_feet
        );
        println!(
            "  Last:           {:.6}, {:.6} ({} ft)",
            last.lat, last.lon, last.altitude_feet
        );
        let max_altitude = points.iter().map(|p| p.altitude_feet).max().unwrap_or(0);
        println!("  Max altitude:   {} ft", max_altitude);
    }

    let outcome = convert_track(&text, None, None, &ConversionConfig::default());
    print_summary(file, &outcome, verbose);
    Ok(())
}

fn print_summary(file: &Path, outcome: &SimplificationOutcome, verbose: bool) {
    println!("\n{}", "-".repeat(60));
    println!("{}", file.display());
    println!("{}", "-".repeat(60));
    println!("  Source:         {}", outcome.detected_source);
    println!("  Extracted:      {}", outcome.extracted_count);
    println!("  Cleaned:        {}", outcome.original_count);
    println!("  Waypoints:      {}", outcome.final_count);
    println!("  Distance:       {:.1} km", outcome.route_distance_meters / 1000.0);
    println!("  {}", outcome.explanation);

    if verbose {
        println!();
        for wp in &outcome.waypoints {
            println!(
                "  {:>6}  {:>11.6} {:>11.6}  {:>6} ft",
                wp.name, wp.lat, wp.lon, wp.altitude_feet
            );
        }
    }
}

fn default_output_path(file: &Path) -> PathBuf {
    let name = plan_file_name(&file.to_string_lossy());
    file.with_file_name(name)
}
