//! # Flight Plan Serializer
//!
//! Renders waypoints as a Garmin flight plan (`.fpl`) document: a waypoint
//! table followed by a single route that visits every waypoint in order.
//!
//! ```text
//! <flight-plan xmlns="http://www8.garmin.com/xmlschemas/FlightPlan/v1">
//!   <waypoint-table>
//!     <waypoint>identifier, type, lat, lon, [elevation]</waypoint>
//!   </waypoint-table>
//!   <route>
//!     <route-point>waypoint-identifier, waypoint-type</route-point>
//!   </route>
//! </flight-plan>
//! ```
//!
//! Elevation is written in meters and omitted for waypoints at 0 ft.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, TrackError};
use crate::geo_utils::feet_to_meters;
use crate::Waypoint;

/// Default namespace of the flight plan schema.
pub const FPL_NAMESPACE: &str = "http://www8.garmin.com/xmlschemas/FlightPlan/v1";

/// Type tag written for every waypoint and route point.
pub const WAYPOINT_TYPE: &str = "USER WAYPOINT";

/// File extension of serialized plans.
pub const FPL_EXTENSION: &str = "fpl";

/// Serialize `waypoints` into a flight plan document.
///
/// An empty list produces an empty string rather than an empty plan.
///
/// # Example
/// ```
/// use trackplan::{TrackPoint, Waypoint};
/// use trackplan::fpl::serialize_plan;
///
/// let mut waypoint = Waypoint::from(TrackPoint::new(0, 52.308056, 4.764167, 1000));
/// waypoint.name = "EHAM".to_string();
/// let xml = serialize_plan(&[waypoint]).unwrap();
/// assert!(xml.contains("<identifier>EHAM</identifier>"));
/// assert!(xml.contains("<elevation>305</elevation>"));
/// ```
pub fn serialize_plan(waypoints: &[Waypoint]) -> Result<String> {
    let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
        return Ok(String::new());
    };

    let mut writer = PlanWriter::new();
    writer.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.start(BytesStart::new("flight-plan").with_attributes([("xmlns", FPL_NAMESPACE)]))?;

    writer.start(BytesStart::new("waypoint-table"))?;
    for waypoint in waypoints {
        writer.start(BytesStart::new("waypoint"))?;
        writer.text_element("identifier", &waypoint.name)?;
        writer.text_element("type", WAYPOINT_TYPE)?;
        writer.text_element("lat", &format!("{:.6}", waypoint.lat))?;
        writer.text_element("lon", &format!("{:.6}", waypoint.lon))?;
        if waypoint.altitude_feet != 0 {
            writer.text_element("elevation", &feet_to_meters(waypoint.altitude_feet).to_string())?;
        }
        writer.end("waypoint")?;
    }
    writer.end("waypoint-table")?;

    writer.start(BytesStart::new("route"))?;
    writer.text_element("route-name", &format!("{} {}", first.name, last.name))?;
    writer.text_element("flight-plan-index", "1")?;
    for waypoint in waypoints {
        writer.start(BytesStart::new("route-point"))?;
        writer.text_element("waypoint-identifier", &waypoint.name)?;
        writer.text_element("waypoint-type", WAYPOINT_TYPE)?;
        writer.end("route-point")?;
    }
    writer.end("route")?;

    writer.end("flight-plan")?;
    writer.finish()
}

/// Output file name for a plan converted from `source_filename`.
///
/// ```
/// use trackplan::fpl::plan_file_name;
/// assert_eq!(plan_file_name("KLM605.kml"), "KLM605.fpl");
/// assert_eq!(plan_file_name("/tmp/tracks/BAW1"), "BAW1.fpl");
/// ```
pub fn plan_file_name(source_filename: &str) -> String {
    let stem = Path::new(source_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("flightplan");
    format!("{}.{}", stem, FPL_EXTENSION)
}

/// quick-xml writer with errors mapped into [`TrackError::Serialize`].
struct PlanWriter {
    inner: Writer<Vec<u8>>,
}

impl PlanWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| TrackError::Serialize(e.to_string()))
    }

    fn start(&mut self, start: BytesStart<'_>) -> Result<()> {
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(BytesStart::new(name))?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String> {
        let mut xml = String::from_utf8(self.inner.into_inner())
            .map_err(|e| TrackError::Serialize(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }
}
