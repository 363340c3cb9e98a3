//! Sequential waypoint naming with optional airport codes at the route ends.

use crate::Waypoint;

/// Name waypoints `"001"`, `"002"`, ... by position, then apply airport codes.
///
/// The origin code replaces the first name when the list is non-empty; the
/// destination code replaces the last name when there are at least two
/// waypoints. Blank codes are ignored. Names depend only on position, so
/// running this twice gives the same result.
///
/// # Example
/// ```
/// use trackplan::{TrackPoint, Waypoint};
/// use trackplan::naming::assign_names;
///
/// let mut waypoints: Vec<Waypoint> = (0..3)
///     .map(|i| Waypoint::from(TrackPoint::new(i, 52.0, 4.0 + i as f64, 0)))
///     .collect();
/// assign_names(&mut waypoints, Some("EHAM"), None);
/// let names: Vec<&str> = waypoints.iter().map(|w| w.name.as_str()).collect();
/// assert_eq!(names, ["EHAM", "002", "003"]);
/// ```
pub fn assign_names(waypoints: &mut [Waypoint], origin: Option<&str>, destination: Option<&str>) {
    for (i, waypoint) in waypoints.iter_mut().enumerate() {
        waypoint.name = sequential_name(i);
    }

    if let (Some(code), Some(first)) = (airport_code(origin), waypoints.first_mut()) {
        first.name = code.to_string();
    }
    if waypoints.len() >= 2 {
        if let (Some(code), Some(last)) = (airport_code(destination), waypoints.last_mut()) {
            last.name = code.to_string();
        }
    }
}

/// Zero-padded name for the waypoint at `index` (0-based).
pub fn sequential_name(index: usize) -> String {
    format!("{:03}", index + 1)
}

fn airport_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackPoint;

    fn waypoints(n: usize) -> Vec<Waypoint> {
        (0..n)
            .map(|i| Waypoint::from(TrackPoint::new(i, 50.0, i as f64 * 0.1, 0)))
            .collect()
    }

    fn names(waypoints: &[Waypoint]) -> Vec<String> {
        waypoints.iter().map(|w| w.name.clone()).collect()
    }

    #[test]
    fn test_sequential_names() {
        let mut wps = waypoints(3);
        assign_names(&mut wps, None, None);
        assert_eq!(names(&wps), ["001", "002", "003"]);
        assert_eq!(sequential_name(249), "250");
    }

    #[test]
    fn test_origin_and_destination() {
        let mut wps = waypoints(5);
        assign_names(&mut wps, Some("EHAM"), Some("KSFO"));
        assert_eq!(names(&wps), ["EHAM", "002", "003", "004", "KSFO"]);
    }

    #[test]
    fn test_destination_needs_two_waypoints() {
        let mut wps = waypoints(1);
        assign_names(&mut wps, None, Some("KSFO"));
        assert_eq!(names(&wps), ["001"]);

        assign_names(&mut wps, Some("EHAM"), Some("KSFO"));
        assert_eq!(names(&wps), ["EHAM"]);
    }

    #[test]
    fn test_blank_codes_ignored() {
        let mut wps = waypoints(3);
        assign_names(&mut wps, Some("  "), Some(""));
        assert_eq!(names(&wps), ["001", "002", "003"]);
    }

    #[test]
    fn test_renaming_is_idempotent() {
        let mut wps = waypoints(4);
        assign_names(&mut wps, Some("EGLL"), Some("LFPG"));
        let first = names(&wps);
        wps[1].name = "EDITED".to_string();
        assign_names(&mut wps, Some("EGLL"), Some("LFPG"));
        assert_eq!(names(&wps), first);
    }

    #[test]
    fn test_empty_list() {
        let mut wps: Vec<Waypoint> = Vec::new();
        assign_names(&mut wps, Some("EHAM"), Some("KSFO"));
        assert!(wps.is_empty());
    }
}
