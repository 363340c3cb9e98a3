//! # Track Documents
//!
//! Parses KML-style track exports into an owned element tree and exposes the
//! handful of lookups the extractor needs through the [`TrackDocument`] trait.
//!
//! The tree is stored as a flat arena in document order. Every element records
//! the exclusive end of its subtree, so the descendants of an element are the
//! contiguous slice that follows it.
//!
//! ## Lookups
//!
//! | Method | Finds |
//! |--------|-------|
//! | [`TrackDocument::find_extended_tracks`] | `gx:Track` elements and their `gx:coord` children |
//! | [`TrackDocument::find_line_geometries`] | `LineString` coordinate lists |
//! | [`TrackDocument::find_generic_placemarks`] | coordinate lists and nested tracks of every `Placemark` |
//! | [`TrackDocument::find_any_coordinate_lists`] | every `coordinates` element, wherever it lives |

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TrackError};

/// Namespace of the KML extension elements (`gx:Track`, `gx:coord`).
pub const GX_NAMESPACE: &str = "http://www.google.com/kml/ext/2.2";

/// Capability interface over a parsed track document.
///
/// Extraction strategies only talk to this trait, so a different XML backend
/// needs one implementation and nothing else.
pub trait TrackDocument {
    /// Extension-namespace track elements, each as the texts of its coordinate children.
    fn find_extended_tracks(&self) -> Vec<Vec<&str>>;

    /// The coordinate-list text of every line-geometry element.
    fn find_line_geometries(&self) -> Vec<&str>;

    /// Every placemark with its inline coordinate lists and nested tracks.
    fn find_generic_placemarks(&self) -> Vec<Placemark<'_>>;

    /// Every coordinate-list text in the document, regardless of container.
    fn find_any_coordinate_lists(&self) -> Vec<&str>;

    /// Title metadata: the `name` children of the root and of `Document` elements.
    fn titles(&self) -> Vec<&str>;
}

/// Coordinate data found under one placemark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placemark<'a> {
    /// Inline `coordinates` texts (comma-triple lists).
    pub coordinate_lists: Vec<&'a str>,
    /// Nested track elements (any namespace), each as its `coord` texts.
    pub tracks: Vec<Vec<&'a str>>,
}

#[derive(Debug, Clone)]
struct Element {
    prefix: Option<String>,
    local_name: String,
    namespace: Option<String>,
    text: String,
    parent: Option<usize>,
    /// Exclusive end of this element's subtree in the arena.
    end: usize,
}

/// An owned XML element tree built with quick-xml.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Element>,
}

impl XmlDocument {
    /// Parse a document. Fails on malformed XML or when no element is present.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut nodes: Vec<Element> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        // Namespace declarations per open element: (prefix, uri), prefix "" = default.
        let mut scopes: Vec<Vec<(String, String)>> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let idx = push_element(&mut nodes, &mut scopes, &e, open.last().copied())?;
                    open.push(idx);
                }
                Ok(Event::Empty(e)) => {
                    let idx = push_element(&mut nodes, &mut scopes, &e, open.last().copied())?;
                    nodes[idx].end = nodes.len();
                    scopes.pop();
                }
                Ok(Event::End(_)) => {
                    let idx = open
                        .pop()
                        .ok_or_else(|| TrackError::Parse("unmatched closing tag".to_string()))?;
                    nodes[idx].end = nodes.len();
                    scopes.pop();
                }
                Ok(Event::Text(t)) => {
                    if let Some(&top) = open.last() {
                        let text = t.unescape().map_err(|e| TrackError::Parse(e.to_string()))?;
                        nodes[top].append_text(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(&top) = open.last() {
                        nodes[top].append_text(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(TrackError::Parse(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
        }

        if !open.is_empty() {
            return Err(TrackError::Parse("unexpected end of document".to_string()));
        }
        if nodes.is_empty() {
            return Err(TrackError::NoRoot);
        }

        Ok(Self { nodes })
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds no elements (never true for a parsed document).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn descendants(&self, idx: usize) -> impl Iterator<Item = (usize, &Element)> {
        let end = self.nodes[idx].end;
        self.nodes[idx + 1..end]
            .iter()
            .enumerate()
            .map(move |(offset, node)| (idx + 1 + offset, node))
    }

    fn children(&self, idx: usize) -> impl Iterator<Item = (usize, &Element)> {
        self.descendants(idx)
            .filter(move |(_, node)| node.parent == Some(idx))
    }

    fn named(&self, local_name: &'static str) -> impl Iterator<Item = (usize, &Element)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.local_name == local_name)
    }

    fn coord_texts(&self, track: usize) -> Vec<&str> {
        self.children(track)
            .filter(|(_, node)| node.local_name == "coord")
            .map(|(_, node)| node.text.as_str())
            .collect()
    }
}

impl TrackDocument for XmlDocument {
    fn find_extended_tracks(&self) -> Vec<Vec<&str>> {
        self.named("Track")
            .filter(|(_, node)| node.is_extension())
            .map(|(idx, _)| self.coord_texts(idx))
            .collect()
    }

    fn find_line_geometries(&self) -> Vec<&str> {
        self.named("LineString")
            .filter_map(|(idx, _)| {
                self.children(idx)
                    .find(|(_, node)| node.local_name == "coordinates")
                    .map(|(_, node)| node.text.as_str())
            })
            .collect()
    }

    fn find_generic_placemarks(&self) -> Vec<Placemark<'_>> {
        self.named("Placemark")
            .map(|(idx, _)| {
                let mut placemark = Placemark::default();
                for (child_idx, node) in self.descendants(idx) {
                    match node.local_name.as_str() {
                        "coordinates" => placemark.coordinate_lists.push(node.text.as_str()),
                        "Track" => placemark.tracks.push(self.coord_texts(child_idx)),
                        _ => {}
                    }
                }
                placemark
            })
            .collect()
    }

    fn find_any_coordinate_lists(&self) -> Vec<&str> {
        self.named("coordinates")
            .map(|(_, node)| node.text.as_str())
            .collect()
    }

    fn titles(&self) -> Vec<&str> {
        self.named("name")
            .filter(|(_, node)| match node.parent {
                None => false,
                Some(parent) => {
                    let parent_node = &self.nodes[parent];
                    parent_node.parent.is_none() || parent_node.local_name == "Document"
                }
            })
            .map(|(_, node)| node.text.as_str())
            .collect()
    }
}

impl Element {
    /// Chunks split by CDATA sections or comments stay separate tokens.
    fn append_text(&mut self, chunk: &str) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(chunk);
    }

    fn is_extension(&self) -> bool {
        self.namespace.as_deref() == Some(GX_NAMESPACE) || self.prefix.as_deref() == Some("gx")
    }
}

fn push_element(
    nodes: &mut Vec<Element>,
    scopes: &mut Vec<Vec<(String, String)>>,
    start: &BytesStart<'_>,
    parent: Option<usize>,
) -> Result<usize> {
    let mut declared = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| TrackError::Parse(e.to_string()))?;
        let key = attr.key.as_ref();
        let prefix = if key == b"xmlns" {
            Some(String::new())
        } else {
            key.strip_prefix(b"xmlns:")
                .map(|p| String::from_utf8_lossy(p).into_owned())
        };
        if let Some(prefix) = prefix {
            let uri = attr
                .unescape_value()
                .map_err(|e| TrackError::Parse(e.to_string()))?;
            declared.push((prefix, uri.into_owned()));
        }
    }
    scopes.push(declared);

    let qname = start.name();
    let local_name = String::from_utf8_lossy(qname.local_name().as_ref()).into_owned();
    let prefix = qname
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let lookup = prefix.as_deref().unwrap_or("");
    let namespace = scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter().rev())
        .find(|(declared_prefix, _)| declared_prefix == lookup)
        .map(|(_, uri)| uri.clone());

    let idx = nodes.len();
    nodes.push(Element {
        prefix,
        local_name,
        namespace,
        text: String::new(),
        parent,
        end: idx + 1,
    });
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2" xmlns:gx="http://www.google.com/kml/ext/2.2">
  <Document>
    <name>Sample export</name>
    <Placemark>
      <name>Track</name>
      <gx:Track>
        <when>2024-01-01T00:00:00Z</when>
        <gx:coord>4.76 52.31 0</gx:coord>
        <gx:coord>4.80 52.35 300</gx:coord>
      </gx:Track>
    </Placemark>
    <Placemark>
      <LineString>
        <coordinates>4.76,52.31,0 4.80,52.35,300</coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#;

    #[test]
    fn test_parse_sample() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert!(!doc.is_empty());
        assert!(doc.len() > 5);
    }

    #[test]
    fn test_extended_tracks_resolve_namespace() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let tracks = doc.find_extended_tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0], vec!["4.76 52.31 0", "4.80 52.35 300"]);
    }

    #[test]
    fn test_rebound_prefix_still_matches_namespace() {
        let xml = r#"<kml xmlns:ext="http://www.google.com/kml/ext/2.2">
            <ext:Track><ext:coord>1 2 3</ext:coord></ext:Track></kml>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(doc.find_extended_tracks(), vec![vec!["1 2 3"]]);
    }

    #[test]
    fn test_unqualified_track_is_not_extended() {
        let xml = r#"<kml><Placemark><Track><coord>1 2 3</coord></Track></Placemark></kml>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert!(doc.find_extended_tracks().is_empty());
        let placemarks = doc.find_generic_placemarks();
        assert_eq!(placemarks.len(), 1);
        assert_eq!(placemarks[0].tracks, vec![vec!["1 2 3"]]);
    }

    #[test]
    fn test_line_geometries_and_placemarks() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(
            doc.find_line_geometries(),
            vec!["4.76,52.31,0 4.80,52.35,300"]
        );
        let placemarks = doc.find_generic_placemarks();
        assert_eq!(placemarks.len(), 2);
        assert_eq!(placemarks[0].tracks.len(), 1);
        assert!(placemarks[0].coordinate_lists.is_empty());
        assert_eq!(placemarks[1].coordinate_lists.len(), 1);
    }

    #[test]
    fn test_any_coordinate_lists() {
        let xml = r#"<root><a><coordinates>1,2</coordinates></a><coordinates>3,4</coordinates></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(doc.find_any_coordinate_lists(), vec!["1,2", "3,4"]);
    }

    #[test]
    fn test_titles() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.titles(), vec!["Sample export"]);
    }

    #[test]
    fn test_empty_elements_close_subtree() {
        let xml = r#"<kml><Placemark/><Placemark><coordinates>1,2</coordinates></Placemark></kml>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let placemarks = doc.find_generic_placemarks();
        assert_eq!(placemarks.len(), 2);
        assert!(placemarks[0].coordinate_lists.is_empty());
        assert_eq!(placemarks[1].coordinate_lists, vec!["1,2"]);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            XmlDocument::parse("<kml><Document></kml>"),
            Err(TrackError::Parse(_))
        ));
        assert!(matches!(
            XmlDocument::parse("<kml><Document>"),
            Err(TrackError::Parse(_))
        ));
    }

    #[test]
    fn test_split_text_keeps_tokens_apart() {
        let xml = r#"<root>
            <coordinates>1,2 <![CDATA[3,4]]> 5,6</coordinates>
            <coordinates>7,8<!-- gap -->9,10</coordinates>
        </root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(doc.find_any_coordinate_lists(), vec!["1,2 3,4 5,6", "7,8 9,10"]);
    }

    #[test]
    fn test_no_root() {
        assert_eq!(XmlDocument::parse("").unwrap_err(), TrackError::NoRoot);
        assert_eq!(XmlDocument::parse("   ").unwrap_err(), TrackError::NoRoot);
    }
}
