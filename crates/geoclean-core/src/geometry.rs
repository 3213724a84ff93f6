//! Geometry kinds and representative coordinates.
//!
//! A polygon-shaped coordinate block is located by its representative
//! coordinate: the first position of its first (outer) ring. No centroid or
//! bounding box is computed.

use std::fmt;

use serde_json::{Map, Value};

const SNAPSHOT_CHARS: usize = 120;

/// A `[longitude, latitude]` position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}, {:.2}", self.lon, self.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
    Other,
}

impl GeometryKind {
    pub fn of(geometry: &Map<String, Value>) -> Self {
        match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") => GeometryKind::Polygon,
            Some("MultiPolygon") => GeometryKind::MultiPolygon,
            _ => GeometryKind::Other,
        }
    }
}

/// Representative coordinate of a polygon-shaped block (`[[[lon, lat], ...], ...]`).
///
/// The error is a short description of what is missing.
pub fn representative_coord(block: &Value) -> Result<Coord, &'static str> {
    let rings = block.as_array().ok_or("polygon is not an array of rings")?;
    let ring = rings.first().ok_or("polygon has no rings")?;
    let ring = ring.as_array().ok_or("ring is not an array of positions")?;
    let position = ring.first().ok_or("first ring is empty")?;
    let position = position.as_array().ok_or("position is not an array")?;

    match (
        position.first().and_then(Value::as_f64),
        position.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => Ok(Coord { lon, lat }),
        _ => Err("position lacks numeric longitude and latitude"),
    }
}

/// Compact, length-bounded rendering of a coordinate structure for error messages.
pub fn snapshot(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return "<missing>".to_string();
    };
    let text = value.to_string();
    match text.char_indices().nth(SNAPSHOT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_from_type_member() {
        let polygon = json!({ "type": "Polygon" });
        let multi = json!({ "type": "MultiPolygon" });
        let line = json!({ "type": "LineString" });
        let untyped = json!({});
        assert_eq!(GeometryKind::of(polygon.as_object().unwrap()), GeometryKind::Polygon);
        assert_eq!(GeometryKind::of(multi.as_object().unwrap()), GeometryKind::MultiPolygon);
        assert_eq!(GeometryKind::of(line.as_object().unwrap()), GeometryKind::Other);
        assert_eq!(GeometryKind::of(untyped.as_object().unwrap()), GeometryKind::Other);
    }

    #[test]
    fn first_point_of_first_ring() {
        let block = json!([
            [[18.0, -34.0], [19.0, -34.0], [19.0, -33.0], [18.0, -34.0]],
            [[18.5, -33.5], [18.6, -33.5], [18.5, -33.4], [18.5, -33.5]]
        ]);
        assert_eq!(
            representative_coord(&block).unwrap(),
            Coord { lon: 18.0, lat: -34.0 }
        );
    }

    #[test]
    fn integer_positions_are_accepted() {
        let block = json!([[[5, 52], [6, 52], [5, 53], [5, 52]]]);
        assert_eq!(representative_coord(&block).unwrap(), Coord { lon: 5.0, lat: 52.0 });
    }

    #[test]
    fn malformed_blocks() {
        assert_eq!(representative_coord(&json!(null)), Err("polygon is not an array of rings"));
        assert_eq!(representative_coord(&json!([])), Err("polygon has no rings"));
        assert_eq!(representative_coord(&json!([[]])), Err("first ring is empty"));
        assert_eq!(representative_coord(&json!([[7]])), Err("position is not an array"));
        assert_eq!(
            representative_coord(&json!([[[1.0]]])),
            Err("position lacks numeric longitude and latitude")
        );
        assert_eq!(
            representative_coord(&json!([[["a", "b"]]])),
            Err("position lacks numeric longitude and latitude")
        );
    }

    #[test]
    fn snapshot_is_bounded() {
        let long = json!(vec![1.5; 500]);
        let snap = snapshot(Some(&long));
        assert!(snap.ends_with("..."));
        assert_eq!(snap.chars().count(), SNAPSHOT_CHARS + 3);
        assert_eq!(snapshot(Some(&json!([[]]))), "[[]]");
        assert_eq!(snapshot(None), "<missing>");
    }

    #[test]
    fn coord_display_two_decimals() {
        assert_eq!(Coord { lon: 174.7762, lat: -41.2865 }.to_string(), "174.78, -41.29");
    }
}
