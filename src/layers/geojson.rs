//! Conversion of GeoJSON geometries into shapes the map can draw and hit-test.

use crate::projection::{GeoBounds, GeoPos};
use geojson::{Geometry, PolygonType, Position, Value};

/// A drawable piece of a GeoJSON geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum GeoShape {
    /// A polygon. The first ring is the outline, the others are holes. Rings are stored without
    /// the closing point.
    Polygon(Vec<Vec<GeoPos>>),

    /// An open line.
    Line(Vec<GeoPos>),

    /// A single position.
    Point(GeoPos),
}

impl GeoShape {
    /// All positions of the shape.
    pub fn positions(&self) -> Box<dyn Iterator<Item = &GeoPos> + '_> {
        match self {
            GeoShape::Polygon(rings) => Box::new(rings.iter().flatten()),
            GeoShape::Line(points) => Box::new(points.iter()),
            GeoShape::Point(pos) => Box::new(std::iter::once(pos)),
        }
    }

    /// The geographical bounds of the shape, if it has any positions.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.positions())
    }
}

fn vec_to_geo_pos(pos: &Position) -> Option<GeoPos> {
    match pos.as_slice() {
        [lon, lat, ..] => Some(GeoPos {
            lon: *lon,
            lat: *lat,
        }),
        _ => None,
    }
}

fn line_to_geo_pos(line: &[Position]) -> Vec<GeoPos> {
    line.iter().filter_map(vec_to_geo_pos).collect()
}

fn polygon_to_shape(polygon: &PolygonType) -> Option<GeoShape> {
    let rings: Vec<Vec<GeoPos>> = polygon
        .iter()
        .map(|ring| {
            let mut points = line_to_geo_pos(ring);
            // GeoJSON rings repeat the first point at the end.
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            points
        })
        .collect();

    // A polygon without a usable outline cannot be drawn.
    match rings.first() {
        Some(outline) if outline.len() >= 3 => Some(GeoShape::Polygon(rings)),
        _ => None,
    }
}

/// Converts a GeoJSON geometry into shapes.
///
/// Multi-geometries and geometry collections are flattened. Parts that cannot be drawn, such as
/// positions with fewer than two coordinates or polygons with fewer than three distinct points,
/// are skipped.
pub fn shapes_from_geometry(geometry: &Geometry) -> Vec<GeoShape> {
    let mut shapes = Vec::new();
    push_shapes(&geometry.value, &mut shapes);
    shapes
}

fn push_shapes(value: &Value, shapes: &mut Vec<GeoShape>) {
    match value {
        Value::Point(pos) => shapes.extend(vec_to_geo_pos(pos).map(GeoShape::Point)),
        Value::MultiPoint(points) => shapes.extend(
            points
                .iter()
                .filter_map(vec_to_geo_pos)
                .map(GeoShape::Point),
        ),
        Value::LineString(line) => push_line(line, shapes),
        Value::MultiLineString(lines) => {
            for line in lines {
                push_line(line, shapes);
            }
        }
        Value::Polygon(polygon) => shapes.extend(polygon_to_shape(polygon)),
        Value::MultiPolygon(polygons) => {
            shapes.extend(polygons.iter().filter_map(polygon_to_shape))
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                push_shapes(&geometry.value, shapes);
            }
        }
    }
}

fn push_line(line: &[Position], shapes: &mut Vec<GeoShape>) {
    let points = line_to_geo_pos(line);
    if points.len() >= 2 {
        shapes.push(GeoShape::Line(points));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64) -> Vec<Vec<f64>> {
        vec![
            vec![offset, offset],
            vec![offset + 1.0, offset],
            vec![offset + 1.0, offset + 1.0],
            vec![offset, offset + 1.0],
            vec![offset, offset],
        ]
    }

    #[test]
    fn polygon_drops_closing_point() {
        let geometry = Geometry::new(Value::Polygon(vec![square(0.0)]));
        let shapes = shapes_from_geometry(&geometry);
        assert_eq!(shapes.len(), 1);
        match &shapes[0] {
            GeoShape::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 4);
                assert_eq!(rings[0][0], GeoPos { lon: 0.0, lat: 0.0 });
            }
            other => panic!("Expected a polygon, got {other:?}"),
        }
    }

    #[test]
    fn multipolygon_is_flattened() {
        let geometry = Geometry::new(Value::MultiPolygon(vec![
            vec![square(0.0)],
            vec![square(5.0)],
        ]));
        let shapes = shapes_from_geometry(&geometry);
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|s| matches!(s, GeoShape::Polygon(_))));
    }

    #[test]
    fn geometry_collection_mixes_kinds() {
        let geometry = Geometry::new(Value::GeometryCollection(vec![
            Geometry::new(Value::Point(vec![2.3, 46.8])),
            Geometry::new(Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])),
            Geometry::new(Value::MultiPoint(vec![vec![1.0, 2.0], vec![3.0, 4.0]])),
        ]));
        let shapes = shapes_from_geometry(&geometry);
        assert_eq!(shapes.len(), 4);
        assert_eq!(shapes[0], GeoShape::Point(GeoPos { lon: 2.3, lat: 46.8 }));
        assert!(matches!(shapes[1], GeoShape::Line(_)));
    }

    #[test]
    fn degenerate_parts_are_skipped() {
        let geometry = Geometry::new(Value::GeometryCollection(vec![
            // Too few coordinates in a position.
            Geometry::new(Value::Point(vec![2.3])),
            // A line needs two points.
            Geometry::new(Value::LineString(vec![vec![0.0, 0.0]])),
            // A polygon needs three distinct points.
            Geometry::new(Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]])),
            Geometry::new(Value::Polygon(vec![])),
        ]));
        assert!(shapes_from_geometry(&geometry).is_empty());
    }

    #[test]
    fn shape_bounds() {
        let geometry = Geometry::new(Value::Polygon(vec![square(2.0)]));
        let shapes = shapes_from_geometry(&geometry);
        let bounds = shapes[0].bounds().unwrap();
        assert_eq!(bounds.min, GeoPos { lon: 2.0, lat: 2.0 });
        assert_eq!(bounds.max, GeoPos { lon: 3.0, lat: 3.0 });
    }
}
