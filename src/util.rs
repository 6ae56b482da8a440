use geo::{Coord, LineString, MapCoords, Polygon};
use imageproc::point::Point;

use crate::geometry::LinePolygon;

pub fn to_line_polygon(points: &[Point<i32>]) -> LinePolygon {
    let points = points
        .iter()
        .map(|point| Coord {
            x: point.x,
            y: point.y,
        })
        .collect();
    Polygon::new(LineString::new(points), vec![])
}

pub fn polygon_from_vertices(vertices: &[(i32, i32)]) -> LinePolygon {
    let points = vertices
        .iter()
        .map(|&(x, y)| Point::new(x, y))
        .collect::<Vec<_>>();
    to_line_polygon(&points)
}

/// Axis-aligned rectangle with corners `(min_x, min_y)` and `(max_x, max_y)`.
pub fn rectangle(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> LinePolygon {
    polygon_from_vertices(&[(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)])
}

pub(crate) fn to_clip_polygon(polygon: &LinePolygon) -> Polygon<f64> {
    polygon.map_coords(|Coord { x, y }| Coord {
        x: f64::from(x),
        y: f64::from(y),
    })
}

/// Division that yields 0 instead of NaN or infinity.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
