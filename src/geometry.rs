//! Bounding boxes and exact point-in-polygon tests on the integer pixel grid.

use geo::{BoundingRect, Polygon};

/// A text line outline with integer vertices. The ring is implicitly closed.
pub type LinePolygon = Polygon<i32>;

/// Half-open integer rectangle `[min_x, max_x) x [min_y, max_y)`.
///
/// For a polygon the box spans its extreme vertices, so a rectangle with
/// corners (0, 0) and (10, 10) covers 100 pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(
            x,
            y,
            x.saturating_add_unsigned(width),
            y.saturating_add_unsigned(height),
        )
    }

    /// Box of a polygon's vertices; empty when the polygon has none.
    pub fn of(polygon: &LinePolygon) -> Self {
        polygon
            .bounding_rect()
            .map(|rect| Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
            .unwrap_or_default()
    }

    pub fn width(&self) -> u32 {
        if self.max_x > self.min_x {
            self.max_x.abs_diff(self.min_x)
        } else {
            0
        }
    }

    pub fn height(&self) -> u32 {
        if self.max_y > self.min_y {
            self.max_y.abs_diff(self.min_y)
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Overlap test. Boxes that only share an edge do not intersect, and an
    /// empty box intersects nothing.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Smallest box covering both. Empty boxes are neutral.
    pub fn union(&self, other: &BoundingBox) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn intersection(&self, other: &BoundingBox) -> Self {
        if !self.intersects(other) {
            return Self::default();
        }
        Self::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }

    /// Every pixel of the box, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> {
        let Self {
            min_x,
            min_y,
            max_x,
            max_y,
        } = *self;
        (min_y..max_y).flat_map(move |y| (min_x..max_x).map(move |x| (x, y)))
    }
}

/// Even-odd containment of the pixel `(x, y)`, holes included.
///
/// Crossings are decided in exact integer arithmetic. Points on a left or top
/// edge count as inside, points on a right or bottom edge as outside, so
/// adjacent polygons never share a pixel.
pub fn contains(polygon: &LinePolygon, x: i32, y: i32) -> bool {
    let (px, py) = (i64::from(x), i64::from(y));
    let mut inside = false;
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        for line in ring.lines() {
            let (x1, y1) = (i64::from(line.start.x), i64::from(line.start.y));
            let (x2, y2) = (i64::from(line.end.x), i64::from(line.end.y));
            if (y1 > py) == (y2 > py) {
                continue;
            }
            // px < x1 + (x2 - x1) * (py - y1) / (y2 - y1), cross-multiplied
            let lhs = (px - x1) * (y2 - y1);
            let rhs = (x2 - x1) * (py - y1);
            let crosses = if y2 > y1 { lhs < rhs } else { lhs > rhs };
            if crosses {
                inside = !inside;
            }
        }
    }
    inside
}
