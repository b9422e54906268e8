//! Freehand strokes.

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// Default pen color.
pub const DEFAULT_PEN_COLOR: &str = "#000000";

/// Default pen width.
pub const DEFAULT_PEN_WIDTH: f64 = 2.0;

/// Pen properties shared by every point of a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// CSS color string.
    pub color: String,
    /// Line width in canvas units.
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH)
    }
}

/// One continuous freehand path with a fixed style.
///
/// Serialized flat as `{color, width, points}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(flatten)]
    pub style: StrokeStyle,
    /// Points in drawing order.
    pub points: Vec<Point>,
}

impl Stroke {
    /// Create an empty stroke with the given style.
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            points: Vec::new(),
        }
    }

    /// Create from existing points.
    pub fn from_points(style: StrokeStyle, points: Vec<Point>) -> Self {
        Self { style, points }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A tap produces a stroke with at most one point; it is valid but draws nothing.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    /// The last two points, if any.
    pub fn last_segment(&self) -> Option<[Point; 2]> {
        match self.points.as_slice() {
            [.., a, b] => Some([*a, *b]),
            _ => None,
        }
    }

    /// Axis-aligned bounds of all points, `Rect::ZERO` when empty.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };

        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |rect, p| {
                rect.union_pt(*p)
            })
    }

    /// The stroke as an open polyline path.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };

        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }

        path
    }
}
