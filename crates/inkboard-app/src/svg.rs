//! SVG export of the visible strokes.

use crate::error::{AppError, AppResult};
use inkboard_core::{DrawingSink, Stroke, StrokeStyle};
use kurbo::{Point, Rect};
use std::fmt::Write as _;
use std::path::Path;

/// Padding around the drawing in the exported document.
const MARGIN: f64 = 16.0;

/// Size used when nothing visible has been drawn.
const EMPTY_SIZE: f64 = 256.0;

/// Sink that keeps what is currently on screen and renders it as SVG.
#[derive(Debug, Default)]
pub struct SvgSink {
    strokes: Vec<Stroke>,
}

impl SvgSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polylines drawn since the last clear.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Render the visible strokes. Degenerate strokes produce no path.
    pub fn to_svg(&self) -> String {
        let visible: Vec<&Stroke> = self.strokes.iter().filter(|s| !s.is_degenerate()).collect();

        let view = visible
            .iter()
            .map(|s| s.bounds().inflate(s.style.width / 2.0, s.style.width / 2.0))
            .reduce(|a, b| a.union(b))
            .map(|r| r.inflate(MARGIN, MARGIN))
            .unwrap_or_else(|| Rect::new(0.0, 0.0, EMPTY_SIZE, EMPTY_SIZE));

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            view.x0,
            view.y0,
            view.width(),
            view.height(),
            view.width(),
            view.height()
        );
        for stroke in visible {
            let _ = writeln!(
                svg,
                r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
                stroke.to_path().to_svg(),
                escape_attr(&stroke.style.color),
                stroke.style.width
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the SVG document to `path`.
    pub fn write_to(&self, path: &Path) -> AppResult<()> {
        std::fs::write(path, self.to_svg()).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl DrawingSink for SvgSink {
    fn clear(&mut self) {
        self.strokes.clear();
    }

    fn draw_polyline(&mut self, points: &[Point], style: &StrokeStyle) {
        self.strokes
            .push(Stroke::from_points(style.clone(), points.to_vec()));
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
