//! Replaying strokes onto a drawing surface.

use crate::stroke::{Stroke, StrokeStyle};
use kurbo::Point;

/// A surface strokes are drawn onto.
pub trait DrawingSink {
    /// Erase everything.
    fn clear(&mut self);

    /// Draw an open polyline through `points`.
    fn draw_polyline(&mut self, points: &[Point], style: &StrokeStyle);
}

/// Issues draw calls for history changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderDispatcher {
    redraws: u64,
}

impl RenderDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the sink and draw every stroke in order.
    pub fn redraw_from(&mut self, strokes: &[Stroke], sink: &mut dyn DrawingSink) {
        sink.clear();
        for stroke in strokes {
            sink.draw_polyline(&stroke.points, &stroke.style);
        }
        self.redraws += 1;
    }

    /// Draw the newest segment of a stroke still being drawn.
    pub fn preview(&self, stroke: &Stroke, sink: &mut dyn DrawingSink) {
        if let Some(segment) = stroke.last_segment() {
            sink.draw_polyline(&segment, &stroke.style);
        }
    }

    /// Number of full redraws issued so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

/// A recorded sink call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Polyline { points: Vec<Point>, style: StrokeStyle },
}

/// Sink that records every call, for headless sessions and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    calls: Vec<DrawCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since creation.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Polylines drawn since the last clear, i.e. what is on screen.
    pub fn visible(&self) -> Vec<Stroke> {
        let start = self
            .calls
            .iter()
            .rposition(|call| *call == DrawCall::Clear)
            .map_or(0, |i| i + 1);

        self.calls[start..]
            .iter()
            .filter_map(|call| match call {
                DrawCall::Polyline { points, style } => {
                    Some(Stroke::from_points(style.clone(), points.clone()))
                }
                DrawCall::Clear => None,
            })
            .collect()
    }
}

impl DrawingSink for RecordingSink {
    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn draw_polyline(&mut self, points: &[Point], style: &StrokeStyle) {
        self.calls.push(DrawCall::Polyline {
            points: points.to_vec(),
            style: style.clone(),
        });
    }
}
