//! Accumulates the stroke currently being drawn.

use crate::stroke::{Stroke, StrokeStyle};
use kurbo::Point;
use thiserror::Error;

/// Stroke buffer misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("a stroke is already in progress")]
    AlreadyDrawing,
    #[error("no stroke is in progress")]
    NotDrawing,
}

/// Owns the in-progress stroke until it is handed to the history.
#[derive(Debug, Default)]
pub struct StrokeBuffer {
    current: Option<Stroke>,
}

impl StrokeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new empty stroke.
    pub fn begin(&mut self, style: StrokeStyle) -> Result<(), InvalidState> {
        if self.current.is_some() {
            return Err(InvalidState::AlreadyDrawing);
        }
        self.current = Some(Stroke::new(style));
        Ok(())
    }

    /// Append a point to the current stroke. Ignored when idle, since
    /// move events can trail the release.
    pub fn append(&mut self, point: Point) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.push(point);
        }
    }

    /// Finish the current stroke and move it out of the buffer.
    pub fn end(&mut self) -> Result<Stroke, InvalidState> {
        self.current.take().ok_or(InvalidState::NotDrawing)
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_append_end() {
        let mut buffer = StrokeBuffer::new();
        buffer.begin(StrokeStyle::new("blue", 3.0)).unwrap();
        buffer.append(Point::new(0.0, 0.0));
        buffer.append(Point::new(5.0, 5.0));
        assert!(buffer.is_drawing());

        let stroke = buffer.end().unwrap();
        assert_eq!(stroke.len(), 2);
        assert_eq!(stroke.style.color, "blue");
        assert!(!buffer.is_drawing());
        assert!(buffer.current().is_none());
    }

    #[test]
    fn test_begin_twice_is_invalid() {
        let mut buffer = StrokeBuffer::new();
        buffer.begin(StrokeStyle::default()).unwrap();
        assert_eq!(
            buffer.begin(StrokeStyle::default()),
            Err(InvalidState::AlreadyDrawing)
        );
        // The original stroke is untouched.
        assert!(buffer.current().unwrap().is_empty());
    }

    #[test]
    fn test_end_while_idle_is_invalid() {
        let mut buffer = StrokeBuffer::new();
        assert_eq!(buffer.end(), Err(InvalidState::NotDrawing));
    }

    #[test]
    fn test_append_while_idle_is_ignored() {
        let mut buffer = StrokeBuffer::new();
        buffer.append(Point::new(1.0, 1.0));
        assert!(!buffer.is_drawing());
    }

    #[test]
    fn test_tap_yields_degenerate_stroke() {
        let mut buffer = StrokeBuffer::new();
        buffer.begin(StrokeStyle::default()).unwrap();
        buffer.append(Point::new(3.0, 4.0));
        let stroke = buffer.end().unwrap();
        assert!(stroke.is_degenerate());
    }
}
