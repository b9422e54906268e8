//! Scripted pointer traces.
//!
//! One JSON object per line:
//!
//! ```text
//! {"op": "pen", "color": "#d33", "width": 4}
//! {"op": "down", "x": 10, "y": 10}
//! {"op": "move", "x": 40, "y": 25}
//! {"op": "up"}
//! {"op": "wait_ms", "ms": 1500}
//! {"op": "undo"}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::error::{AppError, AppResult};
use crate::session::SessionCommand;
use inkboard_core::{PointerEvent, StrokeStyle};
use serde::Deserialize;
use std::time::Duration;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Undo,
    Redo,
    Pen { color: String, width: f64 },
    WaitMs { ms: u64 },
}

impl ScriptStep {
    /// The session command for this step; waits have none.
    pub fn command(&self) -> Option<SessionCommand> {
        let command = match self {
            ScriptStep::Down { x, y } => SessionCommand::Pointer(PointerEvent::down(*x, *y)),
            ScriptStep::Move { x, y } => SessionCommand::Pointer(PointerEvent::moved(*x, *y)),
            ScriptStep::Up => SessionCommand::Pointer(PointerEvent::Up),
            ScriptStep::Undo => SessionCommand::Undo,
            ScriptStep::Redo => SessionCommand::Redo,
            ScriptStep::Pen { color, width } => {
                SessionCommand::SetPen(StrokeStyle::new(color.clone(), *width))
            }
            ScriptStep::WaitMs { .. } => return None,
        };
        Some(command)
    }

    pub fn delay(&self) -> Option<Duration> {
        match self {
            ScriptStep::WaitMs { ms } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> AppResult<Vec<ScriptStep>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| AppError::Script {
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let text = r#"
# a short line
{"op": "pen", "color": "red", "width": 3}
{"op": "down", "x": 0, "y": 0}
{"op": "move", "x": 5.5, "y": 1}

{"op": "up"}
{"op": "wait_ms", "ms": 20}
{"op": "undo"}
{"op": "redo"}
"#;
        let steps = parse_script(text).unwrap();
        assert_eq!(steps.len(), 7);
        assert_eq!(
            steps[0],
            ScriptStep::Pen {
                color: "red".to_string(),
                width: 3.0
            }
        );
        assert_eq!(steps[2], ScriptStep::Move { x: 5.5, y: 1.0 });
        assert_eq!(steps[4].delay(), Some(Duration::from_millis(20)));
        assert!(steps[4].command().is_none());
        assert_eq!(steps[5].command(), Some(SessionCommand::Undo));
    }

    #[test]
    fn test_bundled_demo_parses() {
        let steps = parse_script(include_str!("../../../demos/triangle.jsonl")).unwrap();
        let strokes = steps.iter().filter(|s| **s == ScriptStep::Up).count();
        assert_eq!(strokes, 4);
        assert!(steps.contains(&ScriptStep::Undo));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let text = "{\"op\": \"down\", \"x\": 0, \"y\": 0}\n{\"op\": \"scribble\"}\n";
        match parse_script(text) {
            Err(AppError::Script { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected script error, got {:?}", other),
        }
    }
}
