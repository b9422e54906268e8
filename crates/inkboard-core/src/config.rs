//! Session configuration.

use crate::stroke::StrokeStyle;
use std::time::Duration;

/// Store key holding the whiteboard document.
pub const DEFAULT_DOCUMENT_KEY: &str = "inkboard.whiteboard";

/// Default reconciliation interval in milliseconds.
pub const DEFAULT_RECONCILE_INTERVAL_MS: u64 = 1000;

/// Settings for one whiteboard session.
#[derive(Debug, Clone)]
pub struct WhiteboardConfig {
    /// Key the snapshot is saved under. Every participant must agree on it.
    pub document_key: String,
    /// How often the store is polled for remote changes.
    pub reconcile_interval: Duration,
    /// Style for new strokes.
    pub pen: StrokeStyle,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
            reconcile_interval: Duration::from_millis(DEFAULT_RECONCILE_INTERVAL_MS),
            pen: StrokeStyle::default(),
        }
    }
}

impl WhiteboardConfig {
    pub fn with_document_key(mut self, key: impl Into<String>) -> Self {
        self.document_key = key.into();
        self
    }

    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    pub fn with_pen(mut self, pen: StrokeStyle) -> Self {
        self.pen = pen;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WhiteboardConfig::default();
        assert_eq!(config.document_key, DEFAULT_DOCUMENT_KEY);
        assert_eq!(config.reconcile_interval, Duration::from_secs(1));
        assert_eq!(config.pen, StrokeStyle::default());
    }

    #[test]
    fn test_builder() {
        let config = WhiteboardConfig::default()
            .with_document_key("team.board")
            .with_reconcile_interval(Duration::from_millis(250))
            .with_pen(StrokeStyle::new("#336699", 5.0));
        assert_eq!(config.document_key, "team.board");
        assert_eq!(config.reconcile_interval, Duration::from_millis(250));
        assert_eq!(config.pen.width, 5.0);
    }
}
