//! Editor configuration.

use crate::layout::DEFAULT_CANVAS;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Identity and geometry the designer is constructed with.
///
/// The owning business is passed in explicitly instead of being read from session
/// state, so every component can be built and tested on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Business whose floor plans are listed and created.
    pub business_id: String,
    /// Canvas used for new plans.
    #[serde(default = "default_canvas")]
    pub canvas: Size,
}

fn default_canvas() -> Size {
    DEFAULT_CANVAS
}

impl EditorConfig {
    pub fn new(business_id: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            canvas: DEFAULT_CANVAS,
        }
    }

    pub fn with_canvas(mut self, canvas: Size) -> Self {
        self.canvas = canvas;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_defaults_when_missing() {
        let config: EditorConfig = serde_json::from_str(r#"{ "business_id": "b-1" }"#).unwrap();
        assert_eq!(config, EditorConfig::new("b-1"));
    }
}
