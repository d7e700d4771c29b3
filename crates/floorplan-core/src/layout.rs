//! Layout document: the canvas size plus the elements placed on it.

use crate::element::Element;
use crate::factory::generate_id;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Logical canvas size used by the designer.
pub const DEFAULT_CANVAS: Size = Size::new(800.0, 600.0);

/// Reasons a stored layout document could not be read as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedLayout {
    #[error("Layout has no 'canvas' object")]
    MissingCanvas,
    #[error("Layout canvas must have positive numeric width and height")]
    InvalidCanvas,
    #[error("Layout has no 'elements' array")]
    MissingElements,
}

/// The geometry of a floor plan, independent of the plan's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Elements in display order.
    pub elements: Vec<Element>,
    /// Canvas dimensions in logical units.
    pub canvas: Size,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS)
    }
}

impl Layout {
    /// Create an empty layout.
    pub fn new(canvas: Size) -> Self {
        Self {
            elements: Vec::new(),
            canvas,
        }
    }

    /// Serialize the layout to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a layout from JSON (strict).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a stored layout document.
    ///
    /// The canvas and element array must be present. Elements that don't parse are
    /// dropped with a warning; the rest is normalized.
    pub fn from_value(value: &Value) -> Result<Self, MalformedLayout> {
        let canvas = value.get("canvas").ok_or(MalformedLayout::MissingCanvas)?;
        let width = canvas.get("width").and_then(Value::as_f64);
        let height = canvas.get("height").and_then(Value::as_f64);
        let canvas = match (width, height) {
            (Some(width), Some(height)) if is_valid_canvas(Size::new(width, height)) => {
                Size::new(width, height)
            }
            _ => return Err(MalformedLayout::InvalidCanvas),
        };

        let items = value
            .get("elements")
            .and_then(Value::as_array)
            .ok_or(MalformedLayout::MissingElements)?;

        let mut layout = Self::new(canvas);
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value::<Element>(item.clone()) {
                Ok(element) => layout.elements.push(element),
                Err(e) => log::warn!("Skipping malformed layout element #{}: {}", index, e),
            }
        }

        layout.normalize();
        Ok(layout)
    }

    /// Like [`Layout::from_value`], but falls back to an empty default layout.
    pub fn from_value_or_default(value: &Value) -> Self {
        Self::from_value(value).unwrap_or_else(|e| {
            log::warn!("Malformed layout, using an empty canvas: {}", e);
            Self::default()
        })
    }

    /// Convert to a JSON value for persistence.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Restore the layout invariants: a usable canvas, well-formed elements with unique
    /// ids, and every element inside the canvas. Elements with a non-finite position or
    /// a non-positive size are dropped. Returns true if anything had to change.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if !is_valid_canvas(self.canvas) {
            log::warn!(
                "Invalid canvas {}x{}, using default",
                self.canvas.width,
                self.canvas.height
            );
            self.canvas = DEFAULT_CANVAS;
            changed = true;
        }

        let before = self.elements.len();
        self.elements.retain(|element| match element.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dropping invalid element {:?}: {}", element.id, e);
                false
            }
        });
        changed |= self.elements.len() != before;

        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &mut self.elements {
            if !seen.insert(element.id.clone()) {
                let fresh = generate_id();
                log::warn!("Duplicate element id {}, reassigned to {}", element.id, fresh);
                element.id = fresh.clone();
                seen.insert(fresh);
                changed = true;
            }

            let clamped = clamp_position(self.canvas, element.position, element.size);
            if clamped != element.position {
                element.position = clamped;
                changed = true;
            }
        }

        changed
    }

    /// Check the bounding-box invariant for one element.
    pub fn contains_element(&self, element: &Element) -> bool {
        clamp_position(self.canvas, element.position, element.size) == element.position
    }
}

fn is_valid_canvas(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

/// Clamp an element's top-left corner so the element stays on the canvas.
///
/// An element larger than the canvas on an axis is pinned to 0 on that axis and
/// overflows the far edge.
pub fn clamp_position(canvas: Size, position: Point, size: Size) -> Point {
    let max_x = (canvas.width - size.width).max(0.0);
    let max_y = (canvas.height - size.height).max(0.0);
    Point::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementType};
    use serde_json::json;

    fn element(id: &str, x: f64, y: f64) -> Element {
        Element::new(
            id,
            ElementKind::Table { seats: 4 },
            Point::new(x, y),
            ElementType::Table.default_size(),
            "Table",
        )
    }

    #[test]
    fn test_clamp_inside() {
        let p = clamp_position(DEFAULT_CANVAS, Point::new(100.0, 100.0), Size::new(80.0, 80.0));
        assert_eq!(p, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_clamp_far_edges() {
        let p = clamp_position(DEFAULT_CANVAS, Point::new(780.0, 580.0), Size::new(80.0, 80.0));
        assert_eq!(p, Point::new(720.0, 520.0));
    }

    #[test]
    fn test_clamp_negative() {
        let p = clamp_position(DEFAULT_CANVAS, Point::new(-15.0, -1.0), Size::new(80.0, 80.0));
        assert_eq!(p, Point::ZERO);
    }

    #[test]
    fn test_clamp_oversized_pins_to_origin() {
        let p = clamp_position(DEFAULT_CANVAS, Point::new(50.0, 30.0), Size::new(900.0, 40.0));
        assert_eq!(p, Point::new(0.0, 30.0));
    }

    #[test]
    fn test_from_value_missing_canvas() {
        assert_eq!(Layout::from_value(&json!({})), Err(MalformedLayout::MissingCanvas));
        assert_eq!(Layout::from_value_or_default(&json!({})), Layout::default());
    }

    #[test]
    fn test_from_value_missing_elements() {
        let value = json!({ "canvas": { "width": 800, "height": 600 } });
        assert_eq!(Layout::from_value(&value), Err(MalformedLayout::MissingElements));
    }

    #[test]
    fn test_from_value_bad_canvas() {
        let value = json!({ "canvas": { "width": 0, "height": 600 }, "elements": [] });
        assert_eq!(Layout::from_value(&value), Err(MalformedLayout::InvalidCanvas));

        let value = json!({ "canvas": "big", "elements": [] });
        assert_eq!(Layout::from_value(&value), Err(MalformedLayout::InvalidCanvas));
    }

    #[test]
    fn test_from_value_non_object() {
        assert_eq!(Layout::from_value_or_default(&Value::Null), Layout::default());
        assert_eq!(Layout::from_value_or_default(&json!([1, 2])), Layout::default());
    }

    #[test]
    fn test_from_value_skips_bad_elements() {
        let value = json!({
            "canvas": { "width": 800, "height": 600 },
            "elements": [
                { "id": "a", "type": "table", "x": 10, "y": 10, "width": 80, "height": 80 },
                { "id": "b", "type": "stage", "x": 10, "y": 10, "width": 80, "height": 80 },
                "garbage"
            ]
        });
        let layout = Layout::from_value(&value).unwrap();
        assert_eq!(layout.elements.len(), 1);
        assert_eq!(layout.elements[0].id(), "a");
    }

    #[test]
    fn test_normalize_clamps_and_dedupes() {
        let mut layout = Layout::default();
        layout.elements.push(element("dup", 790.0, 10.0));
        layout.elements.push(element("dup", 10.0, 10.0));

        assert!(layout.normalize());
        assert_eq!(layout.elements[0].position, Point::new(720.0, 10.0));
        assert_eq!(layout.elements[0].id(), "dup");
        assert_ne!(layout.elements[1].id(), "dup");
        assert!(layout.elements.iter().all(|e| layout.contains_element(e)));
    }

    #[test]
    fn test_normalize_drops_invalid_geometry() {
        let mut layout = Layout::default();
        layout.elements.push(element("ok", 10.0, 10.0));
        layout.elements.push(element("nan", f64::NAN, 10.0));
        layout.elements.push(Element::new(
            "flat",
            ElementKind::Counter,
            Point::new(10.0, 10.0),
            Size::new(-50.0, 0.0),
            "Counter",
        ));

        assert!(layout.normalize());
        assert_eq!(layout.elements.len(), 1);
        assert_eq!(layout.elements[0].id(), "ok");
    }

    #[test]
    fn test_normalize_well_formed_is_noop() {
        let mut layout = Layout::default();
        layout.elements.push(element("a", 10.0, 10.0));
        let before = layout.clone();
        assert!(!layout.normalize());
        assert_eq!(layout, before);
    }

    #[test]
    fn test_json_round_trip() {
        let mut layout = Layout::default();
        layout.elements.push(element("a", 10.0, 10.0));
        let json = layout.to_json().unwrap();
        assert_eq!(Layout::from_json(&json).unwrap(), layout);
        assert_eq!(Layout::from_value(&layout.to_value().unwrap()).unwrap(), layout);
    }

    #[test]
    fn test_wire_shape() {
        let value = Layout::default().to_value().unwrap();
        assert_eq!(value, json!({ "elements": [], "canvas": { "width": 800.0, "height": 600.0 } }));
    }
}
