//! Placeable furniture elements.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Element identifier, unique within a layout.
pub type ElementId = String;

/// Number of seats a freshly placed table gets.
pub const DEFAULT_SEATS: u32 = 4;

/// Errors raised when an incoming element record cannot become an [`Element`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementParseError {
    #[error("Unknown element type: {0}")]
    UnknownType(String),
    #[error("Element id is empty")]
    EmptyId,
    #[error("Element size must be positive, got {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Element position is not a finite number")]
    InvalidPosition,
}

/// The kind of furniture without any per-kind data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Table,
    Bar,
    Counter,
}

impl ElementType {
    /// All element types, in palette order.
    pub const ALL: [ElementType; 3] = [ElementType::Table, ElementType::Bar, ElementType::Counter];

    /// Default footprint for a new element of this type.
    pub fn default_size(self) -> Size {
        match self {
            ElementType::Table => Size::new(80.0, 80.0),
            ElementType::Bar => Size::new(200.0, 40.0),
            ElementType::Counter => Size::new(120.0, 80.0),
        }
    }

    /// Wire name (`"table"`, `"bar"`, `"counter"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Table => "table",
            ElementType::Bar => "bar",
            ElementType::Counter => "counter",
        }
    }

    /// Display name used in default labels.
    pub fn title(self) -> &'static str {
        match self {
            ElementType::Table => "Table",
            ElementType::Bar => "Bar",
            ElementType::Counter => "Counter",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ElementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(ElementType::Table),
            "bar" => Ok(ElementType::Bar),
            "counter" => Ok(ElementType::Counter),
            other => Err(ElementParseError::UnknownType(other.to_string())),
        }
    }
}

/// Element kind together with the data only that kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Table { seats: u32 },
    Bar,
    Counter,
}

impl ElementKind {
    /// Default kind data for a type.
    pub fn default_for(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Table => ElementKind::Table { seats: DEFAULT_SEATS },
            ElementType::Bar => ElementKind::Bar,
            ElementType::Counter => ElementKind::Counter,
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Table { .. } => ElementType::Table,
            ElementKind::Bar => ElementType::Bar,
            ElementKind::Counter => ElementType::Counter,
        }
    }

    /// Seat count, only tables have one.
    pub fn seats(&self) -> Option<u32> {
        match self {
            ElementKind::Table { seats } => Some(*seats),
            _ => None,
        }
    }
}

/// One placeable unit on the canvas.
///
/// Serialized as the flat record `{id, type, x, y, width, height, seats?, label?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ElementRecord", try_from = "ElementRecord")]
pub struct Element {
    pub(crate) id: ElementId,
    /// Kind and kind-specific data.
    pub kind: ElementKind,
    /// Top-left corner in canvas units.
    pub position: Point,
    /// Footprint in canvas units.
    pub size: Size,
    /// User-visible label.
    pub label: String,
}

impl Element {
    /// Build an element with an explicit id (used when loading stored layouts).
    pub fn new(
        id: impl Into<ElementId>,
        kind: ElementKind,
        position: Point,
        size: Size,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            size,
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn seats(&self) -> Option<u32> {
        self.kind.seats()
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Check if a canvas point falls inside the element.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Merge a patch into this element.
    /// Returns true if anything changed.
    ///
    /// Non-finite positions and non-positive sizes are ignored, as are seats on anything
    /// but a table. Bounds are the caller's business.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let mut changed = false;

        if let Some(position) = patch.position {
            if position.is_finite() && position != self.position {
                self.position = position;
                changed = true;
            }
        }

        if let Some(size) = patch.size {
            if is_valid_size(size) && size != self.size {
                self.size = size;
                changed = true;
            }
        }

        if let Some(new_seats) = patch.seats {
            match &mut self.kind {
                ElementKind::Table { seats } => {
                    if *seats != new_seats {
                        *seats = new_seats;
                        changed = true;
                    }
                }
                other => log::debug!("Ignoring seats on {} element {}", other.element_type(), self.id),
            }
        }

        if let Some(label) = &patch.label {
            if *label != self.label {
                self.label = label.clone();
                changed = true;
            }
        }

        changed
    }
}

impl Element {
    /// Check the fields a layout cannot hold: an empty id, a non-finite position,
    /// or a size that is not positive and finite.
    pub fn validate(&self) -> Result<(), ElementParseError> {
        if self.id.trim().is_empty() {
            return Err(ElementParseError::EmptyId);
        }
        if !self.position.is_finite() {
            return Err(ElementParseError::InvalidPosition);
        }
        if !is_valid_size(self.size) {
            return Err(ElementParseError::InvalidSize {
                width: self.size.width,
                height: self.size.height,
            });
        }
        Ok(())
    }
}

fn is_valid_size(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

/// Partial update for an element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub seats: Option<u32>,
    pub label: Option<String>,
}

impl ElementPatch {
    /// A patch that only moves the element.
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats = Some(seats);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.size.is_none() && self.seats.is_none() && self.label.is_none()
    }
}

/// Flat wire form of an element as stored in the layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<Element> for ElementRecord {
    fn from(element: Element) -> Self {
        Self {
            id: element.id,
            element_type: element.kind.element_type().as_str().to_string(),
            x: element.position.x,
            y: element.position.y,
            width: element.size.width,
            height: element.size.height,
            seats: element.kind.seats(),
            label: (!element.label.is_empty()).then_some(element.label),
        }
    }
}

impl TryFrom<ElementRecord> for Element {
    type Error = ElementParseError;

    fn try_from(record: ElementRecord) -> Result<Self, Self::Error> {
        let element_type: ElementType = record.element_type.parse()?;
        let position = Point::new(record.x, record.y);
        let size = Size::new(record.width, record.height);

        let kind = match element_type {
            ElementType::Table => ElementKind::Table {
                seats: record.seats.unwrap_or(DEFAULT_SEATS),
            },
            ElementType::Bar => ElementKind::Bar,
            ElementType::Counter => ElementKind::Counter,
        };

        let element = Self {
            id: record.id,
            kind,
            position,
            size,
            label: record.label.unwrap_or_default(),
        };
        element.validate()?;
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> Element {
        Element::new(
            "t1",
            ElementKind::Table { seats: 4 },
            Point::new(10.0, 20.0),
            Size::new(80.0, 80.0),
            "Table 1",
        )
    }

    #[test]
    fn test_default_sizes() {
        assert_eq!(ElementType::Table.default_size(), Size::new(80.0, 80.0));
        assert_eq!(ElementType::Bar.default_size(), Size::new(200.0, 40.0));
        assert_eq!(ElementType::Counter.default_size(), Size::new(120.0, 80.0));
    }

    #[test]
    fn test_parse_element_type() {
        assert_eq!("table".parse::<ElementType>().unwrap(), ElementType::Table);
        assert_eq!(" Counter ".parse::<ElementType>().unwrap(), ElementType::Counter);
        assert!(matches!(
            "booth".parse::<ElementType>(),
            Err(ElementParseError::UnknownType(_))
        ));
    }

    #[test]
    fn test_serializes_flat_record() {
        let value = serde_json::to_value(table()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "t1",
                "type": "table",
                "x": 10.0,
                "y": 20.0,
                "width": 80.0,
                "height": 80.0,
                "seats": 4,
                "label": "Table 1"
            })
        );
    }

    #[test]
    fn test_bar_never_carries_seats() {
        let value = json!({
            "id": "b1", "type": "bar", "x": 0, "y": 0, "width": 200, "height": 40, "seats": 6
        });
        let bar: Element = serde_json::from_value(value).unwrap();
        assert_eq!(bar.kind, ElementKind::Bar);
        assert_eq!(bar.seats(), None);

        let out = serde_json::to_value(&bar).unwrap();
        assert!(out.get("seats").is_none());
    }

    #[test]
    fn test_table_without_seats_gets_default() {
        let value = json!({ "id": "t", "type": "table", "x": 1, "y": 2, "width": 80, "height": 80 });
        let element: Element = serde_json::from_value(value).unwrap();
        assert_eq!(element.seats(), Some(DEFAULT_SEATS));
        assert_eq!(element.label, "");
    }

    #[test]
    fn test_rejects_bad_records() {
        let unknown = json!({ "id": "x", "type": "sofa", "x": 0, "y": 0, "width": 1, "height": 1 });
        assert!(serde_json::from_value::<Element>(unknown).is_err());

        let flat = json!({ "id": "x", "type": "bar", "x": 0, "y": 0, "width": 0, "height": 40 });
        assert!(serde_json::from_value::<Element>(flat).is_err());

        let anonymous = json!({ "id": "", "type": "bar", "x": 0, "y": 0, "width": 10, "height": 40 });
        assert!(serde_json::from_value::<Element>(anonymous).is_err());
    }

    #[test]
    fn test_apply_empty_patch_is_noop() {
        let mut element = table();
        let before = element.clone();
        assert!(!element.apply(&ElementPatch::default()));
        assert_eq!(element, before);
    }

    #[test]
    fn test_apply_patch() {
        let mut element = table();
        let patch = ElementPatch::position(Point::new(5.0, 5.0))
            .with_seats(6)
            .with_label("Window");
        assert!(element.apply(&patch));
        assert_eq!(element.position, Point::new(5.0, 5.0));
        assert_eq!(element.seats(), Some(6));
        assert_eq!(element.label, "Window");
    }

    #[test]
    fn test_apply_ignores_invalid_fields() {
        let mut counter = Element::new(
            "c",
            ElementKind::Counter,
            Point::new(0.0, 0.0),
            Size::new(120.0, 80.0),
            "Counter 1",
        );
        let patch = ElementPatch::default()
            .with_size(Size::new(-1.0, 10.0))
            .with_seats(8);
        assert!(!counter.apply(&patch));
        assert_eq!(counter.size, Size::new(120.0, 80.0));
        assert_eq!(counter.kind, ElementKind::Counter);
    }

    #[test]
    fn test_contains() {
        let element = table();
        assert!(element.contains(Point::new(50.0, 50.0)));
        assert!(!element.contains(Point::new(95.0, 50.0)));
    }
}
