//! Draw list for the canvas, built from a store snapshot.
//!
//! Renderers subscribe to the [`LayoutStore`](crate::store::LayoutStore) and rebuild
//! the scene from each snapshot; nothing here holds state.

use crate::element::{ElementId, ElementKind};
use crate::store::Snapshot;
use crate::viewport::Viewport;
use kurbo::Rect;

/// One element as it should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Bounds in screen coordinates.
    pub bounds: Rect,
    /// Text to draw inside the element.
    pub caption: String,
    /// Draw the selection highlight.
    pub selected: bool,
    /// The element is larger than the canvas and spills past its edge.
    pub overflows: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Canvas area in screen coordinates.
    pub canvas: Rect,
    /// Items back to front.
    pub items: Vec<SceneItem>,
}

/// Build the scene for a snapshot.
pub fn scene(snapshot: &Snapshot<'_>, viewport: &Viewport) -> Scene {
    let transform = viewport.transform();
    let canvas_rect = Rect::from_origin_size((0.0, 0.0), snapshot.layout.canvas);

    let items = snapshot
        .layout
        .elements
        .iter()
        .map(|element| {
            let bounds = element.bounds();
            SceneItem {
                id: element.id().to_string(),
                kind: element.kind,
                bounds: transform.transform_rect_bbox(bounds),
                caption: caption(&element.label, element.kind),
                selected: snapshot.selected == Some(element.id()),
                overflows: bounds.x1 > canvas_rect.x1 || bounds.y1 > canvas_rect.y1,
            }
        })
        .collect();

    Scene {
        canvas: transform.transform_rect_bbox(canvas_rect),
        items,
    }
}

fn caption(label: &str, kind: ElementKind) -> String {
    match kind {
        ElementKind::Table { seats } => format!("{} ({})", label, seats),
        _ => label.to_string(),
    }
}
