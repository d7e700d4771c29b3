//! Drag controller: moves one element at a time under the pointer.

use crate::element::ElementId;
use crate::layout::clamp_position;
use crate::store::LayoutStore;
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer input relevant to dragging, in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Pointer pressed on an element.
    Down { element_id: ElementId, position: Point },
    Move { position: Point },
    Up,
    /// Pointer left the canvas.
    Leave,
}

/// The active drag: which element, and where it was grabbed.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The element being moved.
    pub element_id: ElementId,
    /// Vector from the element's top-left corner to the grab point.
    pub pointer_offset: Vec2,
}

/// Drives interactive repositioning.
///
/// There is a single session slot, so at most one element is dragged at a time.
/// The grab offset is captured on pointer-down and kept for the whole gesture,
/// which keeps the grab point under the cursor instead of snapping the element's
/// corner to it.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: Option<DragSession>,
    viewport: Viewport,
}

impl DragController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            session: None,
            viewport,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Update where the canvas sits on screen.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start dragging an element. Also selects it.
    ///
    /// Returns false (and stays idle) if the element does not exist. A pointer-down
    /// during an active drag replaces the session.
    pub fn on_pointer_down(&mut self, store: &mut LayoutStore, element_id: &str, screen: Point) -> bool {
        let Some(element) = store.get(element_id) else {
            log::debug!("Pointer down on unknown element {}", element_id);
            self.session = None;
            return false;
        };

        let local = self.viewport.screen_to_canvas(screen);
        let pointer_offset = local - element.position;

        store.select(element_id);
        self.session = Some(DragSession {
            element_id: element_id.to_string(),
            pointer_offset,
        });
        true
    }

    /// Move the dragged element so the grab point follows the pointer.
    ///
    /// Returns the element's new position, or `None` when idle. If the dragged element
    /// has disappeared the drag ends.
    pub fn on_pointer_move(&mut self, store: &mut LayoutStore, screen: Point) -> Option<Point> {
        let session = self.session.as_ref()?;

        let Some(element) = store.get(&session.element_id) else {
            log::debug!("Dragged element {} is gone, ending drag", session.element_id);
            self.session = None;
            return None;
        };

        let local = self.viewport.screen_to_canvas(screen);
        let candidate = local - session.pointer_offset;
        let position = clamp_position(store.canvas(), candidate, element.size);

        store.move_element(&session.element_id, position);
        Some(position)
    }

    /// End the drag. The last position stands.
    pub fn on_pointer_up(&mut self) {
        self.session = None;
    }

    /// The pointer left the canvas; end the drag so it cannot get stuck.
    pub fn on_pointer_leave(&mut self) {
        self.session = None;
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, store: &mut LayoutStore, event: PointerEvent) {
        match event {
            PointerEvent::Down { element_id, position } => {
                self.on_pointer_down(store, &element_id, position);
            }
            PointerEvent::Move { position } => {
                self.on_pointer_move(store, position);
            }
            PointerEvent::Up => self.on_pointer_up(),
            PointerEvent::Leave => self.on_pointer_leave(),
        }
    }
}
