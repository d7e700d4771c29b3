//! Mapping between screen coordinates and canvas-local coordinates.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Where the canvas sits on screen.
///
/// Pointer events arrive in screen coordinates; every element position is stored in
/// canvas-local units with the canvas top-left at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen position of the canvas top-left corner.
    pub origin: Vec2,
}

impl Viewport {
    /// Create a viewport with the canvas at the given screen position.
    pub fn new(origin: Point) -> Self {
        Self {
            origin: origin.to_vec2(),
        }
    }

    /// Move the canvas on screen (layout change, scroll).
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin.to_vec2();
    }

    /// Canvas-local to screen transform, for renderers.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        screen_point - self.origin
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        canvas_point + self.origin
    }
}
