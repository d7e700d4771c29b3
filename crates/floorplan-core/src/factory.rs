//! Construction of new elements with default geometry.

use crate::element::{Element, ElementKind, ElementType};
use kurbo::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Lower bound of the spawn window on each axis.
pub const SPAWN_MIN: f64 = 100.0;
/// Upper bound of the spawn window on each axis.
pub const SPAWN_MAX: f64 = 300.0;

/// Builds new elements with type defaults, a fresh id and a jittered position
/// so consecutive additions don't stack on top of each other.
#[derive(Debug, Clone)]
pub struct ElementFactory {
    rng: StdRng,
}

impl Default for ElementFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementFactory {
    /// Create a factory seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a factory with a fixed seed (reproducible positions).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a new element.
    ///
    /// `existing` is the number of elements already in the layout; the default label
    /// is the type title followed by `existing + 1`.
    pub fn create(&mut self, element_type: ElementType, existing: usize) -> Element {
        let position = Point::new(
            self.rng.random_range(SPAWN_MIN..=SPAWN_MAX),
            self.rng.random_range(SPAWN_MIN..=SPAWN_MAX),
        );

        Element::new(
            generate_id(),
            ElementKind::default_for(element_type),
            position,
            element_type.default_size(),
            format!("{} {}", element_type.title(), existing + 1),
        )
    }
}

/// Generate a new element id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
