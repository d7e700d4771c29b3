//! Layout store: the in-memory source of truth for the plan being edited.

use crate::element::{Element, ElementId, ElementPatch, ElementType};
use crate::factory::{ElementFactory, generate_id};
use crate::layout::{Layout, clamp_position};
use kurbo::{Point, Size};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Read-only view handed to subscribers after every mutation.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub layout: &'a Layout,
    pub selected: Option<&'a str>,
}

/// Handle returned by [`LayoutStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&Snapshot<'_>)>;

/// Holds the elements and canvas of the current plan plus the selection.
///
/// Every public mutation keeps the layout invariants (elements inside the canvas,
/// unique ids) and notifies subscribers when something actually changed.
pub struct LayoutStore {
    layout: Layout,
    /// Element id -> index into `layout.elements`.
    index: HashMap<ElementId, usize>,
    selected: Option<ElementId>,
    factory: ElementFactory,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("layout", &self.layout)
            .field("selected", &self.selected)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl LayoutStore {
    /// Create an empty store with the default canvas.
    pub fn new() -> Self {
        Self::with_factory(Layout::default().canvas, ElementFactory::new())
    }

    /// Create an empty store with the given canvas and element factory.
    pub fn with_factory(canvas: Size, factory: ElementFactory) -> Self {
        let mut layout = Layout::new(canvas);
        layout.normalize();
        Self {
            layout,
            index: HashMap::new(),
            selected: None,
            factory,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn canvas(&self) -> Size {
        self.layout.canvas
    }

    /// Elements in display order.
    pub fn elements(&self) -> &[Element] {
        &self.layout.elements
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|&i| &self.layout.elements[i])
    }

    pub fn len(&self) -> usize {
        self.layout.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.elements.is_empty()
    }

    /// Current state for renderers and subscribers.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            layout: &self.layout,
            selected: self.selected.as_deref(),
        }
    }

    /// Add a new element of the given type. Returns its id.
    pub fn add_element(&mut self, element_type: ElementType) -> ElementId {
        let mut element = self.factory.create(element_type, self.layout.elements.len());
        while self.index.contains_key(&element.id) {
            element.id = generate_id();
        }
        element.position = clamp_position(self.layout.canvas, element.position, element.size);

        let id = element.id.clone();
        log::debug!("Added {} {} at {:?}", element_type, id, element.position);
        self.index.insert(id.clone(), self.layout.elements.len());
        self.layout.elements.push(element);
        self.notify();
        id
    }

    /// Remove an element. Unknown ids are ignored.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let position = self.index.remove(id)?;
        let removed = self.layout.elements.remove(position);
        self.reindex();

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }

        log::debug!("Removed element {}", id);
        self.notify();
        Some(removed)
    }

    /// Merge a patch into an element. Unknown ids are ignored.
    ///
    /// The position is clamped back onto the canvas after the merge.
    /// Returns true if the element changed.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> bool {
        let Some(&position) = self.index.get(id) else {
            log::debug!("Update for unknown element {} ignored", id);
            return false;
        };

        let canvas = self.layout.canvas;
        let element = &mut self.layout.elements[position];
        let before = element.clone();

        element.apply(patch);
        element.position = clamp_position(canvas, element.position, element.size);

        let changed = *element != before;
        if changed {
            self.notify();
        }
        changed
    }

    /// Move an element, clamped to the canvas.
    pub fn move_element(&mut self, id: &str, position: Point) -> bool {
        self.update_element(id, &ElementPatch::position(position))
    }

    /// Replace the whole layout. Clears the selection.
    pub fn load(&mut self, mut layout: Layout) {
        layout.normalize();
        self.layout = layout;
        self.selected = None;
        self.reindex();
        log::debug!("Loaded layout with {} elements", self.layout.elements.len());
        self.notify();
    }

    /// Load a stored layout document, falling back to an empty default canvas if the
    /// document is malformed.
    pub fn load_value(&mut self, value: &Value) {
        self.load(Layout::from_value_or_default(value));
    }

    /// Load a layout from JSON text with the same fallback as [`LayoutStore::load_value`].
    pub fn load_json(&mut self, json: &str) {
        let value = serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Layout JSON does not parse: {}", e);
            Value::Null
        });
        self.load_value(&value);
    }

    /// Copy of the layout for persistence.
    pub fn serialize(&self) -> Layout {
        self.layout.clone()
    }

    /// Select an element. Returns false for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.index.contains_key(id) {
            return false;
        }
        if self.selected.as_deref() != Some(id) {
            self.selected = Some(id.to_string());
            self.notify();
        }
        true
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.notify();
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Front-most element under a canvas point.
    pub fn element_at(&self, point: Point) -> Option<&Element> {
        self.layout.elements.iter().rev().find(|e| e.contains(point))
    }

    /// Register a listener called with the latest snapshot after every mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&Snapshot<'_>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for (_, listener) in &self.listeners {
            listener(&snapshot);
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .layout
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::layout::DEFAULT_CANVAS;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn store() -> LayoutStore {
        LayoutStore::with_factory(DEFAULT_CANVAS, ElementFactory::seeded(3))
    }

    fn assert_in_bounds(store: &LayoutStore) {
        let canvas = store.canvas();
        for e in store.elements() {
            assert!(e.position.x >= 0.0 && e.position.y >= 0.0, "{:?}", e);
            if e.size.width <= canvas.width {
                assert!(e.position.x + e.size.width <= canvas.width, "{:?}", e);
            } else {
                assert_eq!(e.position.x, 0.0);
            }
            if e.size.height <= canvas.height {
                assert!(e.position.y + e.size.height <= canvas.height, "{:?}", e);
            } else {
                assert_eq!(e.position.y, 0.0);
            }
        }
    }

    #[test]
    fn test_add_table() {
        let mut store = store();
        let id = store.add_element(ElementType::Table);
        let table = store.get(&id).unwrap();

        assert_eq!(table.size, Size::new(80.0, 80.0));
        assert_eq!(table.seats(), Some(4));
        assert_eq!(table.label, "Table 1");
        assert!((100.0..=300.0).contains(&table.position.x));
        assert!((100.0..=300.0).contains(&table.position.y));
    }

    #[test]
    fn test_labels_count_all_elements() {
        let mut store = store();
        store.add_element(ElementType::Table);
        let bar = store.add_element(ElementType::Bar);
        assert_eq!(store.get(&bar).unwrap().label, "Bar 2");
    }

    #[test]
    fn test_back_to_back_adds_have_distinct_ids() {
        let mut store = store();
        let a = store.add_element(ElementType::Table);
        let b = store.add_element(ElementType::Table);
        assert_ne!(a, b);

        let ids: HashSet<_> = store.elements().iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_add_on_small_canvas_stays_in_bounds() {
        let mut store = LayoutStore::with_factory(Size::new(150.0, 120.0), ElementFactory::seeded(5));
        for ty in ElementType::ALL {
            store.add_element(ty);
        }
        assert_in_bounds(&store);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = store();
        store.add_element(ElementType::Counter);
        let before = store.serialize();

        assert!(store.remove_element("missing-id").is_none());
        assert_eq!(store.serialize(), before);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = store();
        let a = store.add_element(ElementType::Table);
        let b = store.add_element(ElementType::Bar);
        store.select(&a);

        assert!(store.remove_element(&a).is_some());
        assert_eq!(store.selected(), None);
        assert_eq!(store.len(), 1);
        // Index still resolves the remaining element.
        assert_eq!(store.get(&b).unwrap().element_type(), ElementType::Bar);
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let mut store = store();
        let a = store.add_element(ElementType::Table);
        let b = store.add_element(ElementType::Bar);
        store.select(&a);
        store.remove_element(&b);
        assert_eq!(store.selected(), Some(a.as_str()));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut store = store();
        assert!(!store.update_element("nope", &ElementPatch::default().with_label("x")));
    }

    #[test]
    fn test_empty_update_is_idempotent() {
        let mut store = store();
        let id = store.add_element(ElementType::Table);
        let before = store.get(&id).cloned();
        assert!(!store.update_element(&id, &ElementPatch::default()));
        assert_eq!(store.get(&id).cloned(), before);
    }

    #[test]
    fn test_update_clamps_position() {
        let mut store = store();
        let id = store.add_element(ElementType::Bar);
        store.move_element(&id, Point::new(1000.0, -50.0));
        assert_eq!(store.get(&id).unwrap().position, Point::new(600.0, 0.0));
        assert_in_bounds(&store);
    }

    #[test]
    fn test_resize_reclamps_position() {
        let mut store = store();
        let id = store.add_element(ElementType::Table);
        store.move_element(&id, Point::new(700.0, 500.0));
        store.update_element(&id, &ElementPatch::default().with_size(Size::new(200.0, 200.0)));

        let table = store.get(&id).unwrap();
        assert_eq!(table.position, Point::new(600.0, 400.0));
        assert_in_bounds(&store);
    }

    #[test]
    fn test_load_missing_canvas_falls_back() {
        let mut store = store();
        store.add_element(ElementType::Table);
        store.load_value(&json!({}));

        assert!(store.is_empty());
        assert_eq!(store.canvas(), DEFAULT_CANVAS);
    }

    #[test]
    fn test_load_json_garbage_falls_back() {
        let mut store = store();
        store.load_json("{not json");
        assert_eq!(store.serialize(), Layout::default());
    }

    #[test]
    fn test_round_trip() {
        let mut layout = Layout::new(Size::new(1024.0, 768.0));
        layout.elements.push(Element::new(
            "t-1",
            ElementKind::Table { seats: 6 },
            Point::new(12.0, 40.0),
            Size::new(80.0, 80.0),
            "Window",
        ));
        layout.elements.push(Element::new(
            "b-1",
            ElementKind::Bar,
            Point::new(300.0, 500.0),
            Size::new(200.0, 40.0),
            "",
        ));

        let mut store = store();
        store.load(layout.clone());
        assert_eq!(store.serialize(), layout);
    }

    #[test]
    fn test_load_clamps_and_clears_selection() {
        let mut store = store();
        let id = store.add_element(ElementType::Table);
        store.select(&id);

        store.load_value(&json!({
            "canvas": { "width": 800, "height": 600 },
            "elements": [
                { "id": "x", "type": "counter", "x": 790, "y": 590, "width": 120, "height": 80 }
            ]
        }));

        assert_eq!(store.selected(), None);
        assert_eq!(store.get("x").unwrap().position, Point::new(680.0, 520.0));
    }

    #[test]
    fn test_load_drops_invalid_elements() {
        let mut layout = Layout::default();
        layout.elements.push(Element::new(
            "nan",
            ElementKind::Bar,
            Point::new(f64::NAN, 10.0),
            Size::new(200.0, 40.0),
            "Bar 1",
        ));
        layout.elements.push(Element::new(
            "neg",
            ElementKind::Counter,
            Point::new(10.0, 10.0),
            Size::new(-50.0, 0.0),
            "Counter 2",
        ));
        layout.elements.push(Element::new(
            "t",
            ElementKind::Table { seats: 2 },
            Point::new(10.0, 10.0),
            Size::new(80.0, 80.0),
            "Table 3",
        ));

        let mut store = store();
        store.load(layout);
        assert_eq!(store.len(), 1);
        assert!(store.get("nan").is_none());
        assert!(store.get("neg").is_none());
        assert_in_bounds(&store);

        // Whatever was kept survives a save and reload.
        let saved = store.serialize().to_value().unwrap();
        let mut reloaded = LayoutStore::new();
        reloaded.load_value(&saved);
        assert_eq!(reloaded.serialize(), store.serialize());
    }

    #[test]
    fn test_select_unknown() {
        let mut store = store();
        assert!(!store.select("ghost"));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_element_at_prefers_front() {
        let mut store = store();
        let a = store.add_element(ElementType::Table);
        let b = store.add_element(ElementType::Table);
        store.move_element(&a, Point::new(10.0, 10.0));
        store.move_element(&b, Point::new(50.0, 50.0));

        assert_eq!(store.element_at(Point::new(60.0, 60.0)).unwrap().id(), b);
        assert_eq!(store.element_at(Point::new(20.0, 20.0)).unwrap().id(), a);
        assert!(store.element_at(Point::new(500.0, 20.0)).is_none());
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |snapshot| {
            sink.borrow_mut().push(snapshot.layout.elements.len());
        });

        let id = store.add_element(ElementType::Table);
        store.update_element(&id, &ElementPatch::default()); // no-op, no notification
        store.remove_element("missing");                     // no-op, no notification
        store.remove_element(&id);

        assert_eq!(*seen.borrow(), vec![1, 0]);

        assert!(store.unsubscribe(sub));
        store.add_element(ElementType::Bar);
        assert_eq!(seen.borrow().len(), 2);
        assert!(!store.unsubscribe(sub));
    }

    #[test]
    fn test_subscribers_see_selection() {
        let mut store = store();
        let id = store.add_element(ElementType::Table);

        let selected = Rc::new(RefCell::new(None));
        let sink = selected.clone();
        store.subscribe(move |snapshot| {
            *sink.borrow_mut() = snapshot.selected.map(str::to_string);
        });

        store.select(&id);
        assert_eq!(selected.borrow().as_deref(), Some(id.as_str()));
        store.clear_selection();
        assert_eq!(*selected.borrow(), None);
    }
}
