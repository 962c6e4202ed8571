// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The figure capability trait and the state every figure shares.
//!
//! Concrete figures embed a [`FigureCore`] (attributes, flags, layer, the
//! change bracket, listeners) and implement the geometry/drawing methods of
//! [`Figure`]. Composite and decorated figures hold child figures in plain
//! delegation fields; there is no inheritance hierarchy to mirror.
//!
//! # The change bracket
//!
//! Every mutation is wrapped in `will_change()` … `changed()`. The bracket
//! is reentrant: only the outermost `changed()` commits, firing a single
//! [`FigureEvent::Changed`] that carries the union of the drawing areas
//! before and after the whole bracket. Calling `changed()` while no bracket
//! is open is a caller bug and panics.

use alloc::boxed::Box;
use bitflags::bitflags;
use core::any::Any;
use core::fmt::Debug;
use kurbo::{Affine, Point, Rect};

use crate::attr::{AttributeKey, AttributeStore, AttributeValue};
use crate::event::{FigureEvent, ListenerId, Listeners};
use crate::renderer::Renderer;

bitflags! {
    /// Figure flags controlling visibility and tool interaction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FigureFlags: u8 {
        /// Figure is drawn and hit-testable.
        const VISIBLE       = 0b0000_0001;
        /// Tools may apply geometric transforms.
        const TRANSFORMABLE = 0b0000_0010;
    }
}

impl Default for FigureFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::TRANSFORMABLE
    }
}

/// The outcome of a committed change bracket.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FigureChange {
    /// Union of the drawing areas before and after the bracket.
    pub invalidated: Rect,
}

/// State shared by every figure kind.
#[derive(Debug)]
pub struct FigureCore {
    attrs: AttributeStore,
    flags: FigureFlags,
    layer: i32,
    changing_depth: u32,
    change_before: Option<Rect>,
    listeners: Listeners<FigureEvent>,
}

impl Default for FigureCore {
    fn default() -> Self {
        Self::new()
    }
}

impl FigureCore {
    /// Fresh core: default attributes and flags, layer 0, no listeners.
    pub fn new() -> Self {
        Self {
            attrs: AttributeStore::new(),
            flags: FigureFlags::default(),
            layer: 0,
            changing_depth: 0,
            change_before: None,
            listeners: Listeners::new(),
        }
    }

    /// The figure's attributes.
    pub fn attrs(&self) -> &AttributeStore {
        &self.attrs
    }

    /// Mutable attribute access. Wrap bounds-affecting sets (stroke width and
    /// the like) in the figure's change bracket so caches get invalidated.
    pub fn attrs_mut(&mut self) -> &mut AttributeStore {
        &mut self.attrs
    }

    /// Set an attribute and fire [`FigureEvent::AttributeChanged`] (even for
    /// a no-op set).
    pub fn set_attr<T: AttributeValue>(&mut self, key: &AttributeKey<T>, value: T) {
        let old = self.attrs.get(key).into_value();
        self.attrs.set(key, value);
        self.listeners.emit(&FigureEvent::AttributeChanged {
            key: key.id,
            old,
            new: value.into_value(),
        });
    }

    /// Z-order rank among siblings. An arbitrary orderable integer; sort
    /// order is its only meaning.
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Set the z-order rank. Wrap in the change bracket when the figure is
    /// part of a drawing so stacking gets re-evaluated.
    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    /// Current flags.
    pub fn flags(&self) -> FigureFlags {
        self.flags
    }

    /// Replace the flags.
    pub fn set_flags(&mut self, flags: FigureFlags) {
        self.flags = flags;
    }

    /// Register a listener for this figure's events.
    pub fn subscribe(&mut self, callback: impl FnMut(&FigureEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// True while a change bracket is open.
    pub fn is_changing(&self) -> bool {
        self.changing_depth != 0
    }

    /// Open (or nest into) a change bracket. `current_area` is the drawing
    /// area before the mutation; it is only captured for the outermost call.
    pub fn begin_change(&mut self, current_area: Rect) {
        if self.changing_depth == 0 {
            self.change_before = Some(current_area);
        }
        self.changing_depth += 1;
    }

    /// Close a change bracket. Commits and notifies only when the outermost
    /// bracket closes; nested closes return `None`.
    ///
    /// # Panics
    ///
    /// Panics when no bracket is open — that is a caller bug, not a
    /// recoverable condition.
    pub fn finish_change(&mut self, current_area: Rect) -> Option<FigureChange> {
        assert!(
            self.changing_depth > 0,
            "changed() called without a matching will_change()"
        );
        self.changing_depth -= 1;
        if self.changing_depth > 0 {
            return None;
        }
        let before = self.change_before.take().unwrap_or(current_area);
        let invalidated = before.union(current_area);
        self.listeners.emit(&FigureEvent::Changed { invalidated });
        Some(FigureChange { invalidated })
    }
}

impl Clone for FigureCore {
    /// Deep-copies attributes and flags. Listener registrations are *not*
    /// copied and any open bracket is discarded — a clone starts clean.
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            flags: self.flags,
            layer: self.layer,
            changing_depth: 0,
            change_before: None,
            listeners: Listeners::new(),
        }
    }
}

/// A drawable scene-graph node.
///
/// Object-safe by design: drawings store `Box<dyn Figure>`. Typed attribute
/// access goes through [`FigureCore`] (`core()`/`core_mut()`), and tools can
/// reach a concrete variant via `as_any`/`as_any_mut`.
pub trait Figure: Debug {
    /// Shared figure state.
    fn core(&self) -> &FigureCore;

    /// Shared figure state, mutably.
    fn core_mut(&mut self) -> &mut FigureCore;

    /// Tight geometric bounds in drawing coordinates.
    fn bounds(&self) -> Rect;

    /// Reshape to the box spanned by `anchor` and `lead`.
    fn set_bounds(&mut self, anchor: Point, lead: Point);

    /// The region that must be repainted to show this figure — bounds plus
    /// stroke growth, decorations, and similar embellishments. Always ≥
    /// [`bounds`](Self::bounds). `scale_factor` lets figures bound
    /// screen-constant embellishments; plain shapes ignore it.
    fn drawing_area_scaled(&self, scale_factor: f64) -> Rect;

    /// Precise geometric hit test. `scale_denominator` is the current view
    /// scale; thin figures widen their tolerance by its inverse so hits stay
    /// constant in screen pixels.
    fn contains_point(&self, point: Point, scale_denominator: f64) -> bool;

    /// Apply an affine transform in place.
    fn transform(&mut self, affine: Affine);

    /// Emit drawing primitives for this figure.
    fn draw(&self, renderer: &mut dyn Renderer);

    /// Deep copy. Owned sub-objects (attributes, children, decorator) are
    /// copied; listener registrations are not.
    fn clone_figure(&self) -> Box<dyn Figure>;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Downcast support, mutable.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The region to repaint at scale 1.
    fn drawing_area(&self) -> Rect {
        self.drawing_area_scaled(1.0)
    }

    /// Whether this figure is drawn and hit-testable.
    fn is_visible(&self) -> bool {
        self.core().flags().contains(FigureFlags::VISIBLE)
    }

    /// Whether tools may transform this figure.
    fn is_transformable(&self) -> bool {
        self.core().flags().contains(FigureFlags::TRANSFORMABLE)
    }

    /// Z-order rank among siblings.
    fn layer(&self) -> i32 {
        self.core().layer()
    }

    /// Open a change bracket around a mutation. Reentrant.
    fn will_change(&mut self) {
        let area = self.drawing_area();
        self.core_mut().begin_change(area);
    }

    /// Close a change bracket. Only the outermost close commits, fires the
    /// figure's `Changed` event, and reports the invalidated region.
    ///
    /// # Panics
    ///
    /// Panics when called without a matching [`will_change`](Self::will_change).
    fn changed(&mut self) -> Option<FigureChange> {
        let area = self.drawing_area();
        self.core_mut().finish_change(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal figure exercising only the core machinery.
    #[derive(Debug, Clone)]
    struct Square {
        core: FigureCore,
        bounds: Rect,
    }

    impl Square {
        fn new(bounds: Rect) -> Self {
            Self {
                core: FigureCore::new(),
                bounds,
            }
        }
    }

    impl Figure for Square {
        fn core(&self) -> &FigureCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut FigureCore {
            &mut self.core
        }

        fn bounds(&self) -> Rect {
            self.bounds
        }

        fn set_bounds(&mut self, anchor: Point, lead: Point) {
            self.bounds = Rect::from_points(anchor, lead);
        }

        fn drawing_area_scaled(&self, _scale_factor: f64) -> Rect {
            self.bounds
        }

        fn contains_point(&self, point: Point, _scale_denominator: f64) -> bool {
            self.bounds.contains(point)
        }

        fn transform(&mut self, affine: Affine) {
            self.bounds = crate::types::transform_rect_bbox(affine, self.bounds);
        }

        fn draw(&self, _renderer: &mut dyn Renderer) {}

        fn clone_figure(&self) -> alloc::boxed::Box<dyn Figure> {
            alloc::boxed::Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn nested_brackets_commit_once_with_the_union() {
        use alloc::rc::Rc;
        use core::cell::RefCell;

        let events: Rc<RefCell<alloc::vec::Vec<FigureEvent>>> = Rc::default();
        let mut square = Square::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let sink = events.clone();
        square.core_mut().subscribe(move |e| sink.borrow_mut().push(e.clone()));

        square.will_change();
        square.will_change(); // nested
        square.set_bounds(Point::new(20.0, 20.0), Point::new(30.0, 30.0));
        assert_eq!(square.changed(), None, "inner close does not commit");
        let change = square.changed().expect("outer close commits");

        assert_eq!(change.invalidated, Rect::new(0.0, 0.0, 30.0, 30.0));
        let events = events.borrow();
        assert_eq!(events.len(), 1, "one coalesced event");
        assert_eq!(
            events[0],
            FigureEvent::Changed {
                invalidated: Rect::new(0.0, 0.0, 30.0, 30.0)
            }
        );
    }

    #[test]
    #[should_panic(expected = "without a matching will_change")]
    fn unbalanced_changed_is_fatal() {
        let mut square = Square::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        let _ = square.changed();
    }

    #[test]
    fn clones_start_without_listeners() {
        let mut square = Square::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        square.core_mut().subscribe(|_| {});
        let copy = square.clone_figure();
        assert!(square.core().listeners.len() == 1);
        assert!(copy.core().listeners.is_empty(), "no event cross-talk");
    }

    #[test]
    fn attribute_set_fires_attribute_event() {
        use crate::attr::{STROKE_WIDTH, Value};
        use alloc::rc::Rc;
        use core::cell::RefCell;

        let events: Rc<RefCell<alloc::vec::Vec<FigureEvent>>> = Rc::default();
        let mut square = Square::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        let sink = events.clone();
        square.core_mut().subscribe(move |e| sink.borrow_mut().push(e.clone()));

        square.core_mut().set_attr(&STROKE_WIDTH, 2.5);
        let events = events.borrow();
        assert_eq!(
            events[0],
            FigureEvent::AttributeChanged {
                key: "stroke-width",
                old: Value::Scalar(1.0),
                new: Value::Scalar(2.5),
            }
        );
    }
}
