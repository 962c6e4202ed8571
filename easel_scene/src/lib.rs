// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=easel_scene --heading-base-level=0

//! Easel Scene: a kurbo-native figure scene graph for 2D drawing editors.
//!
//! Easel Scene is the document core of a structured drawing editor: a
//! mutable, ordered collection of figures with typed attributes, z-order,
//! quadtree-accelerated hit testing, and a change-notification protocol that
//! keeps cached bounds and repaint regions consistent while tools mutate the
//! scene.
//!
//! - [`Figure`](figure::Figure): the capability trait for drawable nodes —
//!   geometry, attributes, hit test, draw, clone. Concrete variants live in
//!   [`figures`]; composites and decorators delegate to owned children.
//! - [`Drawing`](drawing::Drawing): the container. Owns the figures, the
//!   spatial index, the stacking order, and the listener registries.
//! - [`AttributeStore`](attr::AttributeStore): typed key/value attributes
//!   with total reads (defaults) and fire-always change callbacks.
//! - [`Listeners`](event::Listeners): subscription handles with explicit
//!   unsubscribe; no weak references anywhere.
//!
//! Everything else — the widget toolkit, file formats, undo commands, color
//! math — stays outside, behind the [`renderer::Renderer`],
//! [`format::InputFormat`]/[`format::OutputFormat`], and
//! [`event::UndoableEdit`] interfaces.
//!
//! ## Where this fits
//!
//! The scene graph sits between an editor's tools and its view:
//! tools mutate figures through [`Drawing::update_figure`](drawing::Drawing::update_figure)
//! (or batch with `will_change`/`changed`), the drawing keeps its quadtree
//! index and cached aggregate bounds in sync, and the view redraws the
//! regions carried by [`DrawingEvent::Changed`](event::DrawingEvent::Changed)
//! notifications.
//!
//! Hit testing is always two-phase: the index yields candidates by bounding
//! box, and each candidate's precise shape decides. Z-order is an arbitrary
//! orderable integer per figure — sort order is its only meaning.
//!
//! ## Example
//!
//! ```rust
//! use easel_scene::attr::STROKE_WIDTH;
//! use easel_scene::drawing::Drawing;
//! use easel_scene::figure::Figure;
//! use easel_scene::figures::RectFigure;
//! use kurbo::{Affine, Point, Rect};
//!
//! let mut drawing = Drawing::new();
//!
//! // Two overlapping rectangles; the later one is frontmost on the tie.
//! let back = drawing.add(Box::new(RectFigure::new(Rect::new(0.0, 0.0, 40.0, 40.0))));
//! let front = drawing.add(Box::new(RectFigure::new(Rect::new(20.0, 20.0, 60.0, 60.0))));
//!
//! assert_eq!(drawing.find_figure(Point::new(30.0, 30.0), 1.0), Some(front));
//! assert_eq!(drawing.find_figure(Point::new(5.0, 5.0), 1.0), Some(back));
//!
//! // Listen for repaint regions, then move a figure.
//! drawing.add_drawing_listener(|event| {
//!     // A view would union these regions into its dirty rectangle.
//!     let _ = event;
//! });
//! drawing.update_figure(front, |f| f.transform(Affine::translate((100.0, 0.0))));
//! assert_eq!(drawing.find_figure(Point::new(130.0, 30.0), 1.0), Some(front));
//! ```
//!
//! ## Batching
//!
//! ```rust
//! use easel_scene::drawing::Drawing;
//! use easel_scene::figure::Figure;
//! use easel_scene::figures::RectFigure;
//! use kurbo::{Affine, Rect};
//!
//! let mut drawing = Drawing::new();
//! let id = drawing.add(Box::new(RectFigure::new(Rect::new(0.0, 0.0, 10.0, 10.0))));
//!
//! // Any number of mutations, one coalesced change notification.
//! drawing.will_change();
//! drawing.update_figure(id, |f| f.transform(Affine::translate((5.0, 0.0))));
//! drawing.update_figure(id, |f| f.transform(Affine::translate((5.0, 0.0))));
//! drawing.changed();
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod attr;
pub mod drawing;
pub mod event;
pub mod figure;
pub mod figures;
pub mod format;
pub mod renderer;
pub mod types;

pub use attr::{AttributeKey, AttributeStore, AttributeValue, Value};
pub use drawing::Drawing;
pub use event::{DrawingEvent, FigureEvent, ListenerId, Listeners, UndoableEdit};
pub use figure::{Figure, FigureChange, FigureCore, FigureFlags};
pub use figures::{DecoratedFigure, EllipseFigure, GroupFigure, LineFigure, RectFigure};
pub use format::{FormatError, InputFormat, OutputFormat};
pub use renderer::Renderer;
pub use types::{Color, FigureId, HIT_HANDLE_SIZE};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use kurbo::{Point, Rect};

    #[test]
    fn composites_are_opaque_to_the_index() {
        let mut group = GroupFigure::new();
        let mut child = RectFigure::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        child.core_mut().attrs_mut().set(&attr::STROKE_WIDTH, 0.0);
        group.add_child(Box::new(child));

        let mut drawing = Drawing::new();
        let id = drawing.add(Box::new(group));

        // One child, one index entry: the group, not its children.
        assert_eq!(drawing.child_count(), 1);
        assert_eq!(drawing.find_figure(Point::new(5.0, 5.0), 1.0), Some(id));
    }

    #[test]
    fn tools_reach_variants_through_the_trait_object() {
        let mut drawing = Drawing::new();
        let id = drawing.add(Box::new(GroupFigure::new()));

        // Grow the group through the update bracket; the drawing re-indexes
        // it when the bracket commits.
        drawing.update_figure(id, |f| {
            let group = f.as_any_mut().downcast_mut::<GroupFigure>().expect("a group");
            group.add_child(Box::new(RectFigure::new(Rect::new(0.0, 0.0, 10.0, 10.0))));
        });
        assert_eq!(drawing.find_figure(Point::new(5.0, 5.0), 1.0), Some(id));
    }

    #[test]
    fn cloned_figures_are_independent_of_their_original() {
        let mut original = RectFigure::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        original.core_mut().set_attr(&attr::STROKE_WIDTH, 6.0);
        original.core_mut().subscribe(|_| {});

        let mut copy = original.clone_figure();
        assert_eq!(copy.core().attrs().get(&attr::STROKE_WIDTH), 6.0);

        copy.core_mut().set_attr(&attr::STROKE_WIDTH, 2.0);
        assert_eq!(original.core().attrs().get(&attr::STROKE_WIDTH), 6.0);
    }
}
