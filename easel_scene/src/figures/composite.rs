// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite and decorated figures: "has-a figure" via delegation fields.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use kurbo::{Affine, Point, Rect};

use crate::attr::DECORATOR_INSET;
use crate::figure::{Figure, FigureCore};
use crate::renderer::Renderer;

/// A figure made of owned child figures.
///
/// The children are opaque to any spatial index: a drawing only sees the
/// group's overall box. Structural edits (adding or removing children) are
/// mutations like any other — wrap them in the group's change bracket when
/// the group lives in a drawing.
#[derive(Debug)]
pub struct GroupFigure {
    core: FigureCore,
    children: Vec<Box<dyn Figure>>,
}

impl Default for GroupFigure {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupFigure {
    /// An empty group.
    pub fn new() -> Self {
        Self {
            core: FigureCore::new(),
            children: Vec::new(),
        }
    }

    /// Append a child figure.
    pub fn add_child(&mut self, child: Box<dyn Figure>) {
        self.children.push(child);
    }

    /// Remove and return the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range.
    pub fn remove_child(&mut self, index: usize) -> Box<dyn Figure> {
        self.children.remove(index)
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The child at `index`.
    pub fn child(&self, index: usize) -> Option<&dyn Figure> {
        self.children.get(index).map(|c| &**c)
    }

    /// The child at `index`, mutably.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut (dyn Figure + 'static)> {
        self.children.get_mut(index).map(|c| &mut **c)
    }
}

impl Clone for GroupFigure {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            children: self.children.iter().map(|c| c.clone_figure()).collect(),
        }
    }
}

impl Figure for GroupFigure {
    fn core(&self) -> &FigureCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FigureCore {
        &mut self.core
    }

    fn bounds(&self) -> Rect {
        self.children
            .iter()
            .map(|c| c.bounds())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    fn set_bounds(&mut self, anchor: Point, lead: Point) {
        let old = self.bounds();
        let new = Rect::from_points(anchor, lead);
        let affine = if old.width() == 0.0 || old.height() == 0.0 {
            Affine::translate((new.x0 - old.x0, new.y0 - old.y0))
        } else {
            Affine::translate((new.x0, new.y0))
                * Affine::scale_non_uniform(new.width() / old.width(), new.height() / old.height())
                * Affine::translate((-old.x0, -old.y0))
        };
        self.transform(affine);
    }

    fn drawing_area_scaled(&self, scale_factor: f64) -> Rect {
        self.children
            .iter()
            .map(|c| c.drawing_area_scaled(scale_factor))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    fn contains_point(&self, point: Point, scale_denominator: f64) -> bool {
        self.children
            .iter()
            .any(|c| c.is_visible() && c.contains_point(point, scale_denominator))
    }

    fn transform(&mut self, affine: Affine) {
        for child in &mut self.children {
            child.transform(affine);
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        for child in &self.children {
            if child.is_visible() {
                child.draw(renderer);
            }
        }
    }

    fn clone_figure(&self) -> Box<dyn Figure> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A figure with a decorator drawn behind it.
///
/// Delegates all shared state to the inner figure; the decorator is a plain
/// figure whose bounds track the inner figure's bounds, padded by
/// [`DECORATOR_INSET`]. The pad is re-applied on every reshape or transform.
#[derive(Debug)]
pub struct DecoratedFigure {
    inner: Box<dyn Figure>,
    decorator: Box<dyn Figure>,
}

impl DecoratedFigure {
    /// Wrap `inner` with `decorator`; the decorator is reshaped immediately.
    pub fn new(inner: Box<dyn Figure>, decorator: Box<dyn Figure>) -> Self {
        let mut this = Self { inner, decorator };
        this.update_decorator_bounds();
        this
    }

    /// The decorated figure.
    pub fn inner(&self) -> &dyn Figure {
        self.inner.as_ref()
    }

    /// The decorator figure.
    pub fn decorator(&self) -> &dyn Figure {
        self.decorator.as_ref()
    }

    fn update_decorator_bounds(&mut self) {
        let inset = self.inner.core().attrs().get(&DECORATOR_INSET);
        let r = self.inner.bounds().inflate(inset, inset);
        self.decorator
            .set_bounds(Point::new(r.x0, r.y0), Point::new(r.x1, r.y1));
    }
}

impl Clone for DecoratedFigure {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_figure(),
            decorator: self.decorator.clone_figure(),
        }
    }
}

impl Figure for DecoratedFigure {
    fn core(&self) -> &FigureCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut FigureCore {
        self.inner.core_mut()
    }

    fn bounds(&self) -> Rect {
        self.inner.bounds()
    }

    fn set_bounds(&mut self, anchor: Point, lead: Point) {
        self.inner.set_bounds(anchor, lead);
        self.update_decorator_bounds();
    }

    fn drawing_area_scaled(&self, scale_factor: f64) -> Rect {
        self.inner
            .drawing_area_scaled(scale_factor)
            .union(self.decorator.drawing_area_scaled(scale_factor))
    }

    fn contains_point(&self, point: Point, scale_denominator: f64) -> bool {
        self.decorator.contains_point(point, scale_denominator)
            || self.inner.contains_point(point, scale_denominator)
    }

    fn transform(&mut self, affine: Affine) {
        self.inner.transform(affine);
        self.update_decorator_bounds();
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        self.decorator.draw(renderer);
        self.inner.draw(renderer);
    }

    fn clone_figure(&self) -> Box<dyn Figure> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::STROKE_WIDTH;
    use crate::figures::{EllipseFigure, RectFigure};

    fn flat_rect(r: Rect) -> Box<dyn Figure> {
        let mut f = RectFigure::new(r);
        f.core_mut().attrs_mut().set(&STROKE_WIDTH, 0.0);
        Box::new(f)
    }

    #[test]
    fn group_bounds_union_children() {
        let mut group = GroupFigure::new();
        group.add_child(flat_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        group.add_child(flat_rect(Rect::new(20.0, 20.0, 30.0, 30.0)));
        assert_eq!(group.bounds(), Rect::new(0.0, 0.0, 30.0, 30.0));
        assert_eq!(group.drawing_area(), Rect::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn group_reshape_scales_children() {
        let mut group = GroupFigure::new();
        group.add_child(flat_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        group.add_child(flat_rect(Rect::new(10.0, 0.0, 20.0, 10.0)));
        group.set_bounds(Point::new(0.0, 0.0), Point::new(40.0, 10.0));
        assert_eq!(group.bounds(), Rect::new(0.0, 0.0, 40.0, 10.0));
        assert_eq!(group.child(0).unwrap().bounds(), Rect::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn group_hit_test_reaches_children() {
        let mut group = GroupFigure::new();
        group.add_child(flat_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        group.add_child(flat_rect(Rect::new(20.0, 0.0, 30.0, 10.0)));
        assert!(group.contains_point(Point::new(5.0, 5.0), 1.0));
        // Inside the group's overall box but between the children.
        assert!(!group.contains_point(Point::new(15.0, 5.0), 1.0));
    }

    #[test]
    fn group_clone_is_deep() {
        let mut group = GroupFigure::new();
        group.add_child(flat_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut copy = group.clone();
        copy.child_mut(0)
            .unwrap()
            .set_bounds(Point::new(50.0, 50.0), Point::new(60.0, 60.0));
        assert_eq!(group.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(copy.bounds(), Rect::new(50.0, 50.0, 60.0, 60.0));
    }

    #[test]
    fn decorator_tracks_and_extends_the_inner_figure() {
        let inner = flat_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        let decorator = Box::new(EllipseFigure::new(Rect::ZERO));
        let mut decorated = DecoratedFigure::new(inner, decorator);

        // Default inset is 4; the decorator pads the drawing area, plus the
        // decorator's own default stroke.
        assert_eq!(decorated.bounds(), Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(
            decorated.drawing_area(),
            Rect::new(5.5, 5.5, 24.5, 24.5),
        );

        decorated.set_bounds(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert_eq!(decorated.decorator().bounds(), Rect::new(-4.0, -4.0, 14.0, 14.0));

        // A decorator hit counts as a figure hit.
        assert!(decorated.contains_point(Point::new(-3.0, 5.0), 1.0));
    }
}
