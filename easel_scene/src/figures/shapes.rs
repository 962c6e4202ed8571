// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Area shapes (rectangle, ellipse) and line segments.

use alloc::boxed::Box;
use core::any::Any;
use kurbo::{Affine, Line, ParamCurveNearest, Point, Rect};

use crate::attr::{FILL_COLOR, FILLED, STROKE_COLOR, STROKE_WIDTH};
use crate::figure::{Figure, FigureCore};
use crate::renderer::Renderer;
use crate::types::{HIT_HANDLE_SIZE, transform_rect_bbox};

/// Half the stroke width; the amount a stroked outline grows past the bounds.
fn stroke_growth(core: &FigureCore) -> f64 {
    (core.attrs().get(&STROKE_WIDTH) / 2.0).max(0.0)
}

/// An axis-aligned rectangle figure.
#[derive(Debug, Clone)]
pub struct RectFigure {
    core: FigureCore,
    bounds: Rect,
}

impl RectFigure {
    /// A rectangle figure over `bounds` with default attributes.
    pub fn new(bounds: Rect) -> Self {
        Self {
            core: FigureCore::new(),
            bounds,
        }
    }
}

impl Figure for RectFigure {
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
        let grow = stroke_growth(&self.core);
        self.bounds.inflate(grow, grow)
    }

    fn contains_point(&self, point: Point, _scale_denominator: f64) -> bool {
        let grow = stroke_growth(&self.core);
        self.bounds.inflate(grow, grow).contains(point)
    }

    fn transform(&mut self, affine: Affine) {
        // Stays axis-aligned: a rotated rectangle keeps its transformed bbox.
        self.bounds = transform_rect_bbox(affine, self.bounds);
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let attrs = self.core.attrs();
        if attrs.get(&FILLED) {
            renderer.fill_rect(self.bounds, attrs.get(&FILL_COLOR));
        }
        let width = attrs.get(&STROKE_WIDTH);
        if width > 0.0 {
            renderer.stroke_rect(self.bounds, attrs.get(&STROKE_COLOR), width);
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

/// An ellipse inscribed in its bounds.
#[derive(Debug, Clone)]
pub struct EllipseFigure {
    core: FigureCore,
    bounds: Rect,
}

impl EllipseFigure {
    /// An ellipse figure inscribed in `bounds` with default attributes.
    pub fn new(bounds: Rect) -> Self {
        Self {
            core: FigureCore::new(),
            bounds,
        }
    }
}

impl Figure for EllipseFigure {
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
        let grow = stroke_growth(&self.core);
        self.bounds.inflate(grow, grow)
    }

    fn contains_point(&self, point: Point, _scale_denominator: f64) -> bool {
        let grow = stroke_growth(&self.core);
        let rx = self.bounds.width() / 2.0 + grow;
        let ry = self.bounds.height() / 2.0 + grow;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let center = self.bounds.center();
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn transform(&mut self, affine: Affine) {
        self.bounds = transform_rect_bbox(affine, self.bounds);
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let attrs = self.core.attrs();
        if attrs.get(&FILLED) {
            renderer.fill_ellipse(self.bounds, attrs.get(&FILL_COLOR));
        }
        let width = attrs.get(&STROKE_WIDTH);
        if width > 0.0 {
            renderer.stroke_ellipse(self.bounds, attrs.get(&STROKE_COLOR), width);
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

/// A straight line segment.
#[derive(Debug, Clone)]
pub struct LineFigure {
    core: FigureCore,
    start: Point,
    end: Point,
}

impl LineFigure {
    /// A segment from `start` to `end` with default attributes.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            core: FigureCore::new(),
            start,
            end,
        }
    }

    /// Start point.
    pub fn start(&self) -> Point {
        self.start
    }

    /// End point.
    pub fn end(&self) -> Point {
        self.end
    }
}

impl Figure for LineFigure {
    fn core(&self) -> &FigureCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FigureCore {
        &mut self.core
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn set_bounds(&mut self, anchor: Point, lead: Point) {
        self.start = anchor;
        self.end = lead;
    }

    fn drawing_area_scaled(&self, _scale_factor: f64) -> Rect {
        let grow = stroke_growth(&self.core);
        self.bounds().inflate(grow, grow)
    }

    fn contains_point(&self, point: Point, scale_denominator: f64) -> bool {
        // Thin geometry: pad the stroke by a tolerance that is constant in
        // screen pixels, i.e. inversely proportional to the view scale.
        let tolerance = stroke_growth(&self.core) + HIT_HANDLE_SIZE / 2.0 / scale_denominator;
        let nearest = Line::new(self.start, self.end).nearest(point, 1e-9);
        nearest.distance_sq <= tolerance * tolerance
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let attrs = self.core.attrs();
        renderer.stroke_line(
            self.start,
            self.end,
            attrs.get(&STROKE_COLOR),
            attrs.get(&STROKE_WIDTH),
        );
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
