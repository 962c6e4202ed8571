// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-surface collaborator interface.
//!
//! The scene graph never rasterizes. Figures describe themselves through
//! these primitives and the toolkit (or a test recorder) decides what pixels
//! mean. Rectangles passed here are in drawing coordinates; ellipses are
//! inscribed in their rectangle.

use kurbo::{Point, Rect};

use crate::types::Color;

/// Primitive operations a figure may emit while drawing itself.
pub trait Renderer {
    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64);

    /// Fill the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect, color: Color);

    /// Stroke the ellipse inscribed in `rect`.
    fn stroke_ellipse(&mut self, rect: Rect, color: Color, width: f64);

    /// Stroke a line segment.
    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64);
}
