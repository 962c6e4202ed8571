// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing.
//!
//! Scale-aware tolerance on a thin line, layer-over-insertion priority, and
//! picking an occluded figure with `find_figure_behind`.
//!
//! Run:
//! - `cargo run -p easel_demos --example hit_testing`

use easel_scene::drawing::Drawing;
use easel_scene::figures::{LineFigure, RectFigure};
use kurbo::{Point, Rect};

fn main() {
    let mut drawing = Drawing::new();

    // Two stacked squares and a diagonal line across them.
    let below = drawing.add(Box::new(RectFigure::new(Rect::new(0.0, 0.0, 100.0, 100.0))));
    let above = drawing.add(Box::new(RectFigure::new(Rect::new(0.0, 0.0, 100.0, 100.0))));
    let line = drawing.add(Box::new(LineFigure::new(
        Point::new(0.0, 120.0),
        Point::new(100.0, 120.0),
    )));

    // Same layer: the most recently added square wins the tie.
    let p = Point::new(50.0, 50.0);
    assert_eq!(drawing.find_figure(p, 1.0), Some(above));

    // Alt-click: pick the square hidden underneath.
    let occluded = drawing.find_figure_behind(p, 1.0, above);
    assert_eq!(occluded, Some(below));
    println!("occluded figure under {p:?}: {occluded:?}");

    // Promote the lower square one layer; it now wins outright.
    drawing.set_layer(below, 1);
    assert_eq!(drawing.find_figure(p, 1.0), Some(below));

    // The line is thin: 4 units off hits at scale 1 but not zoomed in 10x,
    // because tolerance is constant in screen pixels.
    let near_line = Point::new(50.0, 124.0);
    assert_eq!(drawing.find_figure(near_line, 1.0), Some(line));
    assert_eq!(drawing.find_figure(near_line, 10.0), None);
    println!(
        "line hit at scale 1: {:?}, at scale 10: {:?}",
        drawing.find_figure(near_line, 1.0),
        drawing.find_figure(near_line, 10.0)
    );
}
