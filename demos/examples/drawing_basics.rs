// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing basics.
//!
//! Build a small drawing, listen for repaint regions, move a figure, and
//! paint through a println renderer.
//!
//! Run:
//! - `cargo run -p easel_demos --example drawing_basics`

use easel_scene::attr::{FILL_COLOR, STROKE_WIDTH};
use easel_scene::drawing::Drawing;
use easel_scene::figure::Figure;
use easel_scene::figures::{EllipseFigure, RectFigure};
use easel_scene::renderer::Renderer;
use easel_scene::types::Color;
use kurbo::{Affine, Point, Rect};

/// Prints every primitive instead of rasterizing.
struct PrintlnRenderer;

impl Renderer for PrintlnRenderer {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        println!("  fill_rect {rect:?} {color:?}");
    }
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        println!("  stroke_rect {rect:?} {color:?} width={width}");
    }
    fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        println!("  fill_ellipse {rect:?} {color:?}");
    }
    fn stroke_ellipse(&mut self, rect: Rect, color: Color, width: f64) {
        println!("  stroke_ellipse {rect:?} {color:?} width={width}");
    }
    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        println!("  stroke_line {from:?} -> {to:?} {color:?} width={width}");
    }
}

fn main() {
    let mut drawing = Drawing::new();

    // A red square behind a fat-stroked ellipse.
    let mut square = RectFigure::new(Rect::new(10.0, 10.0, 110.0, 110.0));
    square.core_mut().set_attr(&FILL_COLOR, Color::rgb(220, 40, 40));
    let square = drawing.add(Box::new(square));

    let mut ellipse = EllipseFigure::new(Rect::new(60.0, 60.0, 200.0, 160.0));
    ellipse.core_mut().set_attr(&STROKE_WIDTH, 6.0);
    let _ellipse = drawing.add(Box::new(ellipse));

    // A view would union these regions into its dirty rectangle.
    drawing.add_drawing_listener(|event| println!("event: {event:?}"));

    // Batch two moves into one coalesced notification.
    drawing.will_change();
    drawing.update_figure(square, |f| f.transform(Affine::translate((30.0, 0.0))));
    drawing.update_figure(square, |f| f.transform(Affine::translate((0.0, 30.0))));
    drawing.changed();

    println!("aggregate drawing area: {:?}", drawing.drawing_area());

    println!("paint (clipped to the square):");
    drawing.draw(
        &mut PrintlnRenderer,
        Some(drawing.figure(square).expect("present").drawing_area()),
    );
}
