// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete figure variants.
//!
//! - [`RectFigure`], [`EllipseFigure`]: filled/stroked area shapes.
//! - [`LineFigure`]: a thin segment with scale-aware hit tolerance.
//! - [`GroupFigure`]: a composite that delegates to owned children. The
//!   grouping is opaque to a drawing's spatial index, which only sees the
//!   composite's overall box.
//! - [`DecoratedFigure`]: wraps a figure plus a decorator drawn behind it.
//!
//! The set is open: anything implementing [`Figure`](crate::figure::Figure)
//! can live in a drawing.

mod composite;
mod shapes;

pub use composite::{DecoratedFigure, GroupFigure};
pub use shapes::{EllipseFigure, LineFigure, RectFigure};
