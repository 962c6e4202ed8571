// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `quadtree`: recursive quadrant partition for f64 coordinates; the
//!   backend of choice for editor scenes with many figures.
//!
//! Quadtree note
//! -------------
//! Each node covers a rectangle and splits into four quadrants once it holds
//! more than `NODE_CAPACITY` items. An item is stored in the deepest node
//! whose quadrant fully contains its AABB, so straddling items stay at inner
//! nodes and queries never report a slot twice. Items that fall outside the
//! root's coverage collect in an overflow list; when the overflow grows past
//! its limit the tree is rebuilt over the union of all live AABBs.

pub mod flatvec;
pub mod quadtree;
