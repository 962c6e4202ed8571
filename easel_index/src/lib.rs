// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=easel_index --heading-base-level=0

//! Easel Index: a generic 2D AABB index (boundary index).
//!
//! Easel Index is the broad-phase building block of the Easel scene graph.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by point, intersecting rectangle, or full containment.
//! - Eager semantics: every mutation is visible to the next query, so the
//!   owning container decides when entries are re-synced.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers (like a figure scene graph) compute repaint-relevant AABBs and feed them here.
//!
//! Backends are pluggable via a simple trait so you can swap the spatial strategy without API churn.
//! The default backend is a quadtree over `f64` coordinates; a flat vector
//! (linear scan) backend is available for tiny scenes and as a reference.
//!
//! Results are *candidates by bounds*, not hits: a figure's true shape can be
//! smaller than its box, so callers always follow up with a precise geometric
//! test. Treating index membership as a hit is a bug in the caller.
//!
//! # Example
//!
//! ```rust
//! use easel_index::{Aabb2D, Index};
//!
//! // Create an index and add two boxes.
//! let mut idx: Index<u32> = Index::new();
//! let k1 = idx.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1);
//! let _k2 = idx.insert(Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2);
//!
//! // Move the first box.
//! idx.update(k1, Aabb2D::new(20.0, 0.0, 30.0, 10.0));
//!
//! // Query a point inside the second box.
//! let hits: Vec<_> = idx.query_point(6.0, 6.0).collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].1, 2);
//! ```
//!
//! ## Choosing a backend
//!
//! - `QuadTreeF64` (default): recursive quadrant partition, capacity-split
//!   nodes, overflow list with rebuild. Good general choice for editor
//!   scenes with hundreds to tens of thousands of figures.
//! - `FlatVec`: simplest and smallest, linear scans. Good for very small sets
//!   or when inserts/updates vastly outnumber queries.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds may assert.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::quadtree::QuadTreeF64;
pub use index::{FlatIndex, Index, IndexGeneric, Key};
pub use types::Aabb2D;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn quadtree_and_flatvec_agree() {
        let mut quad: Index<u32> = Index::new();
        let mut flat: FlatIndex<f64, u32> = FlatIndex::new();
        for i in 0..64_u32 {
            let x = f64::from(i % 8) * 12.0;
            let y = f64::from(i / 8) * 12.0;
            let aabb = Aabb2D::from_xywh(x, y, 10.0, 10.0);
            quad.insert(aabb, i);
            flat.insert(aabb, i);
        }
        let probe = Aabb2D::new(10.0, 10.0, 40.0, 40.0);
        let mut q: Vec<_> = quad.query_rect(probe).map(|(_, p)| p).collect();
        let mut f: Vec<_> = flat.query_rect(probe).map(|(_, p)| p).collect();
        q.sort_unstable();
        f.sort_unstable();
        assert_eq!(q, f);
    }

    #[test]
    fn two_phase_protocol_returns_candidates() {
        // The index answers by box, so a diagonal "line" box reports a hit
        // even where the true line would miss. Callers do the precise test.
        let mut idx: Index<&'static str> = Index::new();
        idx.insert(Aabb2D::new(0.0, 0.0, 100.0, 100.0), "diagonal");
        let hits: Vec<_> = idx.query_point(10.0, 90.0).collect();
        assert_eq!(hits.len(), 1, "broad phase yields the candidate");
    }
}
