// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Easel Index: insert, update, and query.

use easel_index::{Aabb2D, Index};

fn main() {
    let mut idx: Index<u32> = Index::new();
    let k1 = idx.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1);
    let _k2 = idx.insert(Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2);

    // Move box 1; the change is visible immediately.
    idx.update(k1, Aabb2D::new(20.0, 0.0, 30.0, 10.0));

    // Query a point
    let hits: Vec<_> = idx.query_point(6.0, 6.0).collect();
    println!("hits at (6,6): {hits:?}");

    // And the region the first box moved into
    let hits: Vec<_> = idx.query_rect(Aabb2D::new(18.0, 0.0, 32.0, 12.0)).collect();
    println!("hits in the moved-to region: {hits:?}");
}
