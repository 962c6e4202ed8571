// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree backend for f64 coordinates.
//!
//! Recursive quadrant partition tuned for editor scenes: many boxes, frequent
//! single-box updates, and queries that are small relative to the scene. See
//! the [module docs](super) for the placement and overflow rules.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb2D;

/// Maximum number of items a node holds before it splits.
const NODE_CAPACITY: usize = 32;

/// Depth cap; degenerate scenes (many coincident boxes) stop splitting here.
const MAX_DEPTH: usize = 10;

/// Overflow entries tolerated outside the root before a rebuild.
const OUTSIDE_LIMIT: usize = 32;

struct Node {
    bounds: Aabb2D<f64>,
    items: Vec<(usize, Aabb2D<f64>)>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    fn new(bounds: Aabb2D<f64>) -> Self {
        Self {
            bounds,
            items: Vec::new(),
            children: None,
        }
    }

    fn quadrants(&self) -> [Aabb2D<f64>; 4] {
        let b = &self.bounds;
        let mid_x = 0.5 * (b.min_x + b.max_x);
        let mid_y = 0.5 * (b.min_y + b.max_y);
        [
            Aabb2D::new(b.min_x, b.min_y, mid_x, mid_y),
            Aabb2D::new(mid_x, b.min_y, b.max_x, mid_y),
            Aabb2D::new(b.min_x, mid_y, mid_x, b.max_y),
            Aabb2D::new(mid_x, mid_y, b.max_x, b.max_y),
        ]
    }

    /// Place an item in the deepest node whose quadrant fully contains it.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<f64>, depth: usize) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_aabb(&aabb) {
                    child.insert(slot, aabb, depth + 1);
                    return;
                }
            }
            // Straddles the quadrant seams; stays here.
            self.items.push((slot, aabb));
            return;
        }
        self.items.push((slot, aabb));
        if self.items.len() > NODE_CAPACITY && depth < MAX_DEPTH {
            self.split(depth);
        }
    }

    fn split(&mut self, depth: usize) {
        let [q0, q1, q2, q3] = self.quadrants();
        let mut children = Box::new([Node::new(q0), Node::new(q1), Node::new(q2), Node::new(q3)]);
        let mut straddling = Vec::new();
        for (slot, aabb) in self.items.drain(..) {
            let child = children.iter_mut().find(|c| c.bounds.contains_aabb(&aabb));
            match child {
                Some(c) => c.insert(slot, aabb, depth + 1),
                None => straddling.push((slot, aabb)),
            }
        }
        self.items = straddling;
        self.children = Some(children);
    }

    /// Remove by descending the same path `insert` took for this AABB.
    fn remove(&mut self, slot: usize, aabb: &Aabb2D<f64>) -> bool {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_aabb(aabb) {
                    return child.remove(slot, aabb);
                }
            }
        }
        if let Some(pos) = self.items.iter().position(|(s, _)| *s == slot) {
            self.items.swap_remove(pos);
            true
        } else {
            false
        }
    }

    fn collect(
        &self,
        pred: &impl Fn(&Aabb2D<f64>) -> bool,
        prune: &impl Fn(&Aabb2D<f64>) -> bool,
        out: &mut Vec<usize>,
    ) {
        if !prune(&self.bounds) {
            return;
        }
        for (slot, aabb) in &self.items {
            if pred(aabb) {
                out.push(*slot);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect(pred, prune, out);
            }
        }
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map(|c| c.iter().map(Self::node_count).sum::<usize>())
            .unwrap_or(0)
    }
}

/// Quadtree backend over f64 coordinates.
pub struct QuadTreeF64 {
    entries: Vec<Option<Aabb2D<f64>>>,
    root: Option<Node>,
    outside: Vec<(usize, Aabb2D<f64>)>,
}

impl Default for QuadTreeF64 {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            root: None,
            outside: Vec::new(),
        }
    }
}

impl Debug for QuadTreeF64 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("QuadTreeF64")
            .field("alive", &alive)
            .field("outside", &self.outside.len())
            .field("nodes", &self.root.as_ref().map(Node::node_count).unwrap_or(0))
            .finish_non_exhaustive()
    }
}

impl QuadTreeF64 {
    fn place(&mut self, slot: usize, aabb: Aabb2D<f64>) {
        match self.root.as_mut() {
            None => {
                let mut root = Node::new(aabb);
                root.items.push((slot, aabb));
                self.root = Some(root);
            }
            Some(root) if root.bounds.contains_aabb(&aabb) => root.insert(slot, aabb, 0),
            Some(_) => {
                self.outside.push((slot, aabb));
                if self.outside.len() > OUTSIDE_LIMIT {
                    self.rebuild();
                }
            }
        }
    }

    /// Rebuild the tree over the union of all live AABBs.
    fn rebuild(&mut self) {
        self.outside.clear();
        let live: Vec<(usize, Aabb2D<f64>)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.map(|aabb| (slot, aabb)))
            .collect();
        let Some(bounds) = live
            .iter()
            .map(|(_, aabb)| *aabb)
            .reduce(|a, b| a.union(&b))
        else {
            self.root = None;
            return;
        };
        let mut root = Node::new(bounds);
        for (slot, aabb) in live {
            root.insert(slot, aabb, 0);
        }
        self.root = Some(root);
    }

    fn query<'a>(
        &'a self,
        pred: impl Fn(&Aabb2D<f64>) -> bool + 'a,
        prune: impl Fn(&Aabb2D<f64>) -> bool + 'a,
    ) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        if let Some(root) = self.root.as_ref() {
            root.collect(&pred, &prune, &mut out);
        }
        for (slot, aabb) in &self.outside {
            if pred(aabb) {
                out.push(*slot);
            }
        }
        Box::new(out.into_iter())
    }

    #[cfg(test)]
    fn node_count(&self) -> usize {
        self.root.as_ref().map(Node::node_count).unwrap_or(0)
    }
}

impl Backend<f64> for QuadTreeF64 {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<f64>) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(aabb);
        self.place(slot, aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<f64>) {
        self.remove(slot);
        self.insert(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        let Some(aabb) = self.entries.get_mut(slot).and_then(Option::take) else {
            return;
        };
        if let Some(pos) = self.outside.iter().position(|(s, _)| *s == slot) {
            self.outside.swap_remove(pos);
        } else if let Some(root) = self.root.as_mut() {
            root.remove(slot, &aabb);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.root = None;
        self.outside.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.query(
            move |a| a.contains_point(x, y),
            move |bounds| bounds.contains_point(x, y),
        )
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D<f64>) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.query(
            move |a| a.intersects(&rect),
            move |bounds| bounds.intersects(&rect),
        )
    }

    fn query_contained<'a>(&'a self, rect: Aabb2D<f64>) -> Box<dyn Iterator<Item = usize> + 'a> {
        // Prune by intersection: a node may straddle `rect` while holding
        // items fully inside it.
        self.query(
            move |a| rect.contains_aabb(a),
            move |bounds| bounds.intersects(&rect),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
        let mut out = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                out.push(Aabb2D::from_xywh(
                    x as f64 * cell,
                    y as f64 * cell,
                    cell,
                    cell,
                ));
            }
        }
        out
    }

    #[test]
    fn splits_past_capacity_and_answers_queries() {
        let mut qt = QuadTreeF64::default();
        // Seed coverage so the grid lands inside the root.
        qt.insert(0, Aabb2D::new(0.0, 0.0, 160.0, 160.0));
        for (i, aabb) in grid(16, 10.0).into_iter().enumerate() {
            qt.insert(i + 1, aabb);
        }
        assert!(qt.node_count() > 1, "capacity overflow should split");

        let mut hits: Vec<_> = qt.query_rect(Aabb2D::new(0.0, 0.0, 9.0, 9.0)).collect();
        hits.sort_unstable();
        // The big seed box, the first cell, and nothing else.
        assert_eq!(hits, [0, 1]);

        let mut hits: Vec<_> = qt.query_point(85.0, 85.0).collect();
        hits.sort_unstable();
        assert!(hits.contains(&0));
        assert!(hits.len() >= 2, "seed box plus at least one cell");
    }

    #[test]
    fn no_duplicate_results_for_straddling_items() {
        let mut qt = QuadTreeF64::default();
        qt.insert(0, Aabb2D::new(0.0, 0.0, 100.0, 100.0));
        // Sits on the quadrant seam once the node splits.
        qt.insert(1, Aabb2D::new(40.0, 40.0, 60.0, 60.0));
        for (i, aabb) in grid(8, 12.0).into_iter().enumerate() {
            qt.insert(i + 2, aabb);
        }
        let hits: Vec<_> = qt.query_rect(Aabb2D::new(0.0, 0.0, 100.0, 100.0)).collect();
        let mut dedup = hits.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(hits.len(), dedup.len(), "each slot reported once");
    }

    #[test]
    fn outside_overflow_triggers_rebuild() {
        let mut qt = QuadTreeF64::default();
        qt.insert(0, Aabb2D::new(0.0, 0.0, 10.0, 10.0));
        // March boxes away from the root coverage until the overflow rebuilds.
        for i in 1..=(OUTSIDE_LIMIT + 2) {
            let x = 100.0 + i as f64 * 20.0;
            qt.insert(i, Aabb2D::from_xywh(x, 0.0, 10.0, 10.0));
        }
        // The last box may land back in the overflow after the rebuild, but
        // the bulk must have been folded into the tree.
        assert!(qt.outside.len() <= 1, "rebuild should drain the overflow");
        // Everything remains queryable after the rebuild.
        let far_x = 100.0 + (OUTSIDE_LIMIT + 2) as f64 * 20.0 + 5.0;
        assert_eq!(qt.query_point(far_x, 5.0).count(), 1);
        assert_eq!(qt.query_point(5.0, 5.0).count(), 1);
    }

    #[test]
    fn update_moves_an_entry() {
        let mut qt = QuadTreeF64::default();
        qt.insert(0, Aabb2D::new(0.0, 0.0, 200.0, 200.0));
        qt.insert(1, Aabb2D::new(0.0, 0.0, 10.0, 10.0));
        qt.update(1, Aabb2D::new(150.0, 150.0, 160.0, 160.0));

        assert_eq!(qt.query_point(5.0, 5.0).count(), 1, "old spot vacated");
        let hits: Vec<_> = qt.query_point(155.0, 155.0).collect();
        assert!(hits.contains(&1), "new spot occupied");
    }

    #[test]
    fn remove_is_exact_and_tolerates_absents() {
        let mut qt = QuadTreeF64::default();
        qt.insert(0, Aabb2D::new(0.0, 0.0, 100.0, 100.0));
        for (i, aabb) in grid(8, 12.0).into_iter().enumerate() {
            qt.insert(i + 1, aabb);
        }
        qt.remove(5);
        qt.remove(5); // second removal is a no-op
        qt.remove(9999);
        let hits: Vec<_> = qt.query_rect(Aabb2D::new(0.0, 0.0, 100.0, 100.0)).collect();
        assert!(!hits.contains(&5));
    }

    #[test]
    fn contained_query_skips_partial_overlaps() {
        let mut qt = QuadTreeF64::default();
        qt.insert(0, Aabb2D::new(0.0, 0.0, 100.0, 100.0));
        qt.insert(1, Aabb2D::new(10.0, 10.0, 20.0, 20.0));
        qt.insert(2, Aabb2D::new(90.0, 90.0, 110.0, 110.0));
        let mut inside: Vec<_> = qt
            .query_contained(Aabb2D::new(0.0, 0.0, 50.0, 50.0))
            .collect();
        inside.sort_unstable();
        assert_eq!(inside, [1]);
    }

    #[test]
    fn coincident_boxes_respect_depth_cap() {
        let mut qt = QuadTreeF64::default();
        for i in 0..(NODE_CAPACITY * 4) {
            qt.insert(i, Aabb2D::new(0.0, 0.0, 1.0, 1.0));
        }
        assert_eq!(
            qt.query_point(0.5, 0.5).count(),
            NODE_CAPACITY * 4,
            "all coincident boxes stay reachable"
        );
    }
}
