// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::quadtree::QuadTreeF64;
use crate::types::Aabb2D;

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Arena slot. The generation survives removal so stale keys never resolve
/// against a reused slot.
#[derive(Clone, Debug)]
struct Slot<T, P> {
    generation: u32,
    data: Option<(Aabb2D<T>, P)>,
}

/// A generic AABB index parameterized by a spatial backend.
///
/// Entries are applied eagerly: an `insert`, `update`, or `remove` is visible
/// to the next query. Keeping the stored AABBs in sync with whatever they
/// describe is the caller's job; the index never re-validates on its own.
#[derive(Debug)]
pub struct IndexGeneric<T: Copy + PartialOrd + Debug, P: Copy + Debug, B: Backend<T>> {
    slots: Vec<Slot<T, P>>,
    free_list: Vec<usize>,
    len: usize,
    backend: B,
}

impl<T, P, B> Default for IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            backend: B::default(),
        }
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.slots.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation += 1;
            slot.data = Some((aabb, payload));
            (idx, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                data: Some((aabb, payload)),
            });
            (self.slots.len() - 1, 1)
        };
        self.backend.insert(idx, aabb);
        self.len += 1;
        Key::new(idx, generation)
    }

    /// Update an existing entry's AABB. Returns false for a stale key.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        let Some(slot) = self.slot_mut(key) else {
            return false;
        };
        if let Some((stored, _)) = slot.data.as_mut() {
            *stored = aabb;
        }
        self.backend.update(key.idx(), aabb);
        true
    }

    /// Remove an entry. Returns false if it was already absent.
    pub fn remove(&mut self, key: Key) -> bool {
        let Some(slot) = self.slot_mut(key) else {
            return false;
        };
        slot.data = None;
        self.free_list.push(key.idx());
        self.backend.remove(key.idx());
        self.len -= 1;
        true
    }

    /// The AABB stored for a key, if the key is live.
    pub fn aabb(&self, key: Key) -> Option<Aabb2D<T>> {
        self.slot(key).and_then(|s| s.data.map(|(aabb, _)| aabb))
    }

    /// True if the key refers to a live entry.
    pub fn contains(&self, key: Key) -> bool {
        self.slot(key).is_some_and(|s| s.data.is_some())
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
        self.backend.clear();
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_point(x, y))
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_rect(rect))
    }

    /// Query for entries whose AABB lies fully inside the given rectangle.
    pub fn query_contained(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_contained(rect))
    }

    fn resolve(
        &self,
        hits: impl Iterator<Item = usize>,
    ) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        for idx in hits {
            if let Some(slot) = self.slots.get(idx)
                && let Some((_, payload)) = slot.data
            {
                out.push((Key::new(idx, slot.generation), payload));
            }
        }
        out.into_iter()
    }

    fn slot(&self, key: Key) -> Option<&Slot<T, P>> {
        let slot = self.slots.get(key.idx())?;
        (slot.generation == key.1).then_some(slot)
    }

    fn slot_mut(&mut self, key: Key) -> Option<&mut Slot<T, P>> {
        let slot = self.slots.get_mut(key.idx())?;
        (slot.generation == key.1 && slot.data.is_some()).then_some(slot)
    }
}

/// Default index: quadtree backend over f64 coordinates.
pub type Index<P> = IndexGeneric<f64, P, QuadTreeF64>;

/// Linear-scan index, generic over the scalar. Useful for tiny scenes and as
/// a reference in tests and benches.
pub type FlatIndex<T, P> = IndexGeneric<T, P, FlatVec<T>>;
