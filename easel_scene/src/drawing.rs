// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing: an ordered, spatially indexed collection of figures.
//!
//! # Ownership and threading
//!
//! A [`Drawing`] owns its figures in a generational slot arena and is the
//! single writer for everything in it: all mutation goes through `&mut self`,
//! all queries through `&self`, so the borrow checker plays the role the
//! original editor gave a shared paint-tree lock. To share a drawing across
//! threads, wrap it in a mutex and route both painting and mutation through
//! that owner.
//!
//! # Change propagation
//!
//! Mutating a figure through [`Drawing::update_figure`] brackets the change
//! with the figure's `will_change`/`changed` pair. When the outermost
//! bracket commits, the drawing re-synchronizes the figure's spatial index
//! entry, invalidates its cached aggregate drawing area, and fires a single
//! [`DrawingEvent::Changed`] carrying the union of the before/after areas.
//!
//! Drawing-level [`will_change`](Drawing::will_change) /
//! [`changed`](Drawing::changed) brackets batch any number of such
//! mutations: figure commits inside the bracket are deferred (index re-sync
//! queued, damage accumulated) and a single coalesced event fires when the
//! outermost bracket closes, after the deferred entries are re-synced. The
//! settled state therefore always satisfies: every child has exactly one
//! index entry, holding its current drawing area.
//!
//! # Hit testing is two-phase
//!
//! Queries gather candidates from the index *by box* and then run each
//! candidate's precise [`contains_point`](crate::figure::Figure::contains_point).
//! Index membership is never treated as a hit.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt::Debug;
use core::mem;

use easel_index::Index as AabbIndex;
use easel_index::Key as AabbKey;
use kurbo::{Point, Rect};

use crate::attr::{
    AttributeKey, AttributeStore, AttributeValue, CANVAS_FILL_COLOR, CANVAS_HEIGHT, CANVAS_WIDTH,
};
use crate::event::{DrawingEvent, ListenerId, Listeners, UndoableEdit};
use crate::figure::Figure;
use crate::format::{FormatError, InputFormat, OutputFormat};
use crate::renderer::Renderer;
use crate::types::{FigureId, HIT_HANDLE_SIZE, rect_to_aabb};

struct Child {
    figure: Box<dyn Figure>,
    index_key: AabbKey,
}

struct ArenaSlot {
    generation: u32,
    child: Option<Child>,
}

/// An ordered, spatially indexed scene of figures.
pub struct Drawing {
    slots: Vec<ArenaSlot>,
    free_list: Vec<usize>,
    /// Stacking order: position decides paint order among figures sharing a
    /// layer. Layer-sorted orders are derived per query.
    children: Vec<FigureId>,
    index: AabbIndex<FigureId>,
    cached_drawing_area: Cell<Option<Rect>>,
    changing_depth: u32,
    pending_damage: Option<Rect>,
    deferred_sync: Vec<FigureId>,
    attrs: AttributeStore,
    listeners: Listeners<DrawingEvent>,
    undo_listeners: Listeners<dyn UndoableEdit>,
    input_formats: Vec<Box<dyn InputFormat>>,
    output_formats: Vec<Box<dyn OutputFormat>>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Drawing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Drawing")
            .field("children", &self.children.len())
            .field("slots_total", &self.slots.len())
            .field("changing_depth", &self.changing_depth)
            .field("listeners", &self.listeners.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Drawing {
    /// Create an empty drawing.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            children: Vec::new(),
            index: AabbIndex::new(),
            cached_drawing_area: Cell::new(None),
            changing_depth: 0,
            pending_damage: None,
            deferred_sync: Vec::new(),
            attrs: AttributeStore::new(),
            listeners: Listeners::new(),
            undo_listeners: Listeners::new(),
            input_formats: Vec::new(),
            output_formats: Vec::new(),
        }
    }

    // --- children ---

    /// Number of figures.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// True when the drawing has no figures.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Figure ids in stacking order (back to front within a layer).
    pub fn children(&self) -> impl Iterator<Item = FigureId> + '_ {
        self.children.iter().copied()
    }

    /// True if `id` refers to a current child.
    pub fn contains_figure(&self, id: FigureId) -> bool {
        self.child(id).is_some()
    }

    /// Shared access to a figure.
    pub fn figure(&self, id: FigureId) -> Option<&dyn Figure> {
        self.child(id).map(|c| &*c.figure)
    }

    /// Position of `id` in the stacking order.
    pub fn index_of(&self, id: FigureId) -> Option<usize> {
        self.children.iter().position(|c| *c == id)
    }

    /// Append a figure at the front of its layer.
    pub fn add(&mut self, figure: Box<dyn Figure>) -> FigureId {
        self.add_at(self.children.len(), figure)
    }

    /// Insert a figure at `index` in the stacking order.
    ///
    /// The figure is indexed under its current drawing area and a single
    /// [`DrawingEvent::FigureAdded`] fires.
    ///
    /// # Panics
    ///
    /// Panics when `index > child_count()`.
    pub fn add_at(&mut self, index: usize, figure: Box<dyn Figure>) -> FigureId {
        assert!(
            index <= self.children.len(),
            "insertion index {index} out of range for {} children",
            self.children.len()
        );
        let area = figure.drawing_area();
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx].generation += 1;
            idx
        } else {
            self.slots.push(ArenaSlot {
                generation: 1,
                child: None,
            });
            self.slots.len() - 1
        };
        let id = FigureId::new(idx, self.slots[idx].generation);
        let key = self.index.insert(rect_to_aabb(area), id);
        self.slots[idx].child = Some(Child {
            figure,
            index_key: key,
        });
        self.children.insert(index, id);
        self.invalidate();
        self.listeners.emit(&DrawingEvent::FigureAdded {
            figure: id,
            index,
            area,
        });
        id
    }

    /// Add a batch of figures; the entry point format readers use.
    pub fn add_all(
        &mut self,
        figures: impl IntoIterator<Item = Box<dyn Figure>>,
    ) -> Vec<FigureId> {
        figures.into_iter().map(|f| self.add(f)).collect()
    }

    /// Remove a figure, returning it so it can live on elsewhere. `None`
    /// (not an error) when absent — a concurrent edit in the same batch may
    /// have removed it already.
    pub fn remove(&mut self, id: FigureId) -> Option<Box<dyn Figure>> {
        let pos = self.index_of(id)?;
        let child = self.slots[id.idx()].child.take()?;
        self.children.remove(pos);
        self.free_list.push(id.idx());
        self.index.remove(child.index_key);
        self.invalidate();
        let area = child.figure.drawing_area();
        self.listeners.emit(&DrawingEvent::FigureRemoved {
            figure: id,
            index: pos,
            area,
        });
        Some(child.figure)
    }

    /// Remove every figure inside one batched change.
    pub fn remove_all(&mut self) {
        self.will_change();
        for id in self.children.clone() {
            let _ = self.remove(id);
        }
        self.changed();
    }

    /// Drop all children without firing per-figure events; the plain
    /// mutation entry point for format writers replacing a document.
    pub fn remove_all_children(&mut self) {
        for id in mem::take(&mut self.children) {
            if let Some(child) = self.slots[id.idx()].child.take() {
                self.free_list.push(id.idx());
                self.index.remove(child.index_key);
            }
        }
        self.invalidate();
    }

    // --- stacking ---

    /// Move a figure to the front of its layer. No-op when absent. Fires a
    /// `Changed` event over the figure's area: stacking changed even though
    /// geometry did not.
    pub fn bring_to_front(&mut self, id: FigureId) {
        let Some(pos) = self.index_of(id) else {
            return;
        };
        self.children.remove(pos);
        self.children.push(id);
        let area = self.area_of(id);
        self.listeners.emit(&DrawingEvent::Changed { area });
    }

    /// Move a figure to the back of its layer. No-op when absent.
    pub fn send_to_back(&mut self, id: FigureId) {
        let Some(pos) = self.index_of(id) else {
            return;
        };
        self.children.remove(pos);
        self.children.insert(0, id);
        let area = self.area_of(id);
        self.listeners.emit(&DrawingEvent::Changed { area });
    }

    /// Change a figure's layer through the usual update bracket.
    pub fn set_layer(&mut self, id: FigureId, layer: i32) {
        self.update_figure(id, |f| f.core_mut().set_layer(layer));
    }

    // --- mutation ---

    /// Mutate a figure inside its change bracket. The drawing reacts to the
    /// committed change: index re-sync, cache invalidation, and one
    /// `Changed` event (deferred and coalesced while a drawing-level bracket
    /// is open). Returns `None` for a dangling id.
    pub fn update_figure<R>(
        &mut self,
        id: FigureId,
        f: impl FnOnce(&mut dyn Figure) -> R,
    ) -> Option<R> {
        let child = self.child_mut(id)?;
        let figure = &mut *child.figure;
        figure.will_change();
        let out = f(&mut *figure);
        let change = figure.changed();
        if let Some(change) = change {
            self.note_figure_changed(id, change.invalidated);
        }
        Some(out)
    }

    /// Open (or nest into) a drawing-level change bracket.
    pub fn will_change(&mut self) {
        if self.changing_depth == 0 {
            self.pending_damage = Some(self.drawing_area());
            self.invalidate();
        }
        self.changing_depth += 1;
    }

    /// Close a drawing-level change bracket. The outermost close re-syncs
    /// deferred index entries, revalidates the aggregate area, and fires one
    /// coalesced `Changed` event covering everything the batch touched.
    ///
    /// # Panics
    ///
    /// Panics when no bracket is open.
    pub fn changed(&mut self) {
        assert!(
            self.changing_depth > 0,
            "changed() called without a matching will_change()"
        );
        self.changing_depth -= 1;
        if self.changing_depth > 0 {
            return;
        }
        for id in mem::take(&mut self.deferred_sync) {
            self.sync_index_entry(id);
        }
        self.invalidate();
        let fresh = self.drawing_area();
        let area = match self.pending_damage.take() {
            Some(damage) => damage.union(fresh),
            None => fresh,
        };
        self.listeners.emit(&DrawingEvent::Changed { area });
    }

    /// True while a drawing-level bracket is open.
    pub fn is_changing(&self) -> bool {
        self.changing_depth != 0
    }

    // --- geometry ---

    /// Union of all children's drawing areas. Cached; invalidated by any
    /// bounds-affecting change and lazily recomputed here. Returns a copy —
    /// mutating the result cannot corrupt the cache.
    pub fn drawing_area(&self) -> Rect {
        if let Some(cached) = self.cached_drawing_area.get() {
            return cached;
        }
        let area = self
            .children
            .iter()
            .filter_map(|id| self.child(*id))
            .map(|c| c.figure.drawing_area())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        self.cached_drawing_area.set(Some(area));
        area
    }

    // --- queries ---

    /// Topmost visible figure whose precise shape contains `p`, with a hit
    /// tolerance constant in screen pixels (`scale_denominator` is the view
    /// scale). Ties within a layer go to the most recently stacked figure.
    pub fn find_figure(&self, p: Point, scale_denominator: f64) -> Option<FigureId> {
        self.find_figure_except(p, scale_denominator, &[])
    }

    /// Like [`find_figure`](Self::find_figure), skipping the `ignore` set —
    /// tools use this to pick through the figure they are dragging.
    pub fn find_figure_except(
        &self,
        p: Point,
        scale_denominator: f64,
        ignore: &[FigureId],
    ) -> Option<FigureId> {
        let candidates = self.candidates_back_to_front(self.tolerance_rect(p, scale_denominator));
        candidates
            .iter()
            .rev()
            .copied()
            .find(|id| !ignore.contains(id) && self.hits_precisely(*id, p, scale_denominator))
    }

    /// The next hit below `behind` at `p`, for picking occluded figures.
    pub fn find_figure_behind(
        &self,
        p: Point,
        scale_denominator: f64,
        behind: FigureId,
    ) -> Option<FigureId> {
        let candidates = self.candidates_back_to_front(self.tolerance_rect(p, scale_denominator));
        let mut seen = false;
        for id in candidates.iter().rev().copied() {
            if seen && self.hits_precisely(id, p, scale_denominator) {
                return Some(id);
            }
            seen |= id == behind;
        }
        None
    }

    /// All figures whose indexed areas intersect `rect`, front to back.
    /// Zero or one result skips the sort; two or more are ordered by
    /// descending layer with a stable sort, so layer ties keep their
    /// stacking order.
    pub fn find_figures(&self, rect: Rect) -> Vec<FigureId> {
        let mut out = self.candidates_in_stack_order(
            self.index
                .query_rect(rect_to_aabb(rect))
                .map(|(_, id)| id)
                .collect(),
        );
        if out.len() >= 2 {
            out.sort_by(|a, b| self.layer_of(*b).cmp(&self.layer_of(*a)));
        }
        out
    }

    /// Visible figures whose bounds lie fully inside `rect`, in stacking
    /// order; the marquee-selection query.
    pub fn find_figures_within(&self, rect: Rect) -> Vec<FigureId> {
        let candidates = self.candidates_in_stack_order(
            self.index
                .query_rect(rect_to_aabb(rect))
                .map(|(_, id)| id)
                .collect(),
        );
        candidates
            .into_iter()
            .filter(|id| {
                self.child(*id).is_some_and(|c| {
                    let b = c.figure.bounds();
                    c.figure.is_visible()
                        && rect.x0 <= b.x0
                        && rect.y0 <= b.y0
                        && b.x1 <= rect.x1
                        && b.y1 <= rect.y1
                })
            })
            .collect()
    }

    /// All figures front to back: descending layer, most recently stacked
    /// first within a layer.
    pub fn figures_front_to_back(&self) -> Vec<FigureId> {
        let mut ids = self.children.clone();
        ids.sort_by_key(|id| self.layer_of(*id));
        ids.reverse();
        ids
    }

    // --- rendering ---

    /// Draw back to front (ascending layer, stacking order within a layer),
    /// restricted to figures whose indexed areas intersect `clip` when one
    /// is given. Invisible figures are skipped.
    pub fn draw(&self, renderer: &mut dyn Renderer, clip: Option<Rect>) {
        let mut order = match clip {
            Some(clip) => self.candidates_in_stack_order(
                self.index
                    .query_rect(rect_to_aabb(clip))
                    .map(|(_, id)| id)
                    .collect(),
            ),
            None => self.children.clone(),
        };
        order.sort_by_key(|id| self.layer_of(*id));
        for id in order {
            if let Some(child) = self.child(id)
                && child.figure.is_visible()
            {
                child.figure.draw(renderer);
            }
        }
    }

    /// Fill the canvas background, when a canvas size is set. Views call
    /// this before [`draw`](Self::draw).
    pub fn draw_canvas(&self, renderer: &mut dyn Renderer) {
        let width = self.attrs.get(&CANVAS_WIDTH);
        let height = self.attrs.get(&CANVAS_HEIGHT);
        if width > 0.0 && height > 0.0 {
            renderer.fill_rect(
                Rect::new(0.0, 0.0, width, height),
                self.attrs.get(&CANVAS_FILL_COLOR),
            );
        }
    }

    // --- attributes ---

    /// The drawing's own attributes (canvas size, canvas fill, …).
    pub fn attributes(&self) -> &AttributeStore {
        &self.attrs
    }

    /// Read a drawing attribute; total, defaults for unset keys.
    pub fn get_attr<T: AttributeValue>(&self, key: &AttributeKey<T>) -> T {
        self.attrs.get(key)
    }

    /// Set a drawing attribute and fire [`DrawingEvent::AttributeChanged`].
    /// Fires even when the value is unchanged.
    pub fn set_attr<T: AttributeValue>(&mut self, key: &AttributeKey<T>, value: T) {
        let old = self.attrs.get(key).into_value();
        self.attrs.set(key, value);
        self.listeners.emit(&DrawingEvent::AttributeChanged {
            key: key.id,
            old,
            new: value.into_value(),
        });
    }

    /// Set the UI-editability hint for a drawing attribute.
    pub fn set_attr_enabled<T>(&mut self, key: &AttributeKey<T>, enabled: bool) {
        self.attrs.set_enabled(key, enabled);
    }

    // --- listeners ---

    /// Register for region-invalidation and topology events.
    pub fn add_drawing_listener(
        &mut self,
        callback: impl FnMut(&DrawingEvent) + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    /// Drop a drawing listener.
    pub fn remove_drawing_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Register for re-broadcast undo records.
    pub fn add_undoable_edit_listener(
        &mut self,
        callback: impl FnMut(&(dyn UndoableEdit + 'static)) + 'static,
    ) -> ListenerId {
        self.undo_listeners.subscribe(callback)
    }

    /// Drop an undo listener.
    pub fn remove_undoable_edit_listener(&mut self, id: ListenerId) -> bool {
        self.undo_listeners.unsubscribe(id)
    }

    /// Re-broadcast an edit record produced by the command layer. The
    /// drawing does not inspect it.
    pub fn fire_undoable_edit(&mut self, edit: &(dyn UndoableEdit + 'static)) {
        self.undo_listeners.emit(edit);
    }

    // --- formats ---

    /// Register an input format.
    ///
    /// # Panics
    ///
    /// Panics when a format with the same id is already registered — a
    /// configuration error, not a runtime condition.
    pub fn add_input_format(&mut self, format: Box<dyn InputFormat>) {
        assert!(
            self.input_formats.iter().all(|f| f.id() != format.id()),
            "duplicate input format `{}`",
            format.id()
        );
        self.input_formats.push(format);
    }

    /// Register an output format.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate id, like [`add_input_format`](Self::add_input_format).
    pub fn add_output_format(&mut self, format: Box<dyn OutputFormat>) {
        assert!(
            self.output_formats.iter().all(|f| f.id() != format.id()),
            "duplicate output format `{}`",
            format.id()
        );
        self.output_formats.push(format);
    }

    /// Deregister an input format by id. False when absent.
    pub fn remove_input_format(&mut self, id: &str) -> bool {
        let before = self.input_formats.len();
        self.input_formats.retain(|f| f.id() != id);
        self.input_formats.len() != before
    }

    /// Deregister an output format by id. False when absent.
    pub fn remove_output_format(&mut self, id: &str) -> bool {
        let before = self.output_formats.len();
        self.output_formats.retain(|f| f.id() != id);
        self.output_formats.len() != before
    }

    /// Registered input formats, in registration order.
    pub fn input_formats(&self) -> &[Box<dyn InputFormat>] {
        &self.input_formats
    }

    /// Registered output formats, in registration order.
    pub fn output_formats(&self) -> &[Box<dyn OutputFormat>] {
        &self.output_formats
    }

    /// Parse `data` with the registered format `format_id` and add the
    /// resulting figures. All-or-nothing: a failed parse adds nothing.
    pub fn read_from(&mut self, format_id: &str, data: &[u8]) -> Result<Vec<FigureId>, FormatError> {
        let figures = {
            let format = self
                .input_formats
                .iter()
                .find(|f| f.id() == format_id)
                .ok_or_else(|| FormatError::new("unknown input format"))?;
            format.read(data)?
        };
        Ok(self.add_all(figures))
    }

    /// Serialize through the registered format `format_id`.
    pub fn write_to(&self, format_id: &str) -> Result<Vec<u8>, FormatError> {
        let format = self
            .output_formats
            .iter()
            .find(|f| f.id() == format_id)
            .ok_or_else(|| FormatError::new("unknown output format"))?;
        format.write(self)
    }

    // --- internals ---

    fn child(&self, id: FigureId) -> Option<&Child> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.child.as_ref()
    }

    fn child_mut(&mut self, id: FigureId) -> Option<&mut Child> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.child.as_mut()
    }

    fn area_of(&self, id: FigureId) -> Rect {
        self.child(id)
            .map(|c| c.figure.drawing_area())
            .unwrap_or(Rect::ZERO)
    }

    fn layer_of(&self, id: FigureId) -> i32 {
        self.child(id).map(|c| c.figure.layer()).unwrap_or(0)
    }

    fn tolerance_rect(&self, p: Point, scale_denominator: f64) -> Rect {
        let tolerance = HIT_HANDLE_SIZE / 2.0 / scale_denominator;
        Rect::new(
            p.x - tolerance,
            p.y - tolerance,
            p.x + tolerance,
            p.y + tolerance,
        )
    }

    fn hits_precisely(&self, id: FigureId, p: Point, scale_denominator: f64) -> bool {
        self.child(id)
            .is_some_and(|c| c.figure.is_visible() && c.figure.contains_point(p, scale_denominator))
    }

    /// Index candidates for `probe`, ordered back to front.
    fn candidates_back_to_front(&self, probe: Rect) -> Vec<FigureId> {
        let mut out = self.candidates_in_stack_order(
            self.index
                .query_rect(rect_to_aabb(probe))
                .map(|(_, id)| id)
                .collect(),
        );
        out.sort_by_key(|id| self.layer_of(*id));
        out
    }

    /// Filter the stacking order down to `hits`, preserving its order.
    fn candidates_in_stack_order(&self, hits: BTreeSet<FigureId>) -> Vec<FigureId> {
        self.children
            .iter()
            .copied()
            .filter(|id| hits.contains(id))
            .collect()
    }

    /// React to a figure's committed change: defer while a drawing bracket
    /// is open, otherwise re-sync and notify immediately.
    fn note_figure_changed(&mut self, id: FigureId, invalidated: Rect) {
        self.invalidate();
        if self.is_changing() {
            self.pending_damage = Some(match self.pending_damage {
                Some(damage) => damage.union(invalidated),
                None => invalidated,
            });
            if !self.deferred_sync.contains(&id) {
                self.deferred_sync.push(id);
            }
        } else {
            self.sync_index_entry(id);
            self.listeners
                .emit(&DrawingEvent::Changed { area: invalidated });
        }
    }

    /// Refresh one figure's index entry from its current drawing area.
    fn sync_index_entry(&mut self, id: FigureId) {
        let Some(child) = self.child(id) else {
            return;
        };
        let key = child.index_key;
        let area = child.figure.drawing_area();
        self.index.update(key, rect_to_aabb(area));
    }

    fn invalidate(&self) {
        self.cached_drawing_area.set(None);
    }
}
