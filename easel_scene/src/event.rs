// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener registry and change-notification event types.
//!
//! Listeners are stored in a slot arena keyed by generational
//! [`ListenerId`]s: `subscribe` returns a handle, `unsubscribe` takes it
//! back. There are no weak references — owners are expected to unsubscribe
//! explicitly when they go away.
//!
//! Dispatch is synchronous. Callbacks receive a shared reference to the
//! event and nothing else, so a callback can never re-enter the object that
//! fired it; re-entrancy safety is structural rather than flag-guarded.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::Rect;

use crate::attr::Value;
use crate::types::FigureId;

/// Generational handle for a registered listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(u32, u32);

impl ListenerId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "ListenerId uses 32-bit indices by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

struct ListenerSlot<E: ?Sized> {
    generation: u32,
    callback: Option<Box<dyn FnMut(&E)>>,
}

/// Registry of callbacks for one event type.
pub struct Listeners<E: ?Sized> {
    slots: Vec<ListenerSlot<E>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<E: ?Sized> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Debug for Listeners<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len)
            .field("total_slots", &self.slots.len())
            .finish()
    }
}

impl<E: ?Sized> Listeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Register a callback; the returned handle unsubscribes it.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> ListenerId {
        let callback: Box<dyn FnMut(&E)> = Box::new(callback);
        self.len += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation += 1;
            slot.callback = Some(callback);
            ListenerId::new(idx, slot.generation)
        } else {
            self.slots.push(ListenerSlot {
                generation: 1,
                callback: Some(callback),
            });
            ListenerId::new(self.slots.len() - 1, 1)
        }
    }

    /// Drop a callback. Returns false if the handle was stale.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(slot) = self.slots.get_mut(id.idx()) else {
            return false;
        };
        if slot.generation != id.1 || slot.callback.is_none() {
            return false;
        }
        slot.callback = None;
        self.free_list.push(id.idx());
        self.len -= 1;
        true
    }

    /// Invoke every registered callback with `event`, in subscription order.
    pub fn emit(&mut self, event: &E) {
        for slot in &mut self.slots {
            if let Some(callback) = slot.callback.as_mut() {
                callback(event);
            }
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Event fired by a figure when a bracketed mutation commits.
#[derive(Clone, Debug, PartialEq)]
pub enum FigureEvent {
    /// A committed mutation. `invalidated` is the union of the drawing areas
    /// before and after the change, i.e. the minimal region to repaint.
    Changed {
        /// Union of the before/after drawing areas.
        invalidated: Rect,
    },
    /// An attribute was set. Fires even when the value did not change.
    AttributeChanged {
        /// Attribute key id.
        key: &'static str,
        /// Previously stored (or default) value.
        old: Value,
        /// Newly stored value.
        new: Value,
    },
}

/// Event fired by a [`Drawing`](crate::drawing::Drawing).
#[derive(Clone, Debug, PartialEq)]
pub enum DrawingEvent {
    /// A figure joined the drawing.
    FigureAdded {
        /// The new child.
        figure: FigureId,
        /// Its position in the child sequence.
        index: usize,
        /// The child's drawing area (the region to repaint).
        area: Rect,
    },
    /// A figure left the drawing.
    FigureRemoved {
        /// The removed child; the id is dangling from now on.
        figure: FigureId,
        /// The position it occupied.
        index: usize,
        /// The region it used to cover.
        area: Rect,
    },
    /// Content changed; repaint `area`. Batched mutations coalesce into a
    /// single event covering the union of everything they touched.
    Changed {
        /// Region to repaint.
        area: Rect,
    },
    /// A drawing-level attribute was set. Fires even on no-op sets.
    AttributeChanged {
        /// Attribute key id.
        key: &'static str,
        /// Previously stored (or default) value.
        old: Value,
        /// Newly stored value.
        new: Value,
    },
}

/// An opaque undo/redo record.
///
/// The scene graph re-broadcasts edits produced by the command layer; it
/// neither constructs nor inspects them.
pub trait UndoableEdit: Debug {
    /// Human-readable name for undo menus.
    fn presentation_name(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let hits: Rc<RefCell<u32>> = Rc::default();
        let mut listeners: Listeners<u32> = Listeners::new();

        let sink = hits.clone();
        let id = listeners.subscribe(move |n| {
            *sink.borrow_mut() += *n;
        });
        assert_eq!(listeners.len(), 1);

        listeners.emit(&2);
        listeners.emit(&3);
        assert_eq!(*hits.borrow(), 5);

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id), "second unsubscribe is stale");
        listeners.emit(&100);
        assert_eq!(*hits.borrow(), 5, "unsubscribed callback stays silent");
        assert!(listeners.is_empty());
    }

    #[test]
    fn stale_handles_do_not_hit_reused_slots() {
        let mut listeners: Listeners<u32> = Listeners::new();
        let first = listeners.subscribe(|_| {});
        listeners.unsubscribe(first);
        let second = listeners.subscribe(|_| {});
        assert_ne!(first, second);
        assert!(!listeners.unsubscribe(first));
        assert!(listeners.unsubscribe(second));
    }

    #[test]
    fn emit_reaches_listeners_in_subscription_order() {
        let order: Rc<RefCell<alloc::vec::Vec<u8>>> = Rc::default();
        let mut listeners: Listeners<()> = Listeners::new();
        for tag in 0..3_u8 {
            let sink = order.clone();
            listeners.subscribe(move |()| sink.borrow_mut().push(tag));
        }
        listeners.emit(&());
        assert_eq!(*order.borrow(), [0, 1, 2]);
    }
}
