// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed attribute keys and the per-figure/per-drawing attribute store.
//!
//! Attribute reads are total: an unset key yields the key's default, so
//! there is no "attribute missing" error anywhere in the crate. Writes fire
//! the store's change callback on *every* `set`, including no-op sets where
//! the old and new value compare equal; consumers that care must deduplicate
//! themselves.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use core::fmt::Debug;

use crate::types::Color;

/// Stored attribute value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean attribute, e.g. whether a shape is filled.
    Bool(bool),
    /// Scalar attribute, e.g. a stroke width.
    Scalar(f64),
    /// Color attribute.
    Color(Color),
}

/// Conversion between typed attribute values and the stored [`Value`].
pub trait AttributeValue: Copy {
    /// Wrap into the stored representation.
    fn into_value(self) -> Value;

    /// Extract from the stored representation; `None` on a variant mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

impl AttributeValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl AttributeValue for f64 {
    fn into_value(self) -> Value {
        Value::Scalar(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Scalar(s) => Some(*s),
            _ => None,
        }
    }
}

impl AttributeValue for Color {
    fn into_value(self) -> Value {
        Value::Color(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// A typed attribute key with a default value.
///
/// Keys are compared by id; the type parameter fixes what [`AttributeStore::get`]
/// and [`AttributeStore::set`] accept for this key.
#[derive(Copy, Clone, Debug)]
pub struct AttributeKey<T> {
    /// Stable identifier, unique within a store.
    pub id: &'static str,
    /// Value reported for an unset key.
    pub default: T,
}

impl<T> AttributeKey<T> {
    /// Create a key with its default value.
    pub const fn new(id: &'static str, default: T) -> Self {
        Self { id, default }
    }
}

/// Interior fill color of a shape.
pub const FILL_COLOR: AttributeKey<Color> = AttributeKey::new("fill-color", Color::WHITE);
/// Outline color of a shape.
pub const STROKE_COLOR: AttributeKey<Color> = AttributeKey::new("stroke-color", Color::BLACK);
/// Outline width in drawing units. Zero disables the outline.
pub const STROKE_WIDTH: AttributeKey<f64> = AttributeKey::new("stroke-width", 1.0);
/// Whether a shape paints its interior.
pub const FILLED: AttributeKey<bool> = AttributeKey::new("filled", true);
/// Uniform gap between a figure and its decorator, in drawing units.
pub const DECORATOR_INSET: AttributeKey<f64> = AttributeKey::new("decorator-inset", 4.0);
/// Canvas width of a drawing, in drawing units.
pub const CANVAS_WIDTH: AttributeKey<f64> = AttributeKey::new("canvas-width", 0.0);
/// Canvas height of a drawing, in drawing units.
pub const CANVAS_HEIGHT: AttributeKey<f64> = AttributeKey::new("canvas-height", 0.0);
/// Background color of a drawing's canvas.
pub const CANVAS_FILL_COLOR: AttributeKey<Color> =
    AttributeKey::new("canvas-fill-color", Color::WHITE);

/// Change callback invoked with (key id, old value, new value) on every set.
pub type AttributeCallback = Box<dyn FnMut(&'static str, &Value, &Value)>;

/// Typed key/value store with change notification.
pub struct AttributeStore {
    values: BTreeMap<&'static str, Value>,
    disabled: BTreeSet<&'static str>,
    on_change: Option<AttributeCallback>,
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for AttributeStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeStore")
            .field("values", &self.values)
            .field("disabled", &self.disabled)
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

impl AttributeStore {
    /// Create an empty store with no change callback.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            disabled: BTreeSet::new(),
            on_change: None,
        }
    }

    /// Create an empty store that reports every set to `callback`.
    pub fn with_callback(callback: AttributeCallback) -> Self {
        Self {
            on_change: Some(callback),
            ..Self::new()
        }
    }

    /// Read an attribute; the key's default if unset. Total — never fails.
    pub fn get<T: AttributeValue>(&self, key: &AttributeKey<T>) -> T {
        self.values
            .get(key.id)
            .and_then(T::from_value)
            .unwrap_or(key.default)
    }

    /// Store an attribute, then invoke the change callback with the old and
    /// new value. The callback fires even when the two are equal.
    pub fn set<T: AttributeValue>(&mut self, key: &AttributeKey<T>, value: T) {
        let old = self
            .values
            .get(key.id)
            .copied()
            .unwrap_or_else(|| key.default.into_value());
        let new = value.into_value();
        self.values.insert(key.id, new);
        if let Some(callback) = self.on_change.as_mut() {
            callback(key.id, &old, &new);
        }
    }

    /// Whether a UI should offer editing for this key. Does not affect
    /// `get`/`set`.
    pub fn is_enabled<T>(&self, key: &AttributeKey<T>) -> bool {
        !self.disabled.contains(key.id)
    }

    /// Set the UI-editability hint for this key.
    pub fn set_enabled<T>(&mut self, key: &AttributeKey<T>, enabled: bool) {
        if enabled {
            self.disabled.remove(key.id);
        } else {
            self.disabled.insert(key.id);
        }
    }

    /// Independent copy bound to a new callback, so the copy's mutations
    /// route to the copy's own notification path.
    pub fn clone_with(&self, callback: AttributeCallback) -> Self {
        Self {
            values: self.values.clone(),
            disabled: self.disabled.clone(),
            on_change: Some(callback),
        }
    }
}

impl Clone for AttributeStore {
    /// Clones values and enabled flags; the copy starts with no callback.
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            disabled: self.disabled.clone(),
            on_change: None,
        }
    }
}
