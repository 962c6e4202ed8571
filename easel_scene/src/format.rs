// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reader/writer strategy interfaces.
//!
//! Concrete formats (SVG, XML, clipboard flavors) live outside this crate.
//! They interact with a drawing only through its public mutation surface:
//! a reader produces a *complete* batch of figures which the drawing inserts
//! via `add_all` on success, so a failed parse never leaves half-constructed
//! figures behind.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::drawing::Drawing;
use crate::figure::Figure;

/// Failure while parsing or serializing a drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Human-readable reason.
    pub reason: String,
}

impl FormatError {
    /// A format error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format error: {}", self.reason)
    }
}

impl core::error::Error for FormatError {}

/// A strategy that parses serialized content into figures.
pub trait InputFormat {
    /// Stable identifier, unique among a drawing's registered input formats.
    fn id(&self) -> &str;

    /// Parse `data` into a complete batch of figures, or fail without
    /// side effects.
    fn read(&self, data: &[u8]) -> Result<Vec<Box<dyn Figure>>, FormatError>;
}

/// A strategy that serializes a drawing's figures.
pub trait OutputFormat {
    /// Stable identifier, unique among a drawing's registered output formats.
    fn id(&self) -> &str;

    /// Serialize the drawing's children.
    fn write(&self, drawing: &Drawing) -> Result<Vec<u8>, FormatError>;
}
