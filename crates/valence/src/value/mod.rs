//! Value representation for runtime values
//!
//! Every expression the interpreter evaluates produces a [`Value`]: a shared
//! handle to a [`ValueData`] of one fixed [`ValueKind`]. Each kind comes in
//! two representations, a singleton holding exactly one datum inline and a
//! growable vector whose buffer is drawn from the process-wide arena.
//!
//! Reads are always allowed through the shared handle. Writes need a
//! `&mut ValueData`, which [`Value`] only hands out when the handle is the
//! sole owner of its data.

mod access;
mod constants;
mod display;
mod impls;
mod kind;
mod mutate;
mod refs;
mod storage;

pub use constants::{constants, Constants};
pub use display::format_float;
pub use kind::{ValueKind, ValueMask};
pub use refs::{StaticValue, Value};

pub(crate) use storage::{ObjectPayload, Payload, Storage};

use std::sync::Arc;

use crate::object::ObjectClass;
use crate::shape::Dimensions;

/// The data behind a [`Value`] handle.
///
/// Kind and singleton-ness are fixed when the data is built. The invisible
/// flag is a display hint only, and the optional shape turns the value into
/// a matrix or array without changing its element storage.
pub struct ValueData {
    pub(crate) payload: Payload,
    pub(crate) invisible: bool,
    pub(crate) dims: Option<Dimensions>,
}

impl ValueData {
    pub(crate) fn from_payload(payload: Payload) -> Self {
        Self {
            payload,
            invisible: false,
            dims: None,
        }
    }

    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        self.payload.kind()
    }

    /// Number of elements. Void and NULL have none.
    pub fn count(&self) -> usize {
        self.payload.len()
    }

    /// Whether the value has no elements.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether this is the one-element, non-growable representation.
    pub fn is_singleton(&self) -> bool {
        self.payload.is_singleton()
    }

    /// Element class of an object value.
    ///
    /// `None` for every other kind, and for an object vector that is empty
    /// and has never been given a class.
    pub fn class(&self) -> Option<&Arc<ObjectClass>> {
        match &self.payload {
            Payload::Object(o) => o.class.as_ref(),
            _ => None,
        }
    }

    /// Whether object elements are held under retain/release.
    ///
    /// Always `false` for non-object kinds.
    pub fn uses_retain_release(&self) -> bool {
        match &self.payload {
            Payload::Object(o) => o.retained,
            _ => false,
        }
    }

    /// The element type name: the class name for objects, else the kind name.
    pub fn element_type(&self) -> &str {
        match self.class() {
            Some(class) => class.name(),
            None => self.kind().name(),
        }
    }

    /// Whether the value should be suppressed when echoed at top level.
    pub fn invisible(&self) -> bool {
        self.invisible
    }

    /// Set or clear the display-suppression hint.
    pub fn set_invisible(&mut self, invisible: bool) {
        self.invisible = invisible;
    }
}

impl Clone for ValueData {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.deep_copy(),
            invisible: self.invisible,
            dims: self.dims.clone(),
        }
    }
}

impl Drop for ValueData {
    fn drop(&mut self) {
        self.payload.recycle();
    }
}
