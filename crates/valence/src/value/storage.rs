//! Payload storage: the singleton/vector duality for each kind

use std::sync::Arc;

use crate::arena::{self, Pooled};
use crate::object::{ElementRef, ObjectClass};

use super::ValueKind;

/// Element storage for one kind.
///
/// A singleton holds its single datum inline and can never grow; a vector
/// owns a growable buffer drawn from the arena. The variant is chosen at
/// construction and never changes.
#[derive(Debug)]
pub(crate) enum Storage<T> {
    Singleton(T),
    Vector(Vec<T>),
}

impl<T> Storage<T> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Storage::Singleton(_) => 1,
            Storage::Vector(v) => v.len(),
        }
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        match self {
            Storage::Singleton(v) => std::slice::from_ref(v),
            Storage::Vector(v) => v.as_slice(),
        }
    }

    pub(crate) fn is_singleton(&self) -> bool {
        matches!(self, Storage::Singleton(_))
    }

    pub(crate) fn as_vec_mut(&mut self) -> Option<&mut Vec<T>> {
        match self {
            Storage::Singleton(_) => None,
            Storage::Vector(v) => Some(v),
        }
    }
}

impl<T: Pooled + Clone> Storage<T> {
    /// Copy the elements into a fresh arena buffer.
    pub(crate) fn to_pooled_vec(&self) -> Vec<T> {
        let slice = self.as_slice();
        let mut buf = arena::acquire::<T>(slice.len());
        buf.extend_from_slice(slice);
        buf
    }

    /// Deep copy preserving the singleton/vector variant.
    pub(crate) fn deep_copy(&self) -> Self {
        match self {
            Storage::Singleton(v) => Storage::Singleton(v.clone()),
            Storage::Vector(_) => Storage::Vector(self.to_pooled_vec()),
        }
    }

    /// Deep copy that is always vector-backed.
    pub(crate) fn vector_copy(&self) -> Self {
        Storage::Vector(self.to_pooled_vec())
    }
}

impl<T: Pooled> Storage<T> {
    /// Hand the buffer back to the arena.
    pub(crate) fn recycle(&mut self) {
        if let Storage::Vector(v) = self {
            arena::release(std::mem::take(v));
        }
    }
}

/// Object elements plus the cached class information.
#[derive(Debug)]
pub(crate) struct ObjectPayload {
    /// Element class; `None` only while the value is empty and untyped
    pub(crate) class: Option<Arc<ObjectClass>>,

    /// Cached `class.uses_retain_release()`
    pub(crate) retained: bool,

    pub(crate) elements: Storage<ElementRef>,
}

impl ObjectPayload {
    pub(crate) fn new(class: Option<Arc<ObjectClass>>, elements: Storage<ElementRef>) -> Self {
        let retained = class
            .as_ref()
            .map(|c| c.uses_retain_release())
            .unwrap_or(true);
        Self {
            class,
            retained,
            elements,
        }
    }

    pub(crate) fn copy_with(&self, elements: Storage<ElementRef>) -> Self {
        Self {
            class: self.class.clone(),
            retained: self.retained,
            elements,
        }
    }
}

/// The kind-specific payload of a value.
#[derive(Debug)]
pub(crate) enum Payload {
    Void,
    Null,
    Logical(Storage<bool>),
    Int(Storage<i64>),
    Float(Storage<f64>),
    String(Storage<String>),
    Object(ObjectPayload),
}

impl Payload {
    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            Payload::Void => ValueKind::Void,
            Payload::Null => ValueKind::Null,
            Payload::Logical(_) => ValueKind::Logical,
            Payload::Int(_) => ValueKind::Int,
            Payload::Float(_) => ValueKind::Float,
            Payload::String(_) => ValueKind::String,
            Payload::Object(_) => ValueKind::Object,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Payload::Void | Payload::Null => 0,
            Payload::Logical(s) => s.len(),
            Payload::Int(s) => s.len(),
            Payload::Float(s) => s.len(),
            Payload::String(s) => s.len(),
            Payload::Object(o) => o.elements.len(),
        }
    }

    pub(crate) fn is_singleton(&self) -> bool {
        match self {
            Payload::Void | Payload::Null => false,
            Payload::Logical(s) => s.is_singleton(),
            Payload::Int(s) => s.is_singleton(),
            Payload::Float(s) => s.is_singleton(),
            Payload::String(s) => s.is_singleton(),
            Payload::Object(o) => o.elements.is_singleton(),
        }
    }

    /// An empty vector payload of `kind`, with room for `capacity` elements.
    pub(crate) fn empty_vector(kind: ValueKind, capacity: usize) -> Self {
        match kind {
            ValueKind::Void => Payload::Void,
            ValueKind::Null => Payload::Null,
            ValueKind::Logical => Payload::Logical(Storage::Vector(arena::acquire(capacity))),
            ValueKind::Int => Payload::Int(Storage::Vector(arena::acquire(capacity))),
            ValueKind::Float => Payload::Float(Storage::Vector(arena::acquire(capacity))),
            ValueKind::String => Payload::String(Storage::Vector(arena::acquire(capacity))),
            ValueKind::Object => Payload::Object(ObjectPayload::new(
                None,
                Storage::Vector(arena::acquire(capacity)),
            )),
        }
    }

    pub(crate) fn deep_copy(&self) -> Self {
        match self {
            Payload::Void => Payload::Void,
            Payload::Null => Payload::Null,
            Payload::Logical(s) => Payload::Logical(s.deep_copy()),
            Payload::Int(s) => Payload::Int(s.deep_copy()),
            Payload::Float(s) => Payload::Float(s.deep_copy()),
            Payload::String(s) => Payload::String(s.deep_copy()),
            Payload::Object(o) => Payload::Object(o.copy_with(o.elements.deep_copy())),
        }
    }

    pub(crate) fn vector_copy(&self) -> Self {
        match self {
            Payload::Void => Payload::Void,
            Payload::Null => Payload::Null,
            Payload::Logical(s) => Payload::Logical(s.vector_copy()),
            Payload::Int(s) => Payload::Int(s.vector_copy()),
            Payload::Float(s) => Payload::Float(s.vector_copy()),
            Payload::String(s) => Payload::String(s.vector_copy()),
            Payload::Object(o) => Payload::Object(o.copy_with(o.elements.vector_copy())),
        }
    }

    pub(crate) fn recycle(&mut self) {
        match self {
            Payload::Void | Payload::Null => {}
            Payload::Logical(s) => s.recycle(),
            Payload::Int(s) => s.recycle(),
            Payload::Float(s) => s.recycle(),
            Payload::String(s) => s.recycle(),
            Payload::Object(o) => o.elements.recycle(),
        }
    }
}
