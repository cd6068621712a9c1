//! Constructors, copies and trait implementations for values

use std::sync::Arc;

use crate::arena::{self, Pooled};
use crate::error::{Result, ValueError};
use crate::object::{ElementRef, ObjectClass, ObjectElement};
use crate::token::Token;

use super::*;

fn pooled<T: Pooled>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let iter = values.into_iter();
    let mut buf = arena::acquire(iter.size_hint().0);
    buf.extend(iter);
    buf
}

// ═══════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// The void value.
    pub fn void() -> Value {
        constants().void.value()
    }

    /// `NULL`.
    pub fn null() -> Value {
        constants().null.value()
    }

    /// `NULL` that is not echoed at top level.
    pub fn null_invisible() -> Value {
        constants().null_invisible.value()
    }

    /// The shared `T` or `F` constant.
    pub fn logical(value: bool) -> Value {
        let c = constants();
        if value {
            c.logical_true.value()
        } else {
            c.logical_false.value()
        }
    }

    /// An integer singleton.
    pub fn int(value: i64) -> Value {
        Value::new(ValueData::from_payload(Payload::Int(Storage::Singleton(
            value,
        ))))
    }

    /// A float singleton.
    pub fn float(value: f64) -> Value {
        Value::new(ValueData::from_payload(Payload::Float(Storage::Singleton(
            value,
        ))))
    }

    /// A string singleton.
    pub fn string(value: impl Into<String>) -> Value {
        Value::new(ValueData::from_payload(Payload::String(
            Storage::Singleton(value.into()),
        )))
    }

    /// A logical vector.
    pub fn logical_vec(values: impl IntoIterator<Item = bool>) -> Value {
        Value::new(ValueData::from_payload(Payload::Logical(Storage::Vector(
            pooled(values),
        ))))
    }

    /// An integer vector.
    pub fn int_vec(values: impl IntoIterator<Item = i64>) -> Value {
        Value::new(ValueData::from_payload(Payload::Int(Storage::Vector(
            pooled(values),
        ))))
    }

    /// A float vector.
    pub fn float_vec(values: impl IntoIterator<Item = f64>) -> Value {
        Value::new(ValueData::from_payload(Payload::Float(Storage::Vector(
            pooled(values),
        ))))
    }

    /// A string vector.
    pub fn string_vec<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Value {
        Value::new(ValueData::from_payload(Payload::String(Storage::Vector(
            pooled(values.into_iter().map(Into::into)),
        ))))
    }

    /// An object singleton referring to `element`.
    pub fn object(element: &Arc<dyn ObjectElement>) -> Value {
        let class = element.class().clone();
        let retain = class.uses_retain_release();
        Value::new(ValueData::from_payload(Payload::Object(ObjectPayload::new(
            Some(class),
            Storage::Singleton(ElementRef::new(element, retain)),
        ))))
    }

    /// An object vector. All elements must share one class.
    pub fn object_vec(elements: &[Arc<dyn ObjectElement>], token: Option<Token>) -> Result<Value> {
        let class = match elements.first() {
            Some(first) => first.class().clone(),
            None => return Ok(Value::with_capacity(ValueKind::Object, 0)),
        };
        let retain = class.uses_retain_release();

        let mut buf = arena::acquire::<ElementRef>(elements.len());
        for element in elements {
            if element.class().id() != class.id() {
                arena::release(buf);
                return Err(ValueError::Class {
                    message: format!(
                        "object vector elements must share one class; got {} and {}",
                        class.name(),
                        element.class().name()
                    ),
                    token,
                });
            }
            buf.push(ElementRef::new(element, retain));
        }

        Ok(Value::new(ValueData::from_payload(Payload::Object(
            ObjectPayload::new(Some(class), Storage::Vector(buf)),
        ))))
    }

    /// An empty object vector that already knows its element class.
    pub fn empty_object(class: &Arc<ObjectClass>) -> Value {
        Value::new(ValueData::from_payload(Payload::Object(ObjectPayload::new(
            Some(class.clone()),
            Storage::Vector(arena::acquire(0)),
        ))))
    }

    /// An empty, growable vector of `kind`. Void and NULL yield their constants.
    pub fn with_capacity(kind: ValueKind, capacity: usize) -> Value {
        match kind {
            ValueKind::Void => Value::void(),
            ValueKind::Null => Value::null(),
            _ => Value::new(ValueData::from_payload(Payload::empty_vector(
                kind, capacity,
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::logical(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

impl From<Vec<bool>> for Value {
    fn from(values: Vec<bool>) -> Self {
        Value::logical_vec(values)
    }
}

impl From<Vec<i64>> for Value {
    fn from(values: Vec<i64>) -> Self {
        Value::int_vec(values)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::float_vec(values)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::string_vec(values)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Copies
// ═══════════════════════════════════════════════════════════════════════

impl ValueData {
    /// An independent deep copy with the invisible flag cleared.
    ///
    /// Singleton-ness and shape are preserved. The result is uniquely owned,
    /// so it can be mutated once unwrapped with [`Value::get_mut`].
    pub fn copy_values(&self) -> Value {
        Value::new(ValueData {
            payload: self.payload.deep_copy(),
            invisible: false,
            dims: self.dims.clone(),
        })
    }

    /// Like [`ValueData::copy_values`], but the copy is always vector-backed.
    pub fn vector_based_copy(&self) -> Value {
        Value::new(self.vector_based_data())
    }

    pub(crate) fn vector_based_data(&self) -> ValueData {
        ValueData {
            payload: self.payload.vector_copy(),
            invisible: false,
            dims: self.dims.clone(),
        }
    }

    /// A deep copy flagged invisible.
    pub fn invisible_copy(&self) -> Value {
        Value::new(ValueData {
            payload: self.payload.deep_copy(),
            invisible: true,
            dims: self.dims.clone(),
        })
    }

    /// An empty vector of the same kind, and for objects the same class.
    pub fn new_matching_type(&self) -> Value {
        Value::new(self.matching_vector(0))
    }

    pub(crate) fn matching_vector(&self, capacity: usize) -> ValueData {
        let payload = match &self.payload {
            Payload::Object(o) => {
                Payload::Object(o.copy_with(Storage::Vector(arena::acquire(capacity))))
            }
            other => Payload::empty_vector(other.kind(), capacity),
        };
        ValueData::from_payload(payload)
    }

    /// The element at `idx` as a new singleton of the same kind.
    pub fn get_value_at(&self, idx: usize, token: Option<Token>) -> Result<Value> {
        self.check_index("get_value_at", idx, token)?;

        let value = match &self.payload {
            Payload::Logical(s) => Value::logical(s.as_slice()[idx]),
            Payload::Int(s) => Value::int(s.as_slice()[idx]),
            Payload::Float(s) => Value::float(s.as_slice()[idx]),
            Payload::String(s) => Value::string(s.as_slice()[idx].as_str()),
            Payload::Object(o) => Value::new(ValueData::from_payload(Payload::Object(
                o.copy_with(Storage::Singleton(o.elements.as_slice()[idx].clone())),
            ))),
            Payload::Void | Payload::Null => {
                return Err(ValueError::IndexOutOfRange {
                    operation: "get_value_at",
                    index: idx,
                    count: 0,
                    token,
                })
            }
        };
        Ok(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Equality
// ═══════════════════════════════════════════════════════════════════════

fn floats_identical(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}

/// Structural equality: same kind, same elements, same shape.
///
/// This is a storage comparison, not the script-level `==`: NaN elements
/// match each other, object elements match by identity, and the invisible
/// flag and singleton/vector representation are ignored.
impl PartialEq for ValueData {
    fn eq(&self, other: &Self) -> bool {
        if self.dims != other.dims {
            return false;
        }

        match (&self.payload, &other.payload) {
            (Payload::Void, Payload::Void) | (Payload::Null, Payload::Null) => true,
            (Payload::Logical(a), Payload::Logical(b)) => a.as_slice() == b.as_slice(),
            (Payload::Int(a), Payload::Int(b)) => a.as_slice() == b.as_slice(),
            (Payload::Float(a), Payload::Float(b)) => floats_identical(a.as_slice(), b.as_slice()),
            (Payload::String(a), Payload::String(b)) => a.as_slice() == b.as_slice(),
            (Payload::Object(a), Payload::Object(b)) => {
                let (a, b) = (a.elements.as_slice(), b.elements.as_slice());
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_element(y))
            }
            _ => false,
        }
    }
}
