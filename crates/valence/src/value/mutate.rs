//! In-place mutation of uniquely owned vector values
//!
//! Everything here takes `&mut ValueData`, which a [`Value`] only hands out
//! to its sole owner. Singletons have no growable buffer, so every method
//! that needs one fails on them with [`ValueError::SingletonMutation`].
//! Any mutation that changes the element count drops the value's shape.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{type_name, Result, ValueError};
use crate::object::{ElementRef, ObjectElement};
use crate::token::Token;

use super::*;

fn singleton_error(operation: &'static str, kind: ValueKind, token: Option<Token>) -> ValueError {
    ValueError::SingletonMutation {
        operation,
        kind: kind.name(),
        token,
    }
}

fn no_buffer(operation: &'static str, kind: ValueKind, token: Option<Token>) -> ValueError {
    ValueError::TypeMismatch {
        operation,
        expected: "a vector value".to_string(),
        got: kind.name().to_string(),
        token,
    }
}

fn kind_error(operation: &'static str, expected: ValueKind, got: ValueKind, token: Option<Token>) -> ValueError {
    ValueError::TypeMismatch {
        operation,
        expected: expected.name().to_string(),
        got: got.name().to_string(),
        token,
    }
}

/// Ascending float order with NaN after every number.
fn float_order(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}

fn sort_slice<T>(values: &mut [T], ascending: bool, order: impl Fn(&T, &T) -> Ordering) {
    if ascending {
        values.sort_by(|a, b| order(a, b));
    } else {
        values.sort_by(|a, b| order(b, a));
    }
}

impl ValueData {
    // ═══════════════════════════════════════════════════════════════════
    // Buffer handles
    // ═══════════════════════════════════════════════════════════════════

    fn buffer_mut<T>(
        &mut self,
        operation: &'static str,
        expected: ValueKind,
        select: fn(&mut Payload) -> Option<&mut Storage<T>>,
        token: Option<Token>,
    ) -> Result<&mut Vec<T>> {
        let kind = self.kind();
        match select(&mut self.payload) {
            Some(storage) => storage
                .as_vec_mut()
                .ok_or_else(|| singleton_error(operation, kind, token)),
            None => Err(kind_error(operation, expected, kind, token)),
        }
    }

    /// The growable buffer of a logical vector.
    pub fn logical_vec_mut(&mut self, token: Option<Token>) -> Result<&mut Vec<bool>> {
        self.buffer_mut(
            "logical_vec_mut",
            ValueKind::Logical,
            |p| match p {
                Payload::Logical(s) => Some(s),
                _ => None,
            },
            token,
        )
    }

    /// The growable buffer of an integer vector.
    pub fn int_vec_mut(&mut self, token: Option<Token>) -> Result<&mut Vec<i64>> {
        self.buffer_mut(
            "int_vec_mut",
            ValueKind::Int,
            |p| match p {
                Payload::Int(s) => Some(s),
                _ => None,
            },
            token,
        )
    }

    /// The growable buffer of a float vector.
    pub fn float_vec_mut(&mut self, token: Option<Token>) -> Result<&mut Vec<f64>> {
        self.buffer_mut(
            "float_vec_mut",
            ValueKind::Float,
            |p| match p {
                Payload::Float(s) => Some(s),
                _ => None,
            },
            token,
        )
    }

    /// The growable buffer of a string vector.
    pub fn string_vec_mut(&mut self, token: Option<Token>) -> Result<&mut Vec<String>> {
        self.buffer_mut(
            "string_vec_mut",
            ValueKind::String,
            |p| match p {
                Payload::String(s) => Some(s),
                _ => None,
            },
            token,
        )
    }

    fn object_payload_mut(&mut self, operation: &'static str, token: Option<Token>) -> Result<&mut ObjectPayload> {
        let kind = self.kind();
        match &mut self.payload {
            Payload::Object(o) if o.elements.is_singleton() => Err(singleton_error(operation, kind, token)),
            Payload::Object(o) => Ok(o),
            _ => Err(kind_error(operation, ValueKind::Object, kind, token)),
        }
    }

    /// Read-only view of logical elements.
    pub fn as_logicals(&self) -> Option<&[bool]> {
        match &self.payload {
            Payload::Logical(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// Read-only view of integer elements.
    pub fn as_ints(&self) -> Option<&[i64]> {
        match &self.payload {
            Payload::Int(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// Read-only view of float elements.
    pub fn as_floats(&self) -> Option<&[f64]> {
        match &self.payload {
            Payload::Float(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// Read-only view of string elements.
    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.payload {
            Payload::String(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Pushes
    // ═══════════════════════════════════════════════════════════════════

    /// Append a logical.
    pub fn push_logical(&mut self, value: bool, token: Option<Token>) -> Result<()> {
        self.logical_vec_mut(token)?.push(value);
        self.dims = None;
        Ok(())
    }

    /// Append an integer.
    pub fn push_int(&mut self, value: i64, token: Option<Token>) -> Result<()> {
        self.int_vec_mut(token)?.push(value);
        self.dims = None;
        Ok(())
    }

    /// Append a float.
    pub fn push_float(&mut self, value: f64, token: Option<Token>) -> Result<()> {
        self.float_vec_mut(token)?.push(value);
        self.dims = None;
        Ok(())
    }

    /// Append a string.
    pub fn push_string(&mut self, value: impl Into<String>, token: Option<Token>) -> Result<()> {
        self.string_vec_mut(token)?.push(value.into());
        self.dims = None;
        Ok(())
    }

    /// Append an object element.
    ///
    /// An untyped empty object vector adopts the element's class; after
    /// that, elements of any other class are refused.
    pub fn push_object(&mut self, element: &Arc<dyn ObjectElement>, token: Option<Token>) -> Result<()> {
        let payload = self.object_payload_mut("push_object", token)?;
        let element_class = element.class();

        match &payload.class {
            Some(class) if class.id() != element_class.id() => {
                return Err(ValueError::Class {
                    message: format!(
                        "cannot add an element of class {} to an object vector of class {}",
                        element_class.name(),
                        class.name()
                    ),
                    token,
                });
            }
            Some(_) => {}
            None => {
                payload.retained = element_class.uses_retain_release();
                payload.class = Some(element_class.clone());
            }
        }

        let retained = payload.retained;
        if let Some(elements) = payload.elements.as_vec_mut() {
            elements.push(ElementRef::new(element, retained));
        }
        self.dims = None;
        Ok(())
    }

    /// Append element `idx` of `source`.
    ///
    /// Integer vectors accept logicals, and float vectors accept logicals
    /// and integers; otherwise the kinds must match.
    pub fn push_from_index(&mut self, idx: usize, source: &ValueData, token: Option<Token>) -> Result<()> {
        const OPERATION: &str = "push_from_index";
        let target = self.kind();
        let from = source.kind();

        match (target, from) {
            (ValueKind::Logical, ValueKind::Logical) => {
                let value = source.logical_at(idx, token)?;
                self.push_logical(value, token)
            }
            (ValueKind::Int, ValueKind::Logical | ValueKind::Int) => {
                let value = source.int_at(idx, token)?;
                self.push_int(value, token)
            }
            (ValueKind::Float, ValueKind::Logical | ValueKind::Int | ValueKind::Float) => {
                let value = source.float_at(idx, token)?;
                self.push_float(value, token)
            }
            (ValueKind::String, ValueKind::String) => {
                let value = source.string_at(idx, token)?;
                self.push_string(value, token)
            }
            (ValueKind::Object, ValueKind::Object) => {
                let element = source.object_at(idx, token)?;
                self.push_object(&element, token)
            }
            _ => Err(ValueError::TypeMismatch {
                operation: OPERATION,
                expected: target.name().to_string(),
                got: type_name(source),
                token,
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Element replacement and resizing
    // ═══════════════════════════════════════════════════════════════════

    /// Replace element `idx` with the first element of `source`.
    ///
    /// The same kind widening as [`ValueData::push_from_index`] applies.
    /// The shape is kept, since the count does not change.
    pub fn set_value_at(&mut self, idx: usize, source: &ValueData, token: Option<Token>) -> Result<()> {
        const OPERATION: &str = "set_value_at";
        if self.is_singleton() {
            return Err(singleton_error(OPERATION, self.kind(), token));
        }
        self.check_index(OPERATION, idx, token)?;

        let target = self.kind();
        match (target, source.kind()) {
            (ValueKind::Logical, ValueKind::Logical) => {
                let value = source.logical_at(0, token)?;
                self.logical_vec_mut(token)?[idx] = value;
            }
            (ValueKind::Int, ValueKind::Logical | ValueKind::Int) => {
                let value = source.int_at(0, token)?;
                self.int_vec_mut(token)?[idx] = value;
            }
            (ValueKind::Float, ValueKind::Logical | ValueKind::Int | ValueKind::Float) => {
                let value = source.float_at(0, token)?;
                self.float_vec_mut(token)?[idx] = value;
            }
            (ValueKind::String, ValueKind::String) => {
                let value = source.string_at(0, token)?;
                self.string_vec_mut(token)?[idx] = value;
            }
            (ValueKind::Object, ValueKind::Object) => {
                let element = source.object_at(0, token)?;
                let payload = self.object_payload_mut(OPERATION, token)?;
                if let Some(class) = &payload.class {
                    if class.id() != element.class().id() {
                        return Err(ValueError::Class {
                            message: format!(
                                "cannot store an element of class {} into an object vector of class {}",
                                element.class().name(),
                                class.name()
                            ),
                            token,
                        });
                    }
                }
                let retained = payload.retained;
                if let Some(elements) = payload.elements.as_vec_mut() {
                    elements[idx] = ElementRef::new(&element, retained);
                }
            }
            _ => {
                return Err(ValueError::TypeMismatch {
                    operation: OPERATION,
                    expected: target.name().to_string(),
                    got: type_name(source),
                    token,
                })
            }
        }
        Ok(())
    }

    /// Reserve room for `additional` more elements.
    pub fn reserve(&mut self, additional: usize, token: Option<Token>) -> Result<()> {
        match self.kind() {
            ValueKind::Logical => self.logical_vec_mut(token)?.reserve(additional),
            ValueKind::Int => self.int_vec_mut(token)?.reserve(additional),
            ValueKind::Float => self.float_vec_mut(token)?.reserve(additional),
            ValueKind::String => self.string_vec_mut(token)?.reserve(additional),
            ValueKind::Object => {
                if let Some(elements) = self.object_payload_mut("reserve", token)?.elements.as_vec_mut() {
                    elements.reserve(additional);
                }
            }
            kind => return Err(no_buffer("reserve", kind, token)),
        }
        Ok(())
    }

    /// Truncate or extend to `len` elements.
    ///
    /// New elements are `F`, `0`, `0.0` or `""`. An object vector can only
    /// shrink, since there is no default element to fill with.
    pub fn resize(&mut self, len: usize, token: Option<Token>) -> Result<()> {
        match self.kind() {
            ValueKind::Logical => self.logical_vec_mut(token)?.resize(len, false),
            ValueKind::Int => self.int_vec_mut(token)?.resize(len, 0),
            ValueKind::Float => self.float_vec_mut(token)?.resize(len, 0.0),
            ValueKind::String => self.string_vec_mut(token)?.resize(len, String::new()),
            ValueKind::Object => {
                let count = self.count();
                let payload = self.object_payload_mut("resize", token)?;
                if len > count {
                    return Err(ValueError::TypeMismatch {
                        operation: "resize",
                        expected: "a length no greater than the current count".to_string(),
                        got: format!("object vector grown from {} to {}", count, len),
                        token,
                    });
                }
                if let Some(elements) = payload.elements.as_vec_mut() {
                    elements.truncate(len);
                }
            }
            kind => return Err(no_buffer("resize", kind, token)),
        }
        self.dims = None;
        Ok(())
    }

    /// Remove element `idx`, shifting later elements down.
    pub fn erase(&mut self, idx: usize, token: Option<Token>) -> Result<()> {
        if self.is_singleton() {
            return Err(singleton_error("erase", self.kind(), token));
        }
        self.check_index("erase", idx, token)?;
        match self.kind() {
            ValueKind::Logical => {
                self.logical_vec_mut(token)?.remove(idx);
            }
            ValueKind::Int => {
                self.int_vec_mut(token)?.remove(idx);
            }
            ValueKind::Float => {
                self.float_vec_mut(token)?.remove(idx);
            }
            ValueKind::String => {
                self.string_vec_mut(token)?.remove(idx);
            }
            ValueKind::Object => {
                if let Some(elements) = self.object_payload_mut("erase", token)?.elements.as_vec_mut() {
                    elements.remove(idx);
                }
            }
            kind => return Err(no_buffer("erase", kind, token)),
        }
        self.dims = None;
        Ok(())
    }

    /// Sort in place.
    ///
    /// NaN sorts after every number in either direction, and strings order
    /// by bytes. Objects have no natural order; see
    /// [`ValueData::sort_by_property`]. Sorting discards the shape.
    pub fn sort(&mut self, ascending: bool, token: Option<Token>) -> Result<()> {
        match self.kind() {
            ValueKind::Logical => sort_slice(self.logical_vec_mut(token)?, ascending, bool::cmp),
            ValueKind::Int => sort_slice(self.int_vec_mut(token)?, ascending, i64::cmp),
            ValueKind::String => sort_slice(self.string_vec_mut(token)?, ascending, String::cmp),
            ValueKind::Float => {
                let values = self.float_vec_mut(token)?;
                values.sort_by(float_order);
                if !ascending {
                    let numbers = values.iter().position(|x| x.is_nan()).unwrap_or(values.len());
                    values[..numbers].reverse();
                }
            }
            kind => {
                return Err(ValueError::TypeMismatch {
                    operation: "sort",
                    expected: "logical, integer, float, or string".to_string(),
                    got: kind.name().to_string(),
                    token,
                })
            }
        }
        self.dims = None;
        Ok(())
    }
}
