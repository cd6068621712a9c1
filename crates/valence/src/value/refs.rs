//! Shared value handles and copy-on-write

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{Result, ValueError};
use crate::token::Token;

use super::ValueData;

/// A reference-counted handle to a value.
///
/// Cloning adds an owner; dropping the last owner returns the payload
/// buffer to the arena. All read operations are reachable through `Deref`.
/// Mutation requires exclusive ownership: use [`Value::get_mut`] to check
/// for it, or [`Value::make_mut`] to copy the data first when it is shared.
#[derive(Clone)]
pub struct Value(Arc<ValueData>);

impl Value {
    /// Wrap freshly built data in a handle.
    pub fn new(data: ValueData) -> Self {
        Self(Arc::new(data))
    }

    /// Exclusive access to the data, if this handle is its only owner.
    pub fn get_mut(&mut self, token: Option<Token>) -> Result<&mut ValueData> {
        Arc::get_mut(&mut self.0).ok_or(ValueError::SharedMutation {
            operation: "get_mut",
            token,
        })
    }

    /// Exclusive access, deep-copying the data first if it is shared.
    ///
    /// The copy keeps singleton-ness, shape and the invisible flag.
    pub fn make_mut(&mut self) -> &mut ValueData {
        Arc::make_mut(&mut self.0)
    }

    /// Exclusive access to a vector-backed value.
    ///
    /// A shared or singleton value is first replaced by a vector-based copy,
    /// so the returned data always accepts pushes and resizes.
    pub fn make_mut_vector(&mut self) -> &mut ValueData {
        if self.0.is_singleton() || Arc::get_mut(&mut self.0).is_none() {
            let mut copy = self.0.vector_based_data();
            copy.invisible = self.0.invisible;
            self.0 = Arc::new(copy);
        }
        Arc::make_mut(&mut self.0)
    }

    /// Number of handles sharing the data.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Whether no other handle shares the data.
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }

    /// Whether two handles point at the same data.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for Value {
    type Target = ValueData;

    fn deref(&self) -> &ValueData {
        &self.0
    }
}

impl AsRef<ValueData> for Value {
    fn as_ref(&self) -> &ValueData {
        &self.0
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Value::ptr_eq(self, other) || *self.0 == *other.0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

/// A process-wide canonical value.
///
/// The static always holds one owner, so every [`Value`] obtained through
/// [`StaticValue::value`] is shared and [`Value::get_mut`] on it fails.
/// There is no way to reach the data mutably through this type.
pub struct StaticValue(Value);

impl StaticValue {
    pub(crate) fn new(data: ValueData) -> Self {
        Self(Value::new(data))
    }

    /// A new handle to the constant.
    pub fn value(&self) -> Value {
        self.0.clone()
    }
}

impl Deref for StaticValue {
    type Target = ValueData;

    fn deref(&self) -> &ValueData {
        &self.0
    }
}

impl fmt::Debug for StaticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticValue").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_data() {
        let a = Value::int_vec([1, 2, 3]);
        let b = a.clone();
        assert!(Value::ptr_eq(&a, &b));
        assert_eq!(a.ref_count(), 2);
        drop(b);
        assert!(a.is_unique());
    }

    #[test]
    fn test_get_mut_refuses_shared() {
        let mut a = Value::int_vec([1, 2, 3]);
        let _b = a.clone();
        let err = a.get_mut(None).unwrap_err();
        assert!(matches!(err, ValueError::SharedMutation { .. }));
    }

    #[test]
    fn test_make_mut_detaches() {
        let mut a = Value::int_vec([1, 2, 3]);
        let b = a.clone();
        a.make_mut().push_int(4, None).unwrap();
        assert_eq!(a.count(), 4);
        assert_eq!(b.count(), 3);
    }

    #[test]
    fn test_make_mut_vector_converts_singleton() {
        let mut a = Value::float(2.5);
        assert!(a.is_singleton());
        a.make_mut_vector().push_float(3.5, None).unwrap();
        assert!(!a.is_singleton());
        assert_eq!(a.as_floats(), Some(&[2.5, 3.5][..]));
    }

    #[test]
    fn test_static_value_is_never_unique() {
        let mut t = crate::value::constants().logical_true.value();
        assert!(!t.is_unique());
        assert!(t.get_mut(None).is_err());
    }
}
