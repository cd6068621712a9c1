//! Sharing, copy-on-write, constants and buffer recycling

use std::sync::Arc;

use pretty_assertions::assert_eq;
use valence::*;

fn warm() {
    runtime::warm_up(&RuntimeContext::default()).unwrap();
}

// ═══════════════════════════════════════════════════════════════════════
// Shared handles
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_clone_shares_data() {
    let a = Value::int_vec([1, 2]);
    let b = a.clone();
    assert!(Value::ptr_eq(&a, &b));
    assert_eq!(a.ref_count(), 2);
    drop(b);
    assert!(a.is_unique());
}

#[test]
fn test_shared_value_refuses_mutation() {
    let mut a = Value::int_vec([1, 2]);
    let b = a.clone();
    let err = a.get_mut(None).unwrap_err();
    assert!(matches!(err, ValueError::SharedMutation { .. }));
    drop(b);
    assert!(a.get_mut(None).is_ok());
}

#[test]
fn test_make_mut_copies_shared_data() {
    let mut a = Value::int_vec([1, 2]);
    let b = a.clone();
    a.make_mut().push_int(3, None).unwrap();
    assert_eq!(a.as_ints(), Some(&[1, 2, 3][..]));
    assert_eq!(b.as_ints(), Some(&[1, 2][..]));
    assert!(!Value::ptr_eq(&a, &b));
}

#[test]
fn test_make_mut_vector_turns_singleton_into_vector() {
    let mut a = Value::string("x");
    a.make_mut_vector().push_string("y", None).unwrap();
    assert_eq!(a, Value::string_vec(["x", "y"]));
}

#[test]
fn test_make_mut_vector_keeps_invisible_flag() {
    let mut a = Value::int(1).invisible_copy();
    a.make_mut_vector().push_int(2, None).unwrap();
    assert!(a.invisible());
}

#[test]
fn test_error_carries_token() {
    let token = Token::new(4, 9, 2, 5);
    let mut a = Value::int(1);
    let err = a.get_mut(Some(token)).unwrap().push_int(1, Some(token)).unwrap_err();
    assert_eq!(err.token(), Some(token));
    assert!(err.report().ends_with("(at 2:5)"));
}

// ═══════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_constants_are_never_mutable() {
    let mut t = Value::logical(true);
    assert!(t.get_mut(None).is_err());

    let mut empty = constants().empty_int.value();
    assert!(empty.get_mut(None).is_err());

    // make_mut detaches instead of touching the constant
    empty.make_mut().push_int(1, None).unwrap();
    assert_eq!(constants().empty_int.count(), 0);
}

#[test]
fn test_logical_constants_are_shared() {
    let a = Value::logical(false);
    let b = Value::logical(false);
    assert!(Value::ptr_eq(&a, &b));
}

#[test]
fn test_numeric_constants() {
    let c = constants();
    assert_eq!(c.int_zero.int_at(0, None).unwrap(), 0);
    assert_eq!(c.float_one.float_at(0, None).unwrap(), 1.0);
    assert_eq!(c.float_inf.float_at(0, None).unwrap(), f64::INFINITY);
    assert_eq!(c.float_neg_inf.float_at(0, None).unwrap(), f64::NEG_INFINITY);
    assert_eq!(c.empty_string_vec.kind(), ValueKind::String);
}

// ═══════════════════════════════════════════════════════════════════════
// Object element lifetimes
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Borrowed;

fn borrowed_class() -> &'static Arc<ObjectClass> {
    static CLASS: std::sync::OnceLock<Arc<ObjectClass>> = std::sync::OnceLock::new();
    CLASS.get_or_init(|| Arc::new(ObjectClass::new("Borrowed", false)))
}

impl ObjectElement for Borrowed {
    fn class(&self) -> &Arc<ObjectClass> {
        borrowed_class()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn test_retained_elements_outlive_their_creator() {
    let egg: Arc<dyn ObjectElement> = TestElement::new(3);
    let v = Value::object(&egg);
    assert!(v.uses_retain_release());
    drop(egg);
    assert!(v.object_at(0, None).is_ok());
}

#[test]
fn test_external_elements_can_be_released() {
    let element: Arc<dyn ObjectElement> = Arc::new(Borrowed);
    let v = Value::object(&element);
    assert!(!v.uses_retain_release());
    assert!(v.object_at(0, None).is_ok());

    drop(element);
    let err = v.object_at(0, None).unwrap_err();
    assert!(matches!(err, ValueError::ElementReleased { .. }));
}

#[test]
fn test_object_vector_needs_one_class() {
    let egg: Arc<dyn ObjectElement> = TestElement::new(1);
    let other: Arc<dyn ObjectElement> = Arc::new(Borrowed);
    let err = Value::object_vec(&[egg, other], None).unwrap_err();
    assert!(matches!(err, ValueError::Class { .. }));
}

#[test]
fn test_untyped_object_vector_adopts_class() {
    let egg: Arc<dyn ObjectElement> = TestElement::new(1);
    let mut v = Value::with_capacity(ValueKind::Object, 1);
    assert!(v.class().is_none());

    let data = v.get_mut(None).unwrap();
    data.push_object(&egg, None).unwrap();
    assert_eq!(data.element_type(), "TestElement");

    let other: Arc<dyn ObjectElement> = Arc::new(Borrowed);
    assert!(data.push_object(&other, None).is_err());
}

// ═══════════════════════════════════════════════════════════════════════
// Arena
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_dropped_vector_returns_buffer_to_arena() {
    warm();
    let arena = arena::global().unwrap();
    let before = arena.stats().int;

    let v = Value::int_vec(0..32);
    drop(v);

    let after = arena.stats().int;
    assert!(after.acquired > before.acquired);
    assert!(after.released + after.discarded > before.released + before.discarded);
}

#[test]
fn test_buffer_pool_limits() {
    let pool: arena::BufferPool<i64> = arena::BufferPool::new(0, 1, 8);
    pool.release(Vec::with_capacity(4));
    pool.release(Vec::with_capacity(4));
    pool.release(Vec::with_capacity(64));

    let stats = pool.stats();
    assert_eq!(stats.retained, 1);
    assert_eq!(stats.released, 1);
    assert_eq!(stats.discarded, 2);

    let buf = pool.acquire(2);
    assert!(buf.is_empty());
    assert_eq!(pool.stats().reused, 1);
}
