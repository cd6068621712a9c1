//! Cross-kind comparison

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use valence::*;

const ALL_OPS: [CompareOp; 6] = [
    CompareOp::Less,
    CompareOp::LessEqual,
    CompareOp::Equal,
    CompareOp::GreaterEqual,
    CompareOp::Greater,
    CompareOp::NotEqual,
];

#[test]
fn test_promotion_ladder() {
    use ValueKind::*;
    assert_eq!(promotion_kind(Logical, Int, None).unwrap(), Int);
    assert_eq!(promotion_kind(Int, Float, None).unwrap(), Float);
    assert_eq!(promotion_kind(Float, String, None).unwrap(), String);
    assert_eq!(promotion_kind(Object, Object, None).unwrap(), Object);
}

#[test]
fn test_void_and_null_never_compare() {
    for other in [Value::int(1), Value::null(), Value::void()] {
        let err = compare(&Value::null(), 0, &other, 0, CompareOp::Equal, None).unwrap_err();
        assert!(matches!(err, ValueError::Comparison { .. }));
        assert!(compare(&Value::void(), 0, &other, 0, CompareOp::Equal, None).is_err());
    }
}

#[test]
fn test_logical_order() {
    let f = Value::logical(false);
    let t = Value::logical(true);
    assert!(compare(&f, 0, &t, 0, CompareOp::Less, None).unwrap());
    assert!(!compare(&t, 0, &f, 0, CompareOp::Less, None).unwrap());
    assert!(compare(&t, 0, &t, 0, CompareOp::GreaterEqual, None).unwrap());
}

#[test]
fn test_float_text_promotion() {
    // 1.0 compares as the text "1.0"
    let one = Value::float(1.0);
    assert!(compare(&one, 0, &Value::string("1.0"), 0, CompareOp::Equal, None).unwrap());
    assert!(!compare(&one, 0, &Value::string("1"), 0, CompareOp::Equal, None).unwrap());
}

#[test]
fn test_objects_compare_by_identity_only() {
    let a: Arc<dyn ObjectElement> = TestElement::new(1);
    let b: Arc<dyn ObjectElement> = TestElement::new(1);
    let va = Value::object(&a);
    let vb = Value::object(&b);

    assert!(compare(&va, 0, &va.clone(), 0, CompareOp::Equal, None).unwrap());
    assert!(compare(&va, 0, &vb, 0, CompareOp::NotEqual, None).unwrap());
    assert!(compare(&va, 0, &vb, 0, CompareOp::Less, None).is_err());
    assert!(compare(&va, 0, &Value::int(1), 0, CompareOp::Equal, None).is_err());
}

#[test]
fn test_element_indices() {
    let v = Value::int_vec([3, 1, 2]);
    assert!(compare(&v, 1, &v, 2, CompareOp::Less, None).unwrap());
    assert!(compare(&v, 0, &v, 5, CompareOp::Less, None).is_err());
}

proptest! {
    #[test]
    fn prop_nan_against_any_float(x in proptest::num::f64::ANY) {
        let nan = Value::float(f64::NAN);
        let other = Value::float(x);
        for op in ALL_OPS {
            let expected = op == CompareOp::NotEqual;
            prop_assert_eq!(compare(&nan, 0, &other, 0, op, None).unwrap(), expected);
            prop_assert_eq!(compare(&other, 0, &nan, 0, op, None).unwrap(), expected);
        }
    }

    #[test]
    fn prop_int_promotes_like_float(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let ia = Value::int(a);
        let fb = Value::float(b as f64);
        let ib = Value::int(b);
        for op in ALL_OPS {
            prop_assert_eq!(
                compare(&ia, 0, &fb, 0, op, None).unwrap(),
                compare(&ia, 0, &ib, 0, op, None).unwrap()
            );
        }
    }

    #[test]
    fn prop_int_to_string_promotion_round_trips(a in any::<i64>()) {
        let text = Value::int(a).string_at(0, None).unwrap();
        prop_assert_eq!(Value::string(text.as_str()).int_at(0, None).unwrap(), a);
        prop_assert!(compare(&Value::int(a), 0, &Value::string(text), 0, CompareOp::Equal, None).unwrap());
    }

    #[test]
    fn prop_number_against_text_compares_as_text(n in proptest::num::f64::ANY, s in "[-0-9.eINFA]{0,8}") {
        let number = Value::float(n);
        let stringified = Value::string(number.string_at(0, None).unwrap());
        let text = Value::string(s);
        for op in ALL_OPS {
            prop_assert_eq!(
                compare(&number, 0, &text, 0, op, None).unwrap(),
                compare(&stringified, 0, &text, 0, op, None).unwrap()
            );
        }
    }

    #[test]
    fn prop_exactly_one_ordering_holds(a in any::<i64>(), b in any::<i64>()) {
        let (va, vb) = (Value::int(a), Value::int(b));
        let lt = compare(&va, 0, &vb, 0, CompareOp::Less, None).unwrap();
        let eq = compare(&va, 0, &vb, 0, CompareOp::Equal, None).unwrap();
        let gt = compare(&va, 0, &vb, 0, CompareOp::Greater, None).unwrap();
        prop_assert_eq!([lt, eq, gt].iter().filter(|&&x| x).count(), 1);
    }
}
