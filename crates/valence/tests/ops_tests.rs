//! Element-wise operators end to end

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use valence::*;

fn matrix(values: Value, extents: &[usize]) -> Value {
    let mut value = values;
    value
        .make_mut()
        .set_dimensions(extents.len(), extents, None)
        .unwrap();
    value
}

#[test]
fn test_vector_plus_row_matrix() {
    let v = Value::int_vec([1, 2, 3]);
    let m = matrix(Value::int_vec([10, 20, 30]), &[1, 3]);

    let sum = binary_arithmetic(ArithOp::Add, &v, &m, None).unwrap();
    assert_eq!(sum, matrix(Value::int_vec([11, 22, 33]), &[1, 3]));
    assert_eq!(sum.to_string(), "11 22 33");
}

#[test]
fn test_nonconformable_lengths_report_position() {
    let token = Token::new(0, 9, 3, 4);
    let err = binary_arithmetic(
        ArithOp::Add,
        &Value::int_vec([1, 2, 3]),
        &Value::int_vec([1, 2]),
        Some(token),
    )
    .unwrap_err();
    assert!(matches!(err, ValueError::NonConformable { .. }));
    assert_eq!(err.token(), Some(token));
}

#[test]
fn test_matrix_with_scalar_keeps_shape() {
    let m = matrix(Value::float_vec([1.0, 2.0, 3.0, 4.0]), &[2, 2]);
    let half = binary_arithmetic(ArithOp::Div, &m, &Value::int(2), None).unwrap();
    assert_eq!(half, matrix(Value::float_vec([0.5, 1.0, 1.5, 2.0]), &[2, 2]));
}

#[test]
fn test_matrix_comparison_keeps_shape() {
    let m = matrix(Value::int_vec([1, 5, 2, 8]), &[2, 2]);
    let big = binary_comparison(CompareOp::Greater, &m, &Value::int(3), None).unwrap();
    assert_eq!(big, matrix(Value::logical_vec([false, true, false, true]), &[2, 2]));
}

#[test]
fn test_mismatched_matrices_raise() {
    let a = matrix(Value::int_vec(1..=6), &[2, 3]);
    let b = matrix(Value::int_vec(1..=6), &[3, 2]);
    assert!(binary_arithmetic(ArithOp::Sub, &a, &b, None).is_err());
    assert!(binary_comparison(CompareOp::Equal, &a, &b, None).is_err());
}

#[test]
fn test_objects_cannot_be_added() {
    let egg: std::sync::Arc<dyn ObjectElement> = TestElement::new(1);
    let err = binary_arithmetic(ArithOp::Add, &Value::object(&egg), &Value::int(1), None).unwrap_err();
    assert!(matches!(err, ValueError::TypeMismatch { .. }));
}

#[test]
fn test_nan_comparison_elementwise() {
    let v = Value::float_vec([1.0, f64::NAN]);
    let eq = binary_comparison(CompareOp::Equal, &v, &v, None).unwrap();
    assert_eq!(eq, Value::logical_vec([true, false]));
    let ne = binary_comparison(CompareOp::NotEqual, &v, &v, None).unwrap();
    assert_eq!(ne, Value::logical_vec([false, true]));
}

#[test]
fn test_operands_are_untouched() {
    let v = Value::int_vec([1, 2]);
    let held = v.clone();
    let _ = binary_arithmetic(ArithOp::Mul, &v, &v, None).unwrap();
    assert_eq!(held, Value::int_vec([1, 2]));
    assert_eq!(v.ref_count(), 2);
}

proptest! {
    #[test]
    fn prop_addition_matches_i64(a in proptest::collection::vec(-1_000_000i64..1_000_000, 0..16), b in -1_000_000i64..1_000_000) {
        let sum = binary_arithmetic(ArithOp::Add, &Value::int_vec(a.iter().copied()), &Value::int(b), None).unwrap();
        let expected: Vec<i64> = a.iter().map(|x| x + b).collect();
        prop_assert_eq!(sum.count(), expected.len());
        for (i, x) in expected.iter().enumerate() {
            prop_assert_eq!(sum.int_at(i, None).unwrap(), *x);
        }
    }

    #[test]
    fn prop_conformability(l in 0usize..6, r in 0usize..6) {
        let left = Value::int_vec(0..l as i64);
        let right = Value::int_vec(0..r as i64);
        let result = binary_arithmetic(ArithOp::Add, &left, &right, None);
        prop_assert_eq!(result.is_ok(), l == r || l == 1 || r == 1);
    }
}
