//! Element-wise binary operators
//!
//! Both operands must hold the same number of elements, or one of them a
//! single element that is reused against every element of the other. The
//! result takes its shape from whichever operand
//! [`resolve_binary_shape`] selects.

use std::fmt;

use crate::compare::{compare, promotion_kind, unordered_objects, CompareOp};
use crate::error::{type_name, Result, ValueError};
use crate::shape::{resolve_binary_shape, ShapeOwner};
use crate::token::Token;
use crate::value::{Value, ValueData, ValueKind};

/// An arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// `+`, also string concatenation
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`, always producing float
    Div,
}

impl ArithOp {
    /// The operator as written in scripts.
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }

    fn apply_int(self, a: i64, b: i64, token: Option<Token>) -> Result<i64> {
        let result = match self {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div => a.checked_div(b),
        };
        result.ok_or(ValueError::IntegerOverflow {
            operation: self.symbol(),
            token,
        })
    }

    fn apply_float(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Element count of the result, and the per-operand index stride (0 for a
/// reused single element).
fn conform(
    left: &ValueData,
    right: &ValueData,
    operation: &'static str,
    token: Option<Token>,
) -> Result<(usize, usize, usize)> {
    let (l, r) = (left.count(), right.count());
    if l == r {
        Ok((l, 1, 1))
    } else if l == 1 {
        Ok((r, 0, 1))
    } else if r == 1 {
        Ok((l, 1, 0))
    } else {
        Err(ValueError::NonConformable {
            operation,
            message: format!("operands have {} and {} elements", l, r),
            token,
        })
    }
}

fn finish(mut result: Value, owner: ShapeOwner, left: &ValueData, right: &ValueData, token: Option<Token>) -> Result<Value> {
    if let Some(dims) = owner.dimensions(left, right) {
        result
            .make_mut()
            .set_dimensions(dims.axis_count(), dims.extents(), token)?;
    }
    Ok(result)
}

fn collect<T>(values: Vec<T>, singleton: fn(T) -> Value, vector: fn(Vec<T>) -> Value) -> Value {
    match <[T; 1]>::try_from(values) {
        Ok([value]) => singleton(value),
        Err(values) => vector(values),
    }
}

/// Apply `op` element-wise.
///
/// Logical operands count as 0 and 1 and produce integers. Integer results
/// that leave the 64-bit range raise, and `/` always produces float. `+`
/// with a string operand concatenates the canonical text of both sides.
///
/// # Example
///
/// ```
/// use valence::ops::{binary_arithmetic, ArithOp};
/// use valence::Value;
///
/// let sum = binary_arithmetic(ArithOp::Add, &Value::int_vec([1, 2]), &Value::int(10), None).unwrap();
/// assert_eq!(sum, Value::int_vec([11, 12]));
/// ```
pub fn binary_arithmetic(op: ArithOp, left: &ValueData, right: &ValueData, token: Option<Token>) -> Result<Value> {
    let operation = op.symbol();

    for operand in [left, right] {
        if matches!(operand.kind(), ValueKind::Void | ValueKind::Null | ValueKind::Object) {
            return Err(ValueError::TypeMismatch {
                operation,
                expected: "logical, integer, float, or string".to_string(),
                got: type_name(operand),
                token,
            });
        }
    }

    let kind = left.kind().max(right.kind());
    if kind == ValueKind::String && op != ArithOp::Add {
        let operand = if left.kind() == ValueKind::String { left } else { right };
        return Err(ValueError::TypeMismatch {
            operation,
            expected: "logical, integer, or float".to_string(),
            got: type_name(operand),
            token,
        });
    }

    let (count, ls, rs) = conform(left, right, operation, token)?;
    let owner = resolve_binary_shape(left, right, operation, token)?;

    let result = match kind {
        ValueKind::String => {
            let values = (0..count)
                .map(|i| Ok(left.string_at(i * ls, token)? + &right.string_at(i * rs, token)?))
                .collect::<Result<Vec<String>>>()?;
            collect(values, Value::string, Value::string_vec)
        }
        ValueKind::Float | ValueKind::Int | ValueKind::Logical if op == ArithOp::Div || kind == ValueKind::Float => {
            let values = (0..count)
                .map(|i| Ok(op.apply_float(left.float_at(i * ls, token)?, right.float_at(i * rs, token)?)))
                .collect::<Result<Vec<f64>>>()?;
            collect(values, Value::float, Value::float_vec)
        }
        _ => {
            let values = (0..count)
                .map(|i| op.apply_int(left.int_at(i * ls, token)?, right.int_at(i * rs, token)?, token))
                .collect::<Result<Vec<i64>>>()?;
            collect(values, Value::int, Value::int_vec)
        }
    };

    tracing::trace!(op = %op, count, "binary arithmetic");
    finish(result, owner, left, right, token)
}

/// Compare element-wise under `op`, producing a logical result.
///
/// Objects can only be tested for equality, even when an operand is empty.
pub fn binary_comparison(op: CompareOp, left: &ValueData, right: &ValueData, token: Option<Token>) -> Result<Value> {
    let operation = op.symbol();
    if promotion_kind(left.kind(), right.kind(), token)? == ValueKind::Object && op.is_ordering() {
        return Err(unordered_objects(op, token));
    }

    let (count, ls, rs) = conform(left, right, operation, token)?;
    let owner = resolve_binary_shape(left, right, operation, token)?;

    let values = (0..count)
        .map(|i| compare(left, i * ls, right, i * rs, op, token))
        .collect::<Result<Vec<bool>>>()?;

    finish(collect(values, Value::logical, Value::logical_vec), owner, left, right, token)
}
