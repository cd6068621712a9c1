//! Cross-kind comparison and promotion
//!
//! Operands of different kinds are promoted to the higher kind on the
//! ladder `logical < integer < float < string` before comparing. Promotion
//! to string uses the canonical text form, so mixed number/string
//! comparisons are lexicographic.
//!
//! Each operator is its own function rather than a projection of a
//! three-way comparison: IEEE NaN makes `<`, `<=`, `==`, `>=` and `>` all
//! false and `!=` true, which no single ordering can express.

use std::fmt;

use crate::error::{Result, ValueError};
use crate::object::ElementRef;
use crate::token::Token;
use crate::value::{ValueData, ValueKind};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `==`
    Equal,
    /// `>=`
    GreaterEqual,
    /// `>`
    Greater,
    /// `!=`
    NotEqual,
}

impl CompareOp {
    /// The operator as written in scripts.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Equal => "==",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Greater => ">",
            CompareOp::NotEqual => "!=",
        }
    }

    /// Whether the operator orders its operands rather than testing equality.
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The common kind two operands are compared as.
///
/// Void and NULL cannot be compared at all, and objects only compare with
/// objects.
pub fn promotion_kind(k1: ValueKind, k2: ValueKind, token: Option<Token>) -> Result<ValueKind> {
    for kind in [k1, k2] {
        if matches!(kind, ValueKind::Void | ValueKind::Null) {
            return Err(ValueError::Comparison {
                message: format!("comparison with {} is illegal", kind.name()),
                token,
            });
        }
    }

    if (k1 == ValueKind::Object) != (k2 == ValueKind::Object) {
        return Err(ValueError::Comparison {
            message: format!(
                "cannot compare {} with {}; objects only compare with objects",
                k1.name(),
                k2.name()
            ),
            token,
        });
    }

    Ok(k1.max(k2))
}

/// A pair of elements after promotion.
enum Promoted<'a> {
    Logical(bool, bool),
    Int(i64, i64),
    Float(f64, f64),
    String(String, String),
    Object(&'a ElementRef, &'a ElementRef),
}

fn promote<'a>(
    v1: &'a ValueData,
    i1: usize,
    v2: &'a ValueData,
    i2: usize,
    token: Option<Token>,
) -> Result<Promoted<'a>> {
    let promoted = match promotion_kind(v1.kind(), v2.kind(), token)? {
        ValueKind::Logical => Promoted::Logical(v1.logical_at(i1, token)?, v2.logical_at(i2, token)?),
        ValueKind::Int => Promoted::Int(v1.int_at(i1, token)?, v2.int_at(i2, token)?),
        ValueKind::Float => Promoted::Float(v1.float_at(i1, token)?, v2.float_at(i2, token)?),
        ValueKind::String => Promoted::String(v1.string_at(i1, token)?, v2.string_at(i2, token)?),
        _ => Promoted::Object(
            v1.element_ref_at("compare", i1, token)?,
            v2.element_ref_at("compare", i2, token)?,
        ),
    };
    Ok(promoted)
}

pub(crate) fn unordered_objects(op: CompareOp, token: Option<Token>) -> ValueError {
    ValueError::Comparison {
        message: format!("objects cannot be ordered with {}", op.symbol()),
        token,
    }
}

/// `v1[i1] < v2[i2]`
pub fn less_than(v1: &ValueData, i1: usize, v2: &ValueData, i2: usize, token: Option<Token>) -> Result<bool> {
    Ok(match promote(v1, i1, v2, i2, token)? {
        Promoted::Logical(a, b) => !a & b,
        Promoted::Int(a, b) => a < b,
        Promoted::Float(a, b) => a < b,
        Promoted::String(a, b) => a < b,
        Promoted::Object(..) => return Err(unordered_objects(CompareOp::Less, token)),
    })
}

/// `v1[i1] <= v2[i2]`
pub fn less_equal(v1: &ValueData, i1: usize, v2: &ValueData, i2: usize, token: Option<Token>) -> Result<bool> {
    Ok(match promote(v1, i1, v2, i2, token)? {
        Promoted::Logical(a, b) => a <= b,
        Promoted::Int(a, b) => a <= b,
        Promoted::Float(a, b) => a <= b,
        Promoted::String(a, b) => a <= b,
        Promoted::Object(..) => return Err(unordered_objects(CompareOp::LessEqual, token)),
    })
}

/// `v1[i1] == v2[i2]`. Objects are equal only if they are the same element.
pub fn equal(v1: &ValueData, i1: usize, v2: &ValueData, i2: usize, token: Option<Token>) -> Result<bool> {
    Ok(match promote(v1, i1, v2, i2, token)? {
        Promoted::Logical(a, b) => a == b,
        Promoted::Int(a, b) => a == b,
        Promoted::Float(a, b) => a == b,
        Promoted::String(a, b) => a == b,
        Promoted::Object(a, b) => a.same_element(b),
    })
}

/// `v1[i1] >= v2[i2]`
pub fn greater_equal(v1: &ValueData, i1: usize, v2: &ValueData, i2: usize, token: Option<Token>) -> Result<bool> {
    Ok(match promote(v1, i1, v2, i2, token)? {
        Promoted::Logical(a, b) => a >= b,
        Promoted::Int(a, b) => a >= b,
        Promoted::Float(a, b) => a >= b,
        Promoted::String(a, b) => a >= b,
        Promoted::Object(..) => return Err(unordered_objects(CompareOp::GreaterEqual, token)),
    })
}

/// `v1[i1] > v2[i2]`
pub fn greater_than(v1: &ValueData, i1: usize, v2: &ValueData, i2: usize, token: Option<Token>) -> Result<bool> {
    Ok(match promote(v1, i1, v2, i2, token)? {
        Promoted::Logical(a, b) => a & !b,
        Promoted::Int(a, b) => a > b,
        Promoted::Float(a, b) => a > b,
        Promoted::String(a, b) => a > b,
        Promoted::Object(..) => return Err(unordered_objects(CompareOp::Greater, token)),
    })
}

/// `v1[i1] != v2[i2]`. True whenever either side is NaN.
pub fn not_equal(v1: &ValueData, i1: usize, v2: &ValueData, i2: usize, token: Option<Token>) -> Result<bool> {
    Ok(match promote(v1, i1, v2, i2, token)? {
        Promoted::Logical(a, b) => a != b,
        Promoted::Int(a, b) => a != b,
        Promoted::Float(a, b) => a != b,
        Promoted::String(a, b) => a != b,
        Promoted::Object(a, b) => !a.same_element(b),
    })
}

/// Compare `v1[i1]` with `v2[i2]` under `op`.
pub fn compare(
    v1: &ValueData,
    i1: usize,
    v2: &ValueData,
    i2: usize,
    op: CompareOp,
    token: Option<Token>,
) -> Result<bool> {
    match op {
        CompareOp::Less => less_than(v1, i1, v2, i2, token),
        CompareOp::LessEqual => less_equal(v1, i1, v2, i2, token),
        CompareOp::Equal => equal(v1, i1, v2, i2, token),
        CompareOp::GreaterEqual => greater_equal(v1, i1, v2, i2, token),
        CompareOp::Greater => greater_than(v1, i1, v2, i2, token),
        CompareOp::NotEqual => not_equal(v1, i1, v2, i2, token),
    }
}
