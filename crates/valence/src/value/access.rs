//! Element access with kind conversion

use std::sync::Arc;

use crate::error::{type_name, Result, ValueError};
use crate::object::{ElementRef, ObjectElement};
use crate::token::Token;

use super::display::format_float;
use super::{Payload, ValueData};

/// Largest magnitude an f64 may have and still truncate into an i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn mismatch(operation: &'static str, expected: &str, value: &ValueData, token: Option<Token>) -> ValueError {
    ValueError::TypeMismatch {
        operation,
        expected: expected.to_string(),
        got: type_name(value),
        token,
    }
}

fn conversion(operation: &'static str, message: String, token: Option<Token>) -> ValueError {
    ValueError::Conversion {
        operation,
        message,
        token,
    }
}

pub(crate) fn float_to_int(value: f64, operation: &'static str, token: Option<Token>) -> Result<i64> {
    if value.is_nan() {
        return Err(conversion(operation, "NAN cannot be converted to integer".to_string(), token));
    }
    if value.is_infinite() || value < -I64_BOUND || value >= I64_BOUND {
        return Err(conversion(
            operation,
            format!("{} is out of integer range", format_float(value)),
            token,
        ));
    }
    Ok(value.trunc() as i64)
}

fn parse_logical(text: &str, token: Option<Token>) -> Result<bool> {
    match text {
        "T" | "TRUE" | "true" => Ok(true),
        "F" | "FALSE" | "false" => Ok(false),
        _ => Err(conversion(
            "logical_at",
            format!("string \"{}\" cannot be converted to logical", text),
            token,
        )),
    }
}

fn parse_int(text: &str, token: Option<Token>) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| {
        conversion(
            "int_at",
            format!("string \"{}\" cannot be converted to integer", text),
            token,
        )
    })
}

fn parse_float(text: &str, token: Option<Token>) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| {
        conversion(
            "float_at",
            format!("string \"{}\" cannot be converted to float", text),
            token,
        )
    })
}

impl ValueData {
    pub(crate) fn check_index(&self, operation: &'static str, idx: usize, token: Option<Token>) -> Result<()> {
        let count = self.count();
        if idx >= count {
            return Err(ValueError::IndexOutOfRange {
                operation,
                index: idx,
                count,
                token,
            });
        }
        Ok(())
    }

    /// Element `idx` as a logical.
    ///
    /// Numbers are true when non-zero; NAN has no truth value.
    pub fn logical_at(&self, idx: usize, token: Option<Token>) -> Result<bool> {
        self.check_index("logical_at", idx, token)?;
        match &self.payload {
            Payload::Logical(s) => Ok(s.as_slice()[idx]),
            Payload::Int(s) => Ok(s.as_slice()[idx] != 0),
            Payload::Float(s) => {
                let value = s.as_slice()[idx];
                if value.is_nan() {
                    return Err(conversion(
                        "logical_at",
                        "NAN cannot be converted to logical".to_string(),
                        token,
                    ));
                }
                Ok(value != 0.0)
            }
            Payload::String(s) => parse_logical(&s.as_slice()[idx], token),
            _ => Err(mismatch("logical_at", "logical", self, token)),
        }
    }

    /// Element `idx` as an integer. Floats truncate toward zero.
    pub fn int_at(&self, idx: usize, token: Option<Token>) -> Result<i64> {
        self.check_index("int_at", idx, token)?;
        match &self.payload {
            Payload::Logical(s) => Ok(i64::from(s.as_slice()[idx])),
            Payload::Int(s) => Ok(s.as_slice()[idx]),
            Payload::Float(s) => float_to_int(s.as_slice()[idx], "int_at", token),
            Payload::String(s) => parse_int(&s.as_slice()[idx], token),
            _ => Err(mismatch("int_at", "integer", self, token)),
        }
    }

    /// Element `idx` as a float.
    pub fn float_at(&self, idx: usize, token: Option<Token>) -> Result<f64> {
        self.check_index("float_at", idx, token)?;
        match &self.payload {
            Payload::Logical(s) => Ok(if s.as_slice()[idx] { 1.0 } else { 0.0 }),
            Payload::Int(s) => Ok(s.as_slice()[idx] as f64),
            Payload::Float(s) => Ok(s.as_slice()[idx]),
            Payload::String(s) => parse_float(&s.as_slice()[idx], token),
            _ => Err(mismatch("float_at", "float", self, token)),
        }
    }

    /// Element `idx` in its canonical text form.
    pub fn string_at(&self, idx: usize, token: Option<Token>) -> Result<String> {
        self.check_index("string_at", idx, token)?;
        match &self.payload {
            Payload::Logical(s) => Ok(if s.as_slice()[idx] { "T" } else { "F" }.to_string()),
            Payload::Int(s) => Ok(s.as_slice()[idx].to_string()),
            Payload::Float(s) => Ok(format_float(s.as_slice()[idx])),
            Payload::String(s) => Ok(s.as_slice()[idx].clone()),
            _ => Err(mismatch("string_at", "string", self, token)),
        }
    }

    /// Element `idx` of an object value.
    ///
    /// Fails with [`ValueError::ElementReleased`] if the element is held
    /// externally and its owner has dropped it.
    pub fn object_at(&self, idx: usize, token: Option<Token>) -> Result<Arc<dyn ObjectElement>> {
        self.element_ref_at("object_at", idx, token)?
            .get()
            .ok_or(ValueError::ElementReleased {
                operation: "object_at",
                token,
            })
    }

    pub(crate) fn element_ref_at(
        &self,
        operation: &'static str,
        idx: usize,
        token: Option<Token>,
    ) -> Result<&ElementRef> {
        self.check_index(operation, idx, token)?;
        match &self.payload {
            Payload::Object(o) => Ok(&o.elements.as_slice()[idx]),
            _ => Err(mismatch(operation, "object", self, token)),
        }
    }
}
