//! Display and Debug implementations for values

use std::fmt;

use super::*;

/// Canonical text form of a float.
///
/// Non-finite values print as `NAN`, `INF` and `-INF`. Integral values keep
/// one decimal place so they read back as floats; very large and very small
/// magnitudes use exponent notation.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e15 || (magnitude != 0.0 && magnitude < 1e-4) {
        format!("{:e}", value)
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_joined<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut write_item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write_item(f, item)?;
    }
    Ok(())
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Void => Ok(()),
            Payload::Null => f.write_str("NULL"),
            payload if payload.len() == 0 => write!(f, "{}(0)", payload.kind()),

            Payload::Logical(s) => {
                write_joined(f, s.as_slice(), |f, b| f.write_str(if *b { "T" } else { "F" }))
            }
            Payload::Int(s) => write_joined(f, s.as_slice(), |f, n| write!(f, "{}", n)),
            Payload::Float(s) => {
                write_joined(f, s.as_slice(), |f, x| f.write_str(&format_float(*x)))
            }
            Payload::String(s) => write_joined(f, s.as_slice(), |f, s| write_quoted(f, s)),
            Payload::Object(o) => {
                let name = o.class.as_ref().map(|c| c.name()).unwrap_or("object");
                write_joined(f, o.elements.as_slice(), |f, _| write!(f, "<{}>", name))
            }
        }
    }
}

impl fmt::Debug for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ValueData");
        s.field("type", &self.element_type())
            .field("singleton", &self.is_singleton())
            .field("elements", &format_args!("{}", self));
        if let Some(dims) = &self.dims {
            s.field("dims", &dims.extents());
        }
        if self.invisible {
            s.field("invisible", &true);
        }
        s.finish()
    }
}
