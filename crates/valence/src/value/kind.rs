//! Value kinds and kind masks

use std::fmt;

/// The fixed type tag of a value.
///
/// Declaration order is promotion order: for the comparable kinds,
/// `Logical < Int < Float < String`. `Void` and `Null` never promote, and
/// nothing promotes to `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    /// The result of an expression that produces nothing
    Void,

    /// The NULL value
    Null,

    /// Booleans
    Logical,

    /// 64-bit signed integers
    Int,

    /// Double-precision floats
    Float,

    /// Strings
    String,

    /// References to object elements
    Object,
}

impl ValueKind {
    /// Script-visible name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Null => "NULL",
            ValueKind::Logical => "logical",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Object => "object",
        }
    }

    /// Whether the kind sits on the promotion ladder.
    pub fn is_promotable(self) -> bool {
        matches!(
            self,
            ValueKind::Logical | ValueKind::Int | ValueKind::Float | ValueKind::String
        )
    }

    /// Whether arithmetic treats the kind as a number.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Logical | ValueKind::Int | ValueKind::Float)
    }

    /// The mask bit for this kind.
    pub fn mask(self) -> ValueMask {
        match self {
            ValueKind::Void => ValueMask::VOID,
            ValueKind::Null => ValueMask::NULL,
            ValueKind::Logical => ValueMask::LOGICAL,
            ValueKind::Int => ValueMask::INT,
            ValueKind::Float => ValueMask::FLOAT,
            ValueKind::String => ValueMask::STRING,
            ValueKind::Object => ValueMask::OBJECT,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// A set of accepted kinds, plus qualifiers.
    ///
    /// Used by property signatures to describe what a property yields and
    /// accepts. `SINGLETON` requires exactly one element; `OPTIONAL` marks
    /// an argument that may be omitted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValueMask: u32 {
        /// void
        const VOID = 1 << 0;
        /// NULL
        const NULL = 1 << 1;
        /// logical
        const LOGICAL = 1 << 2;
        /// integer
        const INT = 1 << 3;
        /// float
        const FLOAT = 1 << 4;
        /// string
        const STRING = 1 << 5;
        /// object
        const OBJECT = 1 << 6;

        /// Exactly one element
        const SINGLETON = 1 << 30;
        /// May be omitted
        const OPTIONAL = 1 << 31;

        /// integer or float
        const NUMERIC = Self::INT.bits() | Self::FLOAT.bits();
        /// logical, integer, or float
        const LOGICAL_EQUIV = Self::LOGICAL.bits() | Self::NUMERIC.bits();
        /// any kind except void and object
        const ANY_BASE = Self::NULL.bits() | Self::LOGICAL_EQUIV.bits() | Self::STRING.bits();
        /// any kind except void
        const ANY = Self::ANY_BASE.bits() | Self::OBJECT.bits();
    }
}

const KIND_ORDER: [ValueKind; 7] = [
    ValueKind::Void,
    ValueKind::Null,
    ValueKind::Logical,
    ValueKind::Int,
    ValueKind::Float,
    ValueKind::String,
    ValueKind::Object,
];

impl ValueMask {
    /// The mask with `SINGLETON` and `OPTIONAL` stripped.
    pub fn kinds(self) -> ValueMask {
        self.difference(ValueMask::SINGLETON | ValueMask::OPTIONAL)
    }

    /// Whether the mask requires exactly one element.
    pub fn requires_singleton(self) -> bool {
        self.contains(ValueMask::SINGLETON)
    }

    /// Whether values of `kind` are in the mask.
    pub fn accepts(self, kind: ValueKind) -> bool {
        self.contains(kind.mask())
    }

    /// The kind, if the mask names exactly one.
    pub fn single_kind(self) -> Option<ValueKind> {
        let kinds = self.kinds();
        KIND_ORDER.into_iter().find(|kind| kind.mask() == kinds)
    }

    /// Compact signature notation, e.g. `integer$`, `lif`, `object<Egg>`.
    pub fn describe(self, class_name: Option<&str>) -> String {
        let kinds = self.kinds();
        let mut out = String::new();

        if self.contains(ValueMask::OPTIONAL) {
            out.push('[');
        }

        if kinds.is_empty() {
            out.push('?');
        } else if kinds == ValueMask::ANY {
            out.push('*');
        } else if kinds == ValueMask::ANY_BASE {
            out.push('+');
        } else if kinds == ValueMask::NUMERIC {
            out.push_str("numeric");
        } else if let Some(kind) = self.single_kind() {
            out.push_str(kind.name());
        } else {
            for (flag, letter) in [
                (ValueMask::VOID, 'v'),
                (ValueMask::NULL, 'N'),
                (ValueMask::LOGICAL, 'l'),
                (ValueMask::INT, 'i'),
                (ValueMask::FLOAT, 'f'),
                (ValueMask::STRING, 's'),
                (ValueMask::OBJECT, 'o'),
            ] {
                if kinds.contains(flag) {
                    out.push(letter);
                }
            }
        }

        if let Some(name) = class_name {
            if kinds.contains(ValueMask::OBJECT) {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }
        }

        if self.requires_singleton() {
            out.push('$');
        }

        if self.contains(ValueMask::OPTIONAL) {
            out.push(']');
        }

        out
    }
}
