//! Property signatures for object classes
//!
//! A [`PropertySignature`] is built once per property when its class is
//! set up, and checks every value that flows into or out of the property
//! afterwards. Declaration errors (a writable property that is not a
//! singleton, a mask that admits void or NULL, an accelerated accessor on
//! a union of kinds) are caught when the signature is built, not when the
//! property is first used.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::{type_name, Result, ValueError};
use crate::object::{ClassId, ObjectClass, ObjectElement};
use crate::token::Token;
use crate::value::{ValueData, ValueKind, ValueMask};

/// A direct, typed read of one property of one element.
///
/// The variant fixes the kind the property yields, so a getter can only be
/// attached to a signature whose mask names that kind alone.
#[derive(Clone, Copy)]
pub enum AcceleratedGetter {
    /// Yields a logical
    Logical(fn(&dyn ObjectElement) -> Result<bool>),
    /// Yields an integer
    Int(fn(&dyn ObjectElement) -> Result<i64>),
    /// Yields a float
    Float(fn(&dyn ObjectElement) -> Result<f64>),
    /// Yields a string
    String(fn(&dyn ObjectElement) -> Result<String>),
    /// Yields an object element
    Object(fn(&dyn ObjectElement) -> Result<Arc<dyn ObjectElement>>),
}

impl AcceleratedGetter {
    /// The kind this getter yields.
    pub fn kind(&self) -> ValueKind {
        match self {
            AcceleratedGetter::Logical(_) => ValueKind::Logical,
            AcceleratedGetter::Int(_) => ValueKind::Int,
            AcceleratedGetter::Float(_) => ValueKind::Float,
            AcceleratedGetter::String(_) => ValueKind::String,
            AcceleratedGetter::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Debug for AcceleratedGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AcceleratedGetter({})", self.kind())
    }
}

/// A direct, typed write of one property of one element.
#[derive(Clone, Copy)]
pub enum AcceleratedSetter {
    /// Accepts a logical
    Logical(fn(&dyn ObjectElement, bool) -> Result<()>),
    /// Accepts an integer
    Int(fn(&dyn ObjectElement, i64) -> Result<()>),
    /// Accepts a float
    Float(fn(&dyn ObjectElement, f64) -> Result<()>),
    /// Accepts a string
    String(fn(&dyn ObjectElement, &str) -> Result<()>),
    /// Accepts an object element
    Object(fn(&dyn ObjectElement, &Arc<dyn ObjectElement>) -> Result<()>),
}

impl AcceleratedSetter {
    /// The kind this setter accepts.
    pub fn kind(&self) -> ValueKind {
        match self {
            AcceleratedSetter::Logical(_) => ValueKind::Logical,
            AcceleratedSetter::Int(_) => ValueKind::Int,
            AcceleratedSetter::Float(_) => ValueKind::Float,
            AcceleratedSetter::String(_) => ValueKind::String,
            AcceleratedSetter::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Debug for AcceleratedSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AcceleratedSetter({})", self.kind())
    }
}

/// The declared contract of one object property.
#[derive(Debug, Clone)]
pub struct PropertySignature {
    name: String,
    read_only: bool,
    mask: ValueMask,

    /// Required element class of object values
    value_class: Option<(ClassId, String)>,

    getter: Option<AcceleratedGetter>,
    setter: Option<AcceleratedSetter>,
}

impl PropertySignature {
    /// Declare a property.
    ///
    /// The mask must name at least one kind and may not admit void or NULL.
    /// A writable property must carry [`ValueMask::SINGLETON`], since each
    /// element holds exactly one value for it.
    pub fn new(name: impl Into<String>, read_only: bool, mask: ValueMask) -> Result<Self> {
        let name = name.into();
        let kinds = mask.kinds();

        if kinds.is_empty() {
            return Err(declaration_error(&name, "the value mask names no kind".to_string()));
        }
        if kinds.intersects(ValueMask::VOID | ValueMask::NULL) {
            return Err(declaration_error(
                &name,
                format!("property values cannot be void or NULL, got mask {}", mask.describe(None)),
            ));
        }
        if !read_only && !mask.requires_singleton() {
            return Err(declaration_error(
                &name,
                "a read-write property must produce a singleton value".to_string(),
            ));
        }

        Ok(Self {
            name,
            read_only,
            mask,
            value_class: None,
            getter: None,
            setter: None,
        })
    }

    /// Require object values to be elements of `class`.
    pub fn with_class(mut self, class: &ObjectClass) -> Result<Self> {
        if !self.mask.accepts(ValueKind::Object) {
            return Err(declaration_error(
                &self.name,
                format!(
                    "an element class was given but the mask {} does not accept objects",
                    self.mask.describe(None)
                ),
            ));
        }
        self.value_class = Some((class.id(), class.name().to_string()));
        Ok(self)
    }

    /// Attach a typed getter.
    ///
    /// The mask must name exactly the getter's kind, and an object getter
    /// needs an element class.
    pub fn with_accelerated_getter(mut self, getter: AcceleratedGetter) -> Result<Self> {
        self.check_accelerated_kind(getter.kind(), "getter")?;
        self.getter = Some(getter);
        Ok(self)
    }

    /// Attach a typed setter. Only for read-write singleton properties.
    pub fn with_accelerated_setter(mut self, setter: AcceleratedSetter) -> Result<Self> {
        if self.read_only || !self.mask.requires_singleton() {
            return Err(declaration_error(
                &self.name,
                "an accelerated setter requires a read-write singleton property".to_string(),
            ));
        }
        self.check_accelerated_kind(setter.kind(), "setter")?;
        self.setter = Some(setter);
        Ok(self)
    }

    fn check_accelerated_kind(&self, kind: ValueKind, what: &str) -> Result<()> {
        if self.mask.single_kind() != Some(kind) {
            return Err(declaration_error(
                &self.name,
                format!(
                    "an accelerated {} of kind {} requires a mask of exactly that kind, got {}",
                    what,
                    kind,
                    self.mask.describe(self.class_name())
                ),
            ));
        }
        if kind == ValueKind::Object && self.value_class.is_none() {
            return Err(declaration_error(
                &self.name,
                format!("an accelerated object {} requires an element class", what),
            ));
        }
        Ok(())
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether scripts may only read the property.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The accepted-kind mask.
    pub fn mask(&self) -> ValueMask {
        self.mask
    }

    /// Id of the required element class, if any.
    pub fn value_class(&self) -> Option<ClassId> {
        self.value_class.as_ref().map(|(id, _)| *id)
    }

    /// Name of the required element class, if any.
    pub fn class_name(&self) -> Option<&str> {
        self.value_class.as_ref().map(|(_, name)| name.as_str())
    }

    /// The typed getter, if declared.
    pub fn accelerated_getter(&self) -> Option<AcceleratedGetter> {
        self.getter
    }

    /// The typed setter, if declared.
    pub fn accelerated_setter(&self) -> Option<AcceleratedSetter> {
        self.setter
    }

    /// `read-only` or `read-write`.
    pub fn property_type(&self) -> &'static str {
        if self.read_only {
            "read-only"
        } else {
            "read-write"
        }
    }

    /// `=>` for read-only properties, `<->` for read-write ones.
    pub fn symbol(&self) -> &'static str {
        if self.read_only {
            "=>"
        } else {
            "<->"
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value checks
    // ═══════════════════════════════════════════════════════════════════

    /// Check a value about to be assigned to the property.
    ///
    /// Logicals widen into integer and float properties, and integers into
    /// float properties. The element count is not checked here; the caller
    /// matches it against the number of target elements.
    pub fn check_assigned_value(&self, value: &ValueData, token: Option<Token>) -> Result<()> {
        const OPERATION: &str = "check_assigned_value";
        let kind = value.kind();
        let accepted = match kind {
            ValueKind::Void | ValueKind::Null => false,
            ValueKind::Logical => self.mask.intersects(ValueMask::LOGICAL_EQUIV),
            ValueKind::Int => self.mask.intersects(ValueMask::NUMERIC),
            ValueKind::Float | ValueKind::String | ValueKind::Object => self.mask.accepts(kind),
        };
        if !accepted {
            return Err(self.type_error(OPERATION, value, token));
        }
        self.check_class(OPERATION, value, token)
    }

    /// Check the value one element produced for the property.
    ///
    /// NULL is always allowed as a "not applicable" result, except for
    /// properties with an accelerated getter, which cannot produce it.
    pub fn check_result_value(&self, value: &ValueData, token: Option<Token>) -> Result<()> {
        self.check_result(value, 1, "check_result_value", token)
    }

    /// Check the concatenated results of reading the property from
    /// `element_count` elements.
    pub fn check_aggregate_result_value(
        &self,
        value: &ValueData,
        element_count: usize,
        token: Option<Token>,
    ) -> Result<()> {
        self.check_result(value, element_count, "check_aggregate_result_value", token)
    }

    fn check_result(
        &self,
        value: &ValueData,
        expected_count: usize,
        operation: &'static str,
        token: Option<Token>,
    ) -> Result<()> {
        let kind = value.kind();
        if kind == ValueKind::Null {
            if self.getter.is_some() {
                return Err(ValueError::Property {
                    operation,
                    property: self.name.clone(),
                    message: format!(
                        "{} property {} has an accelerated getter and cannot produce NULL",
                        self.property_type(),
                        self.name
                    ),
                    token,
                });
            }
            return Ok(());
        }

        if kind == ValueKind::Void || !self.mask.accepts(kind) {
            return Err(self.type_error(operation, value, token));
        }
        self.check_class(operation, value, token)?;

        if self.mask.requires_singleton() && value.count() != expected_count {
            return Err(ValueError::Property {
                operation,
                property: self.name.clone(),
                message: format!(
                    "{} property {} must produce one value per element ({} expected), got {}",
                    self.property_type(),
                    self.name,
                    expected_count,
                    value.count()
                ),
                token,
            });
        }
        Ok(())
    }

    fn check_class(&self, operation: &'static str, value: &ValueData, token: Option<Token>) -> Result<()> {
        let (required, required_name) = match &self.value_class {
            Some((id, name)) if value.kind() == ValueKind::Object && value.count() > 0 => (*id, name),
            _ => return Ok(()),
        };
        match value.class() {
            Some(class) if class.id() == required => Ok(()),
            _ => Err(ValueError::Property {
                operation,
                property: self.name.clone(),
                message: format!(
                    "object value cannot be element type {} for {} property {}; expected object element type {}",
                    value.element_type(),
                    self.property_type(),
                    self.name,
                    required_name
                ),
                token,
            }),
        }
    }

    fn type_error(&self, operation: &'static str, value: &ValueData, token: Option<Token>) -> ValueError {
        ValueError::Property {
            operation,
            property: self.name.clone(),
            message: format!(
                "value cannot be type {} for {} property {}; declared type is {}",
                type_name(value),
                self.property_type(),
                self.name,
                self.mask.describe(self.class_name())
            ),
            token,
        }
    }
}

fn declaration_error(name: &str, message: String) -> ValueError {
    ValueError::Property {
        operation: "PropertySignature::new",
        property: name.to_string(),
        message: format!("property {}: {}", name, message),
        token: None,
    }
}

impl fmt::Display for PropertySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.name,
            self.symbol(),
            self.mask.describe(self.class_name())
        )
    }
}

impl PartialEq for PropertySignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PropertySignature {}

impl PartialOrd for PropertySignature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Signatures order by name.
impl Ord for PropertySignature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}
