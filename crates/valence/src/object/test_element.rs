//! A built-in element class for exercising property dispatch
//!
//! `TestElement` stores one integer, its `yolk`, and a free-form `tag`.
//! Its properties cover each dispatch path: an accelerated read-write
//! integer, a generic read-only float, a generic read-write string, and a
//! read-only integer that is never applicable and always reads as NULL.

use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::error::{Result, ValueError};
use crate::property::{AcceleratedGetter, AcceleratedSetter, PropertySignature};
use crate::token::Token;
use crate::value::{Value, ValueData, ValueMask};

use super::{undefined_property, ObjectClass, ObjectElement};

/// Name under which the class is registered.
pub const TEST_ELEMENT_CLASS_NAME: &str = "TestElement";

static CLASS: OnceLock<Arc<ObjectClass>> = OnceLock::new();
static DEFINITION: OnceLock<Result<()>> = OnceLock::new();

/// A simple element with an integer `yolk` and a string `tag`.
#[derive(Debug)]
pub struct TestElement {
    yolk: AtomicI64,
    tag: Mutex<String>,
}

impl TestElement {
    /// Create an element. The class keeps elements alive by retain/release.
    pub fn new(yolk: i64) -> Arc<TestElement> {
        Arc::new(Self {
            yolk: AtomicI64::new(yolk),
            tag: Mutex::new(String::new()),
        })
    }

    /// Current yolk.
    pub fn yolk(&self) -> i64 {
        self.yolk.load(Ordering::Relaxed)
    }

    /// Current tag.
    pub fn tag(&self) -> String {
        self.tag.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_tag(&self, tag: &str) {
        *self.tag.lock().unwrap_or_else(PoisonError::into_inner) = tag.to_string();
    }
}

fn downcast(element: &dyn ObjectElement) -> Result<&TestElement> {
    element
        .as_any()
        .downcast_ref::<TestElement>()
        .ok_or_else(|| ValueError::Class {
            message: format!(
                "accessor for {} applied to an element of class {}",
                TEST_ELEMENT_CLASS_NAME,
                element.class().name()
            ),
            token: None,
        })
}

fn get_yolk(element: &dyn ObjectElement) -> Result<i64> {
    Ok(downcast(element)?.yolk())
}

fn set_yolk(element: &dyn ObjectElement, value: i64) -> Result<()> {
    downcast(element)?.yolk.store(value, Ordering::Relaxed);
    Ok(())
}

fn signatures() -> Result<Vec<PropertySignature>> {
    Ok(vec![
        PropertySignature::new("yolk", false, ValueMask::INT | ValueMask::SINGLETON)?
            .with_accelerated_getter(AcceleratedGetter::Int(get_yolk))?
            .with_accelerated_setter(AcceleratedSetter::Int(set_yolk))?,
        PropertySignature::new("half", true, ValueMask::FLOAT | ValueMask::SINGLETON)?,
        PropertySignature::new("tag", false, ValueMask::STRING | ValueMask::SINGLETON)?,
        PropertySignature::new("absent", true, ValueMask::INT | ValueMask::SINGLETON)?,
    ])
}

/// The `TestElement` class, with its property table defined.
pub fn test_element_class() -> &'static Arc<ObjectClass> {
    CLASS.get_or_init(|| {
        let class = Arc::new(ObjectClass::new(TEST_ELEMENT_CLASS_NAME, true));
        let outcome = signatures().and_then(|table| class.define_properties(table, None));
        if let Err(err) = &outcome {
            tracing::error!(error = %err, "failed to define TestElement properties");
        }
        debug_assert!(outcome.is_ok(), "TestElement property table is invalid");
        let _ = DEFINITION.set(outcome);
        class
    })
}

/// Outcome of defining the `TestElement` property table.
pub(crate) fn test_element_definition() -> Result<()> {
    test_element_class();
    DEFINITION.get().cloned().unwrap_or(Ok(()))
}

impl ObjectElement for TestElement {
    fn class(&self) -> &Arc<ObjectClass> {
        test_element_class()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_property(&self, name: &str, token: Option<Token>) -> Result<Value> {
        match name {
            "yolk" => Ok(Value::int(self.yolk())),
            "half" => Ok(Value::float(self.yolk() as f64 / 2.0)),
            "tag" => Ok(Value::string(self.tag())),
            "absent" => Ok(Value::null()),
            _ => Err(undefined_property(self.class(), name, "get_property", token)),
        }
    }

    fn set_property(&self, name: &str, value: &ValueData, token: Option<Token>) -> Result<()> {
        match name {
            "yolk" => {
                self.yolk.store(value.int_at(0, token)?, Ordering::Relaxed);
                Ok(())
            }
            "tag" => {
                self.set_tag(&value.string_at(0, token)?);
                Ok(())
            }
            _ => Err(undefined_property(self.class(), name, "set_property", token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_has_properties() {
        let class = test_element_class();
        assert_eq!(class.name(), "TestElement");
        assert!(class.uses_retain_release());
        let names: Vec<_> = class.sorted_properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["absent", "half", "tag", "yolk"]);
        assert!(class.property("yolk").and_then(|p| p.accelerated_getter()).is_some());
    }

    #[test]
    fn test_definition_outcome_is_recorded() {
        assert_eq!(test_element_definition(), Ok(()));
        assert!(DEFINITION.get().is_some());
        assert!(signatures().is_ok());
    }

    #[test]
    fn test_generic_accessors() {
        let egg = TestElement::new(5);
        assert_eq!(egg.get_property("half", None).unwrap(), Value::float(2.5));
        egg.set_property("tag", &Value::string("brown"), None).unwrap();
        assert_eq!(egg.tag(), "brown");
        assert!(egg.get_property("shell", None).is_err());
    }

    #[test]
    fn test_accelerated_accessors() {
        let egg = TestElement::new(5);
        set_yolk(&*egg, 9).unwrap();
        assert_eq!(get_yolk(&*egg).unwrap(), 9);
    }
}
