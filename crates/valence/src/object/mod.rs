//! Object elements, their classes, and property dispatch
//!
//! Object values hold references to elements owned by the host program.
//! A class that opts into retain/release has its elements kept alive by
//! every value that refers to them; elements of other classes are only
//! borrowed, and reading one after its owner dropped it is an error.

mod class;
mod dispatch;
mod registry;
mod test_element;

pub use class::{ClassId, ObjectClass};
pub use registry::{global_registry, ClassRegistry};
pub(crate) use test_element::test_element_definition;
pub use test_element::{test_element_class, TestElement, TEST_ELEMENT_CLASS_NAME};

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{Result, ValueError};
use crate::token::Token;
use crate::value::{Value, ValueData};

/// An element that object values can refer to.
///
/// Property reads and writes that have no accelerated accessor are routed
/// through [`ObjectElement::get_property`] and
/// [`ObjectElement::set_property`]. The defaults report the property as
/// undefined for the element's class.
pub trait ObjectElement: Send + Sync + fmt::Debug {
    /// The element's class.
    fn class(&self) -> &Arc<ObjectClass>;

    /// Downcasting support for accelerated accessors.
    fn as_any(&self) -> &dyn Any;

    /// Read property `name`.
    fn get_property(&self, name: &str, token: Option<Token>) -> Result<Value> {
        Err(undefined_property(self.class(), name, "get_property", token))
    }

    /// Write property `name`. The value has already passed the signature check.
    fn set_property(&self, name: &str, value: &ValueData, token: Option<Token>) -> Result<()> {
        let _ = value;
        Err(undefined_property(self.class(), name, "set_property", token))
    }
}

pub(crate) fn undefined_property(
    class: &ObjectClass,
    name: &str,
    operation: &'static str,
    token: Option<Token>,
) -> ValueError {
    ValueError::Property {
        operation,
        property: name.to_string(),
        message: format!(
            "property {} is not defined for object element type {}",
            name,
            class.name()
        ),
        token,
    }
}

/// One entry of an object value's payload.
#[derive(Clone)]
pub enum ElementRef {
    /// Kept alive by the value
    Retained(Arc<dyn ObjectElement>),

    /// Owned elsewhere; may have been dropped
    External(Weak<dyn ObjectElement>),
}

impl ElementRef {
    /// Refer to `element`, keeping it alive only if `retain` is set.
    pub fn new(element: &Arc<dyn ObjectElement>, retain: bool) -> Self {
        if retain {
            ElementRef::Retained(Arc::clone(element))
        } else {
            ElementRef::External(Arc::downgrade(element))
        }
    }

    /// The element, unless it was external and has been dropped.
    pub fn get(&self) -> Option<Arc<dyn ObjectElement>> {
        match self {
            ElementRef::Retained(element) => Some(Arc::clone(element)),
            ElementRef::External(element) => element.upgrade(),
        }
    }

    /// Whether the value keeps this element alive.
    pub fn is_retained(&self) -> bool {
        matches!(self, ElementRef::Retained(_))
    }

    fn address(&self) -> *const () {
        match self {
            ElementRef::Retained(element) => Arc::as_ptr(element).cast::<()>(),
            ElementRef::External(element) => element.as_ptr().cast::<()>(),
        }
    }

    /// Identity comparison. Never dereferences the element.
    pub fn same_element(&self, other: &ElementRef) -> bool {
        std::ptr::eq(self.address(), other.address())
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Retained(_) => write!(f, "Retained({:p})", self.address()),
            ElementRef::External(_) => write!(f, "External({:p})", self.address()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retained_keeps_element_alive() {
        let element: Arc<dyn ObjectElement> = TestElement::new(1);
        let held = ElementRef::new(&element, true);
        drop(element);
        assert!(held.get().is_some());
    }

    #[test]
    fn test_external_reference_can_dangle() {
        let element: Arc<dyn ObjectElement> = TestElement::new(1);
        let held = ElementRef::new(&element, false);
        assert!(held.get().is_some());
        drop(element);
        assert!(held.get().is_none());
    }

    #[test]
    fn test_identity_across_disciplines() {
        let element: Arc<dyn ObjectElement> = TestElement::new(1);
        let other: Arc<dyn ObjectElement> = TestElement::new(1);
        let strong = ElementRef::new(&element, true);
        let weak = ElementRef::new(&element, false);
        assert!(strong.same_element(&weak));
        assert!(!strong.same_element(&ElementRef::new(&other, true)));
    }
}
