//! Registry of object classes by name

use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{Result, ValueError};
use crate::token::Token;

use super::ObjectClass;

static REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

/// Classes known to the runtime, looked up by name.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: DashMap<String, Arc<ObjectClass>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `class`. A second class with the same name is refused.
    pub fn register(&self, class: Arc<ObjectClass>, token: Option<Token>) -> Result<Arc<ObjectClass>> {
        match self.classes.entry(class.name().to_string()) {
            Entry::Occupied(_) => Err(ValueError::Class {
                message: format!("class {} is already registered", class.name()),
                token,
            }),
            Entry::Vacant(slot) => {
                tracing::debug!(class = %class.name(), id = class.id().get(), "registered class");
                slot.insert(Arc::clone(&class));
                Ok(class)
            }
        }
    }

    /// The class called `name`.
    pub fn get(&self, name: &str) -> Option<Arc<ObjectClass>> {
        self.classes.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// The class called `name`, or a positioned error.
    pub fn get_or_raise(&self, name: &str, token: Option<Token>) -> Result<Arc<ObjectClass>> {
        self.get(name).ok_or_else(|| ValueError::Class {
            message: format!("no class named {}", name),
            token,
        })
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}

/// The process-wide registry.
pub fn global_registry() -> &'static ClassRegistry {
    REGISTRY.get_or_init(ClassRegistry::new)
}
