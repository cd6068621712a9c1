//! Object element classes and their property tables

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::error::{Result, ValueError};
use crate::property::PropertySignature;
use crate::token::Token;

static NEXT_CLASS_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of an [`ObjectClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// The raw id.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// The class of a family of object elements.
///
/// The property table is defined once, after construction, so that a
/// class can be shared (and registered) before its signatures exist.
pub struct ObjectClass {
    id: ClassId,
    name: String,
    retain_release: bool,

    /// Signatures in declaration order
    properties: OnceLock<IndexMap<String, Arc<PropertySignature>>>,
}

impl ObjectClass {
    /// Create a class with an empty, not yet defined property table.
    pub fn new(name: impl Into<String>, retain_release: bool) -> Self {
        Self {
            id: ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            retain_release,
            properties: OnceLock::new(),
        }
    }

    /// Process-unique class id.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name as shown to scripts.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether object values keep elements of this class alive.
    pub fn uses_retain_release(&self) -> bool {
        self.retain_release
    }

    /// Install the property table. Allowed once; names must be unique.
    pub fn define_properties(&self, signatures: Vec<PropertySignature>, token: Option<Token>) -> Result<()> {
        let mut table = IndexMap::with_capacity(signatures.len());
        for signature in signatures {
            let name = signature.name().to_string();
            if table.contains_key(&name) {
                return Err(ValueError::Class {
                    message: format!("property {} is defined twice for class {}", name, self.name),
                    token,
                });
            }
            table.insert(name, Arc::new(signature));
        }

        let count = table.len();
        self.properties.set(table).map_err(|_| ValueError::Class {
            message: format!("properties of class {} are already defined", self.name),
            token,
        })?;

        tracing::debug!(class = %self.name, count, "defined property table");
        Ok(())
    }

    /// The signature of property `name`.
    pub fn property(&self, name: &str) -> Option<&Arc<PropertySignature>> {
        self.properties.get().and_then(|table| table.get(name))
    }

    /// The signature of property `name`, or a positioned error.
    pub fn property_or_raise(&self, name: &str, token: Option<Token>) -> Result<&Arc<PropertySignature>> {
        self.property(name)
            .ok_or_else(|| crate::object::undefined_property(self, name, "property", token))
    }

    /// All signatures in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Arc<PropertySignature>> {
        self.properties.get().into_iter().flat_map(|table| table.values())
    }

    /// All signatures ordered by name, as listed to script users.
    pub fn sorted_properties(&self) -> Vec<&Arc<PropertySignature>> {
        let mut sorted: Vec<_> = self.properties().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }
}

impl fmt::Debug for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectClass")
            .field("id", &self.id.0)
            .field("name", &self.name)
            .field("retain_release", &self.retain_release)
            .field("properties", &self.properties().count())
            .finish()
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
