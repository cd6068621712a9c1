//! # Valence
//!
//! The value runtime of a small, vectorized, dynamically typed scripting
//! language.
//!
//! Every script value is a vector of zero or more elements of one kind:
//! logical, integer, float, string, or object reference, plus the special
//! void and NULL kinds. Values are shared through reference-counted
//! handles and modified in place only while a single owner holds them.
//!
//! ## Architecture
//!
//! - **Values**: [`Value`] handles over [`ValueData`], with typed element
//!   access, conversion, mutation, and canonical constants
//! - **Shape**: an optional matrix/array overlay on any value
//! - **Comparison**: cross-kind promotion and NaN-aware operators
//! - **Objects**: host-owned elements, classes, and property signatures
//! - **Arena**: reuse of payload buffers released by dropped values
//!
//! Call [`runtime::warm_up`] once at startup to set up the arena and the
//! built-in classes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod compare;
pub mod context;
pub mod error;
pub mod object;
pub mod ops;
pub mod property;
pub mod runtime;
pub mod shape;
pub mod token;
pub mod value;

// Re-export main types
pub use compare::{compare, promotion_kind, CompareOp};
pub use context::RuntimeContext;
pub use error::{type_name, Result, ValueError};
pub use object::{
    global_registry, test_element_class, ClassId, ClassRegistry, ElementRef, ObjectClass,
    ObjectElement, TestElement,
};
pub use ops::{binary_arithmetic, binary_comparison, ArithOp};
pub use property::{AcceleratedGetter, AcceleratedSetter, PropertySignature};
pub use shape::{resolve_binary_shape, AxisSelector, Dimensions, ShapeOwner};
pub use token::Token;
pub use value::{constants, format_float, StaticValue, Value, ValueData, ValueKind, ValueMask};

/// Valence version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
