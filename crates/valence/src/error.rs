//! Error types for value runtime operations

use thiserror::Error;

use crate::token::Token;
use crate::value::ValueData;

/// Main error type for value runtime operations.
///
/// Every variant carries the diagnostic token of the expression being
/// evaluated when the failure happened, if the caller supplied one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// A value of the wrong kind was supplied
    #[error("Type error ({operation}): expected {expected}, got {got}")]
    TypeMismatch {
        /// Operation that failed
        operation: &'static str,
        /// Expected kind(s)
        expected: String,
        /// Actual kind received
        got: String,
        /// Source position
        token: Option<Token>,
    },

    /// An element could not be converted to the requested kind
    #[error("Conversion error ({operation}): {message}")]
    Conversion {
        /// Operation that failed
        operation: &'static str,
        /// What went wrong
        message: String,
        /// Source position
        token: Option<Token>,
    },

    /// Element index outside `0..count`
    #[error("Index error ({operation}): index {index} out of range for value of size {count}")]
    IndexOutOfRange {
        /// Operation that failed
        operation: &'static str,
        /// Requested index
        index: usize,
        /// Element count of the value
        count: usize,
        /// Source position
        token: Option<Token>,
    },

    /// Resizing or buffer access attempted on a singleton
    #[error("Mutation error ({operation}): singleton {kind} value has no mutable buffer")]
    SingletonMutation {
        /// Operation that failed
        operation: &'static str,
        /// Kind name of the value
        kind: &'static str,
        /// Source position
        token: Option<Token>,
    },

    /// In-place mutation attempted on a shared or constant value
    #[error("Mutation error ({operation}): value is shared and cannot be modified in place")]
    SharedMutation {
        /// Operation that failed
        operation: &'static str,
        /// Source position
        token: Option<Token>,
    },

    /// Invalid shape descriptor
    #[error("Dimension error ({operation}): {message}")]
    Dimensions {
        /// Operation that failed
        operation: &'static str,
        /// What went wrong
        message: String,
        /// Source position
        token: Option<Token>,
    },

    /// Operands that cannot be combined element-wise
    #[error("Conformability error ({operation}): {message}")]
    NonConformable {
        /// Operation that failed
        operation: &'static str,
        /// What went wrong
        message: String,
        /// Source position
        token: Option<Token>,
    },

    /// Illegal comparison (void, NULL, object ordering, object vs. non-object)
    #[error("Comparison error: {message}")]
    Comparison {
        /// What went wrong
        message: String,
        /// Source position
        token: Option<Token>,
    },

    /// Integer arithmetic left the 64-bit range
    #[error("Overflow error ({operation}): integer overflow")]
    IntegerOverflow {
        /// Operation that failed
        operation: &'static str,
        /// Source position
        token: Option<Token>,
    },

    /// Property signature violation
    #[error("Property error ({operation}): {message}")]
    Property {
        /// Operation that failed
        operation: &'static str,
        /// Property name
        property: String,
        /// What went wrong
        message: String,
        /// Source position
        token: Option<Token>,
    },

    /// Class registry or element class violation
    #[error("Class error: {message}")]
    Class {
        /// What went wrong
        message: String,
        /// Source position
        token: Option<Token>,
    },

    /// An externally owned element was dropped by its owner
    #[error("Element error ({operation}): object element has been released by its owner")]
    ElementReleased {
        /// Operation that failed
        operation: &'static str,
        /// Source position
        token: Option<Token>,
    },
}

impl ValueError {
    /// The diagnostic token attached to this error, if any.
    pub fn token(&self) -> Option<Token> {
        match self {
            ValueError::TypeMismatch { token, .. }
            | ValueError::Conversion { token, .. }
            | ValueError::IndexOutOfRange { token, .. }
            | ValueError::SingletonMutation { token, .. }
            | ValueError::SharedMutation { token, .. }
            | ValueError::Dimensions { token, .. }
            | ValueError::NonConformable { token, .. }
            | ValueError::Comparison { token, .. }
            | ValueError::IntegerOverflow { token, .. }
            | ValueError::Property { token, .. }
            | ValueError::Class { token, .. }
            | ValueError::ElementReleased { token, .. } => *token,
        }
    }

    /// Attach `token` unless the error already carries one.
    pub fn with_token(mut self, token: Option<Token>) -> Self {
        let slot = match &mut self {
            ValueError::TypeMismatch { token, .. }
            | ValueError::Conversion { token, .. }
            | ValueError::IndexOutOfRange { token, .. }
            | ValueError::SingletonMutation { token, .. }
            | ValueError::SharedMutation { token, .. }
            | ValueError::Dimensions { token, .. }
            | ValueError::NonConformable { token, .. }
            | ValueError::Comparison { token, .. }
            | ValueError::IntegerOverflow { token, .. }
            | ValueError::Property { token, .. }
            | ValueError::Class { token, .. }
            | ValueError::ElementReleased { token, .. } => token,
        };
        if slot.is_none() {
            *slot = token;
        }
        self
    }

    /// The message with its source position, as shown to the script user.
    pub fn report(&self) -> String {
        match self.token() {
            Some(token) => format!("{} (at {})", self, token),
            None => self.to_string(),
        }
    }
}

/// Human-readable type of a value for error messages.
///
/// Object values report their element class, e.g. `object<TestElement>`.
pub fn type_name(value: &ValueData) -> String {
    match value.class() {
        Some(class) => format!("object<{}>", class.name()),
        None => value.kind().name().to_string(),
    }
}

/// Result type alias for value runtime operations
pub type Result<T> = std::result::Result<T, ValueError>;
