//! Error types for Tessera.
//!
//! Uses `thiserror` for error definitions. Stale entity references are not
//! errors anywhere in Tessera; they surface as `None`/`false` results.

use std::fmt;

use thiserror::Error;

use crate::entity::Entity;

/// The main error type for Tessera operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unknown component error.
    #[must_use]
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownComponent(name.into()))
    }

    /// Creates an unknown resource error.
    #[must_use]
    pub fn unknown_resource(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownResource(name.into()))
    }

    /// Creates an invalid schema error.
    #[must_use]
    pub fn invalid_schema(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSchema {
            component: component.into(),
            message: message.into(),
        })
    }

    /// Creates a validation error for a rejected value.
    #[must_use]
    pub fn validation(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation {
            component: component.into(),
            message: message.into(),
        })
    }

    /// Creates an unknown transaction error.
    #[must_use]
    pub fn unknown_transaction(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownTransaction(name.into()))
    }

    /// Returns true if this error rejected a value without touching the store.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A component name was not declared in the store schema.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A resource name was not declared in the store schema.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// A named archetype was not declared in the store schema.
    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),

    /// A schema cannot be turned into storage.
    #[error("invalid schema for {component}: {message}")]
    InvalidSchema {
        /// The component or resource owning the schema.
        component: String,
        /// Why the schema was rejected.
        message: String,
    },

    /// A value does not satisfy its schema.
    #[error("invalid value for {component}: {message}")]
    Validation {
        /// The component or resource being written.
        component: String,
        /// Why the value was rejected.
        message: String,
    },

    /// No transaction function is registered under this name.
    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The entity being written, if any.
    pub entity: Option<Entity>,
    /// The transaction function being executed, if any.
    pub transaction: Option<String>,
    /// Operations leading to the error, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity.
    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Sets the transaction name.
    #[must_use]
    pub fn with_transaction(mut self, name: impl Into<String>) -> Self {
        self.transaction = Some(name.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.transaction {
            write!(f, "in transaction {name}")?;
        }
        if let Some(entity) = self.entity {
            write!(f, " on {entity}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias using the Tessera error type.
pub type Result<T> = std::result::Result<T, Error>;
