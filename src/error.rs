//! Error types for the netlist compiler.
//!
//! This module provides a unified error type [`NetlistError`] that covers
//! all error conditions that can occur while parsing a source file, lowering
//! it into a circuit specification, and reading or writing that
//! specification. The tokenizer never fails, so there is no lexer variant.

use thiserror::Error;

/// Result type alias using [`NetlistError`].
pub type Result<T> = std::result::Result<T, NetlistError>;

/// Unified error type for all compiler operations.
#[derive(Error, Debug)]
pub enum NetlistError {
    // ============ Parsing Errors ============
    /// A production's required token sequence did not match
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    // ============ Lowering Errors ============
    /// The file declares no entity
    #[error("No entity declaration found")]
    MissingEntity,

    /// The file declares no architecture
    #[error("No architecture declaration found")]
    MissingArchitecture,

    /// More than one entity in a single file
    #[error("Duplicate entity '{name}' (a file must declare exactly one entity)")]
    DuplicateEntity { name: String },

    /// More than one architecture in a single file
    #[error("Duplicate architecture '{name}' (a file must declare exactly one architecture)")]
    DuplicateArchitecture { name: String },

    /// The architecture is bound to a different entity
    #[error("Architecture '{architecture}' implements entity '{found}', but the file declares '{expected}'")]
    EntityMismatch {
        architecture: String,
        expected: String,
        found: String,
    },

    /// Identifier does not name a port or signal
    #[error("Signal '{name}' is not declared")]
    UnresolvedSignal { name: String },

    /// Signal or port declared twice
    #[error("Duplicate signal name '{name}'")]
    DuplicateSignal { name: String },

    /// A user signal collides with a constant rail
    #[error("Signal name '{name}' is reserved for a constant rail")]
    ReservedSignalName { name: String },

    /// A construct that cannot appear where it was found
    #[error("Invalid statement: {message}")]
    InvalidStatement { message: String },

    /// Process bodies other than if/if-else/when-else
    #[error("Unsupported process: {message}")]
    UnsupportedProcess { message: String },

    /// Operator is recognized by the grammar but has no logic lowering
    #[error("Operator '{operator}' is not implemented")]
    NotImplemented { operator: String },

    // ============ Validation Errors ============
    /// A logic element references an undeclared name
    #[error("Logic element {element} references undeclared signal '{name}'")]
    DanglingReference { element: usize, name: String },

    // ============ I/O Errors ============
    /// Error reading a source file
    #[error("Failed to read source file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error converting a specification to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NetlistError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an unresolved signal error
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedSignal { name: name.into() }
    }

    /// Create an invalid statement error
    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::InvalidStatement {
            message: message.into(),
        }
    }

    /// Create an unsupported process error
    pub fn unsupported_process(message: impl Into<String>) -> Self {
        Self::UnsupportedProcess {
            message: message.into(),
        }
    }

    /// Create a not implemented error
    pub fn not_implemented(operator: impl Into<String>) -> Self {
        Self::NotImplemented {
            operator: operator.into(),
        }
    }

    /// True if the error was raised by the parser.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }

    /// True if the error was raised while lowering a parsed file.
    pub fn is_lowering_error(&self) -> bool {
        matches!(
            self,
            Self::MissingEntity
                | Self::MissingArchitecture
                | Self::DuplicateEntity { .. }
                | Self::DuplicateArchitecture { .. }
                | Self::EntityMismatch { .. }
                | Self::UnresolvedSignal { .. }
                | Self::DuplicateSignal { .. }
                | Self::ReservedSignalName { .. }
                | Self::InvalidStatement { .. }
                | Self::UnsupportedProcess { .. }
                | Self::NotImplemented { .. }
                | Self::DanglingReference { .. }
        )
    }

    /// True for operators the grammar accepts but lowering does not support yet.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}
