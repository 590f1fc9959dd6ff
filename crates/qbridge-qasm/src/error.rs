//! Error types for the QASM reader.

use thiserror::Error;

/// Errors that can occur while reading or writing QASM.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The file could not be read.
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}: {message}")]
    LexerError { line: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Only `OPENQASM 2.x` is accepted.
    #[error("Unsupported OPENQASM version: {0}")]
    InvalidVersion(String),

    /// Include of a file other than the standard library.
    #[error("Unsupported include: \"{0}\"")]
    UnsupportedInclude(String),

    #[error("Undefined identifier: {0}")]
    UndefinedIdentifier(String),

    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// Register arguments of one statement differ in size.
    #[error("Register size mismatch in '{statement}': {sizes:?}")]
    BroadcastMismatch { statement: String, sizes: Vec<u32> },

    /// Valid QASM that this reader does not lower.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] qbridge_ir::IrError),
}

/// Result type for QASM operations.
pub type ParseResult<T> = Result<T, ParseError>;
