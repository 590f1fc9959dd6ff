//! Error types for circuit conversion.

use qbridge_ir::IrError;
use qbridge_qasm::ParseError;
use thiserror::Error;

use crate::wires::Wire;

/// Errors raised while loading or applying a circuit template.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The QASM source could not be read or parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The circuit is malformed.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(#[from] IrError),

    /// The binding names parameters the circuit does not use.
    #[error("Cannot bind parameters ({}) not present in the circuit.", .0.join(", "))]
    UnknownParameters(Vec<String>),

    /// A bound value is not a finite number.
    #[error("Invalid value {value} for parameter {name}.")]
    InvalidParameterValue { name: String, value: f64 },

    /// A parameter is still symbolic after binding.
    #[error("The parameter {0} was not bound correctly.")]
    UnboundParameter(String),

    /// The caller's wire count differs from the circuit's qubit count.
    #[error(
        "The specified number of wires - {got} - does not match the number of wires the loaded quantum circuit acts on."
    )]
    WireCountMismatch { expected: usize, got: usize },

    /// A wire label was given more than once.
    #[error("Wire {0} is specified more than once.")]
    DuplicateWire(Wire),

    /// An explicit unitary has the wrong shape or is not unitary.
    #[error("Invalid matrix for {name}: {reason}")]
    InvalidMatrix { name: String, reason: String },
}

impl ConvertError {
    /// True when the error originates from reading a file.
    pub fn is_io(&self) -> bool {
        matches!(self, ConvertError::Parse(ParseError::Io { .. }))
    }
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
