//! `OpenQASM` 2.0 reader and writer for qbridge
//!
//! Reads the `OPENQASM 2.0` dialect into a [`qbridge_ir::Circuit`] and writes
//! circuits back out for submission to remote backends.
//!
//! # Supported Features
//!
//! | Feature | Status | Example |
//! |---------|--------|---------|
//! | Version header (optional) | ✅ | `OPENQASM 2.0;` |
//! | Standard library include | ✅ | `include "qelib1.inc";` |
//! | Registers | ✅ | `qreg q[5];`, `creg c[5];` |
//! | Built-in and `qelib1` gates | ✅ | `U(0,0,pi) q[0];`, `cx q[0],q[1];` |
//! | Register broadcasting | ✅ | `h q;`, `measure q -> c;` |
//! | Parameter expressions | ✅ | `rz(cos(pi/4)^2) q[1];` |
//! | Gate definitions | ✅ (inlined) | `gate bell a,b { h a; cx a,b; }` |
//! | Opaque gates | ✅ (kept as custom gates) | `opaque oracle(t) a;` |
//! | Barrier / reset / measure | ✅ | `barrier q;` |
//! | Classically conditioned gates | ❌ | `if (c==1) x q[0];` |
//!
//! Free identifiers in top-level gate arguments become circuit parameters,
//! so `rx(theta) q[0];` yields a circuit with a `theta` parameter.
//!
//! # Example: Parsing QASM
//!
//! ```rust
//! use qbridge_qasm::parse;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.len(), 4);
//! ```
//!
//! # Example: Emitting QASM
//!
//! ```rust
//! use qbridge_ir::Circuit;
//! use qbridge_qasm::emit;
//!
//! let circuit = Circuit::bell().unwrap();
//! let qasm = emit(&circuit).unwrap();
//! assert!(qasm.starts_with("OPENQASM 2.0;"));
//! assert!(qasm.contains("cx q[0],q[1];"));
//! ```

mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

use std::path::Path;

use qbridge_ir::Circuit;

pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::parse;

/// AST types, for callers that want the syntax tree rather than a circuit.
pub mod syntax {
    pub use crate::ast::*;
    pub use crate::parser::parse_ast;
}

/// Read and parse an `OpenQASM` 2.0 file.
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<Circuit> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "read qasm file");
    parse(&source)
}
