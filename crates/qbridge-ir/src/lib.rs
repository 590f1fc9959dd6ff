//! qbridge source circuit model
//!
//! This crate models the circuits that the converter reads: registers of
//! qubits and classical bits, gate instructions with ordered operands, and
//! symbolic parameter expressions that are bound to numbers before a circuit
//! is translated.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`], grouped into
//!   named [`Register`]s
//! - **Gates**: [`StandardGate`] for the built-in gate library and [`CustomGate`]
//!   for opaque or matrix-defined operations
//! - **Parameters**: [`ParameterExpression`] for symbolic angles, including
//!   elementary functions such as `cos` and `exp`
//! - **Instructions**: [`Instruction`] combining an operation with its operands
//! - **Circuit**: [`Circuit`], an ordered instruction list with a builder API
//!
//! # Example: Building a Parameterized Circuit
//!
//! ```rust
//! use qbridge_ir::{Circuit, ParameterExpression, QubitId};
//! use rustc_hash::FxHashMap;
//!
//! let mut circuit = Circuit::with_size("variational", 2, 0);
//! let theta = ParameterExpression::symbol("theta");
//!
//! circuit.rx(theta.clone().cos(), QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! assert!(circuit.is_parameterized());
//!
//! let mut values = FxHashMap::default();
//! values.insert("theta".to_string(), 0.0);
//! let bound = circuit.bind_parameters(&values).unwrap();
//! assert!(!bound.is_parameterized());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `id`, `x`, `y`, `z`, `h` | 1 | Identity, Paulis, Hadamard |
//! | `s`, `sdg`, `t`, `tdg`, `sx`, `sxdg` | 1 | Clifford+T and their inverses |
//! | `rx`, `ry`, `rz`, `p` | 1 | Rotations and phase |
//! | `u`, `u1`, `u2`, `u3` | 1 | Universal single-qubit gates |
//! | `cx`, `cy`, `cz`, `ch`, `swap`, `iswap` | 2 | Fixed two-qubit gates |
//! | `crx`, `cry`, `crz`, `cp` | 2 | Controlled rotations |
//! | `rxx`, `ryy`, `rzz` | 2 | Ising interactions |
//! | `ccx`, `cswap` | 3 | Toffoli and Fredkin |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate, unitary_dim};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::{ParameterExpression, ParameterFunction};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId, Register};
