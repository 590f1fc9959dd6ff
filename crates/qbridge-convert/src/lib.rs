//! qbridge circuit converter
//!
//! Loads source circuits as templates and replays them as target-framework
//! operations. A template is applied with a parameter binding and an
//! optional wire list; each application queues operations on a [`Tape`].
//!
//! # Example
//!
//! ```rust
//! use qbridge_convert::{ParameterBinding, Recorder, Wires, load_qasm};
//!
//! let loaded = load_qasm(
//!     "OPENQASM 2.0; include \"qelib1.inc\"; qreg q[2]; rz(theta) q[0]; cx q[0],q[1];",
//! )
//! .unwrap();
//!
//! let mut params = ParameterBinding::default();
//! params.insert("theta".into(), 0.5);
//!
//! let mut tape = Recorder::new();
//! let report = loaded
//!     .apply(&params, Some(&Wires::new(["a", "b"])), &mut tape)
//!     .unwrap();
//!
//! assert_eq!(report.emitted, 2);
//! assert_eq!(tape[0].name, "RZ");
//! assert_eq!(tape[0].scalars(), vec![0.5]);
//! assert_eq!(tape[1].name, "CNOT");
//! assert_eq!(tape[1].wires, Wires::new(["a", "b"]));
//! ```
//!
//! # Translation
//!
//! - Gates listed in [`GATE_TABLE`] become the named target operation with
//!   their bound parameters.
//! - `ch` and custom gates carrying a matrix become `QubitUnitary`.
//! - `initialize` becomes `QubitStateVector`.
//! - Measurements, resets, barriers, delays and opaque gates are skipped
//!   with a warning and listed in the [`ConversionReport`].

pub mod converter;
pub mod error;
pub mod operation;
pub mod table;
pub mod tape;
pub mod unitary;
pub mod wires;

pub use converter::{
    ConversionReport, LoadedCircuit, ParameterBinding, load, load_qasm, load_qasm_from_file,
};
pub use error::{ConvertError, ConvertResult};
pub use operation::{Operation, OperationParam};
pub use table::{GATE_TABLE, target_name};
pub use tape::{Recorder, Tape};
pub use wires::{Wire, WireMap, Wires, map_wires};
