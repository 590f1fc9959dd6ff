//! Loading circuits as reusable templates and applying them to a tape.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::Path;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use qbridge_ir::{Circuit, GateKind, Instruction, InstructionKind, IrError, ParameterExpression};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{ConvertError, ConvertResult};
use crate::operation::{Operation, OperationParam};
use crate::table::target_name;
use crate::tape::Tape;
use crate::unitary::{custom_unitary, standard_unitary};
use crate::wires::{WireMap, Wires, map_wires};

/// Values for the free parameters of a circuit, by name.
pub type ParameterBinding = FxHashMap<String, f64>;

/// Outcome of one template application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Number of operations queued on the tape.
    pub emitted: usize,
    /// Labels of instructions that were left out, in circuit order.
    pub skipped: Vec<String>,
}

impl ConversionReport {
    /// True when every instruction was translated.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A circuit loaded as a template.
///
/// The template is never modified; every [`apply`](Self::apply) starts from
/// the same circuit.
#[derive(Debug, Clone)]
pub struct LoadedCircuit {
    circuit: Circuit,
}

/// Load a circuit as a template. Problems surface when it is applied.
pub fn load(circuit: Circuit) -> LoadedCircuit {
    LoadedCircuit { circuit }
}

/// Parse OpenQASM 2.0 source and load it.
pub fn load_qasm(source: &str) -> ConvertResult<LoadedCircuit> {
    Ok(load(qbridge_qasm::parse(source)?))
}

/// Read an OpenQASM 2.0 file and load it.
pub fn load_qasm_from_file(path: impl AsRef<Path>) -> ConvertResult<LoadedCircuit> {
    Ok(load(qbridge_qasm::parse_file(path)?))
}

impl LoadedCircuit {
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Number of wires the template acts on.
    pub fn num_wires(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Names of the free parameters, sorted.
    pub fn parameters(&self) -> BTreeSet<String> {
        self.circuit.parameters()
    }

    /// Translate the circuit and queue the result on `tape`.
    ///
    /// Without `wires` the template acts on `0..num_wires`. Nothing is
    /// queued unless the whole circuit translates.
    pub fn apply<T: Tape + ?Sized>(
        &self,
        params: &ParameterBinding,
        wires: Option<&Wires>,
        tape: &mut T,
    ) -> ConvertResult<ConversionReport> {
        let (ops, report) = self.translate(params, wires)?;
        for op in ops {
            tape.queue(op);
        }
        Ok(report)
    }

    /// Translate the circuit without queueing anything.
    pub fn translate(
        &self,
        params: &ParameterBinding,
        wires: Option<&Wires>,
    ) -> ConvertResult<(Vec<Operation>, ConversionReport)> {
        self.circuit.validate()?;
        self.check_binding(params)?;

        let bound = if params.is_empty() {
            Cow::Borrowed(&self.circuit)
        } else {
            Cow::Owned(self.circuit.bind_parameters(params)?)
        };

        let wires = match wires {
            Some(w) => Cow::Borrowed(w),
            None => Cow::Owned(Wires::range(self.num_wires())),
        };
        let qubits: Vec<_> = bound.qubits().iter().map(|q| q.id).collect();
        let wire_map = map_wires(&wires, &qubits)?;

        let mut ops = Vec::with_capacity(bound.len());
        let mut report = ConversionReport::default();
        for inst in bound.instructions() {
            match translate_instruction(inst, &wire_map)? {
                Some(op) => ops.push(op),
                None => {
                    let label = inst.kind.label();
                    warn!(
                        "The {label} instruction is not supported by the target framework, and has not been added to the template."
                    );
                    report.skipped.push(label);
                }
            }
        }
        report.emitted = ops.len();
        debug!(
            circuit = bound.name(),
            emitted = report.emitted,
            skipped = report.skipped.len(),
            "Circuit translated"
        );
        Ok((ops, report))
    }

    fn check_binding(&self, params: &ParameterBinding) -> ConvertResult<()> {
        let known = self.circuit.parameters();
        let mut unknown: Vec<String> = params
            .keys()
            .filter(|name| !known.contains(*name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ConvertError::UnknownParameters(unknown));
        }
        if let Some((name, value)) = params.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConvertError::InvalidParameterValue {
                name: name.clone(),
                value: *value,
            });
        }
        Ok(())
    }
}

/// Translate one instruction; `None` means it has no target form.
fn translate_instruction(inst: &Instruction, wire_map: &WireMap) -> ConvertResult<Option<Operation>> {
    let op = match &inst.kind {
        InstructionKind::Gate(gate) => match &gate.kind {
            GateKind::Standard(standard) => {
                if let Some(name) = target_name(standard) {
                    let params = resolve_params(&gate.parameters())?;
                    Some(Operation::new(name, params, target_wires(inst, wire_map)?))
                } else {
                    standard_unitary(standard)
                        .map(|m| target_wires(inst, wire_map).map(|w| unitary_op(m, w)))
                        .transpose()?
                }
            }
            GateKind::Custom(custom) => match custom_unitary(custom)? {
                Some(m) => Some(unitary_op(m, target_wires(inst, wire_map)?)),
                None => None,
            },
        },
        InstructionKind::Initialize { amplitudes } => Some(Operation::new(
            "QubitStateVector",
            vec![OperationParam::StateVector(Array1::from(amplitudes.clone()))],
            target_wires(inst, wire_map)?,
        )),
        InstructionKind::Measure
        | InstructionKind::Reset
        | InstructionKind::Barrier
        | InstructionKind::Delay { .. } => None,
    };
    Ok(op)
}

fn unitary_op(matrix: Array2<Complex64>, wires: Wires) -> Operation {
    Operation::new("QubitUnitary", vec![OperationParam::Matrix(matrix)], wires)
}

fn target_wires(inst: &Instruction, wire_map: &WireMap) -> ConvertResult<Wires> {
    inst.qubits
        .iter()
        .map(|&q| {
            wire_map.wire(q).cloned().ok_or_else(|| {
                ConvertError::InvalidCircuit(IrError::QubitNotFound {
                    qubit: q,
                    gate_name: Some(inst.name().to_string()),
                })
            })
        })
        .collect::<ConvertResult<Vec<_>>>()
        .map(Wires::new)
}

fn resolve_params(params: &[&ParameterExpression]) -> ConvertResult<Vec<OperationParam>> {
    params
        .iter()
        .map(|p| {
            if let Some(name) = p.symbols().into_iter().next() {
                return Err(ConvertError::UnboundParameter(name));
            }
            match p.as_f64() {
                Some(v) if v.is_finite() => Ok(OperationParam::Scalar(v)),
                other => Err(ConvertError::InvalidParameterValue {
                    name: p.to_string(),
                    value: other.unwrap_or(f64::NAN),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::Recorder;
    use qbridge_ir::QubitId;

    #[test]
    fn test_empty_circuit() {
        let loaded = load(Circuit::with_size("empty", 2, 0));
        let mut tape = Recorder::new();
        let report = loaded
            .apply(&ParameterBinding::default(), None, &mut tape)
            .unwrap();
        assert_eq!(report, ConversionReport::default());
        assert!(tape.is_empty());
    }

    #[test]
    fn test_translate_does_not_queue() {
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let (ops, report) = load(circuit)
            .translate(&ParameterBinding::default(), None)
            .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(report.emitted, 1);
        assert_eq!(ops[0].name, "Hadamard");
    }

    #[test]
    fn test_division_by_zero_is_invalid() {
        let mut circuit = Circuit::with_size("c", 1, 0);
        let theta = ParameterExpression::symbol("theta");
        circuit
            .rz(theta / ParameterExpression::constant(0.0), QubitId(0))
            .unwrap();
        let binding: ParameterBinding = [("theta".to_string(), 1.0)].into_iter().collect();
        let err = load(circuit)
            .apply(&binding, None, &mut Recorder::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidParameterValue { .. }));
    }

    #[test]
    fn test_vec_is_a_tape() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        let mut ops: Vec<Operation> = Vec::new();
        load(circuit)
            .apply(&ParameterBinding::default(), None, &mut ops)
            .unwrap();
        assert_eq!(ops[0].wires, Wires::new([1, 0]));
    }
}
