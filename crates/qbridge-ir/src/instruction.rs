//! Circuit instructions combining operations with operands.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::gate::{Gate, GateKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(Gate),
    /// Measurement into classical bits.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (scheduling hint only).
    Barrier,
    /// Idle for a duration in device-specific units.
    Delay { duration: u64 },
    /// Prepare the operands in the given state vector.
    Initialize { amplitudes: Vec<Complex64> },
}

impl InstructionKind {
    /// Human-readable class label (`Barrier`, `Measure`, `CX`, ...).
    ///
    /// Gates report their mnemonic in upper case; other instructions
    /// report their kind.
    pub fn label(&self) -> String {
        match self {
            InstructionKind::Gate(g) => match &g.kind {
                GateKind::Standard(s) => s.name().to_uppercase(),
                GateKind::Custom(c) => c.name.clone(),
            },
            InstructionKind::Measure => "Measure".into(),
            InstructionKind::Reset => "Reset".into(),
            InstructionKind::Barrier => "Barrier".into(),
            InstructionKind::Delay { .. } => "Delay".into(),
            InstructionKind::Initialize { .. } => "Initialize".into(),
        }
    }
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Qubit operands, in order.
    pub qubits: Vec<QubitId>,
    /// Classical operands (measure only).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    pub fn delay(qubit: QubitId, duration: u64) -> Self {
        Self {
            kind: InstructionKind::Delay { duration },
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    pub fn initialize(amplitudes: Vec<Complex64>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Initialize { amplitudes },
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// The gate, if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Mnemonic used in listings (`h`, `measure`, `barrier`, ...).
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Delay { .. } => "delay",
            InstructionKind::Initialize { .. } => "initialize",
        }
    }

    /// Gate parameters; empty for non-gate instructions.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        self.as_gate().map(Gate::parameters).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{CustomGate, StandardGate};

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::gate(StandardGate::CX, [QubitId(2), QubitId(0)]);
        assert!(inst.is_gate());
        assert_eq!(inst.name(), "cx");
        assert_eq!(inst.qubits, vec![QubitId(2), QubitId(0)]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Instruction::barrier([QubitId(0)]).kind.label(), "Barrier");
        assert_eq!(
            Instruction::measure(QubitId(0), ClbitId(0)).kind.label(),
            "Measure"
        );
        assert_eq!(
            Instruction::gate(StandardGate::CH, [QubitId(0), QubitId(1)]).kind.label(),
            "CH"
        );
        assert_eq!(
            Instruction::gate(CustomGate::new("oracle", 1), [QubitId(0)]).kind.label(),
            "oracle"
        );
    }

    #[test]
    fn test_non_gate_has_no_parameters() {
        assert!(Instruction::reset(QubitId(0)).parameters().is_empty());
        assert!(Instruction::delay(QubitId(0), 10).as_gate().is_none());
    }
}
