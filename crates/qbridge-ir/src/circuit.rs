//! High-level circuit builder API.

use std::collections::BTreeSet;

use num_complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{CustomGate, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId, Register};

const NORM_TOLERANCE: f64 = 1e-8;

/// A quantum circuit: registers plus an ordered list of instructions.
///
/// Every builder method validates its operands before appending, so a
/// `Circuit` produced through this API never references a missing qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    instructions: Vec<Instruction>,
}

macro_rules! fixed_gate {
    ($(#[$doc:meta])* $method:ident, $gate:ident, $($q:ident),+) => {
        $(#[$doc])*
        pub fn $method(&mut self, $($q: QubitId),+) -> IrResult<&mut Self> {
            self.apply(Instruction::gate(StandardGate::$gate, [$($q),+]))
        }
    };
}

macro_rules! rotation_gate {
    ($(#[$doc:meta])* $method:ident, $gate:ident, $($q:ident),+) => {
        $(#[$doc])*
        pub fn $method(
            &mut self,
            theta: impl Into<ParameterExpression>,
            $($q: QubitId),+
        ) -> IrResult<&mut Self> {
            self.apply(Instruction::gate(StandardGate::$gate(theta.into()), [$($q),+]))
        }
    };
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qregs: vec![],
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with one `q` and (if non-empty) one `c` register.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.push_qreg("q", num_qubits);
        }
        if num_clbits > 0 {
            circuit.push_creg("c", num_clbits);
        }
        circuit
    }

    /// Add a quantum register, returning the ids of its qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self.qreg(&name).is_some() {
            return Err(IrError::DuplicateRegister(name));
        }
        Ok(self.push_qreg(name, size))
    }

    /// Add a classical register, returning the ids of its bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.creg(&name).is_some() {
            return Err(IrError::DuplicateRegister(name));
        }
        Ok(self.push_creg(name, size))
    }

    fn push_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        let start = self.qubits.len() as u32;
        let ids: Vec<_> = (start..start + size).map(QubitId).collect();
        for (i, id) in ids.iter().enumerate() {
            self.qubits.push(Qubit::with_register(*id, &name, i as u32));
        }
        self.qregs.push(Register::new(name, start, size));
        ids
    }

    fn push_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        let start = self.clbits.len() as u32;
        let ids: Vec<_> = (start..start + size).map(ClbitId).collect();
        for (i, id) in ids.iter().enumerate() {
            self.clbits.push(Clbit::with_register(*id, &name, i as u32));
        }
        self.cregs.push(Register::new(name, start, size));
        ids
    }

    /// Append an instruction after checking its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn check(&self, inst: &Instruction) -> IrResult<()> {
        let gate_name = || Some(inst.name().to_string());
        let mut seen = FxHashSet::default();
        for &q in &inst.qubits {
            if q.0 as usize >= self.qubits.len() {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
            if !seen.insert(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
        }
        for &c in &inst.clbits {
            if c.0 as usize >= self.clbits.len() {
                return Err(IrError::ClbitNotFound {
                    clbit: c,
                    gate_name: gate_name(),
                });
            }
        }
        if let InstructionKind::Gate(g) = &inst.kind {
            if g.num_qubits() as usize != inst.qubits.len() {
                return Err(IrError::QubitCountMismatch {
                    gate_name: g.name().to_string(),
                    expected: g.num_qubits(),
                    got: inst.qubits.len() as u32,
                });
            }
        }
        Ok(())
    }

    /// Re-check every instruction; used for circuits that were deserialized.
    pub fn validate(&self) -> IrResult<()> {
        self.instructions.iter().try_for_each(|inst| self.check(inst))
    }

    // Single-qubit gates

    fixed_gate!(id, I, qubit);
    fixed_gate!(x, X, qubit);
    fixed_gate!(y, Y, qubit);
    fixed_gate!(z, Z, qubit);
    fixed_gate!(h, H, qubit);
    fixed_gate!(s, S, qubit);
    fixed_gate!(sdg, Sdg, qubit);
    fixed_gate!(t, T, qubit);
    fixed_gate!(tdg, Tdg, qubit);
    fixed_gate!(sx, SX, qubit);
    fixed_gate!(sxdg, SXdg, qubit);
    rotation_gate!(rx, Rx, qubit);
    rotation_gate!(ry, Ry, qubit);
    rotation_gate!(rz, Rz, qubit);
    rotation_gate!(p, P, qubit);
    rotation_gate!(u1, U1, qubit);

    /// Apply U(θ, φ, λ).
    pub fn u(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        let gate = StandardGate::U(theta.into(), phi.into(), lambda.into());
        self.apply(Instruction::gate(gate, [qubit]))
    }

    pub fn u2(
        &mut self,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        let gate = StandardGate::U2(phi.into(), lambda.into());
        self.apply(Instruction::gate(gate, [qubit]))
    }

    pub fn u3(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        let gate = StandardGate::U3(theta.into(), phi.into(), lambda.into());
        self.apply(Instruction::gate(gate, [qubit]))
    }

    // Two-qubit gates

    fixed_gate!(
        /// Apply CNOT with the given control and target.
        cx, CX, control, target
    );
    fixed_gate!(cy, CY, control, target);
    fixed_gate!(cz, CZ, control, target);
    fixed_gate!(ch, CH, control, target);
    fixed_gate!(swap, Swap, q1, q2);
    fixed_gate!(iswap, ISwap, q1, q2);
    rotation_gate!(crx, CRx, control, target);
    rotation_gate!(cry, CRy, control, target);
    rotation_gate!(crz, CRz, control, target);
    rotation_gate!(cp, CP, control, target);
    rotation_gate!(rxx, RXX, q1, q2);
    rotation_gate!(ryy, RYY, q1, q2);
    rotation_gate!(rzz, RZZ, q1, q2);

    // Three-qubit gates

    fixed_gate!(
        /// Apply Toffoli.
        ccx, CCX, c1, c2, target
    );
    fixed_gate!(cswap, CSwap, control, t1, t2);

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    /// Apply an explicit unitary, given row-major.
    pub fn unitary(
        &mut self,
        name: impl Into<String>,
        matrix: Vec<Complex64>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let width = u32::try_from(qubits.len())
            .map_err(|_| IrError::InvalidMatrix(format!("{} qubits is too wide", qubits.len())))?;
        let gate = CustomGate::new(name, width).with_matrix(matrix)?;
        self.gate(gate, qubits)
    }

    // Non-unitary operations

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i`, adding a `meas` register
    /// when the circuit has fewer classical bits than qubits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let missing = self.qubits.len().saturating_sub(self.clbits.len()) as u32;
        if missing > 0 {
            self.push_creg("meas", missing);
        }
        for i in 0..self.qubits.len() as u32 {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let all: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.barrier(all)
    }

    pub fn delay(&mut self, qubit: QubitId, duration: u64) -> IrResult<&mut Self> {
        self.apply(Instruction::delay(qubit, duration))
    }

    /// Prepare `qubits` in the state `amplitudes`.
    ///
    /// The vector must have `2^n` entries for `n` qubits and unit norm.
    pub fn initialize(
        &mut self,
        amplitudes: Vec<Complex64>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let expected = u32::try_from(qubits.len())
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .ok_or_else(|| {
                IrError::InvalidStateVector(format!(
                    "a state on {} qubits does not fit in memory",
                    qubits.len()
                ))
            })?;
        if amplitudes.len() != expected {
            return Err(IrError::InvalidStateVector(format!(
                "{} amplitudes given for {} qubits, expected {expected}",
                amplitudes.len(),
                qubits.len()
            )));
        }
        let norm: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(IrError::InvalidStateVector(format!(
                "squared norm is {norm}, expected 1"
            )));
        }
        self.apply(Instruction::initialize(amplitudes, qubits))
    }

    // Accessors

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    // Parameters

    /// Names of all free parameters, sorted.
    pub fn parameters(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        for inst in &self.instructions {
            for p in inst.parameters() {
                p.collect_symbols(&mut set);
            }
        }
        set
    }

    pub fn is_parameterized(&self) -> bool {
        self.instructions
            .iter()
            .any(|inst| inst.parameters().iter().any(|p| p.is_symbolic()))
    }

    /// Return a copy with the given parameters substituted.
    ///
    /// Names that do not occur in the circuit are rejected. Parameters
    /// absent from `values` stay symbolic.
    pub fn bind_parameters(&self, values: &FxHashMap<String, f64>) -> IrResult<Circuit> {
        let known = self.parameters();
        let mut unknown: Vec<String> = values
            .keys()
            .filter(|k| !known.contains(*k))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(IrError::UnknownParameters(unknown));
        }

        let mut bound = self.clone();
        for inst in &mut bound.instructions {
            if let InstructionKind::Gate(g) = &inst.kind {
                inst.kind = InstructionKind::Gate(g.map_parameters(|p| p.bind_all(values)));
            }
        }
        Ok(bound)
    }

    // Common circuits

    /// Bell state preparation on two qubits.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// GHZ state preparation on `n` qubits.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size(format!("ghz_{n}"), n, n);
        if n > 0 {
            circuit.h(QubitId(0))?;
            for i in 1..n {
                circuit.cx(QubitId(i - 1), QubitId(i))?;
            }
        }
        circuit.measure_all()?;
        Ok(circuit)
    }
}
