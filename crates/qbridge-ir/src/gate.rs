//! Gate library of the source circuit model.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::parameter::ParameterExpression;

type P = ParameterExpression;

/// Built-in gates, named after their source-framework mnemonics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit, fixed
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit, parameterized
    Rx(P),
    Ry(P),
    Rz(P),
    /// Phase gate.
    P(P),
    /// Universal gate U(θ, φ, λ).
    U(P, P, P),
    /// Legacy diagonal phase gate U1(λ).
    U1(P),
    /// Legacy U2(φ, λ).
    U2(P, P),
    /// Legacy U3(θ, φ, λ).
    U3(P, P, P),

    // Two-qubit
    CX,
    CY,
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    Swap,
    ISwap,
    CRx(P),
    CRy(P),
    CRz(P),
    /// Controlled phase gate.
    CP(P),
    /// XX interaction.
    RXX(P),
    /// YY interaction.
    RYY(P),
    /// ZZ interaction.
    RZZ(P),

    // Three-qubit
    /// Toffoli gate.
    CCX,
    /// Fredkin gate.
    CSwap,
}

impl StandardGate {
    /// Build a gate from its mnemonic and parameter list.
    ///
    /// Returns `None` when the name is not part of the library or the number
    /// of parameters does not fit the gate.
    pub fn from_name(name: &str, params: Vec<ParameterExpression>) -> Option<Self> {
        let mut it = params.into_iter();
        let mut next = || it.next();
        let gate = match name {
            "id" | "i" => StandardGate::I,
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" => StandardGate::Tdg,
            "sx" => StandardGate::SX,
            "sxdg" => StandardGate::SXdg,
            "rx" => StandardGate::Rx(next()?),
            "ry" => StandardGate::Ry(next()?),
            "rz" => StandardGate::Rz(next()?),
            "p" => StandardGate::P(next()?),
            "u" => StandardGate::U(next()?, next()?, next()?),
            "u1" => StandardGate::U1(next()?),
            "u2" => StandardGate::U2(next()?, next()?),
            "u3" => StandardGate::U3(next()?, next()?, next()?),
            "cx" | "CX" => StandardGate::CX,
            "cy" => StandardGate::CY,
            "cz" => StandardGate::CZ,
            "ch" => StandardGate::CH,
            "swap" => StandardGate::Swap,
            "iswap" => StandardGate::ISwap,
            "crx" => StandardGate::CRx(next()?),
            "cry" => StandardGate::CRy(next()?),
            "crz" => StandardGate::CRz(next()?),
            "cp" | "cu1" => StandardGate::CP(next()?),
            "rxx" => StandardGate::RXX(next()?),
            "ryy" => StandardGate::RYY(next()?),
            "rzz" => StandardGate::RZZ(next()?),
            "ccx" => StandardGate::CCX,
            "cswap" => StandardGate::CSwap,
            _ => return None,
        };
        if next().is_some() {
            return None;
        }
        Some(gate)
    }

    /// Mnemonic of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(..) => "u",
            StandardGate::U1(_) => "u1",
            StandardGate::U2(..) => "u2",
            StandardGate::U3(..) => "u3",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CCX | StandardGate::CSwap => 3,
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,
            _ => 1,
        }
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::U1(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![p],
            StandardGate::U2(a, b) => vec![a, b],
            StandardGate::U(a, b, c) | StandardGate::U3(a, b, c) => vec![a, b, c],
            _ => vec![],
        }
    }

    /// Whether any parameter is still symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Rebuild the gate with every parameter passed through `f`.
    #[must_use]
    pub fn map_parameters(&self, f: impl Fn(&ParameterExpression) -> ParameterExpression) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(f(p)),
            StandardGate::Ry(p) => StandardGate::Ry(f(p)),
            StandardGate::Rz(p) => StandardGate::Rz(f(p)),
            StandardGate::P(p) => StandardGate::P(f(p)),
            StandardGate::U(a, b, c) => StandardGate::U(f(a), f(b), f(c)),
            StandardGate::U1(p) => StandardGate::U1(f(p)),
            StandardGate::U2(a, b) => StandardGate::U2(f(a), f(b)),
            StandardGate::U3(a, b, c) => StandardGate::U3(f(a), f(b), f(c)),
            StandardGate::CRx(p) => StandardGate::CRx(f(p)),
            StandardGate::CRy(p) => StandardGate::CRy(f(p)),
            StandardGate::CRz(p) => StandardGate::CRz(f(p)),
            StandardGate::CP(p) => StandardGate::CP(f(p)),
            StandardGate::RXX(p) => StandardGate::RXX(f(p)),
            StandardGate::RYY(p) => StandardGate::RYY(f(p)),
            StandardGate::RZZ(p) => StandardGate::RZZ(f(p)),
            fixed => fixed.clone(),
        }
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    Standard(StandardGate),
    Custom(CustomGate),
}

impl GateKind {
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }
}

/// An opaque or matrix-defined gate outside the standard library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    pub name: String,
    pub num_qubits: u32,
    pub params: Vec<ParameterExpression>,
    /// Optional unitary matrix (row-major, 2^n × 2^n).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Complex64>>,
}

impl CustomGate {
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
            matrix: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<ParameterExpression>) -> Self {
        self.params = params;
        self
    }

    /// Attach a unitary matrix, checking that its size fits the qubit count.
    pub fn with_matrix(mut self, matrix: Vec<Complex64>) -> IrResult<Self> {
        let dim = unitary_dim(self.num_qubits).ok_or_else(|| {
            IrError::InvalidMatrix(format!(
                "a {}-qubit matrix does not fit in memory",
                self.num_qubits
            ))
        })?;
        if matrix.len() != dim * dim {
            return Err(IrError::InvalidMatrix(format!(
                "{} entries given, a {}-qubit gate needs {}",
                matrix.len(),
                self.num_qubits,
                dim * dim
            )));
        }
        self.matrix = Some(matrix);
        Ok(self)
    }
}

/// Side length of the unitary on `num_qubits` qubits, if its entry
/// count fits in `usize`.
pub fn unitary_dim(num_qubits: u32) -> Option<usize> {
    let dim = 1usize.checked_shl(num_qubits)?;
    dim.checked_mul(dim).map(|_| dim)
}

/// A gate plus an optional display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: GateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// All parameters, standard or custom.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match &self.kind {
            GateKind::Standard(g) => g.parameters(),
            GateKind::Custom(g) => g.params.iter().collect(),
        }
    }

    #[must_use]
    pub fn map_parameters(&self, f: impl Fn(&ParameterExpression) -> ParameterExpression) -> Self {
        let kind = match &self.kind {
            GateKind::Standard(g) => GateKind::Standard(g.map_parameters(f)),
            GateKind::Custom(g) => GateKind::Custom(CustomGate {
                params: g.params.iter().map(f).collect(),
                ..g.clone()
            }),
        };
        Self {
            kind,
            label: self.label.clone(),
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}
