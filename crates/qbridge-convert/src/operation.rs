//! Operations emitted for the target framework.

use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::wires::Wires;

/// A parameter of an emitted operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationParam {
    Scalar(f64),
    /// Unitary matrix, little-endian in the operand order.
    Matrix(Array2<Complex64>),
    StateVector(Array1<Complex64>),
}

impl OperationParam {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            OperationParam::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Array2<Complex64>> {
        match self {
            OperationParam::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_state_vector(&self) -> Option<&Array1<Complex64>> {
        match self {
            OperationParam::StateVector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for OperationParam {
    fn from(v: f64) -> Self {
        OperationParam::Scalar(v)
    }
}

impl fmt::Display for OperationParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationParam::Scalar(v) => write!(f, "{v}"),
            OperationParam::Matrix(m) => write!(f, "<{}x{} matrix>", m.nrows(), m.ncols()),
            OperationParam::StateVector(v) => write!(f, "<state of {} amplitudes>", v.len()),
        }
    }
}

/// A named target operation acting on wires.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub params: Vec<OperationParam>,
    pub wires: Wires,
}

impl Operation {
    pub fn new(name: impl Into<String>, params: Vec<OperationParam>, wires: Wires) -> Self {
        Self {
            name: name.into(),
            params,
            wires,
        }
    }

    /// Scalar parameters, skipping matrices and state vectors.
    pub fn scalars(&self) -> Vec<f64> {
        self.params.iter().filter_map(OperationParam::as_scalar).collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for p in &self.params {
            write!(f, "{p}, ")?;
        }
        write!(f, "wires={})", self.wires)
    }
}
