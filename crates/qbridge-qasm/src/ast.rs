//! Abstract syntax tree for `OpenQASM` 2.0.

use serde::{Deserialize, Serialize};

/// A parsed QASM 2 program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Version from the header, if the header is present.
    pub version: Option<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// `include "file";`
    Include(String),
    /// `qreg name[size];`
    QReg { name: String, size: u32 },
    /// `creg name[size];`
    CReg { name: String, size: u32 },
    /// `gate name(params) qubits { body }`
    GateDef(GateDef),
    /// `opaque name(params) qubits;`
    Opaque {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
    },
    /// Quantum operation.
    Op(Operation),
    /// `if (creg == value) op;`
    If {
        register: String,
        value: u64,
        op: Operation,
    },
}

/// A quantum operation, at top level or inside a gate body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Gate(GateCall),
    Measure { qubit: Argument, bit: Argument },
    Reset(Argument),
    Barrier(Vec<Argument>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub body: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    pub name: String,
    pub params: Vec<Expression>,
    pub args: Vec<Argument>,
}

/// A register (`q`) or a register element (`q[3]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub index: Option<u32>,
}

impl Argument {
    pub fn whole(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn element(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Real(f64),
    Int(u64),
    Pi,
    Ident(String),
    Neg(Box<Expression>),
    Binary {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    Call { func: String, arg: Box<Expression> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
