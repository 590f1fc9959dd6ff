//! Wire labels and the mapping from caller wires to circuit qubits.

use std::fmt;

use qbridge_ir::QubitId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};

/// A wire label in the target framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wire {
    Int(i64),
    Label(String),
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wire::Int(n) => write!(f, "{n}"),
            Wire::Label(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for Wire {
    fn from(n: i64) -> Self {
        Wire::Int(n)
    }
}

impl From<i32> for Wire {
    fn from(n: i32) -> Self {
        Wire::Int(i64::from(n))
    }
}

impl From<u32> for Wire {
    fn from(n: u32) -> Self {
        Wire::Int(i64::from(n))
    }
}

impl From<&str> for Wire {
    fn from(s: &str) -> Self {
        Wire::Label(s.to_string())
    }
}

impl From<String> for Wire {
    fn from(s: String) -> Self {
        Wire::Label(s)
    }
}

/// An ordered list of wire labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wires(Vec<Wire>);

impl Wires {
    pub fn new(wires: impl IntoIterator<Item = impl Into<Wire>>) -> Self {
        Self(wires.into_iter().map(Into::into).collect())
    }

    /// Integer wires `0..n`.
    pub fn range(n: usize) -> Self {
        Self((0..n as i64).map(Wire::Int).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Wire> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Wire] {
        &self.0
    }
}

impl fmt::Display for Wires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", labels.join(", "))
    }
}

impl<W: Into<Wire>> FromIterator<W> for Wires {
    fn from_iter<I: IntoIterator<Item = W>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<W: Into<Wire>> From<Vec<W>> for Wires {
    fn from(wires: Vec<W>) -> Self {
        Self::new(wires)
    }
}

impl<'a> IntoIterator for &'a Wires {
    type Item = &'a Wire;
    type IntoIter = std::slice::Iter<'a, Wire>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A bijection between caller wires and circuit qubits.
///
/// Iteration follows the caller's label order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireMap {
    pairs: Vec<(Wire, QubitId)>,
    by_wire: FxHashMap<Wire, QubitId>,
    by_qubit: FxHashMap<QubitId, Wire>,
}

impl WireMap {
    /// The circuit qubit behind a caller wire.
    pub fn qubit(&self, wire: &Wire) -> Option<QubitId> {
        self.by_wire.get(wire).copied()
    }

    /// The caller wire a circuit qubit is placed on.
    pub fn wire(&self, qubit: QubitId) -> Option<&Wire> {
        self.by_qubit.get(&qubit)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Wire, QubitId)> {
        self.pairs.iter().map(|(w, q)| (w, *q))
    }

    /// Caller wires, in the order they were given.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.pairs.iter().map(|(w, _)| w)
    }
}

/// Pair the i-th caller wire with the i-th circuit qubit.
///
/// ```rust
/// use qbridge_convert::{Wire, Wires, map_wires};
/// use qbridge_ir::QubitId;
///
/// let qubits = [QubitId(0), QubitId(1), QubitId(2)];
/// let map = map_wires(&Wires::new([1, 2, 0]), &qubits).unwrap();
/// assert_eq!(map.qubit(&Wire::Int(0)), Some(QubitId(2)));
/// assert_eq!(map.wire(QubitId(0)), Some(&Wire::Int(1)));
/// ```
pub fn map_wires(wires: &Wires, circuit_qubits: &[QubitId]) -> ConvertResult<WireMap> {
    if wires.len() != circuit_qubits.len() {
        return Err(ConvertError::WireCountMismatch {
            expected: circuit_qubits.len(),
            got: wires.len(),
        });
    }

    let mut map = WireMap::default();
    for (wire, &qubit) in wires.iter().zip(circuit_qubits) {
        if map.by_wire.insert(wire.clone(), qubit).is_some() {
            return Err(ConvertError::DuplicateWire(wire.clone()));
        }
        map.by_qubit.insert(qubit, wire.clone());
        map.pairs.push((wire.clone(), qubit));
    }
    Ok(map)
}
