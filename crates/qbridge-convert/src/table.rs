//! Name table from source gates to target operations.

use qbridge_ir::StandardGate;

/// Source mnemonic and target name for every gate with a native target.
pub const GATE_TABLE: &[(&str, &str)] = &[
    ("id", "Identity"),
    ("x", "PauliX"),
    ("y", "PauliY"),
    ("z", "PauliZ"),
    ("h", "Hadamard"),
    ("s", "S"),
    ("sdg", "Adjoint(S)"),
    ("t", "T"),
    ("tdg", "Adjoint(T)"),
    ("sx", "SX"),
    ("sxdg", "Adjoint(SX)"),
    ("rx", "RX"),
    ("ry", "RY"),
    ("rz", "RZ"),
    ("p", "PhaseShift"),
    ("u", "U3"),
    ("u1", "U1"),
    ("u2", "U2"),
    ("u3", "U3"),
    ("cx", "CNOT"),
    ("cy", "CY"),
    ("cz", "CZ"),
    ("swap", "SWAP"),
    ("iswap", "ISWAP"),
    ("crx", "CRX"),
    ("cry", "CRY"),
    ("crz", "CRZ"),
    ("cp", "ControlledPhaseShift"),
    ("rxx", "IsingXX"),
    ("ryy", "IsingYY"),
    ("rzz", "IsingZZ"),
    ("ccx", "Toffoli"),
    ("cswap", "CSWAP"),
];

/// Target operation name for a standard gate.
///
/// `None` means the gate has no native target and must be emitted as an
/// explicit unitary.
pub fn target_name(gate: &StandardGate) -> Option<&'static str> {
    let name = match gate {
        StandardGate::I => "Identity",
        StandardGate::X => "PauliX",
        StandardGate::Y => "PauliY",
        StandardGate::Z => "PauliZ",
        StandardGate::H => "Hadamard",
        StandardGate::S => "S",
        StandardGate::Sdg => "Adjoint(S)",
        StandardGate::T => "T",
        StandardGate::Tdg => "Adjoint(T)",
        StandardGate::SX => "SX",
        StandardGate::SXdg => "Adjoint(SX)",
        StandardGate::Rx(_) => "RX",
        StandardGate::Ry(_) => "RY",
        StandardGate::Rz(_) => "RZ",
        StandardGate::P(_) => "PhaseShift",
        StandardGate::U(..) | StandardGate::U3(..) => "U3",
        StandardGate::U1(_) => "U1",
        StandardGate::U2(..) => "U2",
        StandardGate::CX => "CNOT",
        StandardGate::CY => "CY",
        StandardGate::CZ => "CZ",
        StandardGate::Swap => "SWAP",
        StandardGate::ISwap => "ISWAP",
        StandardGate::CRx(_) => "CRX",
        StandardGate::CRy(_) => "CRY",
        StandardGate::CRz(_) => "CRZ",
        StandardGate::CP(_) => "ControlledPhaseShift",
        StandardGate::RXX(_) => "IsingXX",
        StandardGate::RYY(_) => "IsingYY",
        StandardGate::RZZ(_) => "IsingZZ",
        StandardGate::CCX => "Toffoli",
        StandardGate::CSwap => "CSWAP",
        StandardGate::CH => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::ParameterExpression;

    fn gate_from_name(name: &str) -> StandardGate {
        (0..=3)
            .find_map(|n| StandardGate::from_name(name, vec![ParameterExpression::constant(0.1); n]))
            .unwrap()
    }

    #[test]
    fn test_table_matches_target_name() {
        for (source, target) in GATE_TABLE {
            let gate = gate_from_name(source);
            assert_eq!(target_name(&gate), Some(*target), "{source}");
        }
    }

    #[test]
    fn test_ch_has_no_native_target() {
        assert_eq!(target_name(&StandardGate::CH), None);
    }

    #[test]
    fn test_inverse_gates_are_adjoints() {
        assert_eq!(target_name(&StandardGate::Sdg), Some("Adjoint(S)"));
        assert_eq!(target_name(&StandardGate::Tdg), Some("Adjoint(T)"));
        assert_eq!(target_name(&StandardGate::SXdg), Some("Adjoint(SX)"));
    }
}
