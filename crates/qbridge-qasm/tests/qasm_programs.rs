//! End-to-end tests for reading and writing QASM programs.

use std::io::Write;

use proptest::prelude::*;
use qbridge_ir::{Circuit, InstructionKind, QubitId};
use qbridge_qasm::{ParseError, emit, parse, parse_file};

const FOUR_QUBIT_PROGRAM: &str = "OPENQASM 2.0;include \"qelib1.inc\";qreg q[4];creg c[4];x q[0]; x q[2];barrier q;h q[0];h q[1];h q[2];h q[3];measure q -> c;";

#[test]
fn test_compact_program() {
    let circuit = parse(FOUR_QUBIT_PROGRAM).unwrap();
    assert_eq!(circuit.num_qubits(), 4);
    assert_eq!(circuit.num_clbits(), 4);

    let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
    assert_eq!(
        names,
        vec![
            "x", "x", "barrier", "h", "h", "h", "h", "measure", "measure", "measure", "measure"
        ]
    );
    let barrier = &circuit.instructions()[2];
    assert!(matches!(barrier.kind, InstructionKind::Barrier));
    assert_eq!(barrier.qubits.len(), 4);
}

#[test]
fn test_program_without_header_keeps_operand_order() {
    let circuit =
        parse("include \"qelib1.inc\";qreg q[4];creg c[4];x q[0];cx q[2],q[0];measure q -> c;")
            .unwrap();
    let cx = &circuit.instructions()[1];
    assert_eq!(cx.name(), "cx");
    assert_eq!(cx.qubits, vec![QubitId(2), QubitId(0)]);
}

#[test]
fn test_parse_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FOUR_QUBIT_PROGRAM.as_bytes()).unwrap();
    let circuit = parse_file(file.path()).unwrap();
    assert_eq!(circuit.len(), 11);
}

#[test]
fn test_parse_missing_file() {
    match parse_file("definitely/not/here.qasm") {
        Err(ParseError::Io { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn test_symbolic_parameters_survive_round_trip() {
    let circuit = parse("qreg q[2]; rx(theta) q[0]; crz(cos(phi)^2) q[0],q[1];").unwrap();
    let reparsed = parse(&emit(&circuit).unwrap()).unwrap();
    assert_eq!(reparsed.parameters(), circuit.parameters());
    assert_eq!(
        circuit.parameters().into_iter().collect::<Vec<_>>(),
        vec!["phi".to_string(), "theta".to_string()]
    );
}

fn gate_strategy() -> impl Strategy<Value = (u8, u32, u32, f64)> {
    (0u8..6, 0u32..4, 0u32..4, -10.0f64..10.0)
}

proptest! {
    #[test]
    fn emitted_programs_parse_back_to_the_same_gates(
        gates in prop::collection::vec(gate_strategy(), 0..24)
    ) {
        let mut circuit = Circuit::with_size("random", 4, 0);
        for (kind, a, b, angle) in gates {
            let (qa, qb) = (QubitId(a), QubitId(b));
            match kind {
                0 => { circuit.h(qa).unwrap(); }
                1 => { circuit.rz(angle, qa).unwrap(); }
                2 => { circuit.u3(angle, -angle, angle / 2.0, qa).unwrap(); }
                3 if a != b => { circuit.cx(qa, qb).unwrap(); }
                4 if a != b => { circuit.rzz(angle, qa, qb).unwrap(); }
                _ => { circuit.sdg(qa).unwrap(); }
            }
        }

        let reparsed = parse(&emit(&circuit).unwrap()).unwrap();
        prop_assert_eq!(reparsed.len(), circuit.len());
        for (orig, back) in circuit.instructions().iter().zip(reparsed.instructions()) {
            prop_assert_eq!(orig.name(), back.name());
            prop_assert_eq!(&orig.qubits, &back.qubits);
            let left: Vec<f64> = orig.parameters().iter().filter_map(|p| p.as_f64()).collect();
            let right: Vec<f64> = back.parameters().iter().filter_map(|p| p.as_f64()).collect();
            prop_assert_eq!(left.len(), right.len());
            for (l, r) in left.iter().zip(&right) {
                prop_assert!((l - r).abs() < 1e-12);
            }
        }
    }
}
