//! Behaviour of loaded circuit templates.

use std::io::Write;

use num_complex::Complex64;
use proptest::prelude::*;
use qbridge_convert::{
    ConvertError, OperationParam, ParameterBinding, Recorder, Wire, Wires, load, load_qasm,
    load_qasm_from_file, map_wires,
};
use qbridge_ir::{Circuit, ParameterExpression, QubitId};

fn binding(pairs: &[(&str, f64)]) -> ParameterBinding {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn no_params() -> ParameterBinding {
    ParameterBinding::default()
}

fn q(n: u32) -> QubitId {
    QubitId(n)
}

fn assert_close(left: &[f64], right: &[f64]) {
    assert_eq!(left.len(), right.len(), "{left:?} vs {right:?}");
    for (l, r) in left.iter().zip(right) {
        assert!((l - r).abs() < 1e-12, "{left:?} vs {right:?}");
    }
}

mod parameters {
    use super::*;

    #[test]
    fn test_loaded_multiple_times_with_different_arguments() {
        let mut qc = Circuit::with_size("qc", 3, 1);
        qc.rz(ParameterExpression::symbol("θ"), q(0)).unwrap();
        let loaded = load(qc);

        let mut tape = Recorder::new();
        for angle in [0.5, -0.5, 0.0] {
            loaded
                .apply(&binding(&[("θ", angle)]), None, &mut tape)
                .unwrap();
        }

        assert_eq!(tape.len(), 3);
        for (op, angle) in tape.operations().iter().zip([0.5, -0.5, 0.0]) {
            assert_eq!(op.name, "RZ");
            assert_eq!(op.scalars(), vec![angle]);
            assert_eq!(op.wires, Wires::new([0]));
        }
    }

    #[test]
    fn test_circuit_with_bound_parameters() {
        let mut qc = Circuit::with_size("qc", 3, 1);
        qc.rz(ParameterExpression::symbol("θ"), q(0)).unwrap();
        let bound = qc.bind_parameters(&binding(&[("θ", 0.5)])).unwrap();

        let mut tape = Recorder::new();
        load(bound).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape.len(), 1);
        assert_eq!(tape[0].name, "RZ");
        assert_eq!(tape[0].scalars(), vec![0.5]);
    }

    #[test]
    fn test_u3_parameters_in_order() {
        let mut qc = Circuit::with_size("qc", 1, 1);
        qc.u3(
            ParameterExpression::symbol("θ"),
            ParameterExpression::symbol("φ"),
            ParameterExpression::symbol("λ"),
            q(0),
        )
        .unwrap();

        let mut tape = Recorder::new();
        load(qc)
            .apply(
                &binding(&[("φ", 0.3), ("λ", 0.1), ("θ", 0.5)]),
                None,
                &mut tape,
            )
            .unwrap();
        assert_eq!(tape[0].name, "U3");
        assert_eq!(tape[0].scalars(), vec![0.5, 0.3, 0.1]);
    }

    #[test]
    fn test_longer_parameter_expression() {
        let a = ParameterExpression::symbol("a");
        let b = ParameterExpression::symbol("b");
        let c = ParameterExpression::symbol("c");

        let mut qc = Circuit::with_size("qc", 1, 1);
        qc.rx(a * b.cos() + c, q(0)).unwrap();

        let mut tape = Recorder::new();
        load(qc)
            .apply(
                &binding(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]),
                Some(&Wires::new([0])),
                &mut tape,
            )
            .unwrap();
        assert_eq!(tape[0].name, "RX");
        assert_close(&tape[0].scalars(), &[0.1 * 0.2f64.cos() + 0.3]);
    }

    #[test]
    fn test_parameter_was_not_bound() {
        let mut qc = Circuit::with_size("qc", 3, 1);
        qc.rz(ParameterExpression::symbol("θ"), q(0)).unwrap();

        let mut tape = Recorder::new();
        let err = load(qc).apply(&no_params(), None, &mut tape).unwrap_err();
        assert_eq!(err.to_string(), "The parameter θ was not bound correctly.");
        assert!(tape.is_empty());
    }

    #[test]
    fn test_partially_bound_circuit_queues_nothing() {
        let mut qc = Circuit::with_size("qc", 2, 0);
        qc.rx(ParameterExpression::symbol("a"), q(0)).unwrap();
        qc.h(q(1)).unwrap();
        qc.ry(ParameterExpression::symbol("b"), q(1)).unwrap();

        let mut tape = Recorder::new();
        let err = load(qc)
            .apply(&binding(&[("a", 0.1)]), None, &mut tape)
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnboundParameter(ref name) if name == "b"));
        assert!(tape.is_empty());
    }

    #[test]
    fn test_extra_parameters_were_passed() {
        let qc = Circuit::with_size("qc", 3, 1);
        let err = load(qc)
            .apply(&binding(&[("θ", 0.5), ("φ", 0.3)]), None, &mut Recorder::new())
            .unwrap_err();
        match err {
            ConvertError::UnknownParameters(names) => {
                assert_eq!(names, vec!["θ".to_string(), "φ".to_string()]);
            }
            other => panic!("expected unknown parameters, got {other:?}"),
        }
    }

    #[test]
    fn test_parameters_not_required() {
        let mut qc = Circuit::with_size("qc", 3, 1);
        qc.z(q(0)).unwrap();
        let err = load(qc)
            .apply(&binding(&[("θ", 0.5)]), None, &mut Recorder::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownParameters(_)));
    }

    #[test]
    fn test_non_finite_value() {
        let mut qc = Circuit::with_size("qc", 1, 0);
        qc.rz(ParameterExpression::symbol("θ"), q(0)).unwrap();
        let err = load(qc)
            .apply(&binding(&[("θ", f64::NAN)]), None, &mut Recorder::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidParameterValue { ref name, .. } if name == "θ"));
    }
}

mod wires {
    use super::*;

    #[test]
    fn test_too_few_wires() {
        let qc = Circuit::with_size("qc", 3, 1);
        let err = load(qc)
            .apply(&no_params(), Some(&Wires::new([0, 1])), &mut Recorder::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The specified number of wires - 2 - does not match the number of wires the loaded quantum circuit acts on."
        );
    }

    #[test]
    fn test_too_many_wires() {
        let qc = Circuit::with_size("qc", 3, 1);
        let err = load(qc)
            .apply(
                &no_params(),
                Some(&Wires::new([0, 1, 2, 3])),
                &mut Recorder::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::WireCountMismatch {
                expected: 3,
                got: 4
            }
        ));
    }

    fn two_register_circuit() -> Circuit {
        let mut qc = Circuit::new("qc");
        qc.add_qreg("q0", 2).unwrap();
        qc.add_qreg("q1", 1).unwrap();
        qc.cswap(q(0), q(1), q(2)).unwrap();
        qc
    }

    #[test]
    fn test_two_different_quantum_registers() {
        let mut tape = Recorder::new();
        load(two_register_circuit())
            .apply(&no_params(), None, &mut tape)
            .unwrap();
        assert_eq!(tape[0].name, "CSWAP");
        assert!(tape[0].params.is_empty());
        assert_eq!(tape[0].wires, Wires::new([0, 1, 2]));
    }

    #[test]
    fn test_explicit_wires_over_two_registers() {
        let mut tape = Recorder::new();
        load(two_register_circuit())
            .apply(&no_params(), Some(&Wires::new([0, 1, 2])), &mut tape)
            .unwrap();
        assert_eq!(tape[0].wires, Wires::new([0, 1, 2]));
    }

    #[test]
    fn test_pass_different_wires_than_for_circuit() {
        let mut tape = Recorder::new();
        load(two_register_circuit())
            .apply(&no_params(), Some(&Wires::new([4, 7, 1])), &mut tape)
            .unwrap();
        assert_eq!(tape[0].wires, Wires::new([4, 7, 1]));
    }

    #[test]
    fn test_operand_order_is_kept() {
        let mut qc = Circuit::with_size("qc", 3, 0);
        qc.cx(q(2), q(0)).unwrap();
        let mut tape = Recorder::new();
        load(qc)
            .apply(&no_params(), Some(&Wires::new(["a", "b", "c"])), &mut tape)
            .unwrap();
        assert_eq!(tape[0].wires, Wires::new(["c", "a"]));
    }

    #[test]
    fn test_duplicate_wire_labels() {
        let qc = Circuit::with_size("qc", 2, 0);
        let err = load(qc)
            .apply(&no_params(), Some(&Wires::new([1, 1])), &mut Recorder::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateWire(Wire::Int(1))));
    }

    #[test]
    fn test_corrupted_circuit_is_rejected() {
        let mut value = serde_json::to_value(Circuit::bell().unwrap()).unwrap();
        value["instructions"][1]["qubits"][1] = serde_json::json!(7);
        let corrupted: Circuit = serde_json::from_value(value).unwrap();

        let mut tape = Recorder::new();
        let err = load(corrupted)
            .apply(&no_params(), None, &mut tape)
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidCircuit(_)));
        assert!(tape.is_empty());
    }
}

mod gates {
    use super::*;

    #[test]
    fn test_one_qubit_operations() {
        let mut qc = Circuit::with_size("qc", 1, 1);
        qc.x(q(0)).unwrap();
        qc.y(q(0)).unwrap();
        qc.z(q(0)).unwrap();
        qc.h(q(0)).unwrap();
        qc.s(q(0)).unwrap();
        qc.t(q(0)).unwrap();
        qc.sx(q(0)).unwrap();
        qc.id(q(0)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        let names: Vec<_> = tape.operations().iter().map(|op| op.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["PauliX", "PauliY", "PauliZ", "Hadamard", "S", "T", "SX", "Identity"]
        );
        for op in tape.operations() {
            assert!(op.params.is_empty());
            assert_eq!(op.wires, Wires::new([0]));
        }
    }

    #[test]
    fn test_one_qubit_parametrized_operations() {
        let mut qc = Circuit::with_size("qc", 1, 1);
        qc.p(0.1, q(0)).unwrap();
        qc.rx(0.2, q(0)).unwrap();
        qc.ry(0.3, q(0)).unwrap();
        qc.rz(0.4, q(0)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        let got: Vec<_> = tape
            .operations()
            .iter()
            .map(|op| (op.name.as_str(), op.scalars()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("PhaseShift", vec![0.1]),
                ("RX", vec![0.2]),
                ("RY", vec![0.3]),
                ("RZ", vec![0.4]),
            ]
        );
    }

    #[test]
    fn test_two_qubit_operations() {
        let mut qc = Circuit::with_size("qc", 2, 1);
        qc.cx(q(0), q(1)).unwrap();
        qc.cy(q(0), q(1)).unwrap();
        qc.cz(q(0), q(1)).unwrap();
        qc.swap(q(0), q(1)).unwrap();
        qc.iswap(q(0), q(1)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        let names: Vec<_> = tape.operations().iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["CNOT", "CY", "CZ", "SWAP", "ISWAP"]);
        for op in tape.operations() {
            assert_eq!(op.wires, Wires::new([0, 1]));
        }
    }

    #[test]
    fn test_controlled_rotations() {
        let mut qc = Circuit::with_size("qc", 2, 1);
        qc.crx(0.5, q(0), q(1)).unwrap();
        qc.cry(0.5, q(0), q(1)).unwrap();
        qc.crz(0.5, q(0), q(1)).unwrap();
        qc.cp(0.5, q(0), q(1)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        let names: Vec<_> = tape.operations().iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["CRX", "CRY", "CRZ", "ControlledPhaseShift"]);
        for op in tape.operations() {
            assert_eq!(op.scalars(), vec![0.5]);
        }
    }

    #[test]
    fn test_ising_operations() {
        let mut qc = Circuit::with_size("qc", 2, 0);
        qc.rxx(0.1, q(0), q(1)).unwrap();
        qc.ryy(0.2, q(0), q(1)).unwrap();
        qc.rzz(0.3, q(1), q(0)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape[0].name, "IsingXX");
        assert_eq!(tape[1].name, "IsingYY");
        assert_eq!(tape[2].name, "IsingZZ");
        assert_eq!(tape[2].wires, Wires::new([1, 0]));
    }

    #[test]
    fn test_three_qubit_operations() {
        let mut qc = Circuit::with_size("qc", 3, 1);
        qc.cswap(q(0), q(1), q(2)).unwrap();
        qc.ccx(q(0), q(1), q(2)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape[0].name, "CSWAP");
        assert_eq!(tape[1].name, "Toffoli");
        assert_eq!(tape[1].wires, Wires::new([0, 1, 2]));
    }

    #[test]
    fn test_adjoint_operations() {
        let mut qc = Circuit::with_size("qc", 1, 1);
        qc.sdg(q(0)).unwrap();
        qc.tdg(q(0)).unwrap();
        qc.sxdg(q(0)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        let names: Vec<_> = tape.operations().iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["Adjoint(S)", "Adjoint(T)", "Adjoint(SX)"]);
    }

    #[test]
    fn test_legacy_u_gates() {
        let mut qc = Circuit::with_size("qc", 1, 1);
        qc.u1(0.1, q(0)).unwrap();
        qc.u2(0.1, 0.2, q(0)).unwrap();
        qc.u3(0.1, 0.2, 0.3, q(0)).unwrap();
        qc.u(0.1, 0.2, 0.3, q(0)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape[0].name, "U1");
        assert_eq!(tape[0].scalars(), vec![0.1]);
        assert_eq!(tape[1].name, "U2");
        assert_eq!(tape[1].scalars(), vec![0.1, 0.2]);
        assert_eq!(tape[2].name, "U3");
        assert_eq!(tape[2].scalars(), vec![0.1, 0.2, 0.3]);
        assert_eq!(tape[3].name, "U3");
    }

    #[test]
    fn test_controlled_hadamard_is_a_unitary() {
        let mut qc = Circuit::with_size("qc", 2, 1);
        qc.ch(q(0), q(1)).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape[0].name, "QubitUnitary");
        assert_eq!(tape[0].params.len(), 1);
        assert_eq!(tape[0].wires, Wires::new([0, 1]));

        let s = std::f64::consts::FRAC_1_SQRT_2;
        let expected = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, s, 0.0, s],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, s, 0.0, -s],
        ];
        let matrix = tape[0].params[0].as_matrix().unwrap();
        for (i, row) in expected.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                assert!((matrix[[i, j]] - Complex64::new(*value, 0.0)).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_custom_unitary() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let mut qc = Circuit::with_size("qc", 2, 0);
        qc.unitary("flip", vec![zero, one, one, zero], [q(1)]).unwrap();

        let mut tape = Recorder::new();
        let report = load(qc)
            .apply(&no_params(), Some(&Wires::new([5, 6])), &mut tape)
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(tape[0].name, "QubitUnitary");
        assert_eq!(tape[0].wires, Wires::new([6]));
    }

    #[test]
    fn test_initialize() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let amplitudes = vec![
            Complex64::new(s, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, s),
        ];
        let mut qc = Circuit::with_size("qc", 2, 0);
        qc.initialize(amplitudes.clone(), [q(0), q(1)]).unwrap();

        let mut tape = Recorder::new();
        load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape[0].name, "QubitStateVector");
        assert_eq!(tape[0].wires, Wires::new([0, 1]));
        match &tape[0].params[0] {
            OperationParam::StateVector(v) => assert_eq!(v.to_vec(), amplitudes),
            other => panic!("expected a state vector, got {other:?}"),
        }
    }
}

mod skipped {
    use super::*;

    #[test]
    fn test_barrier_not_supported() {
        let mut qc = Circuit::with_size("qc", 3, 1);
        qc.barrier_all().unwrap();

        let mut tape = Recorder::new();
        let report = load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert!(tape.is_empty());
        assert_eq!(report.skipped, vec!["Barrier".to_string()]);
        assert_eq!(report.emitted, 0);
    }

    #[test]
    fn test_measure_and_reset_skipped_in_order() {
        let mut qc = Circuit::bell().unwrap();
        qc.reset(q(1)).unwrap();

        let mut tape = Recorder::new();
        let report = load(qc).apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape.len(), 2);
        assert_eq!(report.emitted, 2);
        assert_eq!(report.skipped, vec!["Measure", "Measure", "Reset"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_opaque_gate_skipped() {
        let loaded = load_qasm("qreg q[2]; opaque oracle a,b; h q[0]; oracle q[0],q[1];").unwrap();
        let mut tape = Recorder::new();
        let report = loaded.apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape.len(), 1);
        assert_eq!(report.skipped, vec!["oracle".to_string()]);
    }
}

mod qasm {
    use super::*;

    const PROGRAM: &str = "OPENQASM 2.0;include \"qelib1.inc\";qreg q[4];creg c[4];x q[0]; x q[2];barrier q;h q[0];h q[1];h q[2];h q[3];measure q -> c;";

    #[test]
    fn test_qasm_source() {
        let loaded = load_qasm(PROGRAM).unwrap();
        let mut tape = Recorder::new();
        let report = loaded.apply(&no_params(), None, &mut tape).unwrap();

        let names: Vec<_> = tape.operations().iter().map(|op| op.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["PauliX", "PauliX", "Hadamard", "Hadamard", "Hadamard", "Hadamard"]
        );
        assert_eq!(tape[1].wires, Wires::new([2]));
        assert_eq!(tape[5].wires, Wires::new([3]));
        assert_eq!(report.skipped.len(), 5);
    }

    #[test]
    fn test_qasm_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROGRAM.as_bytes()).unwrap();

        let loaded = load_qasm_from_file(file.path()).unwrap();
        assert_eq!(loaded.num_wires(), 4);
    }

    #[test]
    fn test_qasm_file_not_found() {
        let err = load_qasm_from_file("no/such/circuit.qasm").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_qasm_without_header_keeps_operand_order() {
        let loaded =
            load_qasm("include \"qelib1.inc\";qreg q[4];creg c[4];x q[0];cx q[2],q[0];measure q -> c;")
                .unwrap();
        let mut tape = Recorder::new();
        loaded.apply(&no_params(), None, &mut tape).unwrap();
        assert_eq!(tape[1].name, "CNOT");
        assert_eq!(tape[1].wires, Wires::new([2, 0]));
    }

    #[test]
    fn test_qasm_parse_error() {
        assert!(matches!(
            load_qasm("qreg q[1]; h q[0]"),
            Err(ConvertError::Parse(_))
        ));
    }

    #[test]
    fn test_qasm_symbolic_parameters() {
        let loaded = load_qasm("qreg q[2]; ry(a*b) q[1]; rx(a + cos(b)) q[0];").unwrap();
        assert_eq!(
            loaded.parameters().into_iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        let mut tape = Recorder::new();
        loaded
            .apply(&binding(&[("a", 0.1), ("b", 0.2)]), None, &mut tape)
            .unwrap();
        assert_close(&tape[0].scalars(), &[0.1 * 0.2]);
        assert_close(&tape[1].scalars(), &[0.1 + 0.2f64.cos()]);
    }
}

proptest! {
    #[test]
    fn map_wires_is_a_positional_bijection(
        labels in prop::collection::hash_set(-50i64..50, 1..12)
    ) {
        let labels: Vec<i64> = labels.into_iter().collect();
        let qubits: Vec<QubitId> = (0..labels.len() as u32).map(QubitId).collect();
        let map = map_wires(&Wires::new(labels.clone()), &qubits).unwrap();

        prop_assert_eq!(map.len(), labels.len());
        for (i, label) in labels.iter().enumerate() {
            let wire = Wire::Int(*label);
            prop_assert_eq!(map.qubit(&wire), Some(qubits[i]));
            prop_assert_eq!(map.wire(qubits[i]), Some(&wire));
        }
    }

    #[test]
    fn output_follows_source_order_and_arity(
        gates in prop::collection::vec((0u8..4, 0u32..3, 1u32..3), 0..20),
        offset in 0i64..100,
    ) {
        let mut qc = Circuit::with_size("random", 3, 0);
        for (kind, a, shift) in &gates {
            let b = (a + shift) % 3;
            match kind {
                0 => { qc.h(q(*a)).unwrap(); }
                1 => { qc.cx(q(*a), q(b)).unwrap(); }
                2 => { qc.rzz(0.25, q(*a), q(b)).unwrap(); }
                _ => { qc.ccx(q(*a), q(b), q(3 - a - b)).unwrap(); }
            }
        }

        let wires = Wires::new([offset, offset + 1, offset + 2]);
        let mut tape = Recorder::new();
        let loaded = load(qc.clone());
        loaded.apply(&ParameterBinding::default(), Some(&wires), &mut tape).unwrap();

        prop_assert_eq!(tape.len(), qc.len());
        for (inst, op) in qc.instructions().iter().zip(tape.operations()) {
            let expected: Vec<Wire> = inst.qubits.iter().map(|q| Wire::Int(offset + i64::from(q.0))).collect();
            prop_assert_eq!(op.wires.as_slice(), expected.as_slice());
        }
    }
}
