//! AST-to-Circuit lowering.
//!
//! Registers are allocated in declaration order. User gate definitions are
//! expanded in place; opaque gates become [`CustomGate`]s without a matrix.

use qbridge_ir::{
    Circuit, ClbitId, CustomGate, ParameterExpression, ParameterFunction, QubitId, StandardGate,
};
use rustc_hash::FxHashMap;

use crate::ast::{Argument, BinOp, Expression, GateCall, GateDef, Operation, Program, Statement};
use crate::error::{ParseError, ParseResult};

const STDLIB: &str = "qelib1.inc";
const MAX_EXPANSION_DEPTH: usize = 64;

type Env = FxHashMap<String, ParameterExpression>;

pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer {
        circuit: Circuit::new("circuit"),
        definitions: FxHashMap::default(),
        opaque: FxHashMap::default(),
        stdlib_included: false,
    };
    for stmt in &program.statements {
        lowerer.lower_statement(stmt)?;
    }
    tracing::debug!(
        qubits = lowerer.circuit.num_qubits(),
        instructions = lowerer.circuit.len(),
        "lowered qasm program"
    );
    Ok(lowerer.circuit)
}

struct Lowerer {
    circuit: Circuit,
    definitions: FxHashMap<String, GateDef>,
    /// Opaque gate name -> (parameter count, qubit count).
    opaque: FxHashMap<String, (usize, usize)>,
    stdlib_included: bool,
}

impl Lowerer {
    fn lower_statement(&mut self, stmt: &Statement) -> ParseResult<()> {
        match stmt {
            Statement::Include(path) => {
                if path != STDLIB {
                    return Err(ParseError::UnsupportedInclude(path.clone()));
                }
                self.stdlib_included = true;
                Ok(())
            }
            Statement::QReg { name, size } => {
                self.check_fresh_register(name)?;
                self.circuit.add_qreg(name.clone(), *size)?;
                Ok(())
            }
            Statement::CReg { name, size } => {
                self.check_fresh_register(name)?;
                self.circuit.add_creg(name.clone(), *size)?;
                Ok(())
            }
            Statement::GateDef(def) => {
                self.check_fresh_gate(&def.name)?;
                self.definitions.insert(def.name.clone(), def.clone());
                Ok(())
            }
            Statement::Opaque {
                name,
                params,
                qubits,
            } => {
                self.check_fresh_gate(name)?;
                self.opaque.insert(name.clone(), (params.len(), qubits.len()));
                Ok(())
            }
            Statement::Op(op) => self.lower_operation(op),
            Statement::If { register, .. } => Err(ParseError::Unsupported(format!(
                "operation conditioned on classical register '{register}'"
            ))),
        }
    }

    fn check_fresh_register(&self, name: &str) -> ParseResult<()> {
        if self.circuit.qreg(name).is_some() || self.circuit.creg(name).is_some() {
            return Err(ParseError::DuplicateDeclaration(name.to_string()));
        }
        Ok(())
    }

    fn check_fresh_gate(&self, name: &str) -> ParseResult<()> {
        let shadows_stdlib = self.stdlib_included && in_stdlib(name);
        if shadows_stdlib
            || self.definitions.contains_key(name)
            || self.opaque.contains_key(name)
        {
            return Err(ParseError::DuplicateDeclaration(name.to_string()));
        }
        Ok(())
    }

    fn lower_operation(&mut self, op: &Operation) -> ParseResult<()> {
        match op {
            Operation::Gate(call) => {
                let params = call
                    .params
                    .iter()
                    .map(|e| expr_to_param(e, None))
                    .collect::<ParseResult<Vec<_>>>()?;
                let resolved = call
                    .args
                    .iter()
                    .map(|a| self.resolve_qubits(a))
                    .collect::<ParseResult<Vec<_>>>()?;
                for qubits in broadcast(&call.name, &resolved)? {
                    self.apply_gate(&call.name, &params, &qubits, 0)?;
                }
                Ok(())
            }
            Operation::Measure { qubit, bit } => {
                let qubits = self.resolve_qubits(qubit)?;
                let clbits = self.resolve_clbits(bit)?;
                if qubits.len() != clbits.len() {
                    return Err(ParseError::BroadcastMismatch {
                        statement: format!("measure {qubit} -> {bit}"),
                        sizes: vec![qubits.len() as u32, clbits.len() as u32],
                    });
                }
                for (q, c) in qubits.into_iter().zip(clbits) {
                    self.circuit.measure(q, c)?;
                }
                Ok(())
            }
            Operation::Reset(arg) => {
                for q in self.resolve_qubits(arg)? {
                    self.circuit.reset(q)?;
                }
                Ok(())
            }
            Operation::Barrier(args) => {
                let mut qubits: Vec<QubitId> = Vec::new();
                for arg in args {
                    for q in self.resolve_qubits(arg)? {
                        if !qubits.contains(&q) {
                            qubits.push(q);
                        }
                    }
                }
                self.circuit.barrier(qubits)?;
                Ok(())
            }
        }
    }

    fn apply_gate(
        &mut self,
        name: &str,
        params: &[ParameterExpression],
        qubits: &[QubitId],
        depth: usize,
    ) -> ParseResult<()> {
        if depth > MAX_EXPANSION_DEPTH {
            return Err(ParseError::Unsupported(format!(
                "gate '{name}' nests deeper than {MAX_EXPANSION_DEPTH} levels"
            )));
        }

        if let Some(def) = self.definitions.get(name).cloned() {
            check_count(name, "parameters", def.params.len(), params.len())?;
            check_count(name, "qubits", def.qubits.len(), qubits.len())?;
            return self.expand(&def, params, qubits, depth);
        }

        if let Some(&(num_params, num_qubits)) = self.opaque.get(name) {
            check_count(name, "parameters", num_params, params.len())?;
            check_count(name, "qubits", num_qubits, qubits.len())?;
            let gate = CustomGate::new(name, num_qubits as u32).with_params(params.to_vec());
            self.circuit.gate(gate, qubits.iter().copied())?;
            return Ok(());
        }

        let lookup = if name == "U" { "u" } else { name };
        let Some(gate) = StandardGate::from_name(lookup, params.to_vec()) else {
            return match standard_param_count(lookup) {
                Some(expected) => Err(ParseError::WrongParameterCount {
                    gate: name.to_string(),
                    expected,
                    got: params.len(),
                }),
                None => Err(ParseError::UnknownGate(name.to_string())),
            };
        };
        check_count(name, "qubits", gate.num_qubits() as usize, qubits.len())?;
        self.circuit.gate(gate, qubits.iter().copied())?;
        Ok(())
    }

    fn expand(
        &mut self,
        def: &GateDef,
        params: &[ParameterExpression],
        qubits: &[QubitId],
        depth: usize,
    ) -> ParseResult<()> {
        let env: Env = def
            .params
            .iter()
            .cloned()
            .zip(params.iter().cloned())
            .collect();
        let wires: FxHashMap<&str, QubitId> = def
            .qubits
            .iter()
            .map(String::as_str)
            .zip(qubits.iter().copied())
            .collect();
        let local = |arg: &Argument| -> ParseResult<QubitId> {
            if arg.index.is_some() {
                return Err(ParseError::Unsupported(format!(
                    "indexed argument '{arg}' inside gate '{}'",
                    def.name
                )));
            }
            wires
                .get(arg.name.as_str())
                .copied()
                .ok_or_else(|| ParseError::UndefinedIdentifier(arg.name.clone()))
        };

        for op in &def.body {
            match op {
                Operation::Gate(GateCall { name, params, args }) => {
                    let params = params
                        .iter()
                        .map(|e| expr_to_param(e, Some(&env)))
                        .collect::<ParseResult<Vec<_>>>()?;
                    let targets = args.iter().map(&local).collect::<ParseResult<Vec<_>>>()?;
                    self.apply_gate(name, &params, &targets, depth + 1)?;
                }
                Operation::Barrier(args) => {
                    let targets = args.iter().map(&local).collect::<ParseResult<Vec<_>>>()?;
                    self.circuit.barrier(targets)?;
                }
                Operation::Measure { .. } | Operation::Reset(_) => {
                    return Err(ParseError::Unsupported(format!(
                        "non-unitary operation inside gate '{}'",
                        def.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn resolve_qubits(&self, arg: &Argument) -> ParseResult<Vec<QubitId>> {
        let reg = self
            .circuit
            .qreg(&arg.name)
            .ok_or_else(|| ParseError::UndefinedIdentifier(arg.name.clone()))?;
        let ids = resolve(&arg.name, reg.start, reg.size, arg.index)?;
        Ok(ids.into_iter().map(QubitId).collect())
    }

    fn resolve_clbits(&self, arg: &Argument) -> ParseResult<Vec<ClbitId>> {
        let reg = self
            .circuit
            .creg(&arg.name)
            .ok_or_else(|| ParseError::UndefinedIdentifier(arg.name.clone()))?;
        let ids = resolve(&arg.name, reg.start, reg.size, arg.index)?;
        Ok(ids.into_iter().map(ClbitId).collect())
    }
}

fn resolve(register: &str, start: u32, size: u32, index: Option<u32>) -> ParseResult<Vec<u32>> {
    match index {
        Some(i) if i >= size => Err(ParseError::IndexOutOfBounds {
            register: register.to_string(),
            index: i as usize,
            size: size as usize,
        }),
        Some(i) => Ok(vec![start + i]),
        None => Ok((start..start + size).collect()),
    }
}

/// Expand whole-register arguments into one operand list per application.
///
/// Single elements repeat; all whole registers must share a size.
fn broadcast(gate: &str, resolved: &[Vec<QubitId>]) -> ParseResult<Vec<Vec<QubitId>>> {
    let sizes: Vec<u32> = resolved
        .iter()
        .filter(|r| r.len() != 1)
        .map(|r| r.len() as u32)
        .collect();
    let width = match sizes.first() {
        None => 1,
        Some(&first) if sizes.iter().all(|&s| s == first) => first as usize,
        Some(_) => {
            return Err(ParseError::BroadcastMismatch {
                statement: gate.to_string(),
                sizes,
            });
        }
    };
    Ok((0..width)
        .map(|i| {
            resolved
                .iter()
                .map(|r| if r.len() == 1 { r[0] } else { r[i] })
                .collect()
        })
        .collect())
}

fn check_count(gate: &str, what: &str, expected: usize, got: usize) -> ParseResult<()> {
    if expected == got {
        return Ok(());
    }
    let gate = gate.to_string();
    Err(if what == "qubits" {
        ParseError::WrongQubitCount { gate, expected, got }
    } else {
        ParseError::WrongParameterCount { gate, expected, got }
    })
}

/// Whether `qelib1.inc` declares `name`. `iswap` and `ryy` are built in
/// here but absent from the include file, so files may define them.
fn in_stdlib(name: &str) -> bool {
    standard_param_count(name).is_some() && !matches!(name, "iswap" | "ryy")
}

/// Parameter count of a built-in gate, if `name` is one.
fn standard_param_count(name: &str) -> Option<usize> {
    (0..=3).find(|&n| {
        StandardGate::from_name(name, vec![ParameterExpression::constant(0.0); n]).is_some()
    })
}

/// Convert an AST expression to a [`ParameterExpression`].
///
/// With an environment (inside a gate body) every identifier must be a
/// formal parameter; at top level identifiers become free parameters.
#[allow(clippy::cast_precision_loss)]
fn expr_to_param(expr: &Expression, env: Option<&Env>) -> ParseResult<ParameterExpression> {
    let lower = |e: &Expression| expr_to_param(e, env).map(Box::new);
    Ok(match expr {
        Expression::Real(v) => ParameterExpression::Constant(*v),
        Expression::Int(v) => ParameterExpression::Constant(*v as f64),
        Expression::Pi => ParameterExpression::Pi,
        Expression::Ident(name) => match env {
            Some(env) => env
                .get(name)
                .cloned()
                .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone()))?,
            None => ParameterExpression::Symbol(name.clone()),
        },
        Expression::Neg(e) => ParameterExpression::Neg(lower(e)?),
        Expression::Binary { left, op, right } => {
            let (l, r) = (lower(left)?, lower(right)?);
            match op {
                BinOp::Add => ParameterExpression::Add(l, r),
                BinOp::Sub => ParameterExpression::Sub(l, r),
                BinOp::Mul => ParameterExpression::Mul(l, r),
                BinOp::Div => ParameterExpression::Div(l, r),
                BinOp::Pow => ParameterExpression::Pow(l, r),
            }
        }
        Expression::Call { func, arg } => {
            let func = ParameterFunction::from_name(func)
                .ok_or_else(|| ParseError::UndefinedIdentifier(func.clone()))?;
            ParameterExpression::Func(func, lower(arg)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use qbridge_ir::InstructionKind;

    fn names(circuit: &Circuit) -> Vec<String> {
        circuit
            .instructions()
            .iter()
            .map(|i| i.name().to_string())
            .collect()
    }

    #[test]
    fn test_broadcast_rules() {
        let q = |i| QubitId(i);
        let out = broadcast("cx", &[vec![q(0), q(1)], vec![q(2), q(3)]]).unwrap();
        assert_eq!(out, vec![vec![q(0), q(2)], vec![q(1), q(3)]]);

        let out = broadcast("cx", &[vec![q(0)], vec![q(2), q(3)]]).unwrap();
        assert_eq!(out, vec![vec![q(0), q(2)], vec![q(0), q(3)]]);

        assert!(matches!(
            broadcast("cx", &[vec![q(0), q(1)], vec![q(2), q(3), q(4)]]),
            Err(ParseError::BroadcastMismatch { .. })
        ));
    }

    #[test]
    fn test_registers_are_laid_out_in_order() {
        let circuit = parse("qreg a[2]; qreg b[1]; x b[0];").unwrap();
        assert_eq!(circuit.instructions()[0].qubits, vec![QubitId(2)]);
    }

    #[test]
    fn test_gate_definition_is_inlined() {
        let circuit = parse(
            r"
            qreg q[2];
            gate ent(theta) a, b { h a; cx a, b; rz(theta/2) b; }
            ent(pi) q[1], q[0];
        ",
        )
        .unwrap();
        assert_eq!(names(&circuit), vec!["h", "cx", "rz"]);
        assert_eq!(circuit.instructions()[0].qubits, vec![QubitId(1)]);
        assert_eq!(circuit.instructions()[1].qubits, vec![QubitId(1), QubitId(0)]);
        let angle = circuit.instructions()[2].parameters()[0].as_f64().unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_nested_definition_keeps_free_parameter() {
        let circuit = parse(
            r"
            qreg q[1];
            gate inner(a) x { rx(2*a) x; }
            gate outer(b) x { inner(b + 1) x; }
            outer(theta) q[0];
        ",
        )
        .unwrap();
        assert_eq!(
            circuit.parameters().into_iter().collect::<Vec<_>>(),
            vec!["theta".to_string()]
        );
    }

    #[test]
    fn test_undefined_identifier_in_body() {
        let err = parse("qreg q[1]; gate g a { rx(zeta) a; } g q[0];").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedIdentifier(ref n) if n == "zeta"));
    }

    #[test]
    fn test_opaque_becomes_custom_gate() {
        let circuit = parse("qreg q[2]; opaque oracle(t) a, b; oracle(0.5) q[0], q[1];").unwrap();
        match &circuit.instructions()[0].kind {
            InstructionKind::Gate(g) => {
                assert_eq!(g.name(), "oracle");
                assert_eq!(g.parameters().len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_builtin_u_and_cx() {
        let circuit = parse("qreg q[2]; U(0, 0, pi) q[0]; CX q[0], q[1];").unwrap();
        assert_eq!(names(&circuit), vec!["u", "cx"]);
    }

    #[test]
    fn test_gate_errors() {
        assert!(matches!(
            parse("qreg q[1]; foo q[0];"),
            Err(ParseError::UnknownGate(_))
        ));
        assert!(matches!(
            parse("qreg q[1]; rx q[0];"),
            Err(ParseError::WrongParameterCount { expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            parse("qreg q[2]; h q[0], q[1];"),
            Err(ParseError::WrongQubitCount { expected: 1, got: 2, .. })
        ));
        assert!(matches!(
            parse("qreg q[2]; x q[2];"),
            Err(ParseError::IndexOutOfBounds { index: 2, size: 2, .. })
        ));
        assert!(matches!(
            parse("qreg q[1]; creg c[1]; if (c == 1) x q[0];"),
            Err(ParseError::Unsupported(_))
        ));
    }

    #[test]
    fn test_duplicate_declarations() {
        assert!(matches!(
            parse("qreg q[1]; creg q[1];"),
            Err(ParseError::DuplicateDeclaration(_))
        ));
        assert!(matches!(
            parse("include \"qelib1.inc\"; gate h a { U(pi/2, 0, pi) a; }"),
            Err(ParseError::DuplicateDeclaration(_))
        ));
        // Without the standard library a file may define its own `h`.
        let circuit = parse("qreg q[1]; gate h a { U(pi/2, 0, pi) a; } h q[0];").unwrap();
        assert_eq!(names(&circuit), vec!["u"]);
    }

    #[test]
    fn test_unsupported_include() {
        assert!(matches!(
            parse("include \"mylib.inc\";"),
            Err(ParseError::UnsupportedInclude(_))
        ));
    }
}
