//! OpenQASM 2.0 emitter.

use std::fmt::Write as _;

use qbridge_ir::{
    Circuit, ClbitId, GateKind, Instruction, InstructionKind, ParameterExpression, QubitId,
    StandardGate,
};
use rustc_hash::FxHashSet;

use crate::error::{ParseError, ParseResult};

const ISWAP_DEF: &str = "gate iswap a,b { s a; s b; h a; cx a,b; cx b,a; h b; }";
const RYY_DEF: &str =
    "gate ryy(theta) a,b { rx(pi/2) a; rx(pi/2) b; cx a,b; rz(theta) b; cx a,b; rx(-pi/2) a; rx(-pi/2) b; }";

/// Emit a circuit as `OPENQASM 2.0` source.
///
/// Register names are kept. Gates missing from `qelib1.inc` get inline
/// definitions, and opaque custom gates get `opaque` declarations. Circuits
/// holding explicit unitaries or state preparation cannot be expressed and
/// are rejected.
pub fn emit(circuit: &Circuit) -> ParseResult<String> {
    Emitter::new(circuit).emit()
}

struct Emitter<'c> {
    circuit: &'c Circuit,
    output: String,
}

impl<'c> Emitter<'c> {
    fn new(circuit: &'c Circuit) -> Self {
        Self {
            circuit,
            output: String::new(),
        }
    }

    fn emit(mut self) -> ParseResult<String> {
        self.line("OPENQASM 2.0;");
        self.line("include \"qelib1.inc\";");
        self.emit_definitions()?;

        for reg in self.circuit.qregs() {
            let decl = format!("qreg {}[{}];", reg.name, reg.size);
            self.line(&decl);
        }
        for reg in self.circuit.cregs() {
            let decl = format!("creg {}[{}];", reg.name, reg.size);
            self.line(&decl);
        }

        for inst in self.circuit.instructions() {
            self.emit_instruction(inst)?;
        }
        Ok(self.output)
    }

    fn emit_definitions(&mut self) -> ParseResult<()> {
        let mut seen = FxHashSet::default();
        let mut defs = Vec::new();
        for inst in self.circuit.instructions() {
            let InstructionKind::Gate(gate) = &inst.kind else {
                continue;
            };
            match &gate.kind {
                GateKind::Standard(StandardGate::ISwap) if seen.insert("iswap".to_string()) => {
                    defs.push(ISWAP_DEF.to_string());
                }
                GateKind::Standard(StandardGate::RYY(_)) if seen.insert("ryy".to_string()) => {
                    defs.push(RYY_DEF.to_string());
                }
                GateKind::Custom(custom) if custom.matrix.is_some() => {
                    return Err(ParseError::Unsupported(format!(
                        "unitary gate '{}' has no OpenQASM 2.0 form",
                        custom.name
                    )));
                }
                GateKind::Custom(custom) if seen.insert(custom.name.clone()) => {
                    let params: Vec<String> =
                        (0..custom.params.len()).map(|i| format!("p{i}")).collect();
                    let qubits: Vec<String> =
                        (0..custom.num_qubits).map(|i| format!("a{i}")).collect();
                    let signature = if params.is_empty() {
                        custom.name.clone()
                    } else {
                        format!("{}({})", custom.name, params.join(","))
                    };
                    defs.push(format!("opaque {signature} {};", qubits.join(",")));
                }
                _ => {}
            }
        }
        for def in defs {
            self.line(&def);
        }
        Ok(())
    }

    fn emit_instruction(&mut self, inst: &Instruction) -> ParseResult<()> {
        let qubits = self.qubits(&inst.qubits);
        match &inst.kind {
            InstructionKind::Gate(gate) => {
                let name = match &gate.kind {
                    GateKind::Standard(StandardGate::U(..)) => "u3",
                    other => other.name(),
                };
                let params = gate.parameters();
                let line = if params.is_empty() {
                    format!("{name} {qubits};")
                } else {
                    let params: Vec<String> = params.into_iter().map(emit_param).collect();
                    format!("{name}({}) {qubits};", params.join(","))
                };
                self.line(&line);
            }
            InstructionKind::Measure => {
                for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                    let line = format!("measure {} -> {};", self.qubit(*q), self.clbit(*c));
                    self.line(&line);
                }
            }
            InstructionKind::Reset => {
                let line = format!("reset {qubits};");
                self.line(&line);
            }
            InstructionKind::Barrier => {
                let line = format!("barrier {qubits};");
                self.line(&line);
            }
            InstructionKind::Delay { duration } => {
                let line = format!("// delay[{duration}] {qubits};");
                self.line(&line);
            }
            InstructionKind::Initialize { .. } => {
                return Err(ParseError::Unsupported(
                    "state initialization has no OpenQASM 2.0 form".into(),
                ));
            }
        }
        Ok(())
    }

    fn qubit(&self, id: QubitId) -> String {
        self.circuit
            .qubits()
            .get(id.0 as usize)
            .map_or_else(|| format!("q[{}]", id.0), ToString::to_string)
    }

    fn clbit(&self, id: ClbitId) -> String {
        self.circuit
            .clbits()
            .get(id.0 as usize)
            .map_or_else(|| format!("c[{}]", id.0), ToString::to_string)
    }

    fn qubits(&self, ids: &[QubitId]) -> String {
        ids.iter()
            .map(|q| self.qubit(*q))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn line(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }
}

/// Render a parameter. Constants keep full precision.
fn emit_param(param: &ParameterExpression) -> String {
    match param {
        ParameterExpression::Constant(v) => format!("{v}"),
        ParameterExpression::Symbol(name) => name.clone(),
        ParameterExpression::Pi => "pi".into(),
        ParameterExpression::Neg(e) => format!("-({})", emit_param(e)),
        ParameterExpression::Add(a, b) => format!("({} + {})", emit_param(a), emit_param(b)),
        ParameterExpression::Sub(a, b) => format!("({} - {})", emit_param(a), emit_param(b)),
        ParameterExpression::Mul(a, b) => format!("({} * {})", emit_param(a), emit_param(b)),
        ParameterExpression::Div(a, b) => format!("({} / {})", emit_param(a), emit_param(b)),
        ParameterExpression::Pow(a, b) => format!("({} ^ {})", emit_param(a), emit_param(b)),
        ParameterExpression::Func(f, e) => format!("{}({})", f.name(), emit_param(e)),
    }
}
