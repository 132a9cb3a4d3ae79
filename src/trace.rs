//! Trace-file (gate-list) parser and circuit synthesis driver.
//!
//! A trace describes a combinational circuit that drives the engine with a
//! realistic synthesis workload. The format, shown here for the ISCAS85
//! test circuit `c17`:
//!
//! ```text
//! MODULE c17
//! INPUT
//!   1gat,2gat,3gat,6gat,7gat;
//! OUTPUT
//!   22gat,23gat;
//! STRUCTURE
//!   10gat = nand(1gat, 3gat);
//!   11gat = nand(3gat, 6gat);
//!   16gat = nand(2gat, 11gat);
//!   19gat = nand(11gat, 7gat);
//!   22gat = nand(10gat, 16gat);
//!   23gat = nand(16gat, 19gat);
//! ENDMODULE
//! ```
//!
//! Lines starting with `#` are comments. Signal lists are comma-separated
//! and semicolon-terminated; they may share a line with their section
//! keyword or follow on the next lines. Structure lines apply one of
//! `not`, `xor`, `nand`, `nor`, `and`, `or` (where `and`/`or` fold over any
//! number of operands and `nand`/`nor` negate that fold), or the plain copy
//! form `out = in;`.
//!
//! This module is pure client code: it maps each primary input to a
//! declared variable and lowers every gate to the Boolean operator surface
//! of the engine.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::bdd::Bdd;
use crate::reference::Ref;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("missing `{0}` section")]
    MissingSection(&'static str),

    #[error("line {line}: malformed gate `{text}`")]
    MalformedGate { line: usize, text: String },

    #[error("line {line}: unknown operator `{op}`")]
    UnknownOperator { line: usize, op: String },

    #[error("line {line}: unknown signal `{name}`")]
    UnknownSignal { line: usize, name: String },

    #[error("line {line}: operator `{op}` got {got} operand(s)")]
    BadArity { line: usize, op: String, got: usize },

    #[error("trace declares {0} inputs, more than the engine can support")]
    TooManyInputs(usize),
}

/// A supported logical operator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GateOp {
    Not,
    Xor,
    Nand,
    Nor,
    And,
    Or,
    /// The plain `out = in;` form.
    Copy,
}

impl GateOp {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "not" => Some(GateOp::Not),
            "xor" => Some(GateOp::Xor),
            "nand" => Some(GateOp::Nand),
            "nor" => Some(GateOp::Nor),
            "and" => Some(GateOp::And),
            "or" => Some(GateOp::Or),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            GateOp::Not => "not",
            GateOp::Xor => "xor",
            GateOp::Nand => "nand",
            GateOp::Nor => "nor",
            GateOp::And => "and",
            GateOp::Or => "or",
            GateOp::Copy => "=",
        }
    }
}

/// One structural line: `output = op(inputs...)`.
#[derive(Debug, Clone)]
pub struct Gate {
    pub output: String,
    pub op: GateOp,
    pub inputs: Vec<String>,
    /// 1-based source line, kept for error reporting.
    pub line: usize,
}

/// A parsed trace file.
#[derive(Debug, Clone)]
pub struct Trace {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub gates: Vec<Gate>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Section {
    Module,
    Inputs,
    Outputs,
    Structure,
    Done,
}

impl Trace {
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Parse a trace from its textual form.
    pub fn parse(text: &str) -> Result<Self, TraceError> {
        let mut name = None;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut gates = Vec::new();
        let mut section = Section::Module;

        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("MODULE") {
                name = Some(rest.trim().to_string());
                section = Section::Inputs;
                continue;
            }
            if line == "INPUT" || line.starts_with("INPUT ") {
                section = Section::Inputs;
                parse_signals(&line["INPUT".len()..], &mut inputs);
                continue;
            }
            if line == "OUTPUT" || line.starts_with("OUTPUT ") {
                section = Section::Outputs;
                parse_signals(&line["OUTPUT".len()..], &mut outputs);
                continue;
            }
            if line == "STRUCTURE" {
                section = Section::Structure;
                continue;
            }
            if line == "ENDMODULE" {
                section = Section::Done;
                break;
            }

            match section {
                Section::Inputs => parse_signals(line, &mut inputs),
                Section::Outputs => parse_signals(line, &mut outputs),
                Section::Structure => gates.push(parse_gate(line, lineno)?),
                Section::Module | Section::Done => {
                    return Err(TraceError::MalformedGate {
                        line: lineno,
                        text: line.to_string(),
                    })
                }
            }
        }

        let name = name.ok_or(TraceError::MissingSection("MODULE"))?;
        if inputs.is_empty() {
            return Err(TraceError::MissingSection("INPUT"));
        }
        if outputs.is_empty() {
            return Err(TraceError::MissingSection("OUTPUT"));
        }
        if section != Section::Done {
            return Err(TraceError::MissingSection("ENDMODULE"));
        }

        debug!(
            "parsed trace `{}`: {} inputs, {} outputs, {} gates",
            name,
            inputs.len(),
            outputs.len(),
            gates.len()
        );

        Ok(Trace {
            name,
            inputs,
            outputs,
            gates,
        })
    }
}

fn parse_signals(text: &str, into: &mut Vec<String>) {
    for part in text.split(&[',', ';'][..]) {
        let signal = part.trim();
        if !signal.is_empty() {
            into.push(signal.to_string());
        }
    }
}

fn parse_gate(line: &str, lineno: usize) -> Result<Gate, TraceError> {
    let malformed = || TraceError::MalformedGate {
        line: lineno,
        text: line.to_string(),
    };

    let body = line.strip_suffix(';').unwrap_or(line);
    let (output, rhs) = body.split_once('=').ok_or_else(malformed)?;
    let output = output.trim().to_string();
    let rhs = rhs.trim();
    if output.is_empty() || rhs.is_empty() {
        return Err(malformed());
    }

    if let Some((op_name, rest)) = rhs.split_once('(') {
        let op_name = op_name.trim();
        let op = GateOp::parse(op_name).ok_or_else(|| TraceError::UnknownOperator {
            line: lineno,
            op: op_name.to_string(),
        })?;
        let args = rest.strip_suffix(')').ok_or_else(malformed)?;
        let inputs: Vec<String> = args
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let arity_ok = match op {
            GateOp::Not => inputs.len() == 1,
            GateOp::Xor => inputs.len() == 2,
            GateOp::And | GateOp::Or | GateOp::Nand | GateOp::Nor => !inputs.is_empty(),
            GateOp::Copy => unreachable!(),
        };
        if !arity_ok {
            return Err(TraceError::BadArity {
                line: lineno,
                op: op.name().to_string(),
                got: inputs.len(),
            });
        }

        Ok(Gate {
            output,
            op,
            inputs,
            line: lineno,
        })
    } else {
        // Plain copy: `out = in;`
        Ok(Gate {
            output,
            op: GateOp::Copy,
            inputs: vec![rhs.to_string()],
            line: lineno,
        })
    }
}

/// Build the BDD of every primary output.
///
/// Primary inputs are bound to `variable(1..=k)` in declaration order; each
/// structure line synthesizes one edge and stores it under its output name.
/// Returns the `(name, edge)` pairs in OUTPUT order.
pub fn synthesize(bdd: &Bdd, trace: &Trace) -> Result<Vec<(String, Ref)>, TraceError> {
    if trace.num_inputs() > bdd.num_vars() as usize {
        return Err(TraceError::TooManyInputs(trace.num_inputs()));
    }

    let mut signals: HashMap<&str, Ref> = HashMap::new();
    for (i, input) in trace.inputs.iter().enumerate() {
        signals.insert(input, bdd.variable((i + 1) as u16));
    }

    for gate in &trace.gates {
        let mut args = Vec::with_capacity(gate.inputs.len());
        for name in &gate.inputs {
            let edge = signals
                .get(name.as_str())
                .copied()
                .ok_or_else(|| TraceError::UnknownSignal {
                    line: gate.line,
                    name: name.clone(),
                })?;
            args.push(edge);
        }

        debug!("gate {} = {}{:?}", gate.output, gate.op.name(), gate.inputs);

        let result = match gate.op {
            GateOp::Not => bdd.apply_not(args[0]),
            GateOp::Copy => args[0],
            GateOp::Xor => bdd.apply_xor(args[0], args[1]),
            GateOp::And | GateOp::Nand => {
                let mut acc = args[0];
                for &arg in &args[1..] {
                    acc = bdd.apply_and(acc, arg);
                }
                if gate.op == GateOp::Nand {
                    bdd.apply_not(acc)
                } else {
                    acc
                }
            }
            GateOp::Or | GateOp::Nor => {
                let mut acc = args[0];
                for &arg in &args[1..] {
                    acc = bdd.apply_or(acc, arg);
                }
                if gate.op == GateOp::Nor {
                    bdd.apply_not(acc)
                } else {
                    acc
                }
            }
        };

        signals.insert(&gate.output, result);
    }

    trace
        .outputs
        .iter()
        .map(|output| {
            let edge = signals
                .get(output.as_str())
                .copied()
                .ok_or_else(|| TraceError::UnknownSignal {
                    line: 0,
                    name: output.clone(),
                })?;
            Ok((output.clone(), edge))
        })
        .collect()
}
