//! The default in-process lowering: a flat program of single-assignment
//! steps over symbol slots, interpreted per document. Each step computes one
//! boolean sub-result exactly once; later steps reference earlier results by
//! symbol, so shared branches of the disjunction are never re-derived.

use std::fmt;

use crate::ast::{CmpMode, MatchExpr, Sym, SymbolAllocator};
use crate::backend::{Backend, Predicate};
use crate::error::CompileError;
use crate::path::Path;
use crate::value::Value;

/// Default backend. Lowers the match expression into a [`Program`] and wraps
/// it in a predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramBackend;

impl Backend for ProgramBackend {
    fn lower(
        &self,
        expr: &MatchExpr,
        symbols: &mut SymbolAllocator,
        debug: bool,
    ) -> Result<Predicate, CompileError> {
        let program = Program::build(expr, symbols)?;
        if debug {
            tracing::debug!("lowered match program:\n{program}");
        }
        Ok(Predicate::from_fn(move |doc| program.matches(doc)))
    }
}

struct Step {
    dst: Sym,
    op: Op,
}

enum Op {
    Const(bool),
    Compare { path: Path, operand: Value, mode: CmpMode },
    /// Guarded fan-out: the value at `path` is an array and some element,
    /// taken as the new root, satisfies `body`. Elements that are themselves
    /// arrays are searched recursively, so nesting depth in the data does
    /// not have to be anticipated at compile time.
    AnyElement { path: Path, body: Block },
    AnyOf(Vec<Sym>),
    AllOf(Vec<Sym>),
    Not(Sym),
}

/// A straight-line sequence of steps yielding one result symbol. Fan-out
/// bodies are nested blocks evaluated with each array element as root.
struct Block {
    steps: Vec<Step>,
    result: Sym,
}

impl Block {
    fn build(expr: &MatchExpr, symbols: &mut SymbolAllocator) -> Result<Block, CompileError> {
        let mut steps = Vec::new();
        let result = lower_expr(expr, &mut steps, symbols)?;
        Ok(Block { steps, result })
    }

    fn eval(&self, doc: &Value, slots: &mut [bool]) -> bool {
        for step in &self.steps {
            slots[step.dst.index()] = match &step.op {
                Op::Const(value) => *value,
                Op::Compare { path, operand, mode } => compare_at(doc, path, operand, *mode),
                Op::AnyElement { path, body } => match doc.resolve(path.segments()) {
                    Some(Value::Array(items)) => any_element(items, body, slots),
                    _ => false,
                },
                Op::AnyOf(syms) => syms.iter().any(|sym| slots[sym.index()]),
                Op::AllOf(syms) => syms.iter().all(|sym| slots[sym.index()]),
                Op::Not(sym) => !slots[sym.index()],
            };
        }
        slots[self.result.index()]
    }
}

/// The leaf comparison rule: a null operand tests for a present, truthy
/// value; anything else is canonical deep equality. A broken traversal is
/// "absent" and satisfies neither.
fn compare_at(doc: &Value, path: &Path, operand: &Value, mode: CmpMode) -> bool {
    match (doc.resolve(path.segments()), mode) {
        (Some(found), CmpMode::Complement) => found.is_truthy(),
        (Some(found), CmpMode::Direct) => found == operand,
        (None, _) => false,
    }
}

fn any_element(items: &[Value], body: &Block, slots: &mut [bool]) -> bool {
    items.iter().any(|item| {
        if body.eval(item, slots) {
            return true;
        }
        match item {
            Value::Array(nested) => any_element(nested, body, slots),
            _ => false,
        }
    })
}

fn lower_expr(
    expr: &MatchExpr,
    steps: &mut Vec<Step>,
    symbols: &mut SymbolAllocator,
) -> Result<Sym, CompileError> {
    let op = match expr {
        MatchExpr::Literal(value) => Op::Const(*value),
        MatchExpr::Compare { path, operand, mode } => {
            Op::Compare { path: path.clone(), operand: operand.clone(), mode: *mode }
        }
        MatchExpr::AnyElement { path, inner } => {
            Op::AnyElement { path: path.clone(), body: Block::build(inner, symbols)? }
        }
        MatchExpr::Or(branches) => {
            if branches.is_empty() {
                return Err(CompileError::MalformedExpr("disjunction with no branches".to_string()));
            }
            let syms = branches
                .iter()
                .map(|branch| lower_expr(branch, steps, symbols))
                .collect::<Result<Vec<Sym>, CompileError>>()?;
            Op::AnyOf(syms)
        }
        MatchExpr::And(clauses) => {
            if clauses.is_empty() {
                return Err(CompileError::MalformedExpr("conjunction with no clauses".to_string()));
            }
            let syms = clauses
                .iter()
                .map(|clause| lower_expr(clause, steps, symbols))
                .collect::<Result<Vec<Sym>, CompileError>>()?;
            Op::AllOf(syms)
        }
        MatchExpr::Not(inner) => Op::Not(lower_expr(inner, steps, symbols)?),
    };

    let dst = symbols.alloc();
    steps.push(Step { dst, op });
    Ok(dst)
}

/// A lowered filter: the artifact the default backend interprets. One slot
/// per issued symbol; evaluation allocates a local slot buffer per call, so
/// the program itself is immutable and freely shared across threads.
pub struct Program {
    root: Block,
    slots: usize,
}

impl Program {
    pub fn build(expr: &MatchExpr, symbols: &mut SymbolAllocator) -> Result<Program, CompileError> {
        let root = Block::build(expr, symbols)?;
        Ok(Program { root, slots: symbols.issued() })
    }

    pub fn matches(&self, doc: &Value) -> bool {
        let mut slots = vec![false; self.slots];
        self.root.eval(doc, &mut slots)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_block(&self.root, f, 0, "return")
    }
}

fn fmt_block(block: &Block, f: &mut fmt::Formatter<'_>, indent: usize, terminator: &str) -> fmt::Result {
    for step in &block.steps {
        write!(f, "{:indent$}{} = ", "", step.dst, indent = indent)?;
        match &step.op {
            Op::Const(value) => writeln!(f, "{}", value)?,
            Op::Compare { path, operand, mode } => match mode {
                CmpMode::Direct => writeln!(f, "{} == {}", path, operand)?,
                CmpMode::Complement => writeln!(f, "truthy({})", path)?,
            },
            Op::AnyElement { path, body } => {
                writeln!(f, "any element of {}:", path)?;
                fmt_block(body, f, indent + 4, "yield")?;
            }
            Op::AnyOf(syms) => writeln!(f, "any({})", join_syms(syms))?,
            Op::AllOf(syms) => writeln!(f, "all({})", join_syms(syms))?,
            Op::Not(sym) => writeln!(f, "!{}", sym)?,
        }
    }
    writeln!(f, "{:indent$}{} {}", "", terminator, block.result, indent = indent)
}

fn join_syms(syms: &[Sym]) -> String {
    syms.iter().map(|sym| sym.to_string()).collect::<Vec<String>>().join(", ")
}
