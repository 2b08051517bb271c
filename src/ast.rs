use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::Path;
use crate::value::Value;

/// The recognized comparison operator vocabulary.
///
/// Recognition matters for classification even where lowering does not: an
/// object condition whose keys are all operator names is an expression, while
/// any other object condition is matched structurally. Only [`CmpOp::Eq`]
/// lowers to a comparison; the rest are rejected at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    In,
    Lt,
    Lte,
    Ne,
    Nin,
}

impl CmpOp {
    /// Look up an operator by its `$`-prefixed key, e.g. `"$eq"`.
    pub fn from_key(key: &str) -> Option<CmpOp> {
        Some(match key {
            "$eq" => CmpOp::Eq,
            "$gt" => CmpOp::Gt,
            "$gte" => CmpOp::Gte,
            "$in" => CmpOp::In,
            "$lt" => CmpOp::Lt,
            "$lte" => CmpOp::Lte,
            "$ne" => CmpOp::Ne,
            "$nin" => CmpOp::Nin,
            _ => return None,
        })
    }

    pub fn key(&self) -> &'static str {
        match self {
            CmpOp::Eq => "$eq",
            CmpOp::Gt => "$gt",
            CmpOp::Gte => "$gte",
            CmpOp::In => "$in",
            CmpOp::Lt => "$lt",
            CmpOp::Lte => "$lte",
            CmpOp::Ne => "$ne",
            CmpOp::Nin => "$nin",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.key()) }
}

/// How a comparison leaf consumes the value found at its path.
///
/// `Complement` is used exactly when the operand is null: the leaf then tests
/// for a present, truthy value, and the expander negates the surrounding
/// disjunction so that the path matches when nothing was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpMode {
    Direct,
    Complement,
}

impl CmpMode {
    pub fn for_operand(operand: &Value) -> CmpMode {
        if operand.is_null() { CmpMode::Complement } else { CmpMode::Direct }
    }
}

/// The intermediate match-expression tree built per filter, before lowering.
///
/// `AnyElement` is the array fan-out guard: it holds when the value at `path`
/// is an array and some element, taken as the new root, satisfies `inner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchExpr {
    Literal(bool),
    Compare { path: Path, operand: Value, mode: CmpMode },
    AnyElement { path: Path, inner: Box<MatchExpr> },
    Or(Vec<MatchExpr>),
    And(Vec<MatchExpr>),
    Not(Box<MatchExpr>),
}

/// Opaque handle for one intermediate sub-result of a lowered expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym(u32);

impl Sym {
    pub fn index(self) -> usize { self.0 as usize }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "s_{}", self.0) }
}

/// Issues unique sub-result handles, scoped to one compilation.
///
/// Each `compile` call owns a fresh allocator, so handles are never reused
/// across compilations and two calls within one compilation never collide.
#[derive(Debug, Default)]
pub struct SymbolAllocator {
    issued: u32,
}

impl SymbolAllocator {
    pub fn new() -> SymbolAllocator { SymbolAllocator::default() }

    pub fn alloc(&mut self) -> Sym {
        let sym = Sym(self.issued);
        self.issued += 1;
        sym
    }

    /// Total number of handles issued so far.
    pub fn issued(&self) -> usize { self.issued as usize }
}
