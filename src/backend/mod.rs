//! Lowering backends: turn an assembled [`MatchExpr`] into an executable,
//! repeatedly-invocable [`Predicate`]. The core is indifferent to the
//! strategy (interpreter, closure tree, generated code) as long as lowering
//! is deterministic and total over well-formed trees.

mod program;

pub use program::{Program, ProgramBackend};

use std::fmt;
use std::sync::Arc;

use crate::ast::{MatchExpr, SymbolAllocator};
use crate::error::CompileError;
use crate::value::Value;

/// A lowering backend.
///
/// `lower` fails with [`CompileError::MalformedExpr`] only when handed a
/// malformed tree, which the compiler never produces. The allocator is owned
/// by the current compilation; handles drawn from it are stable references
/// for whatever artifact the backend builds.
pub trait Backend {
    fn lower(
        &self,
        expr: &MatchExpr,
        symbols: &mut SymbolAllocator,
        debug: bool,
    ) -> Result<Predicate, CompileError>;
}

/// The compiled, reusable form of a filter: a total, side-effect-free
/// function over one document. Cloning is cheap and clones may be invoked
/// concurrently from any number of threads.
#[derive(Clone)]
pub struct Predicate {
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Predicate {
    /// Wrap an arbitrary check function. Intended for backends.
    pub fn from_fn(check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Predicate {
        Predicate { check: Arc::new(check) }
    }

    /// Evaluate this predicate against a document. Never fails: traversal of
    /// a structurally surprising document degrades to "absent", not an error.
    pub fn matches(&self, doc: &Value) -> bool { (self.check)(doc) }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Predicate(..)") }
}
