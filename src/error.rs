use thiserror::Error;

use crate::ast::CmpOp;

#[cfg(feature = "wasm")]
use wasm_bindgen;

/// Errors surfaced while compiling a filter. Compilation failures are
/// deterministic caller-configuration errors; nothing here is transient, and
/// predicate evaluation itself never fails.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A filter path string yielded zero segments.
    #[error("Empty path: a filter path must contain at least one segment")]
    EmptyPath,
    /// A recognized comparison operator that does not lower to a comparison.
    #[error("Unsupported operator {operator} on path {path:?}")]
    UnsupportedOperator { path: String, operator: CmpOp },
    /// The backend was handed a malformed match expression. Unreachable for
    /// trees produced by the compiler unless the backend itself is buggy.
    #[error("Malformed match expression: {0}")]
    MalformedExpr(String),
}

#[cfg(feature = "wasm")]
impl From<CompileError> for wasm_bindgen::JsValue {
    fn from(error: CompileError) -> Self { wasm_bindgen::JsValue::from_str(&error.to_string()) }
}
