//! Compile MongoDB-style filter documents into fast, reusable match
//! predicates.
//!
//! A filter is typically evaluated against many documents, so instead of
//! re-interpreting the filter tree per document, [`compile`] lowers it once
//! into a [`Predicate`] that can be invoked any number of times, from any
//! number of threads.
//!
//! # Terminology
//!
//! - **Query**: the document holding the match conditions, e.g.
//!   `{ "fruits.type": { "$eq": "berry" }, "count": 3 }`
//! - **Path**: dot-separated fields, e.g. `"fruits.type"`; a digit segment is
//!   an array index
//! - **Expression**: an object of operator/operand pairs, e.g.
//!   `{ "$eq": "berry" }`
//! - **Operand**: the value matched against, in the context of one operator
//! - **Doc**: the document the compiled predicate is applied to
//!
//! # Matching semantics
//!
//! A non-object condition is an implicit `$eq`. An object condition whose
//! keys are all recognized operators is an expression (only `$eq` is
//! implemented; other recognized operators are rejected at compile time).
//! Any other object condition is matched structurally by deep equality.
//!
//! An array encountered anywhere along a path fans out: the match succeeds
//! if any element, taken as the new root for the remaining path, matches. A
//! null operand matches exactly when no interpretation of the path found a
//! present, truthy value — missing fields and explicit nulls alike.
//!
//! # Example
//!
//! ```
//! use docfilter::{compile, Query, Value};
//! use serde_json::json;
//!
//! let query: Query = serde_json::from_value(json!({ "foo.bar": "baz" }))?;
//! let predicate = compile(&query)?;
//!
//! assert!(predicate.matches(&Value::from(json!({ "foo": {"bar": "baz"} }))));
//! assert!(predicate.matches(&Value::from(json!({ "foo": [{"bar": "baz"}] }))));
//! assert!(!predicate.matches(&Value::from(json!({}))));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod backend;
pub mod compiler;
pub mod conversion;
pub mod error;
pub mod path;
pub mod query;
pub mod value;

pub use ast::{CmpMode, CmpOp, MatchExpr, Sym, SymbolAllocator};
pub use backend::{Backend, Predicate, Program, ProgramBackend};
pub use compiler::{assemble, classify, compile, compile_with, expand, CompileOptions, Condition};
pub use error::CompileError;
pub use path::{Path, Segment};
pub use query::Query;
pub use value::Value;
