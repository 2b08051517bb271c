//! Compiles a filter [`Query`] into a reusable [`Predicate`].
//!
//! A query is evaluated against many documents, so the filter tree is
//! compiled once: each path's condition is classified, expanded into a match
//! expression that fans out over arrays at every split point along the path,
//! and the per-path expressions are conjoined and handed to a [`Backend`]
//! for lowering into the executable predicate.

use crate::ast::{CmpMode, CmpOp, MatchExpr, SymbolAllocator};
use crate::backend::{Backend, Predicate, ProgramBackend};
use crate::error::CompileError;
use crate::path::{Path, Segment};
use crate::query::Query;
use crate::value::Value;

/// Options for [`compile_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// When set, the backend emits a human-readable trace of the produced
    /// artifact via `tracing` at debug level. The exact text is not part of
    /// any contract.
    pub debug: bool,
}

/// How a single path's condition value is to be matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<'a> {
    /// Implicit equality against a non-object operand.
    Operand(&'a Value),
    /// An operator expression: every key of the object is a recognized
    /// comparison operator.
    Expression(Vec<(CmpOp, &'a Value)>),
    /// An object with at least one unrecognized key: the whole condition is
    /// compared by deep equality against the value at the path.
    Structural(&'a Value),
}

/// Classify a condition value per the operator vocabulary.
pub fn classify(condition: &Value) -> Condition<'_> {
    match condition {
        Value::Object(map) => {
            let mut operators = Vec::with_capacity(map.len());
            for (key, operand) in map {
                match CmpOp::from_key(key) {
                    Some(op) => operators.push((op, operand)),
                    None => return Condition::Structural(condition),
                }
            }
            Condition::Expression(operators)
        }
        other => Condition::Operand(other),
    }
}

/// Expand one `(path, operand)` pair into a match expression.
///
/// For every split point i = 1..=n the path is cut into head and tail, and a
/// fan-out branch is built: the value at the head is an array and some
/// element, taken as the new root, satisfies the tail — either by direct
/// comparison or by this same expansion applied to the tail. The direct
/// (no fan-out) comparison of the full path joins the branches in one
/// disjunction. A null operand flips the meaning: the path matches exactly
/// when no interpretation found a present, truthy value, so the disjunction
/// is negated, at this level and again inside every recursive expansion.
pub fn expand(path: &[Segment], operand: &Value) -> MatchExpr {
    let mode = CmpMode::for_operand(operand);
    let mut branches = Vec::with_capacity(path.len() + 1);

    for split in 1..=path.len() {
        let (head, tail) = path.split_at(split);
        let element = MatchExpr::Or(vec![
            MatchExpr::Compare { path: Path::from_segments(tail), operand: operand.clone(), mode },
            expand(tail, operand),
        ]);
        branches.push(MatchExpr::AnyElement {
            path: Path::from_segments(head),
            inner: Box::new(element),
        });
    }

    branches.push(MatchExpr::Compare { path: Path::from_segments(path), operand: operand.clone(), mode });

    let found = MatchExpr::Or(branches);
    if operand.is_null() { MatchExpr::Not(Box::new(found)) } else { found }
}

/// Conjoin per-path match expressions in the query's path order. An empty
/// query degenerates to `Literal(true)`: it matches every document.
pub fn assemble(clauses: Vec<MatchExpr>) -> MatchExpr {
    if clauses.is_empty() { MatchExpr::Literal(true) } else { MatchExpr::And(clauses) }
}

/// Compile a query with the default in-process backend.
pub fn compile(query: &Query) -> Result<Predicate, CompileError> {
    compile_with(query, CompileOptions::default(), &ProgramBackend)
}

/// Compile a query into a predicate using the given backend.
pub fn compile_with<B: Backend>(
    query: &Query,
    options: CompileOptions,
    backend: &B,
) -> Result<Predicate, CompileError> {
    let mut clauses = Vec::with_capacity(query.len());

    for (path, condition) in query.iter() {
        let parsed = Path::parse(path)?;
        match classify(condition) {
            Condition::Operand(operand) | Condition::Structural(operand) => {
                clauses.push(expand(parsed.segments(), operand));
            }
            Condition::Expression(operators) => {
                for (op, operand) in operators {
                    match op {
                        CmpOp::Eq => clauses.push(expand(parsed.segments(), operand)),
                        other => {
                            return Err(CompileError::UnsupportedOperator {
                                path: path.to_string(),
                                operator: other,
                            });
                        }
                    }
                }
            }
        }
    }

    let expr = assemble(clauses);
    tracing::trace!(clauses = query.len(), "assembled match expression");

    let mut symbols = SymbolAllocator::new();
    backend.lower(&expr, &mut symbols, options.debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    fn query(raw: serde_json::Value) -> Query { serde_json::from_value(raw).unwrap() }

    fn check(filter: serde_json::Value, doc: serde_json::Value) -> Result<bool> {
        let predicate = compile(&query(filter))?;
        Ok(predicate.matches(&Value::from(doc)))
    }

    #[test]
    fn empty_query_matches_everything() -> Result<()> {
        assert!(check(json!({}), json!({}))?);
        assert!(check(json!({}), json!({"anything": [1, 2, 3]}))?);
        Ok(())
    }

    #[test]
    fn implicit_equality() -> Result<()> {
        assert!(check(json!({"foo": "bar"}), json!({"foo": "bar"}))?);
        assert!(!check(json!({"foo": "bar"}), json!({}))?);
        assert!(!check(json!({"foo": "bar"}), json!({"foo": "qux"}))?);
        Ok(())
    }

    #[test]
    fn implicit_and_explicit_equality_agree() -> Result<()> {
        let docs = [json!({"p": 5}), json!({"p": 6}), json!({"p": null}), json!({})];
        for doc in docs {
            assert_eq!(
                check(json!({"p": 5}), doc.clone())?,
                check(json!({"p": {"$eq": 5}}), doc)?,
            );
        }
        Ok(())
    }

    #[test]
    fn null_matches_missing_and_explicit_null() -> Result<()> {
        let filter = json!({"foo.bar": null});
        assert!(check(filter.clone(), json!({"foo": {"bar": null}}))?);
        assert!(check(filter.clone(), json!({}))?);
        assert!(check(filter.clone(), json!({"foo": "x"}))?);
        assert!(!check(filter, json!({"foo": {"bar": "baz"}}))?);
        Ok(())
    }

    #[test]
    fn null_against_falsy_present_values() -> Result<()> {
        // Truthiness coercion: false, 0, and "" at the path all count as
        // "nothing found", so the null condition still matches.
        assert!(check(json!({"a": null}), json!({"a": false}))?);
        assert!(check(json!({"a": null}), json!({"a": 0}))?);
        assert!(check(json!({"a": null}), json!({"a": ""}))?);
        assert!(!check(json!({"a": null}), json!({"a": "x"}))?);
        Ok(())
    }

    #[test]
    fn null_does_not_match_an_empty_array() -> Result<()> {
        // An empty array is present and truthy, unlike a missing field.
        assert!(!check(json!({"a": null}), json!({"a": []}))?);
        assert!(check(json!({"a.b": null}), json!({"a": []}))?);
        Ok(())
    }

    #[test]
    fn array_fan_out_one_level() -> Result<()> {
        assert!(check(json!({"foo.bar": "baz"}), json!({"foo": [{"bar": "baz"}]}))?);
        assert!(!check(json!({"foo.bar": "baz"}), json!({"foo": [{"bar": "qux"}]}))?);
        Ok(())
    }

    #[test]
    fn array_fan_out_arbitrary_depth() -> Result<()> {
        assert!(check(json!({"a.b": "x"}), json!({"a": [[{"b": "x"}]]}))?);
        assert!(check(json!({"a.b": "x"}), json!({"a": [[[{"b": "x"}]]]}))?);
        assert!(!check(json!({"a.b": "x"}), json!({"a": [[{"b": "y"}]]}))?);
        Ok(())
    }

    #[test]
    fn fan_out_on_the_final_segment() -> Result<()> {
        // Empty tail: array elements are compared directly.
        assert!(check(json!({"a.b": "x"}), json!({"a": {"b": ["w", "x"]}}))?);
        assert!(!check(json!({"a.b": "x"}), json!({"a": {"b": ["w"]}}))?);
        Ok(())
    }

    #[test]
    fn literal_index_honored_alongside_fan_out() -> Result<()> {
        let filter = json!({"foo.1.bar": "baz"});
        assert!(check(filter.clone(), json!({"foo": [{}, {"bar": "baz"}]}))?);
        assert!(!check(filter, json!({"foo": [{"bar": "baz"}, {}]}))?);
        Ok(())
    }

    #[test]
    fn index_segment_reaches_numeric_object_keys() -> Result<()> {
        assert!(check(json!({"foo.1": "one"}), json!({"foo": {"1": "one"}}))?);
        Ok(())
    }

    #[test]
    fn structural_equality_is_exact_but_order_blind() -> Result<()> {
        let filter = json!({"p": {"x": 1, "y": 2}});
        assert!(check(filter.clone(), json!({"p": {"y": 2, "x": 1}}))?);
        assert!(!check(filter.clone(), json!({"p": {"x": 1, "y": 2, "extra": 3}}))?);
        assert!(!check(filter, json!({"p": {"x": 1}}))?);
        Ok(())
    }

    #[test]
    fn eq_with_object_operand_matches_structurally() -> Result<()> {
        let docs = [
            json!({"p": {"x": 1, "y": 2}}),
            json!({"p": {"x": 1}}),
            json!({}),
        ];
        for doc in docs {
            assert_eq!(
                check(json!({"p": {"x": 1, "y": 2}}), doc.clone())?,
                check(json!({"p": {"$eq": {"x": 1, "y": 2}}}), doc)?,
            );
        }
        Ok(())
    }

    #[test]
    fn array_operand_compares_deeply() -> Result<()> {
        assert!(check(json!({"tags": [1, 2]}), json!({"tags": [1, 2]}))?);
        assert!(!check(json!({"tags": [1, 2]}), json!({"tags": [2, 1]}))?);
        // Fan-out also finds the operand as a nested element.
        assert!(check(json!({"tags": [1, 2]}), json!({"tags": [[1, 2]]}))?);
        Ok(())
    }

    #[test]
    fn conjunction_requires_every_path() -> Result<()> {
        let filter = json!({"p": 1, "q": "two"});
        assert!(check(filter.clone(), json!({"p": 1, "q": "two"}))?);
        assert!(!check(filter.clone(), json!({"p": 1}))?);
        assert!(!check(filter, json!({"q": "two"}))?);
        Ok(())
    }

    #[test]
    fn compiling_twice_is_idempotent() -> Result<()> {
        let q = query(json!({"a.b": "x", "c": null}));
        let first = compile(&q)?;
        let second = compile(&q)?;
        for doc in [json!({"a": [{"b": "x"}]}), json!({"a": 1, "c": 2}), json!({})] {
            let doc = Value::from(doc);
            assert_eq!(first.matches(&doc), second.matches(&doc));
        }
        Ok(())
    }

    #[test]
    fn empty_object_condition_is_an_empty_expression() -> Result<()> {
        // All zero keys are recognized operators, so the path contributes
        // no clause at all.
        assert!(check(json!({"p": {}}), json!({}))?);
        assert!(check(json!({"p": {}}), json!({"p": 1}))?);
        Ok(())
    }

    #[test]
    fn unsupported_operator_is_rejected() {
        let result = compile(&query(json!({"p": {"$gt": 3}})));
        match result {
            Err(CompileError::UnsupportedOperator { path, operator }) => {
                assert_eq!(path, "p");
                assert_eq!(operator, CmpOp::Gt);
            }
            other => panic!("expected UnsupportedOperator, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unsupported_operator_alongside_eq_is_still_rejected() {
        let result = compile(&query(json!({"p": {"$eq": 1, "$ne": 2}})));
        assert!(matches!(
            result,
            Err(CompileError::UnsupportedOperator { operator: CmpOp::Ne, .. })
        ));
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(compile(&query(json!({"": 1}))), Err(CompileError::EmptyPath)));
    }

    #[test]
    fn classification() {
        let scalar = Value::from("x");
        assert_eq!(classify(&scalar), Condition::Operand(&scalar));

        let expression = Value::from(json!({"$eq": 1, "$gt": 0}));
        match classify(&expression) {
            Condition::Expression(ops) => {
                let names: Vec<CmpOp> = ops.iter().map(|(op, _)| *op).collect();
                assert_eq!(names, vec![CmpOp::Eq, CmpOp::Gt]);
            }
            other => panic!("expected expression, got {:?}", other),
        }

        let structural = Value::from(json!({"$eq": 1, "name": "x"}));
        assert_eq!(classify(&structural), Condition::Structural(&structural));
    }

    #[test]
    fn expansion_shape_for_a_two_segment_path() {
        let path = Path::parse("a.b").unwrap();
        let expr = expand(path.segments(), &Value::from("x"));
        // Two fan-out branches (splits after `a` and after `a.b`) plus the
        // direct comparison.
        match expr {
            MatchExpr::Or(branches) => {
                assert_eq!(branches.len(), 3);
                assert!(matches!(branches[0], MatchExpr::AnyElement { .. }));
                assert!(matches!(branches[1], MatchExpr::AnyElement { .. }));
                assert!(matches!(branches[2], MatchExpr::Compare { .. }));
            }
            other => panic!("expected disjunction, got {:?}", other),
        }
    }

    #[test]
    fn null_expansion_is_negated() {
        let path = Path::parse("a").unwrap();
        let expr = expand(path.segments(), &Value::Null);
        assert!(matches!(expr, MatchExpr::Not(_)));
    }

    #[test]
    fn assemble_empty_is_literal_true() {
        assert_eq!(assemble(Vec::new()), MatchExpr::Literal(true));
    }
}
