//! Derived-field evaluation.
//!
//! [`recompute_derived`] walks the derivation graph (a derived field points at
//! each of its parents that is itself derived) in dependency order, so a single
//! pass reaches the fixed point. Strongly connected components are found with
//! Tarjan's algorithm; a component with more than one member, or a field that
//! names itself as a parent, is a cycle and is never evaluated.
//!
//! Failures stay local to the field that produced them: the field keeps its
//! previous value, an error is recorded for it, and fields downstream of it are
//! frozen with [`DerivationError::UpstreamFailed`]. Everything else is computed
//! normally.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::formula::{Formula, FormulaError};
use crate::ids::FieldId;
use crate::schema::FormSchema;
use crate::value::{FieldValue, ValueMap};

/// Why a derived field could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivationError {
    #[error("circular derivation between {}", join_ids(.members))]
    Cycle { members: Vec<FieldId> },

    #[error("parent field '{0}' no longer exists")]
    MissingParent(FieldId),

    #[error("parent field '{0}' could not be computed")]
    UpstreamFailed(FieldId),

    #[error("parent field '{field_id}' has non-numeric value '{value}'")]
    NonNumericParent { field_id: FieldId, value: String },

    #[error(transparent)]
    Formula(#[from] FormulaError),
}

fn join_ids(ids: &[FieldId]) -> String {
    ids.iter()
        .map(FieldId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a derivation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Derivation {
    /// Input values with every computable derived field overwritten
    pub values: ValueMap,
    /// One entry per derived field that could not be computed
    pub errors: BTreeMap<FieldId, DerivationError>,
}

impl Derivation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Numeric view of a parent value. Missing and empty values count as zero.
pub fn numeric_value(field_id: &FieldId, value: Option<&FieldValue>) -> Result<f64, DerivationError> {
    match value {
        None => Ok(0.0),
        Some(FieldValue::Number(number)) => Ok(*number),
        Some(FieldValue::Boolean(flag)) => Ok(if *flag { 1.0 } else { 0.0 }),
        Some(FieldValue::Text(text)) if text.trim().is_empty() => Ok(0.0),
        Some(FieldValue::Text(text)) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| DerivationError::NonNumericParent {
                    field_id: field_id.clone(),
                    value: text.clone(),
                })
        }
    }
}

/// Recompute every derived field of `schema` from `values`.
pub fn recompute_derived(schema: &FormSchema, values: &ValueMap) -> Derivation {
    let derived: Vec<_> = schema.derived_fields().collect();
    let mut out = values.clone();
    let mut errors = BTreeMap::new();

    if derived.is_empty() {
        return Derivation {
            values: out,
            errors,
        };
    }

    let mut node_of: HashMap<&FieldId, usize> = HashMap::new();
    for (node, field) in derived.iter().enumerate() {
        node_of.entry(&field.id).or_insert(node);
    }

    let edges: Vec<Vec<usize>> = derived
        .iter()
        .map(|field| {
            field
                .derived
                .iter()
                .flat_map(|rule| rule.parent_fields.iter())
                .filter_map(|parent| node_of.get(parent).copied())
                .collect()
        })
        .collect();

    for component in strongly_connected(&edges) {
        let cyclic = component.len() > 1 || edges[component[0]].contains(&component[0]);
        if cyclic {
            let mut members: Vec<usize> = component.clone();
            members.sort_unstable();
            let members: Vec<FieldId> = members.iter().map(|n| derived[*n].id.clone()).collect();
            for node in component {
                errors.insert(
                    derived[node].id.clone(),
                    DerivationError::Cycle {
                        members: members.clone(),
                    },
                );
            }
            continue;
        }

        let field = derived[component[0]];
        let Some(derived_field) = &field.derived else {
            continue;
        };

        let inputs = &derived_field.parent_fields;
        match evaluate_one(schema, inputs, &derived_field.formula, &out, &errors) {
            Ok(result) => {
                out.insert(field.id.clone(), FieldValue::Number(result));
            }
            Err(err) => {
                errors.insert(field.id.clone(), err);
            }
        }
    }

    Derivation {
        values: out,
        errors,
    }
}

fn evaluate_one(
    schema: &FormSchema,
    parents: &[FieldId],
    formula: &str,
    values: &ValueMap,
    failed: &BTreeMap<FieldId, DerivationError>,
) -> Result<f64, DerivationError> {
    if let Some(missing) = parents.iter().find(|parent| schema.field(parent).is_none()) {
        return Err(DerivationError::MissingParent(missing.clone()));
    }
    if let Some(upstream) = parents.iter().find(|parent| failed.contains_key(*parent)) {
        return Err(DerivationError::UpstreamFailed(upstream.clone()));
    }

    let inputs = parents
        .iter()
        .map(|parent| numeric_value(parent, values.get(parent)))
        .collect::<Result<Vec<f64>, _>>()?;

    let formula = Formula::parse(formula)?;
    Ok(formula.evaluate(parents, &inputs)?)
}

/// Tarjan's algorithm. Components come out dependencies-first: if `a` has an
/// edge to `b`, `b`'s component is emitted no later than `a`'s.
fn strongly_connected(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct Tarjan<'a> {
        edges: &'a [Vec<usize>],
        index: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next_index: usize,
        components: Vec<Vec<usize>>,
    }

    impl Tarjan<'_> {
        fn visit(&mut self, v: usize) {
            self.index[v] = Some(self.next_index);
            self.lowlink[v] = self.next_index;
            self.next_index += 1;
            self.stack.push(v);
            self.on_stack[v] = true;

            let edges = self.edges;
            for &w in &edges[v] {
                match self.index[w] {
                    None => {
                        self.visit(w);
                        self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                    }
                    Some(w_index) if self.on_stack[w] => {
                        self.lowlink[v] = self.lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
            }

            if Some(self.lowlink[v]) == self.index[v] {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                self.components.push(component);
            }
        }
    }

    let n = edges.len();
    let mut tarjan = Tarjan {
        edges,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next_index: 0,
        components: Vec::new(),
    };
    for v in 0..n {
        if tarjan.index[v].is_none() {
            tarjan.visit(v);
        }
    }
    tarjan.components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DerivedField, FieldType, FormField};
    use chrono::Utc;

    fn input(id: &str) -> FormField {
        FormField::with_id(FieldId::new(id), FieldType::Number)
    }

    fn derived(id: &str, parents: &[&str], formula: &str) -> FormField {
        input(id).with_derived(DerivedField::new(parents.iter().copied(), formula))
    }

    fn schema(fields: Vec<FormField>) -> FormSchema {
        FormSchema::new("Test", Utc::now(), fields).unwrap()
    }

    fn values(pairs: &[(&str, FieldValue)]) -> ValueMap {
        pairs
            .iter()
            .map(|(id, value)| (FieldId::new(*id), value.clone()))
            .collect()
    }

    fn number(map: &ValueMap, id: &str) -> Option<f64> {
        map.get(id).and_then(FieldValue::as_f64)
    }

    #[test]
    fn test_simple_sum() {
        let schema = schema(vec![input("a"), input("b"), derived("sum", &["a", "b"], "a + b")]);
        let result = recompute_derived(
            &schema,
            &values(&[("a", FieldValue::Number(2.0)), ("b", FieldValue::Number(3.0))]),
        );
        assert!(result.is_clean());
        assert_eq!(number(&result.values, "sum"), Some(5.0));
    }

    #[test]
    fn test_missing_and_text_parents() {
        let schema = schema(vec![
            input("a"),
            input("b"),
            input("c"),
            derived("total", &["a", "b", "c"], "a + b + c"),
        ]);
        let result = recompute_derived(
            &schema,
            &values(&[("a", FieldValue::text(" 4 ")), ("c", FieldValue::text(""))]),
        );
        assert_eq!(number(&result.values, "total"), Some(4.0));
    }

    #[test]
    fn test_chained_derivations_declared_out_of_order() {
        let schema = schema(vec![
            derived("grand", &["subtotal", "tax"], "subtotal + tax"),
            derived("tax", &["subtotal"], "subtotal * 0.5"),
            derived("subtotal", &["price", "qty"], "price * qty"),
            input("price"),
            input("qty"),
        ]);
        let result = recompute_derived(
            &schema,
            &values(&[("price", FieldValue::Number(4.0)), ("qty", FieldValue::Number(5.0))]),
        );
        assert!(result.is_clean());
        assert_eq!(number(&result.values, "subtotal"), Some(20.0));
        assert_eq!(number(&result.values, "tax"), Some(10.0));
        assert_eq!(number(&result.values, "grand"), Some(30.0));
    }

    #[test]
    fn test_two_field_cycle_keeps_prior_values() {
        let schema = schema(vec![derived("x", &["y"], "y + 1"), derived("y", &["x"], "x + 1")]);
        let before = values(&[("x", FieldValue::Number(7.0)), ("y", FieldValue::Number(9.0))]);
        let result = recompute_derived(&schema, &before);

        assert_eq!(result.values, before);
        assert_eq!(result.errors.len(), 2);
        let expected = DerivationError::Cycle {
            members: vec![FieldId::new("x"), FieldId::new("y")],
        };
        assert_eq!(result.errors.get("x"), Some(&expected));
        assert_eq!(result.errors.get("y"), Some(&expected));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let schema = schema(vec![derived("x", &["x"], "x * 2")]);
        let result = recompute_derived(&schema, &ValueMap::new());
        assert!(matches!(
            result.errors.get("x"),
            Some(DerivationError::Cycle { .. })
        ));
        assert!(result.values.get("x").is_none());
    }

    #[test]
    fn test_cycle_through_cross_edge_marks_whole_component() {
        // a -> b -> a, a -> c -> b
        let schema = schema(vec![
            derived("a", &["b", "c"], "b + c"),
            derived("b", &["a"], "a"),
            derived("c", &["b"], "b"),
        ]);
        let result = recompute_derived(&schema, &ValueMap::new());
        for id in ["a", "b", "c"] {
            assert!(matches!(
                result.errors.get(id),
                Some(DerivationError::Cycle { members }) if members.len() == 3
            ));
        }
    }

    #[test]
    fn test_downstream_of_cycle_is_frozen_and_others_continue() {
        let schema = schema(vec![
            input("n"),
            derived("x", &["y"], "y"),
            derived("y", &["x"], "x"),
            derived("after", &["x"], "x * 10"),
            derived("ok", &["n"], "n * 2"),
        ]);
        let result = recompute_derived(
            &schema,
            &values(&[("n", FieldValue::Number(3.0)), ("after", FieldValue::Number(1.0))]),
        );
        assert_eq!(
            result.errors.get("after"),
            Some(&DerivationError::UpstreamFailed(FieldId::new("x")))
        );
        assert_eq!(number(&result.values, "after"), Some(1.0));
        assert_eq!(number(&result.values, "ok"), Some(6.0));
    }

    #[test]
    fn test_formula_errors_are_per_field() {
        let schema = schema(vec![
            input("a"),
            input("word"),
            derived("broken", &["a"], "a +"),
            derived("unknown", &["a"], "a + b"),
            derived("divide", &["a"], "1 / a"),
            derived("wordy", &["word"], "word * 2"),
            derived("fine", &["a"], "a - 1"),
        ]);
        let result = recompute_derived(
            &schema,
            &values(&[("a", FieldValue::Number(0.0)), ("word", FieldValue::text("abc"))]),
        );

        assert_eq!(
            result.errors.get("broken"),
            Some(&DerivationError::Formula(FormulaError::UnexpectedEnd))
        );
        assert_eq!(
            result.errors.get("unknown"),
            Some(&DerivationError::Formula(FormulaError::UnknownBinding(
                "b".to_string()
            )))
        );
        assert_eq!(
            result.errors.get("divide"),
            Some(&DerivationError::Formula(FormulaError::DivisionByZero))
        );
        assert!(matches!(
            result.errors.get("wordy"),
            Some(DerivationError::NonNumericParent { .. })
        ));
        assert_eq!(number(&result.values, "fine"), Some(-1.0));
    }

    #[test]
    fn test_dangling_parent_is_reported_not_zeroed() {
        let schema = schema(vec![input("a"), derived("d", &["a", "deleted"], "a + deleted")]);
        let result = recompute_derived(
            &schema,
            &values(&[("a", FieldValue::Number(1.0)), ("d", FieldValue::Number(42.0))]),
        );
        assert_eq!(
            result.errors.get("d"),
            Some(&DerivationError::MissingParent(FieldId::new("deleted")))
        );
        assert_eq!(number(&result.values, "d"), Some(42.0));
    }

    #[test]
    fn test_derived_slot_is_overwritten() {
        let schema = schema(vec![input("a"), derived("d", &["a"], "a * 3")]);
        let result = recompute_derived(
            &schema,
            &values(&[("a", FieldValue::Number(2.0)), ("d", FieldValue::text("typed"))]),
        );
        assert_eq!(number(&result.values, "d"), Some(6.0));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let schema = schema(vec![
            input("a"),
            derived("b", &["a"], "a + 1"),
            derived("c", &["b"], "b * 2"),
        ]);
        let first = recompute_derived(&schema, &values(&[("a", FieldValue::Number(1.0))]));
        let second = recompute_derived(&schema, &first.values);
        assert_eq!(first, second);
        assert_eq!(number(&second.values, "c"), Some(4.0));
    }

    #[test]
    fn test_cycle_error_message_lists_members() {
        let err = DerivationError::Cycle {
            members: vec![FieldId::new("x"), FieldId::new("y")],
        };
        assert_eq!(err.to_string(), "circular derivation between x, y");
    }
}
