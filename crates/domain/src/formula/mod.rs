//! Arithmetic formulas for derived fields.
//!
//! A formula is a small arithmetic expression over the values of a derived
//! field's parents. It is parsed into an [`Expr`] tree of numeric literals,
//! parent bindings and arithmetic operators, and evaluated against numbers
//! only. There are no function calls, no assignments and no access to anything
//! outside the bindings handed to [`Formula::evaluate`].
//!
//! Parents are referenced in three ways:
//!
//! - bare identifiers: `price * quantity`
//! - braced ids for ids that are not identifiers: `{3f1c-42} + 1`
//! - positional references in parent order: `parentValues[0] + parentValues[1]`
//!
//! # Example
//!
//! ```
//! use formcraft_domain::{FieldId, Formula};
//!
//! let parents = [FieldId::new("a"), FieldId::new("b")];
//! let formula = Formula::parse("a + b * 2").unwrap();
//! assert_eq!(formula.evaluate(&parents, &[2.0, 3.0]).unwrap(), 8.0);
//! ```

mod lexer;
mod parser;

use std::fmt;

use thiserror::Error;

use crate::ids::FieldId;

/// Name of the positional binding, as in `parentValues[0]`.
pub const POSITIONAL_BINDING: &str = "parentValues";

/// Error when parsing or evaluating a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("Empty formula")]
    Empty,
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("Formula ends unexpectedly")]
    UnexpectedEnd,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unclosed '{{' at position {position}")]
    UnclosedReference { position: usize },
    #[error("Empty '{{}}' reference at position {position}")]
    EmptyReference { position: usize },
    #[error("Formula nests deeper than {0} levels")]
    TooDeep(usize),
    #[error("'{0}' is not a parent field of this formula")]
    UnknownBinding(String),
    #[error("parentValues[{index}] is out of range ({len} parent fields)")]
    PositionOutOfRange { index: usize, len: usize },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Plus,
}

/// Reference to a parent value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// By field id
    Name(String),
    /// By index into the parent list
    Position(usize),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Name(name) => f.write_str(name),
            Binding::Position(index) => write!(f, "{}[{}]", POSITIONAL_BINDING, index),
        }
    }
}

/// Parsed formula tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Binding(Binding),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

impl Expr {
    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a Binding>) {
        match self {
            Expr::Number(_) => {}
            Expr::Binding(binding) => out.push(binding),
            Expr::Unary { operand, .. } => operand.collect_bindings(out),
            Expr::Binary { left, right, .. } => {
                left.collect_bindings(out);
                right.collect_bindings(out);
            }
        }
    }
}

/// A parsed, reusable formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse a formula string.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::Parser::new(tokens).parse()?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Every binding the formula reads, in source order.
    pub fn bindings(&self) -> Vec<&Binding> {
        let mut out = Vec::new();
        self.expr.collect_bindings(&mut out);
        out
    }

    /// Check every binding resolves against `parents` without evaluating.
    pub fn check_bindings(&self, parents: &[FieldId]) -> Result<(), FormulaError> {
        self.bindings()
            .into_iter()
            .try_for_each(|binding| resolve(binding, parents).map(|_| ()))
    }

    /// Evaluate with `values[i]` bound to `parents[i]`.
    ///
    /// `values` must be at least as long as `parents`.
    pub fn evaluate(&self, parents: &[FieldId], values: &[f64]) -> Result<f64, FormulaError> {
        let result = eval(&self.expr, parents, values)?;
        if result.is_finite() {
            Ok(result)
        } else {
            Err(FormulaError::NonFinite)
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn resolve(binding: &Binding, parents: &[FieldId]) -> Result<usize, FormulaError> {
    match binding {
        Binding::Name(name) => parents
            .iter()
            .position(|parent| parent.as_str() == name)
            .ok_or_else(|| FormulaError::UnknownBinding(name.clone())),
        Binding::Position(index) if *index < parents.len() => Ok(*index),
        Binding::Position(index) => Err(FormulaError::PositionOutOfRange {
            index: *index,
            len: parents.len(),
        }),
    }
}

fn eval(expr: &Expr, parents: &[FieldId], values: &[f64]) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Binding(binding) => {
            let index = resolve(binding, parents)?;
            values
                .get(index)
                .copied()
                .ok_or(FormulaError::PositionOutOfRange {
                    index,
                    len: values.len(),
                })
        }
        Expr::Unary { op, operand } => {
            let value = eval(operand, parents, values)?;
            Ok(match op {
                UnaryOp::Negate => -value,
                UnaryOp::Plus => value,
            })
        }
        Expr::Binary { left, op, right } => {
            let left = eval(left, parents, values)?;
            let right = eval(right, parents, values)?;
            match op {
                BinaryOp::Add => Ok(left + right),
                BinaryOp::Subtract => Ok(left - right),
                BinaryOp::Multiply => Ok(left * right),
                BinaryOp::Divide | BinaryOp::Remainder if right == 0.0 => {
                    Err(FormulaError::DivisionByZero)
                }
                BinaryOp::Divide => Ok(left / right),
                BinaryOp::Remainder => Ok(left % right),
            }
        }
    }
}
