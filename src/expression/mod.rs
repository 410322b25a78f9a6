//! Expression trees evaluated against tuples.
//!
//! The planner builds these; executors evaluate them row by row. The
//! optimizer pattern-matches on them, so the shapes it cares about
//! (column references, constant arrays, distance calls) expose structured
//! accessors instead of making callers re-match.

use crate::catalog::Schema;
use crate::error::{Result, SkiffError};
use crate::index::distance::compute_distance;
use crate::storage::Tuple;
use crate::types::{DistanceMetric, Value};

/// Comparison operators over numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Reference to a column of the input tuple.
    ColumnRef { column: usize },
    /// A constant value.
    Literal(Value),
    /// An array constructor; evaluates children to a vector value.
    Array(Vec<Expression>),
    /// Distance between two vector expressions under a metric.
    Distance {
        metric: DistanceMetric,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Numeric comparison producing a boolean.
    Comparison {
        op: CompareOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn column(column: usize) -> Self {
        Expression::ColumnRef { column }
    }

    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    /// An array of double literals.
    pub fn array_of(values: &[f64]) -> Self {
        Expression::Array(
            values
                .iter()
                .map(|&v| Expression::Literal(Value::Double(v)))
                .collect(),
        )
    }

    pub fn distance(metric: DistanceMetric, left: Expression, right: Expression) -> Self {
        Expression::Distance {
            metric,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn comparison(op: CompareOp, left: Expression, right: Expression) -> Self {
        Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The referenced column index, when this is a plain column reference.
    pub fn as_column_ref(&self) -> Option<usize> {
        match self {
            Expression::ColumnRef { column } => Some(*column),
            _ => None,
        }
    }

    /// Reify a constant array of numeric literals into a vector.
    ///
    /// Returns `None` when any element is not a numeric literal; the
    /// optimizer only rewrites when the base vector is fully constant.
    pub fn as_constant_vector(&self) -> Option<Vec<f64>> {
        match self {
            Expression::Array(elems) => elems
                .iter()
                .map(|e| match e {
                    Expression::Literal(v) => v.as_double(),
                    _ => None,
                })
                .collect(),
            Expression::Literal(Value::Vector(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// Evaluate against a tuple with the given schema.
    pub fn evaluate(&self, tuple: &Tuple, schema: &Schema) -> Result<Value> {
        match self {
            Expression::ColumnRef { column } => {
                tuple.value_at(*column).cloned().ok_or_else(|| {
                    SkiffError::Execution(format!(
                        "column {column} out of range for schema of {} columns",
                        schema.len()
                    ))
                })
            }
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Array(elems) => {
                let mut out = Vec::with_capacity(elems.len());
                for elem in elems {
                    let v = elem.evaluate(tuple, schema)?;
                    out.push(v.as_double().ok_or_else(|| {
                        SkiffError::Execution("array element is not numeric".into())
                    })?);
                }
                Ok(Value::Vector(out))
            }
            Expression::Distance { metric, left, right } => {
                let lhs = left.evaluate(tuple, schema)?;
                let rhs = right.evaluate(tuple, schema)?;
                let (a, b) = match (lhs.as_vector(), rhs.as_vector()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => {
                        return Err(SkiffError::Execution(
                            "distance operands must be vectors".into(),
                        ))
                    }
                };
                if a.len() != b.len() {
                    return Err(SkiffError::DimensionMismatch {
                        expected: a.len(),
                        actual: b.len(),
                    });
                }
                Ok(Value::Double(compute_distance(a, b, *metric)))
            }
            Expression::Comparison { op, left, right } => {
                let lhs = left.evaluate(tuple, schema)?;
                let rhs = right.evaluate(tuple, schema)?;
                let (a, b) = match (lhs.as_double(), rhs.as_double()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => {
                        return Err(SkiffError::Execution(
                            "comparison operands must be numeric".into(),
                        ))
                    }
                };
                let result = match op {
                    CompareOp::Eq => a == b,
                    CompareOp::NotEq => a != b,
                    CompareOp::Lt => a < b,
                    CompareOp::LtEq => a <= b,
                    CompareOp::Gt => a > b,
                    CompareOp::GtEq => a >= b,
                };
                Ok(Value::Boolean(result))
            }
        }
    }
}
