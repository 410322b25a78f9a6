//! Statement planning.
//!
//! Turns bound statements into plan trees. Binding itself (SQL text to
//! statements) is outside this engine; statements are constructed
//! programmatically. A select plans as
//! `Limit? -> Sort? -> Projection -> Filter? -> SeqScan`, which is exactly
//! the shape the optimizer rules consume.

use std::sync::Arc;

use crate::catalog::{Catalog, Column, ColumnType, Schema};
use crate::error::{Result, SkiffError};
use crate::expression::Expression;
use crate::plan::{OrderByKey, PlanNode, PlanRef};
use crate::types::Value;

/// A bound SELECT over a single table.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub table: String,
    /// Output columns: name plus expression over the scanned table.
    pub select_list: Vec<(String, Expression)>,
    /// Optional predicate over the scanned table.
    pub where_clause: Option<Expression>,
    /// Order keys over the projection output.
    pub order_by: Vec<OrderByKey>,
    pub limit: Option<usize>,
}

/// A bound INSERT of literal rows.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    pub table: String,
    pub rows: Vec<Vec<Value>>,
}

pub struct Planner<'a> {
    catalog: &'a Catalog,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn plan_select(&self, stmt: &SelectStatement) -> Result<PlanRef> {
        let table = self
            .catalog
            .get_table_by_name(&stmt.table)
            .ok_or_else(|| SkiffError::TableNotFound {
                name: stmt.table.clone(),
            })?;

        let mut plan: PlanRef = Arc::new(PlanNode::SeqScan {
            table_oid: table.oid,
            table_name: table.name.clone(),
            schema: table.schema.clone(),
        });

        if let Some(predicate) = &stmt.where_clause {
            plan = Arc::new(PlanNode::Filter {
                predicate: predicate.clone(),
                schema: plan.schema().clone(),
                child: plan,
            });
        }

        let mut columns = Vec::with_capacity(stmt.select_list.len());
        let mut exprs = Vec::with_capacity(stmt.select_list.len());
        for (name, expr) in &stmt.select_list {
            columns.push(Column::new(name.clone(), infer_type(expr, plan.schema())?));
            exprs.push(expr.clone());
        }
        plan = Arc::new(PlanNode::Projection {
            exprs,
            schema: Schema::new(columns),
            child: plan,
        });

        if !stmt.order_by.is_empty() {
            plan = Arc::new(PlanNode::Sort {
                order_by: stmt.order_by.clone(),
                schema: plan.schema().clone(),
                child: plan,
            });
        }

        if let Some(limit) = stmt.limit {
            plan = Arc::new(PlanNode::Limit {
                limit,
                schema: plan.schema().clone(),
                child: plan,
            });
        }

        Ok(plan)
    }

    pub fn plan_insert(&self, stmt: &InsertStatement) -> Result<PlanRef> {
        let table = self
            .catalog
            .get_table_by_name(&stmt.table)
            .ok_or_else(|| SkiffError::TableNotFound {
                name: stmt.table.clone(),
            })?;

        for row in &stmt.rows {
            if row.len() != table.schema.len() {
                return Err(SkiffError::Execution(format!(
                    "insert row has {} values, table {} has {} columns",
                    row.len(),
                    table.name,
                    table.schema.len()
                )));
            }
        }

        let rows = stmt
            .rows
            .iter()
            .map(|row| row.iter().cloned().map(Expression::Literal).collect())
            .collect();
        let values: PlanRef = Arc::new(PlanNode::Values {
            rows,
            schema: table.schema.clone(),
        });

        Ok(Arc::new(PlanNode::Insert {
            table_oid: table.oid,
            table_name: table.name.clone(),
            schema: Schema::new(vec![Column::new("inserted", ColumnType::Integer)]),
            child: values,
        }))
    }
}

/// Static result type of an expression against an input schema.
fn infer_type(expr: &Expression, input: &Schema) -> Result<ColumnType> {
    match expr {
        Expression::ColumnRef { column } => input
            .column(*column)
            .map(|c| c.column_type)
            .ok_or_else(|| {
                SkiffError::Execution(format!("column {column} out of range in select list"))
            }),
        Expression::Literal(Value::Boolean(_)) => Ok(ColumnType::Boolean),
        Expression::Literal(Value::Integer(_)) => Ok(ColumnType::Integer),
        Expression::Literal(Value::Double(_)) => Ok(ColumnType::Double),
        Expression::Literal(Value::Vector(_)) => Ok(ColumnType::Vector),
        Expression::Array(_) => Ok(ColumnType::Vector),
        Expression::Distance { .. } => Ok(ColumnType::Double),
        Expression::Comparison { .. } => Ok(ColumnType::Boolean),
    }
}
