//! Immutable query plan trees.
//!
//! Plan nodes are shared by `Arc` and never mutated; the optimizer
//! rewrites by building new nodes around existing children.

use std::sync::Arc;

use crate::catalog::{IndexOid, Schema, TableOid};
use crate::expression::Expression;

pub type PlanRef = Arc<PlanNode>;

/// Sort direction for an order-by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

/// One order-by key: direction plus the expression to sort on.
pub type OrderByKey = (OrderDir, Expression);

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    /// Full scan of a table heap.
    SeqScan {
        table_oid: TableOid,
        table_name: String,
        schema: Schema,
    },
    /// Row-wise projection.
    Projection {
        exprs: Vec<Expression>,
        schema: Schema,
        child: PlanRef,
    },
    /// Row filter on a boolean predicate.
    Filter {
        predicate: Expression,
        schema: Schema,
        child: PlanRef,
    },
    /// Full sort of the child's output.
    Sort {
        order_by: Vec<OrderByKey>,
        schema: Schema,
        child: PlanRef,
    },
    /// Pass through the first `limit` rows.
    Limit {
        limit: usize,
        schema: Schema,
        child: PlanRef,
    },
    /// Heap-bounded top-n by the order keys.
    TopN {
        order_by: Vec<OrderByKey>,
        n: usize,
        schema: Schema,
        child: PlanRef,
    },
    /// Literal rows.
    Values {
        rows: Vec<Vec<Expression>>,
        schema: Schema,
    },
    /// Insert the child's rows into a table.
    Insert {
        table_oid: TableOid,
        table_name: String,
        schema: Schema,
        child: PlanRef,
    },
    /// Nearest-neighbor scan through a vector index.
    VectorIndexScan {
        table_oid: TableOid,
        table_name: String,
        index_oid: IndexOid,
        index_name: String,
        base_vector: Vec<f64>,
        limit: usize,
        schema: Schema,
    },
}

impl PlanNode {
    pub fn schema(&self) -> &Schema {
        match self {
            PlanNode::SeqScan { schema, .. }
            | PlanNode::Projection { schema, .. }
            | PlanNode::Filter { schema, .. }
            | PlanNode::Sort { schema, .. }
            | PlanNode::Limit { schema, .. }
            | PlanNode::TopN { schema, .. }
            | PlanNode::Values { schema, .. }
            | PlanNode::Insert { schema, .. }
            | PlanNode::VectorIndexScan { schema, .. } => schema,
        }
    }

    pub fn children(&self) -> Vec<&PlanRef> {
        match self {
            PlanNode::Projection { child, .. }
            | PlanNode::Filter { child, .. }
            | PlanNode::Sort { child, .. }
            | PlanNode::Limit { child, .. }
            | PlanNode::TopN { child, .. }
            | PlanNode::Insert { child, .. } => vec![child],
            PlanNode::SeqScan { .. }
            | PlanNode::Values { .. }
            | PlanNode::VectorIndexScan { .. } => vec![],
        }
    }

    /// One-line node label, used by `Display` to render the tree.
    fn label(&self) -> String {
        match self {
            PlanNode::SeqScan { table_name, .. } => format!("SeqScan {table_name}"),
            PlanNode::Projection { exprs, .. } => format!("Projection [{} exprs]", exprs.len()),
            PlanNode::Filter { .. } => "Filter".to_string(),
            PlanNode::Sort { order_by, .. } => format!("Sort [{} keys]", order_by.len()),
            PlanNode::Limit { limit, .. } => format!("Limit {limit}"),
            PlanNode::TopN { n, .. } => format!("TopN {n}"),
            PlanNode::Values { rows, .. } => format!("Values [{} rows]", rows.len()),
            PlanNode::Insert { table_name, .. } => format!("Insert {table_name}"),
            PlanNode::VectorIndexScan {
                index_name, limit, ..
            } => format!("VectorIndexScan {index_name} limit={limit}"),
        }
    }

    fn render(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.label(), indent = depth * 2)?;
        for child in self.children() {
            child.render(f, depth + 1)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for PlanNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.render(f, 0)
    }
}
