//! Iterator-model executors.
//!
//! Every plan node has an executor that produces tuples one at a time.
//! `init` prepares state (and, for pipeline breakers like sort, drains the
//! child); `next` yields rows until `None`. Executors run to completion on
//! the calling thread with no suspension points.

mod filter;
mod insert;
mod limit;
mod projection;
mod seq_scan;
mod sort;
mod topn;
mod values;
mod vector_index_scan;

use crate::catalog::{Catalog, Schema};
use crate::error::{Result, SkiffError};
use crate::plan::{OrderByKey, OrderDir, PlanNode, PlanRef};
use crate::storage::Tuple;

pub use filter::FilterExecutor;
pub use insert::InsertExecutor;
pub use limit::LimitExecutor;
pub use projection::ProjectionExecutor;
pub use seq_scan::SeqScanExecutor;
pub use sort::SortExecutor;
pub use topn::TopNExecutor;
pub use values::ValuesExecutor;
pub use vector_index_scan::VectorIndexScanExecutor;

/// Shared state handed to every executor.
pub struct ExecutorContext<'a> {
    pub catalog: &'a Catalog,
}

impl<'a> ExecutorContext<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

/// A volcano-style operator.
pub trait Executor {
    fn schema(&self) -> &Schema;

    /// Prepare for iteration. Called exactly once, before any `next`.
    fn init(&mut self) -> Result<()>;

    /// Produce the next tuple, or `None` when exhausted.
    fn next(&mut self) -> Result<Option<Tuple>>;
}

/// Build the executor tree for a plan.
pub fn build_executor<'a>(
    plan: &PlanRef,
    ctx: &'a ExecutorContext<'a>,
) -> Result<Box<dyn Executor + 'a>> {
    Ok(match plan.as_ref() {
        PlanNode::SeqScan {
            table_oid, schema, ..
        } => Box::new(SeqScanExecutor::new(ctx, *table_oid, schema.clone())),
        PlanNode::Projection {
            exprs,
            schema,
            child,
        } => Box::new(ProjectionExecutor::new(
            build_executor(child, ctx)?,
            exprs.clone(),
            schema.clone(),
        )),
        PlanNode::Filter {
            predicate,
            schema,
            child,
        } => Box::new(FilterExecutor::new(
            build_executor(child, ctx)?,
            predicate.clone(),
            schema.clone(),
        )),
        PlanNode::Sort {
            order_by,
            schema,
            child,
        } => Box::new(SortExecutor::new(
            build_executor(child, ctx)?,
            order_by.clone(),
            schema.clone(),
        )),
        PlanNode::Limit {
            limit,
            schema,
            child,
        } => Box::new(LimitExecutor::new(
            build_executor(child, ctx)?,
            *limit,
            schema.clone(),
        )),
        PlanNode::TopN {
            order_by,
            n,
            schema,
            child,
        } => Box::new(TopNExecutor::new(
            build_executor(child, ctx)?,
            order_by.clone(),
            *n,
            schema.clone(),
        )),
        PlanNode::Values { rows, schema } => {
            Box::new(ValuesExecutor::new(rows.clone(), schema.clone()))
        }
        PlanNode::Insert {
            table_oid,
            schema,
            child,
            ..
        } => Box::new(InsertExecutor::new(
            ctx,
            *table_oid,
            build_executor(child, ctx)?,
            schema.clone(),
        )),
        PlanNode::VectorIndexScan {
            table_oid,
            index_oid,
            base_vector,
            limit,
            schema,
            ..
        } => Box::new(VectorIndexScanExecutor::new(
            ctx,
            *table_oid,
            *index_oid,
            base_vector.clone(),
            *limit,
            schema.clone(),
        )),
    })
}

/// Build, initialize, and drain an executor tree.
pub fn execute(plan: &PlanRef, ctx: &ExecutorContext) -> Result<Vec<Tuple>> {
    let mut executor = build_executor(plan, ctx)?;
    executor.init()?;
    let mut rows = Vec::new();
    while let Some(tuple) = executor.next()? {
        rows.push(tuple);
    }
    Ok(rows)
}

/// Evaluate a tuple's sort keys as direction-adjusted doubles.
///
/// Descending keys are negated so callers can always compare ascending,
/// lexicographically across keys.
pub(crate) fn evaluate_sort_keys(
    tuple: &Tuple,
    schema: &Schema,
    order_by: &[OrderByKey],
) -> Result<Vec<f64>> {
    order_by
        .iter()
        .map(|(dir, expr)| {
            let value = expr.evaluate(tuple, schema)?;
            let key = value
                .as_double()
                .ok_or_else(|| SkiffError::Execution("sort key is not numeric".into()))?;
            Ok(match dir {
                OrderDir::Asc => key,
                OrderDir::Desc => -key,
            })
        })
        .collect()
}

/// Lexicographic total order over adjusted key vectors.
pub(crate) fn compare_sort_keys(a: &[f64], b: &[f64]) -> std::cmp::Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.total_cmp(y);
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    std::cmp::Ordering::Equal
}
