//! Plan rewrite rules.
//!
//! Two bottom-up rules cooperate to serve nearest-neighbor queries from a
//! vector index: `Sort` + `Limit` collapse into `TopN`, and a `TopN` whose
//! sort key is a distance against a constant vector becomes a
//! `VectorIndexScan` when the catalog holds a compatible index.
//!
//! Rules are pure functions over immutable plan trees; a non-match returns
//! the input plan unchanged.

mod sort_limit_as_topn;
mod vector_index_scan;

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::plan::{PlanNode, PlanRef};
use crate::session::Session;

pub use vector_index_scan::match_vector_index;

pub struct Optimizer<'a> {
    catalog: &'a Catalog,
    session: &'a Session,
}

impl<'a> Optimizer<'a> {
    pub fn new(catalog: &'a Catalog, session: &'a Session) -> Self {
        Self { catalog, session }
    }

    /// Run every rewrite pass over the plan.
    pub fn optimize(&self, plan: PlanRef) -> PlanRef {
        let plan = self.optimize_sort_limit_as_topn(plan);
        self.optimize_as_vector_index_scan(plan)
    }

    /// Rule A: `Limit(n)` over `Sort` becomes `TopN`.
    pub fn optimize_sort_limit_as_topn(&self, plan: PlanRef) -> PlanRef {
        transform_up(plan, &sort_limit_as_topn::rewrite)
    }

    /// Rule B: `TopN` over a (projected) sequential scan ordered by a
    /// distance expression becomes a `VectorIndexScan`.
    pub fn optimize_as_vector_index_scan(&self, plan: PlanRef) -> PlanRef {
        transform_up(plan, &|p| {
            vector_index_scan::rewrite(self.catalog, self.session, p)
        })
    }
}

/// Apply `rule` to every node, children before parents.
///
/// Every node has at most one child, so the rebuild is a single hop.
fn transform_up<F>(plan: PlanRef, rule: &F) -> PlanRef
where
    F: Fn(PlanRef) -> PlanRef,
{
    let rewritten_child = plan
        .children()
        .first()
        .map(|child| transform_up((*child).clone(), rule));
    let plan = match rewritten_child {
        Some(child) => with_child(&plan, child),
        None => plan,
    };
    rule(plan)
}

/// Rebuild a single-child node around a new child.
fn with_child(plan: &PlanRef, child: PlanRef) -> PlanRef {
    Arc::new(match plan.as_ref() {
        PlanNode::Projection { exprs, schema, .. } => PlanNode::Projection {
            exprs: exprs.clone(),
            schema: schema.clone(),
            child,
        },
        PlanNode::Filter {
            predicate, schema, ..
        } => PlanNode::Filter {
            predicate: predicate.clone(),
            schema: schema.clone(),
            child,
        },
        PlanNode::Sort {
            order_by, schema, ..
        } => PlanNode::Sort {
            order_by: order_by.clone(),
            schema: schema.clone(),
            child,
        },
        PlanNode::Limit { limit, schema, .. } => PlanNode::Limit {
            limit: *limit,
            schema: schema.clone(),
            child,
        },
        PlanNode::TopN {
            order_by,
            n,
            schema,
            ..
        } => PlanNode::TopN {
            order_by: order_by.clone(),
            n: *n,
            schema: schema.clone(),
            child,
        },
        PlanNode::Insert {
            table_oid,
            table_name,
            schema,
            ..
        } => PlanNode::Insert {
            table_oid: *table_oid,
            table_name: table_name.clone(),
            schema: schema.clone(),
            child,
        },
        // Leaves have no children to replace.
        leaf => leaf.clone(),
    })
}
