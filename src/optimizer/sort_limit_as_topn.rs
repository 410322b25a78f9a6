//! Rule A: collapse `Limit` over `Sort` into a heap-bounded `TopN`.

use std::sync::Arc;

use tracing::debug;

use crate::plan::{PlanNode, PlanRef};

/// Match `Limit(n)` whose single child is `Sort(order_by)` and replace the
/// pair with `TopN(order_by, n)` over the sort's input. Output schema is
/// preserved; any other shape passes through untouched.
pub(crate) fn rewrite(plan: PlanRef) -> PlanRef {
    let PlanNode::Limit {
        limit,
        schema,
        child,
    } = plan.as_ref()
    else {
        return plan;
    };
    let PlanNode::Sort {
        order_by,
        child: sort_input,
        ..
    } = child.as_ref()
    else {
        return plan;
    };

    debug!(n = limit, "rewriting Limit over Sort as TopN");
    Arc::new(PlanNode::TopN {
        order_by: order_by.clone(),
        n: *limit,
        schema: schema.clone(),
        child: sort_input.clone(),
    })
}
