use crate::catalog::Schema;
use crate::error::Result;
use crate::execution::{compare_sort_keys, evaluate_sort_keys, Executor};
use crate::plan::OrderByKey;
use crate::storage::Tuple;

/// Full in-memory sort of the child's output. Pipeline breaker: `init`
/// drains the child.
pub struct SortExecutor<'a> {
    child: Box<dyn Executor + 'a>,
    order_by: Vec<OrderByKey>,
    schema: Schema,
    sorted: Vec<Tuple>,
    cursor: usize,
}

impl<'a> SortExecutor<'a> {
    pub fn new(child: Box<dyn Executor + 'a>, order_by: Vec<OrderByKey>, schema: Schema) -> Self {
        Self {
            child,
            order_by,
            schema,
            sorted: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for SortExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        let mut keyed: Vec<(Vec<f64>, Tuple)> = Vec::new();
        while let Some(tuple) = self.child.next()? {
            let keys = evaluate_sort_keys(&tuple, self.child.schema(), &self.order_by)?;
            keyed.push((keys, tuple));
        }
        keyed.sort_by(|a, b| compare_sort_keys(&a.0, &b.0));
        self.sorted = keyed.into_iter().map(|(_, t)| t).collect();
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let row = self.sorted.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}
