use tracing::debug;

use crate::catalog::{Schema, TableOid};
use crate::error::{Result, SkiffError};
use crate::execution::{Executor, ExecutorContext};
use crate::storage::Tuple;
use crate::types::Value;

/// Inserts the child's rows into a table, maintaining every vector index
/// on that table, and emits a single row with the inserted count.
pub struct InsertExecutor<'a> {
    ctx: &'a ExecutorContext<'a>,
    table_oid: TableOid,
    child: Box<dyn Executor + 'a>,
    schema: Schema,
    emitted: bool,
}

impl<'a> InsertExecutor<'a> {
    pub fn new(
        ctx: &'a ExecutorContext<'a>,
        table_oid: TableOid,
        child: Box<dyn Executor + 'a>,
        schema: Schema,
    ) -> Self {
        Self {
            ctx,
            table_oid,
            child,
            schema,
            emitted: false,
        }
    }
}

impl Executor for InsertExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.emitted = false;
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if self.emitted {
            return Ok(None);
        }
        self.emitted = true;

        let table = self
            .ctx
            .catalog
            .get_table(self.table_oid)
            .ok_or_else(|| SkiffError::Execution(format!("unknown table oid {}", self.table_oid)))?;
        let indexes = self.ctx.catalog.get_table_indexes(&table.name);

        let mut count: i64 = 0;
        while let Some(tuple) = self.child.next()? {
            if tuple.len() != table.schema.len() {
                return Err(SkiffError::Execution(format!(
                    "row has {} values, table {} has {} columns",
                    tuple.len(),
                    table.name,
                    table.schema.len()
                )));
            }
            let rid = table.heap.borrow_mut().insert(tuple.clone());
            for index_info in &indexes {
                let Some(key) = tuple
                    .value_at(index_info.key_column)
                    .and_then(Value::as_vector)
                else {
                    return Err(SkiffError::Execution(format!(
                        "column {} of table {} is not a vector value",
                        index_info.key_column, table.name
                    )));
                };
                index_info.index.borrow_mut().insert(key, rid);
            }
            count += 1;
        }

        debug!(table = %table.name, rows = count, "insert complete");
        Ok(Some(Tuple::new(vec![Value::Integer(count)])))
    }
}
